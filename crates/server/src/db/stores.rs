//! Store repository for database operations.

use async_trait::async_trait;
use faqdesk_core::models::Store;
use faqdesk_core::repository::StoreRepository;
use faqdesk_core::{FaqError, FaqResult, StoreId, UserId};
use sqlx::PgPool;

use super::RepositoryError;

/// Repository for merchant stores.
pub struct PgStoreRepository {
    pool: PgPool,
}

impl PgStoreRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreRepository for PgStoreRepository {
    async fn find(&self, id: StoreId) -> FaqResult<Option<Store>> {
        let store = sqlx::query_as::<_, Store>(
            r"
            SELECT id, merchant_id, name
            FROM stores
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(store)
    }

    async fn find_by_merchant(&self, merchant: UserId) -> FaqResult<Option<Store>> {
        let store = sqlx::query_as::<_, Store>(
            r"
            SELECT id, merchant_id, name
            FROM stores
            WHERE merchant_id = $1
            ",
        )
        .bind(merchant)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(store)
    }

    async fn rename(&self, id: StoreId, name: &str) -> FaqResult<Store> {
        let store = sqlx::query_as::<_, Store>(
            r"
            UPDATE stores
            SET name = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, merchant_id, name
            ",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        store.ok_or_else(|| FaqError::not_found("store", id))
    }
}
