//! Category repository for database operations.
//!
//! Names arrive already normalized; uniqueness is enforced by a partial index
//! over live rows, so a soft-deleted name can be reused.

use async_trait::async_trait;
use faqdesk_core::models::Category;
use faqdesk_core::repository::CategoryRepository;
use faqdesk_core::{CategoryId, FaqError, FaqResult};
use sqlx::PgPool;

use super::{RepositoryError, duplicate_or_internal};

/// Repository for FAQ categories.
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn list(&self) -> FaqResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r"
            SELECT id, name
            FROM faq_categories
            WHERE deleted_at IS NULL
            ORDER BY name
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(categories)
    }

    async fn find_by_name(&self, name: &str) -> FaqResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            r"
            SELECT id, name
            FROM faq_categories
            WHERE name = $1 AND deleted_at IS NULL
            ",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(category)
    }

    async fn create(&self, name: &str) -> FaqResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            r"
            INSERT INTO faq_categories (name)
            VALUES ($1)
            RETURNING id, name
            ",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| duplicate_or_internal(e, || format!("category {name}")))?;

        Ok(category)
    }

    async fn rename(&self, id: CategoryId, name: &str) -> FaqResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            r"
            UPDATE faq_categories
            SET name = $2
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name
            ",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| duplicate_or_internal(e, || format!("category {name}")))?;

        category.ok_or_else(|| FaqError::not_found("category", id))
    }

    async fn soft_delete(&self, id: CategoryId) -> FaqResult<()> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let deleted = sqlx::query(
            r"
            UPDATE faq_categories
            SET deleted_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        if deleted.rows_affected() == 0 {
            return Err(FaqError::not_found("category", id));
        }

        let cascaded = sqlx::query(
            r"
            UPDATE faqs
            SET deleted_at = now(), version = version + 1, updated_at = now()
            WHERE category_id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::debug!(
            category_id = %id,
            faqs = cascaded.rows_affected(),
            "Soft-deleted category"
        );
        Ok(())
    }
}
