//! FAQ repository for database operations.
//!
//! FAQs are loaded as full aggregates: the row, its live category and every
//! translation. A FAQ whose category was soft-deleted is invisible.

use std::collections::HashMap;

use async_trait::async_trait;
use faqdesk_core::consistency::NewFaq;
use faqdesk_core::models::{Category, Faq, FaqScope, Translation};
use faqdesk_core::repository::FaqRepository;
use faqdesk_core::{CategoryId, FaqError, FaqId, FaqResult, Language, StoreId};
use sqlx::{PgConnection, PgPool};

use super::RepositoryError;

/// Repository for FAQs.
pub struct PgFaqRepository {
    pool: PgPool,
}

impl PgFaqRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach translations to loaded FAQ rows, preserving row order.
    async fn assemble(&self, rows: Vec<FaqRow>) -> FaqResult<Vec<Faq>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|r| r.id.as_i32()).collect();
        let translations = sqlx::query_as::<_, Translation>(
            r"
            SELECT id, faq_id, language, question, answer
            FROM faq_translations
            WHERE faq_id = ANY($1)
            ORDER BY language
            ",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        let mut by_faq: HashMap<FaqId, Vec<Translation>> = HashMap::new();
        for translation in translations {
            by_faq.entry(translation.faq_id).or_default().push(translation);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let translations = by_faq.remove(&row.id).unwrap_or_default();
                row.into_faq(translations)
            })
            .collect())
    }
}

#[derive(sqlx::FromRow)]
struct FaqRow {
    id: FaqId,
    category_id: CategoryId,
    category_name: String,
    store_id: Option<StoreId>,
    default_language: Language,
    version: i32,
}

impl FaqRow {
    fn into_faq(self, translations: Vec<Translation>) -> Faq {
        Faq {
            id: self.id,
            category: Category {
                id: self.category_id,
                name: self.category_name,
            },
            scope: FaqScope::from_store_id(self.store_id),
            default_language: self.default_language,
            version: self.version,
            translations,
        }
    }
}

const SELECT_FAQ: &str = r"
    SELECT f.id, f.category_id, c.name AS category_name, f.store_id,
           f.default_language, f.version
    FROM faqs f
    JOIN faq_categories c ON c.id = f.category_id AND c.deleted_at IS NULL
    WHERE f.deleted_at IS NULL
";

/// Fail with `NotFound` unless the category exists and is live.
pub(super) async fn require_live_category(
    conn: &mut PgConnection,
    id: CategoryId,
) -> FaqResult<()> {
    let live: bool = sqlx::query_scalar(
        r"
        SELECT EXISTS (
            SELECT 1 FROM faq_categories WHERE id = $1 AND deleted_at IS NULL
        )
        ",
    )
    .bind(id)
    .fetch_one(conn)
    .await
    .map_err(RepositoryError::from)?;

    if live {
        Ok(())
    } else {
        Err(FaqError::not_found("category", id))
    }
}

/// Bump the FAQ's version if it still equals `expected`.
///
/// Zero matched rows is `EditConflict` when the FAQ is live and `NotFound`
/// otherwise.
pub(super) async fn bump_version(
    conn: &mut PgConnection,
    faq: FaqId,
    expected: i32,
) -> FaqResult<()> {
    let bumped = sqlx::query(
        r"
        UPDATE faqs
        SET version = version + 1, updated_at = now()
        WHERE id = $1 AND version = $2 AND deleted_at IS NULL
        ",
    )
    .bind(faq)
    .bind(expected)
    .execute(&mut *conn)
    .await
    .map_err(RepositoryError::from)?;

    if bumped.rows_affected() == 1 {
        return Ok(());
    }

    let live: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM faqs WHERE id = $1 AND deleted_at IS NULL)",
    )
    .bind(faq)
    .fetch_one(&mut *conn)
    .await
    .map_err(RepositoryError::from)?;

    if live {
        Err(FaqError::conflict(format!("faq {faq} was modified concurrently")))
    } else {
        Err(FaqError::not_found("faq", faq))
    }
}

fn store_or_internal(err: sqlx::Error, store: Option<StoreId>) -> FaqError {
    match (&err, store) {
        (sqlx::Error::Database(db_err), Some(store)) if db_err.is_foreign_key_violation() => {
            FaqError::not_found("store", store)
        }
        _ => RepositoryError::Database(err).into(),
    }
}

#[async_trait]
impl FaqRepository for PgFaqRepository {
    async fn find(&self, id: FaqId) -> FaqResult<Option<Faq>> {
        let row = sqlx::query_as::<_, FaqRow>(&format!("{SELECT_FAQ} AND f.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Ok(self.assemble(row.into_iter().collect()).await?.pop())
    }

    async fn list_global(&self, category: CategoryId) -> FaqResult<Vec<Faq>> {
        let rows = sqlx::query_as::<_, FaqRow>(&format!(
            "{SELECT_FAQ} AND f.is_global AND f.category_id = $1 ORDER BY f.id"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        self.assemble(rows).await
    }

    async fn list_by_store(&self, store: StoreId) -> FaqResult<Vec<Faq>> {
        let rows = sqlx::query_as::<_, FaqRow>(&format!(
            "{SELECT_FAQ} AND f.store_id = $1 ORDER BY c.name, f.id"
        ))
        .bind(store)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        self.assemble(rows).await
    }

    async fn create(&self, faq: NewFaq) -> FaqResult<Faq> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        require_live_category(&mut tx, faq.category_id).await?;

        let store = faq.scope.store_id();
        let id: FaqId = sqlx::query_scalar(
            r"
            INSERT INTO faqs (category_id, store_id, is_global, default_language)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(faq.category_id)
        .bind(store)
        .bind(faq.scope.is_global())
        .bind(faq.default_language)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| store_or_internal(e, store))?;

        sqlx::query(
            r"
            INSERT INTO faq_translations (faq_id, language, question, answer)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(id)
        .bind(faq.first.language)
        .bind(&faq.first.question)
        .bind(&faq.first.answer)
        .execute(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        tx.commit().await.map_err(RepositoryError::from)?;

        self.find(id)
            .await?
            .ok_or_else(|| FaqError::internal(format!("created faq {id} vanished")))
    }

    async fn update(&self, faq: &Faq) -> FaqResult<Faq> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        require_live_category(&mut tx, faq.category.id).await?;
        bump_version(&mut tx, faq.id, faq.version).await?;

        let has_default: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1 FROM faq_translations WHERE faq_id = $1 AND language = $2
            )
            ",
        )
        .bind(faq.id)
        .bind(faq.default_language)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        if !has_default {
            return Err(FaqError::conflict("default language has no translation"));
        }

        let store = faq.scope.store_id();
        sqlx::query(
            r"
            UPDATE faqs
            SET category_id = $2, store_id = $3, is_global = $4, default_language = $5
            WHERE id = $1
            ",
        )
        .bind(faq.id)
        .bind(faq.category.id)
        .bind(store)
        .bind(faq.scope.is_global())
        .bind(faq.default_language)
        .execute(&mut *tx)
        .await
        .map_err(|e| store_or_internal(e, store))?;

        tx.commit().await.map_err(RepositoryError::from)?;

        self.find(faq.id)
            .await?
            .ok_or_else(|| FaqError::not_found("faq", faq.id))
    }

    async fn soft_delete(&self, id: FaqId) -> FaqResult<()> {
        let deleted = sqlx::query(
            r"
            UPDATE faqs
            SET deleted_at = now(), version = version + 1, updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        if deleted.rows_affected() == 0 {
            return Err(FaqError::not_found("faq", id));
        }
        Ok(())
    }
}
