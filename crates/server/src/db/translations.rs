//! Translation repository for database operations.
//!
//! Every write runs in a transaction that first bumps the parent FAQ's
//! version, so two writers holding the same version cannot both succeed.

use async_trait::async_trait;
use faqdesk_core::consistency::TranslationChange;
use faqdesk_core::models::{Translation, TranslationDraft};
use faqdesk_core::repository::TranslationRepository;
use faqdesk_core::{FaqError, FaqId, FaqResult, Language, TranslationId};
use sqlx::PgPool;

use super::faqs::bump_version;
use super::{RepositoryError, duplicate_or_internal};

/// Repository for FAQ translations.
pub struct PgTranslationRepository {
    pool: PgPool,
}

impl PgTranslationRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TranslationRepository for PgTranslationRepository {
    async fn insert(
        &self,
        faq: FaqId,
        expected_version: i32,
        draft: TranslationDraft,
    ) -> FaqResult<Translation> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        bump_version(&mut tx, faq, expected_version).await?;

        let translation = sqlx::query_as::<_, Translation>(
            r"
            INSERT INTO faq_translations (faq_id, language, question, answer)
            VALUES ($1, $2, $3, $4)
            RETURNING id, faq_id, language, question, answer
            ",
        )
        .bind(faq)
        .bind(draft.language)
        .bind(&draft.question)
        .bind(&draft.answer)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            duplicate_or_internal(e, || format!("translation {} for faq {faq}", draft.language))
        })?;

        tx.commit().await.map_err(RepositoryError::from)?;
        Ok(translation)
    }

    async fn update(
        &self,
        faq: FaqId,
        expected_version: i32,
        change: TranslationChange,
    ) -> FaqResult<Translation> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        bump_version(&mut tx, faq, expected_version).await?;

        let language = change.draft.language;
        let translation = sqlx::query_as::<_, Translation>(
            r"
            UPDATE faq_translations
            SET language = $3, question = $4, answer = $5, updated_at = now()
            WHERE id = $1 AND faq_id = $2
            RETURNING id, faq_id, language, question, answer
            ",
        )
        .bind(change.id)
        .bind(faq)
        .bind(language)
        .bind(&change.draft.question)
        .bind(&change.draft.answer)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| duplicate_or_internal(e, || format!("translation {language} for faq {faq}")))?
        .ok_or_else(|| FaqError::not_found("translation", change.id))?;

        tx.commit().await.map_err(RepositoryError::from)?;
        Ok(translation)
    }

    async fn delete(&self, faq: FaqId, expected_version: i32, id: TranslationId) -> FaqResult<()> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        bump_version(&mut tx, faq, expected_version).await?;

        let languages: Option<(Language, Language)> = sqlx::query_as(
            r"
            SELECT t.language, f.default_language
            FROM faq_translations t
            JOIN faqs f ON f.id = t.faq_id
            WHERE t.id = $1 AND t.faq_id = $2
            ",
        )
        .bind(id)
        .bind(faq)
        .fetch_optional(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        match languages {
            None => return Err(FaqError::not_found("translation", id)),
            Some((language, default)) if language == default => {
                return Err(FaqError::conflict(
                    "the default-language translation cannot be deleted",
                ));
            }
            Some(_) => {}
        }

        sqlx::query("DELETE FROM faq_translations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

        tx.commit().await.map_err(RepositoryError::from)?;
        Ok(())
    }
}
