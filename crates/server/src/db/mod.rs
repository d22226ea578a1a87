//! Database operations for the FAQ `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Accounts with role and argon2 password hash
//! - `stores` - One per merchant
//! - `faq_categories` - Soft-deletable, unique by normalized name among live rows
//! - `faqs` - Global or store-scoped, versioned, soft-deletable
//! - `faq_translations` - Unique per (faq, language)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p faqdesk-cli -- migrate
//! ```

use std::sync::Arc;
use std::time::Duration;

use faqdesk_core::FaqError;
use faqdesk_core::repository::Repositories;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use thiserror::Error;

pub mod categories;
pub mod faqs;
pub mod memory;
pub mod stores;
pub mod translations;
pub mod users;

pub use categories::PgCategoryRepository;
pub use faqs::PgFaqRepository;
pub use stores::PgStoreRepository;
pub use translations::PgTranslationRepository;
pub use users::PgUserRepository;

/// Storage failure with no caller-visible meaning.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored data failed to parse into a domain value.
    #[error("Data corruption: {0}")]
    DataCorruption(String),
}

impl From<RepositoryError> for FaqError {
    fn from(err: RepositoryError) -> Self {
        Self::internal(err)
    }
}

/// Whether `err` is a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Map `err` to `Duplicate` on unique violation, `Internal` otherwise.
pub(crate) fn duplicate_or_internal(err: sqlx::Error, what: impl FnOnce() -> String) -> FaqError {
    if is_unique_violation(&err) {
        FaqError::duplicate(what())
    } else {
        RepositoryError::Database(err).into()
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// Every connection gets `statement_timeout` so a query cannot outlive the
/// request deadline it runs under.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `statement_timeout` - Upper bound for any single statement
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    statement_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    let set_timeout = format!("SET statement_timeout = {}", statement_timeout.as_millis());

    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .after_connect(move |conn, _meta| {
            let set_timeout = set_timeout.clone();
            Box::pin(async move {
                conn.execute(set_timeout.as_str()).await?;
                Ok(())
            })
        })
        .connect(database_url.expose_secret())
        .await
}

/// Postgres-backed implementations of every repository.
#[must_use]
pub fn pg_repositories(pool: &PgPool) -> Repositories {
    Repositories {
        users: Arc::new(PgUserRepository::new(pool.clone())),
        stores: Arc::new(PgStoreRepository::new(pool.clone())),
        categories: Arc::new(PgCategoryRepository::new(pool.clone())),
        faqs: Arc::new(PgFaqRepository::new(pool.clone())),
        translations: Arc::new(PgTranslationRepository::new(pool.clone())),
    }
}
