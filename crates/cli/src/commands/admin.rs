//! Admin account bootstrap.
//!
//! Admin accounts can only be created by another admin over the API, so the
//! first one is created here.
//!
//! # Usage
//!
//! ```bash
//! faqdesk-cli admin create -e admin@example.com -p 'S3cure!pass'
//! ```
//!
//! # Environment Variables
//!
//! - `FAQDESK_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use std::time::Duration;

use faqdesk_core::models::NewUser;
use faqdesk_core::repository::UserRepository;
use faqdesk_core::types::check_password;
use faqdesk_core::{Email, FaqError, FieldErrors, Role, UserId};
use faqdesk_server::db;
use faqdesk_server::services::auth::hash_password;
use thiserror::Error;

use super::database_url;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: FAQDESK_DATABASE_URL")]
    MissingDatabaseUrl,

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Rejected by validation or persistence.
    #[error(transparent)]
    Domain(#[from] FaqError),
}

/// Create an admin account.
///
/// # Errors
///
/// Returns `AdminError` if the input is invalid, the email is taken, or the
/// database is unreachable.
pub async fn create_user(email: &str, password: &str) -> Result<UserId, AdminError> {
    let email = Email::parse(email).map_err(|e| AdminError::InvalidEmail(e.to_string()))?;

    let mut errors = FieldErrors::new();
    check_password(password, &mut errors);
    errors.into_result()?;

    let database_url = database_url().ok_or(AdminError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url, Duration::from_secs(30)).await?;
    let repos = db::pg_repositories(&pool);

    tracing::info!("Creating admin user: {}", email);
    let user = repos
        .users
        .create(NewUser {
            email,
            role: Role::Admin,
            password_hash: hash_password(password)?,
        })
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(user.id)
}
