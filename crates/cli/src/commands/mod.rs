//! Subcommand implementations.

pub mod admin;
pub mod migrate;

use secrecy::SecretString;

/// Connection string from `FAQDESK_DATABASE_URL`, falling back to
/// `DATABASE_URL`, after loading `.env` if present.
fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();
    std::env::var("FAQDESK_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .filter(|url| !url.is_empty())
        .map(SecretString::from)
}
