//! Persistence contracts.
//!
//! Implementations translate storage failures into [`FaqError`] before
//! returning: unique violations become `Duplicate`, a versioned write that
//! matches no row becomes `EditConflict`, anything unexpected becomes
//! `Internal`. Soft-deleted rows are invisible to every read.
//!
//! Multi-statement writes (merchant and store, FAQ and its first
//! translation, category and its FAQs) are atomic.

use std::sync::Arc;

use async_trait::async_trait;

use crate::consistency::{NewFaq, TranslationChange};
use crate::error::FaqResult;
use crate::models::{Category, Credentials, Faq, NewUser, Store, Translation, TranslationDraft, User};
use crate::types::{CategoryId, Email, FaqId, StoreId, TranslationId, UserId};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> FaqResult<Option<User>>;

    /// Look up an account with its password hash, for login.
    async fn find_credentials(&self, email: &Email) -> FaqResult<Option<Credentials>>;

    /// `Duplicate` if the email is taken.
    async fn create(&self, user: NewUser) -> FaqResult<User>;

    /// Create a merchant account and its store in one atomic unit.
    async fn create_merchant(&self, user: NewUser, store_name: &str) -> FaqResult<(User, Store)>;
}

#[async_trait]
pub trait StoreRepository: Send + Sync {
    async fn find(&self, id: StoreId) -> FaqResult<Option<Store>>;

    async fn find_by_merchant(&self, merchant: UserId) -> FaqResult<Option<Store>>;

    async fn rename(&self, id: StoreId, name: &str) -> FaqResult<Store>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> FaqResult<Vec<Category>>;

    /// Lookup by normalized name.
    async fn find_by_name(&self, name: &str) -> FaqResult<Option<Category>>;

    /// `Duplicate` if a live category has the same normalized name.
    async fn create(&self, name: &str) -> FaqResult<Category>;

    async fn rename(&self, id: CategoryId, name: &str) -> FaqResult<Category>;

    /// Soft-delete the category and every FAQ filed under it, atomically.
    async fn soft_delete(&self, id: CategoryId) -> FaqResult<()>;
}

#[async_trait]
pub trait FaqRepository: Send + Sync {
    /// A live FAQ with its category and translations.
    async fn find(&self, id: FaqId) -> FaqResult<Option<Faq>>;

    async fn list_global(&self, category: CategoryId) -> FaqResult<Vec<Faq>>;

    async fn list_by_store(&self, store: StoreId) -> FaqResult<Vec<Faq>>;

    /// Insert the FAQ and its first translation atomically.
    async fn create(&self, faq: NewFaq) -> FaqResult<Faq>;

    /// Persist category, scope and default language of `faq` if the stored
    /// version still equals `faq.version`; the returned FAQ carries the new
    /// version.
    async fn update(&self, faq: &Faq) -> FaqResult<Faq>;

    async fn soft_delete(&self, id: FaqId) -> FaqResult<()>;
}

/// Translation writes are guarded by the parent FAQ's `expected_version`,
/// which each write bumps.
#[async_trait]
pub trait TranslationRepository: Send + Sync {
    async fn insert(
        &self,
        faq: FaqId,
        expected_version: i32,
        draft: TranslationDraft,
    ) -> FaqResult<Translation>;

    async fn update(
        &self,
        faq: FaqId,
        expected_version: i32,
        change: TranslationChange,
    ) -> FaqResult<Translation>;

    async fn delete(&self, faq: FaqId, expected_version: i32, id: TranslationId) -> FaqResult<()>;
}

/// Every repository the services need, behind trait objects so storage can be
/// swapped (Postgres in production, in-memory in tests).
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub stores: Arc<dyn StoreRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub faqs: Arc<dyn FaqRepository>,
    pub translations: Arc<dyn TranslationRepository>,
}
