//! Response bodies.
//!
//! Domain types carry owned aggregates; these flatten them into the JSON
//! shapes clients see.

use faqdesk_core::models::{Category, Faq, Store, Translation, User};
use faqdesk_core::{CategoryId, FaqId, Language, Role, StoreId, TranslationId, UserId};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.to_string(),
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StoreView {
    pub id: StoreId,
    pub merchant_id: UserId,
    pub name: String,
}

impl From<Store> for StoreView {
    fn from(store: Store) -> Self {
        Self {
            id: store.id,
            merchant_id: store.merchant_id,
            name: store.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub id: CategoryId,
    pub name: String,
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TranslationView {
    pub id: TranslationId,
    pub faq_id: FaqId,
    pub language: Language,
    pub question: String,
    pub answer: String,
}

impl From<Translation> for TranslationView {
    fn from(t: Translation) -> Self {
        Self {
            id: t.id,
            faq_id: t.faq_id,
            language: t.language,
            question: t.question,
            answer: t.answer,
        }
    }
}

/// A FAQ with its default-language content lifted to the top level.
#[derive(Debug, Serialize)]
pub struct FaqView {
    pub id: FaqId,
    pub category: String,
    pub is_global: bool,
    pub store_id: Option<StoreId>,
    pub default_language: Language,
    pub version: i32,
    pub question: String,
    pub answer: String,
    pub translations: Vec<TranslationView>,
}

impl From<Faq> for FaqView {
    fn from(faq: Faq) -> Self {
        let (question, answer) = faq
            .default_translation()
            .map(|t| (t.question.clone(), t.answer.clone()))
            .unwrap_or_default();
        Self {
            id: faq.id,
            category: faq.category.name,
            is_global: faq.scope.is_global(),
            store_id: faq.scope.store_id(),
            default_language: faq.default_language,
            version: faq.version,
            question,
            answer,
            translations: faq.translations.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

impl Message {
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}
