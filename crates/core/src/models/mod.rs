//! Domain entities and their field-level validation.
//!
//! Read paths embed owned values (a [`Faq`] owns its [`Category`] and its
//! [`Translation`]s); write paths carry ids only.

pub mod category;
pub mod faq;
pub mod store;
pub mod user;

pub use category::{Category, check_category_name, normalize_category_name};
pub use faq::{
    Faq, FaqScope, Translation, TranslationDraft, TranslationInput, check_language,
};
pub use store::{Store, check_store_name};
pub use user::{Credentials, NewUser, User, check_email};
