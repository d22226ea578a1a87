//! Global and store FAQs and their translations.
//!
//! Every FAQ is addressed through a [`FaqAddress`]: a category for global
//! FAQs, a store for store FAQs. A FAQ that does not live at the address is
//! `NotFound` on reads. On writes through a store, a FAQ belonging to a
//! different store is `Unauthorized` for every actor.

use faqdesk_core::consistency::{
    FaqChanges, plan_add_translation, plan_create, plan_remove_translation, plan_update_faq,
    plan_update_translation,
};
use faqdesk_core::models::{
    Category, Faq, FaqScope, Translation, TranslationInput, User, check_category_name,
    check_language,
};
use faqdesk_core::policy::{Action, Resource, authorize};
use faqdesk_core::repository::Repositories;
use faqdesk_core::{FaqError, FaqId, FaqResult, FieldErrors, Language, StoreId};
use serde::Deserialize;

use super::catalog::CategoryService;
use super::stores::StoreService;

/// Where a FAQ is addressed from.
#[derive(Debug, Clone, Copy)]
pub enum FaqAddress<'a> {
    /// A global FAQ under the named category.
    Global(&'a str),
    /// A FAQ of this store.
    Store(StoreId),
}

/// Requested changes to a FAQ's own fields. Absent fields stay as they are.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FaqUpdate {
    pub category: Option<String>,
    pub default_language: Option<String>,
    pub is_global: Option<bool>,
    pub store_id: Option<StoreId>,
}

pub struct FaqService<'a> {
    repos: &'a Repositories,
}

impl<'a> FaqService<'a> {
    #[must_use]
    pub const fn new(repos: &'a Repositories) -> Self {
        Self { repos }
    }

    fn categories(&self) -> CategoryService<'a> {
        CategoryService::new(&*self.repos.categories)
    }

    fn stores(&self) -> StoreService<'a> {
        StoreService::new(&*self.repos.stores)
    }

    /// FAQs at an address: a category's global FAQs, or all of a store's.
    ///
    /// # Errors
    ///
    /// `NotFound` if the category or store does not exist.
    pub async fn list(&self, at: FaqAddress<'_>) -> FaqResult<Vec<Faq>> {
        match at {
            FaqAddress::Global(category) => {
                let category = self.categories().find(category).await?;
                self.repos.faqs.list_global(category.id).await
            }
            FaqAddress::Store(store) => {
                let store = self.stores().get(store).await?;
                self.repos.faqs.list_by_store(store.id).await
            }
        }
    }

    /// # Errors
    ///
    /// `NotFound` unless the FAQ lives at `at`.
    pub async fn get(&self, at: FaqAddress<'_>, id: FaqId) -> FaqResult<Faq> {
        self.locate(None, at, id, Action::Read).await
    }

    /// Create a FAQ with its first translation, whose language becomes the
    /// default. Global FAQs are filed under the address's category; store
    /// FAQs under `store_category`.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `NotFound` (category or store) or `ValidationFailed`.
    pub async fn create(
        &self,
        actor: Option<&User>,
        at: FaqAddress<'_>,
        store_category: &str,
        input: &TranslationInput,
    ) -> FaqResult<Faq> {
        let (scope, category) = match at {
            FaqAddress::Global(category) => {
                authorize(actor, Action::Create, Resource::GlobalFaq)?;
                (FaqScope::Global, self.category(category).await?)
            }
            FaqAddress::Store(store) => {
                let store = self.stores().get(store).await?;
                authorize(
                    actor,
                    Action::Create,
                    Resource::StoreFaq {
                        store: &store,
                        faq_store: None,
                    },
                )?;
                (FaqScope::Store(store.id), self.category(store_category).await?)
            }
        };

        let plan = plan_create(&category, scope, input)?;
        let faq = self.repos.faqs.create(plan).await?;
        tracing::info!(
            faq_id = %faq.id,
            category = %faq.category.name,
            store_id = ?faq.scope.store_id(),
            "faq created"
        );
        Ok(faq)
    }

    /// Change a FAQ's category, default language or scope, re-validating the
    /// whole FAQ.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `NotFound`, `ValidationFailed` or `EditConflict` if
    /// the FAQ changed since it was loaded.
    pub async fn update(
        &self,
        actor: Option<&User>,
        at: FaqAddress<'_>,
        id: FaqId,
        update: FaqUpdate,
    ) -> FaqResult<Faq> {
        let faq = self.locate(actor, at, id, Action::Update).await?;

        let category = match update.category.as_deref() {
            Some(name) => Some(self.category(name).await?),
            None => None,
        };
        let changes = FaqChanges {
            category,
            default_language: update.default_language,
            is_global: update.is_global,
            store_id: update.store_id,
        };
        let planned = plan_update_faq(&faq, changes)?;

        if planned.scope != faq.scope {
            self.authorize_move(actor, planned.scope).await?;
        }

        let updated = self.repos.faqs.update(&planned).await?;
        tracing::info!(faq_id = %updated.id, version = updated.version, "faq updated");
        Ok(updated)
    }

    /// Soft-delete a FAQ.
    ///
    /// # Errors
    ///
    /// `Unauthorized` or `NotFound`.
    pub async fn delete(&self, actor: Option<&User>, at: FaqAddress<'_>, id: FaqId) -> FaqResult<()> {
        let faq = self.locate(actor, at, id, Action::Delete).await?;
        self.repos.faqs.soft_delete(faq.id).await?;
        tracing::info!(faq_id = %faq.id, "faq deleted");
        Ok(())
    }

    /// # Errors
    ///
    /// `NotFound` for a missing FAQ or translation, `ValidationFailed` for
    /// an unknown language code.
    pub async fn translation(
        &self,
        at: FaqAddress<'_>,
        id: FaqId,
        language: &str,
    ) -> FaqResult<Translation> {
        let language = parse_language(language)?;
        let faq = self.locate(None, at, id, Action::Read).await?;
        faq.translation(language)
            .cloned()
            .ok_or_else(|| FaqError::not_found("translation", format!("{id}/{language}")))
    }

    /// # Errors
    ///
    /// `Unauthorized`, `NotFound`, `ValidationFailed`, `Duplicate` if the
    /// language exists, or `EditConflict` on a concurrent write.
    pub async fn add_translation(
        &self,
        actor: Option<&User>,
        at: FaqAddress<'_>,
        id: FaqId,
        input: &TranslationInput,
    ) -> FaqResult<Translation> {
        let faq = self.locate(actor, at, id, Action::Create).await?;
        let draft = plan_add_translation(&faq, input)?;
        let translation = self.repos.translations.insert(faq.id, faq.version, draft).await?;
        tracing::info!(faq_id = %faq.id, language = %translation.language, "translation added");
        Ok(translation)
    }

    /// Rewrite the translation in `language` in place.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `NotFound`, `ValidationFailed`, `Duplicate` or
    /// `EditConflict`.
    pub async fn update_translation(
        &self,
        actor: Option<&User>,
        at: FaqAddress<'_>,
        id: FaqId,
        language: &str,
        input: &TranslationInput,
    ) -> FaqResult<Translation> {
        let language = parse_language(language)?;
        let faq = self.locate(actor, at, id, Action::Update).await?;
        let change = plan_update_translation(&faq, language, input)?;
        let updated = self
            .repos
            .translations
            .update(faq.id, faq.version, change)
            .await?;
        tracing::info!(faq_id = %faq.id, language = %updated.language, "translation updated");
        Ok(updated)
    }

    /// Remove a non-default translation.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `NotFound`, or `EditConflict` for the default
    /// translation.
    pub async fn remove_translation(
        &self,
        actor: Option<&User>,
        at: FaqAddress<'_>,
        id: FaqId,
        language: &str,
    ) -> FaqResult<()> {
        let language = parse_language(language)?;
        let faq = self.locate(actor, at, id, Action::Delete).await?;
        let translation = plan_remove_translation(&faq, language)?;
        self.repos
            .translations
            .delete(faq.id, faq.version, translation)
            .await?;
        tracing::info!(faq_id = %faq.id, %language, "translation removed");
        Ok(())
    }

    /// Load the FAQ at `at` and authorize `action` on it.
    async fn locate(
        &self,
        actor: Option<&User>,
        at: FaqAddress<'_>,
        id: FaqId,
        action: Action,
    ) -> FaqResult<Faq> {
        match at {
            FaqAddress::Global(category) => {
                authorize(actor, action, Resource::GlobalFaq)?;
                let category = self.categories().find(category).await?;
                self.repos
                    .faqs
                    .find(id)
                    .await?
                    .filter(|faq| faq.scope.is_global() && faq.category.id == category.id)
                    .ok_or_else(|| FaqError::not_found("faq", id))
            }
            FaqAddress::Store(store_id) => {
                let store = self.stores().get(store_id).await?;
                let faq = self
                    .repos
                    .faqs
                    .find(id)
                    .await?
                    .filter(|faq| !faq.scope.is_global())
                    .ok_or_else(|| FaqError::not_found("faq", id))?;

                if action.is_mutation() {
                    authorize(
                        actor,
                        action,
                        Resource::StoreFaq {
                            store: &store,
                            faq_store: faq.scope.store_id(),
                        },
                    )?;
                } else if faq.scope != FaqScope::Store(store.id) {
                    return Err(FaqError::not_found("faq", id));
                }
                Ok(faq)
            }
        }
    }

    /// Moving a FAQ needs the right to create at its destination.
    async fn authorize_move(&self, actor: Option<&User>, to: FaqScope) -> FaqResult<()> {
        match to {
            FaqScope::Global => authorize(actor, Action::Create, Resource::GlobalFaq),
            FaqScope::Store(store) => {
                let store = self.stores().get(store).await?;
                authorize(
                    actor,
                    Action::Create,
                    Resource::StoreFaq {
                        store: &store,
                        faq_store: None,
                    },
                )
            }
        }
    }

    async fn category(&self, name: &str) -> FaqResult<Category> {
        let mut errors = FieldErrors::new();
        check_category_name(name, &mut errors);
        errors.into_result()?;
        self.categories().find(name).await
    }
}

fn parse_language(raw: &str) -> FaqResult<Language> {
    let mut errors = FieldErrors::new();
    match check_language(raw, "language", &mut errors) {
        Some(language) => Ok(language),
        None => Err(FaqError::ValidationFailed(errors)),
    }
}
