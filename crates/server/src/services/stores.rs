//! Store profiles.

use faqdesk_core::models::{Store, User, check_store_name};
use faqdesk_core::policy::{Action, Resource, authorize};
use faqdesk_core::repository::StoreRepository;
use faqdesk_core::{FaqError, FaqResult, FieldErrors, StoreId};

pub struct StoreService<'a> {
    stores: &'a dyn StoreRepository,
}

impl<'a> StoreService<'a> {
    #[must_use]
    pub const fn new(stores: &'a dyn StoreRepository) -> Self {
        Self { stores }
    }

    /// # Errors
    ///
    /// `NotFound` if the store does not exist.
    pub async fn get(&self, id: StoreId) -> FaqResult<Store> {
        self.stores
            .find(id)
            .await?
            .ok_or_else(|| FaqError::not_found("store", id))
    }

    /// Rename a store. Only its merchant may do this.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Unauthorized` or `ValidationFailed` (under `name`).
    pub async fn rename(&self, actor: Option<&User>, id: StoreId, name: &str) -> FaqResult<Store> {
        let store = self.get(id).await?;
        authorize(actor, Action::Update, Resource::StoreProfile(&store))?;

        let mut errors = FieldErrors::new();
        let name = check_store_name(name, "name", &mut errors);
        errors.into_result()?;

        self.stores.rename(id, &name).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use faqdesk_core::models::NewUser;
    use faqdesk_core::{Email, Role};

    use super::*;
    use crate::db::memory::MemoryStore;

    async fn merchant(repos: &faqdesk_core::repository::Repositories, email: &str) -> (User, Store) {
        repos
            .users
            .create_merchant(
                NewUser {
                    email: Email::parse(email).unwrap(),
                    role: Role::Merchant,
                    password_hash: "x".into(),
                },
                "Acme",
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_only_owner_renames() {
        let repos = Arc::new(MemoryStore::default()).repositories();
        let (owner, store) = merchant(&repos, "a@example.com").await;
        let (other, _) = merchant(&repos, "b@example.com").await;
        let service = StoreService::new(repos.stores.as_ref());

        let err = service
            .rename(Some(&other), store.id, "Stolen")
            .await
            .unwrap_err();
        assert!(matches!(err, FaqError::Unauthorized(_)));

        let renamed = service
            .rename(Some(&owner), store.id, "  Acme Two ")
            .await
            .unwrap();
        assert_eq!(renamed.name, "Acme Two");
    }

    #[tokio::test]
    async fn test_rename_validation_and_missing_store() {
        let repos = Arc::new(MemoryStore::default()).repositories();
        let (owner, store) = merchant(&repos, "a@example.com").await;
        let service = StoreService::new(repos.stores.as_ref());

        let err = service.rename(Some(&owner), store.id, "ab").await.unwrap_err();
        let FaqError::ValidationFailed(fields) = err else {
            panic!("expected validation failure");
        };
        assert_eq!(fields.get("name"), Some("must be at least 3 characters"));

        assert!(matches!(
            service.get(StoreId::new(999)).await,
            Err(FaqError::NotFound { .. })
        ));
    }
}
