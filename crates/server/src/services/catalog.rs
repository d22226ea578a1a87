//! FAQ categories.

use faqdesk_core::models::{Category, User, check_category_name, normalize_category_name};
use faqdesk_core::policy::{Action, Resource, authorize};
use faqdesk_core::repository::CategoryRepository;
use faqdesk_core::{FaqError, FaqResult, FieldErrors};

/// Category management. Reads are public; writes are admin only.
pub struct CategoryService<'a> {
    categories: &'a dyn CategoryRepository,
}

impl<'a> CategoryService<'a> {
    #[must_use]
    pub const fn new(categories: &'a dyn CategoryRepository) -> Self {
        Self { categories }
    }

    /// Every live category, ordered by name.
    ///
    /// # Errors
    ///
    /// `Internal` if the repository fails.
    pub async fn list(&self) -> FaqResult<Vec<Category>> {
        self.categories.list().await
    }

    /// Look up a live category by name, in any case.
    ///
    /// # Errors
    ///
    /// `NotFound` if no live category has this name.
    pub async fn find(&self, name: &str) -> FaqResult<Category> {
        let name = normalize_category_name(name);
        self.categories
            .find_by_name(&name)
            .await?
            .ok_or_else(|| FaqError::not_found("category", name))
    }

    /// # Errors
    ///
    /// `Unauthorized`, `ValidationFailed`, or `Duplicate` if a live category
    /// already has this name.
    pub async fn create(&self, actor: Option<&User>, name: &str) -> FaqResult<Category> {
        authorize(actor, Action::Create, Resource::Category)?;
        let name = validated_name(name)?;
        let category = self.categories.create(&name).await?;
        tracing::info!(category_id = %category.id, name = %category.name, "category created");
        Ok(category)
    }

    /// # Errors
    ///
    /// `Unauthorized`, `NotFound`, `ValidationFailed` or `Duplicate`.
    pub async fn rename(
        &self,
        actor: Option<&User>,
        current: &str,
        new_name: &str,
    ) -> FaqResult<Category> {
        authorize(actor, Action::Update, Resource::Category)?;
        let new_name = validated_name(new_name)?;
        let category = self.find(current).await?;
        self.categories.rename(category.id, &new_name).await
    }

    /// Soft-delete a category together with every FAQ filed under it.
    ///
    /// # Errors
    ///
    /// `Unauthorized` or `NotFound`.
    pub async fn delete(&self, actor: Option<&User>, name: &str) -> FaqResult<()> {
        authorize(actor, Action::Delete, Resource::Category)?;
        let category = self.find(name).await?;
        self.categories.soft_delete(category.id).await?;
        tracing::info!(category_id = %category.id, "category deleted");
        Ok(())
    }
}

fn validated_name(raw: &str) -> FaqResult<String> {
    let mut errors = FieldErrors::new();
    let name = check_category_name(raw, &mut errors);
    errors.into_result()?;
    Ok(name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use faqdesk_core::{Email, Role, UserId};

    use super::*;
    use crate::db::memory::MemoryStore;

    fn user(role: Role) -> User {
        User {
            id: UserId::new(1),
            email: Email::parse("u@example.com").unwrap(),
            role,
        }
    }

    #[tokio::test]
    async fn test_names_are_unique_in_any_case() {
        let repos = Arc::new(MemoryStore::default()).repositories();
        let service = CategoryService::new(repos.categories.as_ref());
        let admin = user(Role::Admin);

        let created = service.create(Some(&admin), "Billing").await.unwrap();
        assert_eq!(created.name, "billing");

        let err = service.create(Some(&admin), " BILLING ").await.unwrap_err();
        assert!(matches!(err, FaqError::Duplicate(_)));
        assert_eq!(service.find("BiLLing").await.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn test_writes_are_admin_only() {
        let repos = Arc::new(MemoryStore::default()).repositories();
        let service = CategoryService::new(repos.categories.as_ref());

        for actor in [None, Some(user(Role::Merchant)), Some(user(Role::Customer))] {
            let err = service.create(actor.as_ref(), "billing").await.unwrap_err();
            assert!(matches!(err, FaqError::Unauthorized(_)));
        }
    }

    #[tokio::test]
    async fn test_rename_and_delete() {
        let repos = Arc::new(MemoryStore::default()).repositories();
        let service = CategoryService::new(repos.categories.as_ref());
        let admin = user(Role::Admin);
        service.create(Some(&admin), "billing").await.unwrap();
        service.create(Some(&admin), "shipping").await.unwrap();

        let err = service
            .rename(Some(&admin), "billing", "Shipping")
            .await
            .unwrap_err();
        assert!(matches!(err, FaqError::Duplicate(_)));

        let renamed = service
            .rename(Some(&admin), "billing", "payments")
            .await
            .unwrap();
        assert_eq!(renamed.name, "payments");

        service.delete(Some(&admin), "payments").await.unwrap();
        assert!(matches!(
            service.find("payments").await,
            Err(FaqError::NotFound { .. })
        ));
        // A deleted name can be reused
        service.create(Some(&admin), "payments").await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_name() {
        let repos = Arc::new(MemoryStore::default()).repositories();
        let service = CategoryService::new(repos.categories.as_ref());
        let err = service
            .create(Some(&user(Role::Admin)), "a-very-long-category-name")
            .await
            .unwrap_err();
        let FaqError::ValidationFailed(fields) = err else {
            panic!("expected validation failure");
        };
        assert_eq!(
            fields.get("category_name"),
            Some("must not be more than 20 bytes")
        );
    }
}
