//! In-process repositories.
//!
//! Backs the test suites and local experiments. All tables sit behind one
//! mutex, so every trait method is atomic, matching the transactional
//! guarantees of the Postgres implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use faqdesk_core::consistency::{NewFaq, TranslationChange};
use faqdesk_core::models::{
    Category, Credentials, Faq, FaqScope, NewUser, Store, Translation, TranslationDraft, User,
};
use faqdesk_core::repository::{
    CategoryRepository, FaqRepository, Repositories, StoreRepository, TranslationRepository,
    UserRepository,
};
use faqdesk_core::{
    CategoryId, Email, FaqError, FaqId, FaqResult, Language, StoreId, TranslationId, UserId,
};
use parking_lot::Mutex;

/// All repositories over shared in-memory tables.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    next_id: i32,
    users: BTreeMap<UserId, (User, String)>,
    stores: BTreeMap<StoreId, Store>,
    categories: BTreeMap<CategoryId, (Category, bool)>,
    faqs: BTreeMap<FaqId, FaqRow>,
    translations: BTreeMap<TranslationId, Translation>,
}

struct FaqRow {
    category_id: CategoryId,
    scope: FaqScope,
    default_language: Language,
    version: i32,
    deleted: bool,
}

impl MemoryStore {
    /// Expose this store through every repository trait.
    #[must_use]
    pub fn repositories(self: Arc<Self>) -> Repositories {
        Repositories {
            users: self.clone(),
            stores: self.clone(),
            categories: self.clone(),
            faqs: self.clone(),
            translations: self,
        }
    }

    /// Remove a user outright, as an external account deletion would.
    pub fn delete_user(&self, id: UserId) -> bool {
        self.tables.lock().users.remove(&id).is_some()
    }
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn live_category(&self, id: CategoryId) -> Option<&Category> {
        self.categories
            .get(&id)
            .filter(|(_, deleted)| !deleted)
            .map(|(c, _)| c)
    }

    fn category_name_taken(&self, name: &str, except: Option<CategoryId>) -> bool {
        self.categories
            .values()
            .any(|(c, deleted)| !deleted && c.name == name && Some(c.id) != except)
    }

    fn load_faq(&self, id: FaqId) -> Option<Faq> {
        let row = self.faqs.get(&id).filter(|r| !r.deleted)?;
        let category = self.live_category(row.category_id)?.clone();
        let translations = self
            .translations
            .values()
            .filter(|t| t.faq_id == id)
            .cloned()
            .collect();
        Some(Faq {
            id,
            category,
            scope: row.scope,
            default_language: row.default_language,
            version: row.version,
            translations,
        })
    }

    fn load_faqs(&self, keep: impl Fn(&FaqRow) -> bool) -> Vec<Faq> {
        let ids: Vec<FaqId> = self
            .faqs
            .iter()
            .filter(|(_, row)| !row.deleted && keep(row))
            .map(|(id, _)| *id)
            .collect();
        ids.into_iter().filter_map(|id| self.load_faq(id)).collect()
    }

    /// Bump the FAQ's version if it still matches `expected`.
    fn bump_version(&mut self, faq: FaqId, expected: i32) -> FaqResult<()> {
        match self.faqs.get_mut(&faq).filter(|r| !r.deleted) {
            Some(row) if row.version == expected => {
                row.version += 1;
                Ok(())
            }
            Some(_) => Err(FaqError::conflict(format!(
                "faq {faq} was modified concurrently"
            ))),
            None => Err(FaqError::not_found("faq", faq)),
        }
    }

    fn language_taken(&self, faq: FaqId, language: Language, except: Option<TranslationId>) -> bool {
        self.translations
            .values()
            .any(|t| t.faq_id == faq && t.language == language && Some(t.id) != except)
    }

    fn insert_user(&mut self, user: NewUser) -> FaqResult<User> {
        if self.users.values().any(|(u, _)| u.email == user.email) {
            return Err(FaqError::duplicate(format!("email {}", user.email)));
        }
        let created = User {
            id: UserId::new(self.next_id()),
            email: user.email,
            role: user.role,
        };
        self.users
            .insert(created.id, (created.clone(), user.password_hash));
        Ok(created)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> FaqResult<Option<User>> {
        Ok(self.tables.lock().users.get(&id).map(|(u, _)| u.clone()))
    }

    async fn find_credentials(&self, email: &Email) -> FaqResult<Option<Credentials>> {
        Ok(self
            .tables
            .lock()
            .users
            .values()
            .find(|(u, _)| &u.email == email)
            .map(|(user, hash)| Credentials {
                user: user.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn create(&self, user: NewUser) -> FaqResult<User> {
        self.tables.lock().insert_user(user)
    }

    async fn create_merchant(&self, user: NewUser, store_name: &str) -> FaqResult<(User, Store)> {
        let mut tables = self.tables.lock();
        let user = tables.insert_user(user)?;
        let store = Store {
            id: StoreId::new(tables.next_id()),
            merchant_id: user.id,
            name: store_name.to_owned(),
        };
        tables.stores.insert(store.id, store.clone());
        Ok((user, store))
    }
}

#[async_trait]
impl StoreRepository for MemoryStore {
    async fn find(&self, id: StoreId) -> FaqResult<Option<Store>> {
        Ok(self.tables.lock().stores.get(&id).cloned())
    }

    async fn find_by_merchant(&self, merchant: UserId) -> FaqResult<Option<Store>> {
        Ok(self
            .tables
            .lock()
            .stores
            .values()
            .find(|s| s.merchant_id == merchant)
            .cloned())
    }

    async fn rename(&self, id: StoreId, name: &str) -> FaqResult<Store> {
        let mut tables = self.tables.lock();
        let store = tables
            .stores
            .get_mut(&id)
            .ok_or_else(|| FaqError::not_found("store", id))?;
        name.clone_into(&mut store.name);
        Ok(store.clone())
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn list(&self) -> FaqResult<Vec<Category>> {
        let tables = self.tables.lock();
        let mut categories: Vec<Category> = tables
            .categories
            .values()
            .filter(|(_, deleted)| !deleted)
            .map(|(c, _)| c.clone())
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_by_name(&self, name: &str) -> FaqResult<Option<Category>> {
        Ok(self
            .tables
            .lock()
            .categories
            .values()
            .find(|(c, deleted)| !deleted && c.name == name)
            .map(|(c, _)| c.clone()))
    }

    async fn create(&self, name: &str) -> FaqResult<Category> {
        let mut tables = self.tables.lock();
        if tables.category_name_taken(name, None) {
            return Err(FaqError::duplicate(format!("category {name}")));
        }
        let category = Category {
            id: CategoryId::new(tables.next_id()),
            name: name.to_owned(),
        };
        tables
            .categories
            .insert(category.id, (category.clone(), false));
        Ok(category)
    }

    async fn rename(&self, id: CategoryId, name: &str) -> FaqResult<Category> {
        let mut tables = self.tables.lock();
        if tables.live_category(id).is_none() {
            return Err(FaqError::not_found("category", id));
        }
        if tables.category_name_taken(name, Some(id)) {
            return Err(FaqError::duplicate(format!("category {name}")));
        }
        let (category, _) = tables
            .categories
            .get_mut(&id)
            .ok_or_else(|| FaqError::not_found("category", id))?;
        name.clone_into(&mut category.name);
        Ok(category.clone())
    }

    async fn soft_delete(&self, id: CategoryId) -> FaqResult<()> {
        let mut tables = self.tables.lock();
        match tables.categories.get_mut(&id) {
            Some((_, deleted)) if !*deleted => *deleted = true,
            _ => return Err(FaqError::not_found("category", id)),
        }
        for row in tables.faqs.values_mut().filter(|r| r.category_id == id) {
            row.deleted = true;
        }
        Ok(())
    }
}

#[async_trait]
impl FaqRepository for MemoryStore {
    async fn find(&self, id: FaqId) -> FaqResult<Option<Faq>> {
        Ok(self.tables.lock().load_faq(id))
    }

    async fn list_global(&self, category: CategoryId) -> FaqResult<Vec<Faq>> {
        Ok(self
            .tables
            .lock()
            .load_faqs(|row| row.category_id == category && row.scope.is_global()))
    }

    async fn list_by_store(&self, store: StoreId) -> FaqResult<Vec<Faq>> {
        Ok(self
            .tables
            .lock()
            .load_faqs(|row| row.scope == FaqScope::Store(store)))
    }

    async fn create(&self, faq: NewFaq) -> FaqResult<Faq> {
        let mut tables = self.tables.lock();
        if tables.live_category(faq.category_id).is_none() {
            return Err(FaqError::not_found("category", faq.category_id));
        }
        if let FaqScope::Store(store) = faq.scope
            && !tables.stores.contains_key(&store)
        {
            return Err(FaqError::not_found("store", store));
        }

        let id = FaqId::new(tables.next_id());
        tables.faqs.insert(
            id,
            FaqRow {
                category_id: faq.category_id,
                scope: faq.scope,
                default_language: faq.default_language,
                version: 1,
                deleted: false,
            },
        );
        let translation = Translation {
            id: TranslationId::new(tables.next_id()),
            faq_id: id,
            language: faq.first.language,
            question: faq.first.question,
            answer: faq.first.answer,
        };
        tables.translations.insert(translation.id, translation);

        tables
            .load_faq(id)
            .ok_or_else(|| FaqError::internal("created faq vanished"))
    }

    async fn update(&self, faq: &Faq) -> FaqResult<Faq> {
        let mut tables = self.tables.lock();
        if tables.live_category(faq.category.id).is_none() {
            return Err(FaqError::not_found("category", faq.category.id));
        }
        if !tables.language_taken(faq.id, faq.default_language, None) {
            return Err(FaqError::conflict("default language has no translation"));
        }
        tables.bump_version(faq.id, faq.version)?;
        if let Some(row) = tables.faqs.get_mut(&faq.id) {
            row.category_id = faq.category.id;
            row.scope = faq.scope;
            row.default_language = faq.default_language;
        }
        tables
            .load_faq(faq.id)
            .ok_or_else(|| FaqError::not_found("faq", faq.id))
    }

    async fn soft_delete(&self, id: FaqId) -> FaqResult<()> {
        match self.tables.lock().faqs.get_mut(&id) {
            Some(row) if !row.deleted => {
                row.deleted = true;
                row.version += 1;
                Ok(())
            }
            _ => Err(FaqError::not_found("faq", id)),
        }
    }
}

#[async_trait]
impl TranslationRepository for MemoryStore {
    async fn insert(
        &self,
        faq: FaqId,
        expected_version: i32,
        draft: TranslationDraft,
    ) -> FaqResult<Translation> {
        let mut tables = self.tables.lock();
        if tables.language_taken(faq, draft.language, None) {
            return Err(FaqError::duplicate(format!(
                "translation {} for faq {faq}",
                draft.language
            )));
        }
        tables.bump_version(faq, expected_version)?;
        let translation = Translation {
            id: TranslationId::new(tables.next_id()),
            faq_id: faq,
            language: draft.language,
            question: draft.question,
            answer: draft.answer,
        };
        tables
            .translations
            .insert(translation.id, translation.clone());
        Ok(translation)
    }

    async fn update(
        &self,
        faq: FaqId,
        expected_version: i32,
        change: TranslationChange,
    ) -> FaqResult<Translation> {
        let mut tables = self.tables.lock();
        if tables.language_taken(faq, change.draft.language, Some(change.id)) {
            return Err(FaqError::duplicate(format!(
                "translation {} for faq {faq}",
                change.draft.language
            )));
        }
        if !tables
            .translations
            .get(&change.id)
            .is_some_and(|t| t.faq_id == faq)
        {
            return Err(FaqError::not_found("translation", change.id));
        }
        tables.bump_version(faq, expected_version)?;
        let translation = tables
            .translations
            .get_mut(&change.id)
            .ok_or_else(|| FaqError::not_found("translation", change.id))?;
        translation.language = change.draft.language;
        translation.question = change.draft.question;
        translation.answer = change.draft.answer;
        Ok(translation.clone())
    }

    async fn delete(&self, faq: FaqId, expected_version: i32, id: TranslationId) -> FaqResult<()> {
        let mut tables = self.tables.lock();
        let default = tables
            .faqs
            .get(&faq)
            .map(|row| row.default_language)
            .ok_or_else(|| FaqError::not_found("faq", faq))?;
        match tables.translations.get(&id) {
            Some(t) if t.faq_id == faq && t.language == default => {
                return Err(FaqError::conflict(
                    "the default-language translation cannot be deleted",
                ));
            }
            Some(t) if t.faq_id == faq => {}
            _ => return Err(FaqError::not_found("translation", id)),
        }
        tables.bump_version(faq, expected_version)?;
        tables.translations.remove(&id);
        Ok(())
    }
}
