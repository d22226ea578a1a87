//! Who may do what.
//!
//! Pure decision functions; no lookups happen here. Callers load the store and
//! FAQ first and describe the target as a [`Resource`]. Ownership is checked
//! at every layer: a FAQ addressed through a store must carry that store's id
//! before the actor's relationship to the store is even considered.

use crate::error::{FaqError, FaqResult};
use crate::models::{Store, User};
use crate::types::StoreId;

/// Operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    #[must_use]
    pub const fn is_mutation(self) -> bool {
        !matches!(self, Self::Read)
    }
}

/// Target of an operation.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    /// A FAQ category.
    Category,
    /// A global FAQ or one of its translations.
    GlobalFaq,
    /// A store-scoped FAQ (or its translations) addressed through `store`.
    /// `faq_store` is the FAQ's own store id; `None` when the FAQ is being
    /// created.
    StoreFaq {
        store: &'a Store,
        faq_store: Option<StoreId>,
    },
    /// A store's own profile.
    StoreProfile(&'a Store),
    /// An account of any role created by someone other than its owner.
    Account,
}

/// Decide whether `actor` may perform `action` on `resource`.
///
/// # Errors
///
/// Returns `FaqError::Unauthorized` when the operation is not permitted.
pub fn authorize(actor: Option<&User>, action: Action, resource: Resource<'_>) -> FaqResult<()> {
    if !action.is_mutation() {
        return Ok(());
    }

    let actor = actor.ok_or_else(|| FaqError::unauthorized("authentication required"))?;

    match resource {
        Resource::Category | Resource::GlobalFaq | Resource::Account => {
            if actor.is_admin() {
                Ok(())
            } else {
                Err(FaqError::unauthorized("admin only"))
            }
        }
        Resource::StoreFaq { store, faq_store } => {
            if faq_store.is_some_and(|id| id != store.id) {
                return Err(FaqError::unauthorized("faq does not belong to this store"));
            }
            if actor.is_admin() || owns(actor, store) {
                Ok(())
            } else {
                Err(FaqError::unauthorized("not the owner of this store"))
            }
        }
        Resource::StoreProfile(store) => {
            if owns(actor, store) {
                Ok(())
            } else {
                Err(FaqError::unauthorized("not the owner of this store"))
            }
        }
    }
}

fn owns(actor: &User, store: &Store) -> bool {
    actor.is_merchant() && store.is_owned_by(actor.id)
}
