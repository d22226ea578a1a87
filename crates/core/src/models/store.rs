//! Merchant stores.

use serde::{Deserialize, Serialize};

use crate::types::{StoreId, UserId};
use crate::validation::FieldErrors;

pub const MIN_STORE_NAME_CHARS: usize = 3;
pub const MAX_STORE_NAME_CHARS: usize = 30;

/// A merchant's store. Exactly one per merchant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Store {
    pub id: StoreId,
    pub merchant_id: UserId,
    pub name: String,
}

impl Store {
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.merchant_id == user
    }
}

/// Validate a store name under `key`, returning the trimmed name.
pub fn check_store_name(raw: &str, key: &str, errors: &mut FieldErrors) -> String {
    let name = raw.trim();
    let chars = name.chars().count();
    errors.check(!name.is_empty(), key, "required");
    errors.check(
        chars >= MIN_STORE_NAME_CHARS,
        key,
        "must be at least 3 characters",
    );
    errors.check(
        chars <= MAX_STORE_NAME_CHARS,
        key,
        "must be at most 30 characters",
    );
    name.to_owned()
}
