//! FAQ categories.

use serde::{Deserialize, Serialize};

use crate::types::CategoryId;
use crate::validation::FieldErrors;

pub const MAX_CATEGORY_NAME_BYTES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Names are unique case-insensitively, so they are stored and looked up in
/// this form.
#[must_use]
pub fn normalize_category_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Validate and normalize a category name, recording failures under
/// `category_name`.
pub fn check_category_name(raw: &str, errors: &mut FieldErrors) -> String {
    let name = normalize_category_name(raw);
    errors.check(!name.is_empty(), "category_name", "required");
    errors.check(
        name.len() <= MAX_CATEGORY_NAME_BYTES,
        "category_name",
        "must not be more than 20 bytes",
    );
    name
}
