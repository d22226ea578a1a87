//! Closed error taxonomy for domain operations.
//!
//! Storage adapters translate their failures into [`FaqError`] before the
//! value reaches policy or consistency code, so nothing above the repository
//! layer ever inspects a driver error.

use thiserror::Error;

use crate::validation::FieldErrors;

/// Outcome of a failed domain operation.
#[derive(Debug, Clone, Error)]
pub enum FaqError {
    /// Missing or invalid session, or authenticated but not permitted.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Resource absent or soft-deleted.
    #[error("{resource} not found: {key}")]
    NotFound {
        resource: &'static str,
        key: String,
    },

    /// Unique constraint violated (category name, FAQ/language pair, email).
    #[error("already exists: {0}")]
    Duplicate(String),

    /// Write rejected because it would break an invariant, or an optimistic
    /// update matched zero rows.
    #[error("edit conflict: {0}")]
    EditConflict(String),

    /// One or more fields failed validation.
    #[error("validation failed: {0}")]
    ValidationFailed(FieldErrors),

    /// Unexpected collaborator failure. Detail is for logs only.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FaqError {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized(reason.into())
    }

    pub fn not_found(resource: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            resource,
            key: key.to_string(),
        }
    }

    pub fn duplicate(what: impl Into<String>) -> Self {
        Self::Duplicate(what.into())
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::EditConflict(reason.into())
    }

    pub fn internal(detail: impl ToString) -> Self {
        Self::Internal(detail.to_string())
    }

    /// Single-field validation failure.
    pub fn invalid(key: &str, message: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(key, message);
        Self::ValidationFailed(errors)
    }

    /// Whether the detail may be shown to the caller verbatim.
    #[must_use]
    pub const fn is_client_safe(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }
}

/// Result alias for domain operations.
pub type FaqResult<T> = Result<T, FaqError>;
