//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use faqdesk_core::FaqError;
use serde_json::json;
use thiserror::Error;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Domain outcome (authorization, lookup, conflict, validation, internal).
    #[error(transparent)]
    Domain(#[from] FaqError),

    /// Malformed request body, path or query.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Client exceeded its request budget.
    #[error("Rate limited")]
    RateLimited {
        /// Seconds until a token is available, if it ever will be.
        retry_after: Option<u64>,
    },

    /// Valid token whose user no longer exists. Carries the `Set-Cookie`
    /// value that clears the client's session cookie.
    #[error("Unauthorized: session revoked")]
    SessionRevoked(HeaderValue),
}

impl AppError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Domain(err) => match err {
                FaqError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                FaqError::NotFound { .. } => StatusCode::NOT_FOUND,
                FaqError::Duplicate(_) | FaqError::EditConflict(_) => StatusCode::CONFLICT,
                FaqError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
                FaqError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::SessionRevoked(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry; the detail never leaves the process
        if let Self::Domain(FaqError::Internal(_)) = &self {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = match &self {
            Self::Domain(FaqError::Internal(_)) => json!({ "error": "internal server error" }),
            Self::Domain(FaqError::ValidationFailed(fields)) => {
                json!({ "error": "validation failed", "fields": fields })
            }
            Self::RateLimited { .. } => json!({ "error": "rate limit exceeded" }),
            other => json!({ "error": other.to_string() }),
        };

        let mut response = (status, Json(body)).into_response();
        match self {
            Self::RateLimited {
                retry_after: Some(secs),
            } => {
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(secs));
            }
            Self::SessionRevoked(clear) => {
                response.headers_mut().insert(header::SET_COOKIE, clear);
            }
            _ => {}
        }
        response
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
