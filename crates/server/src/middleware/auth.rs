//! Session extraction for route handlers.
//!
//! The token is read from an `Authorization: Bearer` header or, failing
//! that, the session cookie, then resolved through the [`SessionGate`].
//!
//! [`SessionGate`]: crate::services::session::SessionGate

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, header, request::Parts},
};
use faqdesk_core::FaqError;
use faqdesk_core::models::User;

use crate::error::{AppError, set_sentry_user};
use crate::services::session::{SessionRejection, removal_cookie, token_from_cookie_header};
use crate::state::AppState;

/// Extractor that resolves the caller, if any.
///
/// No token at all yields `None` and leaves the decision to the
/// authorization policy. A token that is present but invalid, expired or
/// revoked rejects the request with 401; a revoked session also clears the
/// client's cookie.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
///     match user {
///         Some(u) => format!("Hello, {}!", u.email),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalAuth(pub Option<User>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let Some(token) = session_token(&parts.headers) else {
            return Ok(Self(None));
        };

        match state.sessions().resolve(&token).await {
            Ok(user) => {
                tracing::Span::current().record("user_id", user.id.as_i32());
                set_sentry_user(&user.id, Some(user.email.as_str()));
                Ok(Self(Some(user)))
            }
            Err(SessionRejection::Token(err)) => {
                tracing::debug!(error = %err, "Rejected session token");
                Err(FaqError::unauthorized(err.to_string()).into())
            }
            Err(SessionRejection::Revoked(_)) => Err(AppError::SessionRevoked(
                clear_session_header(state.config().secure_cookies())?,
            )),
            Err(SessionRejection::Lookup(err)) => Err(err.into()),
        }
    }
}

/// Bearer token first, then the session cookie.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from);

    bearer.or_else(|| {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(token_from_cookie_header)
    })
}

/// `Set-Cookie` value that removes the session cookie.
///
/// # Errors
///
/// Returns `Internal` if the cookie does not form a valid header value.
pub fn clear_session_header(secure: bool) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(&removal_cookie(secure).to_string())
        .map_err(|e| FaqError::internal(format!("session cookie header: {e}")).into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_takes_precedence_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("faqdesk_session=from-cookie"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("from-cookie"));

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_no_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn test_clear_session_header_expires_cookie() {
        let value = clear_session_header(true).unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("faqdesk_session="));
        assert!(value.contains("Max-Age=0"));
        assert!(value.contains("Secure"));
    }
}
