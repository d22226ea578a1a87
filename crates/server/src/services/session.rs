//! Session tokens and the gate that resolves them to live users.
//!
//! A session is an HS256-signed JWT with a fixed 24-hour lifetime, carried in
//! an HTTP-only cookie (or a bearer header). There is no server-side session
//! store: a token is valid until it expires, unless its user has been deleted,
//! which the gate treats as revocation.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use cookie::{Cookie, SameSite};
use faqdesk_core::models::User;
use faqdesk_core::repository::UserRepository;
use faqdesk_core::{FaqError, Role, UserId};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "faqdesk_session";

/// Token issuer claim.
pub const TOKEN_ISSUER: &str = "faqdesk";

/// Fixed session lifetime in hours.
pub const SESSION_LIFETIME_HOURS: i64 = 24;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Role at issue time; informational, the gate reloads the user
    pub role: Role,
    /// Issuer
    pub iss: String,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

impl Claims {
    fn user_id(&self) -> Result<UserId, TokenError> {
        self.sub
            .parse::<i32>()
            .map(UserId::new)
            .map_err(|_| TokenError::Invalid("subject is not a user id".to_string()))
    }
}

/// Token verification or signing failure.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("session expired")]
    Expired,
    #[error("invalid session token: {0}")]
    Invalid(String),
    #[error("failed to sign session token: {0}")]
    Signing(String),
}

/// A freshly signed token and when it stops being valid.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            lifetime: Duration::hours(SESSION_LIFETIME_HOURS),
        }
    }

    /// Issue a token for `user` valid from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue(&self, user: &User) -> Result<IssuedToken, TokenError> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token as if it were signed at `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue_at(&self, user: &User, issued_at: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expires_at = issued_at + self.lifetime;
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            iss: TOKEN_ISSUER.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Check signature, issuer and expiry.
    ///
    /// # Errors
    ///
    /// `TokenError::Expired` past `exp`, `TokenError::Invalid` otherwise.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

/// Why a presented token did not yield a user.
#[derive(Debug, Error)]
pub enum SessionRejection {
    /// Bad signature, wrong issuer, malformed, or expired.
    #[error(transparent)]
    Token(#[from] TokenError),
    /// Token is genuine but its user no longer exists.
    #[error("user {0} no longer exists")]
    Revoked(UserId),
    /// The user lookup itself failed.
    #[error(transparent)]
    Lookup(FaqError),
}

/// Resolves a session token to a live user.
#[derive(Clone)]
pub struct SessionGate {
    tokens: TokenService,
    users: Arc<dyn UserRepository>,
}

impl SessionGate {
    #[must_use]
    pub fn new(tokens: TokenService, users: Arc<dyn UserRepository>) -> Self {
        Self { tokens, users }
    }

    #[must_use]
    pub const fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Verify `token` and load its subject. Every failure is terminal for the
    /// request; nothing here retries.
    ///
    /// # Errors
    ///
    /// See [`SessionRejection`].
    pub async fn resolve(&self, token: &str) -> Result<User, SessionRejection> {
        let claims = self.tokens.verify(token)?;
        let user_id = claims.user_id()?;

        match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => {
                tracing::info!(user_id = %user_id, "session presented for deleted user");
                Err(SessionRejection::Revoked(user_id))
            }
            Err(err) => Err(SessionRejection::Lookup(err)),
        }
    }
}

/// Cookie carrying a freshly issued session.
#[must_use]
pub fn session_cookie(issued: &IssuedToken, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, issued.token.clone()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::hours(SESSION_LIFETIME_HOURS))
        .build()
}

/// Cookie that makes the client drop its session.
#[must_use]
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::ZERO)
        .build()
}

/// Find the session token in a `Cookie` header value.
#[must_use]
pub fn token_from_cookie_header(header: &str) -> Option<String> {
    Cookie::split_parse(header)
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE_NAME && !c.value().is_empty())
        .map(|c| c.value().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use faqdesk_core::models::{Credentials, NewUser, Store};
    use faqdesk_core::{Email, FaqResult};

    use super::*;

    fn secret() -> SecretString {
        SecretString::from("k8#Lq2!vZ9@wR4$tY7&uP1*oM6^nB3%x")
    }

    fn admin() -> User {
        User {
            id: UserId::new(1),
            email: Email::parse("admin@example.com").unwrap(),
            role: Role::Admin,
        }
    }

    struct FixedUsers(Option<User>);

    #[async_trait]
    impl UserRepository for FixedUsers {
        async fn find_by_id(&self, id: UserId) -> FaqResult<Option<User>> {
            Ok(self.0.clone().filter(|u| u.id == id))
        }
        async fn find_credentials(&self, _email: &Email) -> FaqResult<Option<Credentials>> {
            Ok(None)
        }
        async fn create(&self, _user: NewUser) -> FaqResult<User> {
            Err(FaqError::internal("read-only"))
        }
        async fn create_merchant(&self, _user: NewUser, _name: &str) -> FaqResult<(User, Store)> {
            Err(FaqError::internal("read-only"))
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = TokenService::new(&secret());
        let issued = tokens.issue(&admin()).unwrap();
        let claims = tokens.verify(&issued.token).unwrap();
        assert_eq!(claims.sub, "1");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.exp - claims.iat, SESSION_LIFETIME_HOURS * 3600);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tokens = TokenService::new(&secret());
        let issued = tokens
            .issue_at(&admin(), Utc::now() - Duration::hours(25))
            .unwrap();
        assert!(matches!(tokens.verify(&issued.token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_token_signed_with_other_key_is_rejected() {
        let issued = TokenService::new(&SecretString::from("another-key-entirely-9f8e7d6c5b4a3"))
            .issue(&admin())
            .unwrap();
        let tokens = TokenService::new(&secret());
        assert!(matches!(tokens.verify(&issued.token), Err(TokenError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_gate_resolves_live_user() {
        let tokens = TokenService::new(&secret());
        let issued = tokens.issue(&admin()).unwrap();
        let gate = SessionGate::new(tokens, Arc::new(FixedUsers(Some(admin()))));
        assert_eq!(gate.resolve(&issued.token).await.unwrap(), admin());
    }

    #[tokio::test]
    async fn test_gate_treats_deleted_user_as_revoked() {
        let tokens = TokenService::new(&secret());
        let issued = tokens.issue(&admin()).unwrap();
        let gate = SessionGate::new(tokens, Arc::new(FixedUsers(None)));
        assert!(matches!(
            gate.resolve(&issued.token).await,
            Err(SessionRejection::Revoked(id)) if id == UserId::new(1)
        ));
    }

    #[test]
    fn test_cookie_attributes() {
        let tokens = TokenService::new(&secret());
        let issued = tokens.issue(&admin()).unwrap();
        let cookie = session_cookie(&issued, true);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));

        let removal = removal_cookie(false).to_string();
        assert!(removal.contains("Max-Age=0"));
    }

    #[test]
    fn test_token_from_cookie_header() {
        let header = format!("theme=dark; {SESSION_COOKIE_NAME}=abc.def.ghi; lang=en");
        assert_eq!(token_from_cookie_header(&header).as_deref(), Some("abc.def.ghi"));
        assert_eq!(token_from_cookie_header("theme=dark"), None);
        assert_eq!(token_from_cookie_header(&format!("{SESSION_COOKIE_NAME}=")), None);
    }
}
