//! End-to-end tests for the faqdesk API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p faqdesk-integration-tests
//! ```
//!
//! Each test builds the full router (rate limiter, session gate, ambient
//! layers) over in-memory repositories and drives it with
//! `tower::ServiceExt::oneshot`, so no database or listener is needed.
//!
//! # Test Files
//!
//! - `accounts` - Signup, login, logout, admin account creation
//! - `catalog` - Categories and global FAQs
//! - `store_faqs` - Store FAQs, translations and tenant isolation
//! - `sessions` - Token transport, expiry and revocation
//! - `rate_limit` - Per-client admission
//! - `errors` - Error rendering and ambient headers

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use faqdesk_core::models::{NewUser, User};
use faqdesk_core::repository::{Repositories, UserRepository};
use faqdesk_core::{Email, Role};
use faqdesk_server::config::{LogFormat, RateLimitConfig, ServerConfig};
use faqdesk_server::db::memory::MemoryStore;
use faqdesk_server::services::auth::hash_password;
use faqdesk_server::{AppState, router};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Password satisfying the signup policy.
pub const PASSWORD: &str = "S3cure!pass";

/// A budget no test exhausts by accident.
#[must_use]
pub fn generous_rate_limit() -> RateLimitConfig {
    RateLimitConfig {
        per_second: 1_000.0,
        burst: 1_000,
        ..RateLimitConfig::default()
    }
}

#[must_use]
pub fn test_config(rate_limit: RateLimitConfig) -> ServerConfig {
    ServerConfig {
        database_url: SecretString::from("postgres://unused"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:8080".to_string(),
        jwt_secret: SecretString::from("kV9#pQ2$wL7!mZ4&nR8*tY3@bX6^cF1%"),
        rate_limit,
        request_timeout: Duration::from_secs(5),
        log_format: LogFormat::Pretty,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// The router plus handles for arranging state behind it.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    router: Router,
}

/// A fully buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The `Set-Cookie` header, if any.
    #[must_use]
    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        Self::with_rate_limit(generous_rate_limit())
    }

    #[must_use]
    pub fn with_rate_limit(rate_limit: RateLimitConfig) -> Self {
        let store = Arc::new(MemoryStore::default());
        let repos = store.clone().repositories();
        Self::build(store, repos, rate_limit)
    }

    /// Serve `repos` instead of the in-memory store's own repositories.
    #[must_use]
    pub fn with_repositories(repos: Repositories) -> Self {
        Self::build(Arc::new(MemoryStore::default()), repos, generous_rate_limit())
    }

    fn build(store: Arc<MemoryStore>, repos: Repositories, rate_limit: RateLimitConfig) -> Self {
        let state = AppState::new(test_config(rate_limit), repos, None);
        let router = router(state.clone());
        Self {
            store,
            state,
            router,
        }
    }

    /// Send a prepared request.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Send a request with an optional bearer token and JSON body.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        };
        self.send(request.unwrap()).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.call(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.call(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.call(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.call(Method::DELETE, uri, token, None).await
    }

    /// Sign a session token for `user` directly.
    #[must_use]
    pub fn token_for(&self, user: &User) -> String {
        self.state.sessions().tokens().issue(user).unwrap().token
    }

    /// Insert an admin account and return it with a session token.
    pub async fn admin(&self, email: &str) -> (User, String) {
        let user = self
            .state
            .repos()
            .users
            .create(NewUser {
                email: Email::parse(email).unwrap(),
                role: Role::Admin,
                password_hash: hash_password(PASSWORD).unwrap(),
            })
            .await
            .unwrap();
        let token = self.token_for(&user);
        (user, token)
    }

    /// Register a merchant through the API and log in.
    /// Returns `(token, store_id)`.
    pub async fn merchant(&self, email: &str, store_name: &str) -> (String, i64) {
        let signup = self
            .post(
                "/api/v1/signup/merchant",
                None,
                json!({ "email": email, "password": PASSWORD, "store_name": store_name }),
            )
            .await;
        assert_eq!(signup.status, StatusCode::CREATED, "{:?}", signup.body);
        let store_id = signup.body["store_id"].as_i64().unwrap();
        (self.login(email).await, store_id)
    }

    /// Register a customer through the API and log in.
    pub async fn customer(&self, email: &str) -> String {
        let signup = self
            .post(
                "/api/v1/signup/customer",
                None,
                json!({ "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(signup.status, StatusCode::CREATED, "{:?}", signup.body);
        self.login(email).await
    }

    pub async fn login(&self, email: &str) -> String {
        let login = self
            .post(
                "/api/v1/login",
                None,
                json!({ "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(login.status, StatusCode::OK, "{:?}", login.body);
        login.body["token"].as_str().unwrap().to_string()
    }

    /// Create a category as `admin_token`.
    pub async fn category(&self, admin_token: &str, name: &str) {
        let created = self
            .post(
                "/api/v1/faq-categories",
                Some(admin_token),
                json!({ "name": name }),
            )
            .await;
        assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
    }
}
