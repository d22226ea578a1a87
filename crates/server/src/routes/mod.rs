//! HTTP route handlers for the FAQ API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (database ping)
//!
//! # Accounts (/api/v1)
//! POST /signup/customer        - Register a customer
//! POST /signup/merchant        - Register a merchant and their store
//! POST /login                  - Start a session
//! POST /logout                 - Clear the session cookie
//! POST /admin/users            - Admin creates an account
//!
//! # Categories
//! GET    /faq-categories                 - List categories
//! POST   /faq-categories                 - Create (admin)
//! PUT    /faq-categories/{category}      - Rename (admin)
//! DELETE /faq-categories/{category}      - Delete with its FAQs (admin)
//!
//! # Global FAQs
//! GET    /faq-categories/{category}/faqs
//! POST   /faq-categories/{category}/faqs
//! GET    /faq-categories/{category}/faqs/{faq_id}
//! PUT    /faq-categories/{category}/faqs/{faq_id}
//! DELETE /faq-categories/{category}/faqs/{faq_id}
//! GET    /faq-categories/{category}/faqs/{faq_id}/translations
//! POST   /faq-categories/{category}/faqs/{faq_id}/translations
//! GET    /faq-categories/{category}/faqs/{faq_id}/translations/{language}
//! PUT    /faq-categories/{category}/faqs/{faq_id}/translations/{language}
//! DELETE /faq-categories/{category}/faqs/{faq_id}/translations/{language}
//!
//! # Stores
//! GET  /stores/{store_id}
//! PUT  /stores/{store_id}
//!
//! # Store FAQs: the global FAQ tree rooted at /stores/{store_id}/faqs
//! ```

pub mod auth;
pub mod categories;
pub mod extract;
pub mod faqs;
pub mod health;
pub mod stores;
pub mod views;

use std::time::Duration;

use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::middleware::{rate_limit_middleware, request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Create the account routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup/customer", post(auth::signup_customer))
        .route("/signup/merchant", post(auth::signup_merchant))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/admin/users", post(auth::create_user))
}

/// Create the category and global FAQ routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route(
            "/{category}",
            put(categories::rename).delete(categories::delete),
        )
        .route(
            "/{category}/faqs",
            get(faqs::global::index).post(faqs::global::create),
        )
        .route(
            "/{category}/faqs/{faq_id}",
            get(faqs::global::show)
                .put(faqs::global::update)
                .delete(faqs::global::delete),
        )
        .route(
            "/{category}/faqs/{faq_id}/translations",
            get(faqs::global::translations).post(faqs::global::add_translation),
        )
        .route(
            "/{category}/faqs/{faq_id}/translations/{language}",
            get(faqs::global::show_translation)
                .put(faqs::global::update_translation)
                .delete(faqs::global::remove_translation),
        )
}

/// Create the store and store FAQ routes router.
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/{store_id}", get(stores::show).put(stores::update))
        .route(
            "/{store_id}/faqs",
            get(faqs::store::index).post(faqs::store::create),
        )
        .route(
            "/{store_id}/faqs/{faq_id}",
            get(faqs::store::show)
                .put(faqs::store::update)
                .delete(faqs::store::delete),
        )
        .route(
            "/{store_id}/faqs/{faq_id}/translations",
            get(faqs::store::translations).post(faqs::store::add_translation),
        )
        .route(
            "/{store_id}/faqs/{faq_id}/translations/{language}",
            get(faqs::store::show_translation)
                .put(faqs::store::update_translation)
                .delete(faqs::store::remove_translation),
        )
}

/// All `/api/v1` routes, rate limited per client.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .nest("/faq-categories", category_routes())
        .nest("/stores", store_routes())
        .layer(from_fn_with_state(state.clone(), rate_limit_middleware))
}

/// Responds 408 once `timeout` elapses.
fn request_timeout(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// Build the complete application router with its ambient layers.
///
/// Sentry layers are added by the binary, outside this router.
pub fn router(state: AppState) -> Router {
    let timeout = state.config().request_timeout;

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/v1", api_routes(&state))
        .layer(from_fn(security_headers_middleware))
        .layer(request_timeout(timeout))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                    user_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}
