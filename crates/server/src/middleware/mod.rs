//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction capture)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded into the span)
//! 4. Timeout (408 once the request deadline passes)
//! 5. Security headers
//! 6. Rate limiting (`/api/v1` only, before any session work)
//!
//! Session resolution is not a layer: handlers that mutate take the
//! [`OptionalAuth`] extractor.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use auth::{OptionalAuth, clear_session_header, session_token};
pub use rate_limit::{Admission, RateLimiter, client_key, rate_limit_middleware};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
