//! Application state shared across handlers.

use std::sync::Arc;

use faqdesk_core::repository::Repositories;
use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::middleware::RateLimiter;
use crate::services::{SessionGate, TokenService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like repositories, the session gate and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    repos: Repositories,
    sessions: SessionGate,
    rate_limiter: RateLimiter,
    pool: Option<PgPool>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// `pool` is `None` when the repositories are not database-backed; the
    /// readiness probe then reports ready without a database check.
    #[must_use]
    pub fn new(config: ServerConfig, repos: Repositories, pool: Option<PgPool>) -> Self {
        let sessions = SessionGate::new(TokenService::new(&config.jwt_secret), repos.users.clone());
        let rate_limiter = RateLimiter::new(&config.rate_limit);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                repos,
                sessions,
                rate_limiter,
                pool,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn repos(&self) -> &Repositories {
        &self.inner.repos
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionGate {
        &self.inner.sessions
    }

    #[must_use]
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.inner.rate_limiter
    }

    /// The database pool, when running against `PostgreSQL`.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
