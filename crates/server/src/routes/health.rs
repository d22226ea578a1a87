//! Liveness and readiness probes.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

/// Returns healthy whenever the process is serving. Does not check
/// dependencies.
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus { status: "healthy" })
}

/// Verifies database connectivity when the server runs on `PostgreSQL`.
/// Returns 503 if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let Some(pool) = state.pool() else {
        return (StatusCode::OK, Json(HealthStatus { status: "ready" }));
    };
    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => (StatusCode::OK, Json(HealthStatus { status: "ready" })),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthStatus {
                    status: "unavailable",
                }),
            )
        }
    }
}
