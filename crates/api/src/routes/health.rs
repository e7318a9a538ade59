use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the spreadsheet is reachable.
    pub sheets_healthy: bool,
}

/// GET /health -- returns service and spreadsheet health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let sheets_healthy = match state.issues.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Spreadsheet health check failed");
            false
        }
    };

    let status = if sheets_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        sheets_healthy,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
