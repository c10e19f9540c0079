//! Health check endpoints for liveness and readiness probes.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::ApiResponse;
use crate::AppState;

/// Readiness probe detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub management_client: String,
    pub stack: String,
    pub stats: &'static str,
}

/// Liveness probe — always returns OK if the process is running.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness probe — reports whether the aggregation dependencies are wired.
pub async fn ready(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    let management_client = if state.engine.is_ready() {
        "configured"
    } else {
        "unavailable"
    };
    let stack = if state.config.stack_api_key.is_some() {
        "configured"
    } else {
        "missing"
    };

    ApiResponse::success(HealthStatus {
        status: "ok".to_string(),
        management_client: management_client.to_string(),
        stack: stack.to_string(),
        stats: state.engine.state().label(),
    })
}
