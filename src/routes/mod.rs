//! Route definitions for the stack statistics API.

pub mod health;
pub mod stats;

use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let cors = match state.config.frontend_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new().allow_origin(origin),
        Err(_) => {
            tracing::warn!(origin = %state.config.frontend_url, "Invalid FRONTEND_URL, allowing any origin");
            CorsLayer::new().allow_origin(Any)
        }
    }
    .allow_methods([Method::GET, Method::POST])
    .allow_headers(Any);

    let stats_routes = Router::new()
        .route("/stats", get(stats::current))
        .route("/stats/refresh", post(stats::refresh))
        .route("/stats/events", get(stats::events))
        .route("/stats/open/{kind}", get(stats::open));

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", stats_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
