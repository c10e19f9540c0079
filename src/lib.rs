pub mod config;
pub mod errors;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use services::aggregator::StatsEngine;

/// Shared application state passed to all Axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: Arc<StatsEngine>,
    pub config: config::AppConfig,
}

impl AppState {
    /// Refresh using the configured stack, without waiting for the result.
    pub fn trigger_refresh(&self) -> tokio::task::JoinHandle<models::stats::AggregationState> {
        self.engine.spawn_refresh(self.config.stack_api_key.clone())
    }
}
