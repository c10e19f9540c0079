//! Stack statistics routes: current state, manual refresh, live updates,
//! and click-through navigation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Redirect,
    },
    Json,
};
use chrono::{DateTime, Local, Utc};
use futures::stream::Stream;
use serde::Serialize;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;

use crate::config::AppConfig;
use crate::errors::{ApiResponse, AppError};
use crate::models::stats::{
    format_last_refreshed, stat_cards, AggregationState, StackStats, StatCard, StatKind,
    UnknownStatKind,
};
use crate::services::aggregator::StateSnapshot;
use crate::AppState;

/// Render-ready view of the aggregation state.
#[derive(Debug, Serialize)]
pub struct StatsView {
    pub status: &'static str,
    pub stats: Option<StackStats>,
    pub cards: Vec<StatCard>,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub last_refreshed: String,
    pub error: Option<String>,
}

impl StatsView {
    pub fn new(state: &AggregationState, config: &AppConfig) -> Self {
        let stats = state.stats().copied();
        let refreshed_at = state.refreshed_at();
        let local = refreshed_at.map(|t| t.with_timezone(&Local));

        Self {
            status: state.label(),
            stats,
            cards: stat_cards(
                stats.as_ref(),
                &config.app_base_url,
                config.stack_api_key.as_deref(),
            ),
            refreshed_at,
            last_refreshed: format_last_refreshed(local.as_ref()),
            error: state.error().map(str::to_string),
        }
    }
}

/// GET /api/v1/stats — current aggregation state.
pub async fn current(State(state): State<AppState>) -> Json<ApiResponse<StatsView>> {
    ApiResponse::success(StatsView::new(&state.engine.state(), &state.config))
}

/// POST /api/v1/stats/refresh — start a refresh and return immediately.
pub async fn refresh(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<StatsView>>) {
    // The run outlives the request; its result reaches clients via state.
    let _handle = state.trigger_refresh();
    let view = StatsView::new(&state.engine.state(), &state.config);
    (StatusCode::ACCEPTED, ApiResponse::success(view))
}

/// One SSE event for a state snapshot, named after its status.
fn state_event(snapshot: &StateSnapshot, config: &AppConfig) -> Result<Event, AppError> {
    let view = StatsView::new(&snapshot.state, config);
    Event::default()
        .event(view.status)
        .id(snapshot.generation.to_string())
        .json_data(&view)
        .map_err(|e| {
            tracing::error!(generation = snapshot.generation, error = %e, "Failed to encode stats event");
            AppError::Internal(format!("stats event encoding: {e}"))
        })
}

/// GET /api/v1/stats/events — SSE stream of state changes.
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, AppError>>> {
    let config = state.config.clone();
    let stream = WatchStream::new(state.engine.subscribe())
        .map(move |snapshot| state_event(&snapshot, &config));

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// GET /api/v1/stats/open/{kind} — redirect to the stat's list view in the host app.
pub async fn open(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Redirect, AppError> {
    let kind: StatKind = kind
        .parse()
        .map_err(|e: UnknownStatKind| AppError::NotFound(e.to_string()))?;
    let stack_api_key = state
        .config
        .stack_api_key
        .as_deref()
        .ok_or_else(|| AppError::Unavailable("stack API key is not configured".to_string()))?;

    Ok(Redirect::temporary(
        &kind.href(&state.config.app_base_url, stack_api_key),
    ))
}
