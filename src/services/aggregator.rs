//! Stack statistics aggregation.
//!
//! A run counts content types and assets, walks every content type page,
//! then counts entries per content type with bounded concurrency. Access
//! failures on a single content type count as zero; any failure of the
//! top-level counts or of pagination aborts the run.
//!
//! [`StatsEngine`] wraps runs in an `Idle -> Loading -> Ready | Failed`
//! state machine. Each refresh takes a new generation; a run only settles
//! the state if no newer refresh has started since.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::errors::{AggregationError, QueryError};
use crate::models::pagination::PageCursor;
use crate::models::stats::{AggregationState, ContentTypeRef, StackStats};
use crate::services::query_port::RemoteQueryPort;

/// Run one full aggregation against the remote API.
pub async fn collect_stack_stats(
    port: &dyn RemoteQueryPort,
    stack_id: &str,
    max_concurrency: usize,
) -> Result<StackStats, AggregationError> {
    let (content_types, assets, catalog) = tokio::try_join!(
        port.count_content_types(stack_id),
        port.count_assets(stack_id),
        list_all_content_types(port, stack_id),
    )?;

    let entries = count_all_entries(port, stack_id, catalog, max_concurrency).await;

    Ok(StackStats {
        content_types,
        entries,
        assets,
    })
}

/// Enumerate every content type with offset pagination.
///
/// The total is re-read from every page instead of trusting the first one,
/// so content types added mid-walk are still picked up. An empty page ends
/// the walk even if the reported total disagrees.
pub async fn list_all_content_types(
    port: &dyn RemoteQueryPort,
    stack_id: &str,
) -> Result<Vec<ContentTypeRef>, QueryError> {
    let mut cursor = PageCursor::default();
    let mut seen = HashSet::new();
    let mut all = Vec::new();

    while cursor.has_more() {
        let page = port
            .list_content_types_page(stack_id, cursor.offset(), cursor.limit())
            .await?;
        let received = page.items.len();

        // Offsets can shift under concurrent edits; never count a uid twice.
        for item in page.items {
            if seen.insert(item.uid.clone()) {
                all.push(item);
            }
        }

        cursor.advance(page.total_count);
        if received == 0 {
            break;
        }
    }

    tracing::debug!(stack_id, count = all.len(), "Enumerated content types");
    Ok(all)
}

/// Sum entry counts across content types, at most `max_concurrency` in flight.
async fn count_all_entries(
    port: &dyn RemoteQueryPort,
    stack_id: &str,
    content_types: Vec<ContentTypeRef>,
    max_concurrency: usize,
) -> u64 {
    stream::iter(content_types)
        .map(|content_type| async move {
            match port.count_entries(stack_id, &content_type.uid).await {
                Ok(count) => count,
                Err(e) => {
                    tracing::warn!(
                        stack_id,
                        content_type = %content_type.uid,
                        access_denied = e.is_access_denied(),
                        error = %e,
                        "Skipping content type entry count"
                    );
                    0
                }
            }
        })
        .buffer_unordered(max_concurrency.max(1))
        .fold(0u64, |total, count| async move { total.saturating_add(count) })
        .await
}

/// Aggregation state tagged with the refresh generation that produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateSnapshot {
    pub generation: u64,
    pub state: AggregationState,
}

/// Owns the aggregation state and drives refreshes.
///
/// Observers subscribe to a `watch` channel and are woken on every
/// transition.
pub struct StatsEngine {
    port: Option<Arc<dyn RemoteQueryPort>>,
    max_concurrency: usize,
    state: watch::Sender<StateSnapshot>,
}

impl StatsEngine {
    pub fn new(port: Option<Arc<dyn RemoteQueryPort>>, max_concurrency: usize) -> Self {
        let (state, _) = watch::channel(StateSnapshot::default());
        Self {
            port,
            max_concurrency: max_concurrency.max(1),
            state,
        }
    }

    /// Whether the remote query port is wired in.
    pub fn is_ready(&self) -> bool {
        self.port.is_some()
    }

    pub fn state(&self) -> AggregationState {
        self.state.borrow().state.clone()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StateSnapshot> {
        self.state.subscribe()
    }

    /// Start a new generation and publish `Loading`.
    fn begin(&self) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.state = AggregationState::Loading;
            generation = snapshot.generation;
        });
        generation
    }

    /// Apply a result if `generation` is still the latest. Returns whether it was applied.
    fn settle(&self, generation: u64, next: AggregationState) -> bool {
        self.state.send_if_modified(|snapshot| {
            if snapshot.generation != generation {
                return false;
            }
            snapshot.state = next;
            true
        })
    }

    /// Re-run the aggregation for `stack_id`.
    ///
    /// Returns the engine state once this run has settled. If a newer
    /// refresh started in the meantime, this run's result is dropped and
    /// the newer run's current state is returned instead.
    pub async fn refresh(&self, stack_id: Option<&str>) -> AggregationState {
        let generation = self.begin();
        self.run(generation, stack_id).await
    }

    /// Publish `Loading` now and run the aggregation on a background task.
    pub fn spawn_refresh(
        self: &Arc<Self>,
        stack_id: Option<String>,
    ) -> JoinHandle<AggregationState> {
        let generation = self.begin();
        let engine = Arc::clone(self);
        tokio::spawn(async move { engine.run(generation, stack_id.as_deref()).await })
    }

    async fn run(&self, generation: u64, stack_id: Option<&str>) -> AggregationState {
        tracing::debug!(generation, "Refreshing stack statistics");

        let stack_id = stack_id.filter(|id| !id.is_empty());
        let outcome = match (self.port.as_deref(), stack_id) {
            (Some(port), Some(stack_id)) => {
                collect_stack_stats(port, stack_id, self.max_concurrency).await
            }
            _ => Err(AggregationError::DependenciesUnavailable),
        };

        let next = match outcome {
            Ok(stats) => {
                tracing::info!(
                    generation,
                    content_types = stats.content_types,
                    entries = stats.entries,
                    assets = stats.assets,
                    "Stack statistics refreshed"
                );
                AggregationState::Ready {
                    stats,
                    refreshed_at: Utc::now(),
                }
            }
            Err(e) => {
                tracing::error!(generation, error = %e, "Failed to fetch stack statistics");
                AggregationState::Failed {
                    message: e.to_string(),
                }
            }
        };

        if !self.settle(generation, next) {
            tracing::debug!(generation, "Discarding result of superseded refresh");
        }

        self.state()
    }
}

impl fmt::Debug for StatsEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatsEngine")
            .field("ready", &self.is_ready())
            .field("max_concurrency", &self.max_concurrency)
            .field("snapshot", &*self.state.borrow())
            .finish()
    }
}
