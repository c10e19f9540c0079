//! Stack statistics snapshot, aggregation state, and stat card models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One consistent snapshot of a stack's aggregate counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackStats {
    pub content_types: u64,
    pub entries: u64,
    pub assets: u64,
}

/// Minimal content type identity used to drive per-type entry counting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentTypeRef {
    pub uid: String,
}

impl ContentTypeRef {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }
}

/// Lifecycle of the statistics aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AggregationState {
    #[default]
    Idle,
    Loading,
    Ready {
        stats: StackStats,
        refreshed_at: DateTime<Utc>,
    },
    Failed {
        message: String,
    },
}

impl AggregationState {
    /// Whether the last run has settled (successfully or not).
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Ready { .. } | Self::Failed { .. })
    }

    pub fn stats(&self) -> Option<&StackStats> {
        match self {
            Self::Ready { stats, .. } => Some(stats),
            _ => None,
        }
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Ready { refreshed_at, .. } => Some(*refreshed_at),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { message } => Some(message),
            _ => None,
        }
    }

    /// Short tag for logs and views.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready { .. } => "ready",
            Self::Failed { .. } => "failed",
        }
    }
}

/// The three statistics shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatKind {
    ContentTypes,
    Entries,
    Assets,
}

impl StatKind {
    /// Display order on the dashboard.
    pub const ALL: [StatKind; 3] = [Self::ContentTypes, Self::Entries, Self::Assets];

    pub fn slug(self) -> &'static str {
        match self {
            Self::ContentTypes => "content-types",
            Self::Entries => "entries",
            Self::Assets => "assets",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ContentTypes => "Content Types",
            Self::Entries => "Entries",
            Self::Assets => "Assets",
        }
    }

    /// Path of the matching list view inside the host application.
    pub fn path(self) -> &'static str {
        match self {
            Self::ContentTypes => "content-types?branch=main",
            Self::Entries => "entries?branch=main",
            Self::Assets => "assets?branch=main",
        }
    }

    pub fn count(self, stats: &StackStats) -> u64 {
        match self {
            Self::ContentTypes => stats.content_types,
            Self::Entries => stats.entries,
            Self::Assets => stats.assets,
        }
    }

    /// Deep link into the host application for this stat.
    pub fn href(self, app_base_url: &str, stack_api_key: &str) -> String {
        format!(
            "{}/#!/stack/{}/{}",
            app_base_url.trim_end_matches('/'),
            stack_api_key,
            self.path()
        )
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stat kind: {0}")]
pub struct UnknownStatKind(pub String);

impl FromStr for StatKind {
    type Err = UnknownStatKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| UnknownStatKind(s.to_string()))
    }
}

/// Rendered stat card: a kind bound to its count and navigation target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub kind: StatKind,
    pub count: u64,
    pub label: &'static str,
    pub href: Option<String>,
}

/// Build the three dashboard cards in display order.
///
/// Counts read as zero when no snapshot is available. Links are only
/// produced when the stack API key is known.
pub fn stat_cards(
    stats: Option<&StackStats>,
    app_base_url: &str,
    stack_api_key: Option<&str>,
) -> Vec<StatCard> {
    StatKind::ALL
        .into_iter()
        .map(|kind| StatCard {
            kind,
            count: stats.map(|s| kind.count(s)).unwrap_or(0),
            label: kind.label(),
            href: stack_api_key.map(|key| kind.href(app_base_url, key)),
        })
        .collect()
}

/// Format a refresh timestamp as a 24-hour `HH:MM:SS` clock.
pub fn format_last_refreshed<Tz: TimeZone>(ts: Option<&DateTime<Tz>>) -> String
where
    Tz::Offset: fmt::Display,
{
    ts.map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_default()
}
