//! Domain types for the market dashboard

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of the ranked market snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSummary {
    /// Provider identifier (e.g. "bitcoin")
    pub id: String,
    /// Display name (e.g. "Bitcoin")
    pub name: String,
    /// Ticker symbol as returned by the provider (usually lowercase)
    pub symbol: String,
    /// Price in USD
    pub current_price: f64,
    /// Market capitalization in USD
    pub market_cap: f64,
    /// Signed 24h price change percentage
    pub price_change_percentage_24h: f64,
}

/// Market figures of a resolved asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub current_price_usd: f64,
    pub market_cap_usd: f64,
    pub price_change_percentage_24h: f64,
}

/// Full detail record produced by a successful search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDetail {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub market_data: MarketData,
}

/// One match returned by the provider search endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub market_cap_rank: Option<u32>,
}

/// Raw (epoch-millisecond, price) sample from the history endpoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub timestamp_ms: i64,
    pub price: f64,
}

impl PriceSample {
    pub fn new(timestamp_ms: i64, price: f64) -> Self {
        Self {
            timestamp_ms,
            price,
        }
    }
}

/// Chart-ready point: time-of-day label plus price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub label: String,
    pub value: f64,
}

/// Chart-ready series for one asset
///
/// Rebuilt from scratch on every selection change, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Asset identifier with its first character uppercased
    pub asset_label: String,
    /// Points in chronological order
    pub points: Vec<PricePoint>,
}

impl ChartSeries {
    /// X-axis labels in order
    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.label.as_str()).collect()
    }

    /// Y-axis values in order
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Dashboard events for subscribers of the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DashboardEvent {
    /// The startup snapshot arrived
    SnapshotLoaded {
        id: Uuid,
        count: usize,
        timestamp: DateTime<Utc>,
    },

    /// The startup snapshot failed
    SnapshotFailed {
        id: Uuid,
        error_message: String,
        timestamp: DateTime<Utc>,
    },

    /// A search resolved to an asset detail
    SearchResolved {
        id: Uuid,
        query: String,
        asset_id: String,
        timestamp: DateTime<Utc>,
    },

    /// A search ended in an error
    SearchFailed {
        id: Uuid,
        query: String,
        error_kind: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },

    /// The selected asset changed (or was cleared)
    SelectionChanged {
        id: Uuid,
        asset_id: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// A new chart series replaced the previous one
    ChartUpdated {
        id: Uuid,
        asset_id: String,
        points: usize,
        timestamp: DateTime<Utc>,
    },
}

impl DashboardEvent {
    /// Get the event ID
    pub fn id(&self) -> Uuid {
        match self {
            DashboardEvent::SnapshotLoaded { id, .. }
            | DashboardEvent::SnapshotFailed { id, .. }
            | DashboardEvent::SearchResolved { id, .. }
            | DashboardEvent::SearchFailed { id, .. }
            | DashboardEvent::SelectionChanged { id, .. }
            | DashboardEvent::ChartUpdated { id, .. } => *id,
        }
    }

    /// Get the event type as string
    pub fn event_type(&self) -> &'static str {
        match self {
            DashboardEvent::SnapshotLoaded { .. } => "SNAPSHOT_LOADED",
            DashboardEvent::SnapshotFailed { .. } => "SNAPSHOT_FAILED",
            DashboardEvent::SearchResolved { .. } => "SEARCH_RESOLVED",
            DashboardEvent::SearchFailed { .. } => "SEARCH_FAILED",
            DashboardEvent::SelectionChanged { .. } => "SELECTION_CHANGED",
            DashboardEvent::ChartUpdated { .. } => "CHART_UPDATED",
        }
    }
}

impl std::fmt::Display for DashboardEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DashboardEvent::SnapshotLoaded { count, .. } => {
                write!(f, "Snapshot loaded: {} assets", count)
            }
            DashboardEvent::SnapshotFailed { error_message, .. } => {
                write!(f, "Snapshot failed: {}", error_message)
            }
            DashboardEvent::SearchResolved {
                query, asset_id, ..
            } => write!(f, "Search '{}' resolved to {}", query, asset_id),
            DashboardEvent::SearchFailed {
                query,
                error_message,
                ..
            } => write!(f, "Search '{}' failed: {}", query, error_message),
            DashboardEvent::SelectionChanged { asset_id, .. } => match asset_id {
                Some(asset_id) => write!(f, "Selected {}", asset_id),
                None => write!(f, "Selection cleared"),
            },
            DashboardEvent::ChartUpdated {
                asset_id, points, ..
            } => write!(f, "Chart for {}: {} points", asset_id, points),
        }
    }
}
