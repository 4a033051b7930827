//! Per-flow state machines
//!
//! Each flow owns exactly one of these. They are plain values: the owning
//! flow replaces them wholesale on every transition.

use crate::{
    error::FlowError,
    types::{AssetDetail, AssetSummary},
};

/// Generic status of a one-shot fetch
#[derive(Debug, Clone, PartialEq)]
pub enum FlowStatus<T> {
    Idle,
    Loading,
    Success(T),
    Error(FlowError),
}

impl<T> FlowStatus<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FlowError> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// Search resolver state machine
///
/// `Idle -> Validating -> Resolving -> DetailFetching -> Success | Error`.
/// A new submission from `Success` or `Error` restarts at `Validating`;
/// a blank query goes straight from `Validating` to `Error`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    Validating { query: String },
    Resolving { query: String },
    DetailFetching { query: String, asset_id: String },
    Success(AssetDetail),
    Error(FlowError),
}

impl SearchPhase {
    /// True while a request of this flow is outstanding
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Resolving { .. } | Self::DetailFetching { .. })
    }

    pub fn detail(&self) -> Option<&AssetDetail> {
        match self {
            Self::Success(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FlowError> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating { .. } => "validating",
            Self::Resolving { .. } => "resolving",
            Self::DetailFetching { .. } => "detail-fetching",
            Self::Success(_) => "success",
            Self::Error(_) => "error",
        }
    }
}

/// Price history transformer state machine
///
/// `NoSelection -> Loading -> Rendered | Failed`, and back to `Loading` on
/// every selection change.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ChartPhase {
    #[default]
    NoSelection,
    Loading { asset_id: String },
    Rendered { asset_id: String },
    /// `error` is `None` when the chart runs with the log-only policy
    Failed {
        asset_id: String,
        error: Option<FlowError>,
    },
}

impl ChartPhase {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// Asset the phase refers to, if any
    pub fn asset_id(&self) -> Option<&str> {
        match self {
            Self::NoSelection => None,
            Self::Loading { asset_id }
            | Self::Rendered { asset_id }
            | Self::Failed { asset_id, .. } => Some(asset_id),
        }
    }
}

/// Whichever of the snapshot list or the search detail is on screen
#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryView {
    SnapshotList(Vec<AssetSummary>),
    SearchDetail(AssetDetail),
}

impl PrimaryView {
    /// The resolved detail wins over the list; the two are never shown together
    pub fn resolve(snapshot: &FlowStatus<Vec<AssetSummary>>, search: &SearchPhase) -> Self {
        match search.detail() {
            Some(detail) => Self::SearchDetail(detail.clone()),
            None => Self::SnapshotList(snapshot.data().cloned().unwrap_or_default()),
        }
    }
}
