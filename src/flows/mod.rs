//! The three independent data flows of the dashboard
//!
//! Each flow owns its state container; none of them reads another's.
//! The [`crate::dashboard::Dashboard`] coordinator wires them together
//! through the selected asset id.

pub mod chart;
pub mod search;
pub mod snapshot;

pub use chart::PriceHistoryTransformer;
pub use search::SearchResolver;
pub use snapshot::SnapshotFetcher;
