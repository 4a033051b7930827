//! # Market Dashboard SDK
//!
//! Client-side market data core for a cryptocurrency dashboard. It fetches
//! the top assets by market capitalization, resolves free-text searches to a
//! single asset, and turns raw price history into a bounded, chart-ready
//! series. Rendering is left to the caller.
//!
//! ## Usage
//!
//! ```no_run
//! use market_dashboard_sdk::{Dashboard, DashboardConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dashboard = Dashboard::new(DashboardConfig::default())?;
//!
//! // Startup snapshot (runs once per dashboard)
//! dashboard.initialize().await?;
//! for row in dashboard.view().await.rows() {
//!     println!("{} {} {} {}", row.title, row.price, row.market_cap, row.change);
//! }
//!
//! // User clicked a row
//! dashboard.select_asset("ethereum").await;
//!
//! // User searched
//! match dashboard.submit_search("bitcoin").await {
//!     Ok(detail) => println!("Resolved {}", detail.id),
//!     Err(e) => eprintln!("Search failed: {}", e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//!                  Dashboard (coordinator)
//!      ┌──────────────┼──────────────────┐
//! SnapshotFetcher  SearchResolver  PriceHistoryTransformer
//!      └──────────────┼──────────────────┘
//!               MarketDataProvider (CoinGecko)
//! ```
//!
//! Each flow owns its own state machine. The selected asset id, held by the
//! [`store::SelectionStore`], is the only value they share.
//!
//! ## Error Handling
//!
//! Snapshot and search failures are stored in their flow state and shown to
//! the user; chart failures are logged and leave the previous chart in place.
//! See [`config::ErrorPolicy`].

pub mod config;
pub mod constants;
pub mod dashboard;
pub mod error;
pub mod flows;
pub mod format;
pub mod provider;
pub mod providers;
pub mod state;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::{DashboardConfig, ErrorPolicy, LabelTimezone};
pub use dashboard::{Dashboard, DashboardView};
pub use error::{FlowError, ProviderError};
pub use format::{ChangeDirection, DisplayRow};
pub use provider::MarketDataProvider;
pub use state::{ChartPhase, FlowStatus, PrimaryView, SearchPhase};
pub use types::{
    AssetDetail, AssetSummary, ChartSeries, DashboardEvent, MarketData, PricePoint, PriceSample,
    SearchHit,
};
