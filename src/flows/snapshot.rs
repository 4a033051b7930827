//! Market snapshot fetcher
//!
//! Loads the top assets by market capitalization once per instance.

use crate::{
    config::ErrorPolicy,
    error::FlowError,
    provider::MarketDataProvider,
    state::FlowStatus,
    types::AssetSummary,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Fetches the ranked asset list and owns its status
pub struct SnapshotFetcher {
    provider: Arc<dyn MarketDataProvider>,
    limit: usize,
    policy: ErrorPolicy,
    started: AtomicBool,
    status: RwLock<FlowStatus<Vec<AssetSummary>>>,
}

impl SnapshotFetcher {
    pub fn new(provider: Arc<dyn MarketDataProvider>, limit: usize, policy: ErrorPolicy) -> Self {
        Self {
            provider,
            limit,
            policy,
            started: AtomicBool::new(false),
            status: RwLock::new(FlowStatus::Idle),
        }
    }

    /// Runs the fetch if it has never run on this instance
    ///
    /// # Returns
    /// `None` when the snapshot was already requested earlier, otherwise the
    /// number of assets loaded or the failure
    pub async fn run(&self) -> Option<Result<usize, FlowError>> {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::debug!("Market snapshot already requested, skipping");
            return None;
        }

        *self.status.write().await = FlowStatus::Loading;

        match self.provider.fetch_top_assets(self.limit).await {
            Ok(assets) => {
                let assets = rank_by_market_cap(assets);
                let count = assets.len();
                tracing::debug!(
                    count,
                    provider = self.provider.provider_name(),
                    "Loaded market snapshot"
                );
                *self.status.write().await = FlowStatus::Success(assets);
                Some(Ok(count))
            }
            Err(e) => {
                let err = FlowError::from(e);
                tracing::warn!(error = %err, "Failed to load market snapshot");
                *self.status.write().await = match self.policy {
                    ErrorPolicy::Visible => FlowStatus::Error(err.clone()),
                    ErrorPolicy::LogOnly => FlowStatus::Idle,
                };
                Some(Err(err))
            }
        }
    }

    pub async fn status(&self) -> FlowStatus<Vec<AssetSummary>> {
        self.status.read().await.clone()
    }
}

/// Orders assets by descending market capitalization
///
/// The sort is stable, so a list the provider already ranked is unchanged.
pub fn rank_by_market_cap(mut assets: Vec<AssetSummary>) -> Vec<AssetSummary> {
    assets.sort_by(|a, b| b.market_cap.total_cmp(&a.market_cap));
    assets
}
