//! Search resolver
//!
//! Turns free text into a canonical asset id, then fetches the detail record
//! for that id. The two requests are strictly sequential.

use crate::{
    config::ErrorPolicy,
    constants::VALIDATION_PROMPT,
    error::FlowError,
    provider::MarketDataProvider,
    state::SearchPhase,
    types::AssetDetail,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Resolves search text to an [`AssetDetail`] and owns the search phase
pub struct SearchResolver {
    provider: Arc<dyn MarketDataProvider>,
    policy: ErrorPolicy,
    phase: RwLock<SearchPhase>,
}

impl SearchResolver {
    pub fn new(provider: Arc<dyn MarketDataProvider>, policy: ErrorPolicy) -> Self {
        Self {
            provider,
            policy,
            phase: RwLock::new(SearchPhase::Idle),
        }
    }

    /// Runs one submission through validate, resolve and detail fetch
    ///
    /// Every call re-runs both requests; nothing is memoized.
    pub async fn submit(&self, query: &str) -> Result<AssetDetail, FlowError> {
        self.set_phase(SearchPhase::Validating {
            query: query.to_string(),
        })
        .await;

        let query = query.trim();
        if query.is_empty() {
            return self.fail(query, FlowError::validation(VALIDATION_PROMPT)).await;
        }

        match self.resolve(query).await {
            Ok(detail) => {
                tracing::debug!(query, asset_id = %detail.id, "Search resolved");
                self.set_phase(SearchPhase::Success(detail.clone())).await;
                Ok(detail)
            }
            Err(err) => self.fail(query, err).await,
        }
    }

    async fn resolve(&self, query: &str) -> Result<AssetDetail, FlowError> {
        self.set_phase(SearchPhase::Resolving {
            query: query.to_string(),
        })
        .await;

        let hits = self.provider.search(query).await?;
        let asset_id = hits
            .into_iter()
            .next()
            .map(|hit| hit.id)
            .ok_or_else(|| FlowError::not_found(query))?;

        self.set_phase(SearchPhase::DetailFetching {
            query: query.to_string(),
            asset_id: asset_id.clone(),
        })
        .await;

        Ok(self.provider.fetch_asset_detail(&asset_id).await?)
    }

    async fn fail(&self, query: &str, err: FlowError) -> Result<AssetDetail, FlowError> {
        tracing::warn!(query, kind = err.kind(), error = %err, "Search failed");
        let phase = match self.policy {
            ErrorPolicy::Visible => SearchPhase::Error(err.clone()),
            ErrorPolicy::LogOnly => SearchPhase::Idle,
        };
        self.set_phase(phase).await;
        Err(err)
    }

    async fn set_phase(&self, phase: SearchPhase) {
        tracing::trace!(phase = phase.name(), "Search phase");
        *self.phase.write().await = phase;
    }

    pub async fn phase(&self) -> SearchPhase {
        self.phase.read().await.clone()
    }
}
