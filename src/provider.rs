//! Provider abstraction for the upstream market-data API

use crate::{
    error::ProviderError,
    types::{AssetDetail, AssetSummary, PriceSample, SearchHit},
};
use async_trait::async_trait;

/// Trait for market-data providers
///
/// The four operations are read-only and unauthenticated. Any provider with
/// CoinGecko-equivalent semantics can stand in.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetches the top `limit` assets ranked by market capitalization (USD)
    async fn fetch_top_assets(&self, limit: usize) -> Result<Vec<AssetSummary>, ProviderError>;

    /// Searches assets by free text
    ///
    /// # Returns
    /// Matches in provider relevance order (possibly empty)
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ProviderError>;

    /// Fetches the detail record of a single asset
    async fn fetch_asset_detail(&self, id: &str) -> Result<AssetDetail, ProviderError>;

    /// Fetches the raw price history of an asset over `days` provider days
    ///
    /// # Returns
    /// Samples in chronological order
    async fn fetch_price_history(
        &self,
        id: &str,
        days: u32,
    ) -> Result<Vec<PriceSample>, ProviderError>;

    /// Returns the name of this provider
    fn provider_name(&self) -> &'static str;
}
