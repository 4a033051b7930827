//! CoinGecko market data provider implementation

use crate::{
    config::DashboardConfig,
    constants::{
        COINGECKO_COINS_ENDPOINT, COINGECKO_MARKETS_ENDPOINT, COINGECKO_SEARCH_ENDPOINT,
        USER_AGENT, VS_CURRENCY,
    },
    error::ProviderError,
    provider::MarketDataProvider,
    types::{AssetDetail, AssetSummary, MarketData, PriceSample, SearchHit},
};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

/// Row of `/coins/markets`
#[derive(Debug, Deserialize)]
struct CoinMarketEntry {
    id: String,
    symbol: String,
    name: String,
    current_price: Option<f64>,
    market_cap: Option<f64>,
    price_change_percentage_24h: Option<f64>,
}

impl From<CoinMarketEntry> for AssetSummary {
    fn from(entry: CoinMarketEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            symbol: entry.symbol,
            current_price: entry.current_price.unwrap_or_default(),
            market_cap: entry.market_cap.unwrap_or_default(),
            price_change_percentage_24h: entry.price_change_percentage_24h.unwrap_or_default(),
        }
    }
}

/// Body of `/search`; only the coin matches are used
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    coins: Vec<SearchCoin>,
}

#[derive(Debug, Deserialize)]
struct SearchCoin {
    id: String,
    name: String,
    symbol: String,
    market_cap_rank: Option<u32>,
}

/// Body of `/coins/{id}` with `market_data=true`
#[derive(Debug, Deserialize)]
struct CoinDetailResponse {
    id: String,
    symbol: String,
    name: String,
    market_data: Option<CoinDetailMarketData>,
}

#[derive(Debug, Deserialize)]
struct CoinDetailMarketData {
    #[serde(default)]
    current_price: HashMap<String, f64>,
    #[serde(default)]
    market_cap: HashMap<String, f64>,
    price_change_percentage_24h: Option<f64>,
}

/// Body of `/coins/{id}/market_chart`; pairs of `[epoch_ms, price]`
#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Vec<(f64, f64)>,
}

/// CoinGecko market data provider
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    /// Creates a new CoinGecko provider from the dashboard configuration
    pub fn new(config: &DashboardConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(ProviderError::Transport)?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, ProviderError> {
        Url::parse_with_params(&format!("{}{}", self.base_url, path), params)
            .map_err(|e| ProviderError::Config(format!("Invalid provider URL: {}", e)))
    }

    /// `/coins/{id}[/{suffix}]` with the id appended as one encoded path segment
    fn coin_url(
        &self,
        id: &str,
        suffix: Option<&str>,
        params: &[(&str, &str)],
    ) -> Result<Url, ProviderError> {
        if id.is_empty() || id == "." || id == ".." {
            return Err(ProviderError::UnsupportedAsset(id.to_string()));
        }

        let mut url = self.endpoint_url(COINGECKO_COINS_ENDPOINT, params)?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ProviderError::Config(format!("Provider URL cannot take a path: {}", self.base_url))
            })?;
            segments.pop_if_empty().push(id);
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }
        Ok(url)
    }

    /// `/coins/markets?vs_currency=usd&order=market_cap_desc&per_page=N&page=1&sparkline=false`
    fn markets_url(&self, limit: usize) -> Result<Url, ProviderError> {
        let per_page = limit.to_string();
        self.endpoint_url(
            COINGECKO_MARKETS_ENDPOINT,
            &[
                ("vs_currency", VS_CURRENCY),
                ("order", "market_cap_desc"),
                ("per_page", &per_page),
                ("page", "1"),
                ("sparkline", "false"),
            ],
        )
    }

    /// `/search?query={text}`
    fn search_url(&self, query: &str) -> Result<Url, ProviderError> {
        self.endpoint_url(COINGECKO_SEARCH_ENDPOINT, &[("query", query)])
    }

    /// `/coins/{id}?localization=false&tickers=false&market_data=true&...`
    fn detail_url(&self, id: &str) -> Result<Url, ProviderError> {
        self.coin_url(
            id,
            None,
            &[
                ("localization", "false"),
                ("tickers", "false"),
                ("market_data", "true"),
                ("community_data", "false"),
                ("developer_data", "false"),
                ("sparkline", "false"),
            ],
        )
    }

    /// `/coins/{id}/market_chart?vs_currency=usd&days=N`
    fn market_chart_url(&self, id: &str, days: u32) -> Result<Url, ProviderError> {
        let days = days.to_string();
        self.coin_url(
            id,
            Some("market_chart"),
            &[("vs_currency", VS_CURRENCY), ("days", &days)],
        )
    }

    /// Issues a GET and decodes the JSON body
    ///
    /// Non-2xx statuses and undecodable bodies are both failures.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        endpoint: &str,
    ) -> Result<T, ProviderError> {
        tracing::debug!(url = %url, "Fetching from CoinGecko");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ProviderError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::status(endpoint, status.as_u16()));
        }

        let response_text = response.text().await.map_err(ProviderError::Transport)?;

        serde_json::from_str(&response_text).map_err(|e| {
            ProviderError::InvalidResponse(format!(
                "Failed to parse CoinGecko {} response: {}",
                endpoint, e
            ))
        })
    }
}

fn parse_detail(response: CoinDetailResponse) -> Result<AssetDetail, ProviderError> {
    let market = response.market_data.ok_or_else(|| {
        ProviderError::InvalidResponse(format!("No market data for {}", response.id))
    })?;

    let usd = |map: &HashMap<String, f64>, field: &str| {
        map.get(VS_CURRENCY).copied().ok_or_else(|| {
            ProviderError::InvalidResponse(format!("Missing {}.{} for {}", field, VS_CURRENCY, response.id))
        })
    };

    let market_data = MarketData {
        current_price_usd: usd(&market.current_price, "current_price")?,
        market_cap_usd: usd(&market.market_cap, "market_cap")?,
        price_change_percentage_24h: market.price_change_percentage_24h.unwrap_or_default(),
    };

    Ok(AssetDetail {
        id: response.id,
        name: response.name,
        symbol: response.symbol,
        market_data,
    })
}

fn parse_market_chart(response: MarketChartResponse) -> Vec<PriceSample> {
    response
        .prices
        .into_iter()
        .map(|(ts, price)| PriceSample::new(ts as i64, price))
        .collect()
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    async fn fetch_top_assets(&self, limit: usize) -> Result<Vec<AssetSummary>, ProviderError> {
        let url = self.markets_url(limit)?;
        let entries: Vec<CoinMarketEntry> =
            self.get_json(url, COINGECKO_MARKETS_ENDPOINT).await?;

        tracing::debug!(count = entries.len(), "Fetched market snapshot from CoinGecko");

        Ok(entries.into_iter().map(AssetSummary::from).collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ProviderError> {
        let url = self.search_url(query)?;
        let response: SearchResponse = self.get_json(url, COINGECKO_SEARCH_ENDPOINT).await?;

        tracing::debug!(query, matches = response.coins.len(), "CoinGecko search finished");

        Ok(response
            .coins
            .into_iter()
            .map(|c| SearchHit {
                id: c.id,
                name: c.name,
                symbol: c.symbol,
                market_cap_rank: c.market_cap_rank,
            })
            .collect())
    }

    async fn fetch_asset_detail(&self, id: &str) -> Result<AssetDetail, ProviderError> {
        let url = self.detail_url(id)?;
        let response: CoinDetailResponse = self.get_json(url, "/coins/{id}").await?;
        parse_detail(response)
    }

    async fn fetch_price_history(
        &self,
        id: &str,
        days: u32,
    ) -> Result<Vec<PriceSample>, ProviderError> {
        let url = self.market_chart_url(id, days)?;
        let response: MarketChartResponse =
            self.get_json(url, "/coins/{id}/market_chart").await?;
        let samples = parse_market_chart(response);

        tracing::debug!(asset_id = id, samples = samples.len(), "Fetched price history from CoinGecko");

        Ok(samples)
    }

    fn provider_name(&self) -> &'static str {
        "coingecko"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> CoinGeckoProvider {
        CoinGeckoProvider::new(&DashboardConfig::default()).unwrap()
    }

    #[test]
    fn test_markets_url() {
        let url = provider().markets_url(10).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.coingecko.com/api/v3/coins/markets?vs_currency=usd&order=market_cap_desc&per_page=10&page=1&sparkline=false"
        );
    }

    #[test]
    fn test_search_url_encodes_query() {
        let url = provider().search_url("shiba inu&x").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.coingecko.com/api/v3/search?query=shiba+inu%26x"
        );
    }

    #[test]
    fn test_detail_and_chart_urls() {
        let p = provider();
        assert_eq!(
            p.detail_url("bitcoin").unwrap().as_str(),
            "https://api.coingecko.com/api/v3/coins/bitcoin?localization=false&tickers=false&market_data=true&community_data=false&developer_data=false&sparkline=false"
        );
        assert_eq!(
            p.market_chart_url("bitcoin", 1).unwrap().as_str(),
            "https://api.coingecko.com/api/v3/coins/bitcoin/market_chart?vs_currency=usd&days=1"
        );
    }

    #[test]
    fn test_asset_id_stays_in_one_path_segment() {
        let p = provider();
        assert_eq!(
            p.market_chart_url("../../search", 1).unwrap().as_str(),
            "https://api.coingecko.com/api/v3/coins/..%2F..%2Fsearch/market_chart?vs_currency=usd&days=1"
        );
        assert_eq!(
            p.detail_url("a/b?x=1").unwrap().path(),
            "/api/v3/coins/a%2Fb%3Fx=1"
        );
        for id in ["", ".", ".."] {
            assert!(matches!(
                p.detail_url(id),
                Err(ProviderError::UnsupportedAsset(_))
            ));
        }
    }

    #[test]
    fn test_parse_markets_with_nulls() {
        let body = r#"[
            {"id":"bitcoin","symbol":"btc","name":"Bitcoin","current_price":65000.5,
             "market_cap":1280000000000,"price_change_percentage_24h":-0.5,"image":"x"},
            {"id":"newcoin","symbol":"new","name":"New","current_price":null,
             "market_cap":null,"price_change_percentage_24h":null}
        ]"#;
        let entries: Vec<CoinMarketEntry> = serde_json::from_str(body).unwrap();
        let assets: Vec<AssetSummary> = entries.into_iter().map(AssetSummary::from).collect();

        assert_eq!(assets[0].current_price, 65000.5);
        assert_eq!(assets[0].market_cap, 1.28e12);
        assert_eq!(assets[1].market_cap, 0.0);
        assert_eq!(assets[1].price_change_percentage_24h, 0.0);
    }

    #[test]
    fn test_parse_search_response() {
        let body = r#"{"coins":[{"id":"bitcoin","name":"Bitcoin","symbol":"BTC","market_cap_rank":1}],
                       "exchanges":[],"categories":[]}"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.coins.len(), 1);
        assert_eq!(response.coins[0].id, "bitcoin");

        let empty: SearchResponse = serde_json::from_str(r#"{"coins":[]}"#).unwrap();
        assert!(empty.coins.is_empty());
    }

    #[test]
    fn test_parse_detail() {
        let body = r#"{"id":"bitcoin","symbol":"btc","name":"Bitcoin",
            "market_data":{"current_price":{"usd":65000.5,"eur":60000.0},
                           "market_cap":{"usd":1280000000000.0},
                           "price_change_percentage_24h":2.345}}"#;
        let response: CoinDetailResponse = serde_json::from_str(body).unwrap();
        let detail = parse_detail(response).unwrap();

        assert_eq!(detail.name, "Bitcoin");
        assert_eq!(detail.market_data.current_price_usd, 65000.5);
        assert_eq!(detail.market_data.price_change_percentage_24h, 2.345);
    }

    #[test]
    fn test_parse_detail_without_usd_is_invalid() {
        let body = r#"{"id":"odd","symbol":"odd","name":"Odd",
            "market_data":{"current_price":{"eur":1.0},"market_cap":{}}}"#;
        let response: CoinDetailResponse = serde_json::from_str(body).unwrap();
        assert!(matches!(
            parse_detail(response),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_market_chart() {
        let body = r#"{"prices":[[1700000000000,35000.1],[1700000300000,35010.2]],
                       "market_caps":[],"total_volumes":[]}"#;
        let response: MarketChartResponse = serde_json::from_str(body).unwrap();
        let samples = parse_market_chart(response);

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0], PriceSample::new(1_700_000_000_000, 35000.1));
        assert_eq!(samples[1].timestamp_ms, 1_700_000_300_000);
    }
}
