//! Constants for the market dashboard core
//!
//! Defaults for every flow are centralized here. `DashboardConfig::from_env`
//! can override a subset of them at runtime.

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Ranked market listing endpoint
pub const COINGECKO_MARKETS_ENDPOINT: &str = "/coins/markets";

/// Free-text search endpoint
pub const COINGECKO_SEARCH_ENDPOINT: &str = "/search";

/// Per-coin endpoint prefix (`/coins/{id}` and `/coins/{id}/market_chart`)
pub const COINGECKO_COINS_ENDPOINT: &str = "/coins";

/// Quote currency for every request
pub const VS_CURRENCY: &str = "usd";

/// Number of assets in the startup snapshot
pub const SNAPSHOT_SIZE: usize = 10;

/// Provider-defined history window requested for charts (in days)
pub const CHART_DAYS: u32 = 1;

/// Recent window kept for display, measured back from now (4 hours, in milliseconds)
pub const CHART_WINDOW_MS: i64 = 4 * 60 * 60 * 1000;

/// HTTP request timeout (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Capacity of the dashboard event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Prompt shown when a blank search is submitted
pub const VALIDATION_PROMPT: &str = "Please enter a cryptocurrency's name";

/// User agent for HTTP requests
pub const USER_AGENT: &str = "market-dashboard-sdk/0.1.0";
