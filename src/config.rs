//! Runtime configuration for the dashboard
//!
//! Defaults come from [`crate::constants`]. A handful of settings can be
//! overridden from the environment:
//!
//! - `MARKET_DATA_API_URL` - provider base URL
//! - `MARKET_DATA_TIMEOUT_SECS` - HTTP timeout
//! - `DASHBOARD_SNAPSHOT_SIZE` - number of assets in the startup list
//! - `DASHBOARD_CHART_WINDOW_MINUTES` - recent window kept on the chart

use crate::{
    constants::{
        CHART_DAYS, CHART_WINDOW_MS, COINGECKO_API_URL, REQUEST_TIMEOUT_SECS, SNAPSHOT_SIZE,
    },
    error::ProviderError,
};
use chrono::FixedOffset;
use std::time::Duration;

/// How a flow reports its failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Store the error in the flow state so the view shows it
    Visible,
    /// Log the error and leave the visible state untouched
    LogOnly,
}

/// Per-flow error policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPolicies {
    pub snapshot: ErrorPolicy,
    pub search: ErrorPolicy,
    pub chart: ErrorPolicy,
}

impl Default for ErrorPolicies {
    fn default() -> Self {
        Self {
            snapshot: ErrorPolicy::Visible,
            search: ErrorPolicy::Visible,
            chart: ErrorPolicy::LogOnly,
        }
    }
}

/// Timezone used to render chart time labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelTimezone {
    /// The host's local timezone
    #[default]
    Local,
    Fixed(FixedOffset),
}

/// Dashboard configuration
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Provider base URL, without trailing slash
    pub api_url: String,
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// Number of assets requested for the snapshot
    pub snapshot_size: usize,
    /// Provider history window requested for charts
    pub chart_days: u32,
    /// Recent window kept on the chart, in milliseconds
    pub chart_window_ms: i64,
    pub label_timezone: LabelTimezone,
    pub error_policies: ErrorPolicies,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: COINGECKO_API_URL.to_string(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            snapshot_size: SNAPSHOT_SIZE,
            chart_days: CHART_DAYS,
            chart_window_ms: CHART_WINDOW_MS,
            label_timezone: LabelTimezone::Local,
            error_policies: ErrorPolicies::default(),
        }
    }
}

impl DashboardConfig {
    /// Builds a configuration from the process environment
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("MARKET_DATA_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = get("MARKET_DATA_TIMEOUT_SECS") {
            let secs: u64 = parse_positive("MARKET_DATA_TIMEOUT_SECS", &secs)?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(size) = get("DASHBOARD_SNAPSHOT_SIZE") {
            config.snapshot_size = parse_positive("DASHBOARD_SNAPSHOT_SIZE", &size)?;
        }
        if let Some(minutes) = get("DASHBOARD_CHART_WINDOW_MINUTES") {
            let minutes: u64 = parse_positive("DASHBOARD_CHART_WINDOW_MINUTES", &minutes)?;
            config.chart_window_ms = minutes
                .checked_mul(60 * 1000)
                .and_then(|ms| i64::try_from(ms).ok())
                .ok_or_else(|| {
                    ProviderError::Config(format!(
                        "DASHBOARD_CHART_WINDOW_MINUTES is out of range: {}",
                        minutes
                    ))
                })?;
        }

        Ok(config)
    }
}

/// Parses an unsigned override and rejects zero
fn parse_positive<T>(key: &str, value: &str) -> Result<T, ProviderError>
where
    T: std::str::FromStr + Default + PartialEq,
{
    let parsed: T = value
        .trim()
        .parse()
        .map_err(|_| ProviderError::Config(format!("{} has an invalid value: {:?}", key, value)))?;
    if parsed == T::default() {
        return Err(ProviderError::Config(format!("{} must be greater than zero", key)));
    }
    Ok(parsed)
}
