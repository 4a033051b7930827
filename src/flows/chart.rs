//! Price history transformer
//!
//! Fetches the provider's 1-day history for the selected asset, keeps the
//! recent window and reshapes it into a [`ChartSeries`].
//!
//! Every selection change bumps a generation counter. A response is applied
//! only if its generation is still current, so a slow response for an older
//! selection can never overwrite a newer chart.

use crate::{
    config::{ErrorPolicy, LabelTimezone},
    error::FlowError,
    provider::MarketDataProvider,
    state::ChartPhase,
    types::{ChartSeries, PricePoint, PriceSample},
};
use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 2-digit hour, 2-digit minute, AM/PM
const TIME_LABEL_FORMAT: &str = "%I:%M %p";

/// Chart settings taken from the dashboard configuration
#[derive(Debug, Clone, Copy)]
pub struct ChartSettings {
    pub days: u32,
    pub window_ms: i64,
    pub timezone: LabelTimezone,
    pub policy: ErrorPolicy,
}

/// Result of one chart load
#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutcome {
    /// The series was replaced; carries the number of points
    Rendered(usize),
    /// The fetch failed and the previous series was kept
    Failed(FlowError),
    /// A newer selection was made while this request was in flight
    Discarded,
}

#[derive(Debug, Default)]
struct ChartState {
    phase: ChartPhase,
    series: Option<ChartSeries>,
    generation: u64,
}

/// Builds chart series for the selected asset and owns the chart state
pub struct PriceHistoryTransformer {
    provider: Arc<dyn MarketDataProvider>,
    settings: ChartSettings,
    state: RwLock<ChartState>,
}

impl PriceHistoryTransformer {
    pub fn new(provider: Arc<dyn MarketDataProvider>, settings: ChartSettings) -> Self {
        Self {
            provider,
            settings,
            state: RwLock::new(ChartState::default()),
        }
    }

    /// Marks a new selection as loading and returns its request tag
    ///
    /// The previous series stays visible until the new one arrives.
    pub async fn begin(&self, asset_id: &str) -> u64 {
        let mut state = self.state.write().await;
        state.generation += 1;
        state.phase = ChartPhase::Loading {
            asset_id: asset_id.to_string(),
        };
        state.generation
    }

    /// Fetches and transforms the history for a request started by [`begin`]
    ///
    /// [`begin`]: Self::begin
    pub async fn load(&self, asset_id: &str, generation: u64) -> ChartOutcome {
        let result = self
            .provider
            .fetch_price_history(asset_id, self.settings.days)
            .await;

        let mut state = self.state.write().await;
        if state.generation != generation {
            tracing::debug!(
                asset_id,
                generation,
                current = state.generation,
                "Discarding stale chart response"
            );
            return ChartOutcome::Discarded;
        }

        match result {
            Ok(samples) => {
                let series = build_series(
                    asset_id,
                    &samples,
                    Utc::now().timestamp_millis(),
                    self.settings.window_ms,
                    self.settings.timezone,
                );
                let points = series.points.len();
                tracing::debug!(asset_id, raw = samples.len(), points, "Chart series rebuilt");

                state.series = Some(series);
                state.phase = ChartPhase::Rendered {
                    asset_id: asset_id.to_string(),
                };
                ChartOutcome::Rendered(points)
            }
            Err(e) => {
                let err = FlowError::from(e);
                tracing::debug!(asset_id, error = %err, "Error fetching chart data");

                state.phase = ChartPhase::Failed {
                    asset_id: asset_id.to_string(),
                    error: match self.settings.policy {
                        ErrorPolicy::Visible => Some(err.clone()),
                        ErrorPolicy::LogOnly => None,
                    },
                };
                ChartOutcome::Failed(err)
            }
        }
    }

    /// Drops the chart entirely and invalidates any in-flight request
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.generation += 1;
        state.phase = ChartPhase::NoSelection;
        state.series = None;
    }

    pub async fn phase(&self) -> ChartPhase {
        self.state.read().await.phase.clone()
    }

    pub async fn series(&self) -> Option<ChartSeries> {
        self.state.read().await.series.clone()
    }
}

/// Keeps samples no older than `window_ms` before `now_ms`, in input order
pub fn filter_recent(samples: &[PriceSample], now_ms: i64, window_ms: i64) -> Vec<PriceSample> {
    let cutoff = now_ms - window_ms;
    samples
        .iter()
        .filter(|s| s.timestamp_ms >= cutoff)
        .copied()
        .collect()
}

/// Asset id with its first character uppercased: `bitcoin` -> `Bitcoin`
pub fn asset_label(asset_id: &str) -> String {
    let mut chars = asset_id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Renders an epoch-millisecond timestamp as `02:05 PM` in `tz`
pub fn format_time_label<Tz>(timestamp_ms: i64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.with_timezone(tz).format(TIME_LABEL_FORMAT).to_string())
}

/// Renders a time label in the configured timezone
fn label_in(timezone: LabelTimezone, timestamp_ms: i64) -> Option<String> {
    match timezone {
        LabelTimezone::Local => format_time_label(timestamp_ms, &chrono::Local),
        LabelTimezone::Fixed(offset) => format_time_label(timestamp_ms, &offset),
    }
}

/// Filters and reshapes raw samples into a display series
///
/// Samples whose timestamp cannot be represented are dropped.
pub fn build_series(
    asset_id: &str,
    samples: &[PriceSample],
    now_ms: i64,
    window_ms: i64,
    timezone: LabelTimezone,
) -> ChartSeries {
    let points = filter_recent(samples, now_ms, window_ms)
        .into_iter()
        .filter_map(|s| {
            label_in(timezone, s.timestamp_ms).map(|label| PricePoint {
                label,
                value: s.price,
            })
        })
        .collect();

    ChartSeries {
        asset_label: asset_label(asset_id),
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CHART_WINDOW_MS;
    use crate::provider::mock::{MockError, MockProvider};
    use chrono::FixedOffset;

    const HOUR_MS: i64 = 60 * 60 * 1000;

    fn utc() -> LabelTimezone {
        LabelTimezone::Fixed(FixedOffset::east_opt(0).unwrap())
    }

    fn settings(policy: ErrorPolicy) -> ChartSettings {
        ChartSettings {
            days: 1,
            window_ms: CHART_WINDOW_MS,
            timezone: utc(),
            policy,
        }
    }

    /// `count` samples evenly spread over the 24 hours ending at `now_ms`
    fn day_of_samples(now_ms: i64, count: i64) -> Vec<PriceSample> {
        let start = now_ms - 24 * HOUR_MS;
        let step = 24 * HOUR_MS / (count - 1);
        (0..count)
            .map(|i| PriceSample::new(start + i * step, 100.0 + i as f64))
            .collect()
    }

    #[test]
    fn test_filter_recent_keeps_window() {
        // 2023-11-14 22:13:20 UTC
        let now = 1_700_000_000_000;
        let samples = day_of_samples(now, 50);
        let kept = filter_recent(&samples, now, CHART_WINDOW_MS);

        assert!(!kept.is_empty());
        assert!(kept.iter().all(|s| s.timestamp_ms >= now - 4 * HOUR_MS));
        assert_eq!(
            kept.len(),
            samples.iter().filter(|s| s.timestamp_ms >= now - 4 * HOUR_MS).count()
        );
        assert!(kept.windows(2).all(|w| w[0].timestamp_ms < w[1].timestamp_ms));
    }

    #[test]
    fn test_filter_recent_is_idempotent() {
        let now = 1_700_000_000_000;
        let samples = day_of_samples(now, 50);
        let once = filter_recent(&samples, now, CHART_WINDOW_MS);
        let twice = filter_recent(&once, now, CHART_WINDOW_MS);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let now = 10 * HOUR_MS;
        let samples = vec![
            PriceSample::new(now - CHART_WINDOW_MS - 1, 1.0),
            PriceSample::new(now - CHART_WINDOW_MS, 2.0),
            PriceSample::new(now, 3.0),
        ];
        let kept = filter_recent(&samples, now, CHART_WINDOW_MS);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].price, 2.0);
    }

    #[test]
    fn test_time_labels() {
        let utc = FixedOffset::east_opt(0).unwrap();
        // 2023-11-14 22:13:20 UTC
        assert_eq!(
            format_time_label(1_700_000_000_000, &utc).as_deref(),
            Some("10:13 PM")
        );
        // 2023-11-14 08:05:00 UTC
        assert_eq!(
            format_time_label(1_699_949_100_000, &utc).as_deref(),
            Some("08:05 AM")
        );
        let cet = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(
            format_time_label(1_699_949_100_000, &cet).as_deref(),
            Some("09:05 AM")
        );
    }

    #[test]
    fn test_asset_label() {
        assert_eq!(asset_label("bitcoin"), "Bitcoin");
        assert_eq!(asset_label("usd-coin"), "Usd-coin");
        assert_eq!(asset_label(""), "");
    }

    #[test]
    fn test_build_series_preserves_order() {
        let now = 1_700_000_000_000;
        let samples = day_of_samples(now, 50);
        let series = build_series("bitcoin", &samples, now, CHART_WINDOW_MS, utc());

        let expected: Vec<_> = filter_recent(&samples, now, CHART_WINDOW_MS);
        assert_eq!(series.asset_label, "Bitcoin");
        assert_eq!(series.points.len(), expected.len());
        for (point, sample) in series.points.iter().zip(&expected) {
            assert_eq!(point.value, sample.price);
            assert_eq!(
                Some(point.label.clone()),
                format_time_label(sample.timestamp_ms, &FixedOffset::east_opt(0).unwrap())
            );
        }
        assert!(series.values().windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_load_renders_series() {
        let provider = Arc::new(MockProvider::new());
        let now = Utc::now().timestamp_millis();
        provider.set_history("bitcoin", day_of_samples(now, 50));

        let chart = PriceHistoryTransformer::new(provider.clone(), settings(ErrorPolicy::LogOnly));
        let generation = chart.begin("bitcoin").await;
        assert!(chart.phase().await.is_loading());

        let outcome = chart.load("bitcoin", generation).await;
        assert!(matches!(outcome, ChartOutcome::Rendered(n) if n > 0));
        assert_eq!(
            chart.phase().await,
            ChartPhase::Rendered {
                asset_id: "bitcoin".into()
            }
        );
        assert_eq!(chart.series().await.unwrap().asset_label, "Bitcoin");
        assert_eq!(provider.calls(), vec!["history:bitcoin:1".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_series_silently() {
        let provider = Arc::new(MockProvider::new());
        let now = Utc::now().timestamp_millis();
        provider.set_history("bitcoin", day_of_samples(now, 50));
        provider.fail_history("ethereum", MockError::Status(500));

        let chart = PriceHistoryTransformer::new(provider, settings(ErrorPolicy::LogOnly));
        let g = chart.begin("bitcoin").await;
        chart.load("bitcoin", g).await;
        let before = chart.series().await;

        let g = chart.begin("ethereum").await;
        let outcome = chart.load("ethereum", g).await;

        assert!(matches!(outcome, ChartOutcome::Failed(_)));
        assert_eq!(chart.series().await, before);
        assert_eq!(
            chart.phase().await,
            ChartPhase::Failed {
                asset_id: "ethereum".into(),
                error: None
            }
        );
    }

    #[tokio::test]
    async fn test_visible_policy_records_error() {
        let provider = Arc::new(MockProvider::new());
        provider.fail_history("ethereum", MockError::Status(502));

        let chart = PriceHistoryTransformer::new(provider, settings(ErrorPolicy::Visible));
        let g = chart.begin("ethereum").await;
        chart.load("ethereum", g).await;

        match chart.phase().await {
            ChartPhase::Failed { error: Some(err), .. } => assert_eq!(err.kind(), "provider"),
            other => panic!("unexpected phase {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let provider = Arc::new(MockProvider::new());
        let now = Utc::now().timestamp_millis();
        provider.set_history("bitcoin", day_of_samples(now, 50));
        provider.set_history("ethereum", day_of_samples(now, 10));

        let chart = PriceHistoryTransformer::new(provider, settings(ErrorPolicy::LogOnly));
        let old = chart.begin("bitcoin").await;
        let new = chart.begin("ethereum").await;

        assert_eq!(chart.load("ethereum", new).await, ChartOutcome::Rendered(2));
        assert_eq!(chart.load("bitcoin", old).await, ChartOutcome::Discarded);
        assert_eq!(chart.series().await.unwrap().asset_label, "Ethereum");
    }

    #[tokio::test]
    async fn test_clear_invalidates_in_flight_request() {
        let provider = Arc::new(MockProvider::new());
        provider.set_history("bitcoin", vec![]);

        let chart = PriceHistoryTransformer::new(provider, settings(ErrorPolicy::LogOnly));
        let g = chart.begin("bitcoin").await;
        chart.clear().await;

        assert_eq!(chart.load("bitcoin", g).await, ChartOutcome::Discarded);
        assert_eq!(chart.phase().await, ChartPhase::NoSelection);
        assert!(chart.series().await.is_none());
    }
}
