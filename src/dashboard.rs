//! Dashboard coordinator
//!
//! Composes the three flows around one provider and consumes the two
//! presentation events: "search submitted" and "asset selected".

use crate::{
    config::DashboardConfig,
    error::{FlowError, ProviderError},
    flows::{
        chart::{ChartOutcome, ChartSettings},
        PriceHistoryTransformer, SearchResolver, SnapshotFetcher,
    },
    format::DisplayRow,
    provider::MarketDataProvider,
    providers::CoinGeckoProvider,
    state::{ChartPhase, FlowStatus, PrimaryView, SearchPhase},
    store::SelectionStore,
    types::{AssetDetail, AssetSummary, ChartSeries, DashboardEvent},
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Point-in-time copy of everything the renderer needs
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub primary: PrimaryView,
    pub snapshot: FlowStatus<Vec<AssetSummary>>,
    pub search: SearchPhase,
    pub selected_asset_id: Option<String>,
    pub chart: ChartPhase,
    pub chart_series: Option<ChartSeries>,
}

impl DashboardView {
    /// True while the snapshot or a search is outstanding
    pub fn is_loading(&self) -> bool {
        self.snapshot.is_loading() || self.search.is_loading()
    }

    pub fn is_chart_loading(&self) -> bool {
        self.chart.is_loading()
    }

    /// Inline error banner text, if any
    ///
    /// Validation failures are excluded; they surface through
    /// [`validation_prompt`](Self::validation_prompt) instead. A snapshot
    /// failure is only reported while the list is the primary view.
    pub fn error_banner(&self) -> Option<String> {
        let search_error = self.search.error().filter(|e| !e.is_blocking_prompt());
        let snapshot_error = match self.primary {
            PrimaryView::SnapshotList(_) => self.snapshot.error(),
            PrimaryView::SearchDetail(_) => None,
        };
        search_error.or(snapshot_error).map(|e| e.to_string())
    }

    /// Blocking prompt text for a rejected blank search
    pub fn validation_prompt(&self) -> Option<String> {
        self.search
            .error()
            .filter(|e| e.is_blocking_prompt())
            .map(|e| e.to_string())
    }

    /// Formatted rows of the primary view
    pub fn rows(&self) -> Vec<DisplayRow> {
        match &self.primary {
            PrimaryView::SnapshotList(assets) => assets.iter().map(DisplayRow::from).collect(),
            PrimaryView::SearchDetail(detail) => vec![DisplayRow::from(detail)],
        }
    }
}

/// Market dashboard core
///
/// # Example
/// ```no_run
/// use market_dashboard_sdk::{Dashboard, DashboardConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let dashboard = Dashboard::new(DashboardConfig::default())?;
/// dashboard.initialize().await?;
///
/// let detail = dashboard.submit_search("bitcoin").await?;
/// println!("{} ${}", detail.name, detail.market_data.current_price_usd);
///
/// dashboard.wait_for_chart().await;
/// if let Some(series) = dashboard.view().await.chart_series {
///     println!("{}: {} points", series.asset_label, series.points.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct Dashboard {
    provider: Arc<dyn MarketDataProvider>,
    snapshot: SnapshotFetcher,
    search: SearchResolver,
    chart: Arc<PriceHistoryTransformer>,
    store: Arc<SelectionStore>,
    chart_task: Mutex<Option<JoinHandle<()>>>,
    search_gate: Mutex<()>,
}

impl Dashboard {
    /// Creates a dashboard backed by CoinGecko
    pub fn new(config: DashboardConfig) -> Result<Self, ProviderError> {
        let provider = Arc::new(CoinGeckoProvider::new(&config)?);
        Ok(Self::with_provider(provider, config))
    }

    /// Creates a CoinGecko-backed dashboard configured from the environment
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(DashboardConfig::from_env()?)
    }

    /// Creates a dashboard with a custom provider
    pub fn with_provider(provider: Arc<dyn MarketDataProvider>, config: DashboardConfig) -> Self {
        let policies = config.error_policies;
        let snapshot =
            SnapshotFetcher::new(provider.clone(), config.snapshot_size, policies.snapshot);
        let search = SearchResolver::new(provider.clone(), policies.search);
        let chart = Arc::new(PriceHistoryTransformer::new(
            provider.clone(),
            ChartSettings {
                days: config.chart_days,
                window_ms: config.chart_window_ms,
                timezone: config.label_timezone,
                policy: policies.chart,
            },
        ));

        Self {
            provider,
            snapshot,
            search,
            chart,
            store: Arc::new(SelectionStore::new()),
            chart_task: Mutex::new(None),
            search_gate: Mutex::new(()),
        }
    }

    /// Loads the market snapshot
    ///
    /// Only the first call issues a request; later calls return `Ok(())`.
    pub async fn initialize(&self) -> Result<(), FlowError> {
        match self.snapshot.run().await {
            None => Ok(()),
            Some(Ok(count)) => {
                self.store.publish(DashboardEvent::SnapshotLoaded {
                    id: Uuid::new_v4(),
                    count,
                    timestamp: Utc::now(),
                });
                Ok(())
            }
            Some(Err(err)) => {
                self.store.publish(DashboardEvent::SnapshotFailed {
                    id: Uuid::new_v4(),
                    error_message: err.to_string(),
                    timestamp: Utc::now(),
                });
                Err(err)
            }
        }
    }

    /// Handles a submitted search
    ///
    /// On success the detail becomes the primary view and the chart follows
    /// the resolved asset. On any failure the detail and the selection are
    /// cleared. Submissions are handled one at a time in arrival order.
    pub async fn submit_search(&self, query: &str) -> Result<AssetDetail, FlowError> {
        let _serial = self.search_gate.lock().await;

        match self.search.submit(query).await {
            Ok(detail) => {
                self.store.publish(DashboardEvent::SearchResolved {
                    id: Uuid::new_v4(),
                    query: query.to_string(),
                    asset_id: detail.id.clone(),
                    timestamp: Utc::now(),
                });
                self.select_asset(&detail.id).await;
                Ok(detail)
            }
            Err(err) => {
                self.clear_selection().await;
                self.store.publish(DashboardEvent::SearchFailed {
                    id: Uuid::new_v4(),
                    query: query.to_string(),
                    error_kind: err.kind().to_string(),
                    error_message: err.to_string(),
                    timestamp: Utc::now(),
                });
                Err(err)
            }
        }
    }

    /// Handles a click on an asset, from the list or after a search
    ///
    /// Always reloads the chart, even for the already selected asset. Any
    /// chart request still in flight is cancelled.
    pub async fn select_asset(&self, asset_id: &str) {
        let asset_id = asset_id.trim();
        if asset_id.is_empty() {
            self.clear_selection().await;
            return;
        }

        // The guard serializes selection changes so the selected id and the
        // chart phase always name the same asset.
        let mut task = self.chart_task.lock().await;
        if let Some(previous) = task.take() {
            previous.abort();
        }

        self.store.set_selected(Some(asset_id.to_string())).await;
        let generation = self.chart.begin(asset_id).await;
        let chart = self.chart.clone();
        let store = self.store.clone();
        let asset_id = asset_id.to_string();

        *task = Some(tokio::spawn(async move {
            if let ChartOutcome::Rendered(points) = chart.load(&asset_id, generation).await {
                store.publish(DashboardEvent::ChartUpdated {
                    id: Uuid::new_v4(),
                    asset_id,
                    points,
                    timestamp: Utc::now(),
                });
            }
        }));
    }

    /// Clears the selection and dismisses the chart
    async fn clear_selection(&self) {
        let mut task = self.chart_task.lock().await;
        if let Some(previous) = task.take() {
            previous.abort();
        }
        self.chart.clear().await;
        self.store.set_selected(None).await;
    }

    /// Waits for the current chart request, if any, to settle
    pub async fn wait_for_chart(&self) {
        let handle = self.chart_task.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    tracing::warn!(error = %e, "Chart task ended abnormally");
                }
            }
        }
    }

    /// Returns a snapshot of the current state of all flows
    pub async fn view(&self) -> DashboardView {
        let snapshot = self.snapshot.status().await;
        let search = self.search.phase().await;
        let primary = PrimaryView::resolve(&snapshot, &search);

        DashboardView {
            primary,
            snapshot,
            search,
            selected_asset_id: self.store.selected().await,
            chart: self.chart.phase().await,
            chart_series: self.chart.series().await,
        }
    }

    /// Subscribes to dashboard events
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.store.subscribe()
    }

    /// Returns the name of the current provider
    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }
}
