use crate::charts::{select_backend, ChartBackend};
use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::pie::page::PiePage;
use crate::session::Session;
use crate::weather::fetcher::WeatherFetcher;
use crate::weather::page::WeatherPage;
use log::info;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Process-wide state shared by all sessions: configuration, the cached weather
/// fetcher and the chart backend.
///
/// # Examples
///
/// ```no_run
/// use dashlab::{Dashboard, DashboardConfig, DashboardEvent, ActivePage};
///
/// # async fn demo() -> Result<(), dashlab::DashboardError> {
/// let dashboard = Dashboard::new(DashboardConfig::default())?;
/// let mut session = dashboard.open_session();
/// session.dispatch(DashboardEvent::ShowPage(ActivePage::Weather)).await;
/// # Ok(())
/// # }
/// ```
pub struct Dashboard {
    config: DashboardConfig,
    fetcher: Arc<WeatherFetcher>,
    charts: Arc<dyn ChartBackend>,
    next_session: AtomicU64,
}

impl Dashboard {
    /// Builds the shared state.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::HttpClient`] if the HTTP client cannot be created.
    pub fn new(config: DashboardConfig) -> Result<Self, DashboardError> {
        let fetcher =
            WeatherFetcher::new(config.request_timeout, config.cache_ttl, config.timezone)
                .map_err(DashboardError::HttpClient)?;
        let charts = select_backend(config.chart_output_dir().as_deref());
        info!(
            "Dashboard ready: csv={}, charts={}",
            config.csv_file().display(),
            charts.name()
        );

        Ok(Self {
            config,
            fetcher: Arc::new(fetcher),
            charts,
            next_session: AtomicU64::new(1),
        })
    }

    /// Starts a new session with fresh settings and an empty weather history.
    pub fn open_session(&self) -> Session {
        let id = self.next_session.fetch_add(1, Ordering::Relaxed);
        info!("Opening session {id}");
        let pie = PiePage::new(self.config.csv_file(), Arc::clone(&self.charts));
        let weather = WeatherPage::new(
            self.config.forecast_url(),
            Arc::clone(&self.fetcher),
            Arc::clone(&self.charts),
        );
        Session::new(id, &self.config, pie, weather)
    }
}
