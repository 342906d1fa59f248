//! One render pass of the weather page: fetch, fall back, accumulate, draw.

use crate::charts::{ChartBackend, ChartOutput, LineChart};
use crate::config::{PageConfig, MAX_REFRESH_SECS, MIN_REFRESH_SECS};
use crate::view::{Notice, PageHeader};
use crate::weather::fetcher::WeatherFetcher;
use crate::weather::history::SessionHistory;
use crate::weather::reading::WeatherReading;
use log::warn;
use polars::frame::DataFrame;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Refresh controls of the weather page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherSettings {
    interval: Duration,
    pub auto_refresh: bool,
}

impl WeatherSettings {
    pub fn new(interval: Duration) -> Self {
        let mut settings = Self {
            interval,
            auto_refresh: false,
        };
        settings.set_interval_secs(interval.as_secs());
        settings
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sets the refresh interval, clamped to 10..=120 seconds.
    pub fn set_interval_secs(&mut self, secs: u64) {
        self.interval = Duration::from_secs(secs.clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherEvent {
    SetInterval(u64),
    SetAutoRefresh(bool),
    /// Re-render on user request; cached data may be reused.
    Refresh,
    /// Timer-driven refresh from the given timer generation; drops the cached fetch first.
    Tick(u64),
}

#[derive(Debug, Clone)]
pub struct WeatherView {
    pub header: PageHeader,
    pub notices: Vec<Notice>,
    /// The reading merged during this render (live or sample).
    pub current: WeatherReading,
    pub live: bool,
    pub table: Option<DataFrame>,
    pub chart: Option<ChartOutput>,
    pub interval: Duration,
    pub auto_refresh: bool,
    pub history_len: usize,
}

impl fmt::Display for WeatherView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        for notice in &self.notices {
            writeln!(f, "{notice}")?;
        }
        writeln!(
            f,
            "Temperature: {:.1} °C    Wind: {:.1} km/h    ({}{})",
            self.current.temperature,
            self.current.wind_speed,
            self.current.time_local.format("%Y-%m-%d %H:%M %Z"),
            if self.live { "" } else { ", sample data" }
        )?;
        writeln!(
            f,
            "Refresh every {} s    Auto-refresh: {}    Points: {}",
            self.interval.as_secs(),
            if self.auto_refresh { "on" } else { "off" },
            self.history_len
        )?;
        if let Some(chart) = &self.chart {
            writeln!(f, "{chart}")?;
        }
        if let Some(table) = &self.table {
            writeln!(f, "{table}")?;
        }
        Ok(())
    }
}

pub fn weather_header() -> PageHeader {
    PageHeader {
        config: PageConfig::WEATHER,
        heading: "Simple Live Data Demo (Open-Meteo)".to_string(),
        caption: Some(
            "Friendly demo with manual refresh + fallback data so it never crashes.".to_string(),
        ),
    }
}

pub struct WeatherPage {
    url: String,
    fetcher: Arc<WeatherFetcher>,
    charts: Arc<dyn ChartBackend>,
}

impl WeatherPage {
    pub fn new(url: String, fetcher: Arc<WeatherFetcher>, charts: Arc<dyn ChartBackend>) -> Self {
        Self {
            url,
            fetcher,
            charts,
        }
    }

    /// Drops the cached outcome so the next render performs a request.
    pub async fn invalidate(&self) -> bool {
        self.fetcher.invalidate(&self.url).await
    }

    /// Runs one render pass, merging the fetched (or sample) reading into `history`.
    pub async fn render(
        &self,
        history: &mut SessionHistory,
        settings: &WeatherSettings,
        chart_stem: &str,
    ) -> WeatherView {
        let mut notices = Vec::new();
        let outcome = self.fetcher.fetch(&self.url).await;

        let live = outcome.is_success();
        let current = match outcome.reading {
            Some(reading) => reading,
            None => {
                let reason = outcome
                    .error
                    .unwrap_or_else(|| "no data returned".to_string());
                notices.push(Notice::warning(format!(
                    "Live fetch failed; showing sample data. ({reason})"
                )));
                WeatherReading::sample(self.fetcher.timezone())
            }
        };
        history.merge(current.clone());

        let table = match history.to_frame() {
            Ok(frame) => Some(frame),
            Err(e) => {
                warn!("History table could not be built: {e}");
                notices.push(Notice::warning(format!("Table unavailable: {e}")));
                None
            }
        };

        let x_labels = history.local_labels("%H:%M:%S");
        let series = history.chart_series();
        let chart = match self.charts.render_line(&LineChart {
            file_stem: chart_stem,
            title: "Temperature and wind (local time)",
            x_labels: &x_labels,
            series: &series,
        }) {
            Ok(output) => Some(output),
            Err(e) => {
                warn!("Weather chart could not be rendered: {e}");
                notices.push(Notice::warning(format!("Chart unavailable: {e}")));
                None
            }
        };

        WeatherView {
            header: weather_header(),
            notices,
            current,
            live,
            table,
            chart,
            interval: settings.interval(),
            auto_refresh: settings.auto_refresh,
            history_len: history.len(),
        }
    }
}
