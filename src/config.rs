//! Process-wide configuration for both dashboard pages.
//!
//! Every field has a default, so `DashboardConfig::builder().build()` yields the
//! stock setup: the demo CSV under `data/`, Denver as weather location and a
//! ten-minute fetch cache.

use bon::Builder;
use chrono_tz::Tz;
use std::path::PathBuf;
use std::time::Duration;

/// Base endpoint of the Open-Meteo forecast API.
pub const OPEN_METEO_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Shortest allowed auto-refresh interval, in seconds.
pub const MIN_REFRESH_SECS: u64 = 10;
/// Longest allowed auto-refresh interval, in seconds.
pub const MAX_REFRESH_SECS: u64 = 120;

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
///
/// # Examples
///
/// ```
/// use dashlab::LatLon;
///
/// let denver = LatLon(39.7392, -104.9903);
/// assert_eq!(denver.0, 39.7392); // Latitude
/// assert_eq!(denver.1, -104.9903); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

/// Coordinates used by the weather page when nothing else is configured.
pub const DENVER: LatLon = LatLon(39.7392, -104.9903);

/// Horizontal layout hint for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    Centered,
    Wide,
}

/// Title, icon and layout of a page. Set once when the page is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConfig {
    pub title: &'static str,
    pub icon: &'static str,
    pub layout: Layout,
}

impl PageConfig {
    pub const PIE: PageConfig = PageConfig {
        title: "Pie / Donut Chart",
        icon: "🥧",
        layout: Layout::Centered,
    };

    pub const WEATHER: PageConfig = PageConfig {
        title: "Live API Demo (Simple)",
        icon: "📡",
        layout: Layout::Wide,
    };
}

/// Configuration shared by every session of a [`crate::Dashboard`].
///
/// # Examples
///
/// ```
/// use dashlab::{DashboardConfig, LatLon};
/// use std::time::Duration;
///
/// let config = DashboardConfig::builder()
///     .app_root("/srv/dashboards")
///     .location(LatLon(52.37, 4.89))
///     .timezone(chrono_tz::Europe::Amsterdam)
///     .cache_ttl(Duration::from_secs(60))
///     .build();
///
/// assert_eq!(config.request_timeout, Duration::from_secs(10));
/// assert!(config.csv_file().ends_with("data/pie_demo.csv"));
/// ```
#[derive(Debug, Clone, Builder)]
pub struct DashboardConfig {
    /// Directory the relative paths below are resolved against.
    #[builder(into, default = PathBuf::from("."))]
    pub app_root: PathBuf,

    /// CSV read by the pie page, relative to `app_root` unless absolute.
    #[builder(into, default = PathBuf::from("data").join("pie_demo.csv"))]
    pub csv_path: PathBuf,

    #[builder(default = DENVER)]
    pub location: LatLon,

    /// Zone the weather readings are converted to for display.
    #[builder(default = chrono_tz::America::Denver)]
    pub timezone: Tz,

    #[builder(into, default = OPEN_METEO_FORECAST_URL.to_string())]
    pub forecast_base_url: String,

    #[builder(default = Duration::from_secs(10))]
    pub request_timeout: Duration,

    /// How long a fetch outcome is served from cache.
    #[builder(default = Duration::from_secs(600))]
    pub cache_ttl: Duration,

    /// Initial auto-refresh interval of new sessions.
    #[builder(default = Duration::from_secs(30))]
    pub refresh_interval: Duration,

    /// Output directory of the HTML (Plotly) chart backend. Without one, charts are rendered as text.
    #[builder(into)]
    pub chart_dir: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl DashboardConfig {
    /// Absolute (or `app_root`-relative) location of the pie page CSV.
    pub fn csv_file(&self) -> PathBuf {
        self.app_root.join(&self.csv_path)
    }

    /// Chart directory resolved against `app_root`.
    pub fn chart_output_dir(&self) -> Option<PathBuf> {
        self.chart_dir.as_ref().map(|dir| self.app_root.join(dir))
    }

    /// The request URL of the weather page.
    pub fn forecast_url(&self) -> String {
        format!(
            "{}?latitude={}&longitude={}&current=temperature_2m,wind_speed_10m",
            self.forecast_base_url, self.location.0, self.location.1
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_forecast_url_targets_denver() {
        let config = DashboardConfig::default();
        assert_eq!(
            config.forecast_url(),
            "https://api.open-meteo.com/v1/forecast?latitude=39.7392&longitude=-104.9903&current=temperature_2m,wind_speed_10m"
        );
        assert_eq!(config.timezone, chrono_tz::America::Denver);
        assert_eq!(config.cache_ttl, Duration::from_secs(600));
        assert!(config.chart_output_dir().is_none());
    }

    #[test]
    fn csv_path_resolves_against_app_root() {
        let config = DashboardConfig::builder()
            .app_root("/tmp/app")
            .chart_dir("charts")
            .build();
        assert_eq!(config.csv_file(), PathBuf::from("/tmp/app/data/pie_demo.csv"));
        assert_eq!(
            config.chart_output_dir(),
            Some(PathBuf::from("/tmp/app/charts"))
        );
    }
}
