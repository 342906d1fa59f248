mod charts;
mod commands;
mod config;
mod dashboard;
mod error;
mod pie;
mod refresh;
mod session;
mod utils;
mod view;
mod weather;

#[cfg(test)]
mod test_support;

pub use config::*;
pub use dashboard::Dashboard;
pub use error::DashboardError;
pub use session::{ActivePage, DashboardEvent, Dispatch, Session};
pub use view::{Notice, NoticeLevel, PageHeader, RenderedPage};

pub use commands::{parse_command, read_commands, Command, CommandError, HELP};
pub use refresh::RefreshDriver;

pub use charts::{
    select_backend, ChartBackend, ChartError, ChartOutput, LineChart, LineSeries, PieChart,
    HtmlBackend, TextBackend,
};

pub use pie::aggregate::{
    aggregate, clamp_top_n, top_n_range, AggregatedSeries, Slice, DEFAULT_TOP_N, MAX_TOP_N,
    OTHER_LABEL,
};
pub use pie::error::PieError;
pub use pie::loader::{guess_category_column, guess_value_column, load_csv, PieDataset};
pub use pie::page::{PieEvent, PiePage, PieSettings, PieView};

pub use weather::cache::TtlCache;
pub use weather::error::WeatherError;
pub use weather::fetcher::{FetchOutcome, WeatherFetcher};
pub use weather::history::SessionHistory;
pub use weather::page::{WeatherEvent, WeatherPage, WeatherSettings, WeatherView};
pub use weather::reading::{parse_api_timestamp, parse_current, WeatherReading};

pub use utils::{format_percent, format_total};
