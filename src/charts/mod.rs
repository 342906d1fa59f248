//! Chart rendering backends.
//!
//! Pages describe a chart with [`PieChart`] or [`LineChart`] and hand it to whichever
//! [`ChartBackend`] was selected at startup by [`select_backend`].

pub mod html;
pub mod text;

use crate::pie::aggregate::Slice;
use log::debug;
use polars::error::PolarsError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub use html::HtmlBackend;
pub use text::TextBackend;

/// Inner-hole radius of a donut, relative to the outer radius.
pub const DONUT_HOLE: f64 = 0.5;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Failed to write chart file '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Nothing to draw for chart '{0}'")]
    NoData(String),

    #[error("Failed to build chart data: {0}")]
    Frame(#[from] PolarsError),

    #[error("Failed to format chart text")]
    Format(#[from] std::fmt::Error),
}

/// A pie or donut chart over already aggregated slices.
#[derive(Debug, Clone, Copy)]
pub struct PieChart<'a> {
    /// Base name for file-producing backends.
    pub file_stem: &'a str,
    pub title: &'a str,
    pub slices: &'a [Slice],
    pub donut: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// One or more series sharing an x axis of `x_labels`.
#[derive(Debug, Clone, Copy)]
pub struct LineChart<'a> {
    pub file_stem: &'a str,
    pub title: &'a str,
    pub x_labels: &'a [String],
    pub series: &'a [LineSeries],
}

/// What a backend produced for one chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutput {
    /// Chart drawn as terminal text.
    Text(String),
    /// Chart written to a file.
    File(PathBuf),
}

impl fmt::Display for ChartOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartOutput::Text(text) => write!(f, "{text}"),
            ChartOutput::File(path) => write!(f, "Chart written to {}", path.display()),
        }
    }
}

pub trait ChartBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn render_pie(&self, chart: &PieChart<'_>) -> Result<ChartOutput, ChartError>;

    fn render_line(&self, chart: &LineChart<'_>) -> Result<ChartOutput, ChartError>;
}

/// Picks the HTML backend when `chart_dir` is usable, the text backend otherwise.
pub fn select_backend(chart_dir: Option<&Path>) -> Arc<dyn ChartBackend> {
    match chart_dir.map(HtmlBackend::new) {
        Some(Ok(backend)) => {
            debug!("Using HTML chart backend in {}", backend.dir().display());
            Arc::new(backend)
        }
        Some(Err(e)) => {
            debug!("HTML chart backend unavailable ({e}), falling back to text charts");
            Arc::new(TextBackend::default())
        }
        None => Arc::new(TextBackend::default()),
    }
}

/// Positive slice values and their sum; pies cannot draw the rest.
pub(crate) fn drawable(slices: &[Slice]) -> (Vec<&Slice>, f64) {
    let positive: Vec<&Slice> = slices.iter().filter(|s| s.value > 0.0).collect();
    let total = positive.iter().map(|s| s.value).sum();
    (positive, total)
}
