//! Interactive Plotly charts written as standalone HTML files.

use crate::charts::{drawable, ChartBackend, ChartError, ChartOutput, LineChart, PieChart, DONUT_HOLE};
use crate::utils::ensure_dir_exists;
use log::info;
use plotlars::{Line, Plot as _, Shape, Text, TimeSeriesPlot};
use plotly::common::Title;
use plotly::{Layout, Pie, Plot};
use polars::prelude::*;
use std::path::{Path, PathBuf};

/// Name of the x column in the frame handed to plotlars.
const TIME_COLUMN: &str = "time";

#[derive(Debug, Clone)]
pub struct HtmlBackend {
    dir: PathBuf,
}

impl HtmlBackend {
    /// Creates the backend, creating `dir` if needed.
    pub fn new(dir: &Path) -> std::io::Result<Self> {
        ensure_dir_exists(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, file_stem: &str, html: String) -> Result<ChartOutput, ChartError> {
        let path = self.dir.join(format!("{file_stem}.html"));
        std::fs::write(&path, html).map_err(|e| ChartError::Write(path.clone(), e))?;
        info!("Wrote chart {}", path.display());
        Ok(ChartOutput::File(path))
    }
}

impl ChartBackend for HtmlBackend {
    fn name(&self) -> &'static str {
        "html"
    }

    fn render_pie(&self, chart: &PieChart<'_>) -> Result<ChartOutput, ChartError> {
        self.write(chart.file_stem, pie_html(chart)?)
    }

    fn render_line(&self, chart: &LineChart<'_>) -> Result<ChartOutput, ChartError> {
        self.write(chart.file_stem, line_html(chart)?)
    }
}

/// Pie (or donut) trace with percent and label annotations, slices kept in the given order.
pub(crate) fn pie_plot(chart: &PieChart<'_>) -> Result<Plot, ChartError> {
    let (slices, total) = drawable(chart.slices);
    if slices.is_empty() || total <= 0.0 {
        return Err(ChartError::NoData(chart.title.to_string()));
    }

    let labels: Vec<String> = slices.iter().map(|s| s.label.clone()).collect();
    let values: Vec<f64> = slices.iter().map(|s| s.value).collect();

    let mut trace = Pie::new(values)
        .labels(labels)
        .text_info("percent+label")
        .sort(false);
    if chart.donut {
        trace = trace.hole(DONUT_HOLE);
    }

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(Layout::new().title(Title::with_text(chart.title)));
    Ok(plot)
}

pub(crate) fn pie_html(chart: &PieChart<'_>) -> Result<String, ChartError> {
    Ok(pie_plot(chart)?.to_html())
}

/// Frame with the x labels followed by one column per series.
fn line_frame(chart: &LineChart<'_>) -> PolarsResult<DataFrame> {
    let mut columns = vec![Column::new(TIME_COLUMN.into(), chart.x_labels)];
    for series in chart.series {
        columns.push(Column::new(series.name.as_str().into(), &series.values));
    }
    DataFrame::new(columns)
}

pub(crate) fn line_html(chart: &LineChart<'_>) -> Result<String, ChartError> {
    let Some((first, rest)) = chart.series.split_first() else {
        return Err(ChartError::NoData(chart.title.to_string()));
    };
    if chart.x_labels.is_empty() {
        return Err(ChartError::NoData(chart.title.to_string()));
    }

    let frame = line_frame(chart)?;
    let additional: Vec<&str> = rest.iter().map(|s| s.name.as_str()).collect();

    let html = TimeSeriesPlot::builder()
        .data(&frame)
        .x(TIME_COLUMN)
        .y(first.name.as_str())
        .additional_series(additional)
        .lines(vec![Line::Solid, Line::Dash])
        .with_shape(true)
        .shapes(vec![Shape::Circle, Shape::Square])
        .plot_title(Text::from(chart.title).size(18))
        .x_title("local time")
        .build()
        .to_html();
    Ok(html)
}
