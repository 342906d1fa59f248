//! One render pass of the pie page: load, pick columns, aggregate, group, draw.

use crate::charts::{ChartBackend, ChartOutput, PieChart};
use crate::config::PageConfig;
use crate::pie::aggregate::{aggregate, clamp_top_n, top_n_range, AggregatedSeries};
use crate::pie::error::PieError;
use crate::pie::loader::load_csv;
use crate::utils::format_total;
use crate::view::{Notice, PageHeader};
use log::{debug, warn};
use polars::frame::DataFrame;
use std::fmt;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::sync::Arc;

/// User-controlled options of the pie page.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSettings {
    /// Selected category column; `None` uses the guess.
    pub category: Option<String>,
    /// Selected value column; `None` uses the guess.
    pub value: Option<String>,
    pub donut: bool,
    pub sort_desc: bool,
    /// Requested top-N; clamped against the data on every render.
    pub top_n: Option<usize>,
}

impl Default for PieSettings {
    fn default() -> Self {
        Self {
            category: None,
            value: None,
            donut: true,
            sort_desc: true,
            top_n: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PieEvent {
    SelectCategory(String),
    SelectValue(String),
    SetDonut(bool),
    SetSortDesc(bool),
    SetTopN(usize),
}

impl PieSettings {
    pub fn apply(&mut self, event: PieEvent) {
        match event {
            PieEvent::SelectCategory(column) => self.category = Some(column),
            PieEvent::SelectValue(column) => self.value = Some(column),
            PieEvent::SetDonut(donut) => self.donut = donut,
            PieEvent::SetSortDesc(sort_desc) => self.sort_desc = sort_desc,
            PieEvent::SetTopN(n) => self.top_n = Some(n),
        }
    }
}

/// Everything the pie page shows after a successful render.
#[derive(Debug, Clone)]
pub struct PieView {
    pub header: PageHeader,
    pub notices: Vec<Notice>,
    pub columns: Vec<String>,
    pub category: String,
    pub value: String,
    pub donut: bool,
    pub sort_desc: bool,
    pub top_n: usize,
    pub top_n_range: RangeInclusive<usize>,
    pub series: AggregatedSeries,
    pub chart: Option<ChartOutput>,
    pub preview: DataFrame,
    pub footer: String,
}

impl PieView {
    pub fn total(&self) -> f64 {
        self.series.total()
    }
}

impl fmt::Display for PieView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        for notice in &self.notices {
            writeln!(f, "{notice}")?;
        }
        writeln!(f, "Settings")?;
        writeln!(f, "  Category column:  {}  (options: {})", self.category, self.columns.join(", "))?;
        writeln!(f, "  Value column:     {}", self.value)?;
        writeln!(f, "  Donut style:      {}", on_off(self.donut))?;
        writeln!(f, "  Sort by value:    {}", on_off(self.sort_desc))?;
        writeln!(
            f,
            "  Show top N:       {}  ({}..={})",
            self.top_n,
            self.top_n_range.start(),
            self.top_n_range.end()
        )?;
        writeln!(f, "Total: {}", format_total(self.total()))?;
        if let Some(chart) = &self.chart {
            writeln!(f, "{chart}")?;
        }
        writeln!(f, "Preview data")?;
        writeln!(f, "{}", self.preview)?;
        write!(f, "{}", self.footer)
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

pub fn pie_header() -> PageHeader {
    PageHeader {
        config: PageConfig::PIE,
        heading: "Pie / Donut Chart".to_string(),
        caption: None,
    }
}

pub struct PiePage {
    csv_path: PathBuf,
    charts: Arc<dyn ChartBackend>,
}

impl PiePage {
    pub fn new(csv_path: PathBuf, charts: Arc<dyn ChartBackend>) -> Self {
        Self { csv_path, charts }
    }

    /// Runs one render pass with `settings`.
    ///
    /// A chart backend failure is reported as a notice; the rest of the view is still built.
    ///
    /// # Errors
    ///
    /// Any [`PieError`] from loading or aggregating halts the render.
    pub async fn render(
        &self,
        settings: &PieSettings,
        chart_stem: &str,
    ) -> Result<PieView, PieError> {
        let dataset = load_csv(&self.csv_path).await?;

        let category = dataset.resolve_column(settings.category.as_deref(), dataset.category_guess);
        let value = dataset.resolve_column(settings.value.as_deref(), dataset.value_guess);
        debug!("Rendering pie for category '{}' and value '{}'", category, value);

        let full = aggregate(&dataset.frame, &category, &value, settings.sort_desc)?;
        let top_n_range = top_n_range(full.len());
        let top_n = clamp_top_n(settings.top_n, full.len());
        let series = full.group_top_n(top_n);

        let mut notices = Vec::new();
        let chart = match self.charts.render_pie(&PieChart {
            file_stem: chart_stem,
            title: &format!("{category} by {value}"),
            slices: &series.slices,
            donut: settings.donut,
        }) {
            Ok(output) => Some(output),
            Err(e) => {
                warn!("Pie chart could not be rendered: {e}");
                notices.push(Notice::warning(format!("Chart unavailable: {e}")));
                None
            }
        };

        let preview = series.to_frame()?;
        let footer = format!(
            "Reads from `{}`. Pick columns, toggle donut, sort, and group to Top-N.",
            self.csv_path.display()
        );

        Ok(PieView {
            header: pie_header(),
            notices,
            columns: dataset.column_names(),
            category,
            value,
            donut: settings.donut,
            sort_desc: settings.sort_desc,
            top_n,
            top_n_range,
            series,
            chart,
            preview,
            footer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::TextBackend;
    use crate::pie::aggregate::{Slice, OTHER_LABEL};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn page_for(contents: &str) -> Result<(NamedTempFile, PiePage), std::io::Error> {
        let mut file = NamedTempFile::new()?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        let page = PiePage::new(file.path().to_path_buf(), Arc::new(TextBackend::default()));
        Ok((file, page))
    }

    #[tokio::test]
    async fn test_render_top_two() -> Result<(), Box<dyn std::error::Error>> {
        let (_file, page) = page_for("Category,Value\nA,10\nB,5\nC,3\nD,2\n")?;
        let mut settings = PieSettings::default();
        settings.apply(PieEvent::SetTopN(2));

        let view = page.render(&settings, "pie").await?;
        assert_eq!(
            view.series.slices,
            vec![
                Slice::new("A", 10.0),
                Slice::new("B", 5.0),
                Slice::new(OTHER_LABEL, 5.0)
            ]
        );
        assert_eq!(format_total(view.total()), "20.00");
        assert_eq!(view.top_n_range, 1..=4);
        assert!(view.to_string().contains("Total: 20.00"));
        assert!(matches!(view.chart, Some(ChartOutput::Text(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_user_overrides_columns() -> Result<(), Box<dyn std::error::Error>> {
        let (_file, page) = page_for("team,city,points,games\nred,Oslo,3,1\nblue,Oslo,4,2\nred,Rome,1,5\n")?;
        let mut settings = PieSettings::default();
        settings.apply(PieEvent::SelectCategory("city".into()));
        settings.apply(PieEvent::SelectValue("games".into()));
        settings.apply(PieEvent::SetSortDesc(false));

        let view = page.render(&settings, "pie").await?;
        assert_eq!(view.category, "city");
        assert_eq!(view.value, "games");
        assert_eq!(
            view.series.slices,
            vec![Slice::new("Oslo", 3.0), Slice::new("Rome", 5.0)]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_default_top_n_is_six() -> Result<(), Box<dyn std::error::Error>> {
        let rows: String = (0..9).map(|i| format!("c{i},{}\n", i + 1)).collect();
        let (_file, page) = page_for(&format!("Category,Value\n{rows}"))?;

        let view = page.render(&PieSettings::default(), "pie").await?;
        assert_eq!(view.top_n, 6);
        assert_eq!(view.series.len(), 7);
        assert_eq!(view.series.get(OTHER_LABEL), Some(1.0 + 2.0 + 3.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_late_non_numeric_value_is_dropped() -> Result<(), Box<dyn std::error::Error>> {
        let rows: String = (0..150).map(|i| format!("c{},{}\n", i % 5, i)).collect();
        let (_file, page) = page_for(&format!("Category,Value\n{rows}c1,n/a\n"))?;

        let view = page.render(&PieSettings::default(), "pie").await?;
        assert_eq!(view.value, "Value");
        assert_eq!(view.series.len(), 5);
        assert_eq!(format_total(view.total()), "11,175.00");
        Ok(())
    }

    #[tokio::test]
    async fn test_unusable_data_halts() -> Result<(), Box<dyn std::error::Error>> {
        let (_file, page) = page_for("Category,Value\nA,x\nB,y\n")?;
        let result = page.render(&PieSettings::default(), "pie").await;
        assert!(matches!(result, Err(PieError::NoUsableRows)));
        Ok(())
    }
}
