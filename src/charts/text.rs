use crate::charts::{drawable, ChartBackend, ChartError, ChartOutput, LineChart, PieChart};
use crate::utils::format_percent;
use std::fmt::Write as _;

const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Renders charts as plain terminal text. Always available.
#[derive(Debug, Clone)]
pub struct TextBackend {
    bar_width: usize,
}

impl Default for TextBackend {
    fn default() -> Self {
        Self { bar_width: 30 }
    }
}

impl ChartBackend for TextBackend {
    fn name(&self) -> &'static str {
        "text"
    }

    fn render_pie(&self, chart: &PieChart<'_>) -> Result<ChartOutput, ChartError> {
        let (slices, total) = drawable(chart.slices);
        if slices.is_empty() || total <= 0.0 {
            return Err(ChartError::NoData(chart.title.to_string()));
        }

        let label_width = slices.iter().map(|s| s.label.chars().count()).max().unwrap_or(0);
        let style = if chart.donut { "donut" } else { "pie" };
        let mut out = format!("{} ({style})\n", chart.title);
        for slice in slices {
            let filled = ((slice.value / total) * self.bar_width as f64).round() as usize;
            writeln!(
                out,
                "  {:<label_width$}  {:<bar$}  {:>6}",
                slice.label,
                "█".repeat(filled.max(1)),
                format_percent(slice.value, total),
                bar = self.bar_width,
            )?;
        }
        Ok(ChartOutput::Text(out))
    }

    fn render_line(&self, chart: &LineChart<'_>) -> Result<ChartOutput, ChartError> {
        if chart.x_labels.is_empty() || chart.series.iter().all(|s| s.values.is_empty()) {
            return Err(ChartError::NoData(chart.title.to_string()));
        }

        let name_width = chart.series.iter().map(|s| s.name.chars().count()).max().unwrap_or(0);
        let mut out = format!("{}\n", chart.title);
        for series in chart.series {
            let (min, max) = series
                .values
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
            writeln!(
                out,
                "  {:<name_width$}  {}  ({min:.1} .. {max:.1})",
                series.name,
                sparkline(&series.values),
            )?;
        }
        let first = &chart.x_labels[0];
        let last = &chart.x_labels[chart.x_labels.len() - 1];
        writeln!(out, "  {first} .. {last}")?;
        Ok(ChartOutput::Text(out))
    }
}

fn sparkline(values: &[f64]) -> String {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let span = max - min;
    values
        .iter()
        .map(|v| {
            if span <= f64::EPSILON {
                SPARKS[SPARKS.len() / 2]
            } else {
                let level = ((v - min) / span * (SPARKS.len() - 1) as f64).round() as usize;
                SPARKS[level.min(SPARKS.len() - 1)]
            }
        })
        .collect()
}
