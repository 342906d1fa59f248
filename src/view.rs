//! Rendered pages as produced by one render pass.

use crate::config::{Layout, PageConfig};
use crate::pie::page::PieView;
use crate::weather::page::WeatherView;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// A message shown above the page content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}

/// Title block of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHeader {
    pub config: PageConfig,
    pub heading: String,
    pub caption: Option<String>,
}

impl fmt::Display for PageHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule_len = match self.config.layout {
            Layout::Wide => 72,
            Layout::Centered => 48,
        };
        writeln!(f, "{}", "=".repeat(rule_len))?;
        writeln!(f, "{} {}", self.config.icon, self.heading)?;
        if let Some(caption) = &self.caption {
            writeln!(f, "{caption}")?;
        }
        write!(f, "{}", "=".repeat(rule_len))
    }
}

/// The result of one render pass of a session.
#[derive(Debug, Clone)]
pub enum RenderedPage {
    Pie(PieView),
    Weather(WeatherView),
    /// The render stopped early; only the header and the reason are shown.
    Halted { header: PageHeader, notice: Notice },
}

impl fmt::Display for RenderedPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderedPage::Pie(view) => write!(f, "{view}"),
            RenderedPage::Weather(view) => write!(f, "{view}"),
            RenderedPage::Halted { header, notice } => write!(f, "{header}\n{notice}"),
        }
    }
}
