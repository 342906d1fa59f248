//! Reads the pie page CSV and guesses which columns hold categories and values.

use crate::pie::error::PieError;
use log::{debug, info};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tokio::task;

/// A CSV loaded for the pie page, together with the default column picks.
#[derive(Debug, Clone)]
pub struct PieDataset {
    pub path: PathBuf,
    pub frame: DataFrame,
    /// Index of the first text column, or 0.
    pub category_guess: usize,
    /// Index of the first numeric column, or the last column.
    pub value_guess: usize,
}

impl PieDataset {
    /// Validates the shape of `frame` and computes the column guesses.
    ///
    /// # Errors
    ///
    /// Returns [`PieError::InvalidShape`] when the frame has fewer than two columns or no rows.
    pub fn from_frame(path: impl Into<PathBuf>, frame: DataFrame) -> Result<Self, PieError> {
        if frame.width() < 2 || frame.height() == 0 {
            return Err(PieError::InvalidShape {
                columns: frame.width(),
                rows: frame.height(),
            });
        }

        let category_guess = guess_category_column(&frame);
        let value_guess = guess_value_column(&frame);
        debug!(
            "Guessed category column {} and value column {}",
            category_guess, value_guess
        );

        Ok(Self {
            path: path.into(),
            frame,
            category_guess,
            value_guess,
        })
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame
            .get_column_names()
            .iter()
            .any(|column| column.as_str() == name)
    }

    /// Returns `selected` if it names an existing column, otherwise the column at `guess`.
    pub fn resolve_column(&self, selected: Option<&str>, guess: usize) -> String {
        match selected {
            Some(name) if self.has_column(name) => name.to_string(),
            _ => self.column_names().swap_remove(guess),
        }
    }
}

/// Loads `path` into a [`PieDataset`]. CSV parsing runs on a blocking task.
///
/// # Errors
///
/// * [`PieError::MissingFile`] if there is no file at `path`.
/// * [`PieError::EmptyFile`] if the file has zero bytes.
/// * [`PieError::CsvRead`] if polars cannot parse it.
/// * [`PieError::InvalidShape`] if it has fewer than two columns or no data rows.
pub async fn load_csv(path: &Path) -> Result<PieDataset, PieError> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PieError::MissingFile(path.to_path_buf()))
        }
        Err(e) => return Err(PieError::Metadata(path.to_path_buf(), e)),
    };
    if metadata.len() == 0 {
        return Err(PieError::EmptyFile(path.to_path_buf()));
    }

    let path_buf = path.to_path_buf();
    let frame = task::spawn_blocking(move || {
        // Scan every row: a late non-numeric entry must not fail the read.
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .try_into_reader_with_file_path(Some(path_buf.clone()))
            .map_err(|e| PieError::CsvRead {
                path: path_buf.clone(),
                source: e,
            })?
            .finish()
            .map_err(|e| PieError::CsvRead {
                path: path_buf,
                source: e,
            })
    })
    .await??;

    info!(
        "Loaded {} rows x {} columns from {}",
        frame.height(),
        frame.width(),
        path.display()
    );
    PieDataset::from_frame(path, frame)
}

fn is_numeric(dtype: &DataType) -> bool {
    dtype.is_integer() || dtype.is_float()
}

pub fn guess_category_column(frame: &DataFrame) -> usize {
    frame
        .get_columns()
        .iter()
        .position(|column| column.dtype() == &DataType::String)
        .unwrap_or(0)
}

pub fn guess_value_column(frame: &DataFrame) -> usize {
    frame
        .get_columns()
        .iter()
        .position(|column| is_numeric(column.dtype()))
        .unwrap_or(frame.width().saturating_sub(1))
}
