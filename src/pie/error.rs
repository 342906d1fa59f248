use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PieError {
    #[error("Couldn't find '{0}'. Make sure your CSV is at data/pie_demo.csv.")]
    MissingFile(PathBuf),

    #[error("Failed to read metadata for '{0}'")]
    Metadata(PathBuf, #[source] std::io::Error),

    #[error("CSV file '{0}' is empty")]
    EmptyFile(PathBuf),

    #[error("Parsing error reading CSV file '{path}': {source}")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("CSV must have at least two columns (category + numeric), found {columns} column(s) and {rows} row(s)")]
    InvalidShape { columns: usize, rows: usize },

    #[error("Column '{0}' not found in the CSV")]
    ColumnNotFound(String),

    #[error("No usable data after cleaning. Check your CSV values.")]
    NoUsableRows,

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
