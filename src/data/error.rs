use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading and cleaning a listings file.
#[derive(Error, Debug)]
pub enum DataError {
    /// The configured path does not exist or cannot be opened.
    #[error("data source not found: {}", path.display())]
    DataSourceNotFound { path: PathBuf },

    /// A value in a kept column could not be converted to its type.
    #[error("parse error at row {row}, column '{column}': '{value}' cannot be parsed as {expected}")]
    Parse {
        row: usize,
        column: &'static str,
        value: String,
        expected: &'static str,
    },

    /// The file lacks one of the required columns.
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    /// Malformed CSV, or a read failure underneath it (including a corrupt
    /// gzip stream).
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

pub type Result<T> = std::result::Result<T, DataError>;
