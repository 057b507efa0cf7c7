//! Error types for dataset loading.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the store error type.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Everything that can stop the dataset store from being built.
///
/// All variants are fatal at startup; once a store exists no further errors
/// are produced by the aggregation or chart layers.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Neither `<name>.csv` nor `<name>.parquet` exists in the data directory
    #[error("Dataset '{name}' not found in {}: expected {name}.csv or {name}.parquet", dir.display())]
    MissingFile { name: String, dir: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A column the typed record needs is absent from the header
    #[error("{} is missing required column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// A cell could not be converted to the column's type
    #[error("{} row {row}, column '{column}': {message}", path.display())]
    InvalidValue {
        path: PathBuf,
        row: usize,
        column: String,
        message: String,
    },

    #[error("Failed to read parquet file {}: {source}", path.display())]
    Parquet {
        path: PathBuf,
        #[source]
        source: parquet::errors::ParquetError,
    },

    #[error("Arrow error in {}: {source}", path.display())]
    Arrow {
        path: PathBuf,
        #[source]
        source: arrow::error::ArrowError,
    },

    #[error("Unsupported file extension for {}", path.display())]
    UnsupportedFormat { path: PathBuf },
}

impl StoreError {
    /// The file the error refers to.
    pub fn path(&self) -> PathBuf {
        match self {
            StoreError::MissingFile { name, dir } => dir.join(format!("{name}.csv")),
            StoreError::Io { path, .. }
            | StoreError::Csv { path, .. }
            | StoreError::MissingColumn { path, .. }
            | StoreError::InvalidValue { path, .. }
            | StoreError::Parquet { path, .. }
            | StoreError::Arrow { path, .. }
            | StoreError::UnsupportedFormat { path } => path.clone(),
        }
    }
}
