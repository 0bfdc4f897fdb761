use crate::types::parameter::Parameter;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Required source table for {parameter} not found at '{path}'")]
    MissingSource { parameter: Parameter, path: PathBuf },

    #[error("Failed to read source table '{0}'")]
    SourceRead(PathBuf, #[source] PolarsError),

    #[error("Source table '{0}' has no rows")]
    EmptySource(PathBuf),

    #[error("Malformed timestamp '{value}' in row {row} of '{path}'")]
    MalformedTimestamp {
        path: PathBuf,
        row: usize,
        value: String,
    },

    #[error("Missing timestamp in row {row} of '{path}'")]
    MissingTimestamp { path: PathBuf, row: usize },

    #[error("Source table for {parameter} at '{path}' has {found} columns, expected a timestamp column plus at least {expected} city column(s)")]
    SchemaMismatch {
        parameter: Parameter,
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("No aggregated {0} table to anchor the long-form table")]
    MissingAnchor(Parameter),

    #[error("Failed to read city attributes '{0}'")]
    AttributesRead(PathBuf, #[source] PolarsError),

    #[error("Missing required column '{column}' in '{path}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Missing required column '{0}' in long-form table")]
    MissingTableColumn(String),

    #[error("I/O error writing dataset snapshot '{0}'")]
    SnapshotWriteIo(PathBuf, #[source] std::io::Error),

    #[error("Encoding error writing dataset snapshot '{0}'")]
    SnapshotWritePolars(PathBuf, #[source] PolarsError),

    #[error("Failed to read dataset snapshot '{0}'")]
    SnapshotRead(PathBuf, #[source] PolarsError),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
