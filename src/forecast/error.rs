use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Forecast horizon must be at least 1 day, got {0}")]
    InvalidHorizon(usize),

    #[error("Insufficient history: {required} usable observations required, {actual} available")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("The learned forecaster must be trained before predicting")]
    ModelNotTrained,

    #[error("I/O error persisting model at '{0}'")]
    ModelPersistIo(PathBuf, #[source] std::io::Error),

    #[error("Failed to encode model for '{0}'")]
    ModelEncode(PathBuf, #[source] Box<bincode::error::EncodeError>),

    #[error("Failed to decode model from '{0}'")]
    ModelDecode(PathBuf, #[source] Box<bincode::error::DecodeError>),

    #[error("Numerical error: {0}")]
    Numerical(String),
}
