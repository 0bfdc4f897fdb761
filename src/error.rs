use crate::forecast::error::ForecastError;
use crate::pipeline::error::DatasetError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CitycastError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error("City '{0}' is not in the dataset")]
    UnknownCity(String),

    #[error("Failed to create snapshot directory '{0}'")]
    SnapshotDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine data directory")]
    DataDirResolution(#[source] std::io::Error),
}
