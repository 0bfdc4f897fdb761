mod config;
mod error;
pub mod forecast;
pub mod pipeline;
mod types;
mod utils;
mod weather_dataset;

pub use config::*;
pub use error::CitycastError;
pub use weather_dataset::WeatherDataset;

pub use types::city_attributes::CityAttributes;
pub use types::forecast::*;
pub use types::observation::*;
pub use types::parameter::*;

pub use forecast::error::ForecastError;
pub use forecast::heuristic::HeuristicForecaster;
pub use forecast::learned::{BandPolicy, LearnedConfig, LearnedForecaster, TrainingReport};
pub use forecast::{Forecaster, Strategy};

pub use pipeline::attributes::AttributeTable;
pub use pipeline::builder::{build_dataset, BuiltDataset, DatasetNotice};
pub use pipeline::error::DatasetError;
pub use pipeline::extractor::{extract, SERIES_DATE_KEY, SERIES_VALUE_KEY};

pub use utils::get_data_dir;
