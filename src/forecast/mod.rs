//! Temperature forecasting strategies over a [`CitySeries`].

pub mod error;
pub mod features;
pub mod heuristic;
pub mod learned;
pub mod model_store;
pub mod regression;

use crate::forecast::error::ForecastError;
use crate::types::forecast::{ForecastPoint, ForecastResult};
use crate::types::observation::CitySeries;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A strategy producing the historical echo of `series` followed by `horizon`
/// dated future estimates.
pub trait Forecaster {
    fn forecast(&self, series: &CitySeries, horizon: usize) -> Result<ForecastResult, ForecastError>;
}

/// Strategy selector used by [`crate::WeatherDataset::forecast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Strategy {
    /// Trend, seasonal and covariate heuristic.
    #[default]
    Heuristic,
    /// Ridge regression trained on the requested city's own history, then rolled forward.
    Learned,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Heuristic => write!(f, "heuristic"),
            Strategy::Learned => write!(f, "learned"),
        }
    }
}

pub(crate) fn history_echo(series: &CitySeries) -> Vec<ForecastPoint> {
    series
        .records()
        .iter()
        .map(|r| ForecastPoint::observed(r.date, r.temperature))
        .collect()
}
