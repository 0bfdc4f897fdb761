//! File layout of a dataset: where the per-parameter tables, the optional secondary
//! geographic set and the city attribute files live.

use crate::types::parameter::Parameter;
use crate::utils::get_data_dir;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

const ATTRIBUTES_FILE: &str = "city_attributes.csv";
const COMBINED_ATTRIBUTES_FILE: &str = "city_attributes_combined.csv";
const SECONDARY_DIR: &str = "european_converted";
const SECONDARY_SUFFIX: &str = "_european";

pub const DEFAULT_CITY: &str = "New York";
pub const DEFAULT_FORECAST_DAYS: usize = 7;

/// Paths and defaults for building a [`crate::WeatherDataset`].
///
/// The primary tables are `<data_dir>/<parameter>.csv`. The secondary set, when
/// present, mirrors them as `<secondary_dir>/<parameter>_european.csv`.
///
/// # Examples
///
/// ```
/// use citycast::{DatasetConfig, Parameter};
/// use std::path::Path;
///
/// let config = DatasetConfig::new("/srv/weather");
/// assert_eq!(
///     config.primary_path(Parameter::Temperature),
///     Path::new("/srv/weather/temperature.csv")
/// );
/// assert_eq!(
///     config.secondary_path(Parameter::Humidity),
///     Some(Path::new("/srv/weather/european_converted/humidity_european.csv").to_path_buf())
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub data_dir: PathBuf,
    /// Directory of the secondary geographic dataset. `None` disables the merge.
    pub secondary_dir: Option<PathBuf>,
    /// Attribute file of the primary cities.
    pub attributes_path: PathBuf,
    /// Pre-combined attribute file covering both city sets; preferred when it exists.
    pub combined_attributes_path: PathBuf,
    pub default_city: String,
    pub forecast_days: usize,
}

impl DatasetConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            secondary_dir: Some(data_dir.join(SECONDARY_DIR)),
            attributes_path: data_dir.join(ATTRIBUTES_FILE),
            combined_attributes_path: data_dir.join(COMBINED_ATTRIBUTES_FILE),
            default_city: DEFAULT_CITY.to_string(),
            forecast_days: DEFAULT_FORECAST_DAYS,
            data_dir,
        }
    }

    /// Uses the platform data directory, e.g. `~/.local/share/citycast` on Linux.
    pub fn from_default_dir() -> io::Result<Self> {
        Ok(Self::new(get_data_dir()?))
    }

    pub fn with_secondary_dir(mut self, secondary_dir: Option<PathBuf>) -> Self {
        self.secondary_dir = secondary_dir;
        self
    }

    pub fn with_forecast_days(mut self, forecast_days: usize) -> Self {
        self.forecast_days = forecast_days;
        self
    }

    pub fn primary_path(&self, parameter: Parameter) -> PathBuf {
        self.data_dir.join(format!("{}.csv", parameter.file_stem()))
    }

    pub fn secondary_path(&self, parameter: Parameter) -> Option<PathBuf> {
        self.secondary_dir.as_ref().map(|dir| {
            dir.join(format!("{}{}.csv", parameter.file_stem(), SECONDARY_SUFFIX))
        })
    }

    pub fn secondary_attributes_path(&self) -> Option<PathBuf> {
        self.secondary_dir
            .as_ref()
            .map(|dir| dir.join(format!("city_attributes{}.csv", SECONDARY_SUFFIX)))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secondary_disabled() {
        let config = DatasetConfig::new("data").with_secondary_dir(None);
        assert_eq!(config.secondary_path(Parameter::Temperature), None);
        assert_eq!(config.secondary_attributes_path(), None);
    }

    #[test]
    fn test_defaults() {
        let config = DatasetConfig::new("data");
        assert_eq!(config.default_city, "New York");
        assert_eq!(config.forecast_days, 7);
        assert_eq!(
            config.combined_attributes_path,
            Path::new("data/city_attributes_combined.csv")
        );
        assert_eq!(
            config.secondary_attributes_path(),
            Some(PathBuf::from("data/european_converted/city_attributes_european.csv"))
        );
    }
}
