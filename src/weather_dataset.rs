//! Caller-owned handle on a built long-form dataset.

use crate::config::DatasetConfig;
use crate::error::CitycastError;
use crate::forecast::heuristic::HeuristicForecaster;
use crate::forecast::learned::LearnedForecaster;
use crate::forecast::{Forecaster, Strategy};
use crate::pipeline::attributes::{AttributeTable, COL_CITY, COL_COUNTRY, COL_LATITUDE, COL_LONGITUDE};
use crate::pipeline::builder::{build_dataset, BuiltDataset, DatasetNotice};
use crate::pipeline::error::DatasetError;
use crate::pipeline::extractor::extract;
use crate::types::city_attributes::CityAttributes;
use crate::types::forecast::ForecastResult;
use crate::types::observation::CitySeries;
use crate::utils::ensure_dir_exists;
use bon::bon;
use log::info;
use polars::prelude::*;
use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::path::Path;

/// The long-form table of every city, built once from the configured source files.
///
/// The table is never modified in place; [`WeatherDataset::reload`] replaces it
/// with a fresh build.
///
/// # Examples
///
/// ```no_run
/// use citycast::{CitycastError, DatasetConfig, Strategy, WeatherDataset};
///
/// # fn main() -> Result<(), CitycastError> {
/// let dataset = WeatherDataset::load(DatasetConfig::new("data"))?;
/// if dataset.is_degraded() {
///     println!("secondary cities unavailable");
/// }
///
/// let forecast = dataset
///     .forecast()
///     .city("Vancouver")
///     .horizon(7)
///     .strategy(Strategy::Heuristic)
///     .call()?;
/// for point in forecast.future() {
///     println!("{}: {:.1} °C", point.date, point.point_estimate);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WeatherDataset {
    config: DatasetConfig,
    frame: DataFrame,
    attributes: AttributeTable,
    cities: Vec<String>,
    notices: Vec<DatasetNotice>,
}

#[bon]
impl WeatherDataset {
    /// Builds the dataset from the files named by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`CitycastError::Dataset`] if the temperature table is missing or any
    /// source table is malformed. A missing secondary set is not an error, see
    /// [`WeatherDataset::is_degraded`].
    pub fn load(config: DatasetConfig) -> Result<Self, CitycastError> {
        let built = build_dataset(&config)?;
        Self::from_built(config, built)
    }

    /// Builds from [`DatasetConfig::from_default_dir`].
    pub fn load_default() -> Result<Self, CitycastError> {
        let config = DatasetConfig::from_default_dir().map_err(CitycastError::DataDirResolution)?;
        Self::load(config)
    }

    fn from_built(config: DatasetConfig, built: BuiltDataset) -> Result<Self, CitycastError> {
        let cities = distinct_cities(&built.frame)?;
        info!(
            "Dataset ready: {} rows, {} cities, {} notices",
            built.frame.height(),
            cities.len(),
            built.notices.len()
        );
        Ok(Self {
            config,
            frame: built.frame,
            attributes: built.attributes,
            cities,
            notices: built.notices,
        })
    }

    /// Rebuilds the table from the source files, replacing the current one.
    ///
    /// On failure the current table is kept.
    pub fn reload(&mut self) -> Result<(), CitycastError> {
        let built = build_dataset(&self.config)?;
        *self = Self::from_built(self.config.clone(), built)?;
        Ok(())
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// The long-form table, sorted by city then date.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Distinct city names, sorted.
    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn notices(&self) -> &[DatasetNotice] {
        &self.notices
    }

    /// `true` when the secondary geographic set was configured but could not be merged.
    pub fn is_degraded(&self) -> bool {
        self.notices.iter().any(DatasetNotice::is_degraded)
    }

    /// The ordered history of `city`, or `None` if the city is unknown.
    pub fn city_series(&self, city: &str) -> Result<Option<CitySeries>, CitycastError> {
        Ok(extract(&self.frame, city)?)
    }

    /// Country and coordinates of `city`, or `None` if the city is unknown.
    /// A known city without an attribute row yields all-`None` attributes.
    pub fn city_info(&self, city: &str) -> Option<CityAttributes> {
        let city = city.trim();
        if self.cities.binary_search_by(|c| c.as_str().cmp(city)).is_err() {
            return None;
        }
        Some(
            self.attributes
                .get(city)
                .cloned()
                .unwrap_or_else(|| CityAttributes::unknown(city)),
        )
    }

    /// Forecasts the temperature of a city.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.city(&str)`: Optional. City name, matched exactly after trimming. Defaults to the
    ///   configured `default_city`.
    /// * `.horizon(usize)`: Optional. Days to forecast. Defaults to the configured `forecast_days`.
    /// * `.strategy(Strategy)`: Optional. Defaults to [`Strategy::Heuristic`]. The learned
    ///   strategy trains a fresh model on the city's own history.
    ///
    /// # Errors
    ///
    /// Returns [`CitycastError::UnknownCity`] for a city without rows and
    /// [`CitycastError::Forecast`] when the strategy rejects the series or horizon.
    #[builder]
    pub fn forecast(
        &self,
        city: Option<&str>,
        horizon: Option<usize>,
        strategy: Option<Strategy>,
    ) -> Result<ForecastResult, CitycastError> {
        let city = city.unwrap_or(self.config.default_city.as_str());
        let horizon = horizon.unwrap_or(self.config.forecast_days);
        let strategy = strategy.unwrap_or_default();
        let series = self.require_series(city)?;
        info!("Forecasting {} days for {} ({})", horizon, series.city(), strategy);

        let result = match strategy {
            Strategy::Heuristic => HeuristicForecaster::new().forecast(&series, horizon)?,
            Strategy::Learned => {
                let mut forecaster = LearnedForecaster::default();
                forecaster.train(&series)?;
                forecaster.forecast(&series, horizon)?
            }
        };
        Ok(result)
    }

    /// Forecasts with a caller-provided forecaster, e.g. a restored learned model.
    pub fn forecast_with(
        &self,
        forecaster: &dyn Forecaster,
        city: &str,
        horizon: usize,
    ) -> Result<ForecastResult, CitycastError> {
        let series = self.require_series(city)?;
        Ok(forecaster.forecast(&series, horizon)?)
    }

    fn require_series(&self, city: &str) -> Result<CitySeries, CitycastError> {
        self.city_series(city)?
            .ok_or_else(|| CitycastError::UnknownCity(city.trim().to_string()))
    }

    /// Writes the long-form table to a parquet file, creating parent directories.
    pub fn write_snapshot(&self, path: &Path) -> Result<(), CitycastError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir_exists(parent)
                .map_err(|e| CitycastError::SnapshotDirCreation(parent.to_path_buf(), e))?;
        }
        let file = File::create(path)
            .map_err(|e| DatasetError::SnapshotWriteIo(path.to_path_buf(), e))?;
        let mut frame = self.frame.clone();
        ParquetWriter::new(file)
            .with_compression(ParquetCompression::Snappy)
            .finish(&mut frame)
            .map_err(|e| DatasetError::SnapshotWritePolars(path.to_path_buf(), e))?;
        info!("Wrote dataset snapshot {:?} ({} rows)", path, frame.height());
        Ok(())
    }

    /// Opens a snapshot written by [`write_snapshot`](Self::write_snapshot) instead of
    /// rebuilding from the source files. `config` is kept for a later
    /// [`reload`](Self::reload).
    pub fn open_snapshot(config: DatasetConfig, path: &Path) -> Result<Self, CitycastError> {
        let file = File::open(path).map_err(|e| {
            DatasetError::SnapshotRead(path.to_path_buf(), PolarsError::from(e))
        })?;
        let frame = ParquetReader::new(file)
            .finish()
            .map_err(|e| DatasetError::SnapshotRead(path.to_path_buf(), e))?;
        for column in [COL_CITY, COL_COUNTRY, COL_LATITUDE, COL_LONGITUDE] {
            if frame.get_column_index(column).is_none() {
                return Err(DatasetError::MissingColumn {
                    path: path.to_path_buf(),
                    column: column.to_string(),
                }
                .into());
            }
        }
        let attributes = attributes_from_frame(&frame)?;
        info!("Opened dataset snapshot {:?} ({} rows)", path, frame.height());
        Self::from_built(
            config,
            BuiltDataset {
                frame,
                attributes,
                notices: Vec::new(),
            },
        )
    }
}

fn distinct_cities(frame: &DataFrame) -> Result<Vec<String>, DatasetError> {
    let cities: BTreeSet<&str> = frame.column(COL_CITY)?.str()?.into_iter().flatten().collect();
    Ok(cities.into_iter().map(str::to_string).collect())
}

/// Recovers the attribute rows of cities that have at least one attribute.
fn attributes_from_frame(frame: &DataFrame) -> Result<AttributeTable, DatasetError> {
    let cities = frame.column(COL_CITY)?.str()?;
    let countries = frame.column(COL_COUNTRY)?.str()?;
    let latitudes = frame.column(COL_LATITUDE)?.cast(&DataType::Float64)?;
    let latitudes = latitudes.f64()?;
    let longitudes = frame.column(COL_LONGITUDE)?.cast(&DataType::Float64)?;
    let longitudes = longitudes.f64()?;

    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    for idx in 0..frame.height() {
        let Some(city) = cities.get(idx) else {
            continue;
        };
        if !seen.insert(city) {
            continue;
        }
        let row = CityAttributes {
            city: city.to_string(),
            country: countries.get(idx).map(str::to_string),
            latitude: latitudes.get(idx),
            longitude: longitudes.get(idx),
        };
        if row != CityAttributes::unknown(city) {
            rows.push(row);
        }
    }
    Ok(AttributeTable::new(rows))
}
