//! Per-city daily observations as consumed by the forecasters.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One aggregated day of weather for one city.
///
/// Only the temperature is guaranteed; every other parameter is `None` when its
/// source table was missing or had no samples for that day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub date: NaiveDate,
    /// Daily mean temperature in °C.
    pub temperature: f64,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub weather_description: Option<String>,
}

impl ObservationRecord {
    /// A record with only date and temperature populated.
    pub fn new(date: NaiveDate, temperature: f64) -> Self {
        Self {
            date,
            temperature,
            humidity: None,
            pressure: None,
            wind_speed: None,
            wind_direction: None,
            weather_description: None,
        }
    }

    /// Reads an optional numeric covariate.
    pub fn covariate(&self, field: Covariate) -> Option<f64> {
        match field {
            Covariate::Humidity => self.humidity,
            Covariate::Pressure => self.pressure,
            Covariate::WindSpeed => self.wind_speed,
        }
    }
}

/// The optional numeric parameters the forecasters use as covariates.
///
/// Default substitution table, applied when a covariate has never been observed
/// for a city (its column is missing from the dataset or entirely null):
///
/// | field        | default |
/// |--------------|---------|
/// | `Humidity`   | `0.0`   |
/// | `Pressure`   | `0.0`   |
/// | `WindSpeed`  | `0.0`   |
///
/// A constant default becomes a zero feature after standardization, so it never
/// moves a learned prediction. The heuristic forecaster does not substitute at
/// all: a sparse covariate simply contributes no adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Covariate {
    Humidity,
    Pressure,
    WindSpeed,
}

impl Covariate {
    pub const ALL: [Covariate; 3] = [Covariate::Humidity, Covariate::Pressure, Covariate::WindSpeed];

    pub fn default_value(&self) -> f64 {
        match self {
            Covariate::Humidity => 0.0,
            Covariate::Pressure => 0.0,
            Covariate::WindSpeed => 0.0,
        }
    }
}

/// The ordered daily history of one city.
///
/// Records are strictly ascending by date with no duplicates; missing days are
/// simply absent. Construct through [`CitySeries::new`], which enforces the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySeries {
    city: String,
    records: Vec<ObservationRecord>,
}

impl CitySeries {
    /// Builds a series, sorting the records by date and dropping repeated dates
    /// (the first record of a date wins).
    pub fn new(city: impl Into<String>, mut records: Vec<ObservationRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        records.dedup_by_key(|r| r.date);
        Self {
            city: city.into(),
            records,
        }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn records(&self) -> &[ObservationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    pub fn temperatures(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.temperature).collect()
    }

    /// Most recent non-null value of a covariate.
    pub fn last_known(&self, field: Covariate) -> Option<f64> {
        self.records.iter().rev().find_map(|r| r.covariate(field))
    }
}
