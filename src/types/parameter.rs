//! Defines the weather parameters that make up a dataset, one source table each.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the samples of a parameter are collapsed to one value per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Averaged with the arithmetic mean.
    Numeric,
    /// Reduced to the most frequent label of the day.
    Categorical,
}

/// One weather parameter, backed by a single wide source table
/// (rows = timestamps, columns = cities).
///
/// The order of [`Parameter::ALL`] is the order in which the long-form table
/// receives its value columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parameter {
    /// Air temperature. Stored in Kelvin in the sources, Celsius everywhere else.
    Temperature,
    /// Relative humidity in percent.
    Humidity,
    /// Air pressure in hPa.
    Pressure,
    /// Wind speed (m/s in the shipped data).
    WindSpeed,
    /// Wind direction in degrees.
    WindDirection,
    /// Free-text weather description ("light rain", "sky is clear", ...).
    WeatherDescription,
}

impl Parameter {
    pub const ALL: [Parameter; 6] = [
        Parameter::Temperature,
        Parameter::Humidity,
        Parameter::Pressure,
        Parameter::WindSpeed,
        Parameter::WindDirection,
        Parameter::WeatherDescription,
    ];

    /// File stem of the source table, e.g. `wind_speed` for `wind_speed.csv`.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Parameter::Temperature => "temperature",
            Parameter::Humidity => "humidity",
            Parameter::Pressure => "pressure",
            Parameter::WindSpeed => "wind_speed",
            Parameter::WindDirection => "wind_direction",
            Parameter::WeatherDescription => "weather_description",
        }
    }

    /// Column name of this parameter in the long-form table.
    pub fn column_name(&self) -> &'static str {
        match self {
            Parameter::Temperature => "avg_temperature",
            Parameter::Humidity => "humidity",
            Parameter::Pressure => "pressure",
            Parameter::WindSpeed => "wind_speed",
            Parameter::WindDirection => "wind_direction",
            Parameter::WeatherDescription => "weather_description",
        }
    }

    pub fn kind(&self) -> ParameterKind {
        match self {
            Parameter::WeatherDescription => ParameterKind::Categorical,
            _ => ParameterKind::Numeric,
        }
    }

    /// Temperature anchors the long-form table; every other parameter may be absent.
    pub fn is_mandatory(&self) -> bool {
        matches!(self, Parameter::Temperature)
    }

    /// Offset added to raw samples before aggregation (Kelvin to Celsius for temperature).
    pub(crate) fn unit_offset(&self) -> Option<f64> {
        match self {
            Parameter::Temperature => Some(-KELVIN_OFFSET),
            _ => None,
        }
    }
}

/// Difference between 0 K and 0 °C.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Formats a `Parameter` using its file stem.
///
/// # Examples
///
/// ```
/// use citycast::Parameter;
///
/// assert_eq!(Parameter::WindSpeed.to_string(), "wind_speed");
/// ```
impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_stem())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_temperature_is_mandatory() {
        let mandatory: Vec<_> = Parameter::ALL
            .iter()
            .filter(|p| p.is_mandatory())
            .collect();
        assert_eq!(mandatory, vec![&Parameter::Temperature]);
    }

    #[test]
    fn test_description_is_the_only_categorical_parameter() {
        for parameter in Parameter::ALL {
            let expected = if parameter == Parameter::WeatherDescription {
                ParameterKind::Categorical
            } else {
                ParameterKind::Numeric
            };
            assert_eq!(parameter.kind(), expected, "{}", parameter);
        }
    }

    #[test]
    fn test_unit_offset_only_for_temperature() {
        assert_eq!(Parameter::Temperature.unit_offset(), Some(-273.15));
        assert_eq!(Parameter::Pressure.unit_offset(), None);
    }
}
