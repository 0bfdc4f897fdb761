//! Filters the long-form table down to the series of one city.

use crate::pipeline::attributes::COL_CITY;
use crate::pipeline::error::DatasetError;
use crate::pipeline::source_reader::COL_DATE;
use crate::types::observation::{CitySeries, ObservationRecord};
use crate::types::parameter::Parameter;
use crate::utils::date_from_days;
use polars::prelude::*;

/// Date column of an extracted series frame.
pub const SERIES_DATE_KEY: &str = "ds";
/// Temperature column of an extracted series frame.
pub const SERIES_VALUE_KEY: &str = "y";

/// Returns the columns of the long-form table that describe a city's observations,
/// renamed for the forecasters (`date` to `ds`, `avg_temperature` to `y`), keeping
/// only those present in `table`.
fn series_columns(table: &DataFrame) -> Vec<Expr> {
    let mut columns = vec![col(COL_DATE).alias(SERIES_DATE_KEY)];
    for parameter in Parameter::ALL {
        let name = parameter.column_name();
        if table.get_column_index(name).is_none() {
            continue;
        }
        if parameter == Parameter::Temperature {
            columns.push(col(name).alias(SERIES_VALUE_KEY));
        } else {
            columns.push(col(name));
        }
    }
    columns
}

/// Filters `table` to `city_name` and returns its rows sorted by date, with a
/// dense 0..N-1 row index.
///
/// Surrounding whitespace of `city_name` is ignored; otherwise the match is exact
/// and case-sensitive. Returns `Ok(None)` when no row matches.
pub fn extract_frame(table: &DataFrame, city_name: &str) -> Result<Option<DataFrame>, DatasetError> {
    let city = city_name.trim();
    let frame = table
        .clone()
        .lazy()
        .filter(col(COL_CITY).eq(lit(city)))
        .select(series_columns(table))
        .sort([SERIES_DATE_KEY], SortMultipleOptions::default())
        .collect()?;

    if frame.height() == 0 {
        return Ok(None);
    }
    Ok(Some(frame))
}

/// Extracts the [`CitySeries`] of `city_name`, or `Ok(None)` for an unknown city.
///
/// # Errors
///
/// Returns [`DatasetError::MissingTableColumn`] if the table lacks the date, city
/// or temperature column, and [`DatasetError::DataFrameProcessing`] on polars failures.
pub fn extract(table: &DataFrame, city_name: &str) -> Result<Option<CitySeries>, DatasetError> {
    for required in [COL_DATE, COL_CITY, Parameter::Temperature.column_name()] {
        if table.get_column_index(required).is_none() {
            return Err(DatasetError::MissingTableColumn(required.to_string()));
        }
    }

    let Some(frame) = extract_frame(table, city_name)? else {
        return Ok(None);
    };

    let days = frame.column(SERIES_DATE_KEY)?.cast(&DataType::Int32)?;
    let days = days.i32()?;
    let values = frame.column(SERIES_VALUE_KEY)?.f64()?;
    let humidity = opt_float_column(&frame, Parameter::Humidity)?;
    let pressure = opt_float_column(&frame, Parameter::Pressure)?;
    let wind_speed = opt_float_column(&frame, Parameter::WindSpeed)?;
    let wind_direction = opt_float_column(&frame, Parameter::WindDirection)?;
    let descriptions = match frame.column(Parameter::WeatherDescription.column_name()) {
        Ok(column) => Some(column.str()?.clone()),
        Err(_) => None,
    };

    let records = (0..frame.height())
        .filter_map(|idx| {
            // the long-form table never stores a row without date and temperature
            let date = date_from_days(days.get(idx)?);
            let temperature = values.get(idx)?;
            Some(ObservationRecord {
                date,
                temperature,
                humidity: humidity.as_ref().and_then(|c| c.get(idx)),
                pressure: pressure.as_ref().and_then(|c| c.get(idx)),
                wind_speed: wind_speed.as_ref().and_then(|c| c.get(idx)),
                wind_direction: wind_direction.as_ref().and_then(|c| c.get(idx)),
                weather_description: descriptions
                    .as_ref()
                    .and_then(|c| c.get(idx))
                    .map(str::to_string),
            })
        })
        .collect();

    Ok(Some(CitySeries::new(city_name.trim(), records)))
}

fn opt_float_column(frame: &DataFrame, parameter: Parameter) -> Result<Option<Float64Chunked>, DatasetError> {
    match frame.column(parameter.column_name()) {
        Ok(column) => Ok(Some(column.cast(&DataType::Float64)?.f64()?.clone())),
        Err(_) => Ok(None),
    }
}
