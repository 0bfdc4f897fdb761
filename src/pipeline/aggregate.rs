//! Unit normalization and daily aggregation of source tables.

use crate::pipeline::error::DatasetError;
use crate::pipeline::source_reader::{SourceTable, COL_DATE};
use crate::types::parameter::{Parameter, ParameterKind};
use log::debug;
use polars::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// One parameter aggregated to a single value per (date, city).
///
/// Wide layout: a `date` column sorted ascending without duplicates, then one column
/// per city (`Float64` for numeric parameters, `String` for the description).
#[derive(Debug, Clone)]
pub struct DailyTable {
    pub(crate) parameter: Parameter,
    pub(crate) frame: DataFrame,
    pub(crate) cities: Vec<String>,
}

impl DailyTable {
    pub fn parameter(&self) -> Parameter {
        self.parameter
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn value_dtype(&self) -> DataType {
        value_dtype(self.parameter)
    }
}

pub(crate) fn value_dtype(parameter: Parameter) -> DataType {
    match parameter.kind() {
        ParameterKind::Numeric => DataType::Float64,
        ParameterKind::Categorical => DataType::String,
    }
}

/// Collapses a source table to daily granularity.
///
/// Numeric parameters are coerced to `f64` (unparseable cells become null), shifted
/// to Celsius when they are temperatures, and averaged per day. The weather
/// description takes the most frequent label of the day.
pub fn aggregate_daily(source: SourceTable) -> Result<DailyTable, DatasetError> {
    let frame = match source.parameter.kind() {
        ParameterKind::Numeric => daily_means(&source)?,
        ParameterKind::Categorical => daily_modes(&source)?,
    };
    debug!(
        "Aggregated {} ({:?}) from {} samples to {} days",
        source.parameter,
        source.path(),
        source.frame.height(),
        frame.height()
    );
    Ok(DailyTable {
        parameter: source.parameter,
        frame,
        cities: source.cities,
    })
}

fn daily_means(source: &SourceTable) -> Result<DataFrame, DatasetError> {
    let offset = source.parameter.unit_offset();
    let normalized: Vec<Expr> = source
        .cities
        .iter()
        .map(|city| {
            let value = col(city.as_str()).cast(DataType::Float64);
            let value = match offset {
                Some(offset) => value + lit(offset),
                None => value,
            };
            // non-finite samples count as missing
            when(value.clone().is_finite())
                .then(value)
                .otherwise(lit(NULL).cast(DataType::Float64))
                .alias(city.as_str())
        })
        .collect();
    let means: Vec<Expr> = source
        .cities
        .iter()
        .map(|city| col(city.as_str()).mean())
        .collect();

    let frame = source
        .frame
        .clone()
        .lazy()
        .with_columns(normalized)
        .group_by_stable([col(COL_DATE)])
        .agg(means)
        .sort([COL_DATE], SortMultipleOptions::default())
        .collect()?;
    Ok(frame)
}

fn daily_modes(source: &SourceTable) -> Result<DataFrame, DatasetError> {
    let days = source.frame.column(COL_DATE)?.cast(&DataType::Int32)?;
    let days = days.i32()?;

    // Row indices per day, in file order.
    let mut rows_by_day: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (row, day) in days.into_iter().enumerate() {
        if let Some(day) = day {
            rows_by_day.entry(day).or_default().push(row);
        }
    }

    let day_keys: Vec<i32> = rows_by_day.keys().copied().collect();
    let mut columns = Vec::with_capacity(source.cities.len() + 1);
    columns.push(Column::new(COL_DATE.into(), day_keys).cast(&DataType::Date)?);

    for city in &source.cities {
        let values = source.frame.column(city)?.str()?;
        let modes: Vec<Option<&str>> = rows_by_day
            .values()
            .map(|rows| mode(rows.iter().filter_map(|&row| values.get(row))))
            .collect();
        columns.push(Column::new(city.as_str().into(), modes));
    }

    Ok(DataFrame::new(columns)?)
}

/// Most frequent value; on a tie the value seen first wins. `None` for no values.
pub(crate) fn mode<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: Vec<(&'a str, usize)> = Vec::new();
    let mut slots: HashMap<&'a str, usize> = HashMap::new();
    for value in values {
        match slots.get(value) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }

    let mut best: Option<(&'a str, usize)> = None;
    for (value, count) in counts {
        // strictly greater keeps the earliest value on ties
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::attributes::AttributeTable;
    use crate::pipeline::reshape::assemble_long_form;
    use crate::pipeline::test_support::write_csv;

    #[test]
    fn test_mode_prefers_most_frequent() {
        assert_eq!(mode(["rain", "rain", "cloud"]), Some("rain"));
        assert_eq!(mode(["cloud", "rain", "rain"]), Some("rain"));
    }

    #[test]
    fn test_mode_tie_breaks_on_first_seen() {
        assert_eq!(mode(["cloud", "rain", "rain", "cloud"]), Some("cloud"));
        assert_eq!(mode(["snow", "fog"]), Some("snow"));
        assert_eq!(mode(std::iter::empty()), None);
    }

    #[test]
    fn test_kelvin_samples_average_in_celsius() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = write_csv(
            dir.path(),
            "temperature.csv",
            "datetime,Lyon\n2013-05-01 06:00:00,283.15\n2013-05-01 18:00:00,293.15\n",
        )?;

        let daily = aggregate_daily(SourceTable::read(&path, Parameter::Temperature)?)?;

        assert_eq!(daily.frame().height(), 1);
        assert_eq!(daily.frame().column("Lyon")?.f64()?.get(0), Some(15.0));
        Ok(())
    }

    #[test]
    fn test_numeric_mean_per_day_sorted() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = write_csv(
            dir.path(),
            "pressure.csv",
            "datetime,Lyon,Nice\n\
             2013-05-02 06:00:00,1000,\n\
             2013-05-01 06:00:00,1010,990\n\
             2013-05-02 18:00:00,1004,\n\
             2013-05-01 18:00:00,n/a,994\n",
        )?;

        let daily = aggregate_daily(SourceTable::read(&path, Parameter::Pressure)?)?;
        let frame = daily.frame();

        assert_eq!(frame.height(), 2);
        let lyon: Vec<Option<f64>> = frame.column("Lyon")?.f64()?.into_iter().collect();
        let nice: Vec<Option<f64>> = frame.column("Nice")?.f64()?.into_iter().collect();
        // unparseable cells are ignored by the mean, a day without samples is null
        assert_eq!(lyon, vec![Some(1010.0), Some(1002.0)]);
        assert_eq!(nice, vec![Some(992.0), None]);
        Ok(())
    }

    #[test]
    fn test_nan_samples_are_treated_as_missing() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = write_csv(
            dir.path(),
            "temperature.csv",
            "datetime,Lyon\n\
             2013-05-01 06:00:00,nan\n\
             2013-05-01 18:00:00,283.15\n\
             2013-05-02 06:00:00,nan\n",
        )?;

        let daily = aggregate_daily(SourceTable::read(&path, Parameter::Temperature)?)?;
        let lyon: Vec<Option<f64>> = daily.frame().column("Lyon")?.f64()?.into_iter().collect();
        assert_eq!(lyon, vec![Some(10.0), None]);

        let long = assemble_long_form(&[daily], &AttributeTable::default())?;
        assert_eq!(long.height(), 1);
        assert_eq!(long.column("avg_temperature")?.f64()?.get(0), Some(10.0));
        Ok(())
    }

    #[test]
    fn test_description_mode_per_day() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = write_csv(
            dir.path(),
            "weather_description.csv",
            "datetime,Lyon\n\
             2013-05-01 06:00:00,rain\n\
             2013-05-01 12:00:00,rain\n\
             2013-05-01 18:00:00,cloud\n\
             2013-05-02 06:00:00,\n",
        )?;

        let daily = aggregate_daily(SourceTable::read(&path, Parameter::WeatherDescription)?)?;
        let values: Vec<Option<&str>> = daily.frame().column("Lyon")?.str()?.into_iter().collect();

        assert_eq!(values, vec![Some("rain"), None]);
        assert_eq!(daily.frame().column("date")?.dtype(), &DataType::Date);
        Ok(())
    }
}
