//! Reads one wide per-parameter source table (`timestamp, city_1, city_2, ...`).

use crate::pipeline::error::DatasetError;
use crate::types::parameter::Parameter;
use crate::utils::days_since_epoch;
use chrono::{NaiveDate, NaiveDateTime};
use log::info;
use polars::prelude::*;
use std::path::{Path, PathBuf};

pub(crate) const COL_DATE: &str = "date";

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A raw source table with its timestamps truncated to calendar dates.
///
/// The frame holds a `date` column (`DataType::Date`) followed by one column per
/// city, still as raw strings. Row order is the order of the file.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub(crate) parameter: Parameter,
    pub(crate) path: PathBuf,
    pub(crate) frame: DataFrame,
    pub(crate) cities: Vec<String>,
}

impl SourceTable {
    /// Reads and validates the table at `path`.
    ///
    /// # Errors
    ///
    /// * [`DatasetError::SourceRead`] if the CSV cannot be parsed.
    /// * [`DatasetError::SchemaMismatch`] if there is no city column next to the timestamp.
    /// * [`DatasetError::EmptySource`] if the table has no rows.
    /// * [`DatasetError::MalformedTimestamp`] / [`DatasetError::MissingTimestamp`] on the
    ///   first timestamp that cannot be parsed. No partial table is returned.
    pub fn read(path: &Path, parameter: Parameter) -> Result<Self, DatasetError> {
        // Every column is read as a string; numeric coercion happens during aggregation.
        let raw = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|e| DatasetError::SourceRead(path.to_path_buf(), e))?
            .finish()
            .map_err(|e| DatasetError::SourceRead(path.to_path_buf(), e))?;

        if raw.width() < 2 {
            return Err(DatasetError::SchemaMismatch {
                parameter,
                path: path.to_path_buf(),
                expected: 1,
                found: raw.width(),
            });
        }
        if raw.height() == 0 {
            return Err(DatasetError::EmptySource(path.to_path_buf()));
        }

        let names: Vec<String> = raw
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        let timestamp_name = &names[0];
        let cities: Vec<String> = names[1..].to_vec();

        let days = parse_timestamp_column(raw.column(timestamp_name)?, path)?;
        let date = Column::new(COL_DATE.into(), days).cast(&DataType::Date)?;

        let mut columns = Vec::with_capacity(cities.len() + 1);
        columns.push(date);
        for city in &cities {
            columns.push(raw.column(city)?.clone());
        }
        let frame = DataFrame::new(columns)?;

        info!(
            "Read {} source table {:?}: {} rows, {} cities",
            parameter,
            path,
            frame.height(),
            cities.len()
        );

        Ok(Self {
            parameter,
            path: path.to_path_buf(),
            frame,
            cities,
        })
    }

    pub fn parameter(&self) -> Parameter {
        self.parameter
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }
}

/// Parses every timestamp to days since the epoch, discarding the time of day.
fn parse_timestamp_column(column: &Column, path: &Path) -> Result<Vec<i32>, DatasetError> {
    let values = column.str()?;
    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            let value = value.ok_or_else(|| DatasetError::MissingTimestamp {
                path: path.to_path_buf(),
                row,
            })?;
            parse_timestamp(value)
                .map(days_since_epoch)
                .ok_or_else(|| DatasetError::MalformedTimestamp {
                    path: path.to_path_buf(),
                    row,
                    value: value.to_string(),
                })
        })
        .collect()
}

/// Accepts a datetime in one of the supported layouts or a bare date.
pub(crate) fn parse_timestamp(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|datetime| datetime.date())
        .or_else(|| NaiveDate::parse_from_str(value, DATE_FORMAT).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::write_csv;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2012, 10, 1);
        assert_eq!(parse_timestamp("2012-10-01 13:00:00"), expected);
        assert_eq!(parse_timestamp("2012-10-01T23:59:59"), expected);
        assert_eq!(parse_timestamp("2012-10-01 07:30"), expected);
        assert_eq!(parse_timestamp("2012-10-01"), expected);
        assert_eq!(parse_timestamp("01/10/2012"), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_read_truncates_timestamps_to_dates() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = write_csv(
            dir.path(),
            "temperature.csv",
            "datetime,Vancouver,Portland\n\
             2012-10-01 12:00:00,284.62,282.08\n\
             2012-10-01 13:00:00,284.63,\n\
             2012-10-02 00:00:00,284.64,282.10\n",
        )?;

        let table = SourceTable::read(&path, Parameter::Temperature)?;

        assert_eq!(table.cities(), ["Vancouver", "Portland"]);
        assert_eq!(table.height(), 3);
        assert_eq!(table.frame.column("date")?.dtype(), &DataType::Date);
        let days = table.frame.column("date")?.cast(&DataType::Int32)?;
        let days: Vec<Option<i32>> = days.i32()?.into_iter().collect();
        assert_eq!(days[0], days[1]);
        assert_eq!(days[2], days[0].map(|d| d + 1));
        Ok(())
    }

    #[test]
    fn test_malformed_timestamp_fails_fast() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = write_csv(
            dir.path(),
            "humidity.csv",
            "datetime,Vancouver\n2012-10-01 12:00:00,76\nnot-a-date,80\n",
        )?;

        let err = SourceTable::read(&path, Parameter::Humidity).unwrap_err();
        match err {
            DatasetError::MalformedTimestamp { row, value, .. } => {
                assert_eq!(row, 1);
                assert_eq!(value, "not-a-date");
            }
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    }

    #[test]
    fn test_table_without_cities_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = write_csv(dir.path(), "pressure.csv", "datetime\n2012-10-01 12:00:00\n")?;

        let err = SourceTable::read(&path, Parameter::Pressure).unwrap_err();
        assert!(matches!(err, DatasetError::SchemaMismatch { found: 1, .. }));
        Ok(())
    }
}
