//! Static city attributes (country, latitude, longitude).

use crate::pipeline::error::DatasetError;
use crate::types::city_attributes::CityAttributes;
use log::{info, warn};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::Path;

pub(crate) const COL_CITY: &str = "city";
pub(crate) const COL_COUNTRY: &str = "country";
pub(crate) const COL_LATITUDE: &str = "latitude";
pub(crate) const COL_LONGITUDE: &str = "longitude";

/// Attribute rows keyed by exact city name, first row per city wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeTable {
    rows: Vec<CityAttributes>,
}

impl AttributeTable {
    pub fn new(rows: Vec<CityAttributes>) -> Self {
        let mut table = Self::default();
        table.extend(rows);
        table
    }

    /// Reads an attribute file. Headers are matched case-insensitively; only the
    /// `city` column is required.
    pub fn read(path: &Path) -> Result<Self, DatasetError> {
        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|e| DatasetError::AttributesRead(path.to_path_buf(), e))?
            .finish()
            .map_err(|e| DatasetError::AttributesRead(path.to_path_buf(), e))?;

        let city_column = find_column(&frame, COL_CITY).ok_or_else(|| DatasetError::MissingColumn {
            path: path.to_path_buf(),
            column: COL_CITY.to_string(),
        })?;
        let cities = city_column.str()?;
        let countries = optional_strings(&frame, COL_COUNTRY)?;
        let latitudes = optional_strings(&frame, COL_LATITUDE)?;
        let longitudes = optional_strings(&frame, COL_LONGITUDE)?;

        let rows: Vec<CityAttributes> = (0..frame.height())
            .filter_map(|idx| {
                let city = cities.get(idx)?.trim();
                if city.is_empty() {
                    return None;
                }
                Some(CityAttributes {
                    city: city.to_string(),
                    country: countries
                        .as_ref()
                        .and_then(|values| values.get(idx))
                        .map(|country| country.trim().to_string()),
                    latitude: parse_coordinate(latitudes.as_ref(), idx),
                    longitude: parse_coordinate(longitudes.as_ref(), idx),
                })
            })
            .collect();

        info!("Read {} city attribute rows from {:?}", rows.len(), path);
        Ok(Self::new(rows))
    }

    /// Appends rows for cities not yet known.
    pub fn extend(&mut self, rows: impl IntoIterator<Item = CityAttributes>) {
        let mut seen: HashSet<String> = self.rows.iter().map(|r| r.city.clone()).collect();
        for row in rows {
            if seen.insert(row.city.clone()) {
                self.rows.push(row);
            } else {
                warn!("Ignoring duplicate attributes for city '{}'", row.city);
            }
        }
    }

    pub fn union(mut self, other: AttributeTable) -> Self {
        self.extend(other.rows);
        self
    }

    pub fn get(&self, city: &str) -> Option<&CityAttributes> {
        self.rows.iter().find(|r| r.city == city)
    }

    pub fn rows(&self) -> &[CityAttributes] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Join-ready frame: `city`, `country`, `latitude`, `longitude`.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let cities: Vec<&str> = self.rows.iter().map(|r| r.city.as_str()).collect();
        let countries: Vec<Option<&str>> = self.rows.iter().map(|r| r.country.as_deref()).collect();
        let latitudes: Vec<Option<f64>> = self.rows.iter().map(|r| r.latitude).collect();
        let longitudes: Vec<Option<f64>> = self.rows.iter().map(|r| r.longitude).collect();

        DataFrame::new(vec![
            Column::new(COL_CITY.into(), cities),
            Column::new(COL_COUNTRY.into(), countries),
            Column::new(COL_LATITUDE.into(), latitudes),
            Column::new(COL_LONGITUDE.into(), longitudes),
        ])
    }
}

fn find_column<'a>(frame: &'a DataFrame, name: &str) -> Option<&'a Column> {
    frame
        .get_columns()
        .iter()
        .find(|column| column.name().trim().eq_ignore_ascii_case(name))
}

fn optional_strings(frame: &DataFrame, name: &str) -> Result<Option<StringChunked>, DatasetError> {
    match find_column(frame, name) {
        Some(column) => Ok(Some(column.str()?.clone())),
        None => Ok(None),
    }
}

fn parse_coordinate(values: Option<&StringChunked>, idx: usize) -> Option<f64> {
    values
        .and_then(|values| values.get(idx))
        .and_then(|value| value.trim().parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::write_csv;

    #[test]
    fn test_read_is_case_insensitive_and_lenient() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = write_csv(
            dir.path(),
            "city_attributes.csv",
            "City,Country,Latitude,Longitude\n\
             Vancouver,Canada,49.24966,-123.119339\n\
             Haifa,Israel,,\n\
             Vancouver,Nowhere,0,0\n",
        )?;

        let table = AttributeTable::read(&path)?;

        assert_eq!(table.len(), 2);
        let vancouver = table.get("Vancouver").unwrap();
        assert_eq!(vancouver.country.as_deref(), Some("Canada"));
        assert_eq!(vancouver.latitude, Some(49.24966));
        let haifa = table.get("Haifa").unwrap();
        assert_eq!(haifa.latitude, None);
        assert!(table.get("vancouver").is_none());
        Ok(())
    }

    #[test]
    fn test_missing_city_column_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = write_csv(dir.path(), "attrs.csv", "Country,Latitude\nFrance,48.8\n")?;

        let err = AttributeTable::read(&path).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn { .. }));
        Ok(())
    }

    #[test]
    fn test_union_keeps_first_rows() {
        let primary = AttributeTable::new(vec![CityAttributes::unknown("Paris")]);
        let mut paris = CityAttributes::unknown("Paris");
        paris.country = Some("France".to_string());
        let secondary = AttributeTable::new(vec![paris, CityAttributes::unknown("Rome")]);

        let combined = primary.union(secondary);

        assert_eq!(combined.len(), 2);
        assert_eq!(combined.get("Paris").unwrap().country, None);
    }

    #[test]
    fn test_to_frame_types() -> Result<(), Box<dyn std::error::Error>> {
        let frame = AttributeTable::default().to_frame()?;
        assert_eq!(frame.height(), 0);
        assert_eq!(frame.column("latitude")?.dtype(), &DataType::Float64);
        assert_eq!(frame.column("city")?.dtype(), &DataType::String);
        Ok(())
    }
}
