//! Outer-joins a secondary geographic source onto the primary one.

use crate::pipeline::aggregate::DailyTable;
use crate::pipeline::error::DatasetError;
use crate::pipeline::source_reader::COL_DATE;
use log::{info, warn};
use polars::prelude::*;

/// Merges two daily tables of the same parameter on `date`.
///
/// The result holds every date of either source and every city of either source;
/// a date known to only one source leaves the other source's cities null. Cities
/// present in both sources keep the primary values.
pub fn merge_sources(primary: DailyTable, secondary: DailyTable) -> Result<DailyTable, DatasetError> {
    debug_assert_eq!(primary.parameter, secondary.parameter);

    let (new_cities, overlapping): (Vec<String>, Vec<String>) = secondary
        .cities
        .iter()
        .cloned()
        .partition(|city| !primary.cities.contains(city));

    if !overlapping.is_empty() {
        warn!(
            "Secondary {} source repeats {} cities already in the primary source, keeping primary values: {:?}",
            primary.parameter,
            overlapping.len(),
            overlapping
        );
    }

    let mut secondary_columns = vec![col(COL_DATE)];
    secondary_columns.extend(new_cities.iter().map(|city| col(city.as_str())));

    let frame = primary
        .frame
        .lazy()
        .join(
            secondary.frame.lazy().select(secondary_columns),
            [col(COL_DATE)],
            [col(COL_DATE)],
            JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
        )
        .sort([COL_DATE], SortMultipleOptions::default())
        .collect()?;

    info!(
        "Merged secondary {} source: {} cities added, {} days total",
        primary.parameter,
        new_cities.len(),
        frame.height()
    );

    let mut cities = primary.cities;
    cities.extend(new_cities);
    Ok(DailyTable {
        parameter: primary.parameter,
        frame,
        cities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::aggregate::aggregate_daily;
    use crate::pipeline::source_reader::SourceTable;
    use crate::pipeline::test_support::write_csv;
    use crate::types::parameter::Parameter;

    fn daily(dir: &std::path::Path, name: &str, content: &str) -> Result<DailyTable, Box<dyn std::error::Error>> {
        let path = write_csv(dir, name, content)?;
        Ok(aggregate_daily(SourceTable::read(&path, Parameter::Humidity)?)?)
    }

    #[test]
    fn test_disjoint_sources_union_cities_and_dates() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let primary = daily(
            dir.path(),
            "humidity.csv",
            "datetime,Boston,Denver\n2015-01-01 00:00:00,60,30\n2015-01-02 00:00:00,62,32\n",
        )?;
        let secondary = daily(
            dir.path(),
            "humidity_european.csv",
            "datetime,Berlin\n2015-01-02 00:00:00,80\n2015-01-03 00:00:00,82\n",
        )?;

        let merged = merge_sources(primary, secondary)?;
        let frame = merged.frame();

        assert_eq!(merged.cities(), ["Boston", "Denver", "Berlin"]);
        assert_eq!(frame.get_column_names(), ["date", "Boston", "Denver", "Berlin"]);
        assert_eq!(frame.height(), 3);

        let boston: Vec<Option<f64>> = frame.column("Boston")?.f64()?.into_iter().collect();
        let denver: Vec<Option<f64>> = frame.column("Denver")?.f64()?.into_iter().collect();
        let berlin: Vec<Option<f64>> = frame.column("Berlin")?.f64()?.into_iter().collect();
        assert_eq!(boston, vec![Some(60.0), Some(62.0), None]);
        assert_eq!(denver, vec![Some(30.0), Some(32.0), None]);
        assert_eq!(berlin, vec![None, Some(80.0), Some(82.0)]);
        Ok(())
    }

    #[test]
    fn test_overlapping_city_keeps_primary() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let primary = daily(
            dir.path(),
            "humidity.csv",
            "datetime,Boston\n2015-01-01 00:00:00,60\n",
        )?;
        let secondary = daily(
            dir.path(),
            "humidity_european.csv",
            "datetime,Boston,Rome\n2015-01-01 00:00:00,99,70\n",
        )?;

        let merged = merge_sources(primary, secondary)?;

        assert_eq!(merged.cities(), ["Boston", "Rome"]);
        assert_eq!(merged.frame().column("Boston")?.f64()?.get(0), Some(60.0));
        assert_eq!(merged.frame().column("Rome")?.f64()?.get(0), Some(70.0));
        Ok(())
    }
}
