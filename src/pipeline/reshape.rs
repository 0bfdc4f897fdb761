//! Pivots aggregated wide tables into the long-form (row per date and city) table.

use crate::pipeline::aggregate::DailyTable;
use crate::pipeline::attributes::{AttributeTable, COL_CITY, COL_COUNTRY, COL_LATITUDE, COL_LONGITUDE};
use crate::pipeline::error::DatasetError;
use crate::pipeline::source_reader::COL_DATE;
use crate::types::parameter::Parameter;
use polars::prelude::*;

/// Unpivots one wide table into `date`, `city`, `<parameter column>`.
///
/// Cities follow the column order of the wide table; within a city rows keep
/// the date order.
pub fn to_long(table: &DailyTable) -> Result<DataFrame, DatasetError> {
    let value_name = table.parameter.column_name();
    let value_dtype = table.value_dtype();

    if table.cities.is_empty() {
        return Ok(DataFrame::new(vec![
            Column::new_empty(COL_DATE.into(), &DataType::Date),
            Column::new_empty(COL_CITY.into(), &DataType::String),
            Column::new_empty(value_name.into(), &value_dtype),
        ])?);
    }

    let mut long = table.frame.unpivot2(UnpivotArgsIR {
        on: table.cities.iter().map(|city| city.as_str().into()).collect(),
        index: vec![COL_DATE.into()],
        variable_name: Some(COL_CITY.into()),
        value_name: Some(value_name.into()),
    })?;
    let values = long.column(value_name)?.cast(&value_dtype)?;
    long.with_column(values)?;
    Ok(long)
}

/// Joins every parameter onto the temperature rows and attaches city attributes.
///
/// Rows without a temperature are dropped. Columns come out in the order
/// `date, city, avg_temperature, <other parameters present>, country, latitude, longitude`,
/// sorted by city then date.
pub fn assemble_long_form(
    tables: &[DailyTable],
    attributes: &AttributeTable,
) -> Result<DataFrame, DatasetError> {
    let temperature_column = Parameter::Temperature.column_name();
    let anchor = tables
        .iter()
        .find(|table| table.parameter == Parameter::Temperature)
        .ok_or(DatasetError::MissingAnchor(Parameter::Temperature))?;

    let mut long = to_long(anchor)?
        .lazy()
        .filter(col(temperature_column).is_not_null());

    let mut selection = vec![col(COL_DATE), col(COL_CITY), col(temperature_column)];
    for parameter in Parameter::ALL.iter().filter(|p| !p.is_mandatory()) {
        let Some(table) = tables.iter().find(|t| t.parameter == *parameter) else {
            continue;
        };
        long = long.join(
            to_long(table)?.lazy(),
            [col(COL_DATE), col(COL_CITY)],
            [col(COL_DATE), col(COL_CITY)],
            JoinArgs::new(JoinType::Left),
        );
        selection.push(col(parameter.column_name()));
    }

    long = long.join(
        attributes.to_frame()?.lazy(),
        [col(COL_CITY)],
        [col(COL_CITY)],
        JoinArgs::new(JoinType::Left),
    );
    selection.extend([col(COL_COUNTRY), col(COL_LATITUDE), col(COL_LONGITUDE)]);

    let frame = long
        .select(selection)
        .sort(
            [COL_CITY, COL_DATE],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .collect()?;
    Ok(frame)
}
