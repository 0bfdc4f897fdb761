//! Builds the long-form dataset from the files named by a [`DatasetConfig`].

use crate::config::DatasetConfig;
use crate::pipeline::aggregate::{aggregate_daily, DailyTable};
use crate::pipeline::attributes::AttributeTable;
use crate::pipeline::error::DatasetError;
use crate::pipeline::merge::merge_sources;
use crate::pipeline::reshape::assemble_long_form;
use crate::pipeline::source_reader::SourceTable;
use crate::types::parameter::Parameter;
use log::{info, warn};
use polars::prelude::DataFrame;
use std::fmt;
use std::path::PathBuf;

/// Non-fatal conditions met while building a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetNotice {
    /// The secondary geographic set was configured but lacks a table for one of
    /// the loaded parameters; none of it is merged and only the primary cities
    /// are available.
    MissingSecondarySource(PathBuf),
    /// An optional parameter table is absent; its column is left out.
    MissingParameter(Parameter, PathBuf),
    /// No attribute file was found; country and coordinates are null.
    MissingAttributes,
}

impl DatasetNotice {
    /// Whether this notice means some configured cities were not loaded.
    pub fn is_degraded(&self) -> bool {
        matches!(self, DatasetNotice::MissingSecondarySource(_))
    }
}

impl fmt::Display for DatasetNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetNotice::MissingSecondarySource(path) => {
                write!(
                    f,
                    "secondary dataset incomplete, {:?} not found, using primary data only",
                    path
                )
            }
            DatasetNotice::MissingParameter(parameter, path) => {
                write!(f, "no {} table at {:?}", parameter, path)
            }
            DatasetNotice::MissingAttributes => write!(f, "no city attribute file found"),
        }
    }
}

/// Output of [`build_dataset`].
#[derive(Debug, Clone)]
pub struct BuiltDataset {
    pub frame: DataFrame,
    pub attributes: AttributeTable,
    pub notices: Vec<DatasetNotice>,
}

/// Reads, normalizes, aggregates, merges and reshapes every parameter table.
///
/// Fails if the temperature table is missing or any table is malformed. Missing
/// optional inputs are reported through [`BuiltDataset::notices`].
pub fn build_dataset(config: &DatasetConfig) -> Result<BuiltDataset, DatasetError> {
    let mut notices = Vec::new();

    let loadable: Vec<Parameter> = Parameter::ALL
        .into_iter()
        .filter(|p| config.primary_path(*p).is_file())
        .collect();
    let missing_secondary = loadable
        .iter()
        .filter_map(|p| config.secondary_path(*p))
        .find(|path| !path.is_file());
    let merge_secondary = match missing_secondary {
        Some(path) => {
            warn!(
                "Secondary dataset incomplete, {:?} not found; continuing with primary data only",
                path
            );
            notices.push(DatasetNotice::MissingSecondarySource(path));
            false
        }
        None => config.secondary_dir.is_some(),
    };

    let mut tables: Vec<DailyTable> = Vec::with_capacity(Parameter::ALL.len());
    for parameter in Parameter::ALL {
        let path = config.primary_path(parameter);
        if !loadable.contains(&parameter) {
            if parameter.is_mandatory() {
                return Err(DatasetError::MissingSource { parameter, path });
            }
            warn!("No {} table at {:?}, skipping parameter", parameter, path);
            notices.push(DatasetNotice::MissingParameter(parameter, path));
            continue;
        }

        let mut table = aggregate_daily(SourceTable::read(&path, parameter)?)?;

        if merge_secondary {
            if let Some(secondary_path) = config.secondary_path(parameter) {
                let secondary = aggregate_daily(SourceTable::read(&secondary_path, parameter)?)?;
                table = merge_sources(table, secondary)?;
            }
        }
        tables.push(table);
    }

    let attributes = load_attributes(config, merge_secondary, &mut notices)?;
    let frame = assemble_long_form(&tables, &attributes)?;

    info!(
        "Built dataset: {} rows, {} parameters, {} cities with attributes",
        frame.height(),
        tables.len(),
        attributes.len()
    );

    Ok(BuiltDataset {
        frame,
        attributes,
        notices,
    })
}

fn load_attributes(
    config: &DatasetConfig,
    secondary_merged: bool,
    notices: &mut Vec<DatasetNotice>,
) -> Result<AttributeTable, DatasetError> {
    if config.combined_attributes_path.is_file() {
        info!("Using combined city attributes {:?}", config.combined_attributes_path);
        return AttributeTable::read(&config.combined_attributes_path);
    }

    let mut attributes = if config.attributes_path.is_file() {
        Some(AttributeTable::read(&config.attributes_path)?)
    } else {
        None
    };

    if secondary_merged {
        if let Some(path) = config.secondary_attributes_path().filter(|p| p.is_file()) {
            let secondary = AttributeTable::read(&path)?;
            attributes = Some(match attributes {
                Some(primary) => primary.union(secondary),
                None => secondary,
            });
        }
    }

    Ok(attributes.unwrap_or_else(|| {
        warn!("No city attribute file found, country and coordinates will be null");
        notices.push(DatasetNotice::MissingAttributes);
        AttributeTable::default()
    }))
}
