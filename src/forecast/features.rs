//! Calendar, covariate, lag and rolling-mean features of the learned forecaster.

use crate::types::observation::{Covariate, ObservationRecord};
use chrono::Datelike;

pub const FEATURE_NAMES: [&str; 10] = [
    "day_of_year",
    "month",
    "day_of_week",
    "humidity",
    "pressure",
    "wind_speed",
    "temp_lag_1",
    "temp_lag_2",
    "temp_lag_3",
    "temp_rolling_mean_prev",
];
pub const N_FEATURES: usize = FEATURE_NAMES.len();

/// Number of preceding temperatures a row needs before its lags are defined.
pub const MAX_LAG: usize = 3;

/// Substitutes for covariates a series never observed, indexed like [`Covariate::ALL`].
///
/// `Some(default)` means the covariate is absent from the whole history and every
/// row uses the default; `None` means the covariate is observed and a row missing
/// it cannot be used.
pub type CovariateFallbacks = [Option<f64>; 3];

pub fn covariate_fallbacks(records: &[ObservationRecord]) -> CovariateFallbacks {
    Covariate::ALL.map(|covariate| {
        if records.iter().any(|r| r.covariate(covariate).is_some()) {
            None
        } else {
            Some(covariate.default_value())
        }
    })
}

/// Features of `record` given the observations before it, oldest first.
///
/// Only the trailing `rolling_window` entries of `preceding` are read. Returns
/// `None` while fewer than [`MAX_LAG`] temperatures precede the record or when an
/// observed covariate is missing on this day.
pub fn feature_row(
    record: &ObservationRecord,
    preceding: &[ObservationRecord],
    rolling_window: usize,
    fallbacks: &CovariateFallbacks,
) -> Option<[f64; N_FEATURES]> {
    let n = preceding.len();
    if n < MAX_LAG {
        return None;
    }

    let mut covariates = [0.0; 3];
    for (slot, (covariate, fallback)) in covariates
        .iter_mut()
        .zip(Covariate::ALL.iter().zip(fallbacks))
    {
        *slot = record.covariate(*covariate).or(*fallback)?;
    }

    let window = &preceding[n.saturating_sub(rolling_window.max(1))..];
    let rolling_mean = window.iter().map(|r| r.temperature).sum::<f64>() / window.len() as f64;

    Some([
        record.date.ordinal() as f64,
        record.date.month() as f64,
        record.date.weekday().num_days_from_monday() as f64,
        covariates[0],
        covariates[1],
        covariates[2],
        preceding[n - 1].temperature,
        preceding[n - 2].temperature,
        preceding[n - 3].temperature,
        rolling_mean,
    ])
}

/// Feature matrix and temperature targets of every usable row of `records`.
pub fn training_set(
    records: &[ObservationRecord],
    rolling_window: usize,
) -> (Vec<Vec<f64>>, Vec<f64>) {
    let fallbacks = covariate_fallbacks(records);
    records
        .iter()
        .enumerate()
        .filter_map(|(idx, record)| {
            feature_row(record, &records[..idx], rolling_window, &fallbacks)
                .map(|row| (row.to_vec(), record.temperature))
        })
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn records(temps: &[f64]) -> Vec<ObservationRecord> {
        // 2018-01-01 is a Monday
        let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        temps
            .iter()
            .enumerate()
            .map(|(i, &t)| ObservationRecord::new(start + Duration::days(i as i64), t))
            .collect()
    }

    #[test]
    fn test_warm_up_rows_are_dropped() {
        let history = records(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        let (rows, targets) = training_set(&history, 7);

        assert_eq!(rows.len(), 2);
        assert_eq!(targets, vec![4.0, 5.0]);
        // 2018-01-04 is a Thursday
        assert_eq!(rows[0][..3], [4.0, 1.0, 3.0]);
        // never-observed covariates take the default
        assert_eq!(rows[0][3..6], [0.0, 0.0, 0.0]);
        assert_eq!(rows[0][6..], [3.0, 2.0, 1.0, 2.0]);
        assert_eq!(rows[1][6..], [4.0, 3.0, 2.0, 2.5]);
    }

    #[test]
    fn test_rolling_mean_reads_trailing_window() {
        let history = records(&[100.0, 1.0, 2.0, 3.0, 4.0]);
        let fallbacks = covariate_fallbacks(&history);

        let row = feature_row(&history[4], &history[..4], 3, &fallbacks).unwrap();

        assert_eq!(row[9], 2.0);
        // the record's own temperature never enters its rolling feature
        assert_eq!(FEATURE_NAMES[9], "temp_rolling_mean_prev");
    }

    #[test]
    fn test_missing_observed_covariate_drops_row() {
        let mut history = records(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        for record in history.iter_mut().take(4) {
            record.humidity = Some(60.0);
        }

        let (rows, targets) = training_set(&history, 7);

        assert_eq!(targets, vec![4.0]);
        assert_eq!(rows[0][3], 60.0);
    }
}
