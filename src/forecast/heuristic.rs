//! Closed-form trend, seasonal and covariate forecaster. Deterministic, no training.

use crate::forecast::error::ForecastError;
use crate::forecast::{history_echo, Forecaster};
use crate::types::forecast::{ForecastPoint, ForecastResult};
use crate::types::observation::{CitySeries, Covariate};
use chrono::{Datelike, Duration};
use log::debug;
use std::collections::HashMap;

const RECENT_WINDOW: usize = 30;
const TREND_HISTORY: usize = 60;
const SEASONAL_WEIGHT: f64 = 0.6;
const MIN_COVARIATE_SAMPLES: usize = 30;
const BASE_UNCERTAINTY: f64 = 2.0;
const UNCERTAINTY_STEP: f64 = 0.5;

fn covariate_weight(covariate: Covariate) -> f64 {
    match covariate {
        Covariate::Humidity => 0.015,
        Covariate::Pressure => 0.008,
        Covariate::WindSpeed => 0.1,
    }
}

/// Half-width of the band `i` days past the last observation (`i >= 1`).
pub fn uncertainty(step: usize) -> f64 {
    BASE_UNCERTAINTY + UNCERTAINTY_STEP * (step.saturating_sub(1)) as f64
}

/// Quantities derived once from a history and reused for every future day.
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicComponents {
    pub recent_avg: f64,
    /// Change per day between the previous and the latest 30-day window.
    pub trend: f64,
    pub overall_mean: f64,
    /// Mean temperature per day-of-year bucket (1..=366).
    pub seasonal_effect: HashMap<u32, f64>,
    /// Sum of the humidity, pressure and wind adjustments.
    pub covariate_adjustment: f64,
}

impl HeuristicComponents {
    pub fn from_series(series: &CitySeries) -> Result<Self, ForecastError> {
        let records = series.records();
        let n = records.len();
        if n == 0 {
            return Err(ForecastError::InsufficientHistory {
                required: 1,
                actual: 0,
            });
        }
        let temperatures = series.temperatures();

        let window = RECENT_WINDOW.min(n);
        let recent_avg = mean(&temperatures[n - window..]);
        let trend = if n >= TREND_HISTORY {
            let previous = mean(&temperatures[n - TREND_HISTORY..n - RECENT_WINDOW]);
            (recent_avg - previous) / RECENT_WINDOW as f64
        } else {
            0.0
        };

        let mut buckets: HashMap<u32, (f64, usize)> = HashMap::new();
        for record in records {
            let bucket = buckets.entry(record.date.ordinal()).or_insert((0.0, 0));
            bucket.0 += record.temperature;
            bucket.1 += 1;
        }
        let seasonal_effect = buckets
            .into_iter()
            .map(|(day, (sum, count))| (day, sum / count as f64))
            .collect();

        let covariate_adjustment = Covariate::ALL
            .into_iter()
            .map(|covariate| covariate_factor(series, covariate, window))
            .sum();

        Ok(Self {
            recent_avg,
            trend,
            overall_mean: mean(&temperatures),
            seasonal_effect,
            covariate_adjustment,
        })
    }

    /// Point estimate for the day `step` days past the last observation, whose
    /// day-of-year is `day_of_year`.
    pub fn point(&self, step: usize, day_of_year: u32) -> f64 {
        let base = self.recent_avg + self.trend * step as f64;
        let seasonal = match self.seasonal_effect.get(&day_of_year) {
            Some(effect) => SEASONAL_WEIGHT * (effect - self.overall_mean),
            None => 0.0,
        };
        base + seasonal + self.covariate_adjustment
    }
}

/// `weight * (recent window mean - overall mean)` of one covariate, or zero when
/// fewer than 30 samples exist or the recent window holds none.
fn covariate_factor(series: &CitySeries, covariate: Covariate, window: usize) -> f64 {
    let records = series.records();
    let all: Vec<f64> = records.iter().filter_map(|r| r.covariate(covariate)).collect();
    if all.len() < MIN_COVARIATE_SAMPLES {
        return 0.0;
    }
    let recent: Vec<f64> = records[records.len() - window..]
        .iter()
        .filter_map(|r| r.covariate(covariate))
        .collect();
    if recent.is_empty() {
        return 0.0;
    }
    covariate_weight(covariate) * (mean(&recent) - mean(&all))
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicForecaster;

impl HeuristicForecaster {
    pub fn new() -> Self {
        Self
    }
}

impl Forecaster for HeuristicForecaster {
    fn forecast(&self, series: &CitySeries, horizon: usize) -> Result<ForecastResult, ForecastError> {
        if horizon == 0 {
            return Err(ForecastError::InvalidHorizon(horizon));
        }
        let components = HeuristicComponents::from_series(series)?;
        let Some(last_date) = series.last_date() else {
            return Err(ForecastError::InsufficientHistory {
                required: 1,
                actual: 0,
            });
        };
        debug!(
            "Heuristic forecast for {}: recent {:.2}, trend {:.4}, covariates {:.3}",
            series.city(),
            components.recent_avg,
            components.trend,
            components.covariate_adjustment
        );

        let future = (1..=horizon)
            .map(|step| {
                let date = last_date + Duration::days(step as i64);
                ForecastPoint::with_band(date, components.point(step, date.ordinal()), uncertainty(step))
            })
            .collect();

        Ok(ForecastResult::new(history_echo(series), future))
    }
}
