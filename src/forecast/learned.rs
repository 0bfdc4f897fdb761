//! Trainable regression forecaster with an iterative multi-day rollout.
//!
//! Training engineers calendar, covariate, lag and rolling-mean features from a
//! [`CitySeries`], standardizes them on a seeded 80/20 split and fits a ridge
//! regression. Prediction appends one synthesized observation per future day to a
//! working copy of the history: covariates are carried forward from the last real
//! observation and each predicted temperature feeds the lags of the next day.

use crate::forecast::error::ForecastError;
use crate::forecast::features::{
    covariate_fallbacks, feature_row, training_set, CovariateFallbacks, MAX_LAG,
};
use crate::forecast::regression::{r2_score, rmse, RidgeRegression, StandardScaler};
use crate::forecast::{history_echo, model_store, Forecaster};
use crate::types::forecast::{ForecastPoint, ForecastResult};
use crate::types::observation::{CitySeries, Covariate, ObservationRecord};
use chrono::Duration;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Smallest number of usable rows for which both splits are non-empty.
pub const MIN_TRAINING_ROWS: usize = 5;

/// How the learned forecaster turns a point estimate into a band.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BandPolicy {
    /// `lower = upper = point`.
    #[default]
    PointOnly,
    /// A constant half-width in °C.
    Fixed(f64),
    /// The held-out RMSE times a multiplier.
    TestRmse(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedConfig {
    pub seed: u64,
    pub test_fraction: f64,
    pub alpha: f64,
    pub rolling_window: usize,
    pub band: BandPolicy,
}

impl Default for LearnedConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.2,
            alpha: 1.0,
            rolling_window: 7,
            band: BandPolicy::PointOnly,
        }
    }
}

/// Fit quality reported by [`LearnedForecaster::train`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub train_score: f64,
    pub test_score: f64,
    /// Usable rows after dropping the warm-up rows.
    pub n_samples: usize,
    pub test_rmse: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FittedModel {
    config: LearnedConfig,
    scaler: StandardScaler,
    regressor: RidgeRegression,
    report: TrainingReport,
}

#[derive(Debug, Clone, Default)]
pub struct LearnedForecaster {
    config: LearnedConfig,
    model: Option<FittedModel>,
}

impl LearnedForecaster {
    pub fn new(config: LearnedConfig) -> Self {
        Self {
            config,
            model: None,
        }
    }

    pub fn config(&self) -> &LearnedConfig {
        &self.config
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// Report of the last training run, `None` before training.
    pub fn report(&self) -> Option<&TrainingReport> {
        self.model.as_ref().map(|m| &m.report)
    }

    /// Fits the model on `series`, replacing any previous fit.
    ///
    /// # Errors
    ///
    /// [`ForecastError::InsufficientHistory`] when fewer than [`MIN_TRAINING_ROWS`]
    /// rows remain after the lag warm-up.
    pub fn train(&mut self, series: &CitySeries) -> Result<TrainingReport, ForecastError> {
        let (rows, targets) = training_set(series.records(), self.config.rolling_window);
        let n_samples = rows.len();
        if n_samples < MIN_TRAINING_ROWS {
            return Err(ForecastError::InsufficientHistory {
                required: MIN_TRAINING_ROWS,
                actual: n_samples,
            });
        }

        let mut order: Vec<usize> = (0..n_samples).collect();
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        order.shuffle(&mut rng);
        let test_len = ((n_samples as f64 * self.config.test_fraction).ceil() as usize)
            .clamp(1, n_samples - 1);
        let (test_idx, train_idx) = order.split_at(test_len);

        let pick = |idx: &[usize]| -> (Vec<Vec<f64>>, Vec<f64>) {
            idx.iter().map(|&i| (rows[i].clone(), targets[i])).unzip()
        };
        let (train_rows, train_targets) = pick(train_idx);
        let (test_rows, test_targets) = pick(test_idx);

        let scaler = StandardScaler::fit(&train_rows)?;
        let train_rows = scaler.transform(&train_rows);
        let test_rows = scaler.transform(&test_rows);
        let regressor = RidgeRegression::fit(&train_rows, &train_targets, self.config.alpha)?;

        let train_pred = regressor.predict(&train_rows);
        let test_pred = regressor.predict(&test_rows);
        let report = TrainingReport {
            train_score: r2_score(&train_targets, &train_pred),
            test_score: r2_score(&test_targets, &test_pred),
            n_samples,
            test_rmse: rmse(&test_targets, &test_pred),
        };
        info!(
            "Trained forecaster for {}: {} samples, train R2 {:.3}, test R2 {:.3}",
            series.city(),
            report.n_samples,
            report.train_score,
            report.test_score
        );

        self.model = Some(FittedModel {
            config: self.config.clone(),
            scaler,
            regressor,
            report,
        });
        Ok(report)
    }

    /// Rolls the fitted model forward `horizon` days past the end of `series`.
    ///
    /// # Errors
    ///
    /// * [`ForecastError::ModelNotTrained`] before [`train`](Self::train) or [`load`](Self::load).
    /// * [`ForecastError::InvalidHorizon`] for a zero horizon.
    /// * [`ForecastError::InsufficientHistory`] when the series is shorter than the lags.
    pub fn predict_next(
        &self,
        series: &CitySeries,
        horizon: usize,
    ) -> Result<ForecastResult, ForecastError> {
        let model = self.model.as_ref().ok_or(ForecastError::ModelNotTrained)?;
        if horizon == 0 {
            return Err(ForecastError::InvalidHorizon(horizon));
        }
        let history = series.records();
        let Some(last_date) = series.last_date().filter(|_| history.len() >= MAX_LAG) else {
            return Err(ForecastError::InsufficientHistory {
                required: MAX_LAG,
                actual: history.len(),
            });
        };

        let carried = Covariate::ALL
            .map(|covariate| series.last_known(covariate).unwrap_or(covariate.default_value()));
        let fallbacks: CovariateFallbacks = covariate_fallbacks(history);
        let window = model.config.rolling_window;

        let mut working: Vec<ObservationRecord> = Vec::with_capacity(history.len() + horizon);
        working.extend_from_slice(history);
        let mut future = Vec::with_capacity(horizon);

        for step in 1..=horizon {
            let date = last_date + Duration::days(step as i64);
            let mut next = ObservationRecord::new(date, f64::NAN);
            next.humidity = Some(carried[0]);
            next.pressure = Some(carried[1]);
            next.wind_speed = Some(carried[2]);

            let tail = &working[working.len().saturating_sub(window.max(MAX_LAG))..];
            let row = feature_row(&next, tail, window, &fallbacks).ok_or_else(|| {
                ForecastError::Numerical(format!("No features for rollout day {}", date))
            })?;
            let point = model
                .regressor
                .predict_row(&model.scaler.transform_row(&row));
            if !point.is_finite() {
                return Err(ForecastError::Numerical(format!(
                    "Non-finite prediction for {}",
                    date
                )));
            }

            next.temperature = point;
            working.push(next);
            future.push(ForecastPoint::with_band(date, point, self.half_width(model)));
        }
        debug!(
            "Rolled forecaster forward {} days for {}",
            horizon,
            series.city()
        );

        Ok(ForecastResult::new(history_echo(series), future))
    }

    fn half_width(&self, model: &FittedModel) -> f64 {
        match self.config.band {
            BandPolicy::PointOnly => 0.0,
            BandPolicy::Fixed(width) => width,
            BandPolicy::TestRmse(multiplier) => multiplier * model.report.test_rmse,
        }
    }

    /// Persists the fitted model.
    pub fn save(&self, path: &Path) -> Result<(), ForecastError> {
        let model = self.model.as_ref().ok_or(ForecastError::ModelNotTrained)?;
        model_store::save(model, path)
    }

    /// Restores a model written by [`save`](Self::save), including its configuration.
    pub fn load(path: &Path) -> Result<Self, ForecastError> {
        let model: FittedModel = model_store::load(path)?;
        Ok(Self {
            config: model.config.clone(),
            model: Some(model),
        })
    }
}

impl Forecaster for LearnedForecaster {
    fn forecast(&self, series: &CitySeries, horizon: usize) -> Result<ForecastResult, ForecastError> {
        self.predict_next(series, horizon)
    }
}
