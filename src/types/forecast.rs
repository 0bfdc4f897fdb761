//! Dated forecast output shared by both forecasting strategies.

use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column names of the forecast table returned by [`ForecastResult::to_frame`].
pub const COL_FORECAST_DATE: &str = "date";
pub const COL_POINT_ESTIMATE: &str = "point_estimate";
pub const COL_LOWER_BOUND: &str = "lower_bound";
pub const COL_UPPER_BOUND: &str = "upper_bound";

/// A single dated estimate with its uncertainty band.
///
/// Always satisfies `lower_bound <= point_estimate <= upper_bound`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub point_estimate: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl ForecastPoint {
    /// An observed value echoed back: the band collapses onto the value.
    pub fn observed(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            point_estimate: value,
            lower_bound: value,
            upper_bound: value,
        }
    }

    /// A symmetric band of `half_width` around `point`. Negative widths are clamped to zero.
    pub fn with_band(date: NaiveDate, point: f64, half_width: f64) -> Self {
        let half_width = half_width.max(0.0);
        Self {
            date,
            point_estimate: point,
            lower_bound: point - half_width,
            upper_bound: point + half_width,
        }
    }

    pub fn band_width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }
}

/// The historical echo of a series followed by `horizon` future points, in date order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    points: Vec<ForecastPoint>,
    history_len: usize,
}

impl ForecastResult {
    pub(crate) fn new(history: Vec<ForecastPoint>, future: Vec<ForecastPoint>) -> Self {
        let history_len = history.len();
        let mut points = history;
        points.extend(future);
        Self {
            points,
            history_len,
        }
    }

    /// All points, history first.
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Number of echoed historical points.
    pub fn history_len(&self) -> usize {
        self.history_len
    }

    pub fn history(&self) -> &[ForecastPoint] {
        &self.points[..self.history_len]
    }

    /// Only the forecast horizon.
    pub fn future(&self) -> &[ForecastPoint] {
        &self.points[self.history_len..]
    }

    pub fn horizon(&self) -> usize {
        self.points.len() - self.history_len
    }

    /// Converts the result into a `DataFrame` with the columns
    /// `date`, `point_estimate`, `lower_bound`, `upper_bound`.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let days: Vec<i32> = self
            .points
            .iter()
            .map(|p| crate::utils::days_since_epoch(p.date))
            .collect();
        let date = Column::new(COL_FORECAST_DATE.into(), days).cast(&DataType::Date)?;
        let point: Vec<f64> = self.points.iter().map(|p| p.point_estimate).collect();
        let lower: Vec<f64> = self.points.iter().map(|p| p.lower_bound).collect();
        let upper: Vec<f64> = self.points.iter().map(|p| p.upper_bound).collect();

        DataFrame::new(vec![
            date,
            Column::new(COL_POINT_ESTIMATE.into(), point),
            Column::new(COL_LOWER_BOUND.into(), lower),
            Column::new(COL_UPPER_BOUND.into(), upper),
        ])
    }
}
