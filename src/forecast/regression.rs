//! Feature standardization and ridge regression solved through the normal equations.

use crate::forecast::error::ForecastError;
use serde::{Deserialize, Serialize};

/// Per-feature mean and population standard deviation of a training matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Fits on `rows`. A constant feature gets a scale of 1 so it maps to zero.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, ForecastError> {
        let Some(width) = rows.first().map(Vec::len) else {
            return Err(ForecastError::InsufficientHistory {
                required: 1,
                actual: 0,
            });
        };
        let n = rows.len() as f64;

        let mut means = vec![0.0; width];
        for row in rows {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value / n;
            }
        }

        let mut scales = vec![0.0; width];
        for row in rows {
            for ((scale, mean), value) in scales.iter_mut().zip(&means).zip(row) {
                *scale += (value - mean).powi(2) / n;
            }
        }
        for scale in scales.iter_mut() {
            *scale = scale.sqrt();
            if *scale < 1e-12 {
                *scale = 1.0;
            }
        }

        Ok(Self { means, scales })
    }

    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(value, (mean, scale))| (value - mean) / scale)
            .collect()
    }

    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }
}

/// L2-regularized linear model. Expects centered (standardized) features, so the
/// intercept is the mean of the training target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RidgeRegression {
    alpha: f64,
    intercept: f64,
    coefficients: Vec<f64>,
}

impl RidgeRegression {
    pub fn fit(rows: &[Vec<f64>], targets: &[f64], alpha: f64) -> Result<Self, ForecastError> {
        if rows.is_empty() || rows.len() != targets.len() {
            return Err(ForecastError::InsufficientHistory {
                required: 1,
                actual: rows.len().min(targets.len()),
            });
        }
        let width = rows[0].len();
        let intercept = targets.iter().sum::<f64>() / targets.len() as f64;

        // (X'X + alpha I) w = X'(y - mean)
        let mut gram = vec![vec![0.0; width]; width];
        let mut moment = vec![0.0; width];
        for (row, target) in rows.iter().zip(targets) {
            let centered = target - intercept;
            for i in 0..width {
                moment[i] += row[i] * centered;
                for j in 0..width {
                    gram[i][j] += row[i] * row[j];
                }
            }
        }
        for (i, diagonal) in gram.iter_mut().enumerate() {
            diagonal[i] += alpha;
        }

        let coefficients = solve(gram, moment)?;
        Ok(Self {
            alpha,
            intercept,
            coefficients,
        })
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }

    pub fn predict(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, ForecastError> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&x, &y| a[x][col].abs().total_cmp(&a[y][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < 1e-12 {
            return Err(ForecastError::Numerical(
                "Singular system in ridge regression".to_string(),
            ));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}

/// Coefficient of determination. With a constant target the score is 1 for a
/// perfect fit and 0 otherwise.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len() as f64;
    let mean = actual.iter().sum::<f64>() / n;
    let ss_tot: f64 = actual.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();

    if ss_tot > 1e-12 {
        1.0 - ss_res / ss_tot
    } else if ss_res < 1e-12 {
        1.0
    } else {
        0.0
    }
}

pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();
    (ss_res / actual.len() as f64).sqrt()
}
