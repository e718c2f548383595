//! Regression accuracy metrics.
//!
//! R² follows the classical `1 - SS_res / SS_tot`, except that a target with
//! zero variance (every actual value identical) reports `0.0` instead of an
//! undefined or infinite value. Residuals are divided by their largest
//! magnitude before squaring, so finite inputs never overflow and the metric
//! set is always finite.

use crate::BoostError;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Accuracy of one set of predictions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    /// Mean absolute error
    pub mae: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Coefficient of determination
    pub r2: f64,
}

/// Computes [`MetricSet`]s from parallel actual/predicted arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsEngine;

impl MetricsEngine {
    /// Create a new metrics engine
    pub const fn new() -> Self {
        Self
    }

    /// Score `predicted` against `actual`.
    ///
    /// Both arrays must have the same length. Empty input scores all zeros.
    pub fn evaluate(
        &self,
        actual: &Array1<f64>,
        predicted: &Array1<f64>,
    ) -> Result<MetricSet, BoostError> {
        if actual.len() != predicted.len() {
            return Err(BoostError::LengthMismatch {
                expected: actual.len(),
                actual: predicted.len(),
            });
        }
        if actual.is_empty() {
            return Ok(MetricSet::default());
        }

        Ok(MetricSet {
            mae: mae(actual, predicted),
            rmse: rmse(actual, predicted),
            r2: r2(actual, predicted),
        })
    }
}

/// Mean absolute error
pub fn mae(actual: &Array1<f64>, predicted: &Array1<f64>) -> f64 {
    let residuals = actual - predicted;
    let scale = max_abs(&residuals);
    if scale == 0.0 {
        return 0.0;
    }
    scale * residuals.mapv(|r| (r / scale).abs()).mean().unwrap_or(0.0)
}

/// Root mean squared error
pub fn rmse(actual: &Array1<f64>, predicted: &Array1<f64>) -> f64 {
    let residuals = actual - predicted;
    let scale = max_abs(&residuals);
    if scale == 0.0 {
        return 0.0;
    }
    scale * mean_square(&residuals, scale).sqrt()
}

/// Coefficient of determination, `0.0` when `actual` has no variance
pub fn r2(actual: &Array1<f64>, predicted: &Array1<f64>) -> f64 {
    let magnitude = max_abs(actual);
    let Some(mean) = actual
        .mapv(|y| if magnitude > 0.0 { y / magnitude } else { 0.0 })
        .mean()
        .map(|m| m * magnitude)
    else {
        return 0.0;
    };
    let residuals = actual - predicted;
    let deviations = actual.mapv(|y| y - mean);

    // One shared scale cancels in the ratio
    let scale = max_abs(&residuals).max(max_abs(&deviations));
    if scale == 0.0 {
        return 0.0;
    }
    let ss_tot = mean_square(&deviations, scale);
    if ss_tot == 0.0 {
        return 0.0;
    }
    1.0 - mean_square(&residuals, scale) / ss_tot
}

/// Largest absolute value, `0.0` for an empty array
fn max_abs(values: &Array1<f64>) -> f64 {
    values.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()))
}

/// `mean((v / scale)²)`, which cannot overflow for `scale >= max |v|`
fn mean_square(values: &Array1<f64>, scale: f64) -> f64 {
    values.mapv(|v| (v / scale).powi(2)).mean().unwrap_or(0.0)
}
