//! Additive trend + seasonality forecaster.
//!
//! Models a series as
//!
//! y(d) = a + b * t(d) + yearly(d) + weekly(d)
//!
//! where t(d) maps the observed history onto [0, 1] and the seasonal terms are
//! Fourier series with periods of 365.25 and 7 days. Targets are scaled by
//! their largest absolute value before fitting.
//!
//! Coefficients come from ridge-regularised least squares: seasonal terms get
//! a Gaussian prior with standard deviation `seasonality_prior_scale`, trend
//! terms only a numerical jitter. A series that is exactly linear is therefore
//! reproduced exactly, seasonal terms staying at zero.
//!
//! Uncertainty bounds are `yhat ± z * sigma * sqrt(1 + h / n)` with `sigma`
//! the residual standard deviation, `h` the number of weeks past the last
//! observation and `n` the number of observations.

use crate::linalg::ridge_solve;
use crate::{FittedForecast, ForecastError, ForecastModel, ForecastPoint};
use chrono::{Datelike, NaiveDate};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use spoke_data::Series;
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;
use tracing::info;

/// Minimum number of observations needed to fit.
const MIN_OBSERVATIONS: usize = 2;

/// Ridge penalty on the intercept and slope.
const TREND_JITTER: f64 = 1e-8;

const DAYS_PER_YEAR: f64 = 365.25;
const DAYS_PER_WEEK: f64 = 7.0;

/// Configuration for the trend + seasonality model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendSeasonalConfig {
    /// Include yearly seasonality (default: true)
    pub yearly_seasonality: bool,

    /// Number of Fourier pairs for yearly seasonality (default: 10)
    pub yearly_fourier_order: usize,

    /// Include weekly seasonality (default: true)
    pub weekly_seasonality: bool,

    /// Number of Fourier pairs for weekly seasonality (default: 3)
    pub weekly_fourier_order: usize,

    /// Prior standard deviation of seasonal coefficients (default: 10.0)
    pub seasonality_prior_scale: f64,

    /// Coverage of the uncertainty interval (default: 0.8)
    pub interval_width: f64,
}

impl Default for TrendSeasonalConfig {
    fn default() -> Self {
        Self {
            yearly_seasonality: true,
            yearly_fourier_order: 10,
            weekly_seasonality: true,
            weekly_fourier_order: 3,
            seasonality_prior_scale: 10.0,
            interval_width: 0.8,
        }
    }
}

impl TrendSeasonalConfig {
    fn validate(&self) -> Result<(), ForecastError> {
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ForecastError::InvalidConfig(format!(
                "interval_width must be in (0, 1), got {}",
                self.interval_width
            )));
        }
        if !(self.seasonality_prior_scale > 0.0 && self.seasonality_prior_scale.is_finite()) {
            return Err(ForecastError::InvalidConfig(format!(
                "seasonality_prior_scale must be positive, got {}",
                self.seasonality_prior_scale
            )));
        }
        Ok(())
    }

    const fn yearly_order(&self) -> usize {
        if self.yearly_seasonality {
            self.yearly_fourier_order
        } else {
            0
        }
    }

    const fn weekly_order(&self) -> usize {
        if self.weekly_seasonality {
            self.weekly_fourier_order
        } else {
            0
        }
    }
}

/// Trend + seasonality forecaster
#[derive(Debug, Clone, Default)]
pub struct TrendSeasonalModel {
    config: TrendSeasonalConfig,
}

impl TrendSeasonalModel {
    /// Create a new model with the given configuration
    pub fn new(config: TrendSeasonalConfig) -> Result<Self, ForecastError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the configuration
    pub const fn config(&self) -> &TrendSeasonalConfig {
        &self.config
    }
}

impl ForecastModel for TrendSeasonalModel {
    type Fitted = FittedTrendSeasonal;

    fn fit(&self, series: &Series) -> Result<FittedTrendSeasonal, ForecastError> {
        let n = series.len();
        let (Some(origin), Some(last_observed)) = (series.first_date(), series.last_date()) else {
            return Err(ForecastError::InsufficientData {
                required: MIN_OBSERVATIONS,
                actual: n,
            });
        };
        if n < MIN_OBSERVATIONS {
            return Err(ForecastError::InsufficientData {
                required: MIN_OBSERVATIONS,
                actual: n,
            });
        }

        let span_days = last_observed.signed_duration_since(origin).num_days() as f64;
        let basis = DesignBasis {
            origin,
            span_days: if span_days > 0.0 { span_days } else { 1.0 },
            yearly_order: self.config.yearly_order(),
            weekly_order: self.config.weekly_order(),
        };

        let values = series.values();
        let max_abs = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        let y_scale = if max_abs > 0.0 { max_abs } else { 1.0 };
        let target = &values / y_scale;

        let design = basis.matrix(&series.dates());
        let seasonal_penalty = self.config.seasonality_prior_scale.powi(-2);
        let penalties = Array1::from_shape_fn(basis.width(), |j| {
            if j < 2 {
                TREND_JITTER
            } else {
                seasonal_penalty
            }
        });

        let coefficients =
            ridge_solve(&design, &target, &penalties).ok_or(ForecastError::Singular)?;

        let residuals = &target - &design.dot(&coefficients);
        let dof = n.saturating_sub(2).max(1) as f64;
        let sigma = (residuals.mapv(|r| r * r).sum() / dof).sqrt() * y_scale;

        let normal =
            Normal::new(0.0, 1.0).map_err(|e| ForecastError::InvalidConfig(e.to_string()))?;
        let z = normal.inverse_cdf(0.5 + self.config.interval_width / 2.0);

        info!(
            observations = n,
            params = coefficients.len(),
            sigma,
            "fitted trend-seasonal model"
        );

        Ok(FittedTrendSeasonal {
            basis,
            coefficients,
            y_scale,
            sigma,
            z,
            last_observed,
            n_observations: n,
        })
    }
}

/// Maps dates onto rows of the design matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DesignBasis {
    origin: NaiveDate,
    span_days: f64,
    yearly_order: usize,
    weekly_order: usize,
}

impl DesignBasis {
    const fn width(&self) -> usize {
        2 + 2 * (self.yearly_order + self.weekly_order)
    }

    fn row(&self, date: NaiveDate) -> Array1<f64> {
        let t = date.signed_duration_since(self.origin).num_days() as f64 / self.span_days;
        let days = f64::from(date.num_days_from_ce());

        let mut row = Vec::with_capacity(self.width());
        row.push(1.0);
        row.push(t);
        push_fourier(&mut row, days, DAYS_PER_YEAR, self.yearly_order);
        push_fourier(&mut row, days, DAYS_PER_WEEK, self.weekly_order);
        Array1::from_vec(row)
    }

    fn matrix(&self, dates: &[NaiveDate]) -> Array2<f64> {
        let mut design = Array2::<f64>::zeros((dates.len(), self.width()));
        for (i, &date) in dates.iter().enumerate() {
            design.row_mut(i).assign(&self.row(date));
        }
        design
    }
}

fn push_fourier(row: &mut Vec<f64>, days: f64, period: f64, order: usize) {
    for k in 1..=order {
        let x = 2.0 * PI * k as f64 * days / period;
        row.push(x.sin());
        row.push(x.cos());
    }
}

/// A fitted trend + seasonality model
#[derive(Debug, Clone)]
pub struct FittedTrendSeasonal {
    basis: DesignBasis,
    coefficients: Array1<f64>,
    y_scale: f64,
    sigma: f64,
    z: f64,
    last_observed: NaiveDate,
    n_observations: usize,
}

impl FittedTrendSeasonal {
    /// Residual standard deviation in the units of the series
    pub const fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Date of the last observation the model was fit on
    pub const fn last_observed(&self) -> NaiveDate {
        self.last_observed
    }
}

impl FittedForecast for FittedTrendSeasonal {
    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastPoint>, ForecastError> {
        let n = self.n_observations as f64;
        Ok(dates
            .iter()
            .map(|&date| {
                let yhat = self.basis.row(date).dot(&self.coefficients) * self.y_scale;
                let days_ahead = date.signed_duration_since(self.last_observed).num_days();
                let weeks_ahead = days_ahead.max(0) as f64 / DAYS_PER_WEEK;
                let half_width = self.z * self.sigma * (1.0 + weeks_ahead / n).sqrt();
                ForecastPoint::new(date, yhat, yhat - half_width, yhat + half_width)
            })
            .collect())
    }
}
