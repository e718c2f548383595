#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/spoke-analytics/spoke/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod calendar;
mod linalg;
pub mod trend_seasonal;
pub mod window;

pub use calendar::{MonthWindow, weekly_dates_after};
pub use trend_seasonal::{FittedTrendSeasonal, TrendSeasonalConfig, TrendSeasonalModel};
pub use window::{MonthSummary, WindowSummarizer};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use spoke_data::Series;
use thiserror::Error;

/// Errors that can occur while fitting or applying a forecast model
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Too few observations to fit
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// Invalid model configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The normal equations could not be solved
    #[error("Model fit failed: normal equations are singular")]
    Singular,

    /// Date arithmetic left the representable calendar
    #[error("Date out of range: {0}")]
    DateOutOfRange(NaiveDate),
}

/// One forecast period: a point estimate with its uncertainty bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Period date
    pub date: NaiveDate,
    /// Point estimate
    pub point_estimate: f64,
    /// Lower bound of the uncertainty interval
    pub lower_bound: f64,
    /// Upper bound of the uncertainty interval
    pub upper_bound: f64,
}

impl ForecastPoint {
    /// Create a new forecast point.
    pub const fn new(
        date: NaiveDate,
        point_estimate: f64,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Self {
        Self {
            date,
            point_estimate,
            lower_bound,
            upper_bound,
        }
    }
}

/// A forecasting model that can be fit on a dated series.
pub trait ForecastModel {
    /// The fitted model produced by [`ForecastModel::fit`]
    type Fitted: FittedForecast;

    /// Fit the model on an observed series.
    fn fit(&self, series: &Series) -> Result<Self::Fitted, ForecastError>;
}

/// A fitted forecasting model.
pub trait FittedForecast {
    /// Predict one point per date, in the order given.
    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastPoint>, ForecastError>;
}
