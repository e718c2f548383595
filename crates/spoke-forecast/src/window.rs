//! Next-calendar-month aggregation of a forecast.
//!
//! Selects the forecast points dated inside the half-open window
//! `[first of next month, first of the month after)` and sums the point
//! estimates and both bounds independently. An empty selection sums to zero.

use crate::calendar::MonthWindow;
use crate::{ForecastError, ForecastPoint};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sums of a forecast over the next calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
    /// First day of the window (inclusive)
    pub window_start: NaiveDate,
    /// First day after the window (exclusive)
    pub window_end: NaiveDate,
    /// Sum of point estimates in the window
    pub sum_point: f64,
    /// Sum of lower bounds in the window
    pub sum_lower: f64,
    /// Sum of upper bounds in the window
    pub sum_upper: f64,
}

/// Aggregates forecast points into a [`MonthSummary`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowSummarizer;

impl WindowSummarizer {
    /// Create a new summarizer.
    pub const fn new() -> Self {
        Self
    }

    /// Summarize `points` over the calendar month after the one containing `today`.
    pub fn summarize(
        &self,
        today: NaiveDate,
        points: &[ForecastPoint],
    ) -> Result<MonthSummary, ForecastError> {
        let window = MonthWindow::next_after(today)?;
        Ok(self.summarize_window(window, points))
    }

    /// Summarize `points` over an explicit window.
    pub fn summarize_window(&self, window: MonthWindow, points: &[ForecastPoint]) -> MonthSummary {
        let (sum_point, sum_lower, sum_upper) = points
            .iter()
            .filter(|p| window.contains(p.date))
            .fold((0.0, 0.0, 0.0), |(point, lower, upper), p| {
                (
                    point + p.point_estimate,
                    lower + p.lower_bound,
                    upper + p.upper_bound,
                )
            });

        MonthSummary {
            window_start: window.start,
            window_end: window.end,
            sum_point,
            sum_lower,
            sum_upper,
        }
    }
}
