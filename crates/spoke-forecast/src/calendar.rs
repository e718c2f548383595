//! Calendar arithmetic for forecast horizons and summary windows.

use crate::ForecastError;
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Half-open calendar window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthWindow {
    /// First day of the window (inclusive)
    pub start: NaiveDate,
    /// First day after the window (exclusive)
    pub end: NaiveDate,
}

impl MonthWindow {
    /// The calendar month after the one containing `today`.
    ///
    /// Always starts on day 1, whatever the day of month of `today`, and
    /// rolls December over into January of the following year.
    pub fn next_after(today: NaiveDate) -> Result<Self, ForecastError> {
        let start = first_of_following_month(today)?;
        let end = first_of_following_month(start)?;
        Ok(Self { start, end })
    }

    /// Whether `date` falls in the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

/// First day of the month after the one containing `date`.
fn first_of_following_month(date: NaiveDate) -> Result<NaiveDate, ForecastError> {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .ok_or(ForecastError::DateOutOfRange(date))
}

/// The first `count` Mondays strictly after `last`.
pub fn weekly_dates_after(
    last: NaiveDate,
    count: usize,
) -> Result<Vec<NaiveDate>, ForecastError> {
    // Monday maps to a full week ahead, Sunday to the next day
    let offset = 7 - u64::from(last.weekday().num_days_from_monday());
    let first = last
        .checked_add_days(Days::new(offset))
        .ok_or(ForecastError::DateOutOfRange(last))?;

    (0..count as u64)
        .map(|week| {
            first
                .checked_add_days(Days::new(week * 7))
                .ok_or(ForecastError::DateOutOfRange(first))
        })
        .collect()
}
