//! Forecast job output.
//!
//! A successful run always emits the window dates. An empty input series
//! short-circuits before any window is computed, so that document carries
//! only the three sums, each the integer `0`.

use chrono::NaiveDate;
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One forecast row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// Forecast date, serialized as `YYYY-MM-DD`
    #[serde(with = "iso_date")]
    pub ds: NaiveDate,
    /// Point estimate
    pub yhat: f64,
    /// Lower interval bound
    pub yhat_lower: f64,
    /// Upper interval bound
    pub yhat_upper: f64,
}

impl ForecastRecord {
    /// Create a new forecast row.
    pub const fn new(ds: NaiveDate, yhat: f64, yhat_lower: f64, yhat_upper: f64) -> Self {
        Self {
            ds,
            yhat,
            yhat_lower,
            yhat_upper,
        }
    }
}

/// Sums of the forecast over the next calendar month.
#[derive(Debug, Clone, PartialEq)]
pub enum NextMonthSummary {
    /// Sums over the half-open window `[start, end)`.
    Window {
        /// First day of the month
        start: NaiveDate,
        /// First day of the following month (exclusive)
        end: NaiveDate,
        /// Sum of point estimates
        sum_mean: f64,
        /// Sum of lower bounds
        sum_lower: f64,
        /// Sum of upper bounds
        sum_upper: f64,
    },
    /// No series was supplied; no window was computed.
    Empty,
}

impl Serialize for NextMonthSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Window {
                start,
                end,
                sum_mean,
                sum_lower,
                sum_upper,
            } => {
                let mut state = serializer.serialize_struct("NextMonthSummary", 5)?;
                state.serialize_field("start", &start.format(DATE_FORMAT).to_string())?;
                state.serialize_field("end", &end.format(DATE_FORMAT).to_string())?;
                state.serialize_field("sumMean", sum_mean)?;
                state.serialize_field("sumLower", sum_lower)?;
                state.serialize_field("sumUpper", sum_upper)?;
                state.end()
            }
            Self::Empty => {
                let mut state = serializer.serialize_struct("NextMonthSummary", 3)?;
                state.serialize_field("sumMean", &0_u8)?;
                state.serialize_field("sumLower", &0_u8)?;
                state.serialize_field("sumUpper", &0_u8)?;
                state.end()
            }
        }
    }
}

/// The forecast job's result document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    /// Future rows, oldest first
    pub forecast: Vec<ForecastRecord>,
    /// Next calendar month summary
    #[serde(rename = "nextMonth")]
    pub next_month: NextMonthSummary,
}

impl ForecastReport {
    /// Create a new report.
    pub const fn new(forecast: Vec<ForecastRecord>, next_month: NextMonthSummary) -> Self {
        Self {
            forecast,
            next_month,
        }
    }

    /// The document emitted for an empty input series.
    pub const fn empty() -> Self {
        Self::new(Vec::new(), NextMonthSummary::Empty)
    }
}

mod iso_date {
    use super::DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        date: &NaiveDate,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}
