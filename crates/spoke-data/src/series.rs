//! Time series ingestion for the forecast job.
//!
//! The payload is `{ "series": [{ "ds": "YYYY-MM-DD", "y": number }, ...], "horizonWeeks": n }`.
//! Both keys are optional: a missing or `null` series is empty and a missing
//! horizon defaults to [`DEFAULT_HORIZON_WEEKS`]. Rows whose `y` is missing or
//! `null` are dropped.

use crate::error::{DataError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Number of weekly periods forecast when the payload does not say.
pub const DEFAULT_HORIZON_WEEKS: usize = 12;

/// One observation as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    /// Observation date
    pub ds: String,
    /// Observed value, `None` when missing or `null`
    #[serde(default)]
    pub y: Option<f64>,
}

/// Forecast job payload, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    /// Observed series, in any order
    #[serde(default)]
    pub series: Option<Vec<RawObservation>>,

    /// Number of future weekly periods to forecast; any integral number
    #[serde(default)]
    pub horizon_weeks: Option<f64>,
}

impl ForecastRequest {
    /// Parse a payload. Blank input is treated as an empty object.
    pub fn from_json(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(raw)?)
    }

    /// Validate into a [`ForecastInput`].
    pub fn validate(self) -> Result<ForecastInput> {
        let horizon_weeks = match self.horizon_weeks {
            None => DEFAULT_HORIZON_WEEKS,
            Some(h) if h.is_finite() && h >= 0.0 && h.fract() == 0.0 => h as usize,
            Some(h) => return Err(DataError::InvalidHorizon(h)),
        };

        let observations = self
            .series
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .filter_map(|(i, raw)| raw.y.map(|y| (i, raw.ds, y)))
            .map(|(i, ds, y)| {
                let date = parse_date(&ds).ok_or_else(|| DataError::InvalidDate {
                    field: format!("series[{i}].ds"),
                    value: ds.clone(),
                })?;
                Ok(Observation::new(date, y))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ForecastInput {
            series: Series::new(observations)?,
            horizon_weeks,
        })
    }
}

/// Parse a calendar date, accepting an optional time-of-day suffix.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// A dated observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Observation date
    pub date: NaiveDate,
    /// Observed value
    pub value: f64,
}

impl Observation {
    /// Create a new observation.
    pub const fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A validated series, sorted by date ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    observations: Vec<Observation>,
}

impl Series {
    /// Build a series from observations in any order.
    ///
    /// Observations with equal dates keep their input order.
    pub fn new(mut observations: Vec<Observation>) -> Result<Self> {
        if let Some(index) = observations.iter().position(|o| !o.value.is_finite()) {
            return Err(DataError::NonFinite {
                field: "series.y".to_string(),
                index,
            });
        }
        observations.sort_by_key(|o| o.date);
        Ok(Self { observations })
    }

    /// Number of observations.
    pub const fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the series has no observations.
    pub const fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Observations in date order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Observation dates in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    /// Observed values in date order.
    pub fn values(&self) -> Array1<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    /// Earliest observation date.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    /// Latest observation date.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }
}

/// Validated input for the forecast job.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastInput {
    /// Observed series
    pub series: Series,
    /// Number of future weekly periods to forecast
    pub horizon_weeks: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_defaults_when_keys_missing() {
        let input = ForecastRequest::from_json("{}").unwrap().validate().unwrap();
        assert!(input.series.is_empty());
        assert_eq!(input.horizon_weeks, 12);
    }

    #[test]
    fn test_blank_payload_is_empty_request() {
        let input = ForecastRequest::from_json("  \n").unwrap().validate().unwrap();
        assert!(input.series.is_empty());
    }

    #[test]
    fn test_null_series_is_empty() {
        let input = ForecastRequest::from_json(r#"{"series": null, "horizonWeeks": 4}"#)
            .unwrap()
            .validate()
            .unwrap();
        assert!(input.series.is_empty());
        assert_eq!(input.horizon_weeks, 4);
    }

    #[test]
    fn test_series_sorted_by_date() {
        let raw = r#"{"series": [
            {"ds": "2024-03-11", "y": 3},
            {"ds": "2024-02-26", "y": 1},
            {"ds": "2024-03-04", "y": 2}
        ]}"#;
        let input = ForecastRequest::from_json(raw).unwrap().validate().unwrap();
        let series = input.series;

        assert_eq!(series.len(), 3);
        assert_eq!(series.first_date(), Some(date(2024, 2, 26)));
        assert_eq!(series.last_date(), Some(date(2024, 3, 11)));
        let values = series.values();
        assert_relative_eq!(values[0], 1.0);
        assert_relative_eq!(values[2], 3.0);
    }

    #[rstest]
    #[case("2024-03-15", date(2024, 3, 15))]
    #[case("2024-03-15 00:00:00", date(2024, 3, 15))]
    #[case("2024-03-15T08:30:00", date(2024, 3, 15))]
    #[case("2024-03-15T08:30:00Z", date(2024, 3, 15))]
    fn test_parse_date_formats(#[case] raw: &str, #[case] expected: NaiveDate) {
        assert_eq!(parse_date(raw), Some(expected));
    }

    #[test]
    fn test_invalid_date_rejected() {
        let raw = r#"{"series": [{"ds": "2024-02-30", "y": 1}]}"#;
        let err = ForecastRequest::from_json(raw)
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidDate { .. }));
    }

    #[test]
    fn test_missing_or_null_values_dropped() {
        let raw = r#"{"series": [
            {"ds": "2024-02-01", "y": 4},
            {"ds": "2024-02-08"},
            {"ds": "2024-02-15", "y": null},
            {"ds": "2024-02-22", "y": 6}
        ]}"#;
        let input = ForecastRequest::from_json(raw).unwrap().validate().unwrap();

        assert_eq!(input.series.len(), 2);
        assert_eq!(input.series.dates(), vec![date(2024, 2, 1), date(2024, 2, 22)]);
    }

    #[test]
    fn test_wrongly_typed_value_rejected() {
        let raw = r#"{"series": [{"ds": "2024-02-01", "y": "four"}]}"#;
        assert!(matches!(
            ForecastRequest::from_json(raw),
            Err(DataError::Json(_))
        ));
    }

    #[rstest]
    #[case("4", 4)]
    #[case("4.0", 4)]
    #[case("0", 0)]
    fn test_integral_horizon_accepted(#[case] horizon: &str, #[case] expected: usize) {
        let raw = format!(r#"{{"series": [], "horizonWeeks": {horizon}}}"#);
        let input = ForecastRequest::from_json(&raw).unwrap().validate().unwrap();
        assert_eq!(input.horizon_weeks, expected);
    }

    #[rstest]
    #[case("-1")]
    #[case("2.5")]
    #[case("-0.5")]
    fn test_invalid_horizon_rejected(#[case] horizon: &str) {
        let raw = format!(r#"{{"series": [], "horizonWeeks": {horizon}}}"#);
        let err = ForecastRequest::from_json(&raw)
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidHorizon(_)));
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let observations = vec![
            Observation::new(date(2024, 1, 1), 1.0),
            Observation::new(date(2024, 1, 8), f64::NAN),
        ];
        let err = Series::new(observations).unwrap_err();
        assert!(matches!(err, DataError::NonFinite { index: 1, .. }));
    }
}
