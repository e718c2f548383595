//! Forecast pipeline: weekly forecast plus next-calendar-month sums.

use crate::Result;
use chrono::NaiveDate;
use spoke_data::{ForecastInput, ForecastRequest};
use spoke_forecast::{
    FittedForecast, ForecastModel, ForecastPoint, MonthSummary, WindowSummarizer,
    weekly_dates_after,
};
use spoke_output::{ForecastRecord, ForecastReport, NextMonthSummary};
use tracing::{debug, info, warn};

/// Parse, validate and run a forecast payload.
///
/// `today` anchors the next-month window; it is normally the UTC date at
/// invocation.
pub fn run_json<M: ForecastModel>(
    model: &M,
    raw: &str,
    today: NaiveDate,
) -> Result<ForecastReport> {
    let input = ForecastRequest::from_json(raw)?.validate()?;
    run(model, &input, today)
}

/// Run the forecast pipeline on validated input.
///
/// An empty series short-circuits to [`ForecastReport::empty`] without
/// touching the model.
pub fn run<M: ForecastModel>(
    model: &M,
    input: &ForecastInput,
    today: NaiveDate,
) -> Result<ForecastReport> {
    let Some(last_observed) = input.series.last_date() else {
        warn!("empty series, emitting zero summary");
        return Ok(ForecastReport::empty());
    };

    let fitted = model.fit(&input.series)?;
    let dates = weekly_dates_after(last_observed, input.horizon_weeks)?;
    let points = fitted.predict(&dates)?;
    debug!(
        observations = input.series.len(),
        horizon = points.len(),
        "forecast produced"
    );

    let summary = WindowSummarizer::new().summarize(today, &points)?;
    info!(
        start = %summary.window_start,
        end = %summary.window_end,
        sum = summary.sum_point,
        "next month summarized"
    );

    Ok(ForecastReport::new(
        points.iter().map(to_record).collect(),
        to_next_month(&summary),
    ))
}

fn to_record(point: &ForecastPoint) -> ForecastRecord {
    ForecastRecord::new(
        point.date,
        point.point_estimate,
        point.lower_bound,
        point.upper_bound,
    )
}

const fn to_next_month(summary: &MonthSummary) -> NextMonthSummary {
    NextMonthSummary::Window {
        start: summary.window_start,
        end: summary.window_end,
        sum_mean: summary.sum_point,
        sum_lower: summary.sum_lower,
        sum_upper: summary.sum_upper,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use spoke_data::Series;
    use spoke_forecast::ForecastError;
    use std::cell::Cell;

    /// Predicts a fixed value with a fixed half-width, counting fits.
    #[derive(Default)]
    struct FlatModel {
        fits: Cell<usize>,
    }

    struct FlatFitted;

    impl ForecastModel for FlatModel {
        type Fitted = FlatFitted;

        fn fit(&self, _series: &Series) -> std::result::Result<FlatFitted, ForecastError> {
            self.fits.set(self.fits.get() + 1);
            Ok(FlatFitted)
        }
    }

    impl FittedForecast for FlatFitted {
        fn predict(
            &self,
            dates: &[NaiveDate],
        ) -> std::result::Result<Vec<ForecastPoint>, ForecastError> {
            Ok(dates
                .iter()
                .map(|&d| ForecastPoint::new(d, 10.0, 9.0, 11.0))
                .collect())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_series_short_circuits() {
        let model = FlatModel::default();
        let raw = r#"{"series": [], "horizonWeeks": 4}"#;
        let report = run_json(&model, raw, date(2024, 3, 15)).unwrap();

        assert_eq!(report, ForecastReport::empty());
        assert_eq!(model.fits.get(), 0);
    }

    #[test]
    fn test_missing_series_is_empty() {
        let report = run_json(&FlatModel::default(), "{}", date(2024, 3, 15)).unwrap();
        assert_eq!(report, ForecastReport::empty());
    }

    #[test]
    fn test_window_sums_over_next_month() {
        // Last observation Friday 2024-03-15: Mondays Mar 18, 25, Apr 1, 8, 15, 22, 29, May 6
        let raw = r#"{"series": [
            {"ds": "2024-03-08", "y": 10},
            {"ds": "2024-03-15", "y": 10}
        ], "horizonWeeks": 8}"#;
        let report = run_json(&FlatModel::default(), raw, date(2024, 3, 20)).unwrap();

        assert_eq!(report.forecast.len(), 8);
        assert_eq!(report.forecast[0].ds, date(2024, 3, 18));
        match report.next_month {
            NextMonthSummary::Window {
                start,
                end,
                sum_mean,
                sum_lower,
                sum_upper,
            } => {
                assert_eq!(start, date(2024, 4, 1));
                assert_eq!(end, date(2024, 5, 1));
                assert_relative_eq!(sum_mean, 50.0);
                assert_relative_eq!(sum_lower, 45.0);
                assert_relative_eq!(sum_upper, 55.0);
            }
            NextMonthSummary::Empty => panic!("expected a window"),
        }
    }

    #[test]
    fn test_horizon_short_of_window_sums_zero() {
        let raw = r#"{"series": [{"ds": "2024-03-15", "y": 3}], "horizonWeeks": 1}"#;
        let report = run_json(&FlatModel::default(), raw, date(2024, 3, 15)).unwrap();

        assert_eq!(report.forecast.len(), 1);
        assert!(matches!(
            report.next_month,
            NextMonthSummary::Window { sum_mean, .. } if sum_mean == 0.0
        ));
    }

    #[test]
    fn test_unsorted_input_forecasts_after_latest_date() {
        let raw = r#"{"series": [
            {"ds": "2024-06-03", "y": 1},
            {"ds": "2024-05-06", "y": 1}
        ], "horizonWeeks": 1}"#;
        let report = run_json(&FlatModel::default(), raw, date(2024, 6, 3)).unwrap();
        assert_eq!(report.forecast[0].ds, date(2024, 6, 10));
    }

    #[test]
    fn test_invalid_payload_is_fatal() {
        let result = run_json(&FlatModel::default(), "{not json", date(2024, 1, 1));
        assert!(matches!(result, Err(crate::Error::Data(_))));
    }
}
