//! Payload parsing and validation through the public API.

use chrono::NaiveDate;
use spoke_data::{DataError, ForecastRequest, TrainingRequest, read_payload};

#[test]
fn test_forecast_payload_from_stream() {
    let stream = br#"{"series": [{"ds": "2024-02-05", "y": 3.5}, {"ds": "2024-01-29 00:00:00", "y": 1}]}"#;
    let raw = read_payload(&stream[..]).unwrap();
    let input = ForecastRequest::from_json(&raw).unwrap().validate().unwrap();

    assert_eq!(input.horizon_weeks, 12);
    assert_eq!(
        input.series.dates(),
        vec![
            NaiveDate::from_ymd_opt(2024, 1, 29).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 5).unwrap(),
        ]
    );
    assert_eq!(input.series.values().to_vec(), vec![1.0, 3.5]);
}

#[test]
fn test_blank_forecast_payload_is_empty() {
    let input = ForecastRequest::from_json("  \n").unwrap().validate().unwrap();
    assert!(input.series.is_empty());
}

#[test]
fn test_bad_date_names_the_row() {
    let raw = r#"{"series": [{"ds": "2024-01-01", "y": 1}, {"ds": "01/08/2024", "y": 2}]}"#;
    let err = ForecastRequest::from_json(raw).unwrap().validate().unwrap_err();
    assert!(err.to_string().contains("series[1].ds"));
}

#[test]
fn test_training_payload_keeps_entity_order() {
    let raw = r#"{
        "Xtrain": [[1, 2], [3, 4]], "ytrain": [1, 2],
        "Xval": [[5, 6]], "yval": [3],
        "latest": {"station-9": [0, 0], "station-1": [1, 1], "station-5": [2, 2]}
    }"#;
    let dataset = TrainingRequest::from_json(raw).unwrap().validate().unwrap();

    let ids: Vec<&str> = dataset.latest.iter().map(|e| e.entity_id.as_str()).collect();
    assert_eq!(ids, vec!["station-9", "station-1", "station-5"]);
    assert_eq!(dataset.n_features(), 2);
    assert_eq!(dataset.cap.value(), 500.0);
}

#[test]
fn test_training_payload_rejects_negative_cap() {
    let raw = r#"{"Xtrain": [[1]], "ytrain": [1], "Xval": [], "yval": [], "targetCap": -1}"#;
    let err = TrainingRequest::from_json(raw).unwrap().validate().unwrap_err();
    assert!(matches!(err, DataError::InvalidCap(c) if c == -1.0));
}
