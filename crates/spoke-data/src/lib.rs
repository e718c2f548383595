#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/spoke-analytics/spoke/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dataset;
pub mod error;
pub mod series;

pub use dataset::{Dataset, LatestEntry, PredictionCap, Split, TrainingRequest};
pub use error::{DataError, Result};
pub use series::{ForecastInput, ForecastRequest, Observation, RawObservation, Series};

use std::io::Read;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Read an entire payload from a stream.
///
/// The stream is consumed once, fully, before any parsing happens.
pub fn read_payload<R: Read>(mut reader: R) -> Result<String> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw)?;
    Ok(raw)
}
