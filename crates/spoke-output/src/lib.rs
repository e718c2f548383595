#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/spoke-analytics/spoke/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod forecast;
pub mod training;

pub use export::{ExportError, ExportFormat, Exporter};
pub use forecast::{ForecastRecord, ForecastReport, NextMonthSummary};
pub use training::{MetricsExport, SplitMetrics, TrainingReport};
