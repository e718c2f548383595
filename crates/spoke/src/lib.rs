#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/spoke-analytics/spoke/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod pipeline;

// Re-export main types from sub-crates
pub use spoke_boost as boost;
pub use spoke_data as data;
pub use spoke_forecast as forecast;
pub use spoke_output as output;

pub use error::{Error, Result};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
