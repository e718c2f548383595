//! Training job output.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Accuracy of one split's capped predictions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsExport {
    /// Mean absolute error
    pub mae: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Coefficient of determination
    pub r2: f64,
}

impl MetricsExport {
    /// Create a new metrics export.
    pub const fn new(mae: f64, rmse: f64, r2: f64) -> Self {
        Self { mae, rmse, r2 }
    }
}

/// Metrics for the train and validation splits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitMetrics {
    /// Training split
    pub train: MetricsExport,
    /// Validation split
    pub val: MetricsExport,
}

/// The training job's result document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    /// Train and validation metrics
    pub metrics: SplitMetrics,
    /// Per-entity capped predictions, in input order
    #[serde(serialize_with = "ordered_map")]
    pub latest: Vec<(String, f64)>,
    /// Identifier of the boosting engine
    pub engine: String,
    /// Opaque serialized model
    #[serde(rename = "boosterRaw")]
    pub booster_raw: String,
}

fn ordered_map<S: Serializer>(
    entries: &[(String, f64)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (key, value) in entries {
        map.serialize_entry(key, value)?;
    }
    map.end()
}
