//! Feature matrix ingestion for the regression job.
//!
//! The payload carries pre-vectorized training and validation splits, the
//! latest feature vector per tracked entity and a prediction cap:
//!
//! ```text
//! { "Xtrain": [[..], ..], "ytrain": [..], "Xval": [[..], ..], "yval": [..],
//!   "latest": { entityId: [..] }, "targetCap": 500 }
//! ```
//!
//! Every feature vector must have the dimensionality of the first training
//! row. The validation split may be empty; the training split may not.

use crate::error::{DataError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Cap applied when the payload does not carry one.
pub const DEFAULT_TARGET_CAP: f64 = 500.0;

/// Regression job payload, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRequest {
    /// Training feature rows
    #[serde(rename = "Xtrain")]
    pub x_train: Vec<Vec<f64>>,

    /// Training labels
    #[serde(rename = "ytrain")]
    pub y_train: Vec<f64>,

    /// Validation feature rows
    #[serde(rename = "Xval")]
    pub x_val: Vec<Vec<f64>>,

    /// Validation labels
    #[serde(rename = "yval")]
    pub y_val: Vec<f64>,

    /// Latest feature vector per entity, in payload order
    #[serde(default)]
    pub latest: Option<serde_json::Map<String, serde_json::Value>>,

    /// Upper bound for every reported prediction
    #[serde(rename = "targetCap", default)]
    pub target_cap: Option<f64>,
}

impl TrainingRequest {
    /// Parse a payload.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Validate shapes, finiteness and the cap into a [`Dataset`].
    pub fn validate(self) -> Result<Dataset> {
        let n_features = self
            .x_train
            .first()
            .map(Vec::len)
            .ok_or_else(|| DataError::EmptyDataset("train".to_string()))?;

        let train = Split::from_rows("train", self.x_train, self.y_train, n_features)?;
        let validation = Split::from_rows("val", self.x_val, self.y_val, n_features)?;

        let latest = self
            .latest
            .unwrap_or_default()
            .into_iter()
            .map(|(entity_id, value)| {
                let features: Vec<f64> = serde_json::from_value(value)?;
                LatestEntry::new(entity_id, features, n_features)
            })
            .collect::<Result<Vec<_>>>()?;

        let cap = PredictionCap::new(self.target_cap.unwrap_or(DEFAULT_TARGET_CAP))?;

        debug!(
            train_rows = train.len(),
            val_rows = validation.len(),
            n_features,
            entities = latest.len(),
            "validated training payload"
        );

        Ok(Dataset {
            train,
            validation,
            latest,
            cap,
        })
    }
}

/// Labeled examples for one split.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    /// Feature matrix (rows are examples)
    pub features: Array2<f64>,
    /// Label per row
    pub labels: Array1<f64>,
}

impl Split {
    /// Build a split from row vectors, checking every row has `n_features` columns.
    pub fn from_rows(
        name: &str,
        rows: Vec<Vec<f64>>,
        labels: Vec<f64>,
        n_features: usize,
    ) -> Result<Self> {
        if rows.len() != labels.len() {
            return Err(DataError::LengthMismatch {
                context: name.to_string(),
                features: rows.len(),
                labels: labels.len(),
            });
        }

        let n_rows = rows.len();
        let mut flat = Vec::with_capacity(n_rows * n_features);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_features {
                return Err(DataError::ShapeMismatch {
                    context: format!("X{name} row {i}"),
                    expected: n_features,
                    actual: row.len(),
                });
            }
            flat.extend(row);
        }

        check_finite(&format!("X{name}"), &flat)?;
        check_finite(&format!("y{name}"), &labels)?;

        let features = Array2::from_shape_vec((n_rows, n_features), flat).map_err(|_| {
            DataError::ShapeMismatch {
                context: format!("X{name}"),
                expected: n_features,
                actual: 0,
            }
        })?;

        Ok(Self {
            features,
            labels: Array1::from_vec(labels),
        })
    }

    /// Number of examples.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the split has no examples.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Feature-vector dimensionality.
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }
}

/// The latest feature vector for one tracked entity.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestEntry {
    /// External entity identifier
    pub entity_id: String,
    /// Feature vector matching the training dimensionality
    pub features: Array1<f64>,
}

impl LatestEntry {
    /// Create an entry, checking its dimensionality and finiteness.
    pub fn new(entity_id: String, features: Vec<f64>, n_features: usize) -> Result<Self> {
        if features.len() != n_features {
            return Err(DataError::ShapeMismatch {
                context: format!("latest[{entity_id:?}]"),
                expected: n_features,
                actual: features.len(),
            });
        }
        check_finite(&format!("latest[{entity_id:?}]"), &features)?;
        Ok(Self {
            entity_id,
            features: Array1::from_vec(features),
        })
    }
}

/// Non-negative upper bound applied to every prediction.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct PredictionCap(f64);

impl PredictionCap {
    /// Create a cap, rejecting negative or non-finite bounds.
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(DataError::InvalidCap(value))
        }
    }

    /// The bound itself.
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl Default for PredictionCap {
    fn default() -> Self {
        Self(DEFAULT_TARGET_CAP)
    }
}

/// Validated input for the regression job.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Training split
    pub train: Split,
    /// Validation split, used for early stopping
    pub validation: Split,
    /// Latest feature vector per entity, in payload order
    pub latest: Vec<LatestEntry>,
    /// Prediction cap
    pub cap: PredictionCap,
}

impl Dataset {
    /// Feature-vector dimensionality shared by every split.
    pub fn n_features(&self) -> usize {
        self.train.n_features()
    }
}

fn check_finite(field: &str, values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(DataError::NonFinite {
            field: field.to_string(),
            index,
        }),
        None => Ok(()),
    }
}
