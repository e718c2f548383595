#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/spoke-analytics/spoke/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod capper;
pub mod gbrt;
pub mod latest;
pub mod metrics;
pub mod tree;

// Re-export main types
pub use capper::OutputCapper;
pub use gbrt::{BoostParams, GradientBoostedTrees, TrainedEnsemble};
pub use latest::{EntityPrediction, LatestPredictor};
pub use metrics::{MetricSet, MetricsEngine};
pub use tree::RegressionTree;

use ndarray::{Array1, Array2, ArrayView1};
use spoke_data::Split;
use thiserror::Error;

/// Errors that can occur while training or applying a regressor
#[derive(Debug, Error)]
pub enum BoostError {
    /// No rows to train on
    #[error("Empty dataset: the {0} split has no rows")]
    EmptyDataset(String),

    /// Feature vector with the wrong dimensionality
    #[error("Dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch {
        /// Dimensionality the model was trained on
        expected: usize,
        /// Dimensionality that was supplied
        actual: usize,
    },

    /// Parallel arrays of different lengths
    #[error("Length mismatch: {expected} actual values but {actual} predictions")]
    LengthMismatch {
        /// Number of actual values
        expected: usize,
        /// Number of predictions
        actual: usize,
    },

    /// Invalid hyperparameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Model could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A trained model mapping a feature vector to a scalar.
pub trait Regressor {
    /// Dimensionality of the feature vectors the model accepts
    fn n_features(&self) -> usize;

    /// Predict a single feature vector.
    fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64;

    /// Predict every row of a feature matrix.
    fn predict(&self, features: &Array2<f64>) -> Array1<f64> {
        features
            .rows()
            .into_iter()
            .map(|row| self.predict_row(row))
            .collect()
    }

    /// Opaque serialized form of the model.
    fn to_raw(&self) -> Result<String, BoostError>;
}

/// A trainer producing a [`Regressor`] from labeled splits.
pub trait BoostedRegressor {
    /// The trained model
    type Model: Regressor;

    /// Identifier of the training engine, reported alongside the model blob
    fn engine(&self) -> &str;

    /// Train on `train`, using `validation` for early stopping.
    fn train(&self, train: &Split, validation: &Split) -> Result<Self::Model, BoostError>;
}
