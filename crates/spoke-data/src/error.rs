//! Error types for input ingestion.

use thiserror::Error;

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while reading and validating a job payload.
#[derive(Debug, Error)]
pub enum DataError {
    /// Invalid JSON, a missing required key, or a value of the wrong type
    #[error("Malformed input: {0}")]
    Json(#[from] serde_json::Error),

    /// Date string that is not a calendar date
    #[error("Invalid date in {field}: {value:?} (expected YYYY-MM-DD)")]
    InvalidDate {
        /// Field holding the date
        field: String,
        /// Offending value
        value: String,
    },

    /// NaN or infinite number in a numeric input
    #[error("Non-finite value in {field} at index {index}")]
    NonFinite {
        /// Field holding the value
        field: String,
        /// Position of the value within the field
        index: usize,
    },

    /// Feature vector with the wrong dimensionality
    #[error("Shape mismatch in {context}: expected {expected} features, got {actual}")]
    ShapeMismatch {
        /// Where the mismatch was found
        context: String,
        /// Dimensionality of the training matrix
        expected: usize,
        /// Dimensionality that was found
        actual: usize,
    },

    /// Feature matrix and label vector disagree on the number of rows
    #[error("Length mismatch in {context}: {features} feature rows but {labels} labels")]
    LengthMismatch {
        /// Split being validated
        context: String,
        /// Number of feature rows
        features: usize,
        /// Number of labels
        labels: usize,
    },

    /// Split without any rows where at least one is required
    #[error("Empty dataset: the {0} split has no rows")]
    EmptyDataset(String),

    /// Prediction cap that is negative or not finite
    #[error("Invalid prediction cap: {0} (must be finite and non-negative)")]
    InvalidCap(f64),

    /// Forecast horizon that is negative or not a whole number
    #[error("Invalid horizon: {0} weeks (must be a non-negative whole number)")]
    InvalidHorizon(f64),

    /// IO error while reading the payload
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
