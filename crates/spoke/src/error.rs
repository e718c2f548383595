//! Top-level error type for the batch pipelines.

use spoke_boost::BoostError;
use spoke_data::DataError;
use spoke_forecast::ForecastError;
use spoke_output::ExportError;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Any failure of a batch run. Every variant is fatal to the run.
#[derive(Debug, Error)]
pub enum Error {
    /// The input payload was malformed or failed validation
    #[error(transparent)]
    Data(#[from] DataError),

    /// The forecast model could not be fit or applied
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    /// The boosted model could not be trained or applied
    #[error(transparent)]
    Boost(#[from] BoostError),

    /// The result document could not be written
    #[error(transparent)]
    Export(#[from] ExportError),
}
