//! Output range capping.
//!
//! Every reported prediction is clamped into `[0, cap]` before it is scored
//! or served, so accuracy metrics describe what downstream consumers see.

use ndarray::Array1;
use spoke_data::PredictionCap;

/// Clamps predictions into `[0, cap]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OutputCapper {
    cap: PredictionCap,
}

impl OutputCapper {
    /// Create a capper for the given cap
    pub const fn new(cap: PredictionCap) -> Self {
        Self { cap }
    }

    /// The configured cap
    pub const fn cap(&self) -> PredictionCap {
        self.cap
    }

    /// Cap a single value: `max(0, min(cap, value))`
    pub fn apply(&self, value: f64) -> f64 {
        value.min(self.cap.value()).max(0.0)
    }

    /// Cap every value of an array
    pub fn apply_all(&self, values: &Array1<f64>) -> Array1<f64> {
        values.mapv(|v| self.apply(v))
    }
}
