//! Per-entity predictions on the latest feature vectors.

use crate::capper::OutputCapper;
use crate::{BoostError, Regressor};
use serde::{Deserialize, Serialize};
use spoke_data::LatestEntry;

/// A capped prediction for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityPrediction {
    /// External entity identifier
    pub entity_id: String,
    /// Capped prediction
    pub prediction: f64,
}

/// Applies a trained regressor to each entity's latest feature vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatestPredictor {
    capper: OutputCapper,
}

impl LatestPredictor {
    /// Create a predictor that caps with `capper`
    pub const fn new(capper: OutputCapper) -> Self {
        Self { capper }
    }

    /// Predict one capped value per entry, preserving entry order.
    ///
    /// Fails on the first entry whose dimensionality differs from the model's.
    pub fn predict<R: Regressor + ?Sized>(
        &self,
        model: &R,
        entries: &[LatestEntry],
    ) -> Result<Vec<EntityPrediction>, BoostError> {
        let expected = model.n_features();
        entries
            .iter()
            .map(|entry| {
                if entry.features.len() != expected {
                    return Err(BoostError::DimensionMismatch {
                        expected,
                        actual: entry.features.len(),
                    });
                }
                let raw = model.predict_row(entry.features.view());
                Ok(EntityPrediction {
                    entity_id: entry.entity_id.clone(),
                    prediction: self.capper.apply(raw),
                })
            })
            .collect()
    }
}
