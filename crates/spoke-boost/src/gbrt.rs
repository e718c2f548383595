//! Gradient-boosted regression trees
//!
//! Squared-error boosting: starting from the mean training label, each round
//! fits a [`RegressionTree`] to the gradients of the current predictions and
//! adds it scaled by the learning rate `eta`:
//!
//! F_m(x) = F_{m-1}(x) + eta * tree_m(x)
//!
//! Each round grows its tree on a random subset of rows (`subsample`) and
//! features (`colsample_bytree`), seeded for reproducibility. When the
//! validation split is non-empty, its MAE is tracked every round; training
//! stops once it has not improved for `early_stopping_rounds` rounds and the
//! ensemble is truncated to the best round.

use crate::tree::{RegressionTree, TreeParams};
use crate::{BoostError, BoostedRegressor, Regressor};
use ndarray::{Array1, ArrayView1};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use serde::{Deserialize, Serialize};
use spoke_data::Split;
use tracing::{debug, info, warn};

/// Identifier reported for models trained by [`GradientBoostedTrees`].
pub const ENGINE: &str = "spoke-gbrt";

/// Boosting hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostParams {
    /// Maximum depth of each tree (default: 6)
    pub max_depth: usize,

    /// Learning rate / shrinkage (default: 0.1)
    pub eta: f64,

    /// Fraction of rows sampled per tree (default: 0.8)
    pub subsample: f64,

    /// Fraction of features sampled per tree (default: 0.8)
    pub colsample_bytree: f64,

    /// L2 regularisation on leaf weights (default: 1.0)
    pub lambda: f64,

    /// Minimum gain required to split (default: 0.0)
    pub gamma: f64,

    /// Minimum hessian sum per child (default: 1.0)
    pub min_child_weight: f64,

    /// Maximum number of boosting rounds (default: 200)
    pub num_boost_round: usize,

    /// Rounds without validation improvement before stopping (default: 20)
    pub early_stopping_rounds: Option<usize>,

    /// Seed for row and feature sampling (default: 42)
    pub seed: u64,
}

impl Default for BoostParams {
    fn default() -> Self {
        Self {
            max_depth: 6,
            eta: 0.1,
            subsample: 0.8,
            colsample_bytree: 0.8,
            lambda: 1.0,
            gamma: 0.0,
            min_child_weight: 1.0,
            num_boost_round: 200,
            early_stopping_rounds: Some(20),
            seed: 42,
        }
    }
}

impl BoostParams {
    fn validate(&self) -> Result<(), BoostError> {
        let unit = |name: &str, v: f64| {
            if v > 0.0 && v <= 1.0 {
                Ok(())
            } else {
                Err(BoostError::InvalidParameter(format!(
                    "{name} must be in (0, 1], got {v}"
                )))
            }
        };
        unit("eta", self.eta)?;
        unit("subsample", self.subsample)?;
        unit("colsample_bytree", self.colsample_bytree)?;

        if self.lambda < 0.0 || self.gamma < 0.0 || self.min_child_weight < 0.0 {
            return Err(BoostError::InvalidParameter(
                "lambda, gamma and min_child_weight must be non-negative".to_string(),
            ));
        }
        if self.num_boost_round == 0 {
            return Err(BoostError::InvalidParameter(
                "num_boost_round must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    const fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            lambda: self.lambda,
            gamma: self.gamma,
            min_child_weight: self.min_child_weight,
        }
    }
}

/// Gradient-boosted regression tree trainer
#[derive(Debug, Default)]
pub struct GradientBoostedTrees {
    params: BoostParams,
}

impl GradientBoostedTrees {
    /// Create a trainer with the given parameters
    pub fn new(params: BoostParams) -> Result<Self, BoostError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Get the parameters
    pub const fn params(&self) -> &BoostParams {
        &self.params
    }
}

impl BoostedRegressor for GradientBoostedTrees {
    type Model = TrainedEnsemble;

    fn engine(&self) -> &str {
        ENGINE
    }

    fn train(&self, train: &Split, validation: &Split) -> Result<TrainedEnsemble, BoostError> {
        let n_rows = train.len();
        let n_features = train.n_features();
        if n_rows == 0 {
            return Err(BoostError::EmptyDataset("train".to_string()));
        }
        if validation.n_features() != n_features {
            return Err(BoostError::DimensionMismatch {
                expected: n_features,
                actual: validation.n_features(),
            });
        }

        let params = &self.params;
        let tree_params = params.tree_params();
        let early_stopping = params.early_stopping_rounds.filter(|_| !validation.is_empty());
        if validation.is_empty() {
            warn!("validation split is empty; early stopping disabled");
        }

        let base_score = train.labels.mean().unwrap_or(0.0);
        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut train_pred = Array1::from_elem(n_rows, base_score);
        let mut val_pred = Array1::from_elem(validation.len(), base_score);
        let hess = vec![1.0; n_rows];

        let row_count = sample_size(n_rows, params.subsample);
        let feature_count = sample_size(n_features, params.colsample_bytree);

        let mut trees = Vec::with_capacity(params.num_boost_round);
        let mut best: Option<(usize, f64)> = None;

        for round in 0..params.num_boost_round {
            let grad: Vec<f64> = (&train_pred - &train.labels).to_vec();
            let rows = sample(&mut rng, n_rows, row_count).into_vec();
            let features = if n_features == 0 {
                Vec::new()
            } else {
                sample(&mut rng, n_features, feature_count).into_vec()
            };

            let tree =
                RegressionTree::fit(&train.features, &grad, &hess, &rows, &features, &tree_params);

            for (pred, row) in train_pred.iter_mut().zip(train.features.rows()) {
                *pred += params.eta * tree.predict_row(row);
            }
            for (pred, row) in val_pred.iter_mut().zip(validation.features.rows()) {
                *pred += params.eta * tree.predict_row(row);
            }
            trees.push(tree);

            let Some(patience) = early_stopping else {
                continue;
            };
            let val_mae = (&val_pred - &validation.labels)
                .mapv(f64::abs)
                .mean()
                .unwrap_or(0.0);
            debug!(round, val_mae, "boosting round");

            match best {
                Some((best_round, best_mae)) if val_mae >= best_mae => {
                    if round - best_round >= patience {
                        break;
                    }
                }
                _ => best = Some((round, val_mae)),
            }
        }

        let rounds_run = trees.len();
        if let Some((best_round, _)) = best {
            trees.truncate(best_round + 1);
        }

        info!(
            rounds_run,
            trees_kept = trees.len(),
            best_val_mae = best.map(|(_, mae)| mae),
            "trained boosted ensemble"
        );

        Ok(TrainedEnsemble {
            base_score,
            eta: params.eta,
            n_features,
            trees,
        })
    }
}

/// Number of items to draw for a sampling fraction, at least one.
fn sample_size(total: usize, fraction: f64) -> usize {
    ((total as f64 * fraction).floor() as usize).clamp(1, total.max(1))
}

/// A trained ensemble of regression trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedEnsemble {
    base_score: f64,
    eta: f64,
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl TrainedEnsemble {
    /// Number of trees kept
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Initial prediction before any tree is applied
    pub const fn base_score(&self) -> f64 {
        self.base_score
    }
}

impl Regressor for TrainedEnsemble {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        self.base_score
            + self.eta
                * self
                    .trees
                    .iter()
                    .map(|tree| tree.predict_row(row))
                    .sum::<f64>()
    }

    fn to_raw(&self) -> Result<String, BoostError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::r2;
    use approx::assert_relative_eq;

    fn split(xs: &[f64], f: impl Fn(f64) -> f64) -> Split {
        let rows = xs.iter().map(|&x| vec![x]).collect();
        let labels = xs.iter().map(|&x| f(x)).collect();
        Split::from_rows("train", rows, labels, 1).unwrap()
    }

    fn empty_split(n_features: usize) -> Split {
        Split::from_rows("val", vec![], vec![], n_features).unwrap()
    }

    #[test]
    fn test_params_default() {
        let params = BoostParams::default();
        assert_eq!(params.max_depth, 6);
        assert_eq!(params.eta, 0.1);
        assert_eq!(params.num_boost_round, 200);
        assert_eq!(params.early_stopping_rounds, Some(20));
        assert_eq!(params.seed, 42);
    }

    #[test]
    fn test_invalid_params() {
        let params = BoostParams {
            subsample: 0.0,
            ..Default::default()
        };
        assert!(GradientBoostedTrees::new(params).is_err());

        let params = BoostParams {
            num_boost_round: 0,
            ..Default::default()
        };
        assert!(GradientBoostedTrees::new(params).is_err());
    }

    #[test]
    fn test_sample_size() {
        assert_eq!(sample_size(10, 0.8), 8);
        assert_eq!(sample_size(1, 0.8), 1);
        assert_eq!(sample_size(3, 1.0), 3);
        assert_eq!(sample_size(0, 0.8), 1);
    }

    #[test]
    fn test_learns_linear_relation() {
        let xs: Vec<f64> = (0..40).map(f64::from).collect();
        let val_xs: Vec<f64> = (0..39).map(|i| f64::from(i) + 0.5).collect();
        let train = split(&xs, |x| 3.0 * x + 2.0);
        let validation = split(&val_xs, |x| 3.0 * x + 2.0);

        let trainer = GradientBoostedTrees::default();
        let model = trainer.train(&train, &validation).unwrap();

        assert!(model.n_trees() >= 1);
        assert!(model.n_trees() <= 200);
        let predictions = model.predict(&train.features);
        assert!(r2(&train.labels, &predictions) > 0.9);
    }

    #[test]
    fn test_empty_validation_runs_all_rounds() {
        let xs: Vec<f64> = (0..10).map(f64::from).collect();
        let params = BoostParams {
            num_boost_round: 15,
            ..Default::default()
        };
        let model = GradientBoostedTrees::new(params)
            .unwrap()
            .train(&split(&xs, |x| x), &empty_split(1))
            .unwrap();

        assert_eq!(model.n_trees(), 15);
    }

    #[test]
    fn test_training_is_deterministic() {
        let xs: Vec<f64> = (0..30).map(f64::from).collect();
        let train = split(&xs, |x| (x / 3.0).sin() * 10.0);
        let validation = split(&[1.5, 7.5, 20.5], |x| (x / 3.0).sin() * 10.0);

        let trainer = GradientBoostedTrees::default();
        let first = trainer.train(&train, &validation).unwrap();
        let second = trainer.train(&train, &validation).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_constant_labels_predict_constant() {
        let xs: Vec<f64> = (0..8).map(f64::from).collect();
        let model = GradientBoostedTrees::default()
            .train(&split(&xs, |_| 7.0), &split(&[2.5], |_| 7.0))
            .unwrap();

        assert_relative_eq!(model.base_score(), 7.0);
        for row in model.predict(&split(&[100.0], |_| 0.0).features) {
            assert_relative_eq!(row, 7.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let train = split(&[1.0, 2.0], |x| x);
        let result = GradientBoostedTrees::default().train(&train, &empty_split(2));
        assert!(matches!(
            result,
            Err(BoostError::DimensionMismatch {
                expected: 1,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_raw_is_json_ensemble() {
        let xs: Vec<f64> = (0..6).map(f64::from).collect();
        let model = GradientBoostedTrees::default()
            .train(&split(&xs, |x| x * x), &empty_split(1))
            .unwrap();

        let raw = model.to_raw().unwrap();
        let restored: TrainedEnsemble = serde_json::from_str(&raw).unwrap();
        assert_eq!(restored.n_trees(), model.n_trees());
        assert_eq!(restored.n_features(), 1);
    }
}
