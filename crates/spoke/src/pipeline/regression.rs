//! Training pipeline: capped predictions, accuracy metrics and latest
//! per-entity predictions.

use crate::Result;
use spoke_boost::{
    BoostedRegressor, LatestPredictor, MetricSet, MetricsEngine, OutputCapper, Regressor,
};
use spoke_data::{Dataset, Split, TrainingRequest};
use spoke_output::{MetricsExport, SplitMetrics, TrainingReport};
use tracing::info;

/// Parse, validate and run a training payload.
pub fn run_json<B: BoostedRegressor>(trainer: &B, raw: &str) -> Result<TrainingReport> {
    let dataset = TrainingRequest::from_json(raw)?.validate()?;
    run(trainer, &dataset)
}

/// Run the training pipeline on a validated dataset.
///
/// Train and validation predictions are capped before scoring, so the
/// metrics describe the values that are actually served.
pub fn run<B: BoostedRegressor>(trainer: &B, dataset: &Dataset) -> Result<TrainingReport> {
    let model = trainer.train(&dataset.train, &dataset.validation)?;
    let capper = OutputCapper::new(dataset.cap);

    let train = score(&model, &capper, &dataset.train)?;
    let val = score(&model, &capper, &dataset.validation)?;
    info!(
        train_mae = train.mae,
        train_r2 = train.r2,
        val_mae = val.mae,
        val_r2 = val.r2,
        "model scored"
    );

    let latest = LatestPredictor::new(capper)
        .predict(&model, &dataset.latest)?
        .into_iter()
        .map(|p| (p.entity_id, p.prediction))
        .collect();

    Ok(TrainingReport {
        metrics: SplitMetrics {
            train: to_export(train),
            val: to_export(val),
        },
        latest,
        engine: trainer.engine().to_string(),
        booster_raw: model.to_raw()?,
    })
}

fn score<R: Regressor>(model: &R, capper: &OutputCapper, split: &Split) -> Result<MetricSet> {
    let predicted = capper.apply_all(&model.predict(&split.features));
    Ok(MetricsEngine::new().evaluate(&split.labels, &predicted)?)
}

const fn to_export(metrics: MetricSet) -> MetricsExport {
    MetricsExport::new(metrics.mae, metrics.rmse, metrics.r2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::ArrayView1;
    use rstest::rstest;
    use spoke_boost::BoostError;

    /// Predicts `scale * x[0]`.
    struct ScaledModel {
        scale: f64,
        n_features: usize,
    }

    impl Regressor for ScaledModel {
        fn n_features(&self) -> usize {
            self.n_features
        }

        fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
            self.scale * row[0]
        }

        fn to_raw(&self) -> std::result::Result<String, BoostError> {
            Ok(format!("scale={}", self.scale))
        }
    }

    struct ScaledTrainer {
        scale: f64,
    }

    impl BoostedRegressor for ScaledTrainer {
        type Model = ScaledModel;

        fn engine(&self) -> &str {
            "stub"
        }

        fn train(
            &self,
            train: &Split,
            _validation: &Split,
        ) -> std::result::Result<ScaledModel, BoostError> {
            Ok(ScaledModel {
                scale: self.scale,
                n_features: train.n_features(),
            })
        }
    }

    #[test]
    fn test_identity_model_scores_perfectly() {
        let raw = r#"{
            "Xtrain": [[1.0], [2.0], [3.0]], "ytrain": [1.0, 2.0, 3.0],
            "Xval": [[4.0]], "yval": [4.0],
            "latest": {"b": [5.0], "a": [6.0]}
        }"#;
        let report = run_json(&ScaledTrainer { scale: 1.0 }, raw).unwrap();

        assert_relative_eq!(report.metrics.train.mae, 0.0);
        assert_relative_eq!(report.metrics.train.r2, 1.0);
        // Single validation label has no variance
        assert_relative_eq!(report.metrics.val.r2, 0.0);
        assert_eq!(
            report.latest,
            vec![("b".to_string(), 5.0), ("a".to_string(), 6.0)]
        );
        assert_eq!(report.engine, "stub");
        assert_eq!(report.booster_raw, "scale=1");
    }

    #[test]
    fn test_metrics_use_capped_predictions() {
        // Raw predictions 200 and 400 are capped to 100
        let raw = r#"{
            "Xtrain": [[2.0], [4.0]], "ytrain": [100.0, 100.0],
            "Xval": [], "yval": [],
            "latest": {"x": [-3.0]},
            "targetCap": 100
        }"#;
        let report = run_json(&ScaledTrainer { scale: 100.0 }, raw).unwrap();

        assert_relative_eq!(report.metrics.train.mae, 0.0);
        assert_relative_eq!(report.metrics.train.rmse, 0.0);
        assert_eq!(report.metrics.val, MetricsExport::default());
        assert_eq!(report.latest, vec![("x".to_string(), 0.0)]);
    }

    #[rstest]
    #[case::latest_dimension_mismatch(
        r#"{"Xtrain": [[1.0, 2.0]], "ytrain": [1.0], "Xval": [], "yval": [], "latest": {"x": [1.0]}}"#
    )]
    #[case::validation_dimension_mismatch(
        r#"{"Xtrain": [[1.0, 2.0]], "ytrain": [1.0], "Xval": [[1.0]], "yval": [1.0]}"#
    )]
    #[case::missing_required_key(r#"{"Xtrain": [[1.0]], "ytrain": [1.0]}"#)]
    #[case::label_count_mismatch(r#"{"Xtrain": [[1.0], [2.0]], "ytrain": [1.0], "Xval": [], "yval": []}"#)]
    #[case::negative_cap(
        r#"{"Xtrain": [[1.0]], "ytrain": [1.0], "Xval": [], "yval": [], "targetCap": -5}"#
    )]
    #[case::blank_payload("")]
    fn test_invalid_payload_is_fatal(#[case] raw: &str) {
        let result = run_json(&ScaledTrainer { scale: 1.0 }, raw);
        assert!(matches!(result, Err(crate::Error::Data(_))));
    }
}
