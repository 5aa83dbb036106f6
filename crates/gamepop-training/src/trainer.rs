//! End-to-end training: split, fit, score, package.

use chrono::{NaiveDate, Utc};
use gamepop_evaluator::{ModelArtifact, QuantileThresholds};
use gamepop_features::{
    FittedPipeline, GameRecord, PipelineSpec,
    date::default_reference_date,
    multi_label::DEFAULT_MIN_FREQUENCY,
};
use gamepop_model::{BoosterParams, GradientBoostedRegressor, Regressor as _};

use crate::{TrainingError, dataset::Dataset, metrics::RegressionReport, split::train_test_split};

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Day zero for `days_since_release`.
    pub reference_date: NaiveDate,
    pub min_label_frequency: f64,
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            reference_date: default_reference_date(),
            min_label_frequency: DEFAULT_MIN_FREQUENCY,
            test_fraction: 0.2,
            seed: 123,
        }
    }
}

impl TrainingConfig {
    #[must_use]
    pub fn pipeline_spec(&self) -> PipelineSpec {
        PipelineSpec::for_games(self.reference_date, self.min_label_frequency)
    }
}

/// A fitted preprocessing pipeline and the model trained on its output.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedModel {
    pub pipeline: FittedPipeline,
    pub model: GradientBoostedRegressor,
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifact: ModelArtifact,
    pub train_rows: usize,
    /// Scores on the held-out rows.
    pub test: RegressionReport,
}

/// Fits `spec` on `records`, then trains the booster on the transformed rows.
pub fn fit_pipeline(
    records: &[GameRecord],
    targets: &[f64],
    spec: &PipelineSpec,
    params: &BoosterParams,
) -> Result<FittedModel, TrainingError> {
    let pipeline = spec.fit(records)?;
    let matrix = pipeline.transform(records)?;
    let model =
        GradientBoostedRegressor::fit(params, matrix.feature_names(), matrix.rows(), targets)?;
    Ok(FittedModel { pipeline, model })
}

/// Splits `dataset`, trains on the larger part and scores on the rest.
///
/// Popularity thresholds come from the training targets only.
pub fn train(
    dataset: &Dataset,
    config: &TrainingConfig,
    params: &BoosterParams,
) -> Result<TrainingOutcome, TrainingError> {
    if !(0.0..1.0).contains(&config.test_fraction) {
        return Err(TrainingError::InvalidTestFraction {
            value: config.test_fraction,
        });
    }
    if dataset.is_empty() {
        return Err(TrainingError::EmptyDataset);
    }
    let split = train_test_split(dataset.len(), config.test_fraction, config.seed);
    if split.train.is_empty() {
        return Err(TrainingError::NoTrainingRows {
            rows: dataset.len(),
        });
    }
    let train_set = dataset.select(&split.train);
    let test_set = dataset.select(&split.test);
    tracing::info!(
        train_rows = train_set.len(),
        test_rows = test_set.len(),
        seed = config.seed,
        "split dataset"
    );

    let thresholds = QuantileThresholds::from_log_scores(&train_set.targets)?;
    tracing::debug!(?thresholds, "computed popularity thresholds");

    let FittedModel { pipeline, model } = fit_pipeline(
        &train_set.records,
        &train_set.targets,
        &config.pipeline_spec(),
        params,
    )?;

    let test = score(&pipeline, &model, &test_set)?;
    if let Some(rmse) = test.rmse {
        tracing::info!(rmse, "held-out RMSE");
    } else {
        tracing::warn!("no held-out rows, skipping RMSE");
    }

    let artifact = ModelArtifact::new(pipeline, model, thresholds, Utc::now())?;
    Ok(TrainingOutcome {
        artifact,
        train_rows: train_set.len(),
        test,
    })
}

/// Scores a saved artifact on labeled data.
pub fn evaluate(artifact: &ModelArtifact, dataset: &Dataset) -> Result<RegressionReport, TrainingError> {
    let report = score(&artifact.pipeline, &artifact.model, dataset)?;
    tracing::info!(rows = report.rows, rmse = ?report.rmse, "evaluated artifact");
    Ok(report)
}

fn score(
    pipeline: &FittedPipeline,
    model: &GradientBoostedRegressor,
    dataset: &Dataset,
) -> Result<RegressionReport, TrainingError> {
    let matrix = pipeline.transform(&dataset.records)?;
    let predictions = model.predict(matrix.rows())?;
    Ok(RegressionReport::new(&predictions, &dataset.targets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{TargetScale, TrainingRecord};

    fn dataset(n: u32) -> Dataset {
        let genres = ["Action", "Indie", "Strategy", "Casual"];
        let studios = ["Valve", "Tiny", "Studio", "Solo", "Big"];
        let rows = (0..n)
            .map(|i| {
                let genre = genres[i as usize % genres.len()];
                let studio = studios[i as usize % studios.len()];
                let price = f64::from(i % 7) * 5.0;
                TrainingRecord {
                    game: GameRecord {
                        price,
                        release_date: format!("20{:02}-{:02}-15", 10 + i % 14, 1 + i % 12),
                        genres: vec![genre.to_owned()],
                        categories: vec!["Single-player".to_owned()],
                        developers: vec![studio.to_owned()],
                        publishers: vec![studio.to_owned()],
                        discount: 0.0,
                        required_age: 0,
                        dlc_count: i64::from(i % 3),
                        windows: true,
                        mac: i % 2 == 0,
                        linux: false,
                    },
                    target: price.ln_1p() + if genre == "Action" { 2.0 } else { 0.0 },
                }
            })
            .collect();
        Dataset::from_training_records(rows, TargetScale::Log)
    }

    fn params() -> BoosterParams {
        BoosterParams {
            n_estimators: 30,
            max_depth: 3,
            ..BoosterParams::default()
        }
    }

    #[test]
    fn test_train_produces_verified_artifact() {
        let data = dataset(40);
        let outcome = train(&data, &TrainingConfig::default(), &params()).unwrap();
        assert_eq!(outcome.train_rows, 32);
        assert_eq!(outcome.test.rows, 8);
        assert!(outcome.test.rmse.unwrap() < 1.0);
        outcome.artifact.verify().unwrap();
    }

    #[test]
    fn test_training_is_reproducible() {
        let data = dataset(30);
        let a = train(&data, &TrainingConfig::default(), &params()).unwrap();
        let b = train(&data, &TrainingConfig::default(), &params()).unwrap();
        assert_eq!(a.artifact.fingerprint, b.artifact.fingerprint);
        assert_eq!(a.artifact.model, b.artifact.model);
        assert_eq!(a.artifact.thresholds, b.artifact.thresholds);
    }

    #[test]
    fn test_thresholds_come_from_training_split() {
        let data = dataset(25);
        let config = TrainingConfig::default();
        let outcome = train(&data, &config, &params()).unwrap();
        let split = train_test_split(data.len(), config.test_fraction, config.seed);
        let expected =
            QuantileThresholds::from_log_scores(&data.select(&split.train).targets).unwrap();
        assert_eq!(outcome.artifact.thresholds, expected);
    }

    #[test]
    fn test_evaluate_matches_held_out_scoring() {
        let data = dataset(20);
        let outcome = train(&data, &TrainingConfig::default(), &params()).unwrap();
        let report = evaluate(&outcome.artifact, &data).unwrap();
        assert_eq!(report.rows, 20);
        assert!(report.rmse.is_some());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let data = dataset(5);
        let config = TrainingConfig {
            test_fraction: 1.0,
            ..TrainingConfig::default()
        };
        assert!(matches!(
            train(&data, &config, &params()),
            Err(TrainingError::InvalidTestFraction { .. })
        ));
        assert!(matches!(
            train(&Dataset::default(), &TrainingConfig::default(), &params()),
            Err(TrainingError::EmptyDataset)
        ));
    }

    #[test]
    fn test_fit_pipeline_aligns_model_with_pipeline() {
        let data = dataset(12);
        let fitted = fit_pipeline(
            &data.records,
            &data.targets,
            &TrainingConfig::default().pipeline_spec(),
            &params(),
        )
        .unwrap();
        assert_eq!(
            fitted.model.feature_names(),
            fitted.pipeline.feature_names().as_slice()
        );
    }
}
