//! The persisted model artifact.
//!
//! One JSON document holds everything inference needs: the fitted
//! preprocessing pipeline, the trained booster and the popularity
//! thresholds. A BLAKE3 fingerprint over the schema version, the assembled
//! feature names and the serialized pipeline, model and thresholds ties those
//! parts together. Loading recomputes it and refuses the artifact on any
//! mismatch, then checks the tree structure before any row is scored.

use std::io::{Read, Write};

use chrono::{DateTime, Utc};
use gamepop_features::{FittedPipeline, GameRecord};
use gamepop_model::GradientBoostedRegressor;
use serde::{Deserialize, Serialize};

use crate::{
    ArtifactError, EvaluateError,
    popularity::{PopularityCategory, QuantileThresholds},
    predictor::{self, Prediction, PopularityReport},
};

/// Bumped whenever the artifact layout or feature semantics change.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub schema_version: u32,
    pub fingerprint: String,
    pub trained_at: DateTime<Utc>,
    pub pipeline: FittedPipeline,
    pub model: GradientBoostedRegressor,
    pub thresholds: QuantileThresholds,
}

impl ModelArtifact {
    pub fn new(
        pipeline: FittedPipeline,
        model: GradientBoostedRegressor,
        thresholds: QuantileThresholds,
        trained_at: DateTime<Utc>,
    ) -> Result<Self, ArtifactError> {
        let artifact = Self {
            schema_version: SCHEMA_VERSION,
            fingerprint: fingerprint(SCHEMA_VERSION, &pipeline, &model, &thresholds)?,
            trained_at,
            pipeline,
            model,
            thresholds,
        };
        artifact.verify()?;
        Ok(artifact)
    }

    /// Checks the schema version, the fingerprint, the model's feature
    /// layout and tree structure, and the thresholds.
    pub fn verify(&self) -> Result<(), ArtifactError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(ArtifactError::SchemaVersionMismatch {
                expected: SCHEMA_VERSION,
                found: self.schema_version,
            });
        }
        let expected = fingerprint(
            self.schema_version,
            &self.pipeline,
            &self.model,
            &self.thresholds,
        )?;
        if self.fingerprint != expected {
            return Err(ArtifactError::FingerprintMismatch {
                expected,
                found: self.fingerprint.clone(),
            });
        }
        let pipeline_features = self.pipeline.feature_names();
        if pipeline_features != self.model.feature_names() {
            return Err(ArtifactError::FeatureLayoutMismatch {
                pipeline: pipeline_features.len(),
                model: self.model.feature_names().len(),
            });
        }
        self.model.validate()?;
        self.thresholds.validate()?;
        Ok(())
    }

    /// Reads and verifies an artifact.
    pub fn from_reader<R>(reader: R) -> Result<Self, ArtifactError>
    where
        R: Read,
    {
        let artifact: Self = serde_json::from_reader(reader)?;
        artifact.verify()?;
        tracing::info!(
            fingerprint = %artifact.fingerprint,
            trained_at = %artifact.trained_at,
            features = artifact.model.feature_names().len(),
            "loaded model artifact"
        );
        Ok(artifact)
    }

    pub fn to_writer<W>(&self, writer: W) -> Result<(), ArtifactError>
    where
        W: Write,
    {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn predict_row(&self, record: &GameRecord) -> Result<Prediction, EvaluateError> {
        predictor::predict_row(&self.pipeline, &self.model, record)
    }

    #[must_use]
    pub fn categorize(&self, log_score: f64) -> PopularityCategory {
        self.thresholds.categorize(log_score)
    }

    pub fn evaluate_row(
        &self,
        record: &GameRecord,
        top_k: usize,
    ) -> Result<PopularityReport, EvaluateError> {
        predictor::evaluate_row(&self.pipeline, &self.model, &self.thresholds, record, top_k)
    }
}

/// Hex BLAKE3 digest of the schema version, the feature names and the
/// compact JSON of the pipeline, model and thresholds.
///
/// Floats are written with shortest round-trip formatting and parsed back
/// exactly, so a reloaded artifact reproduces the digest bit for bit.
pub fn fingerprint(
    schema_version: u32,
    pipeline: &FittedPipeline,
    model: &GradientBoostedRegressor,
    thresholds: &QuantileThresholds,
) -> Result<String, ArtifactError> {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&schema_version.to_le_bytes());
    for name in pipeline.feature_names() {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }
    for part in [
        serde_json::to_vec(pipeline)?,
        serde_json::to_vec(model)?,
        serde_json::to_vec(thresholds)?,
    ] {
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(&part);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use gamepop_features::PipelineSpec;
    use gamepop_model::{BoosterParams, ModelError};

    use super::*;
    use crate::tests::{fitted, records};

    fn artifact() -> ModelArtifact {
        let (pipeline, model) = fitted();
        let thresholds = QuantileThresholds::new(1.0, 2.0, 3.0, 4.0).unwrap();
        ModelArtifact::new(pipeline, model, thresholds, DateTime::UNIX_EPOCH).unwrap()
    }

    #[test]
    fn test_roundtrip_verifies() {
        let artifact = artifact();
        let mut buf = vec![];
        artifact.to_writer(&mut buf).unwrap();
        let restored = ModelArtifact::from_reader(buf.as_slice()).unwrap();
        assert_eq!(restored, artifact);

        let record = &records()[0];
        let before = artifact.predict_row(record).unwrap();
        let after = restored.predict_row(record).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_roundtrip_keeps_many_distinct_frequencies() {
        // Developer `D{k}` credited on k games gives 60 distinct ln(1 + k)
        // entries in the frequency table.
        let base = records();
        let mut games = vec![];
        let mut targets = vec![];
        for k in 1..=60_u32 {
            for _ in 0..k {
                let mut game = base[k as usize % base.len()].clone();
                game.developers = vec![format!("D{k}")];
                games.push(game);
                targets.push(f64::from(k % 7) / 3.0);
            }
        }
        let pipeline = PipelineSpec::default().fit(&games).unwrap();
        let matrix = pipeline.transform(&games).unwrap();
        let params = BoosterParams {
            n_estimators: 5,
            ..BoosterParams::default()
        };
        let model =
            GradientBoostedRegressor::fit(&params, matrix.feature_names(), matrix.rows(), &targets)
                .unwrap();
        let thresholds = QuantileThresholds::from_log_scores(&targets).unwrap();
        let artifact =
            ModelArtifact::new(pipeline, model, thresholds, DateTime::UNIX_EPOCH).unwrap();

        let mut buf = vec![];
        artifact.to_writer(&mut buf).unwrap();
        let restored = ModelArtifact::from_reader(buf.as_slice()).unwrap();
        assert_eq!(restored, artifact);
        for game in &games {
            assert_eq!(
                restored.predict_row(game).unwrap(),
                artifact.predict_row(game).unwrap()
            );
        }
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let artifact = artifact();
        let digest = |version| {
            fingerprint(version, &artifact.pipeline, &artifact.model, &artifact.thresholds).unwrap()
        };
        assert_eq!(digest(SCHEMA_VERSION), artifact.fingerprint);
        assert_ne!(digest(SCHEMA_VERSION), digest(SCHEMA_VERSION + 1));
    }

    #[test]
    fn test_tampered_model_is_rejected() {
        let mut json = serde_json::to_value(artifact()).unwrap();
        json["model"]["base_score"] = 100.0.into();
        let err = ModelArtifact::from_reader(json.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, ArtifactError::FingerprintMismatch { .. }));
    }

    #[test]
    fn test_corrupt_tree_is_rejected_before_scoring() {
        let mut artifact = artifact();
        let mut json = serde_json::to_value(&artifact.model).unwrap();
        let root = &mut json["trees"][0]["nodes"][0]["split"];
        assert!(root.is_object(), "first tree should split at the root");
        root["left"] = 999.into();
        root["right"] = 999.into();
        artifact.model = serde_json::from_value(json).unwrap();
        // Re-sign so only the structural check can catch the damage.
        artifact.fingerprint = fingerprint(
            SCHEMA_VERSION,
            &artifact.pipeline,
            &artifact.model,
            &artifact.thresholds,
        )
        .unwrap();

        let mut buf = vec![];
        artifact.to_writer(&mut buf).unwrap();
        let err = ModelArtifact::from_reader(buf.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::Model(ModelError::MalformedTree { tree: 0, node: 0, .. })
        ));
    }

    #[test]
    fn test_tampered_pipeline_is_rejected() {
        let mut json = serde_json::to_value(artifact()).unwrap();
        json["pipeline"]["steps"][0]["name"] = "price_log".into();
        let err = ModelArtifact::from_reader(json.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, ArtifactError::FingerprintMismatch { .. }));
    }

    #[test]
    fn test_wrong_schema_version_is_rejected() {
        let mut json = serde_json::to_value(artifact()).unwrap();
        json["schema_version"] = (SCHEMA_VERSION + 1).into();
        let err = ModelArtifact::from_reader(json.to_string().as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::SchemaVersionMismatch { found, .. } if found == SCHEMA_VERSION + 1
        ));
    }

    #[test]
    fn test_model_from_other_layout_is_rejected() {
        let (pipeline, _) = fitted();
        // A pipeline fit with a stricter label threshold has fewer columns.
        let narrow = PipelineSpec::for_games(
            gamepop_features::date::default_reference_date(),
            0.4,
        )
        .fit(&records())
        .unwrap();
        let matrix = narrow.transform(&records()).unwrap();
        let targets = vec![1.0; matrix.n_rows()];
        let model = GradientBoostedRegressor::fit(
            &BoosterParams::default(),
            matrix.feature_names(),
            matrix.rows(),
            &targets,
        )
        .unwrap();
        let thresholds = QuantileThresholds::new(1.0, 2.0, 3.0, 4.0).unwrap();
        let err = ModelArtifact::new(pipeline, model, thresholds, DateTime::UNIX_EPOCH)
            .unwrap_err();
        assert!(matches!(err, ArtifactError::FeatureLayoutMismatch { .. }));
    }
}
