//! Inference over a trained popularity model.
//!
//! Given a [`ModelArtifact`], a raw game record is transformed by the fitted
//! pipeline, scored by the booster, converted back to a player estimate,
//! bucketed into a [`PopularityCategory`], and explained by its strongest
//! feature contributions.
//!
//! # Modules
//!
//! - [`popularity`] - quantile thresholds and the five popularity buckets
//! - [`attribution`] - top-k ranking of signed contributions
//! - [`target`] - the `ln(1 + x)` target transform and its inverse
//! - [`predictor`] - single-record scoring and reporting
//! - [`artifact`] - the fingerprinted artifact tying everything together
//!
//! # Example
//!
//! ```rust,no_run
//! use gamepop_evaluator::{ModelArtifact, attribution::DEFAULT_TOP_K};
//! use gamepop_features::GameRecord;
//!
//! # fn run(artifact_json: &str, record: GameRecord) -> Result<(), Box<dyn std::error::Error>> {
//! let artifact = ModelArtifact::from_reader(artifact_json.as_bytes())?;
//! let report = artifact.evaluate_row(&record, DEFAULT_TOP_K)?;
//! println!("{} ({} players)", report.popularity_category, report.estimated_popular_players);
//! # Ok(())
//! # }
//! ```

pub use self::{
    artifact::ModelArtifact,
    popularity::{PopularityCategory, QuantileThresholds, ThresholdError, categorize},
    predictor::{PopularityReport, Prediction, evaluate_row, predict_row},
};

use gamepop_features::PipelineError;
use gamepop_model::ModelError;

pub mod artifact;
pub mod attribution;
pub mod popularity;
pub mod predictor;
pub mod target;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum EvaluateError {
    #[display("failed to transform record: {_0}")]
    Pipeline(PipelineError),
    #[display("failed to score record: {_0}")]
    Model(ModelError),
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ArtifactError {
    #[display("malformed model artifact: {_0}")]
    Json(serde_json::Error),
    #[display("artifact schema version {found} is not supported (expected {expected})")]
    #[from(ignore)]
    SchemaVersionMismatch { expected: u32, found: u32 },
    #[display("artifact fingerprint mismatch: stored {found}, computed {expected}")]
    #[from(ignore)]
    FingerprintMismatch { expected: String, found: String },
    #[display("model expects {model} features but the pipeline produces {pipeline}")]
    #[from(ignore)]
    FeatureLayoutMismatch { pipeline: usize, model: usize },
    #[display("invalid popularity thresholds: {_0}")]
    Thresholds(ThresholdError),
    #[display("invalid model: {_0}")]
    Model(ModelError),
}

#[cfg(test)]
pub(crate) mod tests {
    use gamepop_features::{FittedPipeline, GameRecord, PipelineSpec};
    use gamepop_model::{BoosterParams, GradientBoostedRegressor};

    fn record(
        price: f64,
        release_date: &str,
        genres: &[&str],
        developer: &str,
        publisher: &str,
    ) -> GameRecord {
        GameRecord {
            price,
            release_date: release_date.to_owned(),
            genres: genres.iter().map(|s| (*s).to_owned()).collect(),
            categories: vec!["Single-player".to_owned()],
            developers: vec![developer.to_owned()],
            publishers: vec![publisher.to_owned()],
            discount: 0.0,
            required_age: 0,
            dlc_count: 1,
            windows: true,
            mac: price > 10.0,
            linux: false,
        }
    }

    pub(crate) fn records() -> Vec<GameRecord> {
        vec![
            record(19.99, "2020-05-01", &["Action", "Indie"], "Valve", "Valve"),
            record(4.99, "2022-11-15", &["Indie"], "Tiny", "Tiny"),
            record(0.0, "2018-02-20", &["Strategy"], "Valve", "Big Pub"),
            record(29.99, "2023-08-08", &["Action", "Indie"], "Studio", "Big Pub"),
            record(9.99, "Mar 3, 2019", &["Indie", "RPG"], "Studio", "Valve"),
            record(1.99, "2024-12-24", &["Casual"], "Solo", "Solo"),
        ]
    }

    pub(crate) fn targets() -> Vec<f64> {
        vec![6.5, 2.0, 4.0, 5.5, 3.0, 1.0]
    }

    pub(crate) fn fitted() -> (FittedPipeline, GradientBoostedRegressor) {
        let records = records();
        let pipeline = PipelineSpec::default().fit(&records).unwrap();
        let matrix = pipeline.transform(&records).unwrap();
        let params = BoosterParams {
            n_estimators: 20,
            max_depth: 3,
            ..BoosterParams::default()
        };
        let model = GradientBoostedRegressor::fit(
            &params,
            matrix.feature_names(),
            matrix.rows(),
            &targets(),
        )
        .unwrap();
        (pipeline, model)
    }
}
