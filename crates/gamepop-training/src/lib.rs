//! Training of game popularity models.
//!
//! # How Training Works
//!
//! 1. **Load** - read labeled records ([`dataset`]); targets are log-scale
//!    player counts, or raw counts converted with `ln(1 + x)`
//! 2. **Split** - hold out a seeded fraction of rows ([`split`])
//! 3. **Thresholds** - take popularity percentiles of the training targets
//! 4. **Fit** - fit the preprocessing pipeline and train the booster on its
//!    output ([`trainer::fit_pipeline`])
//! 5. **Score** - RMSE and residuals on the held-out rows ([`metrics`])
//! 6. **Package** - bundle everything into a fingerprinted artifact
//!
//! # Example
//!
//! ```rust,no_run
//! use gamepop_model::BoosterParams;
//! use gamepop_training::{
//!     dataset::{Dataset, TargetScale, TrainingRecord},
//!     trainer::{TrainingConfig, train},
//! };
//!
//! # fn run(rows: Vec<TrainingRecord>) -> Result<(), gamepop_training::TrainingError> {
//! let dataset = Dataset::from_training_records(rows, TargetScale::Log);
//! let outcome = train(&dataset, &TrainingConfig::default(), &BoosterParams::default())?;
//! println!("held-out RMSE: {:?}", outcome.test.rmse);
//! # Ok(())
//! # }
//! ```

use gamepop_evaluator::{ArtifactError, ThresholdError};
use gamepop_features::PipelineError;
use gamepop_model::ModelError;

pub mod dataset;
pub mod metrics;
pub mod split;
pub mod trainer;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum TrainingError {
    #[display("no training records")]
    #[from(ignore)]
    EmptyDataset,
    #[display("test fraction must be in [0, 1), got {value}")]
    #[from(ignore)]
    InvalidTestFraction { value: f64 },
    #[display("{rows} records leave nothing to train on after the split")]
    #[from(ignore)]
    NoTrainingRows { rows: usize },
    #[display("preprocessing failed: {_0}")]
    Pipeline(PipelineError),
    #[display("model training failed: {_0}")]
    Model(ModelError),
    #[display("cannot compute popularity thresholds: {_0}")]
    Thresholds(ThresholdError),
    #[display("cannot package model artifact: {_0}")]
    Artifact(ArtifactError),
}
