//! Feature engineering for game catalog records.
//!
//! Turns raw [`GameRecord`]s into the fixed-width numeric rows a regression
//! model consumes. The work happens in two phases:
//!
//! 1. **Fit** ([`PipelineSpec::fit`]) - learn label vocabularies and label
//!    frequencies from the training catalog.
//! 2. **Transform** ([`FittedPipeline::transform`]) - apply the learned state
//!    to any record, including records with labels never seen in training.
//!
//! # Modules
//!
//! - [`record`] - raw catalog rows and typed column access
//! - [`date`] - release date decomposition
//! - [`multi_label`] - frequency-filtered multi-label indicators
//! - [`frequency`] - max-frequency encoding of label lists
//! - [`column`] - the closed set of per-step column transforms
//! - [`pipeline`] - ordered steps assembled into one preprocessing function
//! - [`matrix`] - named, row-major feature matrix
//!
//! # Example
//!
//! ```rust
//! use gamepop_features::{GameRecord, PipelineSpec};
//!
//! let record: GameRecord = serde_json::from_str(
//!     r#"{
//!         "price": 19.99,
//!         "release_date": "2021-03-04",
//!         "genres": ["Action", "Indie"],
//!         "categories": ["Single-player"],
//!         "developers": ["Studio A"],
//!         "publishers": ["Publisher B"]
//!     }"#,
//! )?;
//! let pipeline = PipelineSpec::default().fit(std::slice::from_ref(&record))?;
//! let row = pipeline.transform_one(&record)?;
//! assert_eq!(row.len(), pipeline.feature_names().len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use self::{
    matrix::FeatureMatrix,
    pipeline::{FittedPipeline, PipelineSpec},
    record::{GameRecord, RecordColumn},
};

use self::record::ColumnKind;

pub mod column;
pub mod date;
pub mod frequency;
pub mod matrix;
pub mod multi_label;
pub mod pipeline;
pub mod record;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PipelineError {
    #[display("cannot fit a pipeline on an empty training set")]
    EmptyTrainingSet,
    #[display("step '{step}' expects {expected} column, but '{column}' is not")]
    ColumnKindMismatch {
        step: String,
        column: &'static str,
        expected: ColumnKind,
    },
    #[display("step '{step}' expects {expected} input column(s), got {actual}")]
    StepArityMismatch {
        step: String,
        expected: usize,
        actual: usize,
    },
}
