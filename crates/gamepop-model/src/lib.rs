//! Tree-ensemble regression and per-prediction attribution.
//!
//! The rest of the workspace treats the model as two capabilities:
//!
//! - [`Regressor`] - numeric rows in, one score per row out
//! - [`Explain`] - one numeric row in, signed per-feature contributions out
//!
//! [`GradientBoostedRegressor`] implements both. It is trained once, never
//! mutated afterwards, and can score rows from many threads at once.
//!
//! # Modules
//!
//! - [`tree`] - flat-array regression trees and their structural checks
//! - [`booster`] - boosting loop and hyperparameters
//! - [`explain`] - decision-path attribution

pub use self::{
    booster::{BoosterParams, GradientBoostedRegressor},
    explain::{Explanation, FeatureContribution},
};

pub mod booster;
mod cart;
pub mod explain;
pub mod tree;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ModelError {
    #[display("cannot train on an empty training set")]
    EmptyTrainingSet,
    #[display("feature count mismatch: model expects {expected} features, row has {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },
    #[display("{rows} training rows but {targets} targets")]
    TargetLengthMismatch { rows: usize, targets: usize },
    #[display("training target at row {index} is not finite")]
    NonFiniteTarget { index: usize },
    #[display("invalid hyperparameter {name} = {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[display("malformed tree {tree}: node {node} {defect}")]
    MalformedTree {
        tree: usize,
        node: usize,
        defect: TreeDefect,
    },
}

/// Structural problems found in a deserialized tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum TreeDefect {
    #[display("is missing (tree has no nodes)")]
    Empty,
    #[display("has child {child} outside {parent} < child < {len}")]
    ChildOutOfOrder {
        parent: usize,
        child: usize,
        len: usize,
    },
    #[display("splits on feature {feature} of {n_features}")]
    FeatureOutOfRange { feature: usize, n_features: usize },
}

pub trait Regressor {
    fn n_features(&self) -> usize;

    fn predict_row(&self, row: &[f64]) -> Result<f64, ModelError>;

    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }
}

pub trait Explain {
    fn explain(&self, row: &[f64]) -> Result<Explanation, ModelError>;
}
