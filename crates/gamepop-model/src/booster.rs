//! Gradient-boosted regression on squared error.
//!
//! Training starts from the mean target and adds one tree per round, each fit
//! to the gradients (`prediction - target`) of the current ensemble with unit
//! hessians. Row subsampling is redrawn every round and column subsampling
//! every tree, both from a single seeded generator, so a given
//! `(data, params)` pair always yields the same model.

use rand::{Rng as _, SeedableRng as _, seq::index};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    ModelError, Regressor,
    cart::{TreeBuilder, TreeParams},
    tree::Tree,
};

/// Booster hyperparameters.
///
/// Deserialization accepts the `model__`-prefixed keys written by the
/// hyperparameter search (`model__max_depth`, ...), ignores unknown keys, and
/// fills missing keys with defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoosterParams {
    #[serde(alias = "model__n_estimators")]
    pub n_estimators: usize,
    #[serde(alias = "model__max_depth")]
    pub max_depth: usize,
    #[serde(alias = "model__learning_rate")]
    pub learning_rate: f64,
    #[serde(alias = "model__min_child_weight")]
    pub min_child_weight: f64,
    #[serde(alias = "model__reg_lambda")]
    pub reg_lambda: f64,
    #[serde(alias = "model__gamma")]
    pub gamma: f64,
    #[serde(alias = "model__subsample")]
    pub subsample: f64,
    #[serde(alias = "model__colsample_bytree")]
    pub colsample_bytree: f64,
    #[serde(alias = "model__random_state")]
    pub random_state: u64,
}

impl Default for BoosterParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 6,
            learning_rate: 0.3,
            min_child_weight: 1.0,
            reg_lambda: 1.0,
            gamma: 0.0,
            subsample: 1.0,
            colsample_bytree: 1.0,
            random_state: 234,
        }
    }
}

impl BoosterParams {
    pub fn validate(&self) -> Result<(), ModelError> {
        let checks = [
            ("learning_rate", self.learning_rate, self.learning_rate > 0.0),
            ("min_child_weight", self.min_child_weight, self.min_child_weight >= 0.0),
            ("reg_lambda", self.reg_lambda, self.reg_lambda >= 0.0),
            ("gamma", self.gamma, self.gamma >= 0.0),
            ("subsample", self.subsample, self.subsample > 0.0 && self.subsample <= 1.0),
            (
                "colsample_bytree",
                self.colsample_bytree,
                self.colsample_bytree > 0.0 && self.colsample_bytree <= 1.0,
            ),
        ];
        for (name, value, ok) in checks {
            if !ok {
                return Err(ModelError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }

    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_child_weight: self.min_child_weight,
            reg_lambda: self.reg_lambda,
            gamma: self.gamma,
            learning_rate: self.learning_rate,
        }
    }
}

/// A trained tree ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedRegressor {
    feature_names: Vec<String>,
    base_score: f64,
    trees: Vec<Tree>,
}

impl GradientBoostedRegressor {
    /// Trains on row-major `rows` whose columns are named by `feature_names`.
    #[expect(clippy::cast_precision_loss)]
    pub fn fit(
        params: &BoosterParams,
        feature_names: &[String],
        rows: &[Vec<f64>],
        targets: &[f64],
    ) -> Result<Self, ModelError> {
        params.validate()?;
        if rows.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if rows.len() != targets.len() {
            return Err(ModelError::TargetLengthMismatch {
                rows: rows.len(),
                targets: targets.len(),
            });
        }
        let n_features = feature_names.len();
        if let Some(row) = rows.iter().find(|row| row.len() != n_features) {
            return Err(ModelError::FeatureCountMismatch {
                expected: n_features,
                actual: row.len(),
            });
        }
        if let Some(index) = targets.iter().position(|y| !y.is_finite()) {
            return Err(ModelError::NonFiniteTarget { index });
        }

        let n = rows.len();
        let base_score = targets.iter().sum::<f64>() / n as f64;
        let mut predictions = vec![base_score; n];
        let hessians = vec![1.0; n];
        let tree_params = params.tree_params();
        let mut rng = Pcg32::seed_from_u64(params.random_state);
        let mut trees = Vec::with_capacity(params.n_estimators);

        for round in 0..params.n_estimators {
            let gradients = predictions
                .iter()
                .zip(targets)
                .map(|(p, y)| p - y)
                .collect::<Vec<_>>();
            let sample = sample_rows(&mut rng, n, params.subsample);
            let features = sample_features(&mut rng, n_features, params.colsample_bytree);

            let tree = TreeBuilder::new(rows, &gradients, &hessians, &features, tree_params)
                .build(&sample);
            for (prediction, row) in predictions.iter_mut().zip(rows) {
                *prediction += tree.predict(row);
            }
            tracing::debug!(
                round,
                leaves = tree.n_leaves(),
                train_rmse = rmse(&predictions, targets),
                "boosting round"
            );
            trees.push(tree);
        }

        tracing::info!(
            rows = n,
            features = n_features,
            trees = trees.len(),
            train_rmse = rmse(&predictions, targets),
            "trained gradient-boosted regressor"
        );
        Ok(Self {
            feature_names: feature_names.to_vec(),
            base_score,
            trees,
        })
    }

    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    #[must_use]
    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    #[must_use]
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Checks every tree's structure against the trained feature count.
    /// Deserialized models must pass this before they are used for scoring.
    pub fn validate(&self) -> Result<(), ModelError> {
        let n_features = self.feature_names.len();
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(n_features)
                .map_err(|(node, defect)| ModelError::MalformedTree {
                    tree: index,
                    node,
                    defect,
                })?;
        }
        Ok(())
    }

    pub(crate) fn check_width(&self, row: &[f64]) -> Result<(), ModelError> {
        if row.len() == self.feature_names.len() {
            Ok(())
        } else {
            Err(ModelError::FeatureCountMismatch {
                expected: self.feature_names.len(),
                actual: row.len(),
            })
        }
    }
}

impl Regressor for GradientBoostedRegressor {
    fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    fn predict_row(&self, row: &[f64]) -> Result<f64, ModelError> {
        self.check_width(row)?;
        Ok(self.base_score + self.trees.iter().map(|t| t.predict(row)).sum::<f64>())
    }
}

fn sample_rows(rng: &mut Pcg32, n: usize, fraction: f64) -> Vec<usize> {
    if fraction >= 1.0 {
        return (0..n).collect();
    }
    let sample = (0..n)
        .filter(|_| rng.random::<f64>() < fraction)
        .collect::<Vec<_>>();
    if sample.is_empty() {
        vec![rng.random_range(0..n)]
    } else {
        sample
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn sample_features(rng: &mut Pcg32, n_features: usize, fraction: f64) -> Vec<usize> {
    if fraction >= 1.0 || n_features == 0 {
        return (0..n_features).collect();
    }
    let amount = ((n_features as f64 * fraction).round() as usize).clamp(1, n_features);
    let mut features = index::sample(rng, n_features, amount).into_vec();
    features.sort_unstable();
    features
}

#[expect(clippy::cast_precision_loss)]
fn rmse(predictions: &[f64], targets: &[f64]) -> f64 {
    let sse = predictions
        .iter()
        .zip(targets)
        .map(|(p, y)| (p - y).powi(2))
        .sum::<f64>();
    (sse / predictions.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TreeDefect;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{i}")).collect()
    }

    fn step_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let rows = (0..20).map(|i| vec![f64::from(i), f64::from(i % 3)]).collect();
        let targets = (0..20).map(|i| if i < 10 { 1.0 } else { 5.0 }).collect();
        (rows, targets)
    }

    #[test]
    fn test_zero_rounds_predicts_mean() {
        let (rows, targets) = step_data();
        let params = BoosterParams {
            n_estimators: 0,
            ..BoosterParams::default()
        };
        let model = GradientBoostedRegressor::fit(&params, &names(2), &rows, &targets).unwrap();
        assert_eq!(model.predict_row(&[0.0, 0.0]).unwrap(), 3.0);
    }

    #[test]
    fn test_boosting_fits_step() {
        let (rows, targets) = step_data();
        let model =
            GradientBoostedRegressor::fit(&BoosterParams::default(), &names(2), &rows, &targets)
                .unwrap();
        let predictions = model.predict(&rows).unwrap();
        assert!(rmse(&predictions, &targets) < 0.05);
        assert!(model.predict_row(&[2.0, 2.0]).unwrap() < 1.1);
        assert!(model.predict_row(&[17.0, 2.0]).unwrap() > 4.9);
    }

    #[test]
    fn test_loaded_trees_are_validated() {
        let (rows, targets) = step_data();
        let model =
            GradientBoostedRegressor::fit(&BoosterParams::default(), &names(2), &rows, &targets)
                .unwrap();
        model.validate().unwrap();

        let mut json = serde_json::to_value(&model).unwrap();
        json["trees"][0]["nodes"][0]["split"]["left"] = 0.into();
        let looping: GradientBoostedRegressor = serde_json::from_value(json).unwrap();
        assert!(matches!(
            looping.validate(),
            Err(ModelError::MalformedTree {
                tree: 0,
                node: 0,
                defect: TreeDefect::ChildOutOfOrder { child: 0, .. },
            })
        ));
    }

    #[test]
    fn test_same_seed_same_model() {
        let (rows, targets) = step_data();
        let params = BoosterParams {
            n_estimators: 10,
            subsample: 0.7,
            colsample_bytree: 0.5,
            ..BoosterParams::default()
        };
        let a = GradientBoostedRegressor::fit(&params, &names(2), &rows, &targets).unwrap();
        let b = GradientBoostedRegressor::fit(&params, &names(2), &rows, &targets).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_row_width_is_checked() {
        let (rows, targets) = step_data();
        let model =
            GradientBoostedRegressor::fit(&BoosterParams::default(), &names(2), &rows, &targets)
                .unwrap();
        assert!(matches!(
            model.predict_row(&[1.0]),
            Err(ModelError::FeatureCountMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        let (rows, targets) = step_data();
        let bad = BoosterParams {
            subsample: 0.0,
            ..BoosterParams::default()
        };
        assert!(matches!(
            GradientBoostedRegressor::fit(&bad, &names(2), &rows, &targets),
            Err(ModelError::InvalidParameter {
                name: "subsample",
                ..
            })
        ));
        assert!(matches!(
            GradientBoostedRegressor::fit(&BoosterParams::default(), &names(2), &rows, &[1.0]),
            Err(ModelError::TargetLengthMismatch { .. })
        ));
        assert!(matches!(
            GradientBoostedRegressor::fit(&BoosterParams::default(), &names(2), &[], &[]),
            Err(ModelError::EmptyTrainingSet)
        ));
    }

    #[test]
    fn test_params_accept_prefixed_keys() {
        let json = r#"{
            "model__max_depth": 4,
            "model__learning_rate": 0.05,
            "model__n_estimators": 250,
            "model__unused_option": "ignored"
        }"#;
        let params: BoosterParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.max_depth, 4);
        assert_eq!(params.learning_rate, 0.05);
        assert_eq!(params.n_estimators, 250);
        assert_eq!(params.random_state, 234);
        assert_eq!(params.subsample, 1.0);
    }
}
