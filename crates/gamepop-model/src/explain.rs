//! Per-prediction feature attribution for tree ensembles.
//!
//! Follows each tree's decision path and credits the change in node value at
//! every split to the split feature. The bias is the base score plus every
//! root value; bias plus all contributions equals the prediction.

use serde::{Deserialize, Serialize};

use crate::{Explain, GradientBoostedRegressor, ModelError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub feature: String,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub prediction: f64,
    pub bias: f64,
    /// One entry per model feature, in feature-column order.
    pub contributions: Vec<FeatureContribution>,
}

impl Explanation {
    /// `(feature, contribution)` pairs in feature-column order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, f64)> {
        self.contributions
            .iter()
            .map(|c| (c.feature.as_str(), c.contribution))
    }
}

impl Explain for GradientBoostedRegressor {
    fn explain(&self, row: &[f64]) -> Result<Explanation, ModelError> {
        self.check_width(row)?;
        let mut contributions = vec![0.0; row.len()];
        let mut bias = self.base_score();
        let mut prediction = self.base_score();

        for tree in self.trees() {
            let mut path = tree.decision_path(row);
            let Some(mut parent) = path.next() else {
                continue;
            };
            bias += parent.value;
            for child in path {
                if let Some(split) = &parent.split {
                    contributions[split.feature] += child.value - parent.value;
                }
                parent = child;
            }
            prediction += parent.value;
        }

        let contributions = self
            .feature_names()
            .iter()
            .zip(contributions)
            .map(|(feature, contribution)| FeatureContribution {
                feature: feature.clone(),
                contribution,
            })
            .collect();
        Ok(Explanation {
            prediction,
            bias,
            contributions,
        })
    }
}
