//! Regression error metrics.

use gamepop_stats::descriptive::DescriptiveStats;
use serde::{Deserialize, Serialize};

/// Root mean squared error; `None` when there is nothing to compare.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn rmse(predictions: &[f64], targets: &[f64]) -> Option<f64> {
    assert_eq!(predictions.len(), targets.len());
    if predictions.is_empty() {
        return None;
    }
    let sse = predictions
        .iter()
        .zip(targets)
        .map(|(p, y)| (p - y).powi(2))
        .sum::<f64>();
    Some((sse / predictions.len() as f64).sqrt())
}

/// Distribution of `prediction - target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidualSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl ResidualSummary {
    #[must_use]
    pub fn new(predictions: &[f64], targets: &[f64]) -> Option<Self> {
        let stats = DescriptiveStats::new(predictions.iter().zip(targets).map(|(p, y)| p - y))?;
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            median: stats.median,
            min: stats.min,
            max: stats.max,
        })
    }
}

/// Scores of a model on labeled data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionReport {
    pub rows: usize,
    pub rmse: Option<f64>,
    pub residuals: Option<ResidualSummary>,
}

impl RegressionReport {
    #[must_use]
    pub fn new(predictions: &[f64], targets: &[f64]) -> Self {
        Self {
            rows: predictions.len(),
            rmse: rmse(predictions, targets),
            residuals: ResidualSummary::new(predictions, targets),
        }
    }
}
