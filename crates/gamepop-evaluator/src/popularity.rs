//! Popularity buckets derived from the training score distribution.
//!
//! The 20th, 40th, 60th and 80th percentiles of training log-scores split the
//! score axis into five ordered buckets. Each threshold belongs to the lower
//! bucket: a score exactly at the 20th percentile is `Very Low`.

use gamepop_stats::percentiles::Percentiles;
use serde::{Deserialize, Serialize};

/// Percentile points the thresholds are taken at.
pub const QUANTILE_POINTS: [f64; 4] = [20.0, 40.0, 60.0, 80.0];

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    derive_more::Display,
    Serialize,
    Deserialize,
)]
pub enum PopularityCategory {
    #[display("Very Low")]
    #[serde(rename = "Very Low")]
    VeryLow,
    #[display("Low")]
    Low,
    #[display("Medium")]
    Medium,
    #[display("High")]
    High,
    #[display("Very High")]
    #[serde(rename = "Very High")]
    VeryHigh,
}

/// Upper bounds of the four lower buckets, keyed by percentile on disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantileThresholds {
    #[serde(rename = "20%")]
    pub q20: f64,
    #[serde(rename = "40%")]
    pub q40: f64,
    #[serde(rename = "60%")]
    pub q60: f64,
    #[serde(rename = "80%")]
    pub q80: f64,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ThresholdError {
    #[display("no finite scores to compute thresholds from")]
    NoScores,
    #[display("threshold {name} is not finite")]
    NotFinite { name: &'static str },
    #[display("thresholds must be non-decreasing, got {lower} > {upper}")]
    Decreasing { lower: f64, upper: f64 },
}

impl QuantileThresholds {
    pub fn new(q20: f64, q40: f64, q60: f64, q80: f64) -> Result<Self, ThresholdError> {
        let thresholds = Self { q20, q40, q60, q80 };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Linearly interpolated percentiles of `scores`, ignoring `NaN`.
    ///
    /// ```
    /// use gamepop_evaluator::popularity::QuantileThresholds;
    ///
    /// let scores = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    /// let t = QuantileThresholds::from_log_scores(&scores).unwrap();
    /// assert_eq!((t.q20, t.q80), (2.0, 5.0));
    /// ```
    pub fn from_log_scores(scores: &[f64]) -> Result<Self, ThresholdError> {
        let percentiles = Percentiles::new(scores, &QUANTILE_POINTS);
        let [q20, q40, q60, q80] = QUANTILE_POINTS.map(|p| percentiles.get(p).unwrap_or(f64::NAN));
        if q20.is_nan() {
            return Err(ThresholdError::NoScores);
        }
        Self::new(q20, q40, q60, q80)
    }

    pub fn validate(&self) -> Result<(), ThresholdError> {
        let named = [
            ("20%", self.q20),
            ("40%", self.q40),
            ("60%", self.q60),
            ("80%", self.q80),
        ];
        if let Some(&(name, _)) = named.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ThresholdError::NotFinite { name });
        }
        for pair in named.windows(2) {
            let (lower, upper) = (pair[0].1, pair[1].1);
            if lower > upper {
                return Err(ThresholdError::Decreasing { lower, upper });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn categorize(&self, log_score: f64) -> PopularityCategory {
        if log_score <= self.q20 {
            PopularityCategory::VeryLow
        } else if log_score <= self.q40 {
            PopularityCategory::Low
        } else if log_score <= self.q60 {
            PopularityCategory::Medium
        } else if log_score <= self.q80 {
            PopularityCategory::High
        } else {
            PopularityCategory::VeryHigh
        }
    }
}

/// Buckets `log_score` against `thresholds`.
///
/// ```
/// use gamepop_evaluator::popularity::{PopularityCategory, QuantileThresholds, categorize};
///
/// let t = QuantileThresholds::new(1.0, 2.0, 3.0, 4.0).unwrap();
/// assert_eq!(categorize(2.0, &t), PopularityCategory::Low);
/// assert_eq!(categorize(2.5, &t).to_string(), "Medium");
/// ```
#[must_use]
pub fn categorize(log_score: f64, thresholds: &QuantileThresholds) -> PopularityCategory {
    thresholds.categorize(log_score)
}
