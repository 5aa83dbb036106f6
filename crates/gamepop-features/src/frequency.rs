//! Frequency encoding of multi-valued categorical columns.
//!
//! Each label is scored by how often it occurs in the training data,
//! `ln(1 + count)`, and a row is scored by its *most* frequent label. A game
//! with one famous publisher among several obscure ones is treated as being
//! as prominent as the famous one; averaging or summing would dilute or
//! inflate that signal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Output column name used when the source column has no name.
pub const FALLBACK_COLUMN_NAME: &str = "freq_encoded";

/// Unfitted frequency encoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyEncoder;

/// Frequency table learned by [`FrequencyEncoder::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedFrequencyEncoder {
    column_name: String,
    /// `label -> ln(1 + occurrences)`.
    frequencies: BTreeMap<String, f64>,
}

impl FrequencyEncoder {
    /// Learns `ln(1 + count)` for every label across all rows.
    ///
    /// `column_name` names the single output column; `None` falls back to
    /// [`FALLBACK_COLUMN_NAME`].
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn fit<R>(self, rows: &[R], column_name: Option<&str>) -> FittedFrequencyEncoder
    where
        R: AsRef<[String]>,
    {
        let mut counts = BTreeMap::<&str, usize>::new();
        for label in rows.iter().flat_map(|row| row.as_ref()) {
            *counts.entry(label.as_str()).or_default() += 1;
        }
        let frequencies = counts
            .into_iter()
            .map(|(label, count)| (label.to_owned(), (count as f64).ln_1p()))
            .collect::<BTreeMap<_, _>>();

        let column_name = column_name.unwrap_or(FALLBACK_COLUMN_NAME).to_owned();
        tracing::debug!(
            column = %column_name,
            labels = frequencies.len(),
            "fitted frequency encoder"
        );
        FittedFrequencyEncoder {
            column_name,
            frequencies,
        }
    }
}

impl FittedFrequencyEncoder {
    #[must_use]
    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    /// Learned frequency of `label`; 0.0 for labels never seen in training.
    #[must_use]
    pub fn frequency(&self, label: &str) -> f64 {
        self.frequencies.get(label).copied().unwrap_or(0.0)
    }

    /// Maximum learned frequency among `labels`; 0.0 for an empty row.
    ///
    /// ```
    /// use gamepop_features::frequency::FrequencyEncoder;
    ///
    /// let rows = vec![vec!["Valve".to_owned()], vec!["Valve".to_owned()]];
    /// let fitted = FrequencyEncoder.fit(&rows, Some("developers"));
    /// let row = ["Valve".to_owned(), "Unknown Studio".to_owned()];
    /// assert_eq!(fitted.transform_one(&row), 2f64.ln_1p());
    /// ```
    #[must_use]
    pub fn transform_one(&self, labels: &[String]) -> f64 {
        labels
            .iter()
            .map(|label| self.frequency(label))
            .max_by(f64::total_cmp)
            .unwrap_or(0.0)
    }

    #[must_use]
    pub fn transform<R>(&self, rows: &[R]) -> Vec<f64>
    where
        R: AsRef<[String]>,
    {
        rows.iter()
            .map(|row| self.transform_one(row.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repeat(label: &str, n: usize) -> Vec<Vec<String>> {
        (0..n).map(|_| vec![label.to_owned()]).collect()
    }

    #[test]
    fn test_row_takes_max_not_sum_or_mean() {
        let mut rows = repeat("A", 10);
        rows.extend(repeat("B", 1));
        let fitted = FrequencyEncoder.fit(&rows, Some("developers"));

        let row = ["A".to_owned(), "B".to_owned()];
        let encoded = fitted.transform_one(&row);
        assert_eq!(encoded, 10f64.ln_1p());
        assert_ne!(encoded, 1f64.ln_1p());
        assert_ne!(encoded, 10f64.ln_1p() + 1f64.ln_1p());
        assert_ne!(encoded, (10f64.ln_1p() + 1f64.ln_1p()) / 2.0);
    }

    #[test]
    fn test_counts_occurrences_across_rows() {
        let rows = vec![
            vec!["A".to_owned(), "B".to_owned()],
            vec!["A".to_owned()],
            vec!["A".to_owned(), "A".to_owned()],
        ];
        let fitted = FrequencyEncoder.fit(&rows, None);
        assert_eq!(fitted.frequency("A"), 4f64.ln_1p());
        assert_eq!(fitted.frequency("B"), 1f64.ln_1p());
    }

    #[test]
    fn test_unseen_label_is_zero() {
        let fitted = FrequencyEncoder.fit(&repeat("A", 3), Some("publishers"));
        assert_eq!(fitted.frequency("Nobody"), 0.0);
        assert_eq!(fitted.transform_one(&["Nobody".to_owned()]), 0.0);
        assert_eq!(fitted.transform_one(&[]), 0.0);
    }

    #[test]
    fn test_column_name_fallback() {
        let rows = repeat("A", 1);
        assert_eq!(FrequencyEncoder.fit(&rows, None).column_name(), FALLBACK_COLUMN_NAME);
        assert_eq!(
            FrequencyEncoder.fit(&rows, Some("developers")).column_name(),
            "developers"
        );
    }

    #[test]
    fn test_transform_is_idempotent() {
        let mut rows = repeat("A", 4);
        rows.push(vec!["B".to_owned(), "C".to_owned()]);
        let fitted = FrequencyEncoder.fit(&rows, None);
        assert_eq!(fitted.transform(&rows), fitted.transform(&rows));
    }
}
