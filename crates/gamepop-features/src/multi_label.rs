//! Frequency-filtered multi-label binarization.
//!
//! Multi-valued categorical columns (genres, store categories) follow a long
//! tail: a handful of labels cover most rows while hundreds appear once or
//! twice. One indicator column per label would make the feature matrix wide
//! and sparse, so labels are first filtered by their share of all label
//! occurrences in the training data, and rows left with no frequent label
//! are assigned the catch-all [`OTHER_LABEL`].
//!
//! # Fitting
//!
//! 1. Count every `(row, label)` occurrence across all rows. A label's
//!    relative frequency is its count divided by the total number of
//!    occurrences, *not* by the number of rows.
//! 2. Labels with relative frequency `>= min_frequency` form the allowed
//!    vocabulary.
//! 3. Each row keeps only its allowed labels, or becomes `["Other"]`.
//! 4. The sorted set of labels that survive filtering becomes the fixed
//!    output column set.
//!
//! # Transforming
//!
//! Rows are filtered with the fitted vocabulary and binarized against the
//! fitted column set. Labels outside the column set are dropped, so the
//! output width never changes after fitting.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Label substituted for rows whose labels were all filtered out.
pub const OTHER_LABEL: &str = "Other";

/// Default minimum share of label occurrences a label needs to be kept.
pub const DEFAULT_MIN_FREQUENCY: f64 = 0.01;

/// Unfitted encoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultiLabelEncoder {
    pub min_frequency: f64,
}

impl Default for MultiLabelEncoder {
    fn default() -> Self {
        Self {
            min_frequency: DEFAULT_MIN_FREQUENCY,
        }
    }
}

/// Vocabulary learned by [`MultiLabelEncoder::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedMultiLabelEncoder {
    /// Labels frequent enough to be kept.
    allowed: BTreeSet<String>,
    /// Output columns, sorted. May include [`OTHER_LABEL`].
    classes: Vec<String>,
}

impl MultiLabelEncoder {
    #[must_use]
    pub const fn new(min_frequency: f64) -> Self {
        Self { min_frequency }
    }

    /// Learns the allowed vocabulary and output columns from training rows.
    ///
    /// ```
    /// use gamepop_features::multi_label::MultiLabelEncoder;
    ///
    /// let rows = vec![
    ///     vec!["Action".to_owned(), "Indie".to_owned()],
    ///     vec!["Indie".to_owned()],
    ///     vec!["Rare".to_owned()],
    /// ];
    /// // "Rare" is 1 of 4 occurrences: below a 0.3 threshold.
    /// let fitted = MultiLabelEncoder::new(0.3).fit(&rows);
    /// assert_eq!(fitted.classes(), ["Indie", "Other"]);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn fit<R>(&self, rows: &[R]) -> FittedMultiLabelEncoder
    where
        R: AsRef<[String]>,
    {
        let mut counts = BTreeMap::<&str, usize>::new();
        let mut total = 0usize;
        for row in rows {
            for label in row.as_ref() {
                *counts.entry(label.as_str()).or_default() += 1;
                total += 1;
            }
        }

        let allowed = counts
            .iter()
            .filter(|&(_, &count)| count as f64 / total as f64 >= self.min_frequency)
            .map(|(label, _)| (*label).to_owned())
            .collect::<BTreeSet<_>>();

        let mut fitted = FittedMultiLabelEncoder {
            allowed,
            classes: vec![],
        };
        let classes = rows
            .iter()
            .flat_map(|row| fitted.filter_labels(row.as_ref()))
            .map(str::to_owned)
            .collect::<BTreeSet<_>>();
        fitted.classes = classes.into_iter().collect();

        tracing::debug!(
            distinct_labels = counts.len(),
            allowed_labels = fitted.allowed.len(),
            columns = fitted.classes.len(),
            "fitted multi-label encoder"
        );
        fitted
    }
}

impl FittedMultiLabelEncoder {
    /// Output column labels, sorted.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    #[must_use]
    pub fn is_allowed(&self, label: &str) -> bool {
        self.allowed.contains(label)
    }

    /// Keeps the allowed labels of `labels`, or returns `["Other"]` when none
    /// survive. Input order and duplicates are preserved.
    #[must_use]
    pub fn filter_labels<'a>(&self, labels: &'a [String]) -> Vec<&'a str> {
        let filtered = labels
            .iter()
            .map(String::as_str)
            .filter(|label| self.allowed.contains(*label))
            .collect::<Vec<_>>();
        if filtered.is_empty() {
            vec![OTHER_LABEL]
        } else {
            filtered
        }
    }

    /// Encodes one row as a 0/1 indicator per output column.
    #[must_use]
    pub fn transform_one(&self, labels: &[String]) -> Vec<f64> {
        let mut row = vec![0.0; self.classes.len()];
        for label in self.filter_labels(labels) {
            // Labels outside the fitted columns are dropped.
            if let Ok(idx) = self.classes.binary_search_by(|c| c.as_str().cmp(label)) {
                row[idx] = 1.0;
            }
        }
        row
    }

    /// Encodes every row; output rows follow input order.
    #[must_use]
    pub fn transform<R>(&self, rows: &[R]) -> Vec<Vec<f64>>
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

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|s| (*s).to_owned()).collect())
            .collect()
    }

    #[test]
    fn test_threshold_uses_occurrence_denominator() {
        // 10 rows; "Rare" appears in 1 row, "Common" in every row and each row
        // also carries 3 filler labels. By row count "Rare" is 10% but by
        // occurrence count it is 1/41 < 5%.
        let mut data = vec![];
        for i in 0..10 {
            let mut row = vec![
                "Common".to_owned(),
                format!("A{i}"),
                format!("B{i}"),
                format!("C{i}"),
            ];
            if i == 0 {
                row.push("Rare".to_owned());
            }
            data.push(row);
        }
        let fitted = MultiLabelEncoder::new(0.05).fit(&data);
        assert!(fitted.is_allowed("Common"));
        assert!(!fitted.is_allowed("Rare"));
        assert_eq!(fitted.classes(), ["Common"]);
    }

    #[test]
    fn test_allowed_labels_meet_threshold() {
        let data = rows(&[
            &["Action", "Indie"],
            &["Action"],
            &["Strategy", "Indie"],
            &["Casual"],
        ]);
        let min_frequency = 0.2;
        let fitted = MultiLabelEncoder::new(min_frequency).fit(&data);
        let total = 6.0;
        for label in ["Action", "Indie", "Strategy", "Casual"] {
            let count = data.iter().flatten().filter(|l| *l == label).count();
            #[expect(clippy::cast_precision_loss)]
            let frequency = count as f64 / total;
            assert_eq!(fitted.is_allowed(label), frequency >= min_frequency, "{label}");
        }
    }

    #[test]
    fn test_filtered_rows_never_empty() {
        let data = rows(&[&["Action"], &["Action"], &["Action"], &["Obscure"], &[]]);
        let fitted = MultiLabelEncoder::new(0.5).fit(&data);
        for row in &data {
            assert!(!fitted.filter_labels(row).is_empty());
        }
        assert_eq!(fitted.filter_labels(&data[3]), [OTHER_LABEL]);
        assert_eq!(fitted.classes(), ["Action", "Other"]);
    }

    #[test]
    fn test_transform_binarizes_against_fitted_columns() {
        let data = rows(&[&["Action", "Indie"], &["Indie"], &["Action"], &["RPG"]]);
        let fitted = MultiLabelEncoder::new(0.2).fit(&data);
        assert_eq!(fitted.classes(), ["Action", "Indie", "RPG"]);

        let out = fitted.transform(&rows(&[&["Indie", "Action", "Indie"], &["RPG"]]));
        assert_eq!(out, vec![vec![1.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]]);
    }

    #[test]
    fn test_unseen_labels_are_dropped() {
        let data = rows(&[&["Action"], &["Action", "Indie"], &["Indie"], &["Unpopular"]]);
        let fitted = MultiLabelEncoder::new(0.3).fit(&data);
        assert_eq!(fitted.classes(), ["Action", "Indie", "Other"]);

        // A row of only unseen labels takes the catch-all column.
        let out = fitted.transform_one(&rows(&[&["Brand New"]])[0]);
        assert_eq!(out, vec![0.0, 0.0, 1.0]);
        // Mixed rows keep their known labels only.
        let out = fitted.transform_one(&rows(&[&["Brand New", "Indie"]])[0]);
        assert_eq!(out, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_catch_all_without_column_is_dropped() {
        // Every training row keeps a frequent label, so "Other" never becomes
        // a column and unseen-only rows encode to all zeros.
        let data = rows(&[&["Action"], &["Action", "Indie"], &["Indie"]]);
        let fitted = MultiLabelEncoder::new(0.1).fit(&data);
        assert_eq!(fitted.classes(), ["Action", "Indie"]);
        let out = fitted.transform_one(&rows(&[&["Brand New"]])[0]);
        assert_eq!(out, vec![0.0, 0.0]);
    }

    #[test]
    fn test_transform_is_idempotent() {
        let data = rows(&[&["Action", "Indie"], &["Indie"], &["Racing"]]);
        let fitted = MultiLabelEncoder::default().fit(&data);
        let before = fitted.clone();
        let first = fitted.transform(&data);
        let second = fitted.transform(&data);
        assert_eq!(first, second);
        assert_eq!(fitted, before);
    }

    #[test]
    fn test_fitted_state_roundtrips() {
        let data = rows(&[&["Action", "Indie"], &["Rare"]]);
        let fitted = MultiLabelEncoder::new(0.3).fit(&data);
        let json = serde_json::to_string(&fitted).unwrap();
        let restored: FittedMultiLabelEncoder = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, fitted);
    }
}
