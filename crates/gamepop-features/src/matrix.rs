/// Row-major numeric feature matrix with named columns.
///
/// This is the only shape the regression model ever sees; column names and
/// order are fixed by the fitted pipeline that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    feature_names: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    /// Concatenates column blocks side by side.
    ///
    /// Each block is `(names, rows)` with `rows.len() == n_rows` and every row
    /// as wide as `names`.
    pub(crate) fn from_blocks<I>(n_rows: usize, blocks: I) -> Self
    where
        I: IntoIterator<Item = (Vec<String>, Vec<Vec<f64>>)>,
    {
        let mut feature_names = vec![];
        let mut rows = vec![vec![]; n_rows];
        for (names, block) in blocks {
            debug_assert_eq!(block.len(), n_rows);
            feature_names.extend(names);
            for (row, block_row) in rows.iter_mut().zip(block) {
                row.extend(block_row);
            }
        }
        Self {
            feature_names,
            rows,
        }
    }

    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }
}
