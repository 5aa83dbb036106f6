//! Assembly of column transforms into one preprocessing function.
//!
//! A [`PipelineSpec`] is an ordered list of named steps, each applying one
//! [`ColumnTransform`] to one or more record columns. Fitting produces a
//! [`FittedPipeline`] whose output columns are the concatenation of every
//! step's output, in step order, each named `<step>__<feature>`.
//!
//! The default layout for game records is:
//!
//! | Step | Columns | Transform |
//! |------|---------|-----------|
//! | `log_price` | price | `ln(1 + x)` |
//! | `date` | release date | year, month, days since reference |
//! | `genres` | genres | frequency-filtered indicators |
//! | `categories` | categories | frequency-filtered indicators |
//! | `developers` | developers | max label frequency |
//! | `publishers` | publishers | max label frequency |
//! | `num` | discount, required age, DLC count, platforms | unchanged |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    PipelineError,
    column::{ColumnTransform, FittedColumnTransform},
    date::DateFeaturizer,
    matrix::FeatureMatrix,
    multi_label::MultiLabelEncoder,
    record::{GameRecord, RecordColumn},
};

/// Separator between step name and feature name in output column names.
pub const FEATURE_NAME_SEPARATOR: &str = "__";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStep {
    pub name: String,
    pub columns: Vec<RecordColumn>,
    pub transform: ColumnTransform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedStep {
    pub name: String,
    pub columns: Vec<RecordColumn>,
    pub transform: FittedColumnTransform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub steps: Vec<PipelineStep>,
}

/// Fitted preprocessing state, produced once at training time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPipeline {
    steps: Vec<FittedStep>,
}

impl PipelineStep {
    fn new(name: &str, columns: &[RecordColumn], transform: ColumnTransform) -> Self {
        Self {
            name: name.to_owned(),
            columns: columns.to_vec(),
            transform,
        }
    }
}

impl Default for PipelineSpec {
    fn default() -> Self {
        Self::for_games(
            DateFeaturizer::default().reference_date,
            MultiLabelEncoder::default().min_frequency,
        )
    }
}

impl PipelineSpec {
    /// The game-record layout with a custom reference date and label threshold.
    #[must_use]
    pub fn for_games(reference_date: NaiveDate, min_label_frequency: f64) -> Self {
        let labels = MultiLabelEncoder::new(min_label_frequency);
        Self {
            steps: vec![
                PipelineStep::new("log_price", &[RecordColumn::Price], ColumnTransform::Log1p),
                PipelineStep::new(
                    "date",
                    &[RecordColumn::ReleaseDate],
                    ColumnTransform::Date(DateFeaturizer::new(reference_date)),
                ),
                PipelineStep::new(
                    "genres",
                    &[RecordColumn::Genres],
                    ColumnTransform::MultiLabel(labels),
                ),
                PipelineStep::new(
                    "categories",
                    &[RecordColumn::Categories],
                    ColumnTransform::MultiLabel(labels),
                ),
                PipelineStep::new(
                    "developers",
                    &[RecordColumn::Developers],
                    ColumnTransform::Frequency,
                ),
                PipelineStep::new(
                    "publishers",
                    &[RecordColumn::Publishers],
                    ColumnTransform::Frequency,
                ),
                PipelineStep::new(
                    "num",
                    &RecordColumn::PASSTHROUGH,
                    ColumnTransform::Passthrough,
                ),
            ],
        }
    }

    /// Fits every step on `records`.
    pub fn fit(&self, records: &[GameRecord]) -> Result<FittedPipeline, PipelineError> {
        if records.is_empty() {
            return Err(PipelineError::EmptyTrainingSet);
        }
        let steps = self
            .steps
            .iter()
            .map(|step| {
                let transform = step.transform.fit(&step.name, &step.columns, records)?;
                Ok(FittedStep {
                    name: step.name.clone(),
                    columns: step.columns.clone(),
                    transform,
                })
            })
            .collect::<Result<Vec<_>, PipelineError>>()?;
        let pipeline = FittedPipeline { steps };
        tracing::info!(
            rows = records.len(),
            features = pipeline.n_features(),
            "fitted preprocessing pipeline"
        );
        Ok(pipeline)
    }
}

impl FittedPipeline {
    #[must_use]
    pub fn steps(&self) -> &[FittedStep] {
        &self.steps
    }

    /// Output column names, `<step>__<feature>`, in output order.
    #[must_use]
    pub fn feature_names(&self) -> Vec<String> {
        self.steps
            .iter()
            .flat_map(|step| {
                step.transform
                    .feature_names(&step.columns)
                    .into_iter()
                    .map(|name| format!("{}{FEATURE_NAME_SEPARATOR}{name}", step.name))
            })
            .collect()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.steps
            .iter()
            .map(|step| step.transform.feature_names(&step.columns).len())
            .sum()
    }

    /// Applies the fitted steps to `records` without refitting anything.
    pub fn transform(&self, records: &[GameRecord]) -> Result<FeatureMatrix, PipelineError> {
        let blocks = self
            .steps
            .iter()
            .map(|step| {
                let names = step
                    .transform
                    .feature_names(&step.columns)
                    .into_iter()
                    .map(|name| format!("{}{FEATURE_NAME_SEPARATOR}{name}", step.name))
                    .collect();
                let block = step.transform.transform(&step.name, &step.columns, records)?;
                Ok((names, block))
            })
            .collect::<Result<Vec<_>, PipelineError>>()?;
        Ok(FeatureMatrix::from_blocks(records.len(), blocks))
    }

    /// Transforms a single record into one feature row.
    pub fn transform_one(&self, record: &GameRecord) -> Result<Vec<f64>, PipelineError> {
        let matrix = self.transform(std::slice::from_ref(record))?;
        Ok(matrix.into_rows().into_iter().next().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::game;

    fn training_records() -> Vec<GameRecord> {
        vec![
            game("2020-01-01", &["Action", "Indie"], &["Valve"], &["Valve"]),
            game("2021-06-15", &["Indie"], &["Valve", "Tiny"], &["Big Pub"]),
            game("2019-11-30", &["Strategy"], &["Other Dev"], &["Big Pub"]),
            game("not a date", &["Action"], &["Valve"], &["Indie Pub"]),
        ]
    }

    #[test]
    fn test_default_layout_feature_names() {
        let pipeline = PipelineSpec::default().fit(&training_records()).unwrap();
        assert_eq!(
            pipeline.feature_names(),
            [
                "log_price__price",
                "date__release_year",
                "date__release_month",
                "date__days_since_release",
                "genres__Action",
                "genres__Indie",
                "genres__Strategy",
                "categories__Single-player",
                "developers__developers",
                "publishers__publishers",
                "num__discount",
                "num__required_age",
                "num__dlc_count",
                "num__windows",
                "num__mac",
                "num__linux",
            ]
        );
        assert_eq!(pipeline.n_features(), 16);
    }

    #[test]
    fn test_transform_row_values() {
        let records = training_records();
        let pipeline = PipelineSpec::default().fit(&records).unwrap();
        let row = pipeline.transform_one(&records[1]).unwrap();
        assert_eq!(row.len(), 16);
        assert_eq!(row[0], 9.99f64.ln_1p());
        assert_eq!(&row[1..3], &[2021.0, 6.0]);
        assert_eq!(&row[4..7], &[0.0, 1.0, 0.0]);
        // Valve appears three times among developers.
        assert_eq!(row[8], 3f64.ln_1p());
        assert_eq!(row[9], 2f64.ln_1p());
        assert_eq!(&row[10..], &[0.0, 0.0, 2.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unparseable_date_is_missing_not_error() {
        let records = training_records();
        let pipeline = PipelineSpec::default().fit(&records).unwrap();
        let row = pipeline.transform_one(&records[3]).unwrap();
        assert!(row[1..4].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_unseen_labels_keep_width() {
        let pipeline = PipelineSpec::default().fit(&training_records()).unwrap();
        let unseen = game("2022-02-02", &["Roguelike"], &["Nobody"], &["Nobody"]);
        let row = pipeline.transform_one(&unseen).unwrap();
        assert_eq!(row.len(), pipeline.n_features());
        assert_eq!(&row[4..7], &[0.0, 0.0, 0.0]);
        assert_eq!(row[8], 0.0);
        assert_eq!(row[9], 0.0);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let records = training_records();
        let pipeline = PipelineSpec::default().fit(&records).unwrap();
        let first = pipeline.transform(&records).unwrap();
        let second = pipeline.transform(&records).unwrap();
        assert_eq!(first.feature_names(), second.feature_names());
        assert_eq!(first.n_rows(), 4);
        for (a, b) in first.rows().iter().zip(second.rows()) {
            for (x, y) in a.iter().zip(b) {
                assert!(x == y || (x.is_nan() && y.is_nan()));
            }
        }
    }

    #[test]
    fn test_empty_training_set_is_rejected() {
        assert!(matches!(
            PipelineSpec::default().fit(&[]),
            Err(PipelineError::EmptyTrainingSet)
        ));
    }

    #[test]
    fn test_fitted_pipeline_roundtrips() {
        let pipeline = PipelineSpec::default().fit(&training_records()).unwrap();
        let json = serde_json::to_string(&pipeline).unwrap();
        let restored: FittedPipeline = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, pipeline);
        assert_eq!(restored.feature_names(), pipeline.feature_names());
    }
}
