//! The closed set of column transforms a pipeline step can apply.
//!
//! Every transform has an unfitted form ([`ColumnTransform`]) describing
//! what to learn and a fitted form ([`FittedColumnTransform`]) holding what
//! was learned. Fitting consumes training rows once; the fitted form is
//! never mutated afterwards, so it can be shared freely between concurrent
//! inference calls.
//!
//! | Transform | Input columns | Output columns |
//! |-----------|---------------|----------------|
//! | `log1p` | numeric, any number | one per input, `ln(1 + x)` |
//! | `date` | one text | `release_year`, `release_month`, `days_since_release` |
//! | `multi_label` | one label list | one indicator per fitted label |
//! | `frequency` | one label list | one, named after the input column |
//! | `passthrough` | numeric, any number | one per input, unchanged |

use serde::{Deserialize, Serialize};

use crate::{
    PipelineError,
    date::{DATE_FEATURE_NAMES, DateFeaturizer},
    frequency::{FittedFrequencyEncoder, FrequencyEncoder},
    multi_label::{FittedMultiLabelEncoder, MultiLabelEncoder},
    record::{ColumnKind, GameRecord, RecordColumn},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnTransform {
    Log1p,
    Date(DateFeaturizer),
    MultiLabel(MultiLabelEncoder),
    Frequency,
    Passthrough,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedColumnTransform {
    Log1p,
    Date(DateFeaturizer),
    MultiLabel(FittedMultiLabelEncoder),
    Frequency(FittedFrequencyEncoder),
    Passthrough,
}

impl ColumnTransform {
    pub fn fit(
        &self,
        step: &str,
        columns: &[RecordColumn],
        records: &[GameRecord],
    ) -> Result<FittedColumnTransform, PipelineError> {
        let fitted = match self {
            Self::Log1p => {
                check_all(step, columns, ColumnKind::Numeric)?;
                FittedColumnTransform::Log1p
            }
            Self::Passthrough => {
                check_all(step, columns, ColumnKind::Numeric)?;
                FittedColumnTransform::Passthrough
            }
            Self::Date(featurizer) => {
                single(step, columns, ColumnKind::Text)?;
                FittedColumnTransform::Date(featurizer.fit())
            }
            Self::MultiLabel(encoder) => {
                let column = single(step, columns, ColumnKind::Labels)?;
                FittedColumnTransform::MultiLabel(encoder.fit(&label_rows(column, records)))
            }
            Self::Frequency => {
                let column = single(step, columns, ColumnKind::Labels)?;
                let rows = label_rows(column, records);
                FittedColumnTransform::Frequency(FrequencyEncoder.fit(&rows, Some(column.name())))
            }
        };
        Ok(fitted)
    }
}

impl FittedColumnTransform {
    /// Output column names, without the step prefix.
    #[must_use]
    pub fn feature_names(&self, columns: &[RecordColumn]) -> Vec<String> {
        match self {
            Self::Log1p | Self::Passthrough => {
                columns.iter().map(|c| c.name().to_owned()).collect()
            }
            Self::Date(_) => DATE_FEATURE_NAMES.iter().map(|&n| n.to_owned()).collect(),
            Self::MultiLabel(encoder) => encoder.classes().to_vec(),
            Self::Frequency(encoder) => vec![encoder.column_name().to_owned()],
        }
    }

    /// Transforms `records` into a row-major block, one row per record.
    pub fn transform(
        &self,
        step: &str,
        columns: &[RecordColumn],
        records: &[GameRecord],
    ) -> Result<Vec<Vec<f64>>, PipelineError> {
        let block = match self {
            Self::Log1p => {
                check_all(step, columns, ColumnKind::Numeric)?;
                let mut block = numeric_rows(columns, records);
                for value in block.iter_mut().flatten() {
                    *value = value.ln_1p();
                }
                block
            }
            Self::Passthrough => {
                check_all(step, columns, ColumnKind::Numeric)?;
                numeric_rows(columns, records)
            }
            Self::Date(featurizer) => {
                let column = single(step, columns, ColumnKind::Text)?;
                featurizer
                    .transform(records.iter().map(|r| column.text(r).unwrap_or_default()))
                    .into_iter()
                    .map(Vec::from)
                    .collect()
            }
            Self::MultiLabel(encoder) => {
                let column = single(step, columns, ColumnKind::Labels)?;
                encoder.transform(&label_rows(column, records))
            }
            Self::Frequency(encoder) => {
                let column = single(step, columns, ColumnKind::Labels)?;
                encoder
                    .transform(&label_rows(column, records))
                    .into_iter()
                    .map(|v| vec![v])
                    .collect()
            }
        };
        Ok(block)
    }
}

fn check_kind(step: &str, column: RecordColumn, expected: ColumnKind) -> Result<(), PipelineError> {
    if column.kind() == expected {
        Ok(())
    } else {
        Err(PipelineError::ColumnKindMismatch {
            step: step.to_owned(),
            column: column.name(),
            expected,
        })
    }
}

fn check_all(
    step: &str,
    columns: &[RecordColumn],
    expected: ColumnKind,
) -> Result<(), PipelineError> {
    columns
        .iter()
        .try_for_each(|&column| check_kind(step, column, expected))
}

fn single(
    step: &str,
    columns: &[RecordColumn],
    expected: ColumnKind,
) -> Result<RecordColumn, PipelineError> {
    let [column] = columns else {
        return Err(PipelineError::StepArityMismatch {
            step: step.to_owned(),
            expected: 1,
            actual: columns.len(),
        });
    };
    check_kind(step, *column, expected)?;
    Ok(*column)
}

fn numeric_rows(columns: &[RecordColumn], records: &[GameRecord]) -> Vec<Vec<f64>> {
    records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|c| c.numeric(record).unwrap_or(f64::NAN))
                .collect()
        })
        .collect()
}

fn label_rows(column: RecordColumn, records: &[GameRecord]) -> Vec<&[String]> {
    records
        .iter()
        .map(|record| column.labels(record).unwrap_or_default())
        .collect()
}
