//! Labeled training data.

use gamepop_evaluator::target::log1p_target;
use gamepop_features::GameRecord;
use serde::{Deserialize, Serialize};

/// One catalog row with its popularity target, as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    #[serde(flatten)]
    pub game: GameRecord,
    pub target: f64,
}

/// How the `target` field of the training file is expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TargetScale {
    /// Already `ln(1 + players)`.
    #[default]
    Log,
    /// Raw player counts, converted with `ln(1 + x)` on load.
    RawPlayers,
}

/// Records and log-scale targets, index-aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub records: Vec<GameRecord>,
    pub targets: Vec<f64>,
}

impl Dataset {
    #[must_use]
    pub fn from_training_records(rows: Vec<TrainingRecord>, scale: TargetScale) -> Self {
        let (records, targets) = rows
            .into_iter()
            .map(|row| {
                let target = match scale {
                    TargetScale::Log => row.target,
                    TargetScale::RawPlayers => log1p_target(row.target),
                };
                (row.game, target)
            })
            .unzip();
        Self { records, targets }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The rows at `indices`, in that order.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            records: indices.iter().map(|&i| self.records[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
        }
    }
}
