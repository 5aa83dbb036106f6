//! Single-record inference: score, player estimate, bucket and attribution.

use gamepop_features::{FittedPipeline, GameRecord};
use gamepop_model::{Explain, Regressor};
use serde::{Deserialize, Serialize};

use crate::{
    EvaluateError,
    attribution::{Contributor, top_contributions},
    popularity::{PopularityCategory, QuantileThresholds},
    target::estimated_players,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub log_score: f64,
    pub estimated_players: u64,
}

/// Full answer for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularityReport {
    pub log_score: f64,
    pub estimated_popular_players: u64,
    pub popularity_category: PopularityCategory,
    pub top_contributors: Vec<Contributor>,
}

/// Transforms `record` with the fitted pipeline and scores it.
pub fn predict_row<M>(
    pipeline: &FittedPipeline,
    model: &M,
    record: &GameRecord,
) -> Result<Prediction, EvaluateError>
where
    M: Regressor + ?Sized,
{
    let row = pipeline.transform_one(record)?;
    let log_score = model.predict_row(&row)?;
    Ok(Prediction {
        log_score,
        estimated_players: estimated_players(log_score),
    })
}

/// Scores `record`, buckets the score and ranks the `top_k` contributors.
pub fn evaluate_row<M>(
    pipeline: &FittedPipeline,
    model: &M,
    thresholds: &QuantileThresholds,
    record: &GameRecord,
    top_k: usize,
) -> Result<PopularityReport, EvaluateError>
where
    M: Regressor + Explain + ?Sized,
{
    let row = pipeline.transform_one(record)?;
    let log_score = model.predict_row(&row)?;
    let explanation = model.explain(&row)?;
    let top_contributors = top_contributions(explanation.pairs(), top_k)
        .into_iter()
        .map(|(feature, contribution)| Contributor {
            feature: feature.to_owned(),
            contribution,
        })
        .collect();
    let report = PopularityReport {
        log_score,
        estimated_popular_players: estimated_players(log_score),
        popularity_category: thresholds.categorize(log_score),
        top_contributors,
    };
    tracing::debug!(
        log_score,
        category = %report.popularity_category,
        "evaluated record"
    );
    Ok(report)
}
