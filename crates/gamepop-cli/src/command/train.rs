use std::path::PathBuf;

use chrono::NaiveDate;
use gamepop_features::{date::default_reference_date, multi_label::DEFAULT_MIN_FREQUENCY};
use gamepop_training::{
    dataset::TargetScale,
    trainer::{self, TrainingConfig},
};

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Labeled training data: a JSON array of games with a `target` field
    #[arg(long)]
    data: PathBuf,
    /// Booster hyperparameters (JSON, `model__` prefixes accepted)
    #[arg(long)]
    params: Option<PathBuf>,
    /// Output file path for the model artifact
    #[arg(long)]
    output: Option<PathBuf>,
    /// Targets are raw player counts rather than `ln(1 + players)`
    #[arg(long)]
    raw_target: bool,
    /// Fraction of rows held out for scoring
    #[arg(long, default_value_t = 0.2)]
    test_fraction: f64,
    /// Seed for the train/test split
    #[arg(long, default_value_t = 123)]
    seed: u64,
    /// Minimum share of label occurrences for a genre or category column
    #[arg(long, default_value_t = DEFAULT_MIN_FREQUENCY)]
    min_label_frequency: f64,
    /// Day zero for `days_since_release` [default: 2025-03-31]
    #[arg(long)]
    reference_date: Option<NaiveDate>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        data,
        params,
        output,
        raw_target,
        test_fraction,
        seed,
        min_label_frequency,
        reference_date,
    } = arg;

    let scale = if *raw_target {
        TargetScale::RawPlayers
    } else {
        TargetScale::Log
    };
    let dataset = util::read_dataset_file(data, scale)?;
    let params = util::read_params_file(params.as_deref())?;
    tracing::info!(rows = dataset.len(), ?params, "loaded training inputs");

    let config = TrainingConfig {
        reference_date: reference_date.unwrap_or_else(default_reference_date),
        min_label_frequency: *min_label_frequency,
        test_fraction: *test_fraction,
        seed: *seed,
    };
    let outcome = trainer::train(&dataset, &config, &params)?;
    Output::save_json(&outcome.artifact, output.clone())?;

    let artifact = &outcome.artifact;
    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = &output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Fingerprint: {}", artifact.fingerprint);
    eprintln!("  Trained at: {}", artifact.trained_at);
    eprintln!("  Features: {}", artifact.model.feature_names().len());
    eprintln!("  Trees: {}", artifact.model.trees().len());
    eprintln!("  Train rows: {}", outcome.train_rows);
    match outcome.test.rmse {
        Some(rmse) => eprintln!("  RMSE on the test set: {rmse:.4}"),
        None => eprintln!("  RMSE on the test set: n/a (no held-out rows)"),
    }

    Ok(())
}
