use std::path::PathBuf;

use gamepop_training::{dataset::TargetScale, trainer};

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Model artifact produced by `train`
    #[arg(long)]
    model: PathBuf,
    /// Labeled data: a JSON array of games with a `target` field
    #[arg(long)]
    data: PathBuf,
    /// Targets are raw player counts rather than `ln(1 + players)`
    #[arg(long)]
    raw_target: bool,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let EvaluateArg {
        model,
        data,
        raw_target,
        output,
    } = arg;

    let artifact = util::read_artifact_file(model)?;
    let scale = if *raw_target {
        TargetScale::RawPlayers
    } else {
        TargetScale::Log
    };
    let dataset = util::read_dataset_file(data, scale)?;
    let report = trainer::evaluate(&artifact, &dataset)?;
    Output::save_json(&report, output.clone())?;
    Ok(())
}
