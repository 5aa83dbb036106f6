use std::path::PathBuf;

use gamepop_evaluator::{PopularityReport, attribution::DEFAULT_TOP_K};
use gamepop_features::GameRecord;
use serde::{Deserialize, Serialize};

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PredictArg {
    /// Model artifact produced by `train`
    #[arg(long)]
    model: PathBuf,
    /// One game object, or an array of them
    #[arg(long)]
    input: PathBuf,
    /// Number of contributing features to report
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PredictInput {
    One(Box<GameRecord>),
    Many(Vec<GameRecord>),
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum PredictOutput {
    One(PopularityReport),
    Many(Vec<PopularityReport>),
}

pub(crate) fn run(arg: &PredictArg) -> anyhow::Result<()> {
    let PredictArg {
        model,
        input,
        top_k,
        output,
    } = arg;

    let artifact = util::read_artifact_file(model)?;
    let input: PredictInput = util::read_json_file("prediction input", input)?;

    let reports = match input {
        PredictInput::One(record) => PredictOutput::One(artifact.evaluate_row(&record, *top_k)?),
        PredictInput::Many(records) => PredictOutput::Many(
            records
                .iter()
                .map(|record| artifact.evaluate_row(record, *top_k))
                .collect::<Result<_, _>>()?,
        ),
    };
    Output::save_json(&reports, output.clone())?;
    Ok(())
}
