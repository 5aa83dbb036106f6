use clap::{Parser, Subcommand};

use self::{evaluate::EvaluateArg, predict::PredictArg, train::TrainArg};

mod evaluate;
mod predict;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train a model and write its artifact
    Train(#[clap(flatten)] TrainArg),
    /// Predict popularity for one or more games
    Predict(#[clap(flatten)] PredictArg),
    /// Score a saved model on labeled data
    Evaluate(#[clap(flatten)] EvaluateArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Predict(arg) => predict::run(&arg)?,
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
    }
    Ok(())
}
