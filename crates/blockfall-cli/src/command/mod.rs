use std::path::PathBuf;

use blockfall_engine::GameConfig;
use clap::{Parser, Subcommand};

use crate::util::Output;

use self::{play::PlayArg, simulate::SimulateArg};

mod play;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play in the terminal (default)
    Play(#[clap(flatten)] PlayArg),
    /// Run a headless game with random input and report the outcome as JSON
    Simulate(#[clap(flatten)] SimulateArg),
    /// Print the default game configuration as JSON
    PrintConfig(#[clap(flatten)] PrintConfigArg),
}

#[derive(Debug, Clone, clap::Args)]
struct PrintConfigArg {
    /// Write to this file instead of stdout
    #[clap(long)]
    output: Option<PathBuf>,
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or_else(|| Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::PrintConfig(arg) => {
            Output::from_path(arg.output.as_deref())?.write_json(&GameConfig::default())?;
        }
    }
    Ok(())
}
