use std::path::PathBuf;

use blockfall_engine::PieceSeed;
use rand::Rng as _;

use self::app::PlayApp;
use crate::{randomizer::RandomizerKind, tui::Runtime, util};

mod app;
mod hooks;
mod input;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Game configuration JSON file (missing keys use the defaults)
    #[clap(long)]
    config: Option<PathBuf>,
    /// Piece seed, 32 hex digits (random if omitted)
    #[clap(long)]
    seed: Option<PieceSeed>,
    /// Piece randomizer
    #[clap(long, value_enum, default_value_t)]
    randomizer: RandomizerKind,
    /// Game updates per second
    #[clap(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=1000))]
    fps: u32,
    /// Ring the terminal bell on line clears and top-outs
    #[clap(long)]
    bell: bool,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self {
            config: None,
            seed: None,
            randomizer: RandomizerKind::default(),
            fps: 60,
            bell: false,
        }
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        config,
        seed,
        randomizer,
        fps,
        bell,
    } = arg;

    let config = util::load_config(config.as_deref())?;
    let seed = seed.unwrap_or_else(|| rand::rng().random());

    let mut app = PlayApp::new(config, *randomizer, seed, *fps, *bell)?;
    Runtime::new().run(&mut app)?;

    eprintln!("Seed: {seed}");
    eprintln!("Best score: {}", app.best_score());
    Ok(())
}
