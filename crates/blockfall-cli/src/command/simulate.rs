use std::{path::PathBuf, time::Duration};

use blockfall_engine::{
    Game, GameConfig, GameEvent, InputFrame, PieceSeed, Presentation, ScoreKeeper, ShapeSet,
};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::{
    randomizer::{Randomizer, RandomizerKind},
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Game configuration JSON file (missing keys use the defaults)
    #[clap(long)]
    config: Option<PathBuf>,
    /// Seed for pieces and inputs, 32 hex digits (random if omitted)
    #[clap(long)]
    seed: Option<PieceSeed>,
    /// Piece randomizer
    #[clap(long, value_enum, default_value_t)]
    randomizer: RandomizerKind,
    /// Number of ticks to simulate
    #[clap(long, default_value_t = 100_000)]
    ticks: u64,
    /// Length of one tick in milliseconds
    #[clap(long, default_value_t = 16)]
    tick_ms: u64,
    /// Write the summary to this file instead of stdout
    #[clap(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        config,
        seed,
        randomizer,
        ticks,
        tick_ms,
        output,
    } = arg;

    let config = util::load_config(config.as_deref())?;
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let tick = Duration::from_millis(*tick_ms);
    eprintln!("Simulating {ticks} ticks of {tick_ms}ms with seed {seed}...");

    let mut game = Game::new(
        config.clone(),
        ShapeSet::standard(),
        Randomizer::new(*randomizer, seed),
        ScoreKeeper::new(),
        EventCounts::default(),
    )?;
    let mut player = RandomPlayer::new(seed);

    let report_every = (*ticks / 10).max(1);
    for i in 1..=*ticks {
        let input = player.next_frame();
        game.tick(tick, &input);
        if i % report_every == 0 {
            eprintln!(
                "  tick {i}/{ticks}: round {}, score {}, lines {}",
                game.rounds_finished() + 1,
                game.scoring().score(),
                game.scoring().total_cleared_lines(),
            );
        }
    }

    let summary = SimulationSummary::new(&game, seed, *randomizer, config, *ticks, tick);
    let mut output = Output::from_path(output.as_deref())?;
    output.write_json(&summary)?;
    eprintln!("Summary written to {}", output.display_path());
    Ok(())
}

/// Random button masher: holds a horizontal direction for a while and sprinkles
/// in rotations and drops.
#[derive(Debug)]
struct RandomPlayer {
    rng: Pcg32,
    held: (bool, bool),
}

impl RandomPlayer {
    const CHANGE_DIRECTION: f64 = 0.05;
    const ROTATE: f64 = 0.05;
    const SOFT_DROP: f64 = 0.1;
    const HARD_DROP: f64 = 0.01;

    fn new(seed: PieceSeed) -> Self {
        // Decorrelate from the piece stream, which uses the seed as is.
        let mut bytes = seed.to_bytes();
        bytes.reverse();
        Self {
            rng: Pcg32::from_seed(bytes),
            held: (false, false),
        }
    }

    fn next_frame(&mut self) -> InputFrame {
        if self.rng.random_bool(Self::CHANGE_DIRECTION) {
            self.held = match self.rng.random_range(0..3) {
                0 => (true, false),
                1 => (false, true),
                _ => (false, false),
            };
        }
        let rotate = self.rng.random_bool(Self::ROTATE);
        let clockwise = self.rng.random_bool(0.5);
        InputFrame {
            rotate_left: rotate && !clockwise,
            rotate_right: rotate && clockwise,
            move_left: self.held.0,
            move_right: self.held.1,
            soft_drop: self.rng.random_bool(Self::SOFT_DROP),
            hard_drop: self.rng.random_bool(Self::HARD_DROP),
            paused: false,
        }
    }
}

/// Counts game events by type.
#[derive(Debug, Default, Clone, Serialize)]
struct EventCounts {
    spawned: u64,
    moved: u64,
    rotated: u64,
    soft_dropped: u64,
    hard_dropped: u64,
    locked: u64,
    line_clears: u64,
    game_overs: u64,
}

impl Presentation for EventCounts {
    fn on_event(&mut self, event: &GameEvent) {
        let counter = match event {
            GameEvent::Spawned { .. } => &mut self.spawned,
            GameEvent::Moved { .. } => &mut self.moved,
            GameEvent::Rotated { .. } => &mut self.rotated,
            GameEvent::SoftDropped => &mut self.soft_dropped,
            GameEvent::HardDropped { .. } => &mut self.hard_dropped,
            GameEvent::Locked { .. } => &mut self.locked,
            GameEvent::LinesCleared { .. } => &mut self.line_clears,
            GameEvent::GameOver => &mut self.game_overs,
        };
        *counter += 1;
    }
}

#[derive(Debug, Serialize)]
struct SimulationSummary {
    seed: PieceSeed,
    randomizer: RandomizerKind,
    config: GameConfig,
    ticks: u64,
    simulated_ms: u64,
    rounds_finished: usize,
    best_score: u32,
    current_round: ScoreKeeper,
    events: EventCounts,
}

impl SimulationSummary {
    fn new(
        game: &Game<Randomizer, ScoreKeeper, EventCounts>,
        seed: PieceSeed,
        randomizer: RandomizerKind,
        config: GameConfig,
        ticks: u64,
        tick: Duration,
    ) -> Self {
        let simulated = tick.saturating_mul(u32::try_from(ticks).unwrap_or(u32::MAX));
        Self {
            seed,
            randomizer,
            config,
            ticks,
            simulated_ms: u64::try_from(simulated.as_millis()).unwrap_or(u64::MAX),
            rounds_finished: game.rounds_finished(),
            best_score: game.scoring().best_score(),
            current_round: game.scoring().clone(),
            events: game.presentation().clone(),
        }
    }
}
