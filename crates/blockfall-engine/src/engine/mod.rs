//! Game rules and timing built on top of [`core`](crate::core).
//!
//! - [`Game`] - Owns the field and the active piece, runs line clears and round
//!   resets, and talks to its collaborators
//! - [`ActivePiece`] - Movement, SRS rotation with wall kicks, gravity, and lock
//!   delay of the falling piece
//! - [`AutoRepeat`] - Delayed auto-repeat of held horizontal keys
//! - [`LineClearSequence`] - Flash-then-compact animation of full rows
//! - [`GameConfig`] - Field size, spawn anchor, and timings
//! - [`ScoreKeeper`] - Default [`Scoring`]: points, levels, and statistics
//! - [`UniformSource`] / [`BagSource`] - Seeded [`SpawnSource`]s
//!
//! # Tick Flow
//!
//! Every call to [`Game::tick`] does exactly one of:
//!
//! 1. Nothing, if the frame is paused
//! 2. Advance the line-clear animation, compacting and spawning at its end
//! 3. Update the active piece: rotate, shift, soft drop, hard drop, gravity,
//!    lock check
//!
//! A lock writes the piece into the field and either starts a line clear or
//! spawns the next piece. A spawn that does not fit ends the round: the field
//! and score are reset and play continues.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use blockfall_engine::{BagSource, Game, GameConfig, InputFrame, PieceSeed, ScoreKeeper, ShapeSet};
//!
//! let seed: PieceSeed = "0123456789abcdef0123456789abcdef".parse().unwrap();
//! let mut game = Game::new(
//!     GameConfig::default(),
//!     ShapeSet::standard(),
//!     BagSource::with_seed(seed),
//!     ScoreKeeper::new(),
//!     (),
//! )
//! .unwrap();
//!
//! let shift_left = InputFrame { move_left: true, ..InputFrame::IDLE };
//! for _ in 0..60 {
//!     game.tick(Duration::from_millis(16), &shift_left);
//! }
//! let piece = game.active_piece().unwrap();
//! assert!(piece.absolute_cells().any(|cell| cell.x == 0));
//! ```

pub use self::{
    active_piece::*, auto_repeat::*, collaborators::*, config::*, game::*, line_clear::*,
    score_keeper::*, spawn_source::*,
};

mod active_piece;
mod auto_repeat;
mod collaborators;
mod config;
mod game;
mod line_clear;
mod score_keeper;
mod serde_millis;
mod spawn_source;
