//! Interfaces between the simulation core and the systems around it.
//!
//! The core never reaches for global state: the spawn source, the scoring
//! system, and the presentation layer are handed to [`Game`](super::Game) when
//! it is constructed, and the input is passed to every tick.

use serde::{Deserialize, Serialize};

use crate::core::{Block, Coord, Field, PieceKind};

/// Supplies the kind of each new piece.
pub trait SpawnSource {
    /// Draws the next piece kind.
    fn next_kind(&mut self) -> PieceKind;
}

impl<S> SpawnSource for &mut S
where
    S: SpawnSource + ?Sized,
{
    fn next_kind(&mut self) -> PieceKind {
        (**self).next_kind()
    }
}

/// Score and level bookkeeping.
pub trait Scoring {
    /// Called once per completed line clear with `count` in `1..=4`.
    fn on_lines_cleared(&mut self, count: usize);

    /// Adds bonus points (hard-drop distance).
    fn add_score(&mut self, points: u32);

    /// Multiplier applied to the base gravity step delay at spawn time.
    fn fall_speed_multiplier(&self) -> f64;

    /// Called when a round ends.
    fn reset_all(&mut self);

    /// Called every time a piece locks.
    fn on_piece_locked(&mut self) {}
}

/// Observable outcome of a tick.
///
/// Delivered to [`Presentation::on_event`] in the order they happen; sound
/// effects and UI hooks key off these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum GameEvent {
    /// A new piece entered the field.
    Spawned { kind: PieceKind },
    /// A horizontal move succeeded.
    Moved { offset: Coord },
    /// A rotation succeeded, possibly after a wall kick.
    Rotated { kick: Coord },
    /// An explicit soft-drop input moved the piece down.
    SoftDropped,
    /// A hard drop travelled `distance` rows.
    HardDropped { distance: u32 },
    /// The active piece was written into the field.
    Locked { kind: PieceKind },
    /// Full rows were removed.
    LinesCleared { rows: Vec<usize> },
    /// A spawn failed; the field and score were reset.
    GameOver,
}

/// Rendering, animation, and audio hooks.
///
/// Every method has an empty default, so a headless game can use `()`.
pub trait Presentation {
    /// A field cell changed.
    fn render_cell(&mut self, _coord: Coord, _block: Block) {}

    /// Many cells changed at once (compaction, reset).
    ///
    /// The default re-renders every cell through [`Self::render_cell`].
    fn render_field(&mut self, field: &Field) {
        let width = i32::try_from(field.width()).unwrap_or(i32::MAX);
        let height = i32::try_from(field.height()).unwrap_or(i32::MAX);
        for y in 0..height {
            for x in 0..width {
                let coord = Coord::new(x, y);
                self.render_cell(coord, field.get(coord));
            }
        }
    }

    /// One phase of the line-clear flash: `on` shows the highlight, `!on`
    /// restores the original cells.
    fn flash_rows(&mut self, _rows: &[usize], _on: bool) {}

    /// Something happened in the game.
    fn on_event(&mut self, _event: &GameEvent) {}
}

impl Presentation for () {}

impl<P> Presentation for &mut P
where
    P: Presentation + ?Sized,
{
    fn render_cell(&mut self, coord: Coord, block: Block) {
        (**self).render_cell(coord, block);
    }

    fn render_field(&mut self, field: &Field) {
        (**self).render_field(field);
    }

    fn flash_rows(&mut self, rows: &[usize], on: bool) {
        (**self).flash_rows(rows, on);
    }

    fn on_event(&mut self, event: &GameEvent) {
        (**self).on_event(event);
    }
}

/// Input signals polled once per tick.
///
/// `move_left`/`move_right` are level signals (key held); the rest are edge
/// signals (pressed since the previous tick).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InputFrame {
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub soft_drop: bool,
    pub hard_drop: bool,
    /// Skips the whole tick; no timer advances.
    pub paused: bool,
}

impl InputFrame {
    /// A frame with no input at all.
    pub const IDLE: Self = Self {
        rotate_left: false,
        rotate_right: false,
        move_left: false,
        move_right: false,
        soft_drop: false,
        hard_drop: false,
        paused: false,
    };
}
