use std::time::Duration;

use crate::{
    PieceCollisionError,
    core::{Block, Field, PieceKind, ShapeSet},
};

use super::{
    active_piece::{ActivePiece, PieceStatus},
    collaborators::{GameEvent, InputFrame, Presentation, Scoring, SpawnSource},
    config::{ConfigError, GameConfig},
    line_clear::{ClearStep, LineClearSequence},
};

/// A running game: field, active piece, line clears, and round resets.
///
/// The game is driven by [`Self::tick`]. Each tick either advances the
/// line-clear animation or the active piece, never both: while full rows are
/// flashing there is no active piece and no new piece may spawn.
///
/// Topping out does not stop the game. A failed spawn clears the field, resets
/// the score, and starts a new round right away.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use blockfall_engine::{Game, GameConfig, InputFrame, ScoreKeeper, ShapeSet, UniformSource};
///
/// let mut game = Game::new(
///     GameConfig::default(),
///     ShapeSet::standard(),
///     UniformSource::new(),
///     ScoreKeeper::new(),
///     (),
/// )
/// .unwrap();
///
/// let hard_drop = InputFrame { hard_drop: true, ..InputFrame::IDLE };
/// game.tick(Duration::from_millis(16), &hard_drop);
/// assert_eq!(game.field().occupied_count(), 4);
/// assert!(game.scoring().score() >= 36);
/// ```
#[derive(Debug)]
pub struct Game<S, C, P> {
    config: GameConfig,
    shapes: ShapeSet,
    field: Field,
    active: Option<ActivePiece>,
    next_kind: PieceKind,
    line_clear: Option<LineClearSequence>,
    spawn_source: S,
    scoring: C,
    presentation: P,
    rounds_finished: usize,
    round_time: Duration,
}

impl<S, C, P> Game<S, C, P>
where
    S: SpawnSource,
    C: Scoring,
    P: Presentation,
{
    /// Validates `config` against `shapes`, draws the first piece, and spawns
    /// it.
    pub fn new(
        config: GameConfig,
        shapes: ShapeSet,
        mut spawn_source: S,
        scoring: C,
        presentation: P,
    ) -> Result<Self, ConfigError> {
        config.validate(&shapes)?;
        let next_kind = spawn_source.next_kind();
        let mut game = Self {
            field: Field::new(config.width, config.height),
            config,
            shapes,
            active: None,
            next_kind,
            line_clear: None,
            spawn_source,
            scoring,
            presentation,
            rounds_finished: 0,
            round_time: Duration::ZERO,
        };
        game.presentation.render_field(&game.field);
        game.spawn();
        Ok(game)
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn shapes(&self) -> &ShapeSet {
        &self.shapes
    }

    #[must_use]
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// The falling piece; `None` while a line clear is in progress.
    #[must_use]
    pub fn active_piece(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    /// Kind that the next spawn will use.
    #[must_use]
    pub fn next_kind(&self) -> PieceKind {
        self.next_kind
    }

    #[must_use]
    pub fn scoring(&self) -> &C {
        &self.scoring
    }

    #[must_use]
    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    pub fn presentation_mut(&mut self) -> &mut P {
        &mut self.presentation
    }

    /// Number of rounds that ended in a top-out.
    #[must_use]
    pub fn rounds_finished(&self) -> usize {
        self.rounds_finished
    }

    /// Unpaused time played in the current round.
    #[must_use]
    pub fn round_time(&self) -> Duration {
        self.round_time
    }

    #[must_use]
    pub fn is_clearing(&self) -> bool {
        self.line_clear.is_some()
    }

    /// Rows currently flashing, if a line clear is in progress.
    #[must_use]
    pub fn clearing_rows(&self) -> Option<&[usize]> {
        self.line_clear.as_ref().map(LineClearSequence::rows)
    }

    /// Advances the game by `dt`.
    ///
    /// A paused frame is ignored entirely, timers included. Without a falling
    /// piece or a running line clear, the tick spawns one.
    pub fn tick(&mut self, dt: Duration, input: &InputFrame) {
        if input.paused {
            return;
        }
        self.round_time += dt;

        if self.line_clear.is_some() {
            self.advance_line_clear(dt);
            return;
        }

        let Some(piece) = self.active.as_mut() else {
            self.spawn();
            return;
        };
        let presentation = &mut self.presentation;
        let status = piece.update(&self.field, input, dt, &self.config, |event| {
            presentation.on_event(&event);
        });
        if let PieceStatus::Locked { hard_drop_distance } = status {
            self.lock(hard_drop_distance);
        }
    }

    /// Spawns a piece of [`Self::next_kind`] at the spawn anchor.
    ///
    /// Does nothing while a line clear is in progress. If the piece does not
    /// fit, the round ends with [`Self::game_over`].
    pub fn spawn(&mut self) {
        if self.is_clearing() {
            return;
        }
        if self.try_spawn().is_err() {
            self.game_over();
        }
    }

    fn try_spawn(&mut self) -> Result<(), PieceCollisionError> {
        let kind = self.next_kind;
        let step_delay = self.config.step_delay(self.scoring.fall_speed_multiplier());
        let shape = self.shapes.get(kind).clone();
        let piece = ActivePiece::spawn(shape, self.config.spawn, step_delay, &self.field)?;
        self.active = Some(piece);
        self.next_kind = self.spawn_source.next_kind();
        self.presentation.on_event(&GameEvent::Spawned { kind });
        Ok(())
    }

    /// Ends the current round and immediately starts a new one.
    ///
    /// Cancels any line clear, empties the field, resets the score, draws a
    /// fresh next kind, and spawns it.
    pub fn game_over(&mut self) {
        self.line_clear = None;
        self.active = None;
        self.field.reset();
        self.scoring.reset_all();
        self.rounds_finished += 1;
        self.round_time = Duration::ZERO;
        self.presentation.render_field(&self.field);
        self.presentation.on_event(&GameEvent::GameOver);

        self.next_kind = self.spawn_source.next_kind();
        // Leaves no piece if even the empty field is blocked; the next tick
        // tries again.
        _ = self.try_spawn();
    }

    /// Looks for full rows and starts clearing them.
    ///
    /// Without full rows the next piece spawns right away. A second call while
    /// a clear is already running is ignored.
    pub fn clear_lines(&mut self) {
        if self.is_clearing() {
            return;
        }
        let rows = self.field.find_full_rows();
        if rows.is_empty() {
            self.spawn();
            return;
        }
        self.line_clear = Some(LineClearSequence::new(rows, self.config.flash_count));
        self.advance_line_clear(Duration::ZERO);
    }

    fn lock(&mut self, hard_drop_distance: Option<u32>) {
        let Some(piece) = self.active.take() else {
            return;
        };
        if let Some(distance) = hard_drop_distance {
            self.scoring
                .add_score(distance.saturating_mul(self.config.hard_drop_points_per_cell));
        }

        let kind = piece.kind();
        let block = Block::Piece(kind);
        self.field.commit(piece.absolute_cells(), block);
        for cell in piece.absolute_cells() {
            self.presentation.render_cell(cell, block);
        }
        self.scoring.on_piece_locked();
        self.presentation.on_event(&GameEvent::Locked { kind });

        self.clear_lines();
    }

    fn advance_line_clear(&mut self, dt: Duration) {
        let Some(clear) = self.line_clear.as_mut() else {
            return;
        };
        clear.advance(dt);

        let mut compact = false;
        while let Some(step) = clear.next_step(self.config.flash_delay) {
            match step {
                ClearStep::Flash { on } => self.presentation.flash_rows(clear.rows(), on),
                ClearStep::Compact => {
                    compact = true;
                    break;
                }
            }
        }
        if !compact {
            return;
        }

        let Some(clear) = self.line_clear.take() else {
            return;
        };
        let rows = clear.into_rows();
        self.field.clear_and_compact(&rows);
        self.presentation.render_field(&self.field);
        self.scoring.on_lines_cleared(rows.len());
        self.presentation.on_event(&GameEvent::LinesCleared { rows });
        self.spawn();
    }
}
