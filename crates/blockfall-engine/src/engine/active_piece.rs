use std::{sync::Arc, time::Duration};

use crate::{
    PieceCollisionError,
    core::{
        Coord, Field, PieceKind, Rotation, RotationDirection, ShapeCells, TetrominoShape,
        rotate_cell,
    },
};

use super::{
    GameConfig,
    auto_repeat::{AutoRepeat, HorizontalDirection},
    collaborators::{GameEvent, InputFrame},
};

/// Result of advancing the active piece by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum PieceStatus {
    /// Still falling; the piece stays active.
    Falling,
    /// The piece must be written into the field now.
    Locked {
        /// Rows travelled if the lock was caused by a hard drop.
        hard_drop_distance: Option<u32>,
    },
}

/// The currently falling piece.
///
/// Holds its cells relative to `position`, its rotation state, and the timers
/// of the gravity/lock/auto-repeat state machine. The field is only borrowed to
/// validate candidate placements; the piece itself is never stored in it until
/// [`Game`](super::Game) locks it.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use blockfall_engine::{ActivePiece, Coord, Field, PieceKind, RotationDirection, ShapeSet};
///
/// let shapes = ShapeSet::standard();
/// let field = Field::new(10, 20);
/// let mut piece = ActivePiece::spawn(
///     shapes.get(PieceKind::T).clone(),
///     Coord::new(4, 18),
///     Duration::from_secs(1),
///     &field,
/// )
/// .unwrap();
///
/// assert!(piece.try_move(&field, Coord::LEFT));
/// assert!(piece.try_rotate(&field, RotationDirection::Clockwise).is_some());
/// assert_eq!(piece.hard_drop(&field), 17);
/// ```
#[derive(Debug, Clone)]
pub struct ActivePiece {
    shape: Arc<TetrominoShape>,
    cells: ShapeCells,
    position: Coord,
    rotation: Rotation,
    step_delay: Duration,
    gravity_timer: Duration,
    lock_timer: Duration,
    auto_repeat: AutoRepeat,
}

impl ActivePiece {
    /// Places a fresh piece of `shape` at `anchor`.
    ///
    /// `step_delay` is the gravity interval for the piece's whole life, derived
    /// from the level at spawn time. Fails if the spawn placement collides or
    /// leaves the field, which ends the round.
    pub fn spawn(
        shape: Arc<TetrominoShape>,
        anchor: Coord,
        step_delay: Duration,
        field: &Field,
    ) -> Result<Self, PieceCollisionError> {
        let piece = Self {
            cells: shape.base_cells().clone(),
            shape,
            position: anchor,
            rotation: Rotation::SPAWN,
            step_delay,
            gravity_timer: Duration::ZERO,
            lock_timer: Duration::ZERO,
            auto_repeat: AutoRepeat::new(),
        };
        if !field.is_valid_placement(piece.absolute_cells()) {
            return Err(PieceCollisionError);
        }
        Ok(piece)
    }

    #[must_use]
    pub fn shape(&self) -> &Arc<TetrominoShape> {
        &self.shape
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.shape.kind()
    }

    /// Cells relative to [`Self::position`].
    #[must_use]
    pub fn cells(&self) -> &ShapeCells {
        &self.cells
    }

    #[must_use]
    pub fn position(&self) -> Coord {
        self.position
    }

    #[must_use]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    #[must_use]
    pub fn step_delay(&self) -> Duration {
        self.step_delay
    }

    /// Time since the last successful downward move (or spawn).
    #[must_use]
    pub fn lock_timer(&self) -> Duration {
        self.lock_timer
    }

    /// Absolute field coordinates of the piece.
    pub fn absolute_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells_at(self.position)
    }

    fn cells_at(&self, position: Coord) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().map(move |&cell| cell + position)
    }

    /// Moves the piece by `offset` if the destination is free.
    ///
    /// On failure nothing changes. A successful move straight down restarts the
    /// lock timer.
    pub fn try_move(&mut self, field: &Field, offset: Coord) -> bool {
        let position = self.position + offset;
        if !field.is_valid_placement(self.cells_at(position)) {
            return false;
        }
        self.position = position;
        if offset == Coord::DOWN {
            self.lock_timer = Duration::ZERO;
        }
        true
    }

    /// Rotates the piece, trying each wall-kick candidate in order.
    ///
    /// Returns the kick offset that made the rotation fit, or `None` if every
    /// candidate was blocked; in that case cells, rotation, and position are
    /// exactly as before.
    pub fn try_rotate(&mut self, field: &Field, direction: RotationDirection) -> Option<Coord> {
        let shape = Arc::clone(&self.shape);
        let kicks = shape.kicks(self.rotation, direction);

        let original_rotation = self.rotation;
        self.rotation = self.rotation.rotated(direction);
        self.apply_rotation(direction);

        if let Some(&kick) = kicks.iter().find(|&&kick| self.try_move(field, kick)) {
            return Some(kick);
        }

        self.rotation = original_rotation;
        self.apply_rotation(direction.reversed());
        None
    }

    fn apply_rotation(&mut self, direction: RotationDirection) {
        let policy = self.shape.policy();
        for cell in &mut self.cells {
            *cell = rotate_cell(*cell, direction, policy);
        }
    }

    /// Drops the piece as far as it goes and returns the distance in rows.
    pub fn hard_drop(&mut self, field: &Field) -> u32 {
        let mut distance = 0;
        while self.try_move(field, Coord::DOWN) {
            distance += 1;
        }
        distance
    }

    /// Position the piece would land at if hard-dropped now.
    #[must_use]
    pub fn landing_position(&self, field: &Field) -> Coord {
        let mut position = self.position;
        while field.is_valid_placement(self.cells_at(position + Coord::DOWN)) {
            position += Coord::DOWN;
        }
        position
    }

    /// Advances the piece by one tick of length `dt`.
    ///
    /// In order: timers accumulate, rotation input, horizontal auto-repeat,
    /// soft drop, hard drop, gravity step, lock check. The piece locks when a
    /// downward attempt made during this tick failed and the lock timer has
    /// reached `lock_delay`; a hard drop locks unconditionally.
    pub fn update<F>(
        &mut self,
        field: &Field,
        input: &InputFrame,
        dt: Duration,
        config: &GameConfig,
        mut emit: F,
    ) -> PieceStatus
    where
        F: FnMut(GameEvent),
    {
        self.lock_timer += dt;
        self.gravity_timer += dt;

        let rotation = if input.rotate_left {
            Some(RotationDirection::CounterClockwise)
        } else if input.rotate_right {
            Some(RotationDirection::Clockwise)
        } else {
            None
        };
        if let Some(direction) = rotation
            && let Some(kick) = self.try_rotate(field, direction)
        {
            emit(GameEvent::Rotated { kick });
        }

        let held = HorizontalDirection::from_keys(input.move_left, input.move_right);
        let mut auto_repeat = std::mem::take(&mut self.auto_repeat);
        auto_repeat.step(held, dt, config, |direction| {
            let offset = direction.offset();
            let moved = self.try_move(field, offset);
            if moved {
                emit(GameEvent::Moved { offset });
            }
            moved
        });
        self.auto_repeat = auto_repeat;

        let mut fall_failed = false;
        if input.soft_drop {
            if self.try_move(field, Coord::DOWN) {
                emit(GameEvent::SoftDropped);
            } else {
                fall_failed = true;
            }
        }

        if input.hard_drop {
            let distance = self.hard_drop(field);
            emit(GameEvent::HardDropped { distance });
            return PieceStatus::Locked {
                hard_drop_distance: Some(distance),
            };
        }

        if self.gravity_timer > self.step_delay {
            self.gravity_timer = Duration::ZERO;
            fall_failed = !self.try_move(field, Coord::DOWN);
        }

        if fall_failed && self.lock_timer >= config.lock_delay {
            return PieceStatus::Locked {
                hard_drop_distance: None,
            };
        }
        PieceStatus::Falling
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{Block, ShapeSet};

    use super::*;

    const TICK: Duration = Duration::from_millis(100);

    fn spawn(kind: PieceKind, field: &Field, anchor: Coord) -> ActivePiece {
        let shapes = ShapeSet::standard();
        ActivePiece::spawn(
            shapes.get(kind).clone(),
            anchor,
            Duration::from_secs(60),
            field,
        )
        .unwrap()
    }

    fn sorted_cells(piece: &ActivePiece) -> Vec<Coord> {
        let mut cells: Vec<_> = piece.absolute_cells().collect();
        cells.sort_by_key(|c| (c.y, c.x));
        cells
    }

    fn tick(piece: &mut ActivePiece, field: &Field, input: InputFrame) -> PieceStatus {
        piece.update(field, &input, TICK, &GameConfig::default(), |_| {})
    }

    const SOFT_DROP: InputFrame = InputFrame {
        soft_drop: true,
        ..InputFrame::IDLE
    };

    #[test]
    fn test_spawn_initializes_from_shape() {
        let field = Field::new(10, 20);
        let piece = spawn(PieceKind::T, &field, Coord::new(4, 18));
        assert_eq!(piece.rotation(), Rotation::SPAWN);
        assert_eq!(piece.cells(), piece.shape().base_cells());
        assert_eq!(piece.lock_timer(), Duration::ZERO);
        assert_eq!(
            sorted_cells(&piece),
            vec![
                Coord::new(3, 18),
                Coord::new(4, 18),
                Coord::new(5, 18),
                Coord::new(4, 19)
            ]
        );
    }

    #[test]
    fn test_spawn_collision_fails() {
        let mut field = Field::new(10, 20);
        field.commit([Coord::new(4, 18)], Block::Piece(PieceKind::O));
        let shapes = ShapeSet::standard();
        let result = ActivePiece::spawn(
            shapes.get(PieceKind::T).clone(),
            Coord::new(4, 18),
            Duration::from_secs(1),
            &field,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_move_is_exact_or_no_op() {
        let mut field = Field::new(10, 20);
        field.commit([Coord::new(2, 5)], Block::Piece(PieceKind::O));
        let shapes = ShapeSet::standard();
        for kind in PieceKind::ALL {
            for offset in [Coord::LEFT, Coord::RIGHT, Coord::DOWN, Coord::UP] {
                let anchors = [
                    Coord::new(1, 1),
                    Coord::new(4, 5),
                    Coord::new(8, 18),
                    Coord::new(3, 4),
                ];
                for anchor in anchors {
                    let Ok(mut piece) = ActivePiece::spawn(
                        shapes.get(kind).clone(),
                        anchor,
                        Duration::from_secs(1),
                        &field,
                    ) else {
                        continue;
                    };
                    let before = (piece.cells().clone(), piece.position(), piece.rotation());
                    if piece.try_move(&field, offset) {
                        assert_eq!(piece.position(), before.1 + offset);
                        assert_eq!(piece.cells(), &before.0);
                        assert_eq!(piece.rotation(), before.2);
                    } else {
                        let after = (piece.cells().clone(), piece.position(), piece.rotation());
                        assert_eq!(after, before);
                    }
                }
            }
        }
    }

    #[test]
    fn test_walls_and_floor_block_moves() {
        let field = Field::new(10, 20);
        let mut piece = spawn(PieceKind::O, &field, Coord::new(0, 0));
        assert!(!piece.try_move(&field, Coord::LEFT));
        assert!(!piece.try_move(&field, Coord::DOWN));
        assert!(piece.try_move(&field, Coord::RIGHT));
    }

    #[test]
    fn test_four_rotations_restore_piece() {
        let field = Field::new(10, 20);
        for kind in PieceKind::ALL {
            for direction in [RotationDirection::Clockwise, RotationDirection::CounterClockwise] {
                let mut piece = spawn(kind, &field, Coord::new(4, 10));
                let before = (piece.cells().clone(), piece.position(), piece.rotation());
                for _ in 0..4 {
                    assert_eq!(piece.try_rotate(&field, direction), Some(Coord::ZERO));
                }
                assert_eq!(
                    (piece.cells().clone(), piece.position(), piece.rotation()),
                    before,
                    "{kind} {direction:?}"
                );
            }
        }
    }

    #[test]
    fn test_wall_kick_uses_second_candidate() {
        // T at rotation 0 against nothing, but a block where the in-place
        // clockwise rotation would put its lower cell.
        let mut field = Field::new(10, 20);
        let anchor = Coord::new(4, 10);
        field.commit([Coord::new(4, 9)], Block::Piece(PieceKind::O));
        let mut piece = spawn(PieceKind::T, &field, anchor);

        let kick = piece.try_rotate(&field, RotationDirection::Clockwise);
        // First candidate (0, 0) collides; second candidate is (-1, 0).
        assert_eq!(kick, Some(Coord::new(-1, 0)));
        assert_eq!(piece.position(), anchor + Coord::new(-1, 0));
        assert_eq!(piece.rotation().index(), 1);
    }

    #[test]
    fn test_failed_rotation_reverts_everything() {
        // A vertical T needs three rows; every kick candidate leaves the field.
        let field = Field::new(3, 2);
        let shapes = ShapeSet::standard();
        let mut piece = ActivePiece::spawn(
            shapes.get(PieceKind::T).clone(),
            Coord::new(1, 0),
            Duration::from_secs(1),
            &field,
        )
        .unwrap();
        let before = (piece.cells().clone(), piece.position(), piece.rotation());
        assert_eq!(piece.try_rotate(&field, RotationDirection::Clockwise), None);
        assert_eq!(piece.try_rotate(&field, RotationDirection::CounterClockwise), None);
        assert_eq!((piece.cells().clone(), piece.position(), piece.rotation()), before);
    }

    #[test]
    fn test_hard_drop_distance() {
        let field = Field::new(10, 20);
        let mut piece = spawn(PieceKind::O, &field, Coord::new(4, 10));
        assert_eq!(piece.landing_position(&field), Coord::new(4, 0));
        assert_eq!(piece.hard_drop(&field), 10);
        assert_eq!(piece.position(), Coord::new(4, 0));
        assert_eq!(piece.hard_drop(&field), 0);
    }

    #[test]
    fn test_hard_drop_locks_immediately() {
        let field = Field::new(10, 20);
        let mut piece = spawn(PieceKind::O, &field, Coord::new(4, 10));
        let input = InputFrame {
            hard_drop: true,
            ..InputFrame::IDLE
        };
        assert_eq!(
            tick(&mut piece, &field, input),
            PieceStatus::Locked {
                hard_drop_distance: Some(10)
            }
        );
    }

    #[test]
    fn test_lock_delay_counts_from_last_fall() {
        let field = Field::new(10, 20);
        let mut piece = spawn(PieceKind::O, &field, Coord::new(4, 1));

        // Time spent falling does not count towards the lock delay.
        for _ in 0..4 {
            assert!(tick(&mut piece, &field, InputFrame::IDLE).is_falling());
        }
        assert!(tick(&mut piece, &field, SOFT_DROP).is_falling());
        assert_eq!(piece.position(), Coord::new(4, 0));

        // Blocked from here on: 100ms per tick, 500ms lock delay.
        for _ in 0..4 {
            assert!(tick(&mut piece, &field, SOFT_DROP).is_falling());
        }
        assert_eq!(
            tick(&mut piece, &field, SOFT_DROP),
            PieceStatus::Locked {
                hard_drop_distance: None
            }
        );
    }

    #[test]
    fn test_resting_without_fall_attempt_does_not_lock() {
        let field = Field::new(10, 20);
        let mut piece = spawn(PieceKind::O, &field, Coord::new(4, 0));
        for _ in 0..20 {
            assert!(tick(&mut piece, &field, InputFrame::IDLE).is_falling());
        }
    }

    #[test]
    fn test_gravity_step_after_step_delay() {
        let field = Field::new(10, 20);
        let shapes = ShapeSet::standard();
        let mut piece = ActivePiece::spawn(
            shapes.get(PieceKind::O).clone(),
            Coord::new(4, 10),
            Duration::from_millis(250),
            &field,
        )
        .unwrap();
        // 100, 200: not yet; 300 > 250: step.
        tick(&mut piece, &field, InputFrame::IDLE);
        tick(&mut piece, &field, InputFrame::IDLE);
        assert_eq!(piece.position(), Coord::new(4, 10));
        tick(&mut piece, &field, InputFrame::IDLE);
        assert_eq!(piece.position(), Coord::new(4, 9));
    }

    #[test]
    fn test_gravity_lock_on_landing() {
        let field = Field::new(10, 20);
        let shapes = ShapeSet::standard();
        let mut piece = ActivePiece::spawn(
            shapes.get(PieceKind::O).clone(),
            Coord::new(4, 1),
            Duration::from_millis(250),
            &field,
        )
        .unwrap();
        let statuses: Vec<_> = (0..6)
            .map(|_| tick(&mut piece, &field, InputFrame::IDLE))
            .collect();
        // Falls at tick 3; next gravity step at tick 6 fails with 300ms on the
        // lock timer, short of 500ms.
        assert!(statuses.iter().all(|s| s.is_falling()));
        let statuses: Vec<_> = (0..3)
            .map(|_| tick(&mut piece, &field, InputFrame::IDLE))
            .collect();
        assert!(statuses[2].is_locked());
    }

    #[test]
    fn test_update_emits_events() {
        let field = Field::new(10, 20);
        let mut piece = spawn(PieceKind::T, &field, Coord::new(4, 10));
        let input = InputFrame {
            rotate_right: true,
            move_left: true,
            soft_drop: true,
            ..InputFrame::IDLE
        };
        let mut events = Vec::new();
        piece.update(&field, &input, TICK, &GameConfig::default(), |e| events.push(e));
        assert_eq!(
            events,
            vec![
                GameEvent::Rotated { kick: Coord::ZERO },
                GameEvent::Moved {
                    offset: Coord::LEFT
                },
                GameEvent::SoftDropped,
            ]
        );
        assert_eq!(piece.position(), Coord::new(3, 9));
    }
}
