use std::time::Duration;

use crate::core::Coord;

use super::GameConfig;

/// Horizontal movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum HorizontalDirection {
    Left,
    Right,
}

impl HorizontalDirection {
    /// Resolves the held keys into a direction.
    ///
    /// Holding neither or both keys yields `None`.
    #[must_use]
    pub fn from_keys(left: bool, right: bool) -> Option<Self> {
        match (left, right) {
            (true, false) => Some(HorizontalDirection::Left),
            (false, true) => Some(HorizontalDirection::Right),
            _ => None,
        }
    }

    #[must_use]
    pub fn offset(self) -> Coord {
        match self {
            HorizontalDirection::Left => Coord::LEFT,
            HorizontalDirection::Right => Coord::RIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum RepeatState {
    #[default]
    Idle,
    Held {
        direction: HorizontalDirection,
        /// Time left before the next move may fire.
        remaining: Duration,
        /// Whether the initial move already went through.
        fired: bool,
    },
}

/// Delayed auto-repeat for held horizontal keys.
///
/// - The first press moves immediately.
/// - The next move fires once `move_delay` has elapsed.
/// - After that, moves repeat every `move_repeat_rate`.
///
/// Releasing the key, holding both keys, or switching direction starts over.
/// A blocked move does not consume the wait: it is retried on the next tick.
#[derive(Debug, Clone, Default)]
pub struct AutoRepeat {
    state: RepeatState,
}

impl AutoRepeat {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets any held key.
    pub fn reset(&mut self) {
        self.state = RepeatState::Idle;
    }

    /// Advances by `dt` with the currently held direction and calls `try_move`
    /// when a move is due.
    ///
    /// Returns `true` if a move was attempted and succeeded.
    pub fn step<F>(
        &mut self,
        held: Option<HorizontalDirection>,
        dt: Duration,
        config: &GameConfig,
        mut try_move: F,
    ) -> bool
    where
        F: FnMut(HorizontalDirection) -> bool,
    {
        let Some(held) = held else {
            self.state = RepeatState::Idle;
            return false;
        };

        let (direction, remaining, fired) = match self.state {
            RepeatState::Held {
                direction,
                remaining,
                fired,
            } if direction == held => (direction, remaining.saturating_sub(dt), fired),
            _ => (held, Duration::ZERO, false),
        };

        let mut next = RepeatState::Held {
            direction,
            remaining,
            fired,
        };
        let mut moved = false;
        if remaining.is_zero() && try_move(direction) {
            moved = true;
            next = RepeatState::Held {
                direction,
                remaining: if fired {
                    config.move_repeat_rate
                } else {
                    config.move_delay
                },
                fired: true,
            };
        }
        self.state = next;
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(10);

    fn run(repeat: &mut AutoRepeat, held: Option<HorizontalDirection>, ticks: usize) -> usize {
        let config = GameConfig::default();
        (0..ticks)
            .filter(|_| repeat.step(held, TICK, &config, |_| true))
            .count()
    }

    #[test]
    fn test_from_keys() {
        assert_eq!(HorizontalDirection::from_keys(false, false), None);
        assert_eq!(HorizontalDirection::from_keys(true, true), None);
        assert_eq!(
            HorizontalDirection::from_keys(true, false),
            Some(HorizontalDirection::Left)
        );
        assert_eq!(
            HorizontalDirection::from_keys(false, true),
            Some(HorizontalDirection::Right)
        );
    }

    #[test]
    fn test_first_press_moves_immediately() {
        let mut repeat = AutoRepeat::new();
        assert_eq!(run(&mut repeat, Some(HorizontalDirection::Left), 1), 1);
    }

    #[test]
    fn test_delay_then_repeat_rate() {
        let mut repeat = AutoRepeat::new();
        let left = Some(HorizontalDirection::Left);
        // Tick 0 fires, ticks 1..=14 wait out the 150ms delay.
        assert_eq!(run(&mut repeat, left, 15), 1);
        // Tick 15 reaches 150ms and fires.
        assert_eq!(run(&mut repeat, left, 1), 1);
        // Then one move every 50ms (5 ticks).
        assert_eq!(run(&mut repeat, left, 4), 0);
        assert_eq!(run(&mut repeat, left, 1), 1);
        assert_eq!(run(&mut repeat, left, 20), 4);
    }

    #[test]
    fn test_release_resets() {
        let mut repeat = AutoRepeat::new();
        let right = Some(HorizontalDirection::Right);
        assert_eq!(run(&mut repeat, right, 3), 1);
        assert_eq!(run(&mut repeat, None, 1), 0);
        assert_eq!(run(&mut repeat, right, 1), 1);
    }

    #[test]
    fn test_direction_change_resets() {
        let mut repeat = AutoRepeat::new();
        assert_eq!(run(&mut repeat, Some(HorizontalDirection::Right), 3), 1);
        assert_eq!(run(&mut repeat, Some(HorizontalDirection::Left), 1), 1);
    }

    #[test]
    fn test_blocked_move_is_retried() {
        let config = GameConfig::default();
        let mut repeat = AutoRepeat::new();
        let left = Some(HorizontalDirection::Left);
        assert!(!repeat.step(left, TICK, &config, |_| false));
        assert!(!repeat.step(left, TICK, &config, |_| false));
        // Still the initial press: fires as soon as the way is clear.
        assert!(repeat.step(left, TICK, &config, |_| true));
        assert!(!repeat.step(left, TICK, &config, |_| true));
    }
}
