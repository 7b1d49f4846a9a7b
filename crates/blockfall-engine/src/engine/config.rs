use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{Coord, Field, PieceKind, ShapeSet};

/// Per-level decay of the gravity step delay.
pub const FALL_SPEED_DECAY: f64 = 0.8;

/// Returns the gravity step-delay multiplier for `level` (1-based).
///
/// Decays geometrically: every level falls 20% faster than the previous one,
/// never reaching zero. Level 0 is treated as level 1.
///
/// ```
/// use blockfall_engine::fall_speed_multiplier;
///
/// assert_eq!(fall_speed_multiplier(1), 1.0);
/// assert!((fall_speed_multiplier(2) - 0.8).abs() < 1e-12);
/// ```
#[must_use]
pub fn fall_speed_multiplier(level: u32) -> f64 {
    let exponent = i32::try_from(level.saturating_sub(1)).unwrap_or(i32::MAX);
    FALL_SPEED_DECAY.powi(exponent)
}

/// Tunable parameters of a game.
///
/// All fields have defaults, so a JSON config file only needs to list the
/// values it overrides. Durations are written in milliseconds.
///
/// ```
/// use blockfall_engine::GameConfig;
///
/// let config: GameConfig = serde_json::from_str(r#"{ "lock_delay_ms": 250 }"#).unwrap();
/// assert_eq!(config.lock_delay.as_millis(), 250);
/// assert_eq!(config.width, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    /// Anchor of a newly spawned piece.
    pub spawn: Coord,
    /// Gravity step delay at level 1.
    #[serde(rename = "base_step_delay_ms", with = "super::serde_millis")]
    pub base_step_delay: Duration,
    /// Grace period between landing and locking.
    #[serde(rename = "lock_delay_ms", with = "super::serde_millis")]
    pub lock_delay: Duration,
    /// Delay between the first horizontal move and the first repeat.
    #[serde(rename = "move_delay_ms", with = "super::serde_millis")]
    pub move_delay: Duration,
    /// Interval between horizontal repeats.
    #[serde(rename = "move_repeat_rate_ms", with = "super::serde_millis")]
    pub move_repeat_rate: Duration,
    /// Length of each flash on/off phase of the line-clear animation.
    #[serde(rename = "flash_delay_ms", with = "super::serde_millis")]
    pub flash_delay: Duration,
    /// Number of on/off flash cycles before compaction.
    pub flash_count: u32,
    /// Points awarded per cell travelled during a hard drop.
    pub hard_drop_points_per_cell: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 20,
            spawn: Coord::new(4, 18),
            base_step_delay: Duration::from_secs(1),
            lock_delay: Duration::from_millis(500),
            move_delay: Duration::from_millis(150),
            move_repeat_rate: Duration::from_millis(50),
            flash_delay: Duration::from_millis(50),
            flash_count: 3,
            hard_drop_points_per_cell: 2,
        }
    }
}

/// Malformed [`GameConfig`], reported before play starts.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("field must be at least 1x1, got {width}x{height}")]
    EmptyField { width: usize, height: usize },
    #[display("field {width}x{height} is too large")]
    FieldTooLarge { width: usize, height: usize },
    #[display("base step delay must be positive")]
    ZeroStepDelay,
    #[display("{kind}-piece does not fit the empty field at spawn anchor {spawn}")]
    SpawnBlocked { kind: PieceKind, spawn: Coord },
}

impl GameConfig {
    /// Checks that the configuration can be played with `shapes`.
    ///
    /// Besides dimension checks, every shape must fit at the spawn anchor on an
    /// empty field. Otherwise a fresh round would top out immediately, forever.
    pub fn validate(&self, shapes: &ShapeSet) -> Result<(), ConfigError> {
        let Self { width, height, .. } = *self;
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyField { width, height });
        }
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(ConfigError::FieldTooLarge { width, height });
        }
        if self.base_step_delay.is_zero() {
            return Err(ConfigError::ZeroStepDelay);
        }
        let field = Field::new(width, height);
        for shape in shapes.iter() {
            let cells: Option<Vec<Coord>> = shape
                .base_cells()
                .iter()
                .map(|&cell| cell.checked_add(self.spawn))
                .collect();
            if !cells.is_some_and(|cells| field.is_valid_placement(cells)) {
                return Err(ConfigError::SpawnBlocked {
                    kind: shape.kind(),
                    spawn: self.spawn,
                });
            }
        }
        Ok(())
    }

    /// Gravity step delay for a piece spawned under `multiplier`.
    ///
    /// Non-finite or non-positive multipliers fall back to the base delay.
    #[must_use]
    pub fn step_delay(&self, multiplier: f64) -> Duration {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return self.base_step_delay;
        }
        Duration::try_from_secs_f64(self.base_step_delay.as_secs_f64() * multiplier)
            .unwrap_or(self.base_step_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fall_speed_multiplier() {
        assert!((fall_speed_multiplier(1) - 1.0).abs() < 1e-12);
        assert!((fall_speed_multiplier(2) - 0.8).abs() < 1e-12);
        assert!((fall_speed_multiplier(6) - 0.8_f64.powi(5)).abs() < 1e-12);
        assert!((fall_speed_multiplier(0) - 1.0).abs() < 1e-12);
        assert!(fall_speed_multiplier(500) > 0.0);
    }

    #[test]
    fn test_step_delay_scales_base() {
        let config = GameConfig::default();
        assert_eq!(config.step_delay(1.0), Duration::from_secs(1));
        assert_eq!(config.step_delay(0.5), Duration::from_millis(500));
        assert_eq!(config.step_delay(f64::NAN), Duration::from_secs(1));
        assert_eq!(config.step_delay(-2.0), Duration::from_secs(1));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(GameConfig::default().validate(&ShapeSet::standard()), Ok(()));
    }

    #[test]
    fn test_extreme_spawn_anchor_is_rejected() {
        let shapes = ShapeSet::standard();
        for json in [
            r#"{"spawn": {"x": -2147483648, "y": 18}}"#,
            r#"{"spawn": {"x": 4, "y": 2147483647}}"#,
        ] {
            let config: GameConfig = serde_json::from_str(json).unwrap();
            assert!(
                matches!(
                    config.validate(&shapes),
                    Err(ConfigError::SpawnBlocked { .. })
                ),
                "{json}"
            );
        }
    }

    #[test]
    fn test_invalid_configs_fail_fast() {
        let shapes = ShapeSet::standard();

        let config = GameConfig {
            width: 0,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(&shapes),
            Err(ConfigError::EmptyField { .. })
        ));

        let config = GameConfig {
            base_step_delay: Duration::ZERO,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(&shapes), Err(ConfigError::ZeroStepDelay));

        // The I-piece's top row would sit above a 19-row field.
        let config = GameConfig {
            height: 19,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(&shapes),
            Err(ConfigError::SpawnBlocked { .. })
        ));
    }

    #[test]
    fn test_config_json_uses_milliseconds() {
        let json = serde_json::to_value(GameConfig::default()).unwrap();
        assert_eq!(json["base_step_delay_ms"], 1000);
        assert_eq!(json["move_repeat_rate_ms"], 50);
        assert_eq!(json["spawn"]["x"], 4);

        let config: GameConfig =
            serde_json::from_str(r#"{ "width": 8, "flash_count": 0 }"#).unwrap();
        assert_eq!(config.width, 8);
        assert_eq!(config.flash_count, 0);
        assert_eq!(config.lock_delay, Duration::from_millis(500));
    }
}
