use serde::{Deserialize, Serialize};

use super::{collaborators::Scoring, config::fall_speed_multiplier};

/// Base points for clearing `n` lines at once, indexed by `n`.
///
/// Multiplied by the current level when awarded.
pub const LINE_CLEAR_POINTS: [u32; 5] = [0, 100, 300, 500, 800];

/// Default score span of level 1; level `n` spans `n` times this.
pub const DEFAULT_POINTS_PER_LEVEL: u32 = 1000;

/// Score, level, and per-round statistics.
///
/// # Leveling
///
/// Level `n` lasts for `points_per_level * n` points, so with the default of
/// 1000 level 2 starts at 1000, level 3 at 3000, level 4 at 6000. Gravity
/// speeds up by [`fall_speed_multiplier`] per level.
///
/// # Example
///
/// ```
/// use blockfall_engine::{ScoreKeeper, Scoring as _};
///
/// let mut score = ScoreKeeper::new();
/// score.on_lines_cleared(4);
/// assert_eq!(score.score(), 800);
/// assert_eq!(score.level(), 1);
///
/// score.add_score(200);
/// assert_eq!(score.level(), 2);
/// assert_eq!(score.line_clear_counter()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreKeeper {
    points_per_level: u32,
    score: u32,
    level: u32,
    best_score: u32,
    locked_pieces: usize,
    total_cleared_lines: usize,
    line_clear_counter: [usize; 5],
}

impl Default for ScoreKeeper {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreKeeper {
    #[must_use]
    pub const fn new() -> Self {
        Self::with_points_per_level(DEFAULT_POINTS_PER_LEVEL)
    }

    /// Like [`Self::new`] with a custom level span. Zero disables leveling.
    #[must_use]
    pub const fn with_points_per_level(points_per_level: u32) -> Self {
        Self {
            points_per_level,
            score: 0,
            level: 1,
            best_score: 0,
            locked_pieces: 0,
            total_cleared_lines: 0,
            line_clear_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Current level, starting at 1.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Highest score reached in any round so far.
    #[must_use]
    pub const fn best_score(&self) -> u32 {
        if self.score > self.best_score {
            self.score
        } else {
            self.best_score
        }
    }

    #[must_use]
    pub const fn locked_pieces(&self) -> usize {
        self.locked_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Line clears of this round, indexed by the number of rows cleared at
    /// once (`[0]` is unused).
    #[must_use]
    pub const fn line_clear_counter(&self) -> &[usize; 5] {
        &self.line_clear_counter
    }

    fn level_for(&self, score: u32) -> u32 {
        if self.points_per_level == 0 {
            return 1;
        }
        let score = u64::from(score);
        let mut level = 1;
        let mut required = 0_u64;
        loop {
            let span = u64::from(self.points_per_level) * u64::from(level);
            if score < required + span {
                return level;
            }
            required += span;
            level += 1;
        }
    }
}

impl Scoring for ScoreKeeper {
    fn on_lines_cleared(&mut self, count: usize) {
        let Some(&points) = LINE_CLEAR_POINTS.get(count).filter(|_| count > 0) else {
            return;
        };
        self.total_cleared_lines += count;
        self.line_clear_counter[count] += 1;
        self.add_score(points.saturating_mul(self.level));
    }

    fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
        self.level = self.level_for(self.score);
    }

    fn fall_speed_multiplier(&self) -> f64 {
        fall_speed_multiplier(self.level)
    }

    fn reset_all(&mut self) {
        *self = Self {
            best_score: self.best_score(),
            ..Self::with_points_per_level(self.points_per_level)
        };
    }

    fn on_piece_locked(&mut self) {
        self.locked_pieces += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_points_scale_with_level() {
        let mut score = ScoreKeeper::new();
        score.on_lines_cleared(1);
        assert_eq!(score.score(), 100);

        score.add_score(900);
        assert_eq!(score.level(), 2);
        score.on_lines_cleared(2);
        assert_eq!(score.score(), 1000 + 600);
    }

    #[test]
    fn test_level_thresholds_accumulate() {
        let mut score = ScoreKeeper::new();
        for (points, level) in [(999, 1), (1, 2), (1999, 2), (1, 3), (2999, 3), (1, 4)] {
            score.add_score(points);
            assert_eq!(score.level(), level, "score {}", score.score());
        }
    }

    #[test]
    fn test_fall_speed_follows_level() {
        let mut score = ScoreKeeper::new();
        assert!((score.fall_speed_multiplier() - 1.0).abs() < 1e-12);
        score.add_score(3000);
        assert_eq!(score.level(), 3);
        assert!((score.fall_speed_multiplier() - 0.64).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_clear_is_ignored() {
        let mut score = ScoreKeeper::new();
        score.on_lines_cleared(0);
        score.on_lines_cleared(5);
        assert_eq!(score.score(), 0);
        assert_eq!(score.total_cleared_lines(), 0);
    }

    #[test]
    fn test_reset_keeps_best_score() {
        let mut score = ScoreKeeper::new();
        score.on_lines_cleared(4);
        score.on_piece_locked();
        score.reset_all();
        assert_eq!(score.score(), 0);
        assert_eq!(score.level(), 1);
        assert_eq!(score.locked_pieces(), 0);
        assert_eq!(score.line_clear_counter(), &[0; 5]);
        assert_eq!(score.best_score(), 800);

        score.add_score(10);
        score.reset_all();
        assert_eq!(score.best_score(), 800);
    }

    #[test]
    fn test_zero_points_per_level_disables_leveling() {
        let mut score = ScoreKeeper::with_points_per_level(0);
        score.add_score(1_000_000);
        assert_eq!(score.level(), 1);
    }

    #[test]
    fn test_score_saturates() {
        let mut score = ScoreKeeper::with_points_per_level(u32::MAX);
        score.add_score(u32::MAX);
        score.add_score(1);
        assert_eq!(score.score(), u32::MAX);
    }
}
