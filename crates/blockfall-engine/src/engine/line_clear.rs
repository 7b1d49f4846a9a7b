use std::time::Duration;

/// One visible step of a line-clear sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum ClearStep {
    /// Show (`on`) or restore (`!on`) the highlighted rows.
    Flash { on: bool },
    /// Remove the rows and shift everything above down.
    Compact,
}

/// Timed flash-then-compact animation for a batch of full rows.
///
/// With `flash_count = n` the sequence is `n` pairs of `Flash { on: true }` /
/// `Flash { on: false }`, each phase lasting `flash_delay`, followed by a single
/// `Compact`. The first step is due immediately.
///
/// ```
/// use std::time::Duration;
/// use blockfall_engine::{ClearStep, LineClearSequence};
///
/// let delay = Duration::from_millis(50);
/// let mut clear = LineClearSequence::new(vec![0, 1], 1);
/// assert_eq!(clear.next_step(delay), Some(ClearStep::Flash { on: true }));
/// assert_eq!(clear.next_step(delay), None);
///
/// clear.advance(Duration::from_millis(100));
/// assert_eq!(clear.next_step(delay), Some(ClearStep::Flash { on: false }));
/// assert_eq!(clear.next_step(delay), Some(ClearStep::Compact));
/// assert!(clear.is_finished());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineClearSequence {
    rows: Vec<usize>,
    flash_phases: u32,
    next_index: u32,
    elapsed: Duration,
}

impl LineClearSequence {
    /// Starts a sequence for `rows` (ascending row indices).
    #[must_use]
    pub fn new(rows: Vec<usize>, flash_count: u32) -> Self {
        Self {
            rows,
            flash_phases: flash_count.saturating_mul(2),
            next_index: 0,
            elapsed: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<usize> {
        self.rows
    }

    /// Whether the compaction step has been handed out.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.next_index > self.flash_phases
    }

    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    /// Returns the next step if it is due.
    ///
    /// Call repeatedly after [`Self::advance`]: a long tick may make several
    /// steps due at once.
    pub fn next_step(&mut self, flash_delay: Duration) -> Option<ClearStep> {
        if self.is_finished() {
            return None;
        }
        let due = flash_delay.saturating_mul(self.next_index);
        if self.elapsed < due {
            return None;
        }
        let step = if self.next_index == self.flash_phases {
            ClearStep::Compact
        } else {
            ClearStep::Flash {
                on: self.next_index % 2 == 0,
            }
        };
        self.next_index += 1;
        Some(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(50);

    fn drain(clear: &mut LineClearSequence) -> Vec<ClearStep> {
        std::iter::from_fn(|| clear.next_step(DELAY)).collect()
    }

    #[test]
    fn test_full_sequence_in_small_ticks() {
        let mut clear = LineClearSequence::new(vec![3], 3);
        let mut steps = drain(&mut clear);
        for _ in 0..30 {
            clear.advance(Duration::from_millis(10));
            steps.extend(drain(&mut clear));
        }
        let flash = |on| ClearStep::Flash { on };
        assert_eq!(
            steps,
            vec![
                flash(true),
                flash(false),
                flash(true),
                flash(false),
                flash(true),
                flash(false),
                ClearStep::Compact,
            ]
        );
        assert!(clear.is_finished());
    }

    #[test]
    fn test_compact_waits_for_last_phase() {
        let mut clear = LineClearSequence::new(vec![0], 1);
        clear.advance(Duration::from_millis(99));
        assert_eq!(
            drain(&mut clear),
            vec![ClearStep::Flash { on: true }, ClearStep::Flash { on: false }]
        );
        assert!(!clear.is_finished());
        clear.advance(Duration::from_millis(1));
        assert_eq!(drain(&mut clear), vec![ClearStep::Compact]);
    }

    #[test]
    fn test_zero_flash_count_compacts_immediately() {
        let mut clear = LineClearSequence::new(vec![0, 1, 2, 3], 0);
        assert_eq!(drain(&mut clear), vec![ClearStep::Compact]);
        assert!(clear.is_finished());
        assert_eq!(clear.rows(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_long_tick_releases_everything() {
        let mut clear = LineClearSequence::new(vec![5], 3);
        clear.advance(Duration::from_secs(5));
        assert_eq!(drain(&mut clear).len(), 7);
        clear.advance(Duration::from_secs(5));
        assert!(drain(&mut clear).is_empty());
    }
}
