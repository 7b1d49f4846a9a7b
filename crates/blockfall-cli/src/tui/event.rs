use std::time::Duration;

use crossterm::event::Event as CrosstermEvent;

#[derive(Debug, Clone, derive_more::From)]
pub(super) enum TuiEvent {
    /// Time to update; carries the time since the previous tick.
    #[from(ignore)]
    Tick { elapsed: Duration },
    /// Time to redraw.
    Render,
    /// Key input, resize, and other terminal events.
    Crossterm(CrosstermEvent),
}
