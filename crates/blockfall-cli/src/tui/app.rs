use std::time::Duration;

use crossterm::event::Event;
use ratatui::Frame;

use crate::tui::Runtime;

/// Application driven by [`Runtime::run`].
pub trait App {
    /// Called once before the loop starts; configure the tick rate here.
    fn init(&mut self, runtime: &mut Runtime);

    fn should_exit(&self) -> bool;

    /// Key input, resize, and other terminal events.
    fn handle_event(&mut self, runtime: &mut Runtime, event: Event);

    fn draw(&self, frame: &mut Frame);

    /// Advances the application by `elapsed`, the time since the previous tick.
    fn update(&mut self, runtime: &mut Runtime, elapsed: Duration);
}
