use std::{
    io::{self, Write as _},
    time::Duration,
};

use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::supports_keyboard_enhancement,
};

use crate::tui::{App, event::TuiEvent, event_loop::EventLoop};

/// Runs an [`App`] in the terminal.
#[derive(Debug, Default)]
pub struct Runtime {
    events: EventLoop,
    key_releases: bool,
}

impl Runtime {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tick rate in Hz; `None` disables ticks.
    pub fn set_tick_rate(&mut self, rate: Option<f64>) {
        self.events
            .set_tick_interval(rate.map(|rate| Duration::from_secs_f64(1.0 / rate)));
    }

    /// Whether the terminal reports key release and repeat events.
    ///
    /// Only known once [`Self::run`] has set up the terminal.
    #[must_use]
    pub fn key_releases(&self) -> bool {
        self.key_releases
    }

    /// Runs `app` until [`App::should_exit`] returns `true`.
    ///
    /// Key release reporting is switched on for the duration of the run when
    /// the terminal supports it.
    pub fn run<A>(mut self, app: &mut A) -> anyhow::Result<()>
    where
        A: App,
    {
        ratatui::run(|terminal| -> anyhow::Result<()> {
            self.key_releases = supports_keyboard_enhancement().unwrap_or(false);
            if self.key_releases {
                execute!(
                    io::stdout(),
                    PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
                )?;
            }

            app.init(&mut self);
            let result = self.event_loop(terminal, app);

            if self.key_releases {
                execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
                io::stdout().flush()?;
            }
            result
        })
    }

    fn event_loop<A>(
        &mut self,
        terminal: &mut ratatui::DefaultTerminal,
        app: &mut A,
    ) -> anyhow::Result<()>
    where
        A: App,
    {
        while !app.should_exit() {
            match self.events.next()? {
                TuiEvent::Tick { elapsed } => app.update(self, elapsed),
                TuiEvent::Render => {
                    terminal.draw(|frame| app.draw(frame))?;
                }
                TuiEvent::Crossterm(event) => app.handle_event(self, event),
            }
        }
        Ok(())
    }
}
