use std::{
    io::{self, Write as _},
    time::Duration,
};

use blockfall_engine::{GameEvent, Presentation};

const BANNER_TIME: Duration = Duration::from_millis(1200);

/// Presentation hooks of the terminal game: line-clear flash state, a short
/// banner after notable events, and the optional terminal bell.
#[derive(Debug, Default)]
pub struct Hooks {
    bell: bool,
    flash_on: bool,
    banner: Option<(&'static str, Duration)>,
}

impl Hooks {
    pub fn new(bell: bool) -> Self {
        Self {
            bell,
            ..Self::default()
        }
    }

    /// Whether the clearing rows are currently highlighted.
    pub fn flash_on(&self) -> bool {
        self.flash_on
    }

    pub fn banner(&self) -> Option<&'static str> {
        self.banner.map(|(text, _)| text)
    }

    /// Expires the banner.
    pub fn advance(&mut self, elapsed: Duration) {
        if let Some((_, remaining)) = &mut self.banner {
            *remaining = remaining.saturating_sub(elapsed);
            if remaining.is_zero() {
                self.banner = None;
            }
        }
    }

    fn ring(&self) {
        if self.bell {
            let mut stdout = io::stdout();
            _ = stdout.write_all(b"\x07");
            _ = stdout.flush();
        }
    }
}

impl Presentation for Hooks {
    fn flash_rows(&mut self, _rows: &[usize], on: bool) {
        self.flash_on = on;
    }

    fn on_event(&mut self, event: &GameEvent) {
        let banner = match event {
            GameEvent::LinesCleared { rows } => match rows.len() {
                1 => "SINGLE",
                2 => "DOUBLE",
                3 => "TRIPLE",
                _ => "TETRIS!",
            },
            GameEvent::GameOver => "TOP OUT",
            _ => return,
        };
        self.banner = Some((banner, BANNER_TIME));
        self.flash_on = false;
        self.ring();
    }
}
