use std::time::Duration;

use blockfall_engine::{Game, GameConfig, PieceSeed, ScoreKeeper, ShapeSet};
use crossterm::event::Event;
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    text::Text,
};

use crate::{
    command::play::{
        hooks::Hooks,
        input::{Action, InputController},
    },
    randomizer::{Randomizer, RandomizerKind},
    tui::{App, Runtime},
    view::{self, GameDisplay},
};

#[derive(Debug)]
pub struct PlayApp {
    game: Game<Randomizer, ScoreKeeper, Hooks>,
    input: InputController,
    fps: u32,
    is_exiting: bool,
}

impl PlayApp {
    pub fn new(
        config: GameConfig,
        randomizer: RandomizerKind,
        seed: PieceSeed,
        fps: u32,
        bell: bool,
    ) -> anyhow::Result<Self> {
        let game = Game::new(
            config,
            ShapeSet::standard(),
            Randomizer::new(randomizer, seed),
            ScoreKeeper::new(),
            Hooks::new(bell),
        )?;
        Ok(Self {
            game,
            input: InputController::new(),
            fps,
            is_exiting: false,
        })
    }

    pub fn best_score(&self) -> u32 {
        self.game.scoring().best_score()
    }
}

impl App for PlayApp {
    fn init(&mut self, runtime: &mut Runtime) {
        runtime.set_tick_rate(Some(f64::from(self.fps)));
        self.input.set_key_releases(runtime.key_releases());
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, _runtime: &mut Runtime, event: Event) {
        let Some(key) = event.as_key_event() else {
            return;
        };
        match self.input.handle_key(key) {
            Some(Action::Quit) => self.is_exiting = true,
            Some(Action::TogglePause) => self.input.toggle_pause(),
            _ => {}
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let hooks = self.game.presentation();
        let display = GameDisplay::new(&self.game)
            .paused(self.input.is_paused())
            .flash_on(hooks.flash_on())
            .banner(hooks.banner());
        let help_text = if self.input.is_paused() {
            "Controls: P/Esc (Resume) | Q (Quit)"
        } else {
            "Controls: ← → (Move) | ↓ (Soft Drop) | ↑/Space (Hard Drop) | Z X (Rotate) | P/Esc (Pause) | Q (Quit)"
        };
        let help_text = Text::from(help_text).style(view::HELP_TEXT).centered();

        let [main_area, help_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());
        frame.render_widget(display, main_area);
        frame.render_widget(help_text, help_area);
    }

    fn update(&mut self, _runtime: &mut Runtime, elapsed: Duration) {
        let frame = self.input.take_frame();
        self.game.tick(elapsed, &frame);
        if !frame.paused {
            self.game.presentation_mut().advance(elapsed);
        }
    }
}
