use blockfall_engine::InputFrame;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

/// What a key does in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateLeft,
    RotateRight,
    TogglePause,
    Quit,
}

impl Action {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        let action = match code {
            KeyCode::Left => Self::MoveLeft,
            KeyCode::Right => Self::MoveRight,
            KeyCode::Down => Self::SoftDrop,
            KeyCode::Up | KeyCode::Char(' ') => Self::HardDrop,
            KeyCode::Char('z') => Self::RotateLeft,
            KeyCode::Char('x') => Self::RotateRight,
            KeyCode::Char('p') | KeyCode::Esc => Self::TogglePause,
            KeyCode::Char('q') => Self::Quit,
            _ => return None,
        };
        Some(action)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct HeldKey {
    /// Down according to press/release events.
    down: bool,
    /// Pressed at least once since the last frame.
    pulse: bool,
}

impl HeldKey {
    fn is_held(self) -> bool {
        self.down || self.pulse
    }
}

/// Turns terminal key events into one [`InputFrame`] per tick.
///
/// Terminals that report key releases give real held keys for horizontal
/// movement. Elsewhere every press (including the terminal's own key repeat)
/// counts as holding the key for a single tick.
#[derive(Debug, Default)]
pub struct InputController {
    key_releases: bool,
    left: HeldKey,
    right: HeldKey,
    pending: InputFrame,
    paused: bool,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key_releases(&mut self, key_releases: bool) {
        self.key_releases = key_releases;
        self.left = HeldKey::default();
        self.right = HeldKey::default();
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        self.left = HeldKey::default();
        self.right = HeldKey::default();
        self.pending = InputFrame::IDLE;
    }

    /// Records a key event and returns the action it maps to, if any.
    ///
    /// Game actions are swallowed while paused.
    pub fn handle_key(&mut self, event: KeyEvent) -> Option<Action> {
        let action = Action::from_key(event.code)?;
        if event.kind == KeyEventKind::Release {
            match action {
                Action::MoveLeft => self.left.down = false,
                Action::MoveRight => self.right.down = false,
                _ => {}
            }
            return None;
        }

        let is_repeat = event.kind == KeyEventKind::Repeat;
        match action {
            Action::TogglePause | Action::Quit => {
                return (!is_repeat).then_some(action);
            }
            _ if self.paused => return None,
            Action::MoveLeft => self.press_horizontal(true),
            Action::MoveRight => self.press_horizontal(false),
            Action::SoftDrop => self.pending.soft_drop = true,
            Action::HardDrop if !is_repeat => self.pending.hard_drop = true,
            Action::RotateLeft if !is_repeat => self.pending.rotate_left = true,
            Action::RotateRight if !is_repeat => self.pending.rotate_right = true,
            Action::HardDrop | Action::RotateLeft | Action::RotateRight => {}
        }
        Some(action)
    }

    fn press_horizontal(&mut self, left: bool) {
        let (key, other) = if left {
            (&mut self.left, &mut self.right)
        } else {
            (&mut self.right, &mut self.left)
        };
        if self.key_releases {
            key.down = true;
        } else {
            key.pulse = true;
            // Without release events the other key may never be seen going up.
            *other = HeldKey::default();
        }
    }

    /// Input for the next tick; clears all edge signals.
    pub fn take_frame(&mut self) -> InputFrame {
        let frame = InputFrame {
            move_left: self.left.is_held(),
            move_right: self.right.is_held(),
            paused: self.paused,
            ..std::mem::take(&mut self.pending)
        };
        self.left.pulse = false;
        self.right.pulse = false;
        frame
    }
}
