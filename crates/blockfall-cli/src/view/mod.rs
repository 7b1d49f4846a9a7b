//! Terminal widgets for a running game.

use blockfall_engine::PieceKind;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Block as BlockWidget,
};

pub use self::{
    cell_display::*, field_display::*, game_display::*, next_display::*, stats_display::*,
};

mod cell_display;
mod field_display;
mod game_display;
mod next_display;
mod stats_display;

const TEXT: Style = Style::new().fg(Color::White).bg(Color::Black);
pub const HELP_TEXT: Style = Style::new().fg(Color::DarkGray);
const EMPTY: Style = solid(Color::Black);
const EMPTY_DOT: Style = Style::new().fg(Color::DarkGray).bg(Color::Black);
const GHOST: Style = Style::new().fg(Color::Gray).bg(Color::Black);
const FLASH: Style = solid(Color::White);

const fn solid(color: Color) -> Style {
    Style::new().fg(color).bg(color)
}

/// Guideline colors; orange has no named terminal color.
const fn piece_color(kind: PieceKind) -> Color {
    match kind {
        PieceKind::I => Color::Cyan,
        PieceKind::O => Color::Yellow,
        PieceKind::T => Color::Magenta,
        PieceKind::S => Color::Green,
        PieceKind::Z => Color::Red,
        PieceKind::J => Color::Blue,
        PieceKind::L => Color::Rgb(255, 140, 0),
    }
}

/// Columns and rows taken by the borders and padding of `block`.
fn block_margin(block: Option<&BlockWidget>) -> (u16, u16) {
    let outer = Rect::new(0, 0, u16::MAX / 2, u16::MAX / 2);
    let inner = block.map_or(outer, |block| block.inner(outer));
    (outer.width - inner.width, outer.height - inner.height)
}

/// Terminal size of a `cols` x `rows` grid of cells inside `block`.
fn grid_size(cols: usize, rows: usize, block: Option<&BlockWidget>) -> (u16, u16) {
    let to_u16 = |n: usize| u16::try_from(n).unwrap_or(u16::MAX);
    let (margin_x, margin_y) = block_margin(block);
    (
        to_u16(cols)
            .saturating_mul(CellDisplay::WIDTH)
            .saturating_add(margin_x),
        to_u16(rows)
            .saturating_mul(CellDisplay::HEIGHT)
            .saturating_add(margin_y),
    )
}
