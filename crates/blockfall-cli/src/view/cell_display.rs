use blockfall_engine::{Block, PieceKind};
use ratatui::{
    prelude::{Buffer, Rect},
    style::Style,
    widgets::{Paragraph, Widget},
};

use super::{EMPTY, EMPTY_DOT, FLASH, GHOST, piece_color, solid};

/// What one field cell shows on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    Empty,
    /// Where the falling piece would land.
    Ghost,
    /// Part of a row being cleared, highlight phase.
    Flash,
    Piece(PieceKind),
}

impl From<Block> for CellView {
    fn from(block: Block) -> Self {
        match block {
            Block::Empty => Self::Empty,
            Block::Piece(kind) => Self::Piece(kind),
        }
    }
}

#[derive(Debug)]
pub struct CellDisplay {
    style: Style,
    symbol: &'static str,
}

impl CellDisplay {
    /// Terminal columns per cell.
    pub const WIDTH: u16 = 2;
    /// Terminal rows per cell.
    pub const HEIGHT: u16 = 1;

    const fn new(style: Style, symbol: &'static str) -> Self {
        Self { style, symbol }
    }

    pub fn from_view(view: CellView, show_dots: bool) -> Self {
        match view {
            CellView::Empty if show_dots => Self::new(EMPTY_DOT, "."),
            CellView::Empty => Self::new(EMPTY, ""),
            CellView::Ghost => Self::new(GHOST, "[]"),
            CellView::Flash => Self::new(FLASH, ""),
            CellView::Piece(kind) => Self::new(solid(piece_color(kind)), ""),
        }
    }
}

impl Widget for &CellDisplay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill the whole area, not just the cells under the symbol
        Paragraph::new(self.symbol)
            .style(self.style)
            .centered()
            .render(area, buf);
    }
}
