use blockfall_engine::TetrominoShape;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use super::{CellDisplay, CellView};

/// Preview of the next piece in its spawn orientation.
#[derive(Debug)]
pub struct NextDisplay<'a> {
    shape: &'a TetrominoShape,
    block: Option<BlockWidget<'a>>,
}

impl<'a> NextDisplay<'a> {
    pub fn new(shape: &'a TetrominoShape) -> Self {
        Self { shape, block: None }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    /// Terminal size including the block; fits any standard piece.
    pub fn size(&self) -> (u16, u16) {
        super::grid_size(4, 2, self.block.as_ref())
    }

    /// Occupancy of the shape's bounding box, top row first.
    fn grid(&self) -> Vec<Vec<bool>> {
        let cells = self.shape.base_cells();
        let (Some(min_x), Some(max_x), Some(min_y), Some(max_y)) = (
            cells.iter().map(|c| c.x).min(),
            cells.iter().map(|c| c.x).max(),
            cells.iter().map(|c| c.y).min(),
            cells.iter().map(|c| c.y).max(),
        ) else {
            return vec![];
        };
        (min_y..=max_y)
            .rev()
            .map(|y| {
                (min_x..=max_x)
                    .map(|x| cells.iter().any(|c| c.x == x && c.y == y))
                    .collect()
            })
            .collect()
    }
}

impl Widget for NextDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &NextDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let grid = self.grid();
        let rows = grid.len();
        let cols = grid.first().map_or(0, Vec::len);
        let (piece_width, piece_height) = super::grid_size(cols, rows, None);
        let piece_area = area.centered(
            Constraint::Length(piece_width),
            Constraint::Length(piece_height),
        );

        let col_constraints = (0..cols).map(|_| Constraint::Length(CellDisplay::WIDTH));
        let row_constraints = (0..rows).map(|_| Constraint::Length(CellDisplay::HEIGHT));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);
        let grid_rows = piece_area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal));

        let empty = CellDisplay::from_view(CellView::Empty, false);
        let occupied = CellDisplay::from_view(CellView::Piece(self.shape.kind()), false);
        for (grid_row, row) in grid_rows.zip(grid) {
            for (grid_cell, is_occupied) in grid_row.into_iter().zip(row) {
                let cell = if is_occupied { &occupied } else { &empty };
                Widget::render(cell, grid_cell, buf);
            }
        }
    }
}
