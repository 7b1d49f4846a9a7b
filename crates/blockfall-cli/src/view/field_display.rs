use std::iter;

use blockfall_engine::{ActivePiece, Coord, Field};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use super::{CellDisplay, CellView};

/// The field with the falling piece, its ghost, and any flashing rows drawn
/// over the locked cells.
#[derive(Debug)]
pub struct FieldDisplay<'a> {
    field: &'a Field,
    piece: Option<&'a ActivePiece>,
    ghost: bool,
    flash_rows: &'a [usize],
    block: Option<BlockWidget<'a>>,
}

impl<'a> FieldDisplay<'a> {
    pub fn new(field: &'a Field) -> Self {
        Self {
            field,
            piece: None,
            ghost: false,
            flash_rows: &[],
            block: None,
        }
    }

    pub fn piece(self, piece: Option<&'a ActivePiece>) -> Self {
        Self { piece, ..self }
    }

    pub fn ghost(self, ghost: bool) -> Self {
        Self { ghost, ..self }
    }

    pub fn flash_rows(self, flash_rows: &'a [usize]) -> Self {
        Self { flash_rows, ..self }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    /// Terminal size including the block.
    pub fn size(&self) -> (u16, u16) {
        super::grid_size(self.field.width(), self.field.height(), self.block.as_ref())
    }

    /// Cell views, bottom row first.
    fn cell_views(&self) -> Vec<Vec<CellView>> {
        let mut views: Vec<Vec<CellView>> = self
            .field
            .rows()
            .map(|row| row.cells().iter().copied().map(CellView::from).collect())
            .collect();
        let mut put = |coord: Coord, view: CellView| {
            let (Ok(x), Ok(y)) = (usize::try_from(coord.x), usize::try_from(coord.y)) else {
                return;
            };
            if let Some(cell) = views.get_mut(y).and_then(|row| row.get_mut(x)) {
                *cell = view;
            }
        };

        if let Some(piece) = self.piece {
            if self.ghost {
                let landing = piece.landing_position(self.field);
                for &cell in piece.cells() {
                    put(landing + cell, CellView::Ghost);
                }
            }
            for coord in piece.absolute_cells() {
                put(coord, CellView::Piece(piece.kind()));
            }
        }
        for &y in self.flash_rows {
            if let Some(row) = views.get_mut(y) {
                row.fill(CellView::Flash);
            }
        }
        views
    }
}

impl Widget for FieldDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &FieldDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints =
            (0..self.field.width()).map(|_| Constraint::Length(CellDisplay::WIDTH));
        let row_constraints =
            (0..self.field.height()).map(|_| Constraint::Length(CellDisplay::HEIGHT));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let grid_rows = area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal));

        // Screen rows go top-down, field rows bottom-up
        for (grid_row, row) in iter::zip(grid_rows, self.cell_views().into_iter().rev()) {
            for (grid_cell, view) in iter::zip(grid_row, row) {
                Widget::render(&CellDisplay::from_view(view, true), grid_cell, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use blockfall_engine::{Block, PieceKind, ShapeSet};

    use super::*;

    fn piece(field: &Field, kind: PieceKind) -> ActivePiece {
        let shapes = ShapeSet::standard();
        ActivePiece::spawn(
            shapes.get(kind).clone(),
            Coord::new(4, 18),
            Duration::from_secs(1),
            field,
        )
        .unwrap()
    }

    #[test]
    fn test_piece_and_ghost_overlay() {
        let field = Field::new(10, 20);
        let piece = piece(&field, PieceKind::O);
        let views = FieldDisplay::new(&field)
            .piece(Some(&piece))
            .ghost(true)
            .cell_views();

        for coord in piece.absolute_cells() {
            let (x, y) = (usize::try_from(coord.x).unwrap(), usize::try_from(coord.y).unwrap());
            assert_eq!(views[y][x], CellView::Piece(PieceKind::O));
        }
        let ghosts = views.iter().flatten().filter(|v| **v == CellView::Ghost).count();
        assert_eq!(ghosts, 4);
        assert!(views[0].contains(&CellView::Ghost));
        assert_eq!(field.occupied_count(), 0);
    }

    #[test]
    fn test_flash_rows_cover_locked_cells() {
        let mut field = Field::new(4, 4);
        field.commit([Coord::new(0, 1)], Block::Piece(PieceKind::T));
        let views = FieldDisplay::new(&field).flash_rows(&[1]).cell_views();
        assert_eq!(views[1], vec![CellView::Flash; 4]);
        assert_eq!(views[0], vec![CellView::Empty; 4]);
    }

    #[test]
    fn test_renders_top_row_first() {
        let mut field = Field::new(2, 3);
        field.commit([Coord::new(0, 2)], Block::Piece(PieceKind::I));
        let display = FieldDisplay::new(&field);
        let (width, height) = display.size();
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        display.render(area, &mut buf);
        let row_text = |y: u16| -> String { (0..width).map(|x| buf[(x, y)].symbol()).collect() };
        assert_eq!(buf[(0, 0)].bg, ratatui::style::Color::Cyan);
        assert_eq!(buf[(1, 0)].bg, ratatui::style::Color::Cyan);
        assert_eq!(row_text(0).matches('.').count(), 1);
        assert_eq!(row_text(2).matches('.').count(), 2);
    }
}
