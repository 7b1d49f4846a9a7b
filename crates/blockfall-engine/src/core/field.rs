use serde::{Deserialize, Serialize};

use super::{coord::Coord, shape::PieceKind};

/// A single cell of the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, derive_more::IsVariant)]
pub enum Block {
    /// Empty cell (no piece).
    #[default]
    Empty,
    /// Locked cell, tagged with the kind of the piece that left it.
    Piece(PieceKind),
}

/// One row of the field, `width` cells wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRow {
    cells: Box<[Block]>,
}

impl FieldRow {
    fn empty(width: usize) -> Self {
        Self {
            cells: vec![Block::Empty; width].into_boxed_slice(),
        }
    }

    /// Returns the cells of the row, left to right.
    #[must_use]
    pub fn cells(&self) -> &[Block] {
        &self.cells
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.cells.iter().all(|b| !b.is_empty())
    }

    fn clear(&mut self) {
        self.cells.fill(Block::Empty);
    }
}

/// Authoritative grid of locked cells.
///
/// Rows are stored bottom-up: row 0 is the floor, row `height - 1` the top.
/// Every stored cell lies within `[0, width) x [0, height)`; coordinates outside
/// that range are never occupied and never valid placements.
///
/// The falling piece is not part of the field. It is kept as an overlay and only
/// written here when it locks.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Block, Coord, Field, PieceKind};
///
/// let mut field = Field::new(10, 20);
/// let cells = [Coord::new(0, 0), Coord::new(1, 0)];
/// assert!(field.is_valid_placement(cells));
///
/// field.commit(cells, Block::Piece(PieceKind::O));
/// assert!(field.is_occupied(Coord::new(1, 0)));
/// assert!(!field.is_valid_placement(cells));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    width: usize,
    height: usize,
    rows: Vec<FieldRow>,
}

impl Field {
    /// Creates an empty field.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rows: (0..height).map(|_| FieldRow::empty(width)).collect(),
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Converts a coordinate into `(column, row)` indices, or `None` if it lies
    /// outside the field.
    fn index(&self, coord: Coord) -> Option<(usize, usize)> {
        let x = usize::try_from(coord.x).ok().filter(|&x| x < self.width)?;
        let y = usize::try_from(coord.y).ok().filter(|&y| y < self.height)?;
        Some((x, y))
    }

    /// Returns `true` if `coord` lies within the field bounds.
    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        self.index(coord).is_some()
    }

    /// Returns the block stored at `coord`; out-of-bounds reads are empty.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Block {
        self.index(coord)
            .map_or(Block::Empty, |(x, y)| self.rows[y].cells[x])
    }

    /// Returns `true` if `coord` is in bounds and holds a locked cell.
    #[must_use]
    pub fn is_occupied(&self, coord: Coord) -> bool {
        !self.get(coord).is_empty()
    }

    /// Returns `true` iff every coordinate is within bounds and unoccupied.
    pub fn is_valid_placement<I>(&self, cells: I) -> bool
    where
        I: IntoIterator<Item = Coord>,
    {
        cells.into_iter().all(|coord| {
            self.index(coord)
                .is_some_and(|(x, y)| self.rows[y].cells[x].is_empty())
        })
    }

    /// Writes `block` into each coordinate.
    ///
    /// No collision check is performed; callers validate with
    /// [`Self::is_valid_placement`] first. Out-of-bounds coordinates are skipped.
    pub fn commit<I>(&mut self, cells: I, block: Block)
    where
        I: IntoIterator<Item = Coord>,
    {
        for coord in cells {
            if let Some((x, y)) = self.index(coord) {
                self.rows[y].cells[x] = block;
            }
        }
    }

    /// Empties each coordinate. Out-of-bounds coordinates are skipped.
    pub fn erase<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = Coord>,
    {
        self.commit(cells, Block::Empty);
    }

    /// Returns the indices of all completely filled rows, in ascending order.
    #[must_use]
    pub fn find_full_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_filled())
            .map(|(y, _)| y)
            .collect()
    }

    /// Removes the given rows and lets everything above them fall down.
    ///
    /// `rows` must be ascending. The `i`-th listed row is removed at index
    /// `row - i`, since the `i` rows below it have already been removed and
    /// everything above shifted down. The result equals deleting all listed
    /// rows at once and stacking the survivors from the bottom, whether the
    /// rows are contiguous or not. Each removal adds an empty row on top.
    pub fn clear_and_compact(&mut self, rows: &[usize]) {
        debug_assert!(
            rows.windows(2).all(|w| w[0] < w[1]),
            "rows must be strictly ascending: {rows:?}"
        );
        for (i, &row) in rows.iter().enumerate() {
            let Some(effective) = row.checked_sub(i).filter(|&y| y < self.rows.len()) else {
                continue;
            };
            let mut removed = self.rows.remove(effective);
            removed.clear();
            self.rows.push(removed);
        }
    }

    /// Empties the entire grid.
    pub fn reset(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
    }

    /// Returns the rows bottom-up.
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &FieldRow> + ExactSizeIterator {
        self.rows.iter()
    }

    /// Iterates over every occupied cell with its coordinate.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (Coord, PieceKind)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.cells.iter().enumerate().filter_map(move |(x, block)| match *block {
                Block::Empty => None,
                #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                Block::Piece(kind) => Some((Coord::new(x as i32, y as i32), kind)),
            })
        })
    }

    /// Counts the occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.occupied_cells().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARK_A: Block = Block::Piece(PieceKind::T);
    const MARK_B: Block = Block::Piece(PieceKind::S);
    const MARK_C: Block = Block::Piece(PieceKind::Z);
    const MARK_D: Block = Block::Piece(PieceKind::J);
    const FILL: Block = Block::Piece(PieceKind::I);

    fn fill_row(field: &mut Field, y: i32) {
        let width = i32::try_from(field.width()).unwrap();
        field.commit((0..width).map(|x| Coord::new(x, y)), FILL);
    }

    #[test]
    fn test_new_field_is_empty() {
        let field = Field::new(10, 20);
        assert_eq!(field.width(), 10);
        assert_eq!(field.height(), 20);
        assert_eq!(field.rows().len(), 20);
        assert_eq!(field.occupied_count(), 0);
    }

    #[test]
    fn test_out_of_bounds_is_not_occupied_and_not_valid() {
        let field = Field::new(10, 20);
        for coord in [
            Coord::new(-1, 0),
            Coord::new(10, 0),
            Coord::new(0, -1),
            Coord::new(0, 20),
        ] {
            assert!(!field.is_occupied(coord), "{coord}");
            assert!(!field.is_valid_placement([coord]), "{coord}");
        }
        assert!(field.is_valid_placement([Coord::new(0, 0), Coord::new(9, 19)]));
    }

    #[test]
    fn test_commit_and_erase() {
        let mut field = Field::new(4, 4);
        let cells = [Coord::new(1, 1), Coord::new(2, 1)];
        field.commit(cells, MARK_A);
        assert_eq!(field.get(Coord::new(1, 1)), MARK_A);
        assert_eq!(field.occupied_count(), 2);

        field.erase(cells);
        assert_eq!(field.occupied_count(), 0);
    }

    #[test]
    fn test_commit_ignores_out_of_bounds() {
        let mut field = Field::new(4, 4);
        field.commit([Coord::new(-1, 0), Coord::new(0, 4)], MARK_A);
        assert_eq!(field.occupied_count(), 0);
    }

    #[test]
    fn test_find_full_rows_on_empty_field() {
        let field = Field::new(10, 20);
        assert!(field.find_full_rows().is_empty());
    }

    #[test]
    fn test_find_full_rows_single_row() {
        let mut field = Field::new(10, 20);
        fill_row(&mut field, 7);
        assert_eq!(field.find_full_rows(), vec![7]);
    }

    #[test]
    fn test_find_full_rows_ignores_partial_rows() {
        let mut field = Field::new(10, 20);
        fill_row(&mut field, 0);
        fill_row(&mut field, 3);
        fill_row(&mut field, 4);
        field.erase([Coord::new(5, 4)]);
        assert_eq!(field.find_full_rows(), vec![0, 3]);
    }

    #[test]
    fn test_clear_and_compact_scattered_rows() {
        let mut field = Field::new(10, 6);
        field.commit([Coord::new(0, 0)], MARK_A);
        field.commit([Coord::new(1, 1)], MARK_B);
        fill_row(&mut field, 2);
        field.commit([Coord::new(3, 3)], MARK_C);
        fill_row(&mut field, 4);
        field.commit([Coord::new(5, 5)], MARK_D);

        let rows = field.find_full_rows();
        assert_eq!(rows, vec![2, 4]);
        field.clear_and_compact(&rows);

        assert_eq!(field.get(Coord::new(0, 0)), MARK_A);
        assert_eq!(field.get(Coord::new(1, 1)), MARK_B);
        assert_eq!(field.get(Coord::new(3, 2)), MARK_C);
        assert_eq!(field.get(Coord::new(5, 3)), MARK_D);
        assert_eq!(field.occupied_count(), 4);
        for row in field.rows().skip(4) {
            assert!(row.cells().iter().all(|b| b.is_empty()));
        }
    }

    #[test]
    fn test_clear_and_compact_contiguous_rows() {
        let mut field = Field::new(4, 8);
        field.commit([Coord::new(0, 0)], MARK_A);
        for y in 1..5 {
            fill_row(&mut field, y);
        }
        field.commit([Coord::new(2, 5)], MARK_B);
        field.commit([Coord::new(3, 7)], MARK_C);

        let rows = field.find_full_rows();
        assert_eq!(rows, vec![1, 2, 3, 4]);
        field.clear_and_compact(&rows);

        assert_eq!(field.get(Coord::new(0, 0)), MARK_A);
        assert_eq!(field.get(Coord::new(2, 1)), MARK_B);
        assert_eq!(field.get(Coord::new(3, 3)), MARK_C);
        assert_eq!(field.occupied_count(), 3);
        assert_eq!(field.rows().len(), 8);
    }

    #[test]
    fn test_clear_and_compact_top_row() {
        let mut field = Field::new(4, 4);
        field.commit([Coord::new(0, 2)], MARK_A);
        fill_row(&mut field, 3);
        field.clear_and_compact(&[3]);
        assert_eq!(field.get(Coord::new(0, 2)), MARK_A);
        assert_eq!(field.occupied_count(), 1);
    }

    #[test]
    fn test_clear_and_compact_all_rows() {
        let mut field = Field::new(3, 3);
        for y in 0..3 {
            fill_row(&mut field, y);
        }
        field.clear_and_compact(&[0, 1, 2]);
        assert_eq!(field.occupied_count(), 0);
        assert_eq!(field.rows().len(), 3);
    }

    #[test]
    fn test_reset_empties_everything() {
        let mut field = Field::new(10, 20);
        fill_row(&mut field, 0);
        field.commit([Coord::new(4, 10)], MARK_A);
        field.reset();
        assert_eq!(field, Field::new(10, 20));
    }
}
