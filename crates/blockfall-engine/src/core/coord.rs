use serde::{Deserialize, Serialize};

/// Integer coordinate on the field, or an offset relative to a piece anchor.
///
/// # Coordinate System
///
/// - `x` increases rightward (columns)
/// - `y` increases upward (rows); row 0 is the bottom row of the field
///
/// Coordinates are signed so that relative cell offsets, wall-kick translations,
/// and candidate positions outside the field can all be expressed with the same
/// type. [`Field`](super::field::Field) decides what is in bounds.
///
/// # Example
///
/// ```
/// use blockfall_engine::Coord;
///
/// let anchor = Coord::new(4, 18);
/// assert_eq!(anchor + Coord::DOWN, Coord::new(4, 17));
/// assert_eq!(-Coord::LEFT, Coord::RIGHT);
/// ```
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::Sub,
    derive_more::Neg,
    derive_more::Display,
)]
#[display("({x}, {y})")]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const ZERO: Self = Self::new(0, 0);
    pub const LEFT: Self = Self::new(-1, 0);
    pub const RIGHT: Self = Self::new(1, 0);
    pub const DOWN: Self = Self::new(0, -1);
    pub const UP: Self = Self::new(0, 1);

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise addition, `None` on overflow.
    ///
    /// ```
    /// use blockfall_engine::Coord;
    ///
    /// assert_eq!(Coord::new(1, 2).checked_add(Coord::DOWN), Some(Coord::new(1, 1)));
    /// assert_eq!(Coord::new(i32::MIN, 0).checked_add(Coord::LEFT), None);
    /// ```
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match (self.x.checked_add(other.x), self.y.checked_add(other.y)) {
            (Some(x), Some(y)) => Some(Self::new(x, y)),
            _ => None,
        }
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}
