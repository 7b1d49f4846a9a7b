use std::sync::Arc;

use arrayvec::ArrayVec;
use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::coord::Coord;

/// Maximum number of cells a shape may have.
pub const MAX_SHAPE_CELLS: usize = 4;

/// Relative cell offsets of a shape or an active piece.
pub type ShapeCells = ArrayVec<Coord, MAX_SHAPE_CELLS>;

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// S-piece.
    S = 3,
    /// Z-piece.
    Z = 4,
    /// J-piece.
    J = 5,
    /// L-piece.
    L = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All piece kinds in declaration order.
    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('S'), Some(PieceKind::S));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            _ => None,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Direction of a rotation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum RotationDirection {
    /// Counter-clockwise (-1).
    CounterClockwise,
    /// Clockwise (+1).
    Clockwise,
}

impl RotationDirection {
    /// Returns `+1` for clockwise and `-1` for counter-clockwise.
    #[must_use]
    pub const fn sign(self) -> i32 {
        match self {
            RotationDirection::CounterClockwise => -1,
            RotationDirection::Clockwise => 1,
        }
    }

    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            RotationDirection::CounterClockwise => RotationDirection::Clockwise,
            RotationDirection::Clockwise => RotationDirection::CounterClockwise,
        }
    }

    const fn factor(self) -> f32 {
        match self {
            RotationDirection::CounterClockwise => -1.0,
            RotationDirection::Clockwise => 1.0,
        }
    }
}

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise (90° counter-clockwise)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rotation(u8);

impl Rotation {
    pub const SPAWN: Self = Self(0);

    #[must_use]
    pub fn rotated(self, direction: RotationDirection) -> Self {
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let next = wrap(i32::from(self.0) + direction.sign(), 0, 4) as u8;
        Self(next)
    }

    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }
}

/// Maps any integer into `[min, max)` by modular arithmetic.
///
/// Unlike `%`, negative input wraps around from the top of the range.
///
/// ```
/// use blockfall_engine::wrap;
///
/// assert_eq!(wrap(5, 0, 4), 1);
/// assert_eq!(wrap(-1, 0, 4), 3);
/// assert_eq!(wrap(-8, 0, 8), 0);
/// ```
#[must_use]
pub fn wrap(value: i32, min: i32, max: i32) -> i32 {
    debug_assert!(min < max, "empty wrap range [{min}, {max})");
    min + (value - min).rem_euclid(max - min)
}

/// Numeric policy used when rotating a shape's relative cells.
///
/// Shapes with an even-width bounding box (I and O) rotate about a half-cell
/// pivot, all others about the anchor cell. Mixing the two up produces
/// off-by-one rotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationPolicy {
    /// Shift by (-0.5, -0.5), rotate, round toward positive infinity.
    HalfCellCeil,
    /// Rotate about the anchor cell, round to nearest.
    WholeCellRound,
}

/// 2D rotation matrix for a 90° turn: `[cos, sin, -sin, cos]`.
const ROTATION_MATRIX: [f32; 4] = [0.0, 1.0, -1.0, 0.0];

/// Rotates a single relative cell offset by 90° in `direction`.
///
/// ```
/// use blockfall_engine::{Coord, RotationDirection, RotationPolicy, rotate_cell};
///
/// // T-piece nub above the anchor turns to the right of it.
/// let cell = rotate_cell(Coord::new(0, 1), RotationDirection::Clockwise, RotationPolicy::WholeCellRound);
/// assert_eq!(cell, Coord::new(1, 0));
/// ```
#[must_use]
#[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn rotate_cell(cell: Coord, direction: RotationDirection, policy: RotationPolicy) -> Coord {
    let [m0, m1, m2, m3] = ROTATION_MATRIX;
    let d = direction.factor();
    match policy {
        RotationPolicy::HalfCellCeil => {
            let x = cell.x as f32 - 0.5;
            let y = cell.y as f32 - 0.5;
            Coord::new(
                (x * m0 * d + y * m1 * d).ceil() as i32,
                (x * m2 * d + y * m3 * d).ceil() as i32,
            )
        }
        RotationPolicy::WholeCellRound => {
            let x = cell.x as f32;
            let y = cell.y as f32;
            Coord::new(
                (x * m0 * d + y * m1 * d).round() as i32,
                (x * m2 * d + y * m3 * d).round() as i32,
            )
        }
    }
}

/// Construction-time validation failure of a [`TetrominoShape`] or [`ShapeSet`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ShapeError {
    #[display("{kind}-shape has no cells")]
    NoCells { kind: PieceKind },
    #[display("{kind}-shape has more than 4 cells")]
    TooManyCells { kind: PieceKind },
    #[display("{kind}-shape has an empty wall-kick table")]
    NoWallKicks { kind: PieceKind },
    #[display("{kind}-shape has no wall-kick candidates for transition {transition}")]
    NoKickCandidates { kind: PieceKind, transition: usize },
    #[display("shape set defines the {kind}-shape more than once")]
    DuplicateKind { kind: PieceKind },
    #[display("shape set is missing the {kind}-shape")]
    MissingKind { kind: PieceKind },
}

/// Static definition of one piece kind: cells at rotation state 0, wall kicks,
/// and rotation policy.
///
/// Immutable once constructed; active pieces share it through an [`Arc`].
///
/// # Wall-kick table
///
/// Row `2 * r` holds the candidates for a clockwise turn out of rotation state
/// `r`, row `2 * r - 1` (wrapped) those for a counter-clockwise turn. Candidates
/// are tried in order; the first one is normally `(0, 0)` so the in-place
/// rotation is attempted before any kick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TetrominoShape {
    kind: PieceKind,
    base_cells: ShapeCells,
    wall_kicks: Vec<Vec<Coord>>,
    policy: RotationPolicy,
}

impl TetrominoShape {
    /// Creates a shape, failing fast on malformed definitions.
    pub fn new<I>(
        kind: PieceKind,
        base_cells: I,
        wall_kicks: Vec<Vec<Coord>>,
        policy: RotationPolicy,
    ) -> Result<Self, ShapeError>
    where
        I: IntoIterator<Item = Coord>,
    {
        let mut cells = ShapeCells::new();
        for cell in base_cells {
            cells
                .try_push(cell)
                .map_err(|_| ShapeError::TooManyCells { kind })?;
        }
        let shape = Self {
            kind,
            base_cells: cells,
            wall_kicks,
            policy,
        };
        shape.validate()?;
        Ok(shape)
    }

    fn validate(&self) -> Result<(), ShapeError> {
        let kind = self.kind;
        if self.base_cells.is_empty() {
            return Err(ShapeError::NoCells { kind });
        }
        if self.wall_kicks.is_empty() {
            return Err(ShapeError::NoWallKicks { kind });
        }
        if let Some(transition) = self.wall_kicks.iter().position(Vec::is_empty) {
            return Err(ShapeError::NoKickCandidates { kind, transition });
        }
        Ok(())
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn base_cells(&self) -> &ShapeCells {
        &self.base_cells
    }

    #[must_use]
    pub fn policy(&self) -> RotationPolicy {
        self.policy
    }

    /// Returns the wall-kick candidates for rotating out of `rotation` in
    /// `direction`.
    #[must_use]
    pub fn kicks(&self, rotation: Rotation, direction: RotationDirection) -> &[Coord] {
        let mut index = i32::from(rotation.index()) * 2;
        if direction.is_counter_clockwise() {
            index -= 1;
        }
        #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let len = self.wall_kicks.len() as i32;
        #[expect(clippy::cast_sign_loss)]
        let index = wrap(index, 0, len) as usize;
        &self.wall_kicks[index]
    }
}

/// The full set of shapes a game draws from, one per [`PieceKind`].
#[derive(Debug, Clone)]
pub struct ShapeSet {
    shapes: [Arc<TetrominoShape>; PieceKind::LEN],
}

impl Default for ShapeSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl ShapeSet {
    /// The seven Super Rotation System shapes with the standard kick tables.
    #[must_use]
    pub fn standard() -> Self {
        let shapes = PieceKind::ALL.map(|kind| {
            let (cells, kicks, policy) = match kind {
                PieceKind::I => (I_CELLS, &WALL_KICKS_I, RotationPolicy::HalfCellCeil),
                PieceKind::O => (O_CELLS, &WALL_KICKS_JLOSTZ, RotationPolicy::HalfCellCeil),
                PieceKind::T => (T_CELLS, &WALL_KICKS_JLOSTZ, RotationPolicy::WholeCellRound),
                PieceKind::S => (S_CELLS, &WALL_KICKS_JLOSTZ, RotationPolicy::WholeCellRound),
                PieceKind::Z => (Z_CELLS, &WALL_KICKS_JLOSTZ, RotationPolicy::WholeCellRound),
                PieceKind::J => (J_CELLS, &WALL_KICKS_JLOSTZ, RotationPolicy::WholeCellRound),
                PieceKind::L => (L_CELLS, &WALL_KICKS_JLOSTZ, RotationPolicy::WholeCellRound),
            };
            Arc::new(TetrominoShape {
                kind,
                base_cells: cells.into_iter().collect(),
                wall_kicks: kicks.iter().map(|row| row.to_vec()).collect(),
                policy,
            })
        });
        Self { shapes }
    }

    /// Builds a set from custom shapes; every kind must appear exactly once.
    pub fn from_shapes<I>(shapes: I) -> Result<Self, ShapeError>
    where
        I: IntoIterator<Item = TetrominoShape>,
    {
        let mut slots: [Option<Arc<TetrominoShape>>; PieceKind::LEN] = Default::default();
        for shape in shapes {
            shape.validate()?;
            let kind = shape.kind;
            let slot = &mut slots[kind.index()];
            if slot.is_some() {
                return Err(ShapeError::DuplicateKind { kind });
            }
            *slot = Some(Arc::new(shape));
        }
        let mut shapes = ArrayVec::<_, { PieceKind::LEN }>::new();
        for (kind, slot) in PieceKind::ALL.into_iter().zip(slots) {
            shapes.push(slot.ok_or(ShapeError::MissingKind { kind })?);
        }
        let shapes = shapes.into_inner().map_err(|found| ShapeError::MissingKind {
            kind: PieceKind::ALL[found.len()],
        })?;
        Ok(Self { shapes })
    }

    #[must_use]
    pub fn get(&self, kind: PieceKind) -> &Arc<TetrominoShape> {
        &self.shapes[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<TetrominoShape>> + '_ {
        self.shapes.iter()
    }
}

const fn c(x: i32, y: i32) -> Coord {
    Coord::new(x, y)
}

const I_CELLS: [Coord; 4] = [c(-1, 1), c(0, 1), c(1, 1), c(2, 1)];
const O_CELLS: [Coord; 4] = [c(0, 1), c(1, 1), c(0, 0), c(1, 0)];
const T_CELLS: [Coord; 4] = [c(0, 1), c(-1, 0), c(0, 0), c(1, 0)];
const S_CELLS: [Coord; 4] = [c(0, 1), c(1, 1), c(-1, 0), c(0, 0)];
const Z_CELLS: [Coord; 4] = [c(-1, 1), c(0, 1), c(0, 0), c(1, 0)];
const J_CELLS: [Coord; 4] = [c(-1, 1), c(-1, 0), c(0, 0), c(1, 0)];
const L_CELLS: [Coord; 4] = [c(1, 1), c(-1, 0), c(0, 0), c(1, 0)];

// Rows: 0->R, R->0, R->2, 2->R, 2->L, L->2, L->0, 0->L
const WALL_KICKS_I: [[Coord; 5]; 8] = [
    [c(0, 0), c(-2, 0), c(1, 0), c(-2, -1), c(1, 2)],
    [c(0, 0), c(2, 0), c(-1, 0), c(2, 1), c(-1, -2)],
    [c(0, 0), c(-1, 0), c(2, 0), c(-1, 2), c(2, -1)],
    [c(0, 0), c(1, 0), c(-2, 0), c(1, -2), c(-2, 1)],
    [c(0, 0), c(2, 0), c(-1, 0), c(2, 1), c(-1, -2)],
    [c(0, 0), c(-2, 0), c(1, 0), c(-2, -1), c(1, 2)],
    [c(0, 0), c(1, 0), c(-2, 0), c(1, -2), c(-2, 1)],
    [c(0, 0), c(-1, 0), c(2, 0), c(-1, 2), c(2, -1)],
];

const WALL_KICKS_JLOSTZ: [[Coord; 5]; 8] = [
    [c(0, 0), c(-1, 0), c(-1, 1), c(0, -2), c(-1, -2)],
    [c(0, 0), c(1, 0), c(1, -1), c(0, 2), c(1, 2)],
    [c(0, 0), c(1, 0), c(1, -1), c(0, 2), c(1, 2)],
    [c(0, 0), c(-1, 0), c(-1, 1), c(0, -2), c(-1, -2)],
    [c(0, 0), c(1, 0), c(1, 1), c(0, -2), c(1, -2)],
    [c(0, 0), c(-1, 0), c(-1, -1), c(0, 2), c(-1, 2)],
    [c(0, 0), c(-1, 0), c(-1, -1), c(0, 2), c(-1, 2)],
    [c(0, 0), c(1, 0), c(1, 1), c(0, -2), c(1, -2)],
];
