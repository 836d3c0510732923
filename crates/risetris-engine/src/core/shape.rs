use std::{fmt, str::FromStr};

use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use crate::InvalidShapeKind;

/// One of the seven canonical tetromino kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
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
    /// Number of piece kinds (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        Self::I,
        Self::O,
        Self::T,
        Self::S,
        Self::Z,
        Self::J,
        Self::L,
    ];

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use risetris_engine::PieceKind;
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
    /// use risetris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('L').unwrap(), PieceKind::L);
    /// assert!(PieceKind::from_char('X').is_err());
    /// ```
    pub fn from_char(c: char) -> Result<Self, InvalidShapeKind> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_char() == c)
            .ok_or_else(|| InvalidShapeKind::new(c))
    }

    /// Returns the spawn-orientation shape matrix.
    #[must_use]
    pub const fn shape(self) -> ShapeMatrix {
        const X: bool = true;
        const E: bool = false;
        match self {
            PieceKind::I => ShapeMatrix::from_rows(4, 1, [[X, X, X, X], [E; 4], [E; 4], [E; 4]]),
            PieceKind::O => ShapeMatrix::from_rows(2, 2, [[X, X, E, E], [X, X, E, E], [E; 4], [E; 4]]),
            PieceKind::T => ShapeMatrix::from_rows(3, 2, [[E, X, E, E], [X, X, X, E], [E; 4], [E; 4]]),
            PieceKind::S => ShapeMatrix::from_rows(3, 2, [[E, X, X, E], [X, X, E, E], [E; 4], [E; 4]]),
            PieceKind::Z => ShapeMatrix::from_rows(3, 2, [[X, X, E, E], [E, X, X, E], [E; 4], [E; 4]]),
            PieceKind::J => ShapeMatrix::from_rows(3, 2, [[X, E, E, E], [X, X, X, E], [E; 4], [E; 4]]),
            PieceKind::L => ShapeMatrix::from_rows(3, 2, [[E, E, X, E], [X, X, X, E], [E; 4], [E; 4]]),
        }
    }

    #[must_use]
    pub const fn color(self) -> Rgb {
        match self {
            PieceKind::I => Rgb::new(0, 255, 255),
            PieceKind::O => Rgb::new(255, 255, 0),
            PieceKind::T => Rgb::new(128, 0, 128),
            PieceKind::S => Rgb::new(0, 255, 0),
            PieceKind::Z => Rgb::new(255, 0, 0),
            PieceKind::J => Rgb::new(0, 0, 255),
            PieceKind::L => Rgb::new(255, 165, 0),
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for PieceKind {
    type Err = InvalidShapeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c.to_ascii_uppercase()),
            _ => Err(InvalidShapeKind::new(s)),
        }
    }
}

/// Display color of a block, as an opaque RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Color reserved for blocks inserted by rising lines.
    pub const RISING: Self = Self::new(80, 80, 80);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Boolean occupancy matrix of a piece in one orientation.
///
/// Cells are addressed as `cells[y][x]` inside a `width × height` box anchored
/// at the top-left; entries outside that box are always `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeMatrix {
    width: usize,
    height: usize,
    cells: [[bool; 4]; 4],
}

impl ShapeMatrix {
    const fn from_rows(width: usize, height: usize, cells: [[bool; 4]; 4]) -> Self {
        Self {
            width,
            height,
            cells,
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

    #[must_use]
    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y][x]
    }

    /// Local `(x, y)` coordinates of every filled cell, row-major.
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).filter_map(move |x| self.cells[y][x].then_some((x, y)))
        })
    }

    /// Rotates 90° clockwise: transpose, then reverse each row.
    #[must_use]
    pub fn rotated_clockwise(&self) -> Self {
        let mut cells = [[false; 4]; 4];
        for (y, row) in cells.iter_mut().enumerate().take(self.width) {
            for (x, cell) in row.iter_mut().enumerate().take(self.height) {
                *cell = self.cells[self.height - 1 - x][y];
            }
        }
        Self::from_rows(self.height, self.width, cells)
    }

    /// Rotates 90° counter-clockwise: transpose, then reverse each column.
    #[must_use]
    pub fn rotated_counter_clockwise(&self) -> Self {
        let mut cells = [[false; 4]; 4];
        for (y, row) in cells.iter_mut().enumerate().take(self.width) {
            for (x, cell) in row.iter_mut().enumerate().take(self.height) {
                *cell = self.cells[x][self.width - 1 - y];
            }
        }
        Self::from_rows(self.height, self.width, cells)
    }
}
