use arrayvec::ArrayVec;

use super::{
    power_up_kind::PowerUpKind,
    shape::{PieceKind, Rgb, ShapeMatrix},
};

/// Maximum number of power-up tags a single piece can carry.
pub const MAX_PIECE_TAGS: usize = 4;

/// A falling piece: kind, current orientation, board position, and power-up tags.
///
/// Unlike board cells, a piece may sit partly above the visible board, so its
/// position is signed. Rotation and translation mutate the piece in place
/// without any bounds checking; the session validates against the board and
/// rolls back when needed.
///
/// # Example
///
/// ```
/// use risetris_engine::{Piece, PieceKind};
///
/// let mut piece = Piece::new(PieceKind::T, 10);
/// assert_eq!(piece.position(), (3, 0));
/// piece.rotate_clockwise();
/// piece.shift(1, 2);
/// assert_eq!(piece.position(), (4, 2));
/// assert_eq!(piece.rotation(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    shape: ShapeMatrix,
    rotation: u8,
    x: i32,
    y: i32,
    tags: ArrayVec<PieceTag, MAX_PIECE_TAGS>,
}

/// A power-up attached to one local cell of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceTag {
    pub local: (usize, usize),
    pub kind: PowerUpKind,
}

impl Piece {
    /// Creates a piece in spawn orientation, horizontally centered on a board
    /// of `board_width` columns, with its top row at `y = 0`.
    #[must_use]
    pub fn new(kind: PieceKind, board_width: usize) -> Self {
        let shape = kind.shape();
        Self {
            kind,
            shape,
            rotation: 0,
            x: spawn_x(board_width, shape.width()),
            y: 0,
            tags: ArrayVec::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn shape(&self) -> &ShapeMatrix {
        &self.shape
    }

    #[must_use]
    pub fn color(&self) -> Rgb {
        self.kind.color()
    }

    /// Number of clockwise quarter turns from spawn orientation, in `0..4`.
    #[must_use]
    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    #[must_use]
    pub fn x(&self) -> i32 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> i32 {
        self.y
    }

    #[must_use]
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub fn shift(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    pub fn rotate_clockwise(&mut self) {
        let height = self.shape.height();
        for tag in &mut self.tags {
            let (x, y) = tag.local;
            tag.local = (height - 1 - y, x);
        }
        self.shape = self.shape.rotated_clockwise();
        self.rotation = (self.rotation + 1) % 4;
    }

    pub fn rotate_counter_clockwise(&mut self) {
        let width = self.shape.width();
        for tag in &mut self.tags {
            let (x, y) = tag.local;
            tag.local = (y, width - 1 - x);
        }
        self.shape = self.shape.rotated_counter_clockwise();
        self.rotation = (self.rotation + 3) % 4;
    }

    /// Absolute board coordinates of every occupied cell.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .filled_cells()
            .map(move |(lx, ly)| (self.x + to_i32(lx), self.y + to_i32(ly)))
    }

    /// Local coordinates of every occupied cell.
    pub fn local_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.shape.filled_cells()
    }

    /// Tags the occupied local cell `local` with a power-up.
    ///
    /// Returns `false` if the cell is not occupied or the piece already carries
    /// the maximum number of tags. Re-tagging a cell replaces its kind.
    pub fn tag(&mut self, local: (usize, usize), kind: PowerUpKind) -> bool {
        if !self.shape.is_filled(local.0, local.1) {
            return false;
        }
        if let Some(tag) = self.tags.iter_mut().find(|t| t.local == local) {
            tag.kind = kind;
            return true;
        }
        self.tags.try_push(PieceTag { local, kind }).is_ok()
    }

    #[must_use]
    pub fn tags(&self) -> &[PieceTag] {
        &self.tags
    }

    /// Power-up carried by the cell at absolute board coordinate `(x, y)`.
    #[must_use]
    pub fn power_up_at(&self, x: i32, y: i32) -> Option<PowerUpKind> {
        self.tagged_cells()
            .find(|&(pos, _)| pos == (x, y))
            .map(|(_, kind)| kind)
    }

    /// Absolute board coordinates of every tagged cell, paired with its kind.
    pub fn tagged_cells(&self) -> impl Iterator<Item = ((i32, i32), PowerUpKind)> + '_ {
        self.tags.iter().map(move |tag| {
            let (lx, ly) = tag.local;
            ((self.x + to_i32(lx), self.y + to_i32(ly)), tag.kind)
        })
    }
}

fn spawn_x(board_width: usize, shape_width: usize) -> i32 {
    to_i32(board_width / 2) - to_i32(shape_width / 2)
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub(crate) fn to_i32(v: usize) -> i32 {
    v as i32
}
