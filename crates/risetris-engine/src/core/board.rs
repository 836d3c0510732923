use std::{collections::BTreeSet, fmt};

use crate::GridOverflowError;

use super::{
    piece::Piece,
    shape::{PieceKind, Rgb},
};

/// A single cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Block {
    /// Empty cell.
    #[default]
    Empty,
    /// Locked cell of a specific piece kind.
    Piece(PieceKind),
    /// Cell inserted by a rising line.
    Rising,
}

impl Block {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Block::Empty
    }

    #[must_use]
    pub fn color(self) -> Option<Rgb> {
        match self {
            Block::Empty => None,
            Block::Piece(kind) => Some(kind.color()),
            Block::Rising => Some(Rgb::RISING),
        }
    }

    fn as_char(self) -> char {
        match self {
            Block::Empty => '.',
            Block::Piece(kind) => kind.as_char(),
            Block::Rising => '#',
        }
    }
}

/// One row of the board; always exactly as wide as the board it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRow {
    cells: Vec<Block>,
}

impl BlockRow {
    #[must_use]
    pub fn empty(width: usize) -> Self {
        Self {
            cells: vec![Block::Empty; width],
        }
    }

    #[must_use]
    pub fn filled(width: usize, block: Block) -> Self {
        Self {
            cells: vec![block; width],
        }
    }

    #[must_use]
    pub fn cells(&self) -> &[Block] {
        &self.cells
    }

    pub fn set(&mut self, x: usize, block: Block) {
        self.cells[x] = block;
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.cells.iter().all(|b| !b.is_empty())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|b| b.is_empty())
    }

    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|b| !b.is_empty()).count()
    }

    #[must_use]
    pub fn hole_count(&self) -> usize {
        self.cells.len() - self.filled_count()
    }
}

/// The grid of locked cells.
///
/// Row 0 is the top of the board and `y` grows downward. Dimensions are fixed
/// at construction and every row always holds exactly `width` cells.
///
/// Pieces may extend above row 0 (negative `y`); such cells are never stored.
///
/// # Example
///
/// ```
/// use risetris_engine::{Board, Piece, PieceKind};
///
/// let mut board = Board::new(10, 20);
/// let mut piece = Piece::new(PieceKind::I, 10);
/// piece.shift(0, board.drop_distance(&piece, false));
/// board.fill_piece(&piece);
/// assert_eq!(board.row(19).filled_count(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    rows: Vec<BlockRow>,
}

impl Board {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rows: vec![BlockRow::empty(width); height],
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
    pub fn rows(&self) -> &[BlockRow] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, y: usize) -> &BlockRow {
        &self.rows[y]
    }

    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Block {
        self.rows[y].cells[x]
    }

    pub fn set_cell(&mut self, x: usize, y: usize, block: Block) {
        self.rows[y].cells[x] = block;
    }

    /// Returns `true` if `(x, y)` lies on the board and holds a block.
    #[must_use]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        match (usize::try_from(x), usize::try_from(y)) {
            (Ok(x), Ok(y)) if x < self.width && y < self.height => !self.cell(x, y).is_empty(),
            _ => false,
        }
    }

    /// Checks whether `piece`, offset by `(dx, dy)`, fits on the board.
    ///
    /// Cells left of column 0, right of the last column, or below the last row
    /// are rejected. Cells above row 0 are always accepted. Cells on the board
    /// are rejected when occupied, unless `phantom` is set.
    #[must_use]
    pub fn is_valid_placement(&self, piece: &Piece, dx: i32, dy: i32, phantom: bool) -> bool {
        piece.occupied_cells().all(|(x, y)| {
            let (x, y) = (x + dx, y + dy);
            let Ok(col) = usize::try_from(x) else {
                return false;
            };
            if col >= self.width {
                return false;
            }
            let Ok(row) = usize::try_from(y) else {
                return true;
            };
            row < self.height && (phantom || self.cell(col, row).is_empty())
        })
    }

    /// Number of rows `piece` can fall straight down from its current position.
    #[must_use]
    pub fn drop_distance(&self, piece: &Piece, phantom: bool) -> i32 {
        let mut dy = 0;
        while self.is_valid_placement(piece, 0, dy + 1, phantom) {
            dy += 1;
        }
        dy
    }

    /// Writes `block` at every coordinate; coordinates off the board are skipped.
    pub fn place_cells<I>(&mut self, cells: I, block: Block)
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        for (x, y) in cells {
            if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y))
                && x < self.width
                && y < self.height
            {
                self.rows[y].cells[x] = block;
            }
        }
    }

    /// Locks the piece's cells into the board.
    pub fn fill_piece(&mut self, piece: &Piece) {
        self.place_cells(piece.occupied_cells(), Block::Piece(piece.kind()));
    }

    /// Indices of every completely filled row, top to bottom.
    #[must_use]
    pub fn find_full_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(y, row)| row.is_filled().then_some(y))
            .collect()
    }

    /// Removes the given rows and prepends as many empty rows at the top.
    ///
    /// Surviving rows keep their relative order. Indices may be given in any
    /// order; duplicates and out-of-range indices are ignored.
    pub fn remove_rows(&mut self, rows: &[usize]) {
        let remove = rows
            .iter()
            .copied()
            .filter(|&y| y < self.height)
            .collect::<BTreeSet<_>>();
        if remove.is_empty() {
            return;
        }
        let mut new_rows = vec![BlockRow::empty(self.width); remove.len()];
        new_rows.extend(
            self.rows
                .drain(..)
                .enumerate()
                .filter_map(|(y, row)| (!remove.contains(&y)).then_some(row)),
        );
        self.rows = new_rows;
    }

    /// Returns `true` if inserting a rising row would push blocks off the top.
    #[must_use]
    pub fn would_overflow_on_rise(&self) -> bool {
        !self.rows[0].is_empty()
    }

    /// Drops row 0 and appends `row` at the bottom.
    ///
    /// Fails without touching the board if row 0 holds any block.
    pub fn insert_rising_row(&mut self, row: BlockRow) -> Result<(), GridOverflowError> {
        assert_eq!(row.cells.len(), self.width, "rising row width mismatch");
        if self.would_overflow_on_rise() {
            return Err(GridOverflowError);
        }
        self.rows.remove(0);
        self.rows.push(row);
        Ok(())
    }

    /// Index of the lowest row holding any block.
    #[must_use]
    pub fn bottom_non_empty_row(&self) -> Option<usize> {
        self.rows.iter().rposition(|row| !row.is_empty())
    }

    /// Creates a board from ASCII art for testing.
    ///
    /// `.` is an empty cell, `#` a rising-line block, and a piece letter
    /// (`I`, `O`, `T`, `S`, `Z`, `J`, `L`) a locked block of that kind. Every
    /// line must be `width` cells wide. Lines are aligned to the bottom of the
    /// board, so the last line is row `height - 1`.
    #[must_use]
    pub fn from_ascii(width: usize, height: usize, art: &str) -> Self {
        let mut board = Self::new(width, height);
        let lines = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();
        assert!(
            lines.len() <= height,
            "art has {} rows, board only {height}",
            lines.len()
        );
        let top = height - lines.len();
        for (i, line) in lines.iter().enumerate() {
            let cells = line
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| match c {
                    '.' => Block::Empty,
                    '#' => Block::Rising,
                    c => Block::Piece(
                        PieceKind::from_char(c).unwrap_or_else(|e| panic!("row {i}: {e}")),
                    ),
                })
                .collect::<Vec<_>>();
            assert_eq!(
                cells.len(),
                width,
                "Each row must have exactly {width} cells, got {} at row {i}",
                cells.len()
            );
            board.rows[top + i] = BlockRow { cells };
        }
        board
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for block in &row.cells {
                write!(f, "{}", block.as_char())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
