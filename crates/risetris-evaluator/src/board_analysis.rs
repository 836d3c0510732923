use std::{cell::OnceCell, iter};

use risetris_engine::Board;

/// Lazily computed surface metrics of a board.
///
/// Each metric is computed on first access and cached, so a caller that only
/// needs the hole count never pays for bumpiness.
#[derive(Debug)]
pub struct BoardAnalysis {
    board: Board,
    column_heights: OnceCell<Vec<usize>>,
    column_occupied_cells: OnceCell<Vec<usize>>,
    total_height: OnceCell<usize>,
    num_holes: OnceCell<usize>,
    surface_bumpiness: OnceCell<usize>,
    near_complete_rows: OnceCell<usize>,
    full_rows: OnceCell<usize>,
}

impl BoardAnalysis {
    #[must_use]
    pub fn new(board: Board) -> Self {
        Self {
            board,
            column_heights: OnceCell::new(),
            column_occupied_cells: OnceCell::new(),
            total_height: OnceCell::new(),
            num_holes: OnceCell::new(),
            surface_bumpiness: OnceCell::new(),
            near_complete_rows: OnceCell::new(),
            full_rows: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Height of each column, measured from the floor to its topmost block.
    #[must_use]
    pub fn column_heights(&self) -> &[usize] {
        self.column_heights.get_or_init(|| {
            let height = self.board.height();
            (0..self.board.width())
                .map(|x| {
                    (0..height)
                        .find(|&y| !self.board.cell(x, y).is_empty())
                        .map_or(0, |top| height - top)
                })
                .collect()
        })
    }

    #[must_use]
    pub fn column_occupied_cells(&self) -> &[usize] {
        self.column_occupied_cells.get_or_init(|| {
            (0..self.board.width())
                .map(|x| {
                    self.board
                        .rows()
                        .iter()
                        .filter(|row| !row.cells()[x].is_empty())
                        .count()
                })
                .collect()
        })
    }

    #[must_use]
    pub fn total_height(&self) -> usize {
        *self
            .total_height
            .get_or_init(|| self.column_heights().iter().sum())
    }

    /// Empty cells with at least one block above them in the same column.
    #[must_use]
    pub fn num_holes(&self) -> usize {
        *self.num_holes.get_or_init(|| {
            iter::zip(self.column_heights(), self.column_occupied_cells())
                .map(|(h, occ)| h - occ)
                .sum()
        })
    }

    /// Sum of height differences between adjacent columns.
    #[must_use]
    pub fn surface_bumpiness(&self) -> usize {
        *self.surface_bumpiness.get_or_init(|| {
            self.column_heights()
                .windows(2)
                .map(|w| w[0].abs_diff(w[1]))
                .sum()
        })
    }

    /// Rows missing exactly one block.
    #[must_use]
    pub fn near_complete_rows(&self) -> usize {
        *self.near_complete_rows.get_or_init(|| {
            let width = self.board.width();
            self.board
                .rows()
                .iter()
                .filter(|row| row.filled_count() + 1 == width)
                .count()
        })
    }

    #[must_use]
    pub fn full_rows(&self) -> usize {
        *self
            .full_rows
            .get_or_init(|| self.board.rows().iter().filter(|row| row.is_filled()).count())
    }
}
