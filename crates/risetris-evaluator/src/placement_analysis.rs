//! Board state after a candidate placement.
//!
//! [`PlacementAnalysis`] overlays a resting piece on a copy of the board and
//! wraps the result in a [`BoardAnalysis`]. Full rows are counted but left in
//! place, so the surface metrics describe the board as it looks at the moment
//! of locking.
//!
//! ```rust,ignore
//! let analysis = PlacementAnalysis::from_board(&board, placement);
//! let lines = analysis.cleared_lines();
//! let holes = analysis.board_analysis().num_holes();
//! ```

use risetris_engine::{Board, Piece};

use crate::board_analysis::BoardAnalysis;

#[derive(Debug)]
pub struct PlacementAnalysis {
    placement: Piece,
    cleared_lines: usize,
    board_analysis: BoardAnalysis,
}

impl PlacementAnalysis {
    /// Analyzes `placement` locked onto a copy of `before_placement`.
    ///
    /// The input board is never modified.
    #[must_use]
    pub fn from_board(before_placement: &Board, placement: Piece) -> Self {
        let mut board = before_placement.clone();
        board.fill_piece(&placement);
        let board_analysis = BoardAnalysis::new(board);

        Self {
            placement,
            cleared_lines: board_analysis.full_rows(),
            board_analysis,
        }
    }

    #[must_use]
    pub fn placement(&self) -> &Piece {
        &self.placement
    }

    #[must_use]
    pub fn cleared_lines(&self) -> usize {
        self.cleared_lines
    }

    #[must_use]
    pub fn board_analysis(&self) -> &BoardAnalysis {
        &self.board_analysis
    }
}
