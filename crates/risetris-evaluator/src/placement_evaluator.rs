//! Placement evaluation: scoring a single piece placement.
//!
//! The [`HeuristicPlacementEvaluator`] scores the board a placement leaves
//! behind as a weighted sum of a few classic surface metrics:
//!
//! ```text
//! score = clear_bonus[lines]
//!       + height        · Σ column heights
//!       + holes         · hole count
//!       + bumpiness     · Σ |hᵢ − hᵢ₊₁|
//!       + near_complete · rows missing one block
//! ```
//!
//! With the default weights, holes dominate everything else, a placement
//! that clears lines beats one that only stacks, and flat surfaces with
//! nearly finished rows are preferred.
//!
//! # Usage
//!
//! ```
//! use risetris_engine::{Board, Piece, PieceKind};
//! use risetris_evaluator::{
//!     placement_analysis::PlacementAnalysis,
//!     placement_evaluator::{HeuristicPlacementEvaluator, PlacementEvaluator},
//! };
//!
//! let board = Board::from_ascii(10, 20, "####....##");
//! let mut piece = Piece::new(PieceKind::I, 10);
//! piece.set_position(4, 19);
//!
//! let evaluator = HeuristicPlacementEvaluator::default();
//! let score = evaluator.evaluate_placement(&PlacementAnalysis::from_board(&board, piece));
//! assert!((score - (100.0 - 10.0)).abs() < 1e-9);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::placement_analysis::PlacementAnalysis;

/// Evaluates piece placements by assigning scores.
pub trait PlacementEvaluator: fmt::Debug + Send + Sync {
    /// Evaluates a placement and returns a score (higher is better).
    fn evaluate_placement(&self, analysis: &PlacementAnalysis) -> f64;
}

/// Weights of the heuristic placement score.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HeuristicWeights {
    /// Bonus for clearing 1, 2, 3 and 4 rows.
    pub line_clear: [f64; 4],
    pub height: f64,
    pub holes: f64,
    pub bumpiness: f64,
    pub near_complete: f64,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            line_clear: [100.0, 300.0, 500.0, 800.0],
            height: -1.0,
            holes: -500.0,
            bumpiness: -50.0,
            near_complete: 50.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeuristicPlacementEvaluator {
    weights: HeuristicWeights,
}

impl HeuristicPlacementEvaluator {
    #[must_use]
    pub fn new(weights: HeuristicWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn weights(&self) -> &HeuristicWeights {
        &self.weights
    }
}

impl PlacementEvaluator for HeuristicPlacementEvaluator {
    #[expect(clippy::cast_precision_loss)]
    fn evaluate_placement(&self, analysis: &PlacementAnalysis) -> f64 {
        let w = &self.weights;
        let board = analysis.board_analysis();
        let clear_bonus = analysis
            .cleared_lines()
            .checked_sub(1)
            .and_then(|i| w.line_clear.get(i))
            .copied()
            .unwrap_or(0.0);

        clear_bonus
            + w.height * board.total_height() as f64
            + w.holes * board.num_holes() as f64
            + w.bumpiness * board.surface_bumpiness() as f64
            + w.near_complete * board.near_complete_rows() as f64
    }
}
