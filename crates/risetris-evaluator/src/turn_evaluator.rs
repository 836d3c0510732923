//! Turn evaluation: choosing where the current piece should go.
//!
//! This module implements the upper level of the evaluator architecture. It
//! enumerates every placement reachable this turn, scores each one with a
//! [`PlacementEvaluator`], and keeps the best.
//!
//! # Search
//!
//! For each of the four rotations (outer loop) and each column (inner loop):
//!
//! 1. **Direct drop** - The rotated piece starts at row 0 in that column and
//!    falls while the row below is free.
//! 2. **Slides** - The columns at offsets −1, +1, −2 and +2 from it, each with
//!    a flat slide bonus added to its score.
//!
//! A candidate whose resting position is blocked scores −∞. The same
//! search then runs for the piece that a hold would bring in (the held piece,
//! or the next piece if the hold slot is empty) with a flat hold bonus on
//! top. Holding is chosen only if it strictly beats the best plain
//! placement. Ties always go to the candidate found first.
//!
//! # Design: Greedy One-Step Lookahead
//!
//! The [`TurnEvaluator`] only looks at the placement at hand, never at future
//! turns. It evaluates a few hundred candidates per turn, which keeps it fast
//! enough to plan synchronously inside a game tick.
//!
//! # Usage
//!
//! ```
//! use risetris_engine::{Board, Piece, PieceKind, PlanningSnapshot};
//! use risetris_evaluator::turn_evaluator::TurnEvaluator;
//!
//! let board = Board::from_ascii(10, 20, ".#########");
//! let current = Piece::new(PieceKind::I, 10);
//! let next = Piece::new(PieceKind::O, 10);
//! let snapshot = PlanningSnapshot {
//!     board: &board,
//!     current: &current,
//!     hold: None,
//!     next: &next,
//!     can_hold: false,
//! };
//!
//! let evaluator = TurnEvaluator::default();
//! let turn = evaluator.select_best_turn(&snapshot).unwrap();
//! assert!(!turn.plan().use_hold);
//! ```

use arrayvec::ArrayVec;
use risetris_engine::{Board, DemoConfig, MovePlan, MovePlanner, Piece, PlanningSnapshot};

use crate::{
    placement_analysis::PlacementAnalysis,
    placement_evaluator::{HeuristicPlacementEvaluator, PlacementEvaluator},
};

const SLIDE_OFFSETS: [i32; 4] = [-1, 1, -2, 2];

/// The best placement found for a turn.
#[derive(Debug, Clone)]
pub struct TurnPlan {
    plan: MovePlan,
    placement: Piece,
    score: f64,
}

impl TurnPlan {
    #[must_use]
    pub fn plan(&self) -> MovePlan {
        self.plan
    }

    /// The piece at its resting position.
    #[must_use]
    pub fn placement(&self) -> &Piece {
        &self.placement
    }

    /// Placement score including slide and hold bonuses.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }
}

/// Evaluates and selects the best placement for the current turn.
#[derive(Debug)]
pub struct TurnEvaluator {
    placement_evaluator: Box<dyn PlacementEvaluator>,
    slide_bonus: f64,
    hold_bonus: f64,
}

impl Default for TurnEvaluator {
    fn default() -> Self {
        Self::from_config(&DemoConfig::default())
    }
}

impl TurnEvaluator {
    /// Creates a turn evaluator without slide or hold bonuses.
    #[must_use]
    pub fn new(placement_evaluator: Box<dyn PlacementEvaluator>) -> Self {
        Self {
            placement_evaluator,
            slide_bonus: 0.0,
            hold_bonus: 0.0,
        }
    }

    /// The heuristic evaluator with the bonuses configured for demo play.
    #[must_use]
    pub fn from_config(config: &DemoConfig) -> Self {
        Self::new(Box::new(HeuristicPlacementEvaluator::default()))
            .with_bonuses(config.slide_bonus, config.hold_bonus)
    }

    #[must_use]
    pub fn with_bonuses(mut self, slide_bonus: f64, hold_bonus: f64) -> Self {
        self.slide_bonus = slide_bonus;
        self.hold_bonus = hold_bonus;
        self
    }

    /// Scores `piece` rotated `rotations` times clockwise and dropped from
    /// row 0 of `column`, stepping down while the next row is free.
    ///
    /// Returns `f64::NEG_INFINITY` when the piece cannot be placed there.
    /// `board` and `piece` are left untouched.
    #[must_use]
    pub fn evaluate_candidate(&self, board: &Board, piece: &Piece, column: i32, rotations: u8) -> f64 {
        drop_candidate(board, piece, column, rotations).map_or(f64::NEG_INFINITY, |placement| {
            self.placement_evaluator
                .evaluate_placement(&PlacementAnalysis::from_board(board, placement))
        })
    }

    /// Selects the best turn for a snapshot, or `None` if no candidate fits.
    #[must_use]
    pub fn select_best_turn(&self, snapshot: &PlanningSnapshot<'_>) -> Option<TurnPlan> {
        let mut searches = ArrayVec::<(&Piece, bool, f64), 2>::new();
        searches.push((snapshot.current, false, 0.0));
        if snapshot.can_hold {
            let swapped_in = snapshot.hold.unwrap_or(snapshot.next);
            searches.push((swapped_in, true, self.hold_bonus));
        }

        let mut best: Option<TurnPlan> = None;
        for (piece, use_hold, bonus) in searches {
            let Some(mut turn) = self.search(snapshot.board, piece, use_hold) else {
                continue;
            };
            turn.score += bonus;
            if best.as_ref().is_none_or(|b| turn.score > b.score) {
                best = Some(turn);
            }
        }
        if let Some(best) = &best {
            log::debug!("planned {:?} with score {:.1}", best.plan, best.score);
        }
        best
    }

    fn search(&self, board: &Board, piece: &Piece, use_hold: bool) -> Option<TurnPlan> {
        let width = i32::try_from(board.width()).unwrap_or(i32::MAX);
        let mut best: Option<TurnPlan> = None;
        let mut consider = |column: i32, rotations: u8, bonus: f64| {
            let Some(placement) = drop_candidate(board, piece, column, rotations) else {
                return;
            };
            let score = self
                .placement_evaluator
                .evaluate_placement(&PlacementAnalysis::from_board(board, placement.clone()))
                + bonus;
            if best.as_ref().is_none_or(|b| score > b.score) {
                best = Some(TurnPlan {
                    plan: MovePlan {
                        column,
                        rotations,
                        use_hold,
                    },
                    placement,
                    score,
                });
            }
        };

        for rotations in 0..4 {
            for column in 0..width {
                consider(column, rotations, 0.0);
                for offset in SLIDE_OFFSETS {
                    let target = column + offset;
                    if (0..width).contains(&target) {
                        consider(target, rotations, self.slide_bonus);
                    }
                }
            }
        }
        best
    }
}

impl MovePlanner for TurnEvaluator {
    fn plan(&self, snapshot: &PlanningSnapshot<'_>) -> MovePlan {
        self.select_best_turn(snapshot)
            .map_or_else(
                || MovePlan {
                    column: snapshot.current.x(),
                    rotations: 0,
                    use_hold: false,
                },
                |turn| turn.plan,
            )
    }
}

/// Rotates a clone of `piece`, places it at row 0 of `column` and lets it
/// fall while the row below is free.
///
/// The start row itself may be blocked: the piece still steps down if the
/// next row fits. Only a resting position that does not fit is rejected.
fn drop_candidate(board: &Board, piece: &Piece, column: i32, rotations: u8) -> Option<Piece> {
    let mut candidate = piece.clone();
    for _ in 0..rotations {
        candidate.rotate_clockwise();
    }
    candidate.set_position(column, 0);
    while board.is_valid_placement(&candidate, 0, 1, false) {
        candidate.shift(0, 1);
    }
    board
        .is_valid_placement(&candidate, 0, 0, false)
        .then_some(candidate)
}
