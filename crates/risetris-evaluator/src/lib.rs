//! Placement search for autoplay.
//!
//! This crate implements a two-level evaluation architecture:
//!
//! 1. **Placement Evaluation** ([`placement_evaluator`]) - Scores a single piece placement
//!    from the board it leaves behind.
//!
//! 2. **Turn Evaluation** ([`turn_evaluator`]) - Enumerates every rotation and column for the
//!    current piece and the piece a hold would bring in, and picks the best.
//!
//! # Architecture
//!
//! ```text
//! Turn Evaluation (select best placement, decide on hold)
//!     ↓ uses
//! Placement Evaluation (score single placement)
//! ```
//!
//! [`TurnEvaluator`](turn_evaluator::TurnEvaluator) implements the engine's
//! [`MovePlanner`](risetris_engine::MovePlanner), so it plugs straight into a
//! [`GameSession`](risetris_engine::GameSession) running in demo mode.
//!
//! # Supporting Modules
//!
//! - [`board_analysis`] - Lazily computed board metrics (heights, holes, bumpiness, nearly
//!   complete rows)
//! - [`placement_analysis`] - The board right after a piece locks, with its line clears
//!
//! # Design Principles
//!
//! ## Pure Search
//!
//! The search only ever reads the snapshot it is given. Candidates are evaluated on clones
//! of the board and piece, so planning can run synchronously in the middle of a tick without
//! touching live game state.
//!
//! ## Linear Evaluation Model
//!
//! Placement scores are weighted sums of board metrics. This is simple, interpretable and
//! fast, but cannot capture interactions between metrics.
//!
//! # Example
//!
//! ```
//! use risetris_engine::{GameConfig, GameSeed, GameSession};
//! use risetris_evaluator::turn_evaluator::TurnEvaluator;
//!
//! let mut config = GameConfig::default();
//! config.demo.auto_start = true;
//! let planner = TurnEvaluator::from_config(&config.demo);
//! let mut session = GameSession::with_seed(config, GameSeed::from(11_u128))
//!     .unwrap()
//!     .with_planner(Box::new(planner));
//!
//! for _ in 0..1_000 {
//!     session.tick(16);
//! }
//! assert!(session.stats().completed_pieces() > 0);
//! ```

pub mod board_analysis;
pub mod placement_analysis;
pub mod placement_evaluator;
pub mod turn_evaluator;
