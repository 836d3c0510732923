//! Game rules and session state.
//!
//! This module drives the data structures of [`core`](crate::core) through a
//! game:
//!
//! - [`GameSession`] - The state machine: spawning, movement, locking, line
//!   clears, rising lines, hold, pause, menu and demo
//! - [`GameConfig`] - Every tunable, grouped and validated up front
//! - [`PowerUpSystem`] - Power-up blocks on the board and active effects
//! - [`RisingLinesController`] - When rising lines come and what they look like
//! - [`ComboState`] / [`GameStats`] - Scoring, combos and level progression
//! - [`DemoPilot`] / [`MovePlanner`] - Paced autoplay on top of a pluggable
//!   placement planner
//!
//! # Game Flow
//!
//! 1. Build a [`GameSession`] from a [`GameConfig`] and a [`GameSeed`]
//! 2. Feed it [`Command`]s as they arrive
//! 3. Call [`GameSession::tick`] with the elapsed milliseconds every frame
//! 4. Pieces fall, lock, clear rows and spawn until one no longer fits or a
//!    rising line overflows the board
//!
//! # Example
//!
//! ```
//! use risetris_engine::{Command, GameConfig, GameSeed, GameSession};
//!
//! let mut session = GameSession::with_seed(GameConfig::default(), GameSeed::from(3_u128)).unwrap();
//!
//! session.handle_command(Command::MoveLeft);
//! session.handle_command(Command::Rotate);
//! session.handle_command(Command::HardDrop);
//!
//! for _ in 0..60 {
//!     session.tick(16);
//! }
//!
//! if session.is_game_over() {
//!     println!("Game over!");
//! }
//! ```

pub use self::{
    autopilot::*, command::*, config::*, game_seed::*, game_session::*, menu::*, power_up::*,
    rising_lines::*, scoring::*,
};

mod autopilot;
mod command;
mod config;
mod game_seed;
mod game_session;
mod menu;
mod power_up;
mod rising_lines;
mod scoring;
