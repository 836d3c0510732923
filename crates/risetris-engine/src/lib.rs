//! Headless simulation core for a falling-block puzzle game with power-ups and
//! rising lines.
//!
//! - [`core`] holds the spatial data: piece shapes, falling pieces, and the board.
//! - [`engine`] orchestrates them into a tick-driven [`GameSession`].
//!
//! Nothing here renders or reads input devices. A driver feeds
//! [`Command`]s and elapsed milliseconds into the session and reads its state back
//! through getters.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Lookup of a piece kind that is not one of the seven canonical shapes.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown piece kind: {key:?}")]
pub struct InvalidShapeKind {
    key: String,
}

impl InvalidShapeKind {
    pub(crate) fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Rising-line insertion attempted while the top row still holds blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("top row occupied, rising line would push blocks out of the board")]
pub struct GridOverflowError;
