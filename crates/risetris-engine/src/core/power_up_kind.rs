use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::shape::Rgb;

/// Kinds of power-up a block can carry.
///
/// Each kind is either duration based or use based; see
/// [`PowerUpKind::is_use_based`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    /// Doubles the fall interval while active.
    TimeDilator,
    /// Doubles line-clear score while active.
    ScoreAmplifier,
    /// Allows removing the bottom-most occupied row on demand.
    LineBomb,
    /// Placement ignores occupied cells; one use per lock.
    PhantomMode,
    /// Delays locking of a landed piece.
    PrecisionLock,
}

impl Distribution<PowerUpKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PowerUpKind {
        PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())]
    }
}

impl PowerUpKind {
    pub const ALL: [Self; 5] = [
        Self::TimeDilator,
        Self::ScoreAmplifier,
        Self::LineBomb,
        Self::PhantomMode,
        Self::PrecisionLock,
    ];

    #[must_use]
    pub const fn is_use_based(self) -> bool {
        matches!(self, Self::LineBomb | Self::PhantomMode)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TimeDilator => "Time Dilator",
            Self::ScoreAmplifier => "Score Amplifier",
            Self::LineBomb => "Line Bomb",
            Self::PhantomMode => "Phantom Mode",
            Self::PrecisionLock => "Precision Lock",
        }
    }

    #[must_use]
    pub const fn color(self) -> Rgb {
        match self {
            Self::TimeDilator => Rgb::new(0, 150, 255),
            Self::ScoreAmplifier => Rgb::new(255, 215, 0),
            Self::LineBomb => Rgb::new(255, 50, 50),
            Self::PhantomMode => Rgb::new(180, 0, 255),
            Self::PrecisionLock => Rgb::new(0, 255, 150),
        }
    }
}
