use std::{collections::BTreeMap, fmt};

use arrayvec::ArrayVec;
use rand::{Rng, seq::IndexedRandom as _};

use crate::{Piece, PowerUpKind};

use super::config::{PowerUpConfig, PowerUpLifetime};

/// A power-up recorded against a locked board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerUpBlock {
    pub x: usize,
    pub y: usize,
    pub kind: PowerUpKind,
}

/// What is left of an activated power-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    Millis(u64),
    Uses(u32),
}

impl Remaining {
    fn from_lifetime(lifetime: PowerUpLifetime) -> Self {
        match lifetime {
            PowerUpLifetime::DurationMs(ms) => Self::Millis(ms),
            PowerUpLifetime::Uses(n) => Self::Uses(n),
        }
    }
}

/// An entry of the active set, as shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    pub remaining: Remaining,
}

impl fmt::Display for ActivePowerUp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.kind.label();
        match self.remaining {
            Remaining::Millis(ms) => write!(f, "{label}: {}s", ms / 1000 + 1),
            Remaining::Uses(n) => write!(f, "{label}: {n}x"),
        }
    }
}

/// Tracks power-up blocks on the board and the set of active effects.
///
/// A kind is in the active set iff it has time or uses left. Duration-based
/// entries decay in [`tick`](Self::tick); use-based entries only in
/// [`consume_use`](Self::consume_use).
#[derive(Debug, Clone, Default)]
pub struct PowerUpSystem {
    blocks: Vec<PowerUpBlock>,
    active: BTreeMap<PowerUpKind, Remaining>,
}

impl PowerUpSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bernoulli draw deciding whether a new piece carries a power-up.
    pub fn should_spawn_on_new_piece<R>(&self, rng: &mut R, config: &PowerUpConfig) -> bool
    where
        R: Rng + ?Sized,
    {
        config.enabled && rng.random_bool(config.spawn_chance)
    }

    /// Tags one uniformly chosen cell of `piece` with a uniformly chosen kind.
    pub fn tag_random_cell_of_piece<R>(&self, rng: &mut R, piece: &mut Piece) -> Option<PowerUpKind>
    where
        R: Rng + ?Sized,
    {
        let cells = piece.local_cells().collect::<ArrayVec<_, 16>>();
        let &cell = cells.choose(rng)?;
        let kind = rng.random();
        piece.tag(cell, kind).then_some(kind)
    }

    /// Records the tags of a piece that just locked, skipping cells above or
    /// below the board.
    pub fn transfer_tags_on_lock(&mut self, piece: &Piece, board_height: usize) {
        for ((x, y), kind) in piece.tagged_cells() {
            let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
                continue;
            };
            if y >= board_height {
                continue;
            }
            self.blocks.retain(|b| (b.x, b.y) != (x, y));
            self.blocks.push(PowerUpBlock { x, y, kind });
        }
    }

    /// Removes every block in `rows` and returns their kinds, duplicates kept.
    pub fn harvest_from_cleared_rows(&mut self, rows: &[usize]) -> Vec<PowerUpKind> {
        let (harvested, kept) = self
            .blocks
            .drain(..)
            .partition::<Vec<_>, _>(|b| rows.contains(&b.y));
        self.blocks = kept;
        harvested.into_iter().map(|b| b.kind).collect()
    }

    /// Adds the configured duration or uses of `kind` to whatever remains.
    pub fn activate(&mut self, kind: PowerUpKind, config: &PowerUpConfig) {
        let added = Remaining::from_lifetime(config.lifetime(kind));
        let entry = self.active.entry(kind).or_insert(match added {
            Remaining::Millis(_) => Remaining::Millis(0),
            Remaining::Uses(_) => Remaining::Uses(0),
        });
        *entry = match (*entry, added) {
            (Remaining::Millis(a), Remaining::Millis(b)) => Remaining::Millis(a.saturating_add(b)),
            (Remaining::Uses(a), Remaining::Uses(b)) => Remaining::Uses(a.saturating_add(b)),
            (_, added) => added,
        };
        log::debug!("power-up activated: {}", ActivePowerUp { kind, remaining: *entry });
    }

    /// Decays duration-based entries by `delta_ms`, dropping expired ones.
    pub fn tick(&mut self, delta_ms: u64) {
        self.active.retain(|kind, remaining| {
            let Remaining::Millis(ms) = remaining else {
                return true;
            };
            *ms = ms.saturating_sub(delta_ms);
            if *ms == 0 {
                log::debug!("power-up expired: {}", kind.label());
                return false;
            }
            true
        });
    }

    /// Spends one use of an active use-based kind.
    ///
    /// Returns `false` when `kind` is not active or not use based.
    pub fn consume_use(&mut self, kind: PowerUpKind) -> bool {
        let Some(Remaining::Uses(uses)) = self.active.get_mut(&kind) else {
            return false;
        };
        *uses -= 1;
        if *uses == 0 {
            self.active.remove(&kind);
        }
        true
    }

    /// Moves blocks down to follow [`Board::remove_rows`](crate::Board::remove_rows).
    ///
    /// Blocks inside removed rows are discarded.
    pub fn shift_on_rows_removed(&mut self, rows: &[usize]) {
        self.blocks.retain(|b| !rows.contains(&b.y));
        for block in &mut self.blocks {
            let mut removed_below = rows.iter().filter(|&&r| r > block.y).collect::<Vec<_>>();
            removed_below.sort_unstable();
            removed_below.dedup();
            block.y += removed_below.len();
        }
    }

    /// Moves blocks up one row to follow
    /// [`Board::insert_rising_row`](crate::Board::insert_rising_row).
    ///
    /// Blocks in row 0 are pushed off the board and lost.
    pub fn shift_on_row_inserted(&mut self) {
        self.blocks.retain(|b| b.y > 0);
        for block in &mut self.blocks {
            block.y -= 1;
        }
    }

    #[must_use]
    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.active.contains_key(&kind)
    }

    #[must_use]
    pub fn remaining(&self, kind: PowerUpKind) -> Option<Remaining> {
        self.active.get(&kind).copied()
    }

    /// Active effects in a stable order.
    pub fn active(&self) -> impl Iterator<Item = ActivePowerUp> + '_ {
        self.active
            .iter()
            .map(|(&kind, &remaining)| ActivePowerUp { kind, remaining })
    }

    #[must_use]
    pub fn blocks(&self) -> &[PowerUpBlock] {
        &self.blocks
    }

    #[must_use]
    pub fn power_up_at(&self, x: usize, y: usize) -> Option<PowerUpKind> {
        self.blocks
            .iter()
            .find(|b| (b.x, b.y) == (x, y))
            .map(|b| b.kind)
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.active.clear();
    }
}
