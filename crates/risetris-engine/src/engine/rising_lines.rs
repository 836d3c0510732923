use rand::{Rng, seq::index};

use crate::{Block, BlockRow};

use super::config::{RisingConfig, RisingMode};

/// Timer state for rising lines.
///
/// The controller only decides *when* a line rises and what it looks like;
/// the session performs the insertion and reports back with
/// [`on_rise`](Self::on_rise).
#[derive(Debug, Clone, Default)]
pub struct RisingLinesController {
    timer_ms: u64,
    /// `None` when no automatic rise is scheduled.
    interval_ms: Option<u64>,
    warning: bool,
    /// Elapsed time of the running rise animation.
    animation_ms: Option<u64>,
    cooldown_ms: u64,
}

impl RisingLinesController {
    #[must_use]
    pub fn new(level: u32, config: &RisingConfig) -> Self {
        Self {
            interval_ms: Self::compute_interval(level, config),
            ..Self::default()
        }
    }

    /// Automatic rise interval for `level`, or `None` if rises are never
    /// automatic in the configured mode.
    #[must_use]
    pub fn compute_interval(level: u32, config: &RisingConfig) -> Option<u64> {
        match config.mode {
            RisingMode::Off | RisingMode::Manual => None,
            RisingMode::Survival => Some(config.survival_interval_ms),
            RisingMode::Pressure => {
                let decrease = u64::from(level.saturating_sub(1)) * config.interval_decrease_ms;
                Some(
                    config
                        .initial_interval_ms
                        .saturating_sub(decrease)
                        .max(config.min_interval_ms),
                )
            }
        }
    }

    /// Advances timers by `delta_ms` and returns `true` when a rise is due.
    ///
    /// The interval of a pending rise is fixed when it is scheduled; a level
    /// reached meanwhile only shortens the next one.
    pub fn tick(&mut self, delta_ms: u64, config: &RisingConfig) -> bool {
        if config.mode == RisingMode::Off {
            return false;
        }
        self.cooldown_ms = self.cooldown_ms.saturating_sub(delta_ms);

        if let Some(elapsed) = &mut self.animation_ms {
            *elapsed += delta_ms;
            if *elapsed >= config.animation_ms {
                self.animation_ms = None;
            }
            return false;
        }
        if config.mode == RisingMode::Manual {
            return false;
        }

        let Some(interval) = self.interval_ms else {
            return false;
        };
        self.timer_ms += delta_ms;
        let remaining = interval.saturating_sub(self.timer_ms);
        self.warning = remaining > 0 && remaining <= config.warning_ms;
        self.timer_ms >= interval
    }

    /// Accepts a manual rise request if manual mode is on and the cooldown
    /// has elapsed, restarting the cooldown.
    pub fn try_manual_trigger(&mut self, config: &RisingConfig) -> bool {
        if config.mode != RisingMode::Manual || self.cooldown_ms > 0 {
            return false;
        }
        self.cooldown_ms = config.manual_cooldown_ms;
        true
    }

    /// Resets the timer and starts the rise animation after a line rose.
    pub fn on_rise(&mut self, level: u32, config: &RisingConfig) {
        self.timer_ms = 0;
        self.warning = false;
        self.animation_ms = Some(0);
        self.interval_ms = Self::compute_interval(level, config);
    }

    /// Builds a full row of rising blocks with a random number of holes in
    /// `holes_min..=holes_max` at distinct random columns.
    pub fn generate_row_with_holes<R>(rng: &mut R, width: usize, config: &RisingConfig) -> BlockRow
    where
        R: Rng + ?Sized,
    {
        let holes = rng
            .random_range(config.holes_min..=config.holes_max)
            .min(width);
        let mut row = BlockRow::filled(width, Block::Rising);
        for x in index::sample(rng, width, holes) {
            row.set(x, Block::Empty);
        }
        row
    }

    #[must_use]
    pub fn timer_ms(&self) -> u64 {
        self.timer_ms
    }

    #[must_use]
    pub fn interval_ms(&self) -> Option<u64> {
        self.interval_ms
    }

    /// Time left until the next automatic rise.
    #[must_use]
    pub fn time_until_rise_ms(&self) -> Option<u64> {
        self.interval_ms
            .map(|interval| interval.saturating_sub(self.timer_ms))
    }

    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.warning
    }

    /// Progress of the running rise animation in `0.0..1.0`.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn animation_progress(&self, config: &RisingConfig) -> Option<f64> {
        self.animation_ms
            .map(|elapsed| elapsed as f64 / config.animation_ms.max(1) as f64)
    }

    #[must_use]
    pub fn cooldown_ms(&self) -> u64 {
        self.cooldown_ms
    }
}
