use serde::{Deserialize, Serialize};

use crate::PowerUpKind;

/// Complete set of tunables for one game session.
///
/// A configuration is an immutable value: the session takes ownership of one
/// at construction and replaces it wholesale through [`GameConfig::apply`].
/// Every group deserializes with defaults, so partial JSON documents are
/// accepted.
///
/// # Example
///
/// ```
/// use risetris_engine::{ConfigChange, Difficulty, GameConfig};
///
/// let config = GameConfig::default().apply(ConfigChange::SetDifficulty(Difficulty::Hard));
/// assert_eq!(config.timing.initial_fall_ms, 700);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GameConfig {
    pub grid: GridConfig,
    pub timing: TimingConfig,
    pub scoring: ScoringConfig,
    pub power_ups: PowerUpConfig,
    pub rising: RisingConfig,
    pub features: FeatureConfig,
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    pub initial_fall_ms: u64,
    pub fall_decrease_per_level_ms: u64,
    pub min_fall_ms: u64,
    pub clear_animation_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            initial_fall_ms: 1000,
            fall_decrease_per_level_ms: 100,
            min_fall_ms: 100,
            clear_animation_ms: 500,
        }
    }
}

impl TimingConfig {
    /// Fall interval at `level`, floored at `min_fall_ms`.
    #[must_use]
    pub fn fall_interval(&self, level: u32) -> u64 {
        let decrease = u64::from(level.saturating_sub(1)) * self.fall_decrease_per_level_ms;
        self.initial_fall_ms
            .saturating_sub(decrease)
            .max(self.min_fall_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Points for clearing 1, 2, 3 and 4 lines at level 1.
    pub line_scores: [u64; 4],
    pub soft_drop_bonus: u64,
    pub hard_drop_bonus: u64,
    pub lines_per_level: u32,
    pub combo_multiplier_base: f64,
    pub combo_multiplier_increment: f64,
    pub max_combo_multiplier: f64,
    pub combo_display_ms: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            line_scores: [100, 300, 500, 800],
            soft_drop_bonus: 1,
            hard_drop_bonus: 2,
            lines_per_level: 10,
            combo_multiplier_base: 1.0,
            combo_multiplier_increment: 1.0,
            max_combo_multiplier: 5.0,
            combo_display_ms: 2000,
        }
    }
}

/// How long an activated power-up lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpLifetime {
    DurationMs(u64),
    Uses(u32),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PowerUpConfig {
    pub enabled: bool,
    /// Probability that a freshly generated piece carries a power-up.
    pub spawn_chance: f64,
    pub time_dilator: PowerUpLifetime,
    pub score_amplifier: PowerUpLifetime,
    pub line_bomb: PowerUpLifetime,
    pub phantom_mode: PowerUpLifetime,
    pub precision_lock: PowerUpLifetime,
    /// Extra time a landed piece may rest before locking under precision lock.
    pub precision_lock_delay_ms: u64,
}

impl Default for PowerUpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spawn_chance: 0.05,
            time_dilator: PowerUpLifetime::DurationMs(10_000),
            score_amplifier: PowerUpLifetime::DurationMs(8_000),
            line_bomb: PowerUpLifetime::Uses(1),
            phantom_mode: PowerUpLifetime::Uses(3),
            precision_lock: PowerUpLifetime::DurationMs(2_000),
            precision_lock_delay_ms: 2_000,
        }
    }
}

impl PowerUpConfig {
    #[must_use]
    pub fn lifetime(&self, kind: PowerUpKind) -> PowerUpLifetime {
        match kind {
            PowerUpKind::TimeDilator => self.time_dilator,
            PowerUpKind::ScoreAmplifier => self.score_amplifier,
            PowerUpKind::LineBomb => self.line_bomb,
            PowerUpKind::PhantomMode => self.phantom_mode,
            PowerUpKind::PrecisionLock => self.precision_lock,
        }
    }
}

/// Rising-lines behavior.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, derive_more::FromStr,
)]
#[serde(rename_all = "snake_case")]
pub enum RisingMode {
    /// No rising lines.
    Off,
    /// Interval shrinks with level.
    #[default]
    Pressure,
    /// Fixed interval regardless of level.
    Survival,
    /// Rises only on explicit request, subject to a cooldown.
    Manual,
}

impl RisingMode {
    pub const ALL: [Self; 4] = [Self::Off, Self::Pressure, Self::Survival, Self::Manual];

    /// Steps through [`RisingMode::ALL`] cyclically.
    #[must_use]
    pub fn cycled(self, forward: bool) -> Self {
        let len = Self::ALL.len();
        let idx = Self::ALL.iter().position(|&m| m == self).unwrap_or(0);
        let next = if forward { idx + 1 } else { idx + len - 1 };
        Self::ALL[next % len]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RisingConfig {
    pub mode: RisingMode,
    pub initial_interval_ms: u64,
    pub interval_decrease_ms: u64,
    pub min_interval_ms: u64,
    pub survival_interval_ms: u64,
    pub warning_ms: u64,
    pub animation_ms: u64,
    pub holes_min: usize,
    pub holes_max: usize,
    pub manual_cooldown_ms: u64,
}

impl Default for RisingConfig {
    fn default() -> Self {
        Self {
            mode: RisingMode::Pressure,
            initial_interval_ms: 30_000,
            interval_decrease_ms: 2_000,
            min_interval_ms: 10_000,
            survival_interval_ms: 12_000,
            warning_ms: 5_000,
            animation_ms: 300,
            holes_min: 1,
            holes_max: 3,
            manual_cooldown_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub hold_enabled: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self { hold_enabled: true }
    }
}

/// Autoplay settings: when demo mode starts and how fast the pilot acts.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DemoConfig {
    pub auto_start: bool,
    pub after_game_over: bool,
    pub game_over_delay_ms: u64,
    pub plan_delay_ms: u64,
    pub rotation_delay_ms: u64,
    pub horizontal_delay_ms: u64,
    pub drop_delay_ms: u64,
    pub fast_drop_delay_ms: u64,
    pub slide_bonus: f64,
    pub hold_bonus: f64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            auto_start: false,
            after_game_over: true,
            game_over_delay_ms: 3_000,
            plan_delay_ms: 150,
            rotation_delay_ms: 50,
            horizontal_delay_ms: 30,
            drop_delay_ms: 100,
            fast_drop_delay_ms: 30,
            slide_bonus: 10.0,
            hold_bonus: 5.0,
        }
    }
}

/// Named bundle of fall-speed and rising-interval parameters.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, derive_more::FromStr,
)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Self; 4] = [Self::Easy, Self::Medium, Self::Hard, Self::Expert];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Expert => "expert",
        }
    }

    /// `(initial_fall, fall_decrease, min_fall, initial_rise, rise_decrease, min_rise)`
    const fn preset(self) -> (u64, u64, u64, u64, u64, u64) {
        match self {
            Self::Easy => (1500, 80, 200, 40_000, 1_500, 15_000),
            Self::Medium => (1000, 100, 100, 30_000, 2_000, 10_000),
            Self::Hard => (700, 120, 50, 25_000, 2_500, 8_000),
            Self::Expert => (400, 150, 30, 20_000, 3_000, 5_000),
        }
    }

    /// Steps through [`Difficulty::ALL`] cyclically.
    #[must_use]
    pub fn cycled(self, forward: bool) -> Self {
        let len = Self::ALL.len();
        let idx = Self::ALL.iter().position(|&d| d == self).unwrap_or(0);
        let next = if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        };
        Self::ALL[next]
    }
}

/// A single configuration edit, applied with [`GameConfig::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChange {
    SetDifficulty(Difficulty),
    SetPowerUpsEnabled(bool),
    SetHoldEnabled(bool),
    SetRisingMode(RisingMode),
}

/// A tunable outside its accepted range.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("grid must be at least 4x4, got {width}x{height}")]
    GridTooSmall { width: usize, height: usize },
    #[display("fall interval must be positive")]
    ZeroFallInterval,
    #[display("minimum fall interval {min} ms exceeds initial {initial} ms")]
    FallMinAboveInitial { min: u64, initial: u64 },
    #[display("lines per level must be positive")]
    ZeroLinesPerLevel,
    #[display("combo multiplier cap {cap} is below base {base}")]
    ComboCapBelowBase { base: f64, cap: f64 },
    #[display("combo multipliers must be finite and non-negative")]
    InvalidComboMultiplier,
    #[display("power-up spawn chance {chance} is outside [0, 1]")]
    SpawnChanceOutOfRange { chance: f64 },
    #[display("{kind:?} lifetime must be {expected} and positive")]
    InvalidPowerUpLifetime {
        kind: PowerUpKind,
        expected: &'static str,
    },
    #[display("rising interval must be positive")]
    ZeroRisingInterval,
    #[display("minimum rising interval {min} ms exceeds initial {initial} ms")]
    RisingMinAboveInitial { min: u64, initial: u64 },
    #[display("hole range {min}..={max} is empty or not narrower than grid width {width}")]
    InvalidHoleRange { min: usize, max: usize, width: usize },
    #[display("AI bonuses must be finite")]
    InvalidDemoBonus,
}

impl GameConfig {
    /// Returns a copy with the fall-speed and rising-interval parameters of
    /// `difficulty`.
    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        let (fall, fall_dec, fall_min, rise, rise_dec, rise_min) = difficulty.preset();
        self.timing.initial_fall_ms = fall;
        self.timing.fall_decrease_per_level_ms = fall_dec;
        self.timing.min_fall_ms = fall_min;
        self.rising.initial_interval_ms = rise;
        self.rising.interval_decrease_ms = rise_dec;
        self.rising.min_interval_ms = rise_min;
        self
    }

    /// Difficulty preset whose fall speed matches this configuration, if any.
    #[must_use]
    pub fn difficulty(&self) -> Option<Difficulty> {
        Difficulty::ALL.into_iter().find(|d| {
            let (fall, fall_dec, fall_min, ..) = d.preset();
            self.timing.initial_fall_ms == fall
                && self.timing.fall_decrease_per_level_ms == fall_dec
                && self.timing.min_fall_ms == fall_min
        })
    }

    #[must_use]
    pub fn apply(self, change: ConfigChange) -> Self {
        match change {
            ConfigChange::SetDifficulty(difficulty) => self.with_difficulty(difficulty),
            ConfigChange::SetPowerUpsEnabled(enabled) => Self {
                power_ups: PowerUpConfig {
                    enabled,
                    ..self.power_ups
                },
                ..self
            },
            ConfigChange::SetHoldEnabled(hold_enabled) => Self {
                features: FeatureConfig { hold_enabled },
                ..self
            },
            ConfigChange::SetRisingMode(mode) => Self {
                rising: RisingConfig { mode, ..self.rising },
                ..self
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let GridConfig { width, height } = self.grid;
        if width < 4 || height < 4 {
            return Err(ConfigError::GridTooSmall { width, height });
        }

        let timing = &self.timing;
        if timing.initial_fall_ms == 0 || timing.min_fall_ms == 0 {
            return Err(ConfigError::ZeroFallInterval);
        }
        if timing.min_fall_ms > timing.initial_fall_ms {
            return Err(ConfigError::FallMinAboveInitial {
                min: timing.min_fall_ms,
                initial: timing.initial_fall_ms,
            });
        }

        let scoring = &self.scoring;
        if scoring.lines_per_level == 0 {
            return Err(ConfigError::ZeroLinesPerLevel);
        }
        let multipliers = [
            scoring.combo_multiplier_base,
            scoring.combo_multiplier_increment,
            scoring.max_combo_multiplier,
        ];
        if multipliers.iter().any(|m| !m.is_finite() || *m < 0.0) {
            return Err(ConfigError::InvalidComboMultiplier);
        }
        if scoring.max_combo_multiplier < scoring.combo_multiplier_base {
            return Err(ConfigError::ComboCapBelowBase {
                base: scoring.combo_multiplier_base,
                cap: scoring.max_combo_multiplier,
            });
        }

        let power_ups = &self.power_ups;
        if !(0.0..=1.0).contains(&power_ups.spawn_chance) {
            return Err(ConfigError::SpawnChanceOutOfRange {
                chance: power_ups.spawn_chance,
            });
        }
        for kind in PowerUpKind::ALL {
            let valid = match power_ups.lifetime(kind) {
                PowerUpLifetime::DurationMs(ms) => !kind.is_use_based() && ms > 0,
                PowerUpLifetime::Uses(n) => kind.is_use_based() && n > 0,
            };
            if !valid {
                let expected = if kind.is_use_based() {
                    "use based"
                } else {
                    "duration based"
                };
                return Err(ConfigError::InvalidPowerUpLifetime { kind, expected });
            }
        }

        let rising = &self.rising;
        if rising.min_interval_ms == 0 || rising.survival_interval_ms == 0 {
            return Err(ConfigError::ZeroRisingInterval);
        }
        if rising.min_interval_ms > rising.initial_interval_ms {
            return Err(ConfigError::RisingMinAboveInitial {
                min: rising.min_interval_ms,
                initial: rising.initial_interval_ms,
            });
        }
        if rising.holes_min == 0 || rising.holes_min > rising.holes_max || rising.holes_max >= width
        {
            return Err(ConfigError::InvalidHoleRange {
                min: rising.holes_min,
                max: rising.holes_max,
                width,
            });
        }

        if !self.demo.slide_bonus.is_finite() || !self.demo.hold_bonus.is_finite() {
            return Err(ConfigError::InvalidDemoBonus);
        }
        Ok(())
    }
}
