use std::fmt;

use super::config::ScoringConfig;

/// Points for a clear of `lines` rows at `level`.
///
/// The base value comes from `config.line_scores` (one entry per 1..=4 lines)
/// times `level`. From the second clear of a chain on (`combo_before > 0`) it
/// is multiplied by `min(base + combo_before * increment, cap)` and floored.
/// An active score amplifier doubles the result.
///
/// # Example
///
/// ```
/// use risetris_engine::{ScoringConfig, compute_clear_score};
///
/// let config = ScoringConfig::default();
/// assert_eq!(compute_clear_score(1, 1, 0, false, &config), 100);
/// assert_eq!(compute_clear_score(4, 2, 1, false, &config), 3200);
/// assert_eq!(compute_clear_score(2, 1, 9, true, &config), 3000);
/// ```
#[must_use]
pub fn compute_clear_score(
    lines: usize,
    level: u32,
    combo_before: u32,
    amplifier: bool,
    config: &ScoringConfig,
) -> u64 {
    let Some(&line_score) = lines
        .checked_sub(1)
        .and_then(|i| config.line_scores.get(i))
    else {
        return 0;
    };
    let base = line_score * u64::from(level);
    let multiplier = ComboState::multiplier_for(combo_before, config);
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let score = (base as f64 * multiplier).floor() as u64;
    if amplifier { score * 2 } else { score }
}

/// Label shown for a running combo chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboTier {
    /// 2-3 consecutive clears.
    Combo,
    /// 4-6 consecutive clears.
    Streak,
    /// 7-9 consecutive clears.
    Blazing,
    /// 10 or more consecutive clears.
    Legendary,
}

impl ComboTier {
    #[must_use]
    pub fn from_count(count: u32) -> Option<Self> {
        match count {
            0 | 1 => None,
            2..=3 => Some(Self::Combo),
            4..=6 => Some(Self::Streak),
            7..=9 => Some(Self::Blazing),
            _ => Some(Self::Legendary),
        }
    }
}

impl fmt::Display for ComboTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Combo => "COMBO!",
            Self::Streak => "STREAK!",
            Self::Blazing => "BLAZING!",
            Self::Legendary => "LEGENDARY!",
        })
    }
}

/// Consecutive-clear chain.
///
/// `count` is the number of clearing locks in a row. The multiplier of the
/// most recent clear is 1.0 for the first clear of a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ComboState {
    count: u32,
    multiplier: f64,
    display_ms: u64,
}

impl Default for ComboState {
    fn default() -> Self {
        Self {
            count: 0,
            multiplier: 1.0,
            display_ms: 0,
        }
    }
}

impl ComboState {
    #[must_use]
    pub fn multiplier_for(combo_before: u32, config: &ScoringConfig) -> f64 {
        if combo_before == 0 {
            return 1.0;
        }
        let raw = config.combo_multiplier_base
            + f64::from(combo_before) * config.combo_multiplier_increment;
        raw.min(config.max_combo_multiplier)
    }

    /// Extends the chain after a clearing lock and returns the multiplier
    /// that applied to it.
    pub fn on_clear(&mut self, config: &ScoringConfig) -> f64 {
        self.multiplier = Self::multiplier_for(self.count, config);
        self.count += 1;
        if self.count > 1 {
            self.display_ms = config.combo_display_ms;
        }
        self.multiplier
    }

    /// Breaks the chain after a non-clearing lock.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn tick(&mut self, delta_ms: u64) {
        self.display_ms = self.display_ms.saturating_sub(delta_ms);
    }

    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    #[must_use]
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    #[must_use]
    pub fn tier(&self) -> Option<ComboTier> {
        ComboTier::from_count(self.count)
    }

    /// Combo banner such as `x3.0 COMBO!`, while its display time lasts.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        if self.display_ms == 0 {
            return None;
        }
        self.tier()
            .map(|tier| format!("x{:.1} {tier}", self.multiplier))
    }
}

/// Score, level and clear statistics of a session.
///
/// - **Score**: clear points plus soft/hard drop bonuses
/// - **Level**: `lines_cleared / lines_per_level + 1`
/// - **Completed pieces**: every piece locked into the board
/// - **Clear histogram**: locks that cleared 0, 1, 2, 3 and 4 rows
///
/// # Example
///
/// ```
/// use risetris_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.record_lock(4);
/// assert!(!stats.add_cleared_lines(4, 10));
/// assert!(stats.add_cleared_lines(6, 10));
/// assert_eq!(stats.level(), 2);
/// assert_eq!(stats.line_clear_counter()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameStats {
    score: u64,
    level: u32,
    lines_cleared: u32,
    completed_pieces: u64,
    line_clear_counter: [u64; 5],
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            level: 1,
            lines_cleared: 0,
            completed_pieces: 0,
            line_clear_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub const fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    #[must_use]
    pub const fn completed_pieces(&self) -> u64 {
        self.completed_pieces
    }

    /// Histogram of locks by number of cleared rows (`[0]` counts
    /// non-clearing locks).
    #[must_use]
    pub const fn line_clear_counter(&self) -> &[u64; 5] {
        &self.line_clear_counter
    }

    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    pub fn record_lock(&mut self, cleared_lines: usize) {
        self.completed_pieces += 1;
        if let Some(counter) = self.line_clear_counter.get_mut(cleared_lines) {
            *counter += 1;
        }
    }

    /// Adds cleared lines and returns `true` if the level went up.
    pub fn add_cleared_lines(&mut self, lines: u32, lines_per_level: u32) -> bool {
        self.lines_cleared += lines;
        let new_level = self.lines_cleared / lines_per_level.max(1) + 1;
        if new_level > self.level {
            self.level = new_level;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_clear_has_no_bonus() {
        let config = ScoringConfig::default();
        for lines in 1..=4 {
            assert_eq!(
                compute_clear_score(lines, 3, 0, false, &config),
                config.line_scores[lines - 1] * 3
            );
        }
        assert_eq!(compute_clear_score(0, 3, 0, false, &config), 0);
        assert_eq!(compute_clear_score(5, 3, 2, true, &config), 0);
    }

    #[test]
    fn test_combo_multiplier_progression() {
        let config = ScoringConfig::default();
        let mut combo = ComboState::default();
        assert!((combo.on_clear(&config) - 1.0).abs() < f64::EPSILON);
        assert!((combo.on_clear(&config) - 2.0).abs() < f64::EPSILON);
        assert!((combo.on_clear(&config) - 3.0).abs() < f64::EPSILON);
        for _ in 0..20 {
            assert!(combo.on_clear(&config) <= config.max_combo_multiplier);
        }
        assert!((combo.multiplier() - 5.0).abs() < f64::EPSILON);
        combo.reset();
        assert_eq!(combo.count(), 0);
        assert!((combo.on_clear(&config) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fractional_multiplier_is_floored() {
        let config = ScoringConfig {
            combo_multiplier_base: 1.0,
            combo_multiplier_increment: 0.25,
            ..ScoringConfig::default()
        };
        assert_eq!(compute_clear_score(1, 1, 1, false, &config), 125);
        let config = ScoringConfig {
            line_scores: [33, 300, 500, 800],
            combo_multiplier_increment: 0.5,
            ..ScoringConfig::default()
        };
        assert_eq!(compute_clear_score(1, 1, 1, false, &config), 49);
        assert_eq!(compute_clear_score(1, 1, 1, true, &config), 98);
    }

    #[test]
    fn test_combo_text_and_tiers() {
        let config = ScoringConfig::default();
        let mut combo = ComboState::default();
        combo.on_clear(&config);
        assert_eq!(combo.text(), None);
        combo.on_clear(&config);
        assert_eq!(combo.text().as_deref(), Some("x2.0 COMBO!"));
        combo.tick(config.combo_display_ms);
        assert_eq!(combo.text(), None);

        assert_eq!(ComboTier::from_count(1), None);
        assert_eq!(ComboTier::from_count(3), Some(ComboTier::Combo));
        assert_eq!(ComboTier::from_count(4), Some(ComboTier::Streak));
        assert_eq!(ComboTier::from_count(9), Some(ComboTier::Blazing));
        assert_eq!(ComboTier::from_count(10), Some(ComboTier::Legendary));
    }

    #[test]
    fn test_level_progression() {
        let mut stats = GameStats::new();
        assert_eq!(stats.level(), 1);
        assert!(!stats.add_cleared_lines(9, 10));
        assert!(stats.add_cleared_lines(1, 10));
        assert_eq!(stats.level(), 2);
        assert!(stats.add_cleared_lines(24, 10));
        assert_eq!(stats.level(), 4);
        assert_eq!(stats.lines_cleared(), 34);
    }
}
