use arrayvec::ArrayVec;

use super::{
    command::MenuDirection,
    config::{ConfigChange, Difficulty, GameConfig, RisingMode},
};

/// Entries of the configuration menu, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Difficulty,
    PowerUps,
    Hold,
    RisingLines,
    Back,
}

impl MenuItem {
    pub const ALL: [Self; 5] = [
        Self::Difficulty,
        Self::PowerUps,
        Self::Hold,
        Self::RisingLines,
        Self::Back,
    ];
}

/// Draft of configuration edits made in the menu.
///
/// Nothing touches the live configuration until the draft is confirmed on
/// [`MenuItem::Back`]; the session then folds [`changes`](Self::changes)
/// into its configuration with [`GameConfig::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigMenu {
    selected: usize,
    /// Preset shown when the menu opened.
    initial_difficulty: Difficulty,
    difficulty: Difficulty,
    power_ups_enabled: bool,
    hold_enabled: bool,
    rising_mode: RisingMode,
}

impl ConfigMenu {
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let initial_difficulty = config.difficulty().unwrap_or_default();
        Self {
            selected: 0,
            initial_difficulty,
            difficulty: initial_difficulty,
            power_ups_enabled: config.power_ups.enabled,
            hold_enabled: config.features.hold_enabled,
            rising_mode: config.rising.mode,
        }
    }

    #[must_use]
    pub fn selected(&self) -> MenuItem {
        MenuItem::ALL[self.selected]
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn power_ups_enabled(&self) -> bool {
        self.power_ups_enabled
    }

    #[must_use]
    pub fn hold_enabled(&self) -> bool {
        self.hold_enabled
    }

    #[must_use]
    pub fn rising_mode(&self) -> RisingMode {
        self.rising_mode
    }

    pub fn navigate(&mut self, direction: MenuDirection) {
        let len = MenuItem::ALL.len();
        self.selected = if direction.is_forward() {
            (self.selected + 1) % len
        } else {
            (self.selected + len - 1) % len
        };
    }

    pub fn adjust(&mut self, direction: MenuDirection) {
        match self.selected() {
            MenuItem::Difficulty => {
                self.difficulty = self.difficulty.cycled(direction.is_forward());
            }
            MenuItem::PowerUps => self.power_ups_enabled = !self.power_ups_enabled,
            MenuItem::Hold => self.hold_enabled = !self.hold_enabled,
            MenuItem::RisingLines => {
                self.rising_mode = self.rising_mode.cycled(direction.is_forward());
            }
            MenuItem::Back => {}
        }
    }

    /// The draft expressed as configuration changes.
    ///
    /// The difficulty preset is only included when it differs from the one
    /// the menu opened with, so custom fall speeds survive a round trip.
    #[must_use]
    pub fn changes(&self) -> ArrayVec<ConfigChange, 4> {
        let mut changes = ArrayVec::new();
        if self.initial_difficulty != self.difficulty {
            changes.push(ConfigChange::SetDifficulty(self.difficulty));
        }
        changes.push(ConfigChange::SetPowerUpsEnabled(self.power_ups_enabled));
        changes.push(ConfigChange::SetHoldEnabled(self.hold_enabled));
        changes.push(ConfigChange::SetRisingMode(self.rising_mode));
        changes
    }
}
