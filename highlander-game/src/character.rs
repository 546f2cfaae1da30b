//! Character sheets for the player and generated opponents.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::{
    METER_CAP, METER_FLOOR, START_ENERGY, START_HEALTH, START_LEVEL, START_MODIFIER, START_POWER,
};

/// Class chosen at character creation. Purely descriptive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterClass {
    Warrior,
    Rogue,
    Scholar,
}

impl CharacterClass {
    pub const ALL: [Self; 3] = [Self::Warrior, Self::Rogue, Self::Scholar];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Warrior => "Warrior",
            Self::Rogue => "Rogue",
            Self::Scholar => "Scholar",
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raised when text does not name a known class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown character class '{0}'")]
pub struct UnknownClass(pub String);

impl FromStr for CharacterClass {
    type Err = UnknownClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|class| class.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownClass(trimmed.to_string()))
    }
}

/// Mutable stat bag shared by the player and battle opponents.
///
/// `energy` is not clamped: accepted actions may drive it below zero
/// and recovery may push it above 100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSheet {
    pub name: String,
    #[serde(default)]
    pub class: Option<CharacterClass>,
    pub level: u32,
    pub health: i32,
    pub max_health: i32,
    pub energy: i32,
    pub power: i32,
    pub suspicion: i32, // 0..100
    pub buzz: i32,      // 0..100, player only
    pub attack_speed: i32,
    pub attack_power: i32,
    pub defense_speed: i32,
    pub defense_power: i32,
}

impl Default for CharacterSheet {
    fn default() -> Self {
        Self {
            name: String::new(),
            class: None,
            level: START_LEVEL,
            health: START_HEALTH,
            max_health: START_HEALTH,
            energy: START_ENERGY,
            power: START_POWER,
            suspicion: 0,
            buzz: 0,
            attack_speed: START_MODIFIER,
            attack_power: START_MODIFIER,
            defense_speed: START_MODIFIER,
            defense_power: START_MODIFIER,
        }
    }
}

impl CharacterSheet {
    /// Fresh level-1 sheet carrying the given identity.
    #[must_use]
    pub fn new(name: impl Into<String>, class: CharacterClass) -> Self {
        Self {
            name: name.into(),
            class: Some(class),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.health <= 0
    }

    /// Reduce health by `amount`, flooring at zero.
    pub fn take_damage(&mut self, amount: i32) {
        self.health = self.health.saturating_sub(amount.max(0)).max(0);
    }

    /// Deduct an action's energy cost. Negative costs restore energy.
    pub fn spend_energy(&mut self, cost: i32) {
        self.energy = self.energy.saturating_sub(cost);
    }

    /// Clamp the quest meters into `[0, 100]`.
    pub fn clamp_meters(&mut self) {
        self.suspicion = self.suspicion.clamp(METER_FLOOR, METER_CAP);
        self.buzz = self.buzz.clamp(METER_FLOOR, METER_CAP);
    }

    /// One-line summary suitable for transcripts.
    #[must_use]
    pub fn status_line(&self) -> String {
        format!(
            "{} Lv{} HP {}/{} EN {} PW {} SUS {}% BUZZ {}%",
            self.name,
            self.level,
            self.health,
            self.max_health,
            self.energy,
            self.power,
            self.suspicion,
            self.buzz
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sheet_matches_creation_defaults() {
        let sheet = CharacterSheet::default();
        assert_eq!(sheet.level, 1);
        assert_eq!((sheet.health, sheet.max_health), (100, 100));
        assert_eq!(sheet.energy, 100);
        assert_eq!(sheet.power, 10);
        assert_eq!((sheet.suspicion, sheet.buzz), (0, 0));
        assert_eq!(
            (
                sheet.attack_speed,
                sheet.attack_power,
                sheet.defense_speed,
                sheet.defense_power
            ),
            (5, 5, 5, 5)
        );
        assert!(sheet.name.is_empty());
        assert!(sheet.class.is_none());
    }

    #[test]
    fn damage_floors_health_at_zero() {
        let mut sheet = CharacterSheet::new("Connor", CharacterClass::Warrior);
        sheet.take_damage(30);
        assert_eq!(sheet.health, 70);
        sheet.take_damage(500);
        assert_eq!(sheet.health, 0);
        assert!(sheet.is_defeated());
        sheet.take_damage(-5);
        assert_eq!(sheet.health, 0);
    }

    #[test]
    fn energy_is_not_clamped() {
        let mut sheet = CharacterSheet::default();
        sheet.spend_energy(-30);
        assert_eq!(sheet.energy, 130);
        sheet.energy = 10;
        sheet.spend_energy(25);
        assert_eq!(sheet.energy, -15);
    }

    #[test]
    fn meters_clamp_into_range() {
        let mut sheet = CharacterSheet::default();
        sheet.suspicion = -4;
        sheet.buzz = 140;
        sheet.clamp_meters();
        assert_eq!((sheet.suspicion, sheet.buzz), (0, 100));
    }

    #[test]
    fn class_parses_case_insensitively() {
        assert_eq!("rogue".parse::<CharacterClass>(), Ok(CharacterClass::Rogue));
        assert_eq!(
            " SCHOLAR ".parse::<CharacterClass>(),
            Ok(CharacterClass::Scholar)
        );
        assert_eq!(
            "bard".parse::<CharacterClass>(),
            Err(UnknownClass("bard".to_string()))
        );
    }
}
