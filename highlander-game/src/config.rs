//! Balance configuration for combat, retreat, quests, rewards and opponent generation.
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_BALANCE_DATA: &str = include_str!("../assets/data/balance.json");

/// Hit-chance and damage tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatTuning {
    pub base_hit_chance: i32,
    pub speed_weight: i32,
    pub min_hit_chance: i32,
    pub max_hit_chance: i32,
    /// Defense power at which an attack is fully absorbed.
    pub defense_divisor: f64,
    pub variance_min: f64,
    pub variance_max: f64,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            base_hit_chance: 70,
            speed_weight: 2,
            min_hit_chance: 40,
            max_hit_chance: 95,
            defense_divisor: 50.0,
            variance_min: 0.8,
            variance_max: 1.2,
        }
    }
}

/// Retreat odds. The resulting chance is not clamped to [0, 100].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetreatTuning {
    pub base_chance: i32,
    pub per_level: i32,
}

impl Default for RetreatTuning {
    fn default() -> Self {
        Self {
            base_chance: 50,
            per_level: 5,
        }
    }
}

/// Random-walk bounds for a single quest attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestTuning {
    pub suspicion_delta_min: i32,
    pub suspicion_delta_max: i32,
    pub buzz_delta_min: i32,
    pub buzz_delta_max: i32,
    pub meter_cap: i32,
    pub battle_threshold: i32,
}

impl Default for QuestTuning {
    fn default() -> Self {
        Self {
            suspicion_delta_min: -10,
            suspicion_delta_max: 10,
            buzz_delta_min: 0,
            buzz_delta_max: 10,
            meter_cap: 100,
            battle_threshold: 100,
        }
    }
}

/// Sheet changes applied by the progression controller after a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTuning {
    pub levels_per_win: u32,
    pub max_health_per_win: i32,
    pub power_per_win: i32,
    pub retreat_buzz_relief: i32,
}

impl Default for RewardTuning {
    fn default() -> Self {
        Self {
            levels_per_win: 1,
            max_health_per_win: 10,
            power_per_win: 2,
            retreat_buzz_relief: 50,
        }
    }
}

/// Opponent stat scaling. Random ranges are half-open: `[min, max)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentTuning {
    pub base_health: i32,
    pub health_per_level: i32,
    pub energy: i32,
    pub base_power: i32,
    pub power_per_level: i32,
    pub suspicion_max: i32,
    pub modifier_min: i32,
    pub modifier_max: i32,
}

impl Default for OpponentTuning {
    fn default() -> Self {
        Self {
            base_health: 100,
            health_per_level: 10,
            energy: 100,
            base_power: 10,
            power_per_level: 2,
            suspicion_max: 100,
            modifier_min: 5,
            modifier_max: 10,
        }
    }
}

/// Complete balance sheet consumed by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceConfig {
    #[serde(default)]
    pub combat: CombatTuning,
    #[serde(default)]
    pub retreat: RetreatTuning,
    #[serde(default)]
    pub quest: QuestTuning,
    #[serde(default)]
    pub rewards: RewardTuning,
    #[serde(default)]
    pub opponent: OpponentTuning,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        serde_json::from_str(DEFAULT_BALANCE_DATA).unwrap_or_else(|_| Self::builtin())
    }
}

impl BalanceConfig {
    /// Tuning compiled into the engine, independent of the embedded asset.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            combat: CombatTuning::default(),
            retreat: RetreatTuning::default(),
            quest: QuestTuning::default(),
            rewards: RewardTuning::default(),
            opponent: OpponentTuning::default(),
        }
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self::default()
    }

    /// Parse a balance override from JSON text and validate it.
    ///
    /// # Errors
    ///
    /// Returns `BalanceConfigError::Parse` for malformed JSON and the matching
    /// validation error when a field is out of bounds.
    pub fn from_json(text: &str) -> Result<Self, BalanceConfigError> {
        let cfg: Self =
            serde_json::from_str(text).map_err(|err| BalanceConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `BalanceConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), BalanceConfigError> {
        self.validate_combat()?;
        self.validate_quest()?;
        self.validate_rewards()?;
        self.validate_opponent()?;
        Ok(())
    }

    fn validate_combat(&self) -> Result<(), BalanceConfigError> {
        let combat = &self.combat;
        for (field, value) in [
            ("combat.min_hit_chance", combat.min_hit_chance),
            ("combat.max_hit_chance", combat.max_hit_chance),
        ] {
            if !(0..=100).contains(&value) {
                return Err(BalanceConfigError::RangeViolation {
                    field,
                    min: 0,
                    max: 100,
                    value,
                });
            }
        }
        if combat.min_hit_chance > combat.max_hit_chance {
            return Err(BalanceConfigError::EmptyRange {
                field: "combat.hit_chance",
            });
        }
        if combat.defense_divisor.is_nan() || combat.defense_divisor <= 0.0 {
            return Err(BalanceConfigError::NonPositive {
                field: "combat.defense_divisor",
            });
        }
        let variance_ok = combat.variance_min >= 0.0 && combat.variance_min < combat.variance_max;
        if !variance_ok {
            return Err(BalanceConfigError::EmptyRange {
                field: "combat.variance",
            });
        }
        Ok(())
    }

    fn validate_quest(&self) -> Result<(), BalanceConfigError> {
        let quest = &self.quest;
        if quest.suspicion_delta_min > quest.suspicion_delta_max {
            return Err(BalanceConfigError::EmptyRange {
                field: "quest.suspicion_delta",
            });
        }
        if quest.buzz_delta_min > quest.buzz_delta_max {
            return Err(BalanceConfigError::EmptyRange {
                field: "quest.buzz_delta",
            });
        }
        if quest.meter_cap <= 0 {
            return Err(BalanceConfigError::NonPositive {
                field: "quest.meter_cap",
            });
        }
        if !(1..=quest.meter_cap).contains(&quest.battle_threshold) {
            return Err(BalanceConfigError::RangeViolation {
                field: "quest.battle_threshold",
                min: 1,
                max: quest.meter_cap,
                value: quest.battle_threshold,
            });
        }
        Ok(())
    }

    fn validate_rewards(&self) -> Result<(), BalanceConfigError> {
        let rewards = &self.rewards;
        for (field, value) in [
            ("rewards.max_health_per_win", rewards.max_health_per_win),
            ("rewards.power_per_win", rewards.power_per_win),
            ("rewards.retreat_buzz_relief", rewards.retreat_buzz_relief),
        ] {
            if value < 0 {
                return Err(BalanceConfigError::RangeViolation {
                    field,
                    min: 0,
                    max: i32::MAX,
                    value,
                });
            }
        }
        Ok(())
    }

    fn validate_opponent(&self) -> Result<(), BalanceConfigError> {
        let opponent = &self.opponent;
        if opponent.base_health <= 0 {
            return Err(BalanceConfigError::NonPositive {
                field: "opponent.base_health",
            });
        }
        if opponent.suspicion_max <= 0 {
            return Err(BalanceConfigError::NonPositive {
                field: "opponent.suspicion_max",
            });
        }
        for (field, value) in [
            ("opponent.health_per_level", opponent.health_per_level),
            ("opponent.power_per_level", opponent.power_per_level),
        ] {
            if value < 0 {
                return Err(BalanceConfigError::RangeViolation {
                    field,
                    min: 0,
                    max: i32::MAX,
                    value,
                });
            }
        }
        if opponent.modifier_min >= opponent.modifier_max {
            return Err(BalanceConfigError::EmptyRange {
                field: "opponent.modifier",
            });
        }
        Ok(())
    }
}

/// Errors raised when balance configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BalanceConfigError {
    #[error("balance config is not valid JSON: {0}")]
    Parse(String),
    #[error("{field} must be between {min} and {max} (got {value})")]
    RangeViolation {
        field: &'static str,
        min: i32,
        max: i32,
        value: i32,
    },
    #[error("{field} describes an empty range")]
    EmptyRange { field: &'static str },
    #[error("{field} must be positive")]
    NonPositive { field: &'static str },
}
