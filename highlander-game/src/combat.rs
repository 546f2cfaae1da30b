//! Hit-chance and damage arithmetic.
//!
//! Everything here is pure given the combatants, the tuning and the random source;
//! applying the result to the sheets is the battle session's job.
use serde::Serialize;

use crate::actions::{ActionKind, BattleAction};
use crate::character::CharacterSheet;
use crate::config::CombatTuning;
use crate::numbers::floor_f64_to_i32;
use crate::rng::RollSource;

/// What a resolved action did, before it is applied to either sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ActionEffect {
    Hit { damage: i32, roll: f64, chance: i32 },
    Miss { roll: f64, chance: i32 },
    Brace,
    Recover,
}

impl ActionEffect {
    #[must_use]
    pub const fn damage(self) -> i32 {
        match self {
            Self::Hit { damage, .. } => damage,
            Self::Miss { .. } | Self::Brace | Self::Recover => 0,
        }
    }
}

/// Percent chance that `attacker` lands a blow on `defender`, clamped to the tuning window.
#[must_use]
pub fn hit_chance(attacker: &CharacterSheet, defender: &CharacterSheet, cfg: &CombatTuning) -> i32 {
    let speed_difference = attacker.attack_speed.saturating_sub(defender.defense_speed);
    cfg.base_hit_chance
        .saturating_add(speed_difference.saturating_mul(cfg.speed_weight))
        .clamp(cfg.min_hit_chance, cfg.max_hit_chance)
}

/// Share of incoming damage that gets through `defender`'s defense, in `[0, 1]`.
#[must_use]
pub fn defense_factor(defender: &CharacterSheet, cfg: &CombatTuning) -> f64 {
    (1.0 - f64::from(defender.defense_power) / cfg.defense_divisor).max(0.0)
}

/// Damage before the random variance is applied.
#[must_use]
pub fn raw_damage(
    attacker: &CharacterSheet,
    defender: &CharacterSheet,
    power_multiplier: f64,
    cfg: &CombatTuning,
) -> f64 {
    let base = f64::from(attacker.power) * power_multiplier;
    base * defense_factor(defender, cfg)
}

/// Final damage for a given variance factor: `floor(raw * factor)`, never negative.
#[must_use]
pub fn damage_with_variance(
    attacker: &CharacterSheet,
    defender: &CharacterSheet,
    power_multiplier: f64,
    variance: f64,
    cfg: &CombatTuning,
) -> i32 {
    floor_f64_to_i32(raw_damage(attacker, defender, power_multiplier, cfg) * variance).max(0)
}

/// Damage with a variance factor drawn from the tuning window.
pub fn damage<R>(
    attacker: &CharacterSheet,
    defender: &CharacterSheet,
    power_multiplier: f64,
    cfg: &CombatTuning,
    rolls: &mut R,
) -> i32
where
    R: RollSource + ?Sized,
{
    let variance = rolls.roll_factor(cfg.variance_min, cfg.variance_max);
    damage_with_variance(attacker, defender, power_multiplier, variance, cfg)
}

/// Resolve `action` from `attacker` against `defender` without mutating either.
///
/// Attacks draw a hit roll and, on success, a damage variance. Defense moves only
/// produce flavor text this turn and recovery only changes energy.
pub fn resolve_action<R>(
    attacker: &CharacterSheet,
    defender: &CharacterSheet,
    action: &BattleAction,
    cfg: &CombatTuning,
    rolls: &mut R,
) -> ActionEffect
where
    R: RollSource + ?Sized,
{
    match action.kind {
        ActionKind::Attack => {
            let chance = hit_chance(attacker, defender, cfg);
            let roll = rolls.roll_percent();
            log::trace!("{} roll {roll:.2} vs {chance}", action.name);
            if roll < f64::from(chance) {
                let amount = damage(attacker, defender, action.power_multiplier, cfg, rolls);
                ActionEffect::Hit {
                    damage: amount,
                    roll,
                    chance,
                }
            } else {
                ActionEffect::Miss { roll, chance }
            }
        }
        ActionKind::Defense => ActionEffect::Brace,
        ActionKind::Recover => ActionEffect::Recover,
    }
}
