//! Opponent generation scaled to the player's level.
use crate::character::CharacterSheet;
use crate::config::OpponentTuning;
use crate::constants::OPPONENT_NAME;
use crate::rng::RollSource;

/// Build a fresh opponent for a player of `player_level`.
///
/// Health and power scale linearly with level; suspicion and the four combat
/// modifiers are drawn from half-open ranges.
pub fn generate_opponent<R>(player_level: u32, cfg: &OpponentTuning, rolls: &mut R) -> CharacterSheet
where
    R: RollSource + ?Sized,
{
    let level = player_level.max(1);
    let scale = i32::try_from(level).unwrap_or(i32::MAX);
    let health = cfg
        .base_health
        .saturating_add(scale.saturating_mul(cfg.health_per_level));
    let power = cfg
        .base_power
        .saturating_add(scale.saturating_mul(cfg.power_per_level));

    let suspicion = rolls.roll_between(0, cfg.suspicion_max.saturating_sub(1).max(0));
    let modifier_high = cfg.modifier_max.saturating_sub(1).max(cfg.modifier_min);
    let mut modifier = || rolls.roll_between(cfg.modifier_min, modifier_high);
    let attack_speed = modifier();
    let attack_power = modifier();
    let defense_speed = modifier();
    let defense_power = modifier();

    log::trace!(
        "opponent rolled | level {level} spd {attack_speed}/{defense_speed} pow {attack_power}/{defense_power}"
    );

    CharacterSheet {
        name: OPPONENT_NAME.to_string(),
        class: None,
        level,
        health,
        max_health: health,
        energy: cfg.energy,
        power,
        suspicion,
        buzz: 0,
        attack_speed,
        attack_power,
        defense_speed,
        defense_power,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRolls;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn stats_scale_with_level() {
        let mut rolls = ScriptedRolls::new().with_integers([42, 5, 6, 7, 9]);
        let opponent = generate_opponent(3, &OpponentTuning::default(), &mut rolls);
        assert_eq!(opponent.name, "Enemy Immortal");
        assert_eq!(opponent.level, 3);
        assert_eq!((opponent.health, opponent.max_health), (130, 130));
        assert_eq!(opponent.power, 16);
        assert_eq!(opponent.energy, 100);
        assert_eq!(opponent.suspicion, 42);
        assert_eq!(
            (
                opponent.attack_speed,
                opponent.attack_power,
                opponent.defense_speed,
                opponent.defense_power
            ),
            (5, 6, 7, 9)
        );
    }

    #[test]
    fn random_ranges_are_half_open() {
        let mut rng = SmallRng::seed_from_u64(0xBEEF);
        let cfg = OpponentTuning::default();
        for _ in 0..1000 {
            let opponent = generate_opponent(1, &cfg, &mut rng);
            assert!((0..100).contains(&opponent.suspicion));
            for value in [
                opponent.attack_speed,
                opponent.attack_power,
                opponent.defense_speed,
                opponent.defense_power,
            ] {
                assert!((5..10).contains(&value));
            }
        }
    }

    #[test]
    fn level_zero_is_treated_as_level_one() {
        let mut rolls = ScriptedRolls::new();
        let opponent = generate_opponent(0, &OpponentTuning::default(), &mut rolls);
        assert_eq!(opponent.level, 1);
        assert_eq!(opponent.health, 110);
        assert_eq!(opponent.power, 12);
    }
}
