//! Opponent decision policies.
use crate::actions::{BattleAction, affordable_actions, recover_action};
use crate::character::CharacterSheet;
use crate::rng::RollSource;

/// Decision returned by an [`OpponentPolicy`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyDecision {
    pub action: &'static BattleAction,
    /// Set when no catalog action was affordable and the policy fell back to recovery.
    pub forced: bool,
}

impl PolicyDecision {
    #[must_use]
    pub const fn chosen(action: &'static BattleAction) -> Self {
        Self {
            action,
            forced: false,
        }
    }

    #[must_use]
    pub fn forced_recover() -> Self {
        Self {
            action: recover_action(),
            forced: true,
        }
    }
}

/// Chooses the non-player side's action each opponent turn.
pub trait OpponentPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Pick exactly one action for `opponent`. Must always return a decision.
    fn choose(
        &mut self,
        opponent: &CharacterSheet,
        player: &CharacterSheet,
        rolls: &mut dyn RollSource,
    ) -> PolicyDecision;
}

/// Uniform pick among the actions the opponent can currently afford.
///
/// If nothing is affordable the opponent is forced to recover (`Delay`) instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomAffordablePolicy;

impl OpponentPolicy for RandomAffordablePolicy {
    fn name(&self) -> &'static str {
        "random-affordable"
    }

    fn choose(
        &mut self,
        opponent: &CharacterSheet,
        _player: &CharacterSheet,
        rolls: &mut dyn RollSource,
    ) -> PolicyDecision {
        let affordable = affordable_actions(opponent.energy);
        if affordable.is_empty() {
            log::warn!(
                "opponent has no affordable action at energy {}; forcing recovery",
                opponent.energy
            );
            return PolicyDecision::forced_recover();
        }
        let index = rolls.pick_index(affordable.len());
        affordable
            .get(index)
            .copied()
            .map_or_else(PolicyDecision::forced_recover, PolicyDecision::chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRolls;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn opponent_with_energy(energy: i32) -> CharacterSheet {
        CharacterSheet {
            energy,
            ..CharacterSheet::default()
        }
    }

    #[test]
    fn picks_by_index_among_affordable_actions() {
        let mut policy = RandomAffordablePolicy;
        let player = CharacterSheet::default();
        let mut rolls = ScriptedRolls::new().with_picks([0, 3]);
        let low = opponent_with_energy(10);
        let first = policy.choose(&low, &player, &mut rolls);
        assert_eq!(first.action.name, "Parry");
        let second = policy.choose(&opponent_with_energy(100), &player, &mut rolls);
        assert_eq!(second.action.name, "Dodge");
        assert!(!second.forced);
    }

    #[test]
    fn never_picks_an_unaffordable_action() {
        let mut policy = RandomAffordablePolicy;
        let player = CharacterSheet::default();
        let mut rng = SmallRng::seed_from_u64(99);
        for energy in -30..=100 {
            let opponent = opponent_with_energy(energy);
            for _ in 0..20 {
                let decision = policy.choose(&opponent, &player, &mut rng);
                assert!(decision.action.energy_cost <= energy);
            }
        }
    }

    #[test]
    fn empty_affordable_set_forces_recovery() {
        let mut policy = RandomAffordablePolicy;
        let mut rolls = ScriptedRolls::new();
        let decision = policy.choose(
            &opponent_with_energy(-500),
            &CharacterSheet::default(),
            &mut rolls,
        );
        assert!(decision.forced);
        assert_eq!(decision.action.name, "Delay");
    }
}
