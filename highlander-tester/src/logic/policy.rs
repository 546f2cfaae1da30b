use std::fmt;

use highlander_game::{
    ActionKind, BattleAction, CharacterSheet, affordable_actions, recover_action,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Serialize, Serializer};

/// Energy the balanced strategy keeps in reserve before attacking.
const BALANCED_ENERGY_FLOOR: i32 = 40;
/// Health share (percent of max) below which the cautious strategy retreats.
const CAUTIOUS_RETREAT_PCT: i32 = 35;

/// Move returned by a [`PlayerPolicy`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BattleChoice {
    Action(&'static BattleAction),
    Retreat,
}

impl BattleChoice {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Action(action) => action.name,
            Self::Retreat => "Retreat",
        }
    }
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Pick the player's move for the current battle turn.
    fn choose(&mut self, player: &CharacterSheet, opponent: &CharacterSheet) -> BattleChoice;
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameplayStrategy {
    Aggressive,
    Balanced,
    Cautious,
    Random,
}

impl GameplayStrategy {
    pub const ALL: [Self; 4] = [Self::Aggressive, Self::Balanced, Self::Cautious, Self::Random];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Aggressive => "Aggressive",
            Self::Balanced => "Balanced",
            Self::Cautious => "Cautious",
            Self::Random => "Random",
        }
    }

    /// Parse a CLI key such as `balanced`.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.label().eq_ignore_ascii_case(key.trim()))
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Aggressive => Box::new(AggressivePolicy),
            Self::Balanced => Box::new(BalancedPolicy),
            Self::Cautious => Box::new(CautiousPolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl Serialize for GameplayStrategy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct AggressivePolicy;
struct BalancedPolicy;
struct CautiousPolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl PlayerPolicy for AggressivePolicy {
    fn name(&self) -> &'static str {
        "Aggressive"
    }

    fn choose(&mut self, player: &CharacterSheet, _opponent: &CharacterSheet) -> BattleChoice {
        let strongest = affordable_actions(player.energy)
            .into_iter()
            .filter(|action| action.kind == ActionKind::Attack)
            .max_by(|a, b| a.power_multiplier.total_cmp(&b.power_multiplier));
        BattleChoice::Action(strongest.unwrap_or_else(recover_action))
    }
}

impl PlayerPolicy for BalancedPolicy {
    fn name(&self) -> &'static str {
        "Balanced"
    }

    fn choose(&mut self, player: &CharacterSheet, _opponent: &CharacterSheet) -> BattleChoice {
        BattleChoice::Action(balanced_action(player))
    }
}

impl PlayerPolicy for CautiousPolicy {
    fn name(&self) -> &'static str {
        "Cautious"
    }

    fn choose(&mut self, player: &CharacterSheet, _opponent: &CharacterSheet) -> BattleChoice {
        let threshold = player.max_health.saturating_mul(CAUTIOUS_RETREAT_PCT);
        if player.health.saturating_mul(100) < threshold {
            BattleChoice::Retreat
        } else {
            BattleChoice::Action(balanced_action(player))
        }
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn choose(&mut self, player: &CharacterSheet, _opponent: &CharacterSheet) -> BattleChoice {
        let options = affordable_actions(player.energy);
        let pick = self.rng.gen_range(0..=options.len());
        options
            .get(pick)
            .copied()
            .map_or(BattleChoice::Retreat, BattleChoice::Action)
    }
}

/// First affordable attack in catalog order while above the energy floor, else `Delay`.
fn balanced_action(player: &CharacterSheet) -> &'static BattleAction {
    if player.energy < BALANCED_ENERGY_FLOOR {
        return recover_action();
    }
    affordable_actions(player.energy)
        .into_iter()
        .find(|action| action.kind == ActionKind::Attack)
        .unwrap_or_else(recover_action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(health: i32, energy: i32) -> CharacterSheet {
        CharacterSheet {
            health,
            energy,
            ..CharacterSheet::default()
        }
    }

    #[test]
    fn aggressive_prefers_kick_then_falls_back() {
        let mut policy = GameplayStrategy::Aggressive.create_policy(1);
        let foe = sheet(100, 100);
        assert_eq!(policy.choose(&sheet(100, 100), &foe).label(), "Kick");
        assert_eq!(policy.choose(&sheet(100, 22), &foe).label(), "Slash");
        assert_eq!(policy.choose(&sheet(100, 16), &foe).label(), "Thrust");
        assert_eq!(policy.choose(&sheet(100, 5), &foe).label(), "Delay");
    }

    #[test]
    fn balanced_keeps_an_energy_reserve() {
        let mut policy = GameplayStrategy::Balanced.create_policy(1);
        let foe = sheet(100, 100);
        assert_eq!(policy.choose(&sheet(100, 40), &foe).label(), "Slash");
        assert_eq!(policy.choose(&sheet(100, 39), &foe).label(), "Delay");
    }

    #[test]
    fn cautious_retreats_when_hurt() {
        let mut policy = GameplayStrategy::Cautious.create_policy(1);
        let foe = sheet(100, 100);
        assert_eq!(policy.choose(&sheet(34, 100), &foe), BattleChoice::Retreat);
        assert_eq!(policy.choose(&sheet(35, 100), &foe).label(), "Slash");
    }

    #[test]
    fn random_is_seeded_and_only_picks_affordable_moves() {
        let foe = sheet(100, 100);
        let mut a = GameplayStrategy::Random.create_policy(9);
        let mut b = GameplayStrategy::Random.create_policy(9);
        let mut saw_retreat = false;
        for energy in (0..=100).cycle().take(500) {
            let player = sheet(100, energy);
            let left = a.choose(&player, &foe);
            assert_eq!(left, b.choose(&player, &foe));
            match left {
                BattleChoice::Action(action) => assert!(action.is_affordable(energy)),
                BattleChoice::Retreat => saw_retreat = true,
            }
        }
        assert!(saw_retreat);
    }

    #[test]
    fn strategy_keys_parse_case_insensitively() {
        assert_eq!(
            GameplayStrategy::from_key("CAUTIOUS"),
            Some(GameplayStrategy::Cautious)
        );
        assert_eq!(GameplayStrategy::from_key("reckless"), None);
    }
}
