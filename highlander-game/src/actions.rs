//! Battle action catalog.
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

/// Affordable subset of the catalog, stored inline.
pub type ActionSet = SmallVec<[&'static BattleAction; 6]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Attack,
    Defense,
    Recover,
}

/// Immutable catalog entry. Negative `energy_cost` restores energy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleAction {
    pub name: &'static str,
    pub kind: ActionKind,
    pub energy_cost: i32,
    pub power_multiplier: f64,
}

impl BattleAction {
    #[must_use]
    pub const fn is_affordable(&self, energy: i32) -> bool {
        self.energy_cost <= energy
    }
}

impl fmt::Display for BattleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} energy)", self.name, self.energy_cost)
    }
}

pub const ACTION_CATALOG: [BattleAction; 6] = [
    BattleAction {
        name: "Slash",
        kind: ActionKind::Attack,
        energy_cost: 20,
        power_multiplier: 1.2,
    },
    BattleAction {
        name: "Thrust",
        kind: ActionKind::Attack,
        energy_cost: 15,
        power_multiplier: 1.0,
    },
    BattleAction {
        name: "Parry",
        kind: ActionKind::Defense,
        energy_cost: 10,
        power_multiplier: 1.2,
    },
    BattleAction {
        name: "Dodge",
        kind: ActionKind::Defense,
        energy_cost: 15,
        power_multiplier: 1.0,
    },
    BattleAction {
        name: "Kick",
        kind: ActionKind::Attack,
        energy_cost: 25,
        power_multiplier: 1.5,
    },
    BattleAction {
        name: "Delay",
        kind: ActionKind::Recover,
        energy_cost: -30,
        power_multiplier: 0.0,
    },
];

const RECOVER_INDEX: usize = 5;

/// Full catalog in display order.
#[must_use]
pub fn catalog() -> &'static [BattleAction] {
    &ACTION_CATALOG
}

/// Look up an action by name, ignoring ASCII case and surrounding whitespace.
#[must_use]
pub fn find_action(name: &str) -> Option<&'static BattleAction> {
    let wanted = name.trim();
    ACTION_CATALOG
        .iter()
        .find(|action| action.name.eq_ignore_ascii_case(wanted))
}

/// Catalog entries whose cost does not exceed `energy`, in catalog order.
#[must_use]
pub fn affordable_actions(energy: i32) -> ActionSet {
    ACTION_CATALOG
        .iter()
        .filter(|action| action.is_affordable(energy))
        .collect()
}

/// The always-affordable recovery move (`Delay`).
#[must_use]
pub fn recover_action() -> &'static BattleAction {
    &ACTION_CATALOG[RECOVER_INDEX]
}
