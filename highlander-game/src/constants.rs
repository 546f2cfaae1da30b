//! Fixed defaults and battle texts for Highlander game logic.
//!
//! Tunable arithmetic lives in [`crate::config::BalanceConfig`]; the values here are the
//! creation defaults and the player-facing strings that the engine writes into battle
//! logs and outcome reports.

// Character creation defaults ---------------------------------------------
pub(crate) const START_LEVEL: u32 = 1;
pub(crate) const START_HEALTH: i32 = 100;
pub(crate) const START_ENERGY: i32 = 100;
pub(crate) const START_POWER: i32 = 10;
pub(crate) const START_MODIFIER: i32 = 5;
pub(crate) const METER_FLOOR: i32 = 0;
pub(crate) const METER_CAP: i32 = 100;

pub(crate) const OPPONENT_NAME: &str = "Enemy Immortal";

// Battle log texts ----------------------------------------------------------
pub(crate) const LOG_INSUFFICIENT_ENERGY: &str = "Not enough energy for this action!";
pub(crate) const LOG_PLAYER_RECOVER: &str = "You delay and recover some energy.";
pub(crate) const LOG_OPPONENT_RECOVER: &str = "Opponent delays and recovers some energy.";
pub(crate) const LOG_RETREAT_SUCCESS: &str = "You successfully retreated from the battle!";
pub(crate) const LOG_RETREAT_FAILURE: &str = "Retreat failed! The opponent blocks your escape.";

// Outcome announcements -----------------------------------------------------
pub(crate) const OUTCOME_VICTORY: &str = "Congratulations! You won the battle and leveled up!";
pub(crate) const OUTCOME_DEFEAT: &str = "You lost the battle. Game over!";
pub(crate) const OUTCOME_RETREAT: &str = "You retreated from the battle.";

// Quest texts ---------------------------------------------------------------
pub(crate) const QUEST_BATTLE_SUMMARY: &str =
    "Your buzz has drawn another immortal to you. Prepare for battle!";

// Clock ---------------------------------------------------------------------
pub(crate) const LOG_TIME_FORMAT: &str = "%H:%M:%S";
