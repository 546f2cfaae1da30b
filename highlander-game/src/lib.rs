//! Highlander Game Engine
//!
//! Platform-agnostic core logic for Highlander: character creation, quest progression
//! and turn-based battles against generated immortals.
//! This crate provides all game mechanics without UI or platform-specific dependencies.

pub mod actions;
pub mod battle;
pub mod character;
pub mod combat;
pub mod config;
pub mod constants;
pub mod numbers;
pub mod opponent;
pub mod policy;
pub mod progression;
pub mod quest;
pub mod rng;

// Re-export commonly used types
pub use actions::{
    ACTION_CATALOG, ActionKind, ActionSet, BattleAction, affordable_actions, catalog, find_action,
    recover_action,
};
pub use battle::{
    BattleError, BattleLogEntry, BattleSession, BattleStatus, LogClock, PlayerTurnOutcome,
    RetreatReport, Side, TurnReport, Winner, retreat_chance,
};
pub use character::{CharacterClass, CharacterSheet, UnknownClass};
pub use combat::{ActionEffect, damage, hit_chance, resolve_action};
pub use config::{
    BalanceConfig, BalanceConfigError, CombatTuning, OpponentTuning, QuestTuning, RetreatTuning,
    RewardTuning,
};
pub use opponent::generate_opponent;
pub use policy::{OpponentPolicy, PolicyDecision, RandomAffordablePolicy};
pub use progression::{
    ExchangeReport, GamePhase, OutcomeReport, PlayerMove, ProgressionController, ProgressionError,
    apply_battle_outcome, outcome_message, phase_after,
};
pub use quest::{QuestOutcome, quest_summary, run_quest};
pub use rng::{CountingRng, RngBundle, RollSource, ScriptedRolls};
