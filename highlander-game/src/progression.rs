//! Top-level game flow: creation, questing and battles.
//!
//! [`ProgressionController`] owns the persistent player sheet and the current
//! [`GamePhase`]. Quests run only while `Playing`; a quest that fills the buzz meter
//! moves the game into `Battle`, where [`ProgressionController::start_battle`] opens a
//! [`BattleSession`] on a copy of the player. When the session resolves, the winner is
//! folded back into the sheet by [`apply_battle_outcome`].
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::battle::{
    BattleError, BattleSession, BattleStatus, LogClock, PlayerTurnOutcome, RetreatReport,
    TurnReport, Winner,
};
use crate::character::{CharacterClass, CharacterSheet};
use crate::config::{BalanceConfig, RewardTuning};
use crate::constants::{METER_FLOOR, OUTCOME_DEFEAT, OUTCOME_RETREAT, OUTCOME_VICTORY};
use crate::policy::{OpponentPolicy, RandomAffordablePolicy};
use crate::quest::{QuestOutcome, run_quest};
use crate::rng::RollSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    Creation,
    Playing,
    Battle,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Creation => write!(f, "creation"),
            Self::Playing => write!(f, "playing"),
            Self::Battle => write!(f, "battle"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProgressionError {
    #[error("a character needs a name")]
    MissingName,
    #[error("a character needs a class")]
    MissingClass,
    #[error("expected {expected} phase, game is in {actual}")]
    WrongPhase {
        expected: GamePhase,
        actual: GamePhase,
    },
    #[error("no battle is in progress")]
    NoActiveBattle,
    #[error("a battle is already in progress")]
    BattleInProgress,
    #[error("the battle has not resolved with that outcome")]
    BattleUnresolved,
    #[error(transparent)]
    Battle(#[from] BattleError),
}

/// Sheet after a battle ends with `winner`.
///
/// A win levels up and fully heals; a loss resets to creation defaults (name and
/// class included); a retreat only relieves buzz, floored at zero.
#[must_use]
pub fn apply_battle_outcome(
    character: &CharacterSheet,
    winner: Winner,
    cfg: &RewardTuning,
) -> CharacterSheet {
    match winner {
        Winner::Player => {
            let max_health = character.max_health.saturating_add(cfg.max_health_per_win);
            CharacterSheet {
                level: character.level.saturating_add(cfg.levels_per_win),
                health: max_health,
                max_health,
                power: character.power.saturating_add(cfg.power_per_win),
                buzz: METER_FLOOR,
                ..character.clone()
            }
        }
        Winner::Opponent => CharacterSheet::default(),
        Winner::Retreat => CharacterSheet {
            buzz: character
                .buzz
                .saturating_sub(cfg.retreat_buzz_relief)
                .max(METER_FLOOR),
            ..character.clone()
        },
    }
}

/// Announcement shown once a battle ends.
#[must_use]
pub const fn outcome_message(winner: Winner) -> &'static str {
    match winner {
        Winner::Player => OUTCOME_VICTORY,
        Winner::Opponent => OUTCOME_DEFEAT,
        Winner::Retreat => OUTCOME_RETREAT,
    }
}

/// Phase the game enters after a battle ends with `winner`.
#[must_use]
pub const fn phase_after(winner: Winner) -> GamePhase {
    match winner {
        Winner::Opponent => GamePhase::Creation,
        Winner::Player | Winner::Retreat => GamePhase::Playing,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeReport {
    pub winner: Winner,
    pub message: &'static str,
    pub character: CharacterSheet,
    pub phase: GamePhase,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerMove {
    Action(PlayerTurnOutcome),
    Retreat(RetreatReport),
}

/// One controller-driven exchange: the player's move, the opponent's reply if the
/// battle continued, and the applied outcome if it ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeReport {
    pub player_move: PlayerMove,
    pub opponent_turn: Option<TurnReport>,
    pub outcome: Option<OutcomeReport>,
}

#[derive(Debug, Clone)]
pub struct ProgressionController<P = RandomAffordablePolicy> {
    cfg: BalanceConfig,
    phase: GamePhase,
    character: CharacterSheet,
    battle: Option<BattleSession>,
    policy: P,
    clock: LogClock,
}

impl Default for ProgressionController {
    fn default() -> Self {
        Self::new(BalanceConfig::default())
    }
}

impl ProgressionController {
    #[must_use]
    pub fn new(cfg: BalanceConfig) -> Self {
        Self::with_policy(cfg, RandomAffordablePolicy)
    }
}

impl<P: OpponentPolicy> ProgressionController<P> {
    #[must_use]
    pub fn with_policy(cfg: BalanceConfig, policy: P) -> Self {
        Self {
            cfg,
            phase: GamePhase::Creation,
            character: CharacterSheet::default(),
            battle: None,
            policy,
            clock: LogClock::default(),
        }
    }

    /// Timestamp source for battle logs opened from now on.
    #[must_use]
    pub fn with_clock(mut self, clock: LogClock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    #[must_use]
    pub const fn character(&self) -> &CharacterSheet {
        &self.character
    }

    #[must_use]
    pub const fn battle(&self) -> Option<&BattleSession> {
        self.battle.as_ref()
    }

    #[must_use]
    pub const fn config(&self) -> &BalanceConfig {
        &self.cfg
    }

    #[must_use]
    pub const fn policy(&self) -> &P {
        &self.policy
    }

    /// Create the player character and enter the `Playing` phase.
    ///
    /// # Errors
    ///
    /// Fails outside the `Creation` phase, for a blank name, or without a class.
    pub fn create_character(
        &mut self,
        name: &str,
        class: Option<CharacterClass>,
    ) -> Result<&CharacterSheet, ProgressionError> {
        self.ensure_phase(GamePhase::Creation)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ProgressionError::MissingName);
        }
        let class = class.ok_or(ProgressionError::MissingClass)?;
        self.character = CharacterSheet::new(name, class);
        self.transition(GamePhase::Playing);
        Ok(&self.character)
    }

    /// Run one quest. A filled buzz meter moves the game into `Battle`.
    ///
    /// # Errors
    ///
    /// Fails outside the `Playing` phase.
    pub fn start_quest<R>(&mut self, rolls: &mut R) -> Result<QuestOutcome, ProgressionError>
    where
        R: RollSource + ?Sized,
    {
        self.ensure_phase(GamePhase::Playing)?;
        let outcome = run_quest(&self.character, &self.cfg.quest, rolls);
        self.character = outcome.character.clone();
        if outcome.battle_triggered {
            self.transition(GamePhase::Battle);
        }
        Ok(outcome)
    }

    /// Open a battle session against a freshly generated opponent.
    ///
    /// # Errors
    ///
    /// Fails outside the `Battle` phase or when a session is already open.
    pub fn start_battle<R>(&mut self, rolls: &mut R) -> Result<&BattleSession, ProgressionError>
    where
        R: RollSource + ?Sized,
    {
        self.ensure_phase(GamePhase::Battle)?;
        if self.battle.is_some() {
            return Err(ProgressionError::BattleInProgress);
        }
        let session =
            BattleSession::start(&self.character, &self.cfg, rolls).with_clock(self.clock);
        Ok(self.battle.insert(session))
    }

    /// Submit a player action, then let the opponent reply and settle the outcome.
    ///
    /// # Errors
    ///
    /// Fails outside the `Battle` phase, without an open session, or for an action
    /// name outside the catalog.
    pub fn submit_action<R>(
        &mut self,
        action_name: &str,
        rolls: &mut R,
    ) -> Result<ExchangeReport, ProgressionError>
    where
        R: RollSource,
    {
        let session = self.active_battle()?;
        let outcome = session.submit_player_action(action_name, rolls)?;
        self.finish_exchange(PlayerMove::Action(outcome), rolls)
    }

    /// Attempt to retreat, then let the opponent reply if the attempt failed.
    ///
    /// # Errors
    ///
    /// Fails outside the `Battle` phase or without an open session.
    pub fn attempt_retreat<R>(&mut self, rolls: &mut R) -> Result<ExchangeReport, ProgressionError>
    where
        R: RollSource,
    {
        let session = self.active_battle()?;
        let report = session.attempt_retreat(rolls)?;
        self.finish_exchange(PlayerMove::Retreat(report), rolls)
    }

    /// Fold a finished battle into the player sheet and leave the `Battle` phase.
    ///
    /// # Errors
    ///
    /// Fails outside the `Battle` phase, without an open session, or when the session
    /// has not resolved with `winner`.
    pub fn apply_battle_outcome(&mut self, winner: Winner) -> Result<OutcomeReport, ProgressionError> {
        self.ensure_phase(GamePhase::Battle)?;
        let session = self.battle.as_ref().ok_or(ProgressionError::NoActiveBattle)?;
        if session.winner() != Some(winner) {
            return Err(ProgressionError::BattleUnresolved);
        }
        self.battle = None;
        self.character = apply_battle_outcome(&self.character, winner, &self.cfg.rewards);
        let phase = phase_after(winner);
        self.transition(phase);
        log::debug!("battle outcome applied | {winner} -> {}", self.character.status_line());
        Ok(OutcomeReport {
            winner,
            message: outcome_message(winner),
            character: self.character.clone(),
            phase,
        })
    }

    fn finish_exchange<R>(
        &mut self,
        player_move: PlayerMove,
        rolls: &mut R,
    ) -> Result<ExchangeReport, ProgressionError>
    where
        R: RollSource,
    {
        let session = self.battle.as_mut().ok_or(ProgressionError::NoActiveBattle)?;
        let opponent_turn = if session.status() == BattleStatus::OpponentTurn {
            Some(session.run_opponent_turn(&mut self.policy, rolls)?)
        } else {
            None
        };
        let outcome = match session.winner() {
            Some(winner) => Some(self.apply_battle_outcome(winner)?),
            None => None,
        };
        Ok(ExchangeReport {
            player_move,
            opponent_turn,
            outcome,
        })
    }

    fn active_battle(&mut self) -> Result<&mut BattleSession, ProgressionError> {
        self.ensure_phase(GamePhase::Battle)?;
        self.battle.as_mut().ok_or(ProgressionError::NoActiveBattle)
    }

    fn ensure_phase(&self, expected: GamePhase) -> Result<(), ProgressionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(ProgressionError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    fn transition(&mut self, next: GamePhase) {
        if self.phase != next {
            log::debug!("phase {} -> {next}", self.phase);
        }
        self.phase = next;
    }
}
