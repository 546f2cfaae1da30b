//! Turn-based battle state machine.
//!
//! A [`BattleSession`] owns a copy of the player sheet, a freshly generated opponent,
//! whose turn it is, and an append-only battle log (newest entry first). The player
//! acts through [`BattleSession::submit_player_action`] or
//! [`BattleSession::attempt_retreat`]; the opponent acts through
//! [`BattleSession::run_opponent_turn`]. After every resolution the session checks
//! both health pools and moves to [`BattleStatus::Resolved`] when either is exhausted.
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

use crate::actions::{ActionSet, BattleAction, affordable_actions, find_action};
use crate::character::CharacterSheet;
use crate::combat::{ActionEffect, resolve_action};
use crate::config::{BalanceConfig, CombatTuning, RetreatTuning};
use crate::constants::{
    LOG_INSUFFICIENT_ENERGY, LOG_OPPONENT_RECOVER, LOG_PLAYER_RECOVER, LOG_RETREAT_FAILURE,
    LOG_RETREAT_SUCCESS, LOG_TIME_FORMAT,
};
use crate::numbers::i64_to_f64;
use crate::opponent::generate_opponent;
use crate::policy::OpponentPolicy;
use crate::rng::RollSource;

/// Which combatant acted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Player,
    Opponent,
}

/// How a battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Player,
    Opponent,
    Retreat,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "player"),
            Self::Opponent => write!(f, "opponent"),
            Self::Retreat => write!(f, "retreat"),
        }
    }
}

/// Observable battle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleStatus {
    PlayerTurn,
    OpponentTurn,
    Resolved(Winner),
}

impl BattleStatus {
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    #[must_use]
    pub const fn winner(self) -> Option<Winner> {
        match self {
            Self::Resolved(winner) => Some(winner),
            Self::PlayerTurn | Self::OpponentTurn => None,
        }
    }
}

/// Source of the display timestamp attached to each log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogClock {
    /// Local wall-clock time, `HH:MM:SS`.
    #[default]
    Wall,
    /// Constant text, for reproducible transcripts.
    Fixed(&'static str),
}

impl LogClock {
    #[must_use]
    pub fn stamp(self) -> String {
        match self {
            Self::Wall => chrono::Local::now().format(LOG_TIME_FORMAT).to_string(),
            Self::Fixed(text) => text.to_string(),
        }
    }
}

/// One battle log line. Entries are never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleLogEntry {
    /// 1-based turn in progress when the entry was written.
    pub turn: u32,
    /// Display-only.
    pub timestamp: String,
    pub message: String,
}

/// Result of one resolved action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnReport {
    pub side: Side,
    pub action: &'static BattleAction,
    pub effect: ActionEffect,
    pub message: String,
    pub status: BattleStatus,
    /// The opponent policy had nothing affordable and fell back to recovery.
    pub forced: bool,
}

/// Result of a player action submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PlayerTurnOutcome {
    /// Not enough energy; only a log entry was appended and the turn is not consumed.
    Rejected {
        action: &'static BattleAction,
        energy: i32,
    },
    Resolved(TurnReport),
}

/// Result of a retreat attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RetreatReport {
    pub chance: i64,
    pub roll: f64,
    pub escaped: bool,
    pub status: BattleStatus,
}

/// Misuse of a battle session. Game-rule rejections are not errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BattleError {
    #[error("unknown battle action '{0}'")]
    UnknownAction(String),
    #[error("it is not the player's turn")]
    NotPlayerTurn,
    #[error("it is not the opponent's turn")]
    NotOpponentTurn,
    #[error("battle already resolved ({0})")]
    AlreadyResolved(Winner),
}

/// `base + per_level * (player.level - opponent.level)`, unclamped.
#[must_use]
pub fn retreat_chance(
    player: &CharacterSheet,
    opponent: &CharacterSheet,
    cfg: &RetreatTuning,
) -> i64 {
    let level_difference = i64::from(player.level) - i64::from(opponent.level);
    i64::from(cfg.base_chance) + i64::from(cfg.per_level) * level_difference
}

#[derive(Debug, Clone)]
pub struct BattleSession {
    player: CharacterSheet,
    opponent: CharacterSheet,
    status: BattleStatus,
    log: VecDeque<BattleLogEntry>,
    turns_taken: u32,
    combat: CombatTuning,
    retreat: RetreatTuning,
    clock: LogClock,
}

impl BattleSession {
    /// Start a battle against an opponent generated from the player's level.
    pub fn start<R>(player: &CharacterSheet, cfg: &BalanceConfig, rolls: &mut R) -> Self
    where
        R: RollSource + ?Sized,
    {
        let opponent = generate_opponent(player.level, &cfg.opponent, rolls);
        Self::with_opponent(player.clone(), opponent, cfg)
    }

    /// Start a battle against a prepared opponent.
    #[must_use]
    pub fn with_opponent(
        player: CharacterSheet,
        opponent: CharacterSheet,
        cfg: &BalanceConfig,
    ) -> Self {
        log::debug!(
            "battle started | {} (lv {}, hp {}) vs {} (lv {}, hp {})",
            player.name,
            player.level,
            player.health,
            opponent.name,
            opponent.level,
            opponent.health
        );
        Self {
            player,
            opponent,
            status: BattleStatus::PlayerTurn,
            log: VecDeque::new(),
            turns_taken: 0,
            combat: cfg.combat.clone(),
            retreat: cfg.retreat.clone(),
            clock: LogClock::default(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: LogClock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn status(&self) -> BattleStatus {
        self.status
    }

    #[must_use]
    pub const fn winner(&self) -> Option<Winner> {
        self.status.winner()
    }

    #[must_use]
    pub const fn player(&self) -> &CharacterSheet {
        &self.player
    }

    #[must_use]
    pub const fn opponent(&self) -> &CharacterSheet {
        &self.opponent
    }

    /// Resolved turns so far (rejected submissions excluded).
    #[must_use]
    pub const fn turns_taken(&self) -> u32 {
        self.turns_taken
    }

    /// Battle log, newest entry first.
    pub fn log(&self) -> impl Iterator<Item = &BattleLogEntry> {
        self.log.iter()
    }

    #[must_use]
    pub fn log_len(&self) -> usize {
        self.log.len()
    }

    #[must_use]
    pub fn latest_message(&self) -> Option<&str> {
        self.log.front().map(|entry| entry.message.as_str())
    }

    /// Actions the player can currently afford.
    #[must_use]
    pub fn available_actions(&self) -> ActionSet {
        affordable_actions(self.player.energy)
    }

    #[must_use]
    pub fn retreat_chance(&self) -> i64 {
        retreat_chance(&self.player, &self.opponent, &self.retreat)
    }

    /// Submit a catalog action by name on the player's turn.
    ///
    /// # Errors
    ///
    /// Returns `BattleError::UnknownAction` for names outside the catalog and a turn
    /// error when the player may not act.
    pub fn submit_player_action<R>(
        &mut self,
        action_name: &str,
        rolls: &mut R,
    ) -> Result<PlayerTurnOutcome, BattleError>
    where
        R: RollSource,
    {
        self.ensure_turn(BattleStatus::PlayerTurn)?;
        let action = find_action(action_name)
            .ok_or_else(|| BattleError::UnknownAction(action_name.trim().to_string()))?;
        self.perform_player_action(action, rolls)
    }

    /// Perform a catalog action on the player's turn.
    ///
    /// # Errors
    ///
    /// Returns a turn error when the player may not act.
    pub fn perform_player_action<R>(
        &mut self,
        action: &'static BattleAction,
        rolls: &mut R,
    ) -> Result<PlayerTurnOutcome, BattleError>
    where
        R: RollSource,
    {
        self.ensure_turn(BattleStatus::PlayerTurn)?;
        if !action.is_affordable(self.player.energy) {
            self.push_log(LOG_INSUFFICIENT_ENERGY.to_string());
            return Ok(PlayerTurnOutcome::Rejected {
                action,
                energy: self.player.energy,
            });
        }
        let report = self.resolve_turn(Side::Player, action, false, rolls);
        Ok(PlayerTurnOutcome::Resolved(report))
    }

    /// Try to leave the battle. Failure hands the turn to the opponent.
    ///
    /// # Errors
    ///
    /// Returns a turn error when the player may not act.
    pub fn attempt_retreat<R>(&mut self, rolls: &mut R) -> Result<RetreatReport, BattleError>
    where
        R: RollSource,
    {
        self.ensure_turn(BattleStatus::PlayerTurn)?;
        let chance = self.retreat_chance();
        let roll = rolls.roll_percent();
        let escaped = roll < i64_to_f64(chance);
        log::trace!("retreat roll {roll:.2} vs {chance}");
        if escaped {
            self.push_log(LOG_RETREAT_SUCCESS.to_string());
            self.status = BattleStatus::Resolved(Winner::Retreat);
            log::debug!("battle resolved | retreat after {} turns", self.turns_taken + 1);
        } else {
            self.push_log(LOG_RETREAT_FAILURE.to_string());
            self.status = BattleStatus::OpponentTurn;
        }
        self.turns_taken = self.turns_taken.saturating_add(1);
        Ok(RetreatReport {
            chance,
            roll,
            escaped,
            status: self.status,
        })
    }

    /// Let `policy` pick and resolve the opponent's action.
    ///
    /// # Errors
    ///
    /// Returns a turn error unless the status is `OpponentTurn`.
    pub fn run_opponent_turn<P, R>(
        &mut self,
        policy: &mut P,
        rolls: &mut R,
    ) -> Result<TurnReport, BattleError>
    where
        P: OpponentPolicy + ?Sized,
        R: RollSource,
    {
        self.ensure_turn(BattleStatus::OpponentTurn)?;
        let decision = policy.choose(&self.opponent, &self.player, rolls);
        Ok(self.resolve_turn(Side::Opponent, decision.action, decision.forced, rolls))
    }

    /// Tear the session down, yielding the winner if the battle finished.
    #[must_use]
    pub fn into_outcome(self) -> Option<Winner> {
        self.status.winner()
    }

    fn ensure_turn(&self, expected: BattleStatus) -> Result<(), BattleError> {
        match self.status {
            BattleStatus::Resolved(winner) => Err(BattleError::AlreadyResolved(winner)),
            status if status == expected => Ok(()),
            BattleStatus::PlayerTurn => Err(BattleError::NotOpponentTurn),
            BattleStatus::OpponentTurn => Err(BattleError::NotPlayerTurn),
        }
    }

    fn resolve_turn<R>(
        &mut self,
        side: Side,
        action: &'static BattleAction,
        forced: bool,
        rolls: &mut R,
    ) -> TurnReport
    where
        R: RollSource,
    {
        let (actor, target) = match side {
            Side::Player => (&self.player, &self.opponent),
            Side::Opponent => (&self.opponent, &self.player),
        };
        let effect = resolve_action(actor, target, action, &self.combat, rolls);
        let message = describe(side, action, effect);

        let (actor, target) = match side {
            Side::Player => (&mut self.player, &mut self.opponent),
            Side::Opponent => (&mut self.opponent, &mut self.player),
        };
        if let ActionEffect::Hit { damage, .. } = effect {
            target.take_damage(damage);
        }
        actor.spend_energy(action.energy_cost);

        self.push_log(message.clone());
        self.turns_taken = self.turns_taken.saturating_add(1);
        self.status = self.status_after(side);
        if let BattleStatus::Resolved(winner) = self.status {
            log::debug!(
                "battle resolved | winner {winner} after {} turns",
                self.turns_taken
            );
        }

        TurnReport {
            side,
            action,
            effect,
            message,
            status: self.status,
            forced,
        }
    }

    fn status_after(&self, acted: Side) -> BattleStatus {
        // Simultaneous defeat goes to the player.
        if self.opponent.health <= 0 {
            return BattleStatus::Resolved(Winner::Player);
        }
        if self.player.health <= 0 {
            return BattleStatus::Resolved(Winner::Opponent);
        }
        match acted {
            Side::Player => BattleStatus::OpponentTurn,
            Side::Opponent => BattleStatus::PlayerTurn,
        }
    }

    fn push_log(&mut self, message: String) {
        self.log.push_front(BattleLogEntry {
            turn: self.turns_taken.saturating_add(1),
            timestamp: self.clock.stamp(),
            message,
        });
    }
}

fn describe(side: Side, action: &BattleAction, effect: ActionEffect) -> String {
    let name = action.name;
    match (side, effect) {
        (Side::Player, ActionEffect::Hit { damage, .. }) => {
            format!("You {name} the opponent for {damage} damage!")
        }
        (Side::Player, ActionEffect::Miss { .. }) => format!("Your {name} missed!"),
        (Side::Player, ActionEffect::Brace) => format!("You prepare to {name}!"),
        (Side::Player, ActionEffect::Recover) => LOG_PLAYER_RECOVER.to_string(),
        (Side::Opponent, ActionEffect::Hit { damage, .. }) => {
            format!("Opponent {name}s you for {damage} damage!")
        }
        (Side::Opponent, ActionEffect::Miss { .. }) => format!("Opponent's {name} missed!"),
        (Side::Opponent, ActionEffect::Brace) => format!("Opponent prepares to {name}!"),
        (Side::Opponent, ActionEffect::Recover) => LOG_OPPONENT_RECOVER.to_string(),
    }
}
