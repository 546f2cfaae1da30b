use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;
use std::sync::Arc;

use highlander_game::{
    BalanceConfig, CharacterClass, CharacterSheet, GamePhase, LogClock, PlayerMove,
    PlayerTurnOutcome, ProgressionController, QuestOutcome, RngBundle, Winner,
};

use super::policy::{BattleChoice, GameplayStrategy, PlayerPolicy};

const CHARACTER_NAME: &str = "Connor";
const DEFAULT_MAX_BATTLES: u32 = 10;
const DEFAULT_MAX_QUESTS: u32 = 2_000;
/// Exchanges allowed per battle before the run is declared stuck.
const EXCHANGE_CAP: u32 = 1_000;
const TRANSCRIPT_CLOCK: LogClock = LogClock::Fixed("00:00:00");

/// Declarative plan for running a career simulation.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub strategy: GameplayStrategy,
    pub max_battles: u32,
    pub max_quests: u32,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(strategy: GameplayStrategy) -> Self {
        Self {
            strategy,
            max_battles: DEFAULT_MAX_BATTLES,
            max_quests: DEFAULT_MAX_QUESTS,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_max_battles(mut self, max_battles: u32) -> Self {
        self.max_battles = max_battles;
        self
    }

    #[must_use]
    pub fn with_max_quests(mut self, max_quests: u32) -> Self {
        self.max_quests = max_quests;
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: GameplayStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Why a career simulation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    BattleBudget,
    Defeated,
    QuestCap,
}

impl StopReason {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BattleBudget => "battle budget reached",
            Self::Defeated => "defeated",
            Self::QuestCap => "quest cap reached",
        }
    }
}

/// One fought battle.
#[derive(Debug, Clone, Serialize)]
pub struct BattleRecord {
    pub player_level: u32,
    pub opponent_level: u32,
    pub opponent_health: i32,
    pub exchanges: u32,
    pub turns: u32,
    pub rejected_actions: u32,
    pub retreat_attempts: u32,
    pub winner: Winner,
    pub buzz_after: i32,
    pub log_entries: u32,
}

/// Aggregated observations from a single career.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CareerMetrics {
    pub quests: u32,
    pub battles_triggered: u32,
    pub wins: u32,
    pub losses: u32,
    pub retreats: u32,
    pub peak_level: u32,
    pub peak_max_health: i32,
    /// Quest or battle results that left a meter outside `[0, 100]` or health outside
    /// `[0, max_health]`.
    pub bound_violations: u32,
    pub battles: Vec<BattleRecord>,
}

impl CareerMetrics {
    fn observe_sheet(&mut self, sheet: &CharacterSheet) {
        self.peak_level = self.peak_level.max(sheet.level);
        self.peak_max_health = self.peak_max_health.max(sheet.max_health);
        let meters_ok = (0..=100).contains(&sheet.buzz) && (0..=100).contains(&sheet.suspicion);
        let health_ok = (0..=sheet.max_health).contains(&sheet.health);
        if !(meters_ok && health_ok) {
            self.bound_violations += 1;
        }
    }

    fn record_quest(&mut self, outcome: &QuestOutcome) {
        self.quests += 1;
        if outcome.battle_triggered {
            self.battles_triggered += 1;
        }
        self.observe_sheet(&outcome.character);
    }

    fn record_battle(&mut self, record: BattleRecord) {
        match record.winner {
            Winner::Player => self.wins += 1,
            Winner::Opponent => self.losses += 1,
            Winner::Retreat => self.retreats += 1,
        }
        self.battles.push(record);
    }

    #[must_use]
    pub fn battles_fought(&self) -> u32 {
        self.wins + self.losses + self.retreats
    }

    #[must_use]
    pub fn retreat_attempts(&self) -> u32 {
        self.battles.iter().map(|b| b.retreat_attempts).sum()
    }

    #[must_use]
    pub fn rejected_actions(&self) -> u32 {
        self.battles.iter().map(|b| b.rejected_actions).sum()
    }
}

/// Complete record of a simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub class: CharacterClass,
    pub metrics: CareerMetrics,
    pub final_character: CharacterSheet,
    pub final_phase: GamePhase,
    pub stop_reason: StopReason,
    pub rng_draws: u64,
}

/// Headless deterministic runner for the core game logic.
#[derive(Debug, Clone)]
pub struct GameTester {
    balance: BalanceConfig,
    verbose: bool,
}

impl GameTester {
    #[must_use]
    pub const fn new(balance: BalanceConfig, verbose: bool) -> Self {
        Self { balance, verbose }
    }

    /// Play one career from character creation until the plan's limits or a defeat.
    ///
    /// # Errors
    ///
    /// Returns an error when the engine rejects a move the runner considered legal or a
    /// battle fails to resolve.
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
        let bundle = RngBundle::from_user_seed(seed);
        let class = class_for_seed(seed);
        let mut controller =
            ProgressionController::new(self.balance.clone()).with_clock(TRANSCRIPT_CLOCK);
        controller
            .create_character(CHARACTER_NAME, Some(class))
            .context("character creation")?;

        let mut policy = plan.strategy.create_policy(seed);
        let mut metrics = CareerMetrics::default();
        metrics.observe_sheet(controller.character());

        if self.verbose {
            println!(
                "  ↳ seed {seed} | {} the {class} | strategy {}",
                CHARACTER_NAME,
                policy.name()
            );
        }

        let stop_reason = loop {
            match controller.phase() {
                GamePhase::Creation => break StopReason::Defeated,
                GamePhase::Playing => {
                    if metrics.quests >= plan.max_quests {
                        break StopReason::QuestCap;
                    }
                    let outcome = controller
                        .start_quest(&mut *bundle.quest())
                        .context("quest")?;
                    metrics.record_quest(&outcome);
                }
                GamePhase::Battle => {
                    if metrics.battles_fought() >= plan.max_battles {
                        break StopReason::BattleBudget;
                    }
                    let record = self.fight(&mut controller, policy.as_mut(), &bundle)?;
                    metrics.observe_sheet(controller.character());
                    metrics.record_battle(record);
                }
            }
        };

        log::debug!(
            "career finished | seed {seed} strategy {} stop {} quests {} battles {}",
            plan.strategy,
            stop_reason.label(),
            metrics.quests,
            metrics.battles_fought()
        );

        Ok(SimulationSummary {
            seed,
            strategy: plan.strategy,
            class,
            final_character: controller.character().clone(),
            final_phase: controller.phase(),
            stop_reason,
            rng_draws: bundle.total_draws(),
            metrics,
        })
    }

    fn fight(
        &self,
        controller: &mut ProgressionController,
        policy: &mut (dyn PlayerPolicy + Send),
        bundle: &RngBundle,
    ) -> Result<BattleRecord> {
        let session = controller
            .start_battle(&mut *bundle.battle())
            .context("opening battle")?;
        let player_level = session.player().level;
        let opponent_level = session.opponent().level;
        let opponent_health = session.opponent().health;
        let mut exchanges = 0;
        let mut turns = 0;
        let mut rejected_actions = 0;
        let mut retreat_attempts = 0;

        while exchanges < EXCHANGE_CAP {
            let session = controller
                .battle()
                .ok_or_else(|| anyhow!("battle session closed before resolution"))?;
            let choice = policy.choose(session.player(), session.opponent());

            let report = match choice {
                BattleChoice::Action(action) => {
                    controller.submit_action(action.name, &mut *bundle.battle())
                }
                BattleChoice::Retreat => controller.attempt_retreat(&mut *bundle.battle()),
            }
            .with_context(|| format!("submitting {}", choice.label()))?;
            exchanges += 1;

            match report.player_move {
                PlayerMove::Action(PlayerTurnOutcome::Rejected { .. }) => rejected_actions += 1,
                PlayerMove::Action(PlayerTurnOutcome::Resolved(_)) => turns += 1,
                PlayerMove::Retreat(_) => {
                    retreat_attempts += 1;
                    turns += 1;
                }
            }
            if report.opponent_turn.is_some() {
                turns += 1;
            }

            if let Some(outcome) = report.outcome {
                if self.verbose {
                    println!(
                        "     ⚔️  lv{player_level} vs lv{opponent_level} ({opponent_health} hp): {} after {turns} turns, {exchanges} exchanges",
                        outcome.winner
                    );
                }
                return Ok(BattleRecord {
                    player_level,
                    opponent_level,
                    opponent_health,
                    exchanges,
                    turns,
                    rejected_actions,
                    retreat_attempts,
                    winner: outcome.winner,
                    buzz_after: outcome.character.buzz,
                    // Rejections are logged without consuming a turn.
                    log_entries: turns + rejected_actions,
                });
            }
        }

        bail!("battle did not resolve within {EXCHANGE_CAP} exchanges")
    }
}

fn class_for_seed(seed: u64) -> CharacterClass {
    let index = usize::try_from(seed % 3).unwrap_or(0);
    CharacterClass::ALL[index]
}
