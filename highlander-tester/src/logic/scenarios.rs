use anyhow::{Result, ensure};

use highlander_game::{GamePhase, Winner};

use super::policy::GameplayStrategy;
use super::simulation::{SimulationPlan, SimulationSummary, StopReason};

/// Logic test scenario: a named plan whose expectations run after every iteration.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub plan: SimulationPlan,
    /// Scenarios that only make sense under one strategy ignore `--strategy`.
    pub pinned_strategy: bool,
}

impl TestScenario {
    fn new(
        key: &'static str,
        name: &'static str,
        description: &'static str,
        plan: SimulationPlan,
    ) -> Self {
        Self {
            key,
            name,
            description,
            plan,
            pinned_strategy: false,
        }
    }

    fn pinned(mut self) -> Self {
        self.pinned_strategy = true;
        self
    }

    /// Copy of this scenario driven by `strategy`, unless the scenario is pinned.
    #[must_use]
    pub fn for_strategy(&self, strategy: GameplayStrategy) -> Self {
        let mut scenario = self.clone();
        if !scenario.pinned_strategy {
            scenario.plan = scenario.plan.with_strategy(strategy);
        }
        scenario
    }

    #[must_use]
    pub fn strategy(&self) -> GameplayStrategy {
        self.plan.strategy
    }
}

pub fn all_scenarios() -> Vec<TestScenario> {
    vec![smoke(), full_career(), retreat_drill(), meter_bounds()]
}

pub fn find_scenario(key: &str) -> Option<TestScenario> {
    let key = key.trim().to_lowercase();
    all_scenarios().into_iter().find(|scenario| scenario.key == key)
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    all_scenarios()
        .into_iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

fn smoke() -> TestScenario {
    TestScenario::new(
        "smoke",
        "Smoke Test",
        "Create a character, quest until buzz peaks and finish one battle",
        SimulationPlan::new(GameplayStrategy::Balanced)
            .with_max_battles(1)
            .with_expectation(smoke_expectation),
    )
}

fn full_career() -> TestScenario {
    TestScenario::new(
        "full-career",
        "Full Career",
        "Play up to 25 battles and check rewards, penalties and phase changes",
        SimulationPlan::new(GameplayStrategy::Balanced)
            .with_max_battles(25)
            .with_max_quests(5_000)
            .with_expectation(tally_expectation)
            .with_expectation(bounds_expectation)
            .with_expectation(progression_expectation),
    )
}

fn retreat_drill() -> TestScenario {
    TestScenario::new(
        "retreat-drill",
        "Retreat Drill",
        "Cautious play: escapes halve buzz and keep the character alive",
        SimulationPlan::new(GameplayStrategy::Cautious)
            .with_max_battles(15)
            .with_max_quests(5_000)
            .with_expectation(tally_expectation)
            .with_expectation(retreat_expectation),
    )
    .pinned()
}

fn meter_bounds() -> TestScenario {
    TestScenario::new(
        "meter-bounds",
        "Meter Bounds",
        "Thousands of quests never push suspicion, buzz or health out of range",
        SimulationPlan::new(GameplayStrategy::Aggressive)
            .with_max_battles(u32::MAX)
            .with_max_quests(3_000)
            .with_expectation(bounds_expectation)
            .with_expectation(|summary: &SimulationSummary| -> Result<()> {
                ensure!(
                    summary.metrics.quests > 0,
                    "career ended before the first quest"
                );
                Ok(())
            }),
    )
}

fn smoke_expectation(summary: &SimulationSummary) -> Result<()> {
    let metrics = &summary.metrics;
    ensure!(metrics.quests > 0, "no quests were run");
    ensure!(
        metrics.battles_triggered >= 1,
        "buzz never triggered a battle in {} quests",
        metrics.quests
    );
    ensure!(
        metrics.battles_fought() == 1,
        "expected exactly one battle, fought {}",
        metrics.battles_fought()
    );
    ensure!(
        summary.final_phase != GamePhase::Battle
            || summary.stop_reason == StopReason::BattleBudget,
        "battle phase left open without a pending battle"
    );
    Ok(())
}

fn tally_expectation(summary: &SimulationSummary) -> Result<()> {
    let metrics = &summary.metrics;
    let recorded = u32::try_from(metrics.battles.len()).unwrap_or(u32::MAX);
    ensure!(
        metrics.wins + metrics.losses + metrics.retreats == recorded,
        "outcome tallies {}+{}+{} disagree with {} recorded battles",
        metrics.wins,
        metrics.losses,
        metrics.retreats,
        recorded
    );
    ensure!(
        metrics.battles_fought() <= metrics.battles_triggered,
        "fought {} battles but only {} were triggered",
        metrics.battles_fought(),
        metrics.battles_triggered
    );
    Ok(())
}

fn bounds_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.metrics.bound_violations == 0,
        "{} meter or health readings left their range",
        summary.metrics.bound_violations
    );
    Ok(())
}

fn progression_expectation(summary: &SimulationSummary) -> Result<()> {
    let metrics = &summary.metrics;
    let final_character = &summary.final_character;
    if summary.stop_reason == StopReason::Defeated {
        ensure!(
            summary.final_phase == GamePhase::Creation,
            "defeat left the game in {} phase",
            summary.final_phase
        );
        ensure!(
            metrics.battles.last().map(|b| b.winner) == Some(Winner::Opponent),
            "career ended in defeat but the last battle was not a loss"
        );
        ensure!(
            final_character.level == 1,
            "defeat should reset level, found {}",
            final_character.level
        );
    } else {
        ensure!(
            final_character.level == metrics.wins + 1,
            "level {} after {} wins",
            final_character.level,
            metrics.wins
        );
        ensure!(
            metrics.losses == 0,
            "career continued after {} losses",
            metrics.losses
        );
    }
    for record in &metrics.battles {
        ensure!(
            record.opponent_level == record.player_level,
            "level {} player met level {} opponent",
            record.player_level,
            record.opponent_level
        );
    }
    Ok(())
}

fn retreat_expectation(summary: &SimulationSummary) -> Result<()> {
    let metrics = &summary.metrics;
    ensure!(
        metrics.retreats <= metrics.retreat_attempts(),
        "{} escapes from {} attempts",
        metrics.retreats,
        metrics.retreat_attempts()
    );
    for record in metrics.battles.iter().filter(|b| b.winner == Winner::Retreat) {
        ensure!(
            record.buzz_after == 50,
            "escape left buzz at {} instead of 50",
            record.buzz_after
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_keys_are_unique_and_listed() {
        let keys: Vec<_> = list_scenarios().into_iter().map(|(key, _)| key).collect();
        let mut deduped = keys.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(keys.len(), deduped.len());
        for key in keys {
            assert!(find_scenario(key).is_some(), "{key} not resolvable");
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(find_scenario(" Smoke ").map(|s| s.key), Some("smoke"));
        assert!(find_scenario("does-not-exist").is_none());
    }

    #[test]
    fn pinned_scenarios_ignore_strategy_override() {
        let drill = find_scenario("retreat-drill").expect("scenario");
        assert_eq!(
            drill.for_strategy(GameplayStrategy::Aggressive).strategy(),
            GameplayStrategy::Cautious
        );
        let smoke = find_scenario("smoke").expect("scenario");
        assert_eq!(
            smoke.for_strategy(GameplayStrategy::Random).strategy(),
            GameplayStrategy::Random
        );
    }
}
