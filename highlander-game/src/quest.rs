//! Quest attempts: one random-walk step on the suspicion and buzz meters.
use serde::{Deserialize, Serialize};

use crate::character::CharacterSheet;
use crate::config::QuestTuning;
use crate::constants::{METER_FLOOR, QUEST_BATTLE_SUMMARY};
use crate::rng::RollSource;

/// Result of a single quest attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestOutcome {
    pub character: CharacterSheet,
    /// Drawn deltas, before clamping.
    pub suspicion_delta: i32,
    pub buzz_delta: i32,
    pub summary: String,
    pub battle_triggered: bool,
}

/// Run one quest for `character`.
///
/// Draws the suspicion delta first, then the buzz delta, applies both with the meters
/// clamped to `[0, meter_cap]`, and signals a battle once buzz reaches the threshold.
pub fn run_quest<R>(character: &CharacterSheet, cfg: &QuestTuning, rolls: &mut R) -> QuestOutcome
where
    R: RollSource + ?Sized,
{
    let suspicion_delta = rolls.roll_between(cfg.suspicion_delta_min, cfg.suspicion_delta_max);
    let buzz_delta = rolls.roll_between(cfg.buzz_delta_min, cfg.buzz_delta_max);

    let mut updated = character.clone();
    updated.suspicion = apply_delta(updated.suspicion, suspicion_delta, cfg.meter_cap);
    updated.buzz = apply_delta(updated.buzz, buzz_delta, cfg.meter_cap);

    let battle_triggered = updated.buzz >= cfg.battle_threshold;
    let summary = if battle_triggered {
        QUEST_BATTLE_SUMMARY.to_string()
    } else {
        quest_summary(suspicion_delta, buzz_delta)
    };

    log::debug!(
        "quest | suspicion {} -> {} ({suspicion_delta:+}), buzz {} -> {} ({buzz_delta:+}){}",
        character.suspicion,
        updated.suspicion,
        character.buzz,
        updated.buzz,
        if battle_triggered { ", battle triggered" } else { "" }
    );

    QuestOutcome {
        character: updated,
        suspicion_delta,
        buzz_delta,
        summary,
        battle_triggered,
    }
}

/// Human-readable report of the drawn deltas.
#[must_use]
pub fn quest_summary(suspicion_delta: i32, buzz_delta: i32) -> String {
    format!(
        "Quest completed! Suspicion {} by {}. Buzz {} by {}.",
        direction(suspicion_delta),
        suspicion_delta.unsigned_abs(),
        direction(buzz_delta),
        buzz_delta.unsigned_abs()
    )
}

const fn direction(delta: i32) -> &'static str {
    if delta >= 0 { "increased" } else { "decreased" }
}

fn apply_delta(meter: i32, delta: i32, cap: i32) -> i32 {
    meter.saturating_add(delta).clamp(METER_FLOOR, cap.max(METER_FLOOR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRolls;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn with_meters(suspicion: i32, buzz: i32) -> CharacterSheet {
        CharacterSheet {
            suspicion,
            buzz,
            ..CharacterSheet::default()
        }
    }

    #[test]
    fn applies_deltas_and_reports_them() {
        let mut rolls = ScriptedRolls::new().with_integers([-4, 7]);
        let outcome = run_quest(&with_meters(20, 10), &QuestTuning::default(), &mut rolls);
        assert_eq!(outcome.character.suspicion, 16);
        assert_eq!(outcome.character.buzz, 17);
        assert!(!outcome.battle_triggered);
        assert_eq!(
            outcome.summary,
            "Quest completed! Suspicion decreased by 4. Buzz increased by 7."
        );
    }

    #[test]
    fn summary_uses_drawn_deltas_not_clamped_change() {
        let mut rolls = ScriptedRolls::new().with_integers([-9, 0]);
        let outcome = run_quest(&with_meters(3, 0), &QuestTuning::default(), &mut rolls);
        assert_eq!(outcome.character.suspicion, 0);
        assert_eq!(outcome.suspicion_delta, -9);
        assert_eq!(
            outcome.summary,
            "Quest completed! Suspicion decreased by 9. Buzz increased by 0."
        );
    }

    #[test]
    fn buzz_overflow_clamps_and_triggers_battle() {
        let mut rolls = ScriptedRolls::new().with_integers([0, 10]);
        let outcome = run_quest(&with_meters(50, 95), &QuestTuning::default(), &mut rolls);
        assert_eq!(outcome.character.buzz, 100);
        assert!(outcome.battle_triggered);
        assert_eq!(
            outcome.summary,
            "Your buzz has drawn another immortal to you. Prepare for battle!"
        );
    }

    #[test]
    fn input_sheet_is_untouched() {
        let original = with_meters(40, 40);
        let mut rolls = ScriptedRolls::new().with_integers([5, 5]);
        let outcome = run_quest(&original, &QuestTuning::default(), &mut rolls);
        assert_eq!(original.buzz, 40);
        assert_eq!(outcome.character.buzz, 45);
    }

    #[test]
    fn meters_stay_in_bounds_over_long_walks() {
        let cfg = QuestTuning::default();
        let mut rng = SmallRng::seed_from_u64(2024);
        let mut sheet = CharacterSheet::default();
        for _ in 0..5000 {
            let outcome = run_quest(&sheet, &cfg, &mut rng);
            assert!((-10..=10).contains(&outcome.suspicion_delta));
            assert!((0..=10).contains(&outcome.buzz_delta));
            assert!((0..=100).contains(&outcome.character.suspicion));
            assert!((0..=100).contains(&outcome.character.buzz));
            sheet = outcome.character;
            if outcome.battle_triggered {
                sheet.buzz = 0;
            }
        }
    }
}
