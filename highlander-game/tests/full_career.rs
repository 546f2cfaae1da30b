use highlander_game::{
    ActionKind, BalanceConfig, CharacterClass, GamePhase, ProgressionController, ProgressionError,
    RngBundle, Winner, affordable_actions,
};

const QUEST_CAP: usize = 2_000;
const EXCHANGE_CAP: usize = 400;

#[derive(Debug, Default)]
struct CareerTally {
    quests: usize,
    wins: usize,
    losses: usize,
    retreats: usize,
}

fn pick_action(energy: i32) -> &'static str {
    affordable_actions(energy)
        .iter()
        .find(|action| action.kind == ActionKind::Attack)
        .map_or("Delay", |action| action.name)
}

fn run_career(seed: u64, retreat_below: i32) -> CareerTally {
    let bundle = RngBundle::from_user_seed(seed);
    let mut controller = ProgressionController::new(BalanceConfig::default());
    controller
        .create_character("Kurgan", Some(CharacterClass::Warrior))
        .expect("fresh controller starts in creation");
    let mut tally = CareerTally::default();

    while tally.quests < QUEST_CAP {
        match controller.phase() {
            GamePhase::Creation => break,
            GamePhase::Playing => {
                let before = controller.character().clone();
                let outcome = controller
                    .start_quest(&mut *bundle.quest())
                    .expect("playing phase accepts quests");
                tally.quests += 1;
                let after = controller.character();
                assert!((0..=100).contains(&after.buzz));
                assert!((0..=100).contains(&after.suspicion));
                assert_eq!(after.level, before.level);
                assert_eq!(outcome.battle_triggered, after.buzz >= 100);
            }
            GamePhase::Battle => {
                let before = controller.character().clone();
                controller
                    .start_battle(&mut *bundle.battle())
                    .expect("battle phase opens a session");
                let mut outcome = None;
                for _ in 0..EXCHANGE_CAP {
                    let session = controller.battle().expect("session open");
                    let player = session.player();
                    let report = if player.health < retreat_below {
                        controller.attempt_retreat(&mut *bundle.battle())
                    } else {
                        let action = pick_action(player.energy);
                        controller.submit_action(action, &mut *bundle.battle())
                    }
                    .expect("battle accepts moves");
                    if let Some(resolved) = report.outcome {
                        outcome = Some(resolved);
                        break;
                    }
                }
                let outcome = outcome.expect("battle resolves within the exchange cap");
                let after = controller.character();
                match outcome.winner {
                    Winner::Player => {
                        tally.wins += 1;
                        assert_eq!(after.level, before.level + 1);
                        assert_eq!(after.max_health, before.max_health + 10);
                        assert_eq!(after.health, after.max_health);
                        assert_eq!(after.power, before.power + 2);
                        assert_eq!(after.buzz, 0);
                        assert_eq!(controller.phase(), GamePhase::Playing);
                    }
                    Winner::Retreat => {
                        tally.retreats += 1;
                        assert_eq!(after.level, before.level);
                        assert_eq!(after.buzz, (before.buzz - 50).max(0));
                        assert_eq!(controller.phase(), GamePhase::Playing);
                    }
                    Winner::Opponent => {
                        tally.losses += 1;
                        assert_eq!(after.level, 1);
                        assert!(after.name.is_empty());
                        assert_eq!(controller.phase(), GamePhase::Creation);
                    }
                }
            }
        }
    }
    tally
}

#[test]
fn careers_are_reproducible_per_seed() {
    let first = run_career(77, 0);
    let second = run_career(77, 0);
    assert_eq!(first.quests, second.quests);
    assert_eq!(first.wins, second.wins);
    assert_eq!(first.losses, second.losses);
}

#[test]
fn aggressive_careers_win_and_eventually_fall() {
    let mut wins = 0;
    let mut losses = 0;
    for seed in 0..16 {
        let tally = run_career(seed, 0);
        assert!(tally.quests > 0);
        assert_eq!(tally.retreats, 0);
        wins += tally.wins;
        losses += tally.losses;
    }
    assert!(wins > 0, "no seed produced a single victory");
    assert!(losses > 0, "no seed ever lost a battle");
}

#[test]
fn cautious_careers_use_retreat() {
    let retreats: usize = (100..116).map(|seed| run_career(seed, 40).retreats).sum();
    assert!(retreats > 0);
}

#[test]
fn defeated_player_must_recreate() {
    let bundle = RngBundle::from_user_seed(5);
    let mut controller = ProgressionController::new(BalanceConfig::default());
    controller
        .create_character("Kastagir", Some(CharacterClass::Scholar))
        .expect("creation");
    while controller.phase() == GamePhase::Playing {
        controller.start_quest(&mut *bundle.quest()).expect("quest");
    }
    controller
        .start_battle(&mut *bundle.battle())
        .expect("session");
    let mut defeat = None;
    for _ in 0..EXCHANGE_CAP {
        let report = controller
            .submit_action("Delay", &mut *bundle.battle())
            .expect("exchange");
        if let Some(outcome) = report.outcome {
            defeat = Some(outcome.winner);
            break;
        }
    }
    assert_eq!(defeat, Some(Winner::Opponent));
    assert!(matches!(
        controller.start_quest(&mut *bundle.quest()),
        Err(ProgressionError::WrongPhase {
            expected: GamePhase::Playing,
            actual: GamePhase::Creation
        })
    ));
    controller
        .create_character("Kastagir", Some(CharacterClass::Scholar))
        .expect("re-creation after defeat");
    assert_eq!(controller.phase(), GamePhase::Playing);
    assert_eq!(controller.character().level, 1);
}
