use highlander_game::{
    BalanceConfig, BattleError, BattleSession, BattleStatus, CharacterClass, CharacterSheet,
    LogClock, PlayerTurnOutcome, RandomAffordablePolicy, RollSource, ScriptedRolls, Winner,
    affordable_actions, catalog, find_action,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

const TURN_CAP: usize = 500;

fn hero(level: u32) -> CharacterSheet {
    CharacterSheet {
        level,
        ..CharacterSheet::new("Connor MacLeod", CharacterClass::Warrior)
    }
}

fn assert_sheet_bounds(sheet: &CharacterSheet) {
    assert!(sheet.health >= 0, "health went negative: {}", sheet.health);
    assert!(sheet.health <= sheet.max_health);
}

#[test]
fn seeded_battles_always_terminate_with_clean_bounds() {
    let cfg = BalanceConfig::default();
    for seed in 0..64_u64 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut policy = RandomAffordablePolicy;
        let level = 1 + u32::try_from(seed % 4).expect("small level");
        let mut battle = BattleSession::start(&hero(level), &cfg, &mut rng)
            .with_clock(LogClock::Fixed("--:--:--"));
        let mut turns = 0;
        while !battle.status().is_resolved() && turns < TURN_CAP {
            turns += 1;
            match battle.status() {
                BattleStatus::PlayerTurn => {
                    let options = affordable_actions(battle.player().energy);
                    let pick = options[rng.pick_index(options.len())];
                    let outcome = battle
                        .perform_player_action(pick, &mut rng)
                        .expect("player turn");
                    assert!(matches!(outcome, PlayerTurnOutcome::Resolved(_)));
                }
                BattleStatus::OpponentTurn => {
                    battle
                        .run_opponent_turn(&mut policy, &mut rng)
                        .expect("opponent turn");
                }
                BattleStatus::Resolved(_) => unreachable!(),
            }
            assert_sheet_bounds(battle.player());
            assert_sheet_bounds(battle.opponent());
        }
        let winner = battle.winner().expect("battle resolved within cap");
        match winner {
            Winner::Player => assert_eq!(battle.opponent().health, 0),
            Winner::Opponent => assert_eq!(battle.player().health, 0),
            Winner::Retreat => unreachable!("no retreat attempted"),
        }
    }
}

#[test]
fn unaffordable_submissions_never_move_the_battle() {
    let cfg = BalanceConfig::default();
    let mut rng = SmallRng::seed_from_u64(0x5EED);
    let mut battle = BattleSession::start(&hero(2), &cfg, &mut rng);
    let mut scripted = ScriptedRolls::new();
    // Drain energy with defensive moves until Kick is out of reach.
    while battle.player().energy >= 25 {
        battle
            .submit_player_action("Dodge", &mut scripted)
            .expect("player turn");
        battle
            .run_opponent_turn(&mut RandomAffordablePolicy, &mut scripted)
            .expect("opponent turn");
    }
    let player = battle.player().clone();
    let opponent = battle.opponent().clone();
    let log_len = battle.log_len();
    for action in catalog().iter().filter(|a| !a.is_affordable(player.energy)) {
        let outcome = battle
            .perform_player_action(action, &mut rng)
            .expect("player turn");
        assert!(matches!(outcome, PlayerTurnOutcome::Rejected { .. }));
        assert_eq!(battle.status(), BattleStatus::PlayerTurn);
        assert_eq!(battle.player(), &player);
        assert_eq!(battle.opponent(), &opponent);
    }
    assert!(battle.log_len() > log_len);
    assert!(
        battle
            .log()
            .take(battle.log_len() - log_len)
            .all(|entry| entry.message == "Not enough energy for this action!")
    );
}

#[test]
fn log_is_newest_first_with_turn_numbers() {
    let cfg = BalanceConfig::builtin();
    let mut rolls = ScriptedRolls::new()
        .with_percents([0.0, 99.0, 0.0])
        .with_factors([1.0, 1.0])
        .with_picks([4, 2]);
    let mut battle = BattleSession::start(&hero(1), &cfg, &mut rolls)
        .with_clock(LogClock::Fixed("09:30:00"));
    let mut policy = RandomAffordablePolicy;

    battle.submit_player_action("Slash", &mut rolls).expect("player");
    battle.run_opponent_turn(&mut policy, &mut rolls).expect("opponent");
    battle.submit_player_action("Thrust", &mut rolls).expect("player");
    battle.run_opponent_turn(&mut policy, &mut rolls).expect("opponent");

    let entries: Vec<_> = battle.log().collect();
    let turns: Vec<_> = entries.iter().map(|e| e.turn).collect();
    assert_eq!(turns, [4, 3, 2, 1]);
    assert!(entries.iter().all(|e| e.timestamp == "09:30:00"));
    assert_eq!(entries[3].message, "You Slash the opponent for 10 damage!");
    assert_eq!(entries[2].message, "Opponent's Kick missed!");
    assert_eq!(entries[1].message, "You Thrust the opponent for 9 damage!");
    assert_eq!(entries[0].message, "Opponent prepares to Parry!");
}

#[test]
fn retreat_failure_then_opponent_reply() {
    let cfg = BalanceConfig::builtin();
    let mut rolls = ScriptedRolls::new().with_percents([75.0]).with_picks([5]);
    let mut battle = BattleSession::start(&hero(1), &cfg, &mut rolls);
    let report = battle.attempt_retreat(&mut rolls).expect("player turn");
    assert_eq!(report.chance, 50);
    assert!(!report.escaped);
    let reply = battle
        .run_opponent_turn(&mut RandomAffordablePolicy, &mut rolls)
        .expect("opponent turn");
    assert_eq!(reply.message, "Opponent delays and recovers some energy.");
    assert_eq!(battle.opponent().energy, 130);
    assert_eq!(battle.status(), BattleStatus::PlayerTurn);
}

#[test]
fn resolved_battle_refuses_further_input() {
    let cfg = BalanceConfig::builtin();
    let mut rolls = ScriptedRolls::new().with_percents([0.0]);
    let mut battle = BattleSession::start(&hero(1), &cfg, &mut rolls);
    battle.attempt_retreat(&mut rolls).expect("player turn");
    assert_eq!(battle.winner(), Some(Winner::Retreat));
    let thrust = find_action("Thrust").expect("catalog entry");
    assert_eq!(
        battle.perform_player_action(thrust, &mut rolls),
        Err(BattleError::AlreadyResolved(Winner::Retreat))
    );
    assert_eq!(
        battle.attempt_retreat(&mut rolls),
        Err(BattleError::AlreadyResolved(Winner::Retreat))
    );
}
