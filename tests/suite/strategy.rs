//! Strategy and innocence tests

use serde_json::{Value, json};

use ludics_engine::{PlayMove, view};
use ludics_types::{DisputeId, Player, StrategyId};

use crate::common::{duel, engine_from, id};

fn play_move(player: &str, act_id: &str, locus: &str, openings: &[u32]) -> Value {
    let polarity = if player == "P" { "pos" } else { "neg" };
    json!({
        "player": player,
        "actId": act_id,
        "locusPath": locus,
        "polarity": polarity,
        "openings": openings,
    })
}

/// Two plays that agree on P's view and then answer differently.
fn forked() -> Value {
    let mut snapshot = duel();
    snapshot["strategies"] = json!([{
        "id": "forked",
        "designId": "p",
        "player": "P",
        "plays": [
            [
                play_move("P", "a", "0", &[1]),
                play_move("O", "b", "0.1", &[1]),
                play_move("P", "c", "0.1.1", &[]),
            ],
            [
                play_move("P", "a", "0", &[1]),
                play_move("O", "b", "0.1", &[1]),
                play_move("P", "c2", "0.1.1", &[2]),
            ],
        ],
        "isInnocent": true,
        "playCount": 2
    }]);
    snapshot
}

#[test]
fn strategy_from_disputes_keeps_maximal_plays() {
    let mut engine = engine_from(duel());
    engine.interact(&id("p"), &id("n")).unwrap();
    engine.interact(&id("p"), &id("silent")).unwrap();

    let strategy = engine
        .construct_strategy(&id("p"), Player::Proponent, &[])
        .unwrap();
    assert_eq!(strategy.play_count, 1);
    let play = &strategy.plays[0];
    let players: Vec<Player> = play.iter().map(|m| m.player).collect();
    assert_eq!(players, [Player::Proponent, Player::Opponent]);
    assert_eq!(play[1].act_id.as_str(), "n1");
    assert!(strategy.is_innocent);
    assert!(strategy.satisfies_propagation);
    assert!(engine.store().strategy(&strategy.id).is_some());
}

#[test]
fn strategy_from_named_disputes_only() {
    let mut engine = engine_from(duel());
    let stuck = engine.interact(&id("p"), &id("silent")).unwrap();
    engine.interact(&id("p"), &id("n")).unwrap();
    let strategy = engine
        .construct_strategy(&id("p"), Player::Proponent, &[stuck.id])
        .unwrap();
    assert_eq!(strategy.play_count, 1);
    assert_eq!(strategy.plays[0].len(), 1);
}

#[test]
fn strategy_over_unknown_dispute_is_not_found() {
    let mut engine = engine_from(duel());
    let err = engine
        .construct_strategy(
            &id("p"),
            Player::Proponent,
            &[DisputeId::new("dsp_missing")],
        )
        .unwrap_err();
    assert_eq!(err.status(), 404);
}

#[test]
fn explain_names_both_plays() {
    let engine = engine_from(forked());
    let report = engine.check_innocence(&StrategyId::new("forked")).unwrap();
    assert!(!report.is_innocent);
    assert_eq!(report.violations.len(), 1);
    let violation = &report.violations[0];
    assert_eq!((violation.play_a, violation.play_b), (0, 1));
    assert_eq!(violation.view, ["0", "0.1"]);
    assert_eq!(violation.response_a.act_id.as_str(), "c");
    assert_eq!(violation.response_b.act_id.as_str(), "c2");
}

#[test]
fn make_innocent_keeps_first_answer() {
    let mut engine = engine_from(forked());
    let fixed = engine.make_innocent(&StrategyId::new("forked")).unwrap();
    assert!(fixed.is_innocent);
    assert_eq!(fixed.play_count, 1);
    assert_eq!(fixed.plays[0][2].act_id.as_str(), "c");
    let stored = engine.store().strategy(&StrategyId::new("forked")).unwrap();
    assert_eq!(stored, &fixed);
}

#[test]
fn opponent_view_jumps_to_justifier() {
    let play: Vec<PlayMove> = serde_json::from_value(json!([
        play_move("P", "a", "0", &[1, 2]),
        play_move("O", "b", "0.1", &[]),
        play_move("O", "c", "0.2", &[]),
    ]))
    .unwrap();
    let p_view: Vec<String> = view(&play, Player::Proponent)
        .into_iter()
        .map(|m| m.act_id.as_str().to_owned())
        .collect();
    assert_eq!(p_view, ["a", "c"]);
}
