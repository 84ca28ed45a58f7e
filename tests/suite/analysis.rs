//! Analysis request surface tests

use serde_json::json;

use ludics_engine::{AnalysisReport, AnalysisRequest};
use ludics_types::{BehaviourId, Player};

use crate::common::{act, design, duel, engine_from, id, set};

#[test]
fn batch_isolates_one_malformed_design() {
    let mut snapshot = duel();
    snapshot["designs"] = json!([
        design("good-1", vec![act("a", "pos", "0", &[1])]),
        design("good-2", vec![act("b", "neg", "0", &[])]),
        design("broken", vec![act("c", "pos", "0", &[]), act("d", "neg", "0.4", &[])]),
    ]);
    let engine = engine_from(snapshot);
    let out = engine.handle(&json!({
        "type": "batch",
        "designIds": ["good-1", "broken", "good-2"]
    }));
    assert_eq!(out["ok"], true);
    assert_eq!(out["type"], "batch");
    assert_eq!(out["total"], 3);
    assert_eq!(out["validCount"], 2);
    let failures = out["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["designId"], "broken");
}

#[test]
fn batch_reports_unknown_ids_without_aborting() {
    let engine = engine_from(duel());
    let out = engine.handle(&json!({"type": "batch", "designIds": ["p", "ghost", " "]}));
    assert_eq!(out["total"], 3);
    assert_eq!(out["validCount"], 1);
    let statuses: Vec<u64> = out["failures"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["status"].as_u64().unwrap())
        .collect();
    assert_eq!(statuses, [404, 400]);
}

#[test]
fn design_analysis_reports_properties() {
    let mut engine = engine_from(duel());
    engine
        .commit_behaviour(Some(BehaviourId::new("b")), set(&["p"]))
        .unwrap();
    let out = engine.handle(&json!({"type": "design", "designId": "p"}));
    assert_eq!(out["ok"], true);
    assert_eq!(out["valid"], true);
    let props = &out["properties"];
    for key in [
        "legal",
        "linear",
        "justified",
        "polarityConsistent",
        "additiveRespected",
        "normalized",
        "isView",
        "inBehaviour",
        "lowComplexity",
    ] {
        assert_eq!(props[key], true, "{key}");
    }
    assert_eq!(out["complexity"]["class"], "low");
}

#[test]
fn strategy_analysis_by_design_or_id() {
    let mut engine = engine_from(duel());
    engine.interact(&id("p"), &id("n")).unwrap();
    let on_the_fly = engine.handle(&json!({"type": "strategy", "designId": "p"}));
    assert_eq!(on_the_fly["ok"], true);
    assert_eq!(on_the_fly["playCount"], 1);
    assert_eq!(on_the_fly["properties"]["formsBehaviour"], true);
    assert_eq!(on_the_fly["properties"]["saturated"], true);
    assert_eq!(engine.store().strategies().count(), 0);

    let unknown = engine.handle(&json!({"type": "strategy", "strategyId": "nope"}));
    assert_eq!(unknown["status"], 404);
    let missing = engine.handle(&json!({"type": "strategy"}));
    assert_eq!(missing["status"], 400);
}

#[test]
fn game_aggregates_stored_and_transient_behaviours() {
    let mut engine = engine_from(duel());
    engine
        .commit_behaviour(Some(BehaviourId::new("closed")), set(&["p"]))
        .unwrap();
    let request: AnalysisRequest = serde_json::from_value(json!({
        "type": "game",
        "designId": "silent",
        "designIds": ["p"]
    }))
    .unwrap();
    let AnalysisReport::Game(game) = engine.analyze(&request).unwrap() else {
        panic!("expected a game report");
    };
    assert_eq!(game.behaviour_count, 2);
    assert_eq!(game.closed_count, 1);
    assert!(game.any_closed);
    assert!(game.valid);
    assert_eq!(game.design_count, 2);
    assert_eq!(engine.store().behaviours().count(), 1);
}

#[test]
fn game_properties_come_from_stored_interactions() {
    let mut engine = engine_from(duel());
    engine.interact(&id("p"), &id("n")).unwrap();
    engine.interact(&id("p"), &id("silent")).unwrap();
    let request = json!({"type": "game", "designIds": ["p", "n", "silent"]});

    let out = engine.handle(&request);
    assert_eq!(out["ok"], true);
    assert_eq!(out["disputeCount"], 2);
    assert_eq!(out["properties"]["determined"], true);
    assert_eq!(out["properties"]["finite"], true);
    assert_eq!(out["properties"]["hasWinningStrategy"], false);

    engine
        .construct_strategy(&id("p"), Player::Proponent, &[])
        .unwrap();
    let out = engine.handle(&request);
    assert_eq!(out["properties"]["hasWinningStrategy"], true);
}

#[test]
fn game_needs_a_design() {
    let engine = engine_from(duel());
    let out = engine.handle(&json!({"type": "game", "designIds": []}));
    assert_eq!(out["ok"], false);
    assert_eq!(out["status"], 400);
}

#[test]
fn summary_counts_cached_fields() {
    let mut snapshot = duel();
    for entry in snapshot["designs"].as_array_mut().unwrap() {
        entry["dialogueId"] = json!("dlg");
    }
    let mut engine = engine_from(snapshot);
    engine.interact(&id("p"), &id("n")).unwrap();
    engine
        .construct_strategy(&id("p"), Player::Proponent, &[])
        .unwrap();
    engine
        .commit_behaviour(Some(BehaviourId::new("b")), set(&["p"]))
        .unwrap();

    let out = engine.handle_summary(&json!({"dialogueId": "dlg"}));
    assert_eq!(out["ok"], true);
    assert_eq!(out["designs"], 3);
    assert_eq!(out["acts"], 4);
    assert_eq!(out["strategies"], 1);
    assert_eq!(out["innocentStrategies"], 1);
    assert_eq!(out["behaviours"], 1);
    assert_eq!(out["closedBehaviours"], 1);

    let one = engine.handle_summary(&json!({"designId": "silent"}));
    assert_eq!(one["designs"], 1);
    assert_eq!(one["strategies"], 0);
    assert_eq!(engine.handle_summary(&json!({"designId": "ghost"}))["status"], 404);
}
