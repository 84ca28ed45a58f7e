//! Move compilation tests

use serde_json::{Value, json};

use ludics_engine::{DisputeStatus, Engine, compile, compile_value};
use ludics_types::{AttackType, DialogueId, MoveKind, Player, Polarity, TargetScope};

use crate::common::{entry, move_with, mv};

#[test]
fn why_move_compiles_to_one_undercut() {
    let why = mv(json!({
        "id": "m-why",
        "kind": "why",
        "targetType": "argument",
        "targetId": "arg-7",
        "actorId": "user-2",
        "payload": {
            "acts": [{"polarity": "neg", "locusPath": "0.1", "openings": [1], "expression": "why?"}],
            "aspicAttack": {
                "type": "UNDERCUTS",
                "attackerId": "arg-9",
                "defenderId": "arg-7",
                "succeeded": true
            },
            "aspicMetadata": {"targetScope": "inference", "schemeKey": "expert_opinion"},
            "cqKey": "CQ3",
            "cqText": "Is the expert reliable?"
        }
    }));
    assert_eq!(why.kind, MoveKind::Why);
    assert!(why.kind.is_interrogative());

    let acts = compile(&why);
    assert_eq!(acts.len(), 1);
    let act = &acts[0];
    assert_eq!(act.polarity(), &Polarity::Negative);
    assert_eq!(act.locus_path(), "0.1");
    assert_eq!(act.provenance().target_type.as_deref(), Some("argument"));
    let aspic = act.aspic().unwrap();
    assert_eq!(aspic.attack_type, AttackType::Undercuts);
    assert_eq!(aspic.target_scope, Some(TargetScope::Inference));
    assert_eq!(aspic.attacker_id, "arg-9");
    assert_eq!(aspic.cq_key.as_deref(), Some("CQ3"));
    assert_eq!(aspic.scheme_key.as_deref(), Some("expert_opinion"));
    assert!(aspic.reason.is_none());
}

#[test]
fn acts_without_attack_serialize_null_aspic() {
    let acts = compile(&move_with("m1", "ASSERT", vec![entry("pos", "0", &[1])]));
    let value = serde_json::to_value(&acts[0]).unwrap();
    let object = value.as_object().unwrap();
    assert!(object.contains_key("aspic"));
    assert_eq!(object["aspic"], Value::Null);
    assert_eq!(object["moveId"], "m1");
}

#[test]
fn n_entries_share_provenance() {
    let many = mv(json!({
        "id": "m-many",
        "actorId": "u",
        "payload": {"acts": [
            {"polarity": "pos"},
            {"polarity": "neg", "locusPath": "0.1"},
            {"polarity": "daimon", "locusPath": "0.1.1"}
        ]}
    }));
    let acts = compile(&many);
    assert_eq!(acts.len(), 3);
    let ids: Vec<&str> = acts.iter().map(|a| a.id().as_str()).collect();
    assert_eq!(ids, ["m-many#0", "m-many#1", "m-many#2"]);
    assert!(acts.windows(2).all(|w| w[0].provenance() == w[1].provenance()));
    assert!(acts.iter().all(|a| a.aspic().is_none()));
}

#[test]
fn loose_fields_degrade_per_field() {
    let acts = compile_value(&json!({
        "id": "m",
        "payload": {"acts": [
            {"polarity": "pos", "openings": "1,2", "additive": ""},
            {"polarity": "pos", "openings": [3, "1", "x"], "additive": 1},
            {"polarity": "pos", "additive": null, "expression": 42}
        ]}
    }));
    assert_eq!(acts.len(), 3);
    assert!(acts[0].openings().is_empty());
    assert!(!acts[0].is_additive());
    assert_eq!(acts[1].openings().iter().copied().collect::<Vec<_>>(), [1, 3]);
    assert!(acts[1].is_additive());
    assert!(!acts[2].is_additive());
    assert_eq!(acts[2].expression(), "");
}

#[test]
fn payload_without_acts_is_empty() {
    assert!(compile_value(&json!({"id": "m", "kind": "CONCEDE"})).is_empty());
    assert!(compile_value(&json!({"id": "m", "payload": "text"})).is_empty());
    assert!(compile_value(&json!({"id": "m", "payload": {"acts": "no"}})).is_empty());
    assert!(compile_value(&json!(null)).is_empty());
}

#[test]
fn dialogue_keeps_a_why_below_the_assertion() {
    let mut engine = Engine::default();
    let dialogue = DialogueId::new("deliberation-why");
    let moves = vec![
        move_with("a", "ASSERT", vec![entry("pos", "0", &[1])]),
        mv(json!({
            "id": "w",
            "kind": "WHY",
            "payload": {
                "acts": [{"polarity": "neg", "locusPath": "0.1", "expression": "Why?", "openings": []}],
                "cqKey": "CQ1",
                "aspicAttack": {"type": "UNDERCUTS", "attackerId": "A", "defenderId": "B", "succeeded": true},
                "aspicMetadata": {"targetScope": "inference"}
            },
            "targetType": "argument",
            "targetId": "B"
        })),
    ];
    let result = engine.compile_dialogue(&dialogue, &moves).unwrap();
    assert_eq!(result.inserted, 2);
    assert_eq!(result.mirrored, 2);
    assert!(result.skipped.is_empty());

    let store = engine.store();
    let p = store.design(&result.proponent_design_id).unwrap();
    let why = &p.acts()[1];
    assert_eq!(why.id().as_str(), "w#0");
    assert_eq!(why.locus_path(), "0.1");
    assert_eq!(why.polarity(), &Polarity::Negative);
    assert_eq!(why.aspic().unwrap().attack_type, AttackType::Undercuts);
    let o = store.design(&result.opponent_design_id).unwrap();
    assert_eq!(o.acts()[1].id().as_str(), "w#0~");
    assert_eq!(o.acts()[1].polarity(), &Polarity::Positive);
}

#[test]
fn dialogue_chain_plays_to_a_concession() {
    let mut engine = Engine::default();
    let dialogue = DialogueId::new("deliberation-1");
    let moves = vec![
        move_with("a1", "ASSERT", vec![entry("pos", "0", &[1])]),
        move_with("w1", "WHY", vec![entry("neg", "0.1", &[1])]),
        move_with("g1", "GROUNDS", vec![entry("pos", "0.1.1", &[1])]),
        move_with("c1", "CONCEDE", vec![entry("daimon", "0.1.1.1", &[])]),
        move_with("x", "ASSERT", vec![entry("pos", "0", &[])]),
        move_with("z", "CLOSE", vec![entry("maybe", "0", &[])]),
    ];
    let result = engine.compile_dialogue(&dialogue, &moves).unwrap();
    assert_eq!(result.inserted, 4);
    assert_eq!(result.mirrored, 3);
    let skipped: Vec<&str> = result.skipped.iter().map(|s| s.act_id.as_str()).collect();
    assert_eq!(skipped, ["x#0", "z#0"]);
    assert_eq!(result.skipped[0].move_id.as_str(), "x");

    {
        let store = engine.store();
        let p = store.design(&result.proponent_design_id).unwrap();
        let o = store.design(&result.opponent_design_id).unwrap();
        assert_eq!(p.participant(), Some(Player::Proponent));
        assert_eq!(o.participant(), Some(Player::Opponent));
        assert_eq!((p.len(), o.len()), (3, 4));
        assert_eq!(store.designs_in_dialogue(&dialogue).count(), 2);
    }

    let dispute = engine
        .interact(&result.proponent_design_id, &result.opponent_design_id)
        .unwrap();
    assert_eq!(dispute.status, DisputeStatus::Convergent);
    let played: Vec<&str> = dispute.pairs.iter().map(|p| p.pos_act_id.as_str()).collect();
    assert_eq!(played, ["a1#0", "w1#0~", "g1#0", "c1#0"]);

    let strategy = engine
        .construct_strategy(&result.proponent_design_id, Player::Proponent, &[])
        .unwrap();
    let movers: Vec<Player> = strategy.plays[0].iter().map(|m| m.player).collect();
    assert_eq!(
        movers,
        [
            Player::Proponent,
            Player::Opponent,
            Player::Proponent,
            Player::Opponent
        ]
    );
}

#[test]
fn dialogue_recompiles_until_disputed() {
    let mut engine = Engine::default();
    let dialogue = DialogueId::new("d");
    let first = vec![move_with("a", "ASSERT", vec![entry("pos", "0", &[1])])];
    let result = engine.compile_dialogue(&dialogue, &first).unwrap();
    let second = vec![
        move_with("a", "ASSERT", vec![entry("pos", "0", &[1])]),
        move_with("w", "WHY", vec![entry("neg", "0.1", &[])]),
    ];
    let again = engine.compile_dialogue(&dialogue, &second).unwrap();
    assert_eq!(again.inserted, 2);

    engine
        .interact(&result.proponent_design_id, &result.opponent_design_id)
        .unwrap();
    let err = engine.compile_dialogue(&dialogue, &second).unwrap_err();
    assert_eq!(err.status(), 409);
    assert_eq!(
        engine
            .store()
            .design(&result.opponent_design_id)
            .unwrap()
            .len(),
        2
    );
}
