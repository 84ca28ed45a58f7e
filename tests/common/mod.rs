//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use serde_json::{Value, json};

use ludics_config::LudicsConfig;
use ludics_engine::{DesignSet, Engine, StoreSnapshot};
use ludics_types::{DesignId, Move};

/// Parse a move fixture.
pub fn mv(value: Value) -> Move {
    serde_json::from_value(value).expect("move fixture")
}

/// One act entry for a move payload.
pub fn entry(polarity: &str, locus: &str, openings: &[u32]) -> Value {
    json!({"polarity": polarity, "locusPath": locus, "openings": openings})
}

/// A move carrying `acts` and nothing else.
pub fn move_with(id: &str, kind: &str, acts: Vec<Value>) -> Move {
    mv(json!({"id": id, "kind": kind, "payload": {"acts": acts}}))
}

/// A persisted act as it appears in a snapshot.
pub fn act(id: &str, polarity: &str, locus: &str, openings: &[u32]) -> Value {
    json!({
        "id": id,
        "moveId": format!("mv-{id}"),
        "polarity": polarity,
        "locusPath": locus,
        "openings": openings,
    })
}

pub fn design(id: &str, acts: Vec<Value>) -> Value {
    json!({"id": id, "acts": acts})
}

pub fn engine_from(snapshot: Value) -> Engine {
    engine_with(LudicsConfig::default(), snapshot)
}

pub fn engine_with(config: LudicsConfig, snapshot: Value) -> Engine {
    let snapshot: StoreSnapshot = serde_json::from_value(snapshot).expect("snapshot fixture");
    Engine::from_snapshot(config, snapshot)
}

pub fn id(raw: &str) -> DesignId {
    DesignId::new(raw)
}

pub fn set(ids: &[&str]) -> DesignSet {
    ids.iter().map(|raw| DesignId::new(*raw)).collect()
}

/// Positive `p` opening 1, negative `n` answering with a daimon at `0.1`,
/// and a negative `silent` with no answer.
pub fn duel() -> Value {
    json!({
        "designs": [
            design("p", vec![act("p0", "pos", "0", &[1])]),
            design("n", vec![
                act("n0", "neg", "0", &[1]),
                act("n1", "daimon", "0.1", &[]),
            ]),
            design("silent", vec![act("s0", "neg", "0", &[1])]),
        ]
    })
}
