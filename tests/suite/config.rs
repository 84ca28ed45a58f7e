//! Configuration loading tests

use std::fs;
use std::time::Duration;

use tempfile::tempdir;

use ludics_config::{ConfigError, LudicsConfig};
use ludics_engine::{Design, Engine, EngineError, InsertError};
use ludics_types::{Act, ActId, DesignId, DialogueId, Locus, Polarity, Sign};

use crate::common::{entry, move_with};

#[test]
fn partial_file_keeps_other_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[closure]\ntimeout_ms = 250\n").unwrap();

    let config = LudicsConfig::load_from(&path).unwrap();
    assert_eq!(config.closure.timeout(), Duration::from_millis(250));
    assert!(config.closure.cache_pairs);
    assert!(config.design.enforce_polarity);
    assert_eq!(config.design.root_locus, "0");
    assert_eq!(config.analysis.max_closure_score, 100_000);
}

#[test]
fn unreadable_and_malformed_files_name_the_path() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.toml");
    let err = LudicsConfig::load_from(&missing).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert_eq!(err.path(), missing.as_path());

    let broken = dir.path().join("broken.toml");
    fs::write(&broken, "[design\nenforce_polarity = yes").unwrap();
    let err = LudicsConfig::load_from(&broken).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert_eq!(err.path(), broken.as_path());
}

fn positive_root(engine: &mut Engine) -> DesignId {
    let id = DesignId::new("p");
    engine
        .add_design(Design::new(id.clone(), Locus::root(), Sign::Positive))
        .unwrap();
    engine
        .insert_act(
            &id,
            Act::new(ActId::new("p0"), Polarity::Positive, "0").with_openings([1]),
        )
        .unwrap();
    id
}

#[test]
fn relaxed_polarity_accepts_same_sign_children() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[design]\nenforce_polarity = false\n").unwrap();
    let relaxed = LudicsConfig::load_from(&path).unwrap();
    let child = || Act::new(ActId::new("p1"), Polarity::Positive, "0.1");

    let mut engine = Engine::default();
    let id = positive_root(&mut engine);
    let err = engine.insert_act(&id, child()).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Insert(InsertError::PolarityMismatch { .. })
    ));

    let mut engine = Engine::new(relaxed);
    let id = positive_root(&mut engine);
    engine.insert_act(&id, child()).unwrap();
    assert_eq!(engine.store().design(&id).unwrap().len(), 2);
}

#[test]
fn custom_root_locus_moves_the_base() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[design]\nroot_locus = \"3\"\n").unwrap();
    let config = LudicsConfig::load_from(&path).unwrap();

    let moves = vec![
        move_with("in", "ASSERT", vec![entry("pos", "3", &[])]),
        move_with("out", "ASSERT", vec![entry("pos", "0", &[])]),
    ];
    let mut engine = Engine::new(config);
    let result = engine
        .compile_dialogue(&DialogueId::new("r"), &moves)
        .unwrap();
    assert_eq!(result.inserted, 1);
    assert_eq!(result.skipped[0].act_id.as_str(), "out#0");
}
