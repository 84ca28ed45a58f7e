//! End-to-end tests for the `ludics` binary

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use serde_json::{Value, json};
use tempfile::tempdir;

fn ludics(dir: &Path, args: &[&str], stdin: Option<&Value>) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_ludics"))
        .args(args)
        .current_dir(dir)
        .env("LUDICS_CONFIG", dir.join("absent.toml"))
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    {
        let mut pipe = child.stdin.take().unwrap();
        if let Some(value) = stdin {
            pipe.write_all(value.to_string().as_bytes()).unwrap();
        }
    }
    child.wait_with_output().unwrap()
}

fn json_out(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "ludics failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn compile_reads_stdin() {
    let dir = tempdir().unwrap();
    let moves = json!([
        {"id": "m1", "payload": {"acts": [{"polarity": "pos"}, {"polarity": "neg", "locusPath": "0.1"}]}},
        {"id": "m2", "kind": "CONCEDE"}
    ]);
    let out = json_out(&ludics(dir.path(), &["compile", "-"], Some(&moves)));
    let acts = out.as_array().unwrap();
    assert_eq!(acts.len(), 2);
    assert_eq!(acts[0]["id"], "m1#0");
    assert_eq!(acts[1]["aspic"], Value::Null);
}

#[test]
fn store_persists_across_invocations() {
    let dir = tempdir().unwrap();
    let moves = json!([
        {"id": "a", "kind": "ASSERT", "payload": {"acts": [{"polarity": "pos", "openings": [1]}]}},
        {"id": "w", "kind": "WHY", "payload": {"acts": [{"polarity": "neg", "locusPath": "0.1"}]}}
    ]);
    fs::write(dir.path().join("moves.json"), moves.to_string()).unwrap();

    let compiled = json_out(&ludics(
        dir.path(),
        &["--store", "store.json", "dialogue", "dlg", "moves.json"],
        None,
    ));
    assert_eq!(compiled["proponentDesignId"], "dlg:P");
    assert_eq!(compiled["inserted"], 2);
    assert_eq!(compiled["mirrored"], 2);
    assert!(dir.path().join("store.json").exists());

    let dispute = json_out(&ludics(
        dir.path(),
        &["--store", "store.json", "interact", "dlg:P", "dlg:O"],
        None,
    ));
    assert_eq!(dispute["status"], "STUCK");
    assert_eq!(dispute["dialogueId"], "dlg");

    let summary = json_out(&ludics(
        dir.path(),
        &["--store", "store.json", "summary", "-"],
        Some(&json!({"dialogueId": "dlg"})),
    ));
    assert_eq!(summary["designs"], 2);
    assert_eq!(summary["acts"], 4);

    let again = ludics(
        dir.path(),
        &["--store", "store.json", "dialogue", "dlg", "moves.json"],
        None,
    );
    assert!(!again.status.success());
}

#[test]
fn analyze_errors_are_json() {
    let dir = tempdir().unwrap();
    let out = json_out(&ludics(
        dir.path(),
        &["analyze", "-"],
        Some(&json!({"type": "design", "designId": "ghost"})),
    ));
    assert_eq!(out["ok"], false);
    assert_eq!(out["status"], 404);
}

#[test]
fn unknown_command_fails() {
    let dir = tempdir().unwrap();
    let output = ludics(dir.path(), &["dance"], None);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
