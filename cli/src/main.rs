//! Ludics CLI - binary entry point.
//!
//! Loads an optional store snapshot, runs one engine command and prints its
//! result as JSON on stdout. Logs go to stderr so stdout stays parseable.
//!
//! ```text
//! main() -> Cli::parse() -> load store -> run(command) -> print JSON
//!                                               |
//!                                               v
//!                                     save store (mutating commands)
//! ```

mod args;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use serde_json::{Value, json};
use std::{
    fs,
    io::{self, Read, Write},
    path::Path,
    slice,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use ludics_config::LudicsConfig;
use ludics_engine::{DesignSet, Engine, StoreSnapshot, compile_value, default_player};
use ludics_types::{DesignId, DialogueId, Move};

use args::{Cli, Command, Input};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

fn read_input(input: &Input) -> Result<Value> {
    let raw = match input {
        Input::Stdin => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
        Input::File(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
    };
    serde_json::from_str(&raw).context("input is not valid JSON")
}

fn load_engine(config: LudicsConfig, store: Option<&Path>) -> Result<Engine> {
    let Some(path) = store.filter(|p| p.exists()) else {
        return Ok(Engine::new(config));
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read store {}", path.display()))?;
    let snapshot: StoreSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse store {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        designs = snapshot.designs.len(),
        "store loaded"
    );
    Ok(Engine::from_snapshot(config, snapshot))
}

fn save_engine(engine: &Engine, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let raw = serde_json::to_string_pretty(&engine.snapshot())?;
    fs::write(path, raw).with_context(|| format!("failed to write store {}", path.display()))?;
    tracing::info!(path = %path.display(), "store saved");
    Ok(())
}

/// Moves from either a bare array or a single move object. Unreadable
/// entries are logged and dropped.
fn moves_from(value: &Value) -> Vec<Move> {
    let items = match value {
        Value::Array(items) => items.as_slice(),
        other => slice::from_ref(other),
    };
    items
        .iter()
        .filter_map(|raw| match Move::deserialize(raw) {
            Ok(mv) => Some(mv),
            Err(err) => {
                tracing::warn!(%err, "skipping unreadable move");
                None
            }
        })
        .collect()
}

fn run(engine: &mut Engine, command: &Command) -> Result<Value> {
    let out = match command {
        Command::Compile { input } => {
            let value = read_input(input)?;
            let acts: Vec<_> = match &value {
                Value::Array(items) => items.iter().flat_map(compile_value).collect(),
                single => compile_value(single),
            };
            serde_json::to_value(acts)?
        }
        Command::Dialogue { dialogue_id, input } => {
            let moves = moves_from(&read_input(input)?);
            let id = DialogueId::parse(dialogue_id)?;
            serde_json::to_value(engine.compile_dialogue(&id, &moves)?)?
        }
        Command::Interact { pos, neg } => {
            let dispute = engine.interact(&DesignId::parse(pos)?, &DesignId::parse(neg)?)?;
            serde_json::to_value(dispute)?
        }
        Command::Strategy { design_id, player } => {
            let id = DesignId::parse(design_id)?;
            let player = match player {
                Some(player) => *player,
                None => default_player(engine.store().require_design(&id)?),
            };
            serde_json::to_value(engine.construct_strategy(&id, player, &[])?)?
        }
        Command::Closure { design_ids, commit } => {
            let ids = design_ids
                .iter()
                .map(|raw| DesignId::parse(raw))
                .collect::<Result<DesignSet, _>>()?;
            if *commit {
                serde_json::to_value(engine.commit_behaviour(None, ids)?)?
            } else {
                let closure = engine.closure(&ids)?;
                json!({
                    "designIds": ids,
                    "closureIds": closure,
                    "isClosed": closure == ids,
                })
            }
        }
        Command::Analyze { input } => engine.handle(&read_input(input)?),
        Command::Summary { input } => engine.handle_summary(&read_input(input)?),
    };
    Ok(out)
}

fn main() -> Result<()> {
    init_tracing();

    let Cli { store, command } = Cli::parse();
    let config = LudicsConfig::load_or_default()?;
    let mut engine = load_engine(config, store.as_deref())?;

    let out = run(&mut engine, &command)?;

    if command.mutates()
        && let Some(path) = store.as_deref()
    {
        save_engine(&engine, path)?;
    }

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &out)?;
    writeln!(stdout)?;
    Ok(())
}
