//! Command-line parsing.
//!
//! `-` in place of a JSON file reads stdin. With `--store`, the snapshot is
//! loaded first (if the file exists) and written back after commands that
//! change it.

use std::convert::Infallible;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use ludics_types::Player;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    fn parse(raw: &str) -> Result<Self, Infallible> {
        Ok(if raw == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(raw))
        })
    }
}

#[derive(Debug, Parser)]
#[command(name = "ludics")]
#[command(about = "Compile dialogue moves into designs and analyse their interaction")]
pub struct Cli {
    /// Store snapshot to load first and write back after changes
    #[arg(long, global = true, value_name = "SNAPSHOT")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Compile each move into its acts
    Compile {
        /// Moves JSON (a move or an array of moves), or `-`
        #[arg(value_parser = Input::parse)]
        input: Input,
    },
    /// Compile a dialogue into its Proponent and Opponent designs
    Dialogue {
        dialogue_id: String,
        /// Moves JSON, or `-`
        #[arg(value_parser = Input::parse)]
        input: Input,
    },
    /// Run and store the dispute of a positive design against a negative one
    Interact { pos: String, neg: String },
    /// Build and store a strategy from the disputes touching a design
    Strategy {
        design_id: String,
        /// P or O; defaults to the design's own side
        #[arg(value_parser = parse_player)]
        player: Option<Player>,
    },
    /// Bi-orthogonal closure of a set of designs
    Closure {
        /// Store the result as a behaviour and freeze the examined designs
        #[arg(long)]
        commit: bool,
        #[arg(required = true)]
        design_ids: Vec<String>,
    },
    /// Run an analysis request
    Analyze {
        /// Request JSON, or `-`
        #[arg(value_parser = Input::parse)]
        input: Input,
    },
    /// Summary counts for a design or a dialogue
    Summary {
        /// Request JSON, or `-`
        #[arg(value_parser = Input::parse)]
        input: Input,
    },
}

impl Command {
    /// Whether running the command can change the store.
    #[must_use]
    pub fn mutates(&self) -> bool {
        match self {
            Self::Dialogue { .. } | Self::Interact { .. } | Self::Strategy { .. } => true,
            Self::Closure { commit, .. } => *commit,
            Self::Compile { .. } | Self::Analyze { .. } | Self::Summary { .. } => false,
        }
    }
}

fn parse_player(raw: &str) -> Result<Player, String> {
    Player::parse(raw).ok_or_else(|| format!("unknown player `{raw}` (expected P or O)"))
}
