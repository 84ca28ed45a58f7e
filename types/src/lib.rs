//! Core domain types for the ludics engine.
//!
//! Pure data: identifiers, tree addresses, acts and the upstream move wire
//! format. No IO, no engine logic. Everything here can be shared between
//! the engine and any front end that feeds it moves.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod act;
mod ids;
mod locus;
mod moves;
pub mod wire;

pub use act::{Act, AttackRecord, AttackType, Player, Polarity, Provenance, Sign, TargetScope};
pub use ids::{
    ActId, BehaviourId, DesignId, DialogueId, DisputeId, IdError, MoveId, StrategyId,
};
pub use locus::{Locus, LocusParseError};
pub use moves::{ActEntry, AspicAttack, AspicMetadata, Move, MoveKind, MovePayload};
