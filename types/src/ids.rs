use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} id must not be empty")]
pub struct IdError {
    pub kind: &'static str,
}

/// Declares a string-backed identifier newtype.
///
/// Identifiers are opaque: the engine never interprets their contents, it
/// only requires them to be non-blank when they come from a request.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Build an id from untrusted input, rejecting blank strings.
            pub fn parse(value: &str) -> Result<Self, IdError> {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    Err(IdError { kind: $kind })
                } else {
                    Ok(Self(trimmed.to_owned()))
                }
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifier of an upstream dialogue move.
    MoveId,
    "move"
);
string_id!(
    /// Identifier of a compiled act: `<moveId>#<index>`.
    ActId,
    "act"
);
string_id!(DesignId, "design");
string_id!(DisputeId, "dispute");
string_id!(StrategyId, "strategy");
string_id!(BehaviourId, "behaviour");
string_id!(
    /// Dialogue (deliberation) a design or dispute belongs to.
    DialogueId,
    "dialogue"
);

impl ActId {
    /// Act ids are positional within their move so recompiling is stable.
    #[must_use]
    pub fn for_move(move_id: &MoveId, index: usize) -> Self {
        Self(format!("{move_id}#{index}"))
    }

    /// Id of the mirrored copy of this act on the other side of a dialogue.
    #[must_use]
    pub fn dual(&self) -> Self {
        Self(format!("{}~", self.0))
    }
}
