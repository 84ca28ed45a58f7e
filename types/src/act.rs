//! Interaction acts and the two polarity vocabularies.
//!
//! [`Polarity`] is the speech-act polarity carried by an [`Act`]
//! (assertive / interrogative / daimon). [`Player`] is the P/O tag used by
//! strategies. They are kept apart on purpose; see `Sign` for the bridge
//! used by the design model.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{ActId, MoveId};
use crate::locus::{Locus, LocusParseError};
use crate::wire::lenient_openings;

// ── Polarity ─────────────────────────────────────────────────

/// Act-level polarity, copied verbatim from the move payload.
///
/// Only the exact spellings `pos`, `neg` and `daimon` are recognised. Any
/// other string survives untouched as `Unknown`, so serializing an act
/// gives back the spelling it was compiled from. The design model rejects
/// `Unknown` on insert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Polarity {
    Positive,
    Negative,
    Daimon,
    Unknown(String),
}

impl Polarity {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Positive => "pos",
            Self::Negative => "neg",
            Self::Daimon => "daimon",
            Self::Unknown(raw) => raw,
        }
    }

    /// The design-level sign of this polarity. The daimon is positive.
    #[must_use]
    pub fn sign(&self) -> Option<Sign> {
        match self {
            Self::Positive | Self::Daimon => Some(Sign::Positive),
            Self::Negative => Some(Sign::Negative),
            Self::Unknown(_) => None,
        }
    }

    #[must_use]
    pub fn is_daimon(&self) -> bool {
        matches!(self, Self::Daimon)
    }
}

impl Default for Polarity {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

impl From<String> for Polarity {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pos" => Self::Positive,
            "neg" => Self::Negative,
            "daimon" => Self::Daimon,
            _ => Self::Unknown(value),
        }
    }
}

impl From<&str> for Polarity {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl From<Polarity> for String {
    fn from(value: Polarity) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sign of a design or of a node in a design tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }

    /// Expected sign at `depth` below a base of sign `self`.
    #[must_use]
    pub const fn at_depth(self, depth: usize) -> Self {
        if depth % 2 == 0 { self } else { self.flip() }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => f.write_str("positive"),
            Self::Negative => f.write_str("negative"),
        }
    }
}

/// Strategy-level player tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    #[serde(rename = "P", alias = "Proponent")]
    Proponent,
    #[serde(rename = "O", alias = "Opponent")]
    Opponent,
}

impl Player {
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Proponent => Self::Opponent,
            Self::Opponent => Self::Proponent,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Proponent => "P",
            Self::Opponent => "O",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "p" | "proponent" => Some(Self::Proponent),
            "o" | "opponent" => Some(Self::Opponent),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Attack metadata ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttackType {
    #[serde(alias = "undermines")]
    Undermines,
    #[serde(alias = "undercuts")]
    Undercuts,
    #[serde(alias = "rebuts")]
    Rebuts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetScope {
    Premise,
    Inference,
    Conclusion,
}

/// ASPIC+ attack carried by every act compiled from an attacking move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackRecord {
    pub attack_type: AttackType,
    pub attacker_id: String,
    pub defender_id: String,
    pub succeeded: bool,
    pub target_scope: Option<TargetScope>,
    pub cq_key: Option<String>,
    pub cq_text: Option<String>,
    pub reason: Option<String>,
    pub scheme_key: Option<String>,
}

/// Where an act came from. Shared unchanged by every act of one move.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub move_id: MoveId,
    #[serde(default)]
    pub target_type: Option<String>,
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub actor_id: Option<String>,
}

// ── Act ──────────────────────────────────────────────────────

/// Atomic interaction event. Immutable once built.
///
/// `aspic` always serializes, as `null` when the originating move carried
/// no attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Act {
    id: ActId,
    polarity: Polarity,
    #[serde(default = "root_path")]
    locus_path: String,
    #[serde(default, deserialize_with = "lenient_openings")]
    openings: BTreeSet<u32>,
    #[serde(default)]
    expression: String,
    #[serde(default)]
    is_additive: bool,
    #[serde(flatten)]
    provenance: Provenance,
    #[serde(default)]
    aspic: Option<AttackRecord>,
}

fn root_path() -> String {
    "0".to_owned()
}

impl Act {
    #[must_use]
    pub fn new(id: ActId, polarity: Polarity, locus_path: impl Into<String>) -> Self {
        Self {
            id,
            polarity,
            locus_path: locus_path.into(),
            openings: BTreeSet::new(),
            expression: String::new(),
            is_additive: false,
            provenance: Provenance::default(),
            aspic: None,
        }
    }

    #[must_use]
    pub fn with_openings(mut self, openings: impl IntoIterator<Item = u32>) -> Self {
        self.openings = openings.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = expression.into();
        self
    }

    #[must_use]
    pub fn additive(mut self, is_additive: bool) -> Self {
        self.is_additive = is_additive;
        self
    }

    #[must_use]
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    #[must_use]
    pub fn with_attack(mut self, attack: Option<AttackRecord>) -> Self {
        self.aspic = attack;
        self
    }

    #[must_use]
    pub fn id(&self) -> &ActId {
        &self.id
    }

    #[must_use]
    pub fn polarity(&self) -> &Polarity {
        &self.polarity
    }

    #[must_use]
    pub fn is_daimon(&self) -> bool {
        self.polarity.is_daimon()
    }

    #[must_use]
    pub fn locus_path(&self) -> &str {
        &self.locus_path
    }

    pub fn locus(&self) -> Result<Locus, LocusParseError> {
        Locus::parse(&self.locus_path)
    }

    #[must_use]
    pub fn openings(&self) -> &BTreeSet<u32> {
        &self.openings
    }

    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    #[must_use]
    pub fn is_additive(&self) -> bool {
        self.is_additive
    }

    #[must_use]
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    #[must_use]
    pub fn aspic(&self) -> Option<&AttackRecord> {
        self.aspic.as_ref()
    }

    /// The same act seen from the other side: opposite polarity, renamed
    /// to `id`, everything else shared. The daimon and unknown polarities
    /// have no dual.
    #[must_use]
    pub fn dual(&self, id: ActId) -> Option<Self> {
        let polarity = match self.polarity {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
            Polarity::Daimon | Polarity::Unknown(_) => return None,
        };
        Some(Self {
            id,
            polarity,
            ..self.clone()
        })
    }
}
