//! Upstream dialogue moves.
//!
//! Only the fields the engine reads are modelled. Everything else in a move
//! payload is ignored on deserialization.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::act::{AttackType, Polarity, TargetScope};
use crate::ids::MoveId;
use crate::wire::{lenient_openings, lenient_string, truthy_bool};

/// Protocol move kind. Unknown kinds are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MoveKind {
    #[default]
    Assert,
    Why,
    Grounds,
    Retract,
    Concede,
    Close,
    Therefore,
    Suppose,
    Discharge,
    Other(String),
}

impl MoveKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Assert => "ASSERT",
            Self::Why => "WHY",
            Self::Grounds => "GROUNDS",
            Self::Retract => "RETRACT",
            Self::Concede => "CONCEDE",
            Self::Close => "CLOSE",
            Self::Therefore => "THEREFORE",
            Self::Suppose => "SUPPOSE",
            Self::Discharge => "DISCHARGE",
            Self::Other(raw) => raw,
        }
    }

    /// Moves that question rather than assert.
    #[must_use]
    pub fn is_interrogative(&self) -> bool {
        matches!(self, Self::Why)
    }
}

impl From<String> for MoveKind {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "ASSERT" => Self::Assert,
            "WHY" => Self::Why,
            "GROUNDS" => Self::Grounds,
            "RETRACT" => Self::Retract,
            "CONCEDE" => Self::Concede,
            "CLOSE" => Self::Close,
            "THEREFORE" => Self::Therefore,
            "SUPPOSE" => Self::Suppose,
            "DISCHARGE" => Self::Discharge,
            _ => Self::Other(value),
        }
    }
}

impl From<MoveKind> for String {
    fn from(value: MoveKind) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One upstream move record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub id: MoveId,
    #[serde(default)]
    pub kind: MoveKind,
    #[serde(default, deserialize_with = "lenient_payload")]
    pub payload: Option<MovePayload>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub target_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub target_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub actor_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePayload {
    /// `None` when the payload has no `acts` array at all.
    #[serde(default, deserialize_with = "lenient_acts")]
    pub acts: Option<Vec<ActEntry>>,
    #[serde(default, deserialize_with = "lenient_attack")]
    pub aspic_attack: Option<AspicAttack>,
    #[serde(default, deserialize_with = "lenient_metadata")]
    pub aspic_metadata: Option<AspicMetadata>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cq_key: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cq_text: Option<String>,
}

/// One prototype act inside `payload.acts`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActEntry {
    #[serde(default)]
    pub polarity: Polarity,
    #[serde(default, deserialize_with = "lenient_string")]
    pub locus_path: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub expression: Option<String>,
    #[serde(default, deserialize_with = "lenient_openings")]
    pub openings: BTreeSet<u32>,
    #[serde(default, deserialize_with = "truthy_bool")]
    pub additive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AspicAttack {
    #[serde(rename = "type")]
    pub attack_type: AttackType,
    #[serde(default)]
    pub attacker_id: String,
    #[serde(default)]
    pub defender_id: String,
    #[serde(default, deserialize_with = "truthy_bool")]
    pub succeeded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AspicMetadata {
    #[serde(default)]
    pub target_scope: Option<TargetScope>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reason: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub scheme_key: Option<String>,
}

/// A payload that is not an object is treated as absent.
fn lenient_payload<'de, D>(deserializer: D) -> Result<Option<MovePayload>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(v @ Value::Object(_)) => MovePayload::deserialize(v).ok(),
        _ => None,
    })
}

/// A non-array `acts` is absent; an unreadable entry becomes a defaulted
/// entry so the act count still matches the array length.
fn lenient_acts<'de, D>(deserializer: D) -> Result<Option<Vec<ActEntry>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else {
        return Ok(None);
    };
    Ok(Some(
        items
            .into_iter()
            .map(|item| ActEntry::deserialize(item).unwrap_or_default())
            .collect(),
    ))
}

/// An attack that cannot be read is dropped with a warning, so the acts of
/// the move carry a null attack record.
fn lenient_attack<'de, D>(deserializer: D) -> Result<Option<AspicAttack>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match AspicAttack::deserialize(&v) {
        Ok(attack) => Some(attack),
        Err(err) => {
            warn!(%err, attack = %v, "unreadable aspicAttack dropped");
            None
        }
    }))
}

fn lenient_metadata<'de, D>(deserializer: D) -> Result<Option<AspicMetadata>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| AspicMetadata::deserialize(v).ok()))
}
