//! Lenient field readers for upstream JSON.
//!
//! Upstream move payloads are loosely typed. These helpers read a field as
//! a [`serde_json::Value`] first and then coerce it, so one odd field
//! degrades to its default instead of failing the whole record.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// JavaScript truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Reads any JSON value as a boolean using [`is_truthy`].
pub fn truthy_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().is_some_and(is_truthy))
}

/// Reads an openings list. A non-array becomes the empty set; entries that
/// are neither non-negative integers nor numeric strings are dropped.
pub fn lenient_openings<'de, D>(deserializer: D) -> Result<BTreeSet<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(openings_from_value(value.as_ref()))
}

#[must_use]
pub fn openings_from_value(value: Option<&Value>) -> BTreeSet<u32> {
    let Some(Value::Array(items)) = value else {
        return BTreeSet::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Value::String(s) => s.trim().parse::<u32>().ok(),
            _ => None,
        })
        .collect()
}

/// Reads an optional string, treating any non-string as absent.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}
