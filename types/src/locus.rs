//! Tree addresses.
//!
//! A locus is a non-empty path of non-negative integers written with dots,
//! e.g. `0`, `0.1`, `0.1.3`. The root of every dialogue is `0`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocusParseError {
    #[error("locus must not be empty")]
    Empty,
    #[error("locus segment {segment:?} in {raw:?} is not a non-negative integer")]
    BadSegment { raw: String, segment: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locus(Vec<u32>);

impl Locus {
    #[must_use]
    pub fn root() -> Self {
        Self(vec![0])
    }

    pub fn parse(raw: &str) -> Result<Self, LocusParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LocusParseError::Empty);
        }
        trimmed
            .split('.')
            .map(|segment| {
                segment
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| LocusParseError::BadSegment {
                        raw: raw.to_owned(),
                        segment: segment.to_owned(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    #[must_use]
    pub fn segments(&self) -> &[u32] {
        &self.0
    }

    /// Number of segments below the first one. The root has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len() - 1
    }

    #[must_use]
    pub fn last(&self) -> u32 {
        self.0[self.0.len() - 1]
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.len() <= 1 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    #[must_use]
    pub fn child(&self, label: u32) -> Self {
        let mut segments = self.0.clone();
        segments.push(label);
        Self(segments)
    }

    /// Whether `self` equals `other` or lies below it.
    #[must_use]
    pub fn is_within(&self, other: &Locus) -> bool {
        self.0.len() >= other.0.len() && self.0[..other.0.len()] == other.0[..]
    }

    /// Depth of `self` measured from `base`, if `self` lies within `base`.
    #[must_use]
    pub fn depth_below(&self, base: &Locus) -> Option<usize> {
        self.is_within(base).then(|| self.0.len() - base.0.len())
    }
}

impl Default for Locus {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for Locus {
    type Err = LocusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Locus {
    type Error = LocusParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Locus> for String {
    fn from(value: Locus) -> Self {
        value.to_string()
    }
}
