use thiserror::Error;

use ludics_types::{DesignId, LocusParseError, Sign};

/// Why an act could not be placed into a design.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsertError {
    /// The locus is taken, or `sibling` already holds the other branch of an
    /// additive choice.
    #[error("{}", address_conflict_message(locus, sibling.as_deref()))]
    AddressConflict {
        locus: String,
        sibling: Option<String>,
    },
    #[error("locus {locus} is not opened by any act in the design")]
    OrphanLocus { locus: String },
    #[error("invalid locus {raw:?}")]
    InvalidLocus {
        raw: String,
        #[source]
        source: LocusParseError,
    },
    #[error("unknown polarity {polarity:?}")]
    UnknownPolarity { polarity: String },
    #[error("act at {locus} should be {expected}, found {found}")]
    PolarityMismatch {
        locus: String,
        expected: Sign,
        found: Sign,
    },
    #[error("design {design_id} is frozen")]
    ConcurrentModification { design_id: DesignId },
}

fn address_conflict_message(locus: &str, sibling: Option<&str>) -> String {
    match sibling {
        Some(sibling) => {
            format!("locus {locus} conflicts with additive branch {sibling}")
        }
        None => format!("locus {locus} is already occupied"),
    }
}

impl InsertError {
    /// Same-locus conflicts break linearity; sibling conflicts break an
    /// additive choice.
    #[must_use]
    pub fn is_linearity_violation(&self) -> bool {
        matches!(self, Self::AddressConflict { sibling: None, .. })
    }

    #[must_use]
    pub fn is_additive_violation(&self) -> bool {
        matches!(self, Self::AddressConflict { sibling: Some(_), .. })
    }

    #[must_use]
    pub fn is_justification_violation(&self) -> bool {
        matches!(self, Self::OrphanLocus { .. } | Self::InvalidLocus { .. })
    }

    #[must_use]
    pub fn is_polarity_violation(&self) -> bool {
        matches!(
            self,
            Self::PolarityMismatch { .. } | Self::UnknownPolarity { .. }
        )
    }
}

/// Errors surfaced by engine operations and the analysis request surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error(transparent)]
    Insert(#[from] InsertError),
    #[error("closure timed out after {limit_ms} ms")]
    ClosureTimeout { limit_ms: u64 },
    #[error("complexity score {score} exceeds limit {limit}")]
    ComplexityExceeded { score: u64, limit: u64 },
}

impl EngineError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// HTTP-equivalent status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Insert(_) => 409,
            Self::ComplexityExceeded { .. } => 422,
            Self::ClosureTimeout { .. } => 503,
        }
    }
}
