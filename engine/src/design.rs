//! Designs: one player's prepared tree of acts.
//!
//! Acts live in an arena (`Vec<Act>`) with a locus index beside it. Child
//! lookups go through the parent's openings, so there are no parent/child
//! pointers to keep in sync.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use ludics_types::{Act, DesignId, DialogueId, Locus, Player, Polarity, Sign};

use crate::error::InsertError;

/// Rules applied on insert. Built from `[design]` config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertPolicy {
    pub enforce_polarity: bool,
}

impl Default for InsertPolicy {
    fn default() -> Self {
        Self {
            enforce_polarity: true,
        }
    }
}

/// An act refused during replay, kept so analysis can report on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedAct {
    pub act: Act,
    pub error: InsertError,
}

#[derive(Debug, Clone)]
pub struct Design {
    id: DesignId,
    base: Locus,
    sign: Sign,
    dialogue_id: Option<DialogueId>,
    participant: Option<Player>,
    acts: Vec<Act>,
    loci: Vec<Locus>,
    index: HashMap<Locus, usize>,
    rejected: Vec<RejectedAct>,
    frozen: bool,
}

impl Design {
    #[must_use]
    pub fn new(id: DesignId, base: Locus, sign: Sign) -> Self {
        Self {
            id,
            base,
            sign,
            dialogue_id: None,
            participant: None,
            acts: Vec::new(),
            loci: Vec::new(),
            index: HashMap::new(),
            rejected: Vec::new(),
            frozen: false,
        }
    }

    #[must_use]
    pub fn with_dialogue(mut self, dialogue_id: DialogueId) -> Self {
        self.dialogue_id = Some(dialogue_id);
        self
    }

    #[must_use]
    pub fn with_participant(mut self, participant: Player) -> Self {
        self.participant = Some(participant);
        self
    }

    #[must_use]
    pub fn id(&self) -> &DesignId {
        &self.id
    }

    #[must_use]
    pub fn base(&self) -> &Locus {
        &self.base
    }

    #[must_use]
    pub fn sign(&self) -> Sign {
        self.sign
    }

    #[must_use]
    pub fn polarity(&self) -> Polarity {
        match self.sign {
            Sign::Positive => Polarity::Positive,
            Sign::Negative => Polarity::Negative,
        }
    }

    #[must_use]
    pub fn dialogue_id(&self) -> Option<&DialogueId> {
        self.dialogue_id.as_ref()
    }

    #[must_use]
    pub fn participant(&self) -> Option<Player> {
        self.participant
    }

    /// Accepted acts in insertion order.
    #[must_use]
    pub fn acts(&self) -> &[Act] {
        &self.acts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.acts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.acts.is_empty()
    }

    #[must_use]
    pub fn rejected(&self) -> &[RejectedAct] {
        &self.rejected
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub(crate) fn freeze(&mut self) {
        if !self.frozen {
            debug!(design_id = %self.id, "freezing design");
        }
        self.frozen = true;
    }

    #[must_use]
    pub fn act_at(&self, locus: &Locus) -> Option<&Act> {
        self.index.get(locus).map(|&i| &self.acts[i])
    }

    /// Acts paired with their parsed loci.
    pub fn located_acts(&self) -> impl Iterator<Item = (&Locus, &Act)> {
        self.loci.iter().zip(&self.acts)
    }

    /// Children of `locus` that hold an act, in opening order.
    pub fn children(&self, locus: &Locus) -> impl Iterator<Item = (&Locus, &Act)> {
        let openings = self
            .act_at(locus)
            .map(|act| act.openings().iter().copied().collect::<Vec<_>>())
            .unwrap_or_default();
        let parent = locus.clone();
        openings.into_iter().filter_map(move |i| {
            let idx = *self.index.get(&parent.child(i))?;
            Some((&self.loci[idx], &self.acts[idx]))
        })
    }

    /// Largest depth below the base among accepted acts.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.loci
            .iter()
            .filter_map(|l| l.depth_below(&self.base))
            .max()
            .unwrap_or(0)
    }

    /// Widest ramification among accepted acts.
    #[must_use]
    pub fn branching_factor(&self) -> usize {
        self.acts
            .iter()
            .map(|a| a.openings().len())
            .max()
            .unwrap_or(0)
    }

    /// Validate and append one act.
    ///
    /// On error the design is unchanged.
    pub fn insert(&mut self, act: Act, policy: InsertPolicy) -> Result<(), InsertError> {
        let locus = self.check_insert(&act, policy)?;
        self.index.insert(locus.clone(), self.acts.len());
        self.loci.push(locus);
        self.acts.push(act);
        Ok(())
    }

    /// Run every insert check without changing the design. Returns the
    /// parsed locus the act would occupy.
    pub fn check_insert(&self, act: &Act, policy: InsertPolicy) -> Result<Locus, InsertError> {
        if self.frozen {
            return Err(InsertError::ConcurrentModification {
                design_id: self.id.clone(),
            });
        }
        let locus = act.locus().map_err(|source| InsertError::InvalidLocus {
            raw: act.locus_path().to_owned(),
            source,
        })?;
        let Some(found) = act.polarity().sign() else {
            return Err(InsertError::UnknownPolarity {
                polarity: act.polarity().to_string(),
            });
        };
        let Some(depth) = locus.depth_below(&self.base) else {
            return Err(InsertError::OrphanLocus {
                locus: locus.to_string(),
            });
        };
        if self.index.contains_key(&locus) {
            return Err(InsertError::AddressConflict {
                locus: locus.to_string(),
                sibling: None,
            });
        }
        if depth > 0 {
            self.check_justified(&locus)?;
        }
        if policy.enforce_polarity {
            let expected = self.sign.at_depth(depth);
            if expected != found {
                return Err(InsertError::PolarityMismatch {
                    locus: locus.to_string(),
                    expected,
                    found,
                });
            }
        }

        Ok(locus)
    }

    fn check_justified(&self, locus: &Locus) -> Result<(), InsertError> {
        let orphan = || InsertError::OrphanLocus {
            locus: locus.to_string(),
        };
        let parent_locus = locus.parent().ok_or_else(orphan)?;
        let parent = self.act_at(&parent_locus).ok_or_else(orphan)?;
        let label = locus.last();
        if !parent.openings().contains(&label) {
            return Err(orphan());
        }
        if parent.is_additive() {
            let taken = parent
                .openings()
                .iter()
                .filter(|&&i| i != label)
                .map(|&i| parent_locus.child(i))
                .find(|sibling| self.index.contains_key(sibling));
            if let Some(sibling) = taken {
                return Err(InsertError::AddressConflict {
                    locus: locus.to_string(),
                    sibling: Some(sibling.to_string()),
                });
            }
        }
        Ok(())
    }

    /// Insert every act, keeping refused ones in [`Design::rejected`].
    pub(crate) fn replay(&mut self, acts: impl IntoIterator<Item = Act>, policy: InsertPolicy) {
        for act in acts {
            if let Err(error) = self.insert(act.clone(), policy) {
                debug!(design_id = %self.id, act_id = %act.id(), %error, "replay rejected act");
                self.rejected.push(RejectedAct { act, error });
            }
        }
    }

    /// Legality report over everything offered to this design.
    #[must_use]
    pub fn validation(&self) -> ValidationReport {
        ValidationReport::from_rejections(&self.rejected)
    }

    /// A design is a view when it is a single chronicle: no act has more
    /// than one populated child, so the acts form one branch from the base.
    #[must_use]
    pub fn is_view(&self) -> bool {
        self.loci.iter().all(|locus| self.children(locus).nth(1).is_none())
    }

    /// Whether some locus was offered two acts of opposite sign.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        self.rejected.iter().all(|r| {
            if !r.error.is_linearity_violation() {
                return true;
            }
            let Ok(locus) = r.act.locus() else {
                return true;
            };
            match (self.act_at(&locus), r.act.polarity().sign()) {
                (Some(existing), Some(sign)) => existing.polarity().sign() == Some(sign),
                _ => true,
            }
        })
    }

    #[must_use]
    pub fn to_record(&self) -> DesignRecord {
        DesignRecord {
            id: self.id.clone(),
            acts: self
                .acts
                .iter()
                .chain(self.rejected.iter().map(|r| &r.act))
                .cloned()
                .collect(),
            dialogue_id: self.dialogue_id.clone(),
            participant: self.participant,
            polarity: Some(self.polarity()),
            base: Some(self.base.clone()),
            frozen: self.frozen,
        }
    }

    /// Rebuild a design from its persisted shape.
    ///
    /// The base defaults to the shallowest act locus and the sign to the
    /// polarity of the act on the base. Acts that fail validation are kept
    /// as rejections rather than failing the load.
    #[must_use]
    pub fn from_record(record: DesignRecord, policy: InsertPolicy) -> Self {
        let base = record
            .base
            .clone()
            .or_else(|| {
                record
                    .acts
                    .iter()
                    .filter_map(|a| a.locus().ok())
                    .min_by_key(Locus::depth)
            })
            .unwrap_or_default();
        let sign = record
            .polarity
            .as_ref()
            .and_then(Polarity::sign)
            .or_else(|| {
                record
                    .acts
                    .iter()
                    .find(|a| a.locus().is_ok_and(|l| l == base))
                    .and_then(|a| a.polarity().sign())
            })
            .unwrap_or(Sign::Positive);

        let mut design = Design::new(record.id, base, sign);
        design.dialogue_id = record.dialogue_id;
        design.participant = record.participant;
        design.replay(record.acts, policy);
        design.frozen = record.frozen;
        design
    }
}

/// Persisted design shape. Only `id` and `acts` are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignRecord {
    pub id: DesignId,
    #[serde(default)]
    pub acts: Vec<Act>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialogue_id: Option<DialogueId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant: Option<Player>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polarity: Option<Polarity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<Locus>,
    #[serde(default)]
    pub frozen: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub legal: bool,
    pub linear: bool,
    pub justified: bool,
    pub polarity_consistent: bool,
    pub additive_respected: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_rejections(rejected: &[RejectedAct]) -> Self {
        let none = |pred: fn(&InsertError) -> bool| !rejected.iter().any(|r| pred(&r.error));
        Self {
            legal: rejected.is_empty(),
            linear: none(InsertError::is_linearity_violation),
            justified: none(InsertError::is_justification_violation),
            polarity_consistent: none(InsertError::is_polarity_violation),
            additive_respected: none(InsertError::is_additive_violation),
            errors: rejected
                .iter()
                .map(|r| format!("{}: {}", r.act.id(), r.error))
                .collect(),
        }
    }
}

/// Replay `acts` into a scratch design rooted at `base` and report every
/// violation, not just the first.
#[must_use]
pub fn validate(
    base: &Locus,
    sign: Sign,
    acts: &[Act],
    policy: InsertPolicy,
) -> ValidationReport {
    let mut scratch = Design::new(DesignId::new("scratch"), base.clone(), sign);
    scratch.replay(acts.iter().cloned(), policy);
    scratch.validation()
}
