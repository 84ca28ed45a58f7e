//! Interaction of a positive design against a negative one.

use std::mem;

use serde::{Deserialize, Serialize};
use tracing::debug;

use ludics_types::{Act, ActId, DesignId, DialogueId, DisputeId, Locus, Sign};

use crate::design::Design;
use crate::digest::digest_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeStatus {
    Ongoing,
    Convergent,
    Divergent,
    Stuck,
}

impl DisputeStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Ongoing)
    }
}

/// One matched step. `pos_act_id` is the positive or daimon act played;
/// `neg_act_id` the act it met, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputePair {
    pub step: usize,
    pub locus_path: String,
    pub pos_act_id: ActId,
    #[serde(default)]
    pub neg_act_id: Option<ActId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dispute {
    pub id: DisputeId,
    #[serde(default)]
    pub dialogue_id: Option<DialogueId>,
    pub pos_design_id: DesignId,
    pub neg_design_id: DesignId,
    #[serde(default)]
    pub pairs: Vec<DisputePair>,
    pub status: DisputeStatus,
    #[serde(default)]
    pub length: usize,
}

impl Dispute {
    #[must_use]
    pub fn id_for(pos: &DesignId, neg: &DesignId) -> DisputeId {
        DisputeId::new(digest_id("dsp", &[pos.as_str(), neg.as_str()]))
    }

    #[must_use]
    pub fn is_convergent(&self) -> bool {
        self.status == DisputeStatus::Convergent
    }

    #[must_use]
    pub fn touches(&self, design_id: &DesignId) -> bool {
        &self.pos_design_id == design_id || &self.neg_design_id == design_id
    }
}

struct Trace {
    pairs: Vec<DisputePair>,
}

impl Trace {
    fn record(&mut self, locus: &Locus, pos: &Act, neg: Option<&Act>) {
        self.pairs.push(DisputePair {
            step: self.pairs.len(),
            locus_path: locus.to_string(),
            pos_act_id: pos.id().clone(),
            neg_act_id: neg.map(|a| a.id().clone()),
        });
    }
}

/// Run the interaction without touching either design.
///
/// Deterministic: the same two designs always give the same dispute.
#[must_use]
pub fn run(pos: &Design, neg: &Design) -> Dispute {
    let mut trace = Trace { pairs: Vec::new() };
    let status = walk(pos, neg, &mut trace);
    debug!(
        pos_design_id = %pos.id(),
        neg_design_id = %neg.id(),
        ?status,
        steps = trace.pairs.len(),
        "dispute computed"
    );
    Dispute {
        id: Dispute::id_for(pos.id(), neg.id()),
        dialogue_id: pos
            .dialogue_id()
            .or_else(|| neg.dialogue_id())
            .cloned(),
        pos_design_id: pos.id().clone(),
        neg_design_id: neg.id().clone(),
        length: trace.pairs.len(),
        pairs: trace.pairs,
        status,
    }
}

fn walk(pos: &Design, neg: &Design, trace: &mut Trace) -> DisputeStatus {
    if pos.base() != neg.base() {
        return DisputeStatus::Divergent;
    }
    let mut live = pos.base().clone();
    let (mut active, mut passive) = (pos, neg);

    loop {
        let Some(a) = active.act_at(&live) else {
            return DisputeStatus::Stuck;
        };
        let p = passive.act_at(&live);
        if a.is_daimon() {
            trace.record(&live, a, p);
            return DisputeStatus::Convergent;
        }
        let Some(p) = p else {
            return DisputeStatus::Stuck;
        };
        if p.is_daimon() {
            trace.record(&live, p, Some(a));
            return DisputeStatus::Convergent;
        }
        let opposed = a.polarity().sign() == Some(Sign::Positive)
            && p.polarity().sign() == Some(Sign::Negative);
        if !opposed || !a.openings().is_subset(p.openings()) {
            return DisputeStatus::Divergent;
        }
        trace.record(&live, a, Some(p));

        mem::swap(&mut active, &mut passive);
        let next = a
            .openings()
            .iter()
            .map(|&i| live.child(i))
            .find(|child| active.act_at(child).is_some());
        match next {
            Some(child) => live = child,
            None => return DisputeStatus::Stuck,
        }
    }
}
