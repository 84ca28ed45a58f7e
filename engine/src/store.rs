//! In-memory store of designs, disputes, strategies and behaviours.
//!
//! A plain owned value: reads take `&self`, commits take `&mut self`.
//! Collections are ordered maps so "the universe" always iterates in id
//! order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use ludics_types::{Act, BehaviourId, DesignId, DialogueId, DisputeId, StrategyId};

use crate::behaviour::Behaviour;
use crate::design::{Design, DesignRecord, InsertPolicy};
use crate::dispute::Dispute;
use crate::error::{EngineError, InsertError};
use crate::strategy::Strategy;

#[derive(Debug, Clone, Default)]
pub struct LudicsStore {
    designs: BTreeMap<DesignId, Design>,
    disputes: BTreeMap<DisputeId, Dispute>,
    strategies: BTreeMap<StrategyId, Strategy>,
    behaviours: BTreeMap<BehaviourId, Behaviour>,
}

/// Serialized form of a whole store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreSnapshot {
    pub designs: Vec<DesignRecord>,
    pub disputes: Vec<Dispute>,
    pub strategies: Vec<Strategy>,
    pub behaviours: Vec<Behaviour>,
}

impl LudicsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── Designs ──────────────────────────────────────────────

    #[must_use]
    pub fn design(&self, id: &DesignId) -> Option<&Design> {
        self.designs.get(id)
    }

    pub fn require_design(&self, id: &DesignId) -> Result<&Design, EngineError> {
        self.designs
            .get(id)
            .ok_or_else(|| EngineError::not_found("design", id.as_str()))
    }

    pub fn designs(&self) -> impl Iterator<Item = &Design> {
        self.designs.values()
    }

    pub fn designs_in_dialogue<'a>(
        &'a self,
        dialogue_id: &'a DialogueId,
    ) -> impl Iterator<Item = &'a Design> {
        self.designs
            .values()
            .filter(move |d| d.dialogue_id() == Some(dialogue_id))
    }

    /// Add or replace a design. A frozen design cannot be replaced.
    pub fn put_design(&mut self, design: Design) -> Result<(), EngineError> {
        if let Some(existing) = self.designs.get(design.id())
            && existing.is_frozen()
        {
            return Err(InsertError::ConcurrentModification {
                design_id: design.id().clone(),
            }
            .into());
        }
        debug!(design_id = %design.id(), acts = design.len(), "storing design");
        self.designs.insert(design.id().clone(), design);
        Ok(())
    }

    pub fn insert_act(
        &mut self,
        design_id: &DesignId,
        act: Act,
        policy: InsertPolicy,
    ) -> Result<(), EngineError> {
        let design = self
            .designs
            .get_mut(design_id)
            .ok_or_else(|| EngineError::not_found("design", design_id.as_str()))?;
        design.insert(act, policy)?;
        Ok(())
    }

    pub(crate) fn freeze(&mut self, design_id: &DesignId) {
        if let Some(design) = self.designs.get_mut(design_id) {
            design.freeze();
        }
    }

    // ── Disputes ─────────────────────────────────────────────

    #[must_use]
    pub fn dispute(&self, id: &DisputeId) -> Option<&Dispute> {
        self.disputes.get(id)
    }

    pub fn require_dispute(&self, id: &DisputeId) -> Result<&Dispute, EngineError> {
        self.disputes
            .get(id)
            .ok_or_else(|| EngineError::not_found("dispute", id.as_str()))
    }

    pub fn disputes(&self) -> impl Iterator<Item = &Dispute> {
        self.disputes.values()
    }

    pub fn disputes_touching<'a>(
        &'a self,
        design_id: &'a DesignId,
    ) -> impl Iterator<Item = &'a Dispute> {
        self.disputes.values().filter(move |d| d.touches(design_id))
    }

    pub(crate) fn put_dispute(&mut self, dispute: Dispute) {
        self.disputes.insert(dispute.id.clone(), dispute);
    }

    // ── Strategies ───────────────────────────────────────────

    #[must_use]
    pub fn strategy(&self, id: &StrategyId) -> Option<&Strategy> {
        self.strategies.get(id)
    }

    pub fn require_strategy(&self, id: &StrategyId) -> Result<&Strategy, EngineError> {
        self.strategies
            .get(id)
            .ok_or_else(|| EngineError::not_found("strategy", id.as_str()))
    }

    pub fn strategies(&self) -> impl Iterator<Item = &Strategy> {
        self.strategies.values()
    }

    pub(crate) fn put_strategy(&mut self, strategy: Strategy) {
        self.strategies.insert(strategy.id.clone(), strategy);
    }

    // ── Behaviours ───────────────────────────────────────────

    #[must_use]
    pub fn behaviour(&self, id: &BehaviourId) -> Option<&Behaviour> {
        self.behaviours.get(id)
    }

    pub fn behaviours(&self) -> impl Iterator<Item = &Behaviour> {
        self.behaviours.values()
    }

    pub fn behaviours_containing<'a>(
        &'a self,
        design_id: &'a DesignId,
    ) -> impl Iterator<Item = &'a Behaviour> {
        self.behaviours
            .values()
            .filter(move |b| b.design_ids.contains(design_id))
    }

    pub(crate) fn put_behaviour(&mut self, behaviour: Behaviour) {
        self.behaviours.insert(behaviour.id.clone(), behaviour);
    }

    // ── Snapshots ────────────────────────────────────────────

    /// Rebuild a store. Designs are replayed under `policy`; acts that no
    /// longer validate are kept as rejections on their design.
    #[must_use]
    pub fn from_snapshot(snapshot: StoreSnapshot, policy: InsertPolicy) -> Self {
        let mut store = Self::new();
        for record in snapshot.designs {
            let design = Design::from_record(record, policy);
            store.designs.insert(design.id().clone(), design);
        }
        for dispute in snapshot.disputes {
            store.put_dispute(dispute);
        }
        for strategy in snapshot.strategies {
            store.put_strategy(strategy);
        }
        for behaviour in snapshot.behaviours {
            store.put_behaviour(behaviour);
        }
        debug!(
            designs = store.designs.len(),
            disputes = store.disputes.len(),
            strategies = store.strategies.len(),
            behaviours = store.behaviours.len(),
            "store loaded"
        );
        store
    }

    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            designs: self.designs.values().map(Design::to_record).collect(),
            disputes: self.disputes.values().cloned().collect(),
            strategies: self.strategies.values().cloned().collect(),
            behaviours: self.behaviours.values().cloned().collect(),
        }
    }
}
