//! Ludics dialogue semantics engine.
//!
//! Moves compile into acts, acts accumulate into designs, and designs are
//! played against each other. On top of that sit strategies (with the
//! innocence check), behaviours (bi-orthogonal closure) and the property
//! analyses.
//!
//! [`Engine`] owns a [`LudicsStore`] and the loaded [`LudicsConfig`]. It
//! has no interior locking; wrap it in your own lock to share it.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod analysis;
mod api;
mod behaviour;
mod compiler;
mod design;
mod digest;
mod dispute;
mod error;
mod store;
mod strategy;

use serde_json::Value;
use tracing::debug;

use ludics_config::LudicsConfig;
use ludics_types::{
    Act, BehaviourId, DesignId, DialogueId, DisputeId, Move, Player, Sign, StrategyId,
};

pub use analysis::{
    BatchFailure, BatchReport, ComplexityClass, ComplexityReport, DesignAnalysis,
    DesignProperties, GameAnalysis, GameBehaviour, GameProperties, StrategyAnalysis,
    StrategyProperties,
    StrategySource, analyze_complexity, default_player,
};
pub use api::{
    AnalysisReport, AnalysisRequest, AnalysisResponse, ErrorResponse, Summary, SummaryRequest,
};
pub use behaviour::{Behaviour, DesignSet, Orthogonality};
pub use compiler::{
    DialogueCompilation, SkippedAct, compile, compile_value, participant_design_id,
};
pub use design::{Design, DesignRecord, InsertPolicy, RejectedAct, ValidationReport, validate};
pub use dispute::{Dispute, DisputePair, DisputeStatus};
pub use error::{EngineError, InsertError};
pub use store::{LudicsStore, StoreSnapshot};
pub use strategy::{
    InnocenceReport, InnocenceViolation, Play, PlayMove, PropagationViolation, Strategy, view,
};

pub struct Engine {
    config: LudicsConfig,
    store: LudicsStore,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(LudicsConfig::default())
    }
}

impl Engine {
    #[must_use]
    pub fn new(config: LudicsConfig) -> Self {
        Self::with_store(config, LudicsStore::new())
    }

    #[must_use]
    pub fn with_store(config: LudicsConfig, store: LudicsStore) -> Self {
        Self { config, store }
    }

    /// Load a snapshot, replaying its designs under the configured rules.
    #[must_use]
    pub fn from_snapshot(config: LudicsConfig, snapshot: StoreSnapshot) -> Self {
        let store = LudicsStore::from_snapshot(snapshot, insert_policy(&config));
        Self::with_store(config, store)
    }

    #[must_use]
    pub fn config(&self) -> &LudicsConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &LudicsStore {
        &self.store
    }

    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        self.store.snapshot()
    }

    #[must_use]
    pub fn insert_policy(&self) -> InsertPolicy {
        insert_policy(&self.config)
    }

    // ── Designs ──────────────────────────────────────────────

    pub fn compile_dialogue(
        &mut self,
        dialogue_id: &DialogueId,
        moves: &[Move],
    ) -> Result<DialogueCompilation, EngineError> {
        compiler::compile_dialogue(&mut self.store, dialogue_id, moves, &self.config.design)
    }

    pub fn add_design(&mut self, design: Design) -> Result<(), EngineError> {
        self.store.put_design(design)
    }

    pub fn insert_act(&mut self, design_id: &DesignId, act: Act) -> Result<(), EngineError> {
        let policy = self.insert_policy();
        self.store.insert_act(design_id, act, policy)
    }

    /// Re-validate a stored design's acts from scratch.
    pub fn validate_design(&self, design_id: &DesignId) -> Result<ValidationReport, EngineError> {
        let design = self.store.require_design(design_id)?;
        let acts: Vec<Act> = design
            .acts()
            .iter()
            .chain(design.rejected().iter().map(|r| &r.act))
            .cloned()
            .collect();
        Ok(validate(
            design.base(),
            design.sign(),
            &acts,
            self.insert_policy(),
        ))
    }

    // ── Disputes ─────────────────────────────────────────────

    /// Play `pos` against `neg`, store the dispute and freeze both designs.
    pub fn interact(&mut self, pos: &DesignId, neg: &DesignId) -> Result<Dispute, EngineError> {
        let p = self.store.require_design(pos)?;
        let n = self.store.require_design(neg)?;
        if p.sign() != Sign::Positive {
            return Err(EngineError::validation("posDesignId", "design is not positive"));
        }
        if n.sign() != Sign::Negative {
            return Err(EngineError::validation("negDesignId", "design is not negative"));
        }
        let dispute = dispute::run(p, n);
        self.store.freeze(pos);
        self.store.freeze(neg);
        self.store.put_dispute(dispute.clone());
        Ok(dispute)
    }

    // ── Strategies ───────────────────────────────────────────

    /// Build and store `player`'s strategy over `design_id` from the given
    /// disputes. An empty list means every stored dispute touching it.
    pub fn construct_strategy(
        &mut self,
        design_id: &DesignId,
        player: Player,
        dispute_ids: &[DisputeId],
    ) -> Result<Strategy, EngineError> {
        let disputes: Vec<&Dispute> = if dispute_ids.is_empty() {
            self.store.disputes_touching(design_id).collect()
        } else {
            dispute_ids
                .iter()
                .map(|id| self.store.require_dispute(id))
                .collect::<Result<_, _>>()?
        };
        let strategy = strategy::construct_strategy(&self.store, design_id, player, &disputes)?;
        self.store.put_strategy(strategy.clone());
        Ok(strategy)
    }

    pub fn check_innocence(&self, strategy_id: &StrategyId) -> Result<InnocenceReport, EngineError> {
        let strategy = self.store.require_strategy(strategy_id)?;
        Ok(strategy::check_innocence(&strategy.plays, strategy.player))
    }

    /// Replace a stored strategy with its innocent restriction.
    pub fn make_innocent(&mut self, strategy_id: &StrategyId) -> Result<Strategy, EngineError> {
        let fixed = strategy::make_innocent(self.store.require_strategy(strategy_id)?);
        self.store.put_strategy(fixed.clone());
        Ok(fixed)
    }

    // ── Behaviours ───────────────────────────────────────────

    pub fn orthogonal(&self, design_ids: &DesignSet) -> Result<DesignSet, EngineError> {
        Orthogonality::new(&self.store, &self.config.closure).orthogonal(design_ids)
    }

    pub fn closure(&self, design_ids: &DesignSet) -> Result<DesignSet, EngineError> {
        behaviour::check_closure_budget(&self.store, design_ids, &self.config.analysis)?;
        Orthogonality::new(&self.store, &self.config.closure).closure(design_ids)
    }

    pub fn is_closed(&self, design_ids: &DesignSet) -> Result<bool, EngineError> {
        Ok(&self.closure(design_ids)? == design_ids)
    }

    pub fn commit_behaviour(
        &mut self,
        id: Option<BehaviourId>,
        design_ids: DesignSet,
    ) -> Result<Behaviour, EngineError> {
        behaviour::commit_behaviour(&mut self.store, id, design_ids, &self.config)
    }

    // ── Analyses ─────────────────────────────────────────────

    pub fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport, EngineError> {
        api::analyze(&self.store, &self.config, request)
    }

    /// JSON in, JSON out. Never fails; errors become `{ok: false, ..}`.
    #[must_use]
    pub fn handle(&self, request: &Value) -> Value {
        api::handle(&self.store, &self.config, request)
    }

    pub fn summary(&self, request: &SummaryRequest) -> Result<Summary, EngineError> {
        api::summary(&self.store, request)
    }

    #[must_use]
    pub fn handle_summary(&self, request: &Value) -> Value {
        debug!("summary request");
        api::handle_summary(&self.store, request)
    }
}

fn insert_policy(config: &LudicsConfig) -> InsertPolicy {
    InsertPolicy {
        enforce_polarity: config.design.enforce_polarity,
    }
}
