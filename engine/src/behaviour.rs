//! Orthogonality and bi-orthogonal closure over the designs of a store.
//!
//! Two designs are orthogonal when their dispute converges. The orthogonal
//! of a set is every design in the store orthogonal to all of its members.

use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use ludics_config::{AnalysisConfig, ClosureConfig, LudicsConfig};
use ludics_types::{BehaviourId, DesignId, Sign};

use crate::analysis::analyze_complexity;
use crate::digest::digest_id;
use crate::dispute;
use crate::error::EngineError;
use crate::store::LudicsStore;

pub type DesignSet = BTreeSet<DesignId>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Behaviour {
    pub id: BehaviourId,
    pub design_ids: DesignSet,
    #[serde(default)]
    pub is_closed: bool,
    #[serde(default)]
    pub closure_ids: DesignSet,
}

impl Behaviour {
    #[must_use]
    pub fn id_for(design_ids: &DesignSet) -> BehaviourId {
        let parts: Vec<&str> = design_ids.iter().map(DesignId::as_str).collect();
        BehaviourId::new(digest_id("bhv", &parts))
    }
}

/// One orthogonality computation: a deadline, a pair cache and the set of
/// designs it looked at.
pub struct Orthogonality<'s> {
    store: &'s LudicsStore,
    started: Instant,
    limit: Duration,
    cache: Option<HashMap<(DesignId, DesignId), bool>>,
    examined: DesignSet,
}

impl<'s> Orthogonality<'s> {
    #[must_use]
    pub fn new(store: &'s LudicsStore, config: &ClosureConfig) -> Self {
        Self {
            store,
            started: Instant::now(),
            limit: config.timeout(),
            cache: config.cache_pairs.then(HashMap::new),
            examined: DesignSet::new(),
        }
    }

    #[must_use]
    pub fn examined(&self) -> &DesignSet {
        &self.examined
    }

    fn check_deadline(&self) -> Result<(), EngineError> {
        if self.started.elapsed() >= self.limit {
            let limit_ms = u64::try_from(self.limit.as_millis()).unwrap_or(u64::MAX);
            warn!(limit_ms, examined = self.examined.len(), "closure deadline reached");
            return Err(EngineError::ClosureTimeout { limit_ms });
        }
        Ok(())
    }

    /// Symmetric. Designs of equal sign are never orthogonal.
    pub fn orthogonal_pair(&mut self, a: &DesignId, b: &DesignId) -> Result<bool, EngineError> {
        self.check_deadline()?;
        let key = if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        };
        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            return Ok(*hit);
        }

        let da = self.store.require_design(a)?;
        let db = self.store.require_design(b)?;
        self.examined.insert(a.clone());
        self.examined.insert(b.clone());

        let verdict = if da.sign() == db.sign() {
            false
        } else {
            let (pos, neg) = if da.sign() == Sign::Positive { (da, db) } else { (db, da) };
            dispute::run(pos, neg).is_convergent()
        };
        if let Some(cache) = self.cache.as_mut() {
            cache.insert(key, verdict);
        }
        Ok(verdict)
    }

    /// Every stored design orthogonal to all of `set`. The orthogonal of
    /// the empty set is the whole store.
    pub fn orthogonal(&mut self, set: &DesignSet) -> Result<DesignSet, EngineError> {
        for id in set {
            self.store.require_design(id)?;
        }
        let universe: Vec<DesignId> = self.store.designs().map(|d| d.id().clone()).collect();
        let mut out = DesignSet::new();
        for candidate in universe {
            let mut all = true;
            for member in set {
                if !self.orthogonal_pair(&candidate, member)? {
                    all = false;
                    break;
                }
            }
            if all {
                out.insert(candidate);
            }
        }
        Ok(out)
    }

    pub fn closure(&mut self, set: &DesignSet) -> Result<DesignSet, EngineError> {
        let orth = self.orthogonal(set)?;
        let closure = self.orthogonal(&orth)?;
        debug!(
            input = set.len(),
            orthogonal = orth.len(),
            closure = closure.len(),
            "closure computed"
        );
        Ok(closure)
    }

    pub fn is_closed(&mut self, set: &DesignSet) -> Result<bool, EngineError> {
        Ok(&self.closure(set)? == set)
    }
}

/// Refuse closures whose universe scores above `max_closure_score`.
pub fn check_closure_budget(
    store: &LudicsStore,
    set: &DesignSet,
    config: &AnalysisConfig,
) -> Result<(), EngineError> {
    let universe = store.designs().count() as u64;
    let report = analyze_complexity(
        store.designs().flat_map(|d| d.acts()),
        universe.saturating_mul(universe),
        set.len() as u64,
        config,
    );
    if report.score > config.max_closure_score {
        warn!(
            score = report.score,
            limit = config.max_closure_score,
            "closure refused"
        );
        return Err(EngineError::ComplexityExceeded {
            score: report.score,
            limit: config.max_closure_score,
        });
    }
    Ok(())
}

/// Compute the closure of `design_ids` and store the resulting behaviour.
///
/// Nothing is written unless the whole computation succeeds. On success
/// every examined design is frozen.
pub fn commit_behaviour(
    store: &mut LudicsStore,
    id: Option<BehaviourId>,
    design_ids: DesignSet,
    config: &LudicsConfig,
) -> Result<Behaviour, EngineError> {
    check_closure_budget(store, &design_ids, &config.analysis)?;
    let (closure, examined) = {
        let mut orth = Orthogonality::new(store, &config.closure);
        let closure = orth.closure(&design_ids)?;
        (closure, orth.examined)
    };

    let behaviour = Behaviour {
        id: id.unwrap_or_else(|| Behaviour::id_for(&design_ids)),
        is_closed: closure == design_ids,
        design_ids,
        closure_ids: closure,
    };
    for design_id in &examined {
        store.freeze(design_id);
    }
    store.put_behaviour(behaviour.clone());
    info!(
        behaviour_id = %behaviour.id,
        designs = behaviour.design_ids.len(),
        closure = behaviour.closure_ids.len(),
        is_closed = behaviour.is_closed,
        "behaviour committed"
    );
    Ok(behaviour)
}
