//! Property analyses over designs, strategies, games and batches.
//!
//! Analyses only read the store. Nothing here freezes a design or updates
//! a cached flag.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ludics_config::{AnalysisConfig, LudicsConfig};
use ludics_types::{Act, BehaviourId, DesignId, Player, Sign, StrategyId};

use crate::behaviour::{DesignSet, Orthogonality, check_closure_budget};
use crate::design::Design;
use crate::dispute::DisputeStatus;
use crate::error::EngineError;
use crate::strategy::{
    InnocenceViolation, PropagationViolation, Strategy, check_innocence, check_propagation,
    check_saturation, construct_strategy,
};
use crate::store::LudicsStore;

// ── Complexity ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityClass {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityReport {
    pub action_count: u64,
    pub max_depth: u64,
    pub branching_factor: u64,
    pub edge_count: u64,
    pub extra: u64,
    pub score: u64,
    pub class: ComplexityClass,
}

/// `score = actions × max(1, branching) + edges + extra`.
#[must_use]
pub fn analyze_complexity<'a>(
    actions: impl IntoIterator<Item = &'a Act>,
    edge_count: u64,
    extra: u64,
    config: &AnalysisConfig,
) -> ComplexityReport {
    let mut action_count = 0u64;
    let mut max_depth = 0u64;
    let mut branching_factor = 0u64;
    for act in actions {
        action_count += 1;
        if let Ok(locus) = act.locus() {
            max_depth = max_depth.max(locus.depth() as u64);
        }
        branching_factor = branching_factor.max(act.openings().len() as u64);
    }
    let score = action_count
        .saturating_mul(branching_factor.max(1))
        .saturating_add(edge_count)
        .saturating_add(extra);
    let class = if score <= config.low_complexity_max {
        ComplexityClass::Low
    } else if score <= config.medium_complexity_max {
        ComplexityClass::Medium
    } else {
        ComplexityClass::High
    };
    ComplexityReport {
        action_count,
        max_depth,
        branching_factor,
        edge_count,
        extra,
        score,
        class,
    }
}

fn design_complexity(design: &Design, config: &AnalysisConfig) -> ComplexityReport {
    let edges = design
        .located_acts()
        .filter(|(locus, _)| locus.depth_below(design.base()).is_some_and(|d| d > 0))
        .count() as u64;
    analyze_complexity(design.acts(), edges, 0, config)
}

// ── Design ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignProperties {
    pub legal: bool,
    pub linear: bool,
    pub justified: bool,
    pub polarity_consistent: bool,
    pub additive_respected: bool,
    pub normalized: bool,
    pub is_view: bool,
    pub in_behaviour: bool,
    pub low_complexity: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignAnalysis {
    pub design_id: DesignId,
    pub valid: bool,
    pub properties: DesignProperties,
    pub complexity: ComplexityReport,
    pub errors: Vec<String>,
}

/// Valid iff legal.
pub fn analyze_design(
    store: &LudicsStore,
    design_id: &DesignId,
    config: &AnalysisConfig,
) -> Result<DesignAnalysis, EngineError> {
    let design = store.require_design(design_id)?;
    let report = design.validation();
    let complexity = design_complexity(design, config);
    let in_behaviour = store
        .behaviours_containing(design_id)
        .any(|b| b.is_closed);
    let properties = DesignProperties {
        legal: report.legal,
        linear: report.linear,
        justified: report.justified,
        polarity_consistent: report.polarity_consistent,
        additive_respected: report.additive_respected,
        normalized: design.is_normalized(),
        is_view: design.is_view(),
        in_behaviour,
        low_complexity: complexity.class == ComplexityClass::Low,
    };
    Ok(DesignAnalysis {
        design_id: design_id.clone(),
        valid: properties.legal,
        properties,
        complexity,
        errors: report.errors,
    })
}

// ── Strategy ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyProperties {
    pub innocent: bool,
    pub propagation: bool,
    pub saturated: bool,
    pub non_empty: bool,
    pub forms_behaviour: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyAnalysis {
    pub strategy_id: StrategyId,
    pub design_id: DesignId,
    pub player: Player,
    pub valid: bool,
    pub play_count: usize,
    pub properties: StrategyProperties,
    pub innocence_violations: Vec<InnocenceViolation>,
    pub propagation_violations: Vec<PropagationViolation>,
}

/// Where a strategy analysis gets its strategy from.
pub enum StrategySource<'a> {
    Stored(&'a StrategyId),
    /// A stored strategy over the design if there is one, otherwise one
    /// built from the stored disputes touching it.
    Design(&'a DesignId),
}

/// The player a design plays for: its participant tag, else its sign.
#[must_use]
pub fn default_player(design: &Design) -> Player {
    design.participant().unwrap_or(match design.sign() {
        Sign::Positive => Player::Proponent,
        Sign::Negative => Player::Opponent,
    })
}

fn resolve_strategy(
    store: &LudicsStore,
    source: StrategySource<'_>,
) -> Result<Strategy, EngineError> {
    match source {
        StrategySource::Stored(id) => store.require_strategy(id).cloned(),
        StrategySource::Design(design_id) => {
            if let Some(stored) = store.strategies().find(|s| &s.design_id == design_id) {
                return Ok(stored.clone());
            }
            let design = store.require_design(design_id)?;
            let disputes: Vec<_> = store.disputes_touching(design_id).collect();
            construct_strategy(store, design_id, default_player(design), &disputes)
        }
    }
}

/// Valid iff innocent. Verdicts are recomputed from the plays.
pub fn analyze_strategy(
    store: &LudicsStore,
    source: StrategySource<'_>,
) -> Result<StrategyAnalysis, EngineError> {
    let strategy = resolve_strategy(store, source)?;
    let innocence = check_innocence(&strategy.plays, strategy.player);
    let propagation = check_propagation(&strategy.plays, strategy.player);
    let properties = StrategyProperties {
        innocent: innocence.is_innocent,
        propagation: propagation.is_empty(),
        saturated: check_saturation(&strategy.plays, strategy.player),
        non_empty: !strategy.plays.is_empty(),
        forms_behaviour: innocence.is_innocent && propagation.is_empty(),
    };
    Ok(StrategyAnalysis {
        strategy_id: strategy.id,
        design_id: strategy.design_id,
        player: strategy.player,
        valid: properties.innocent,
        play_count: strategy.plays.len(),
        properties,
        innocence_violations: innocence.violations,
        propagation_violations: propagation,
    })
}

// ── Game ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameBehaviour {
    /// `None` for the transient behaviour over the requested designs.
    pub id: Option<BehaviourId>,
    pub design_count: usize,
    pub is_closed: bool,
}

/// Verdicts over the disputes and strategies among a game's designs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameProperties {
    pub any_closed: bool,
    /// Every dispute between two of the game's designs converged or got
    /// stuck. A divergent or unfinished one leaves the game undetermined.
    pub determined: bool,
    /// Every such dispute reached a terminal status.
    pub finite: bool,
    /// Some stored strategy over one of the game's designs is innocent and
    /// has at least one play.
    pub has_winning_strategy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameAnalysis {
    pub valid: bool,
    pub behaviour_count: usize,
    pub design_count: usize,
    pub closed_count: usize,
    pub any_closed: bool,
    pub dispute_count: usize,
    pub properties: GameProperties,
    pub behaviours: Vec<GameBehaviour>,
}

/// A game over the stored behaviours containing any of `design_ids` plus a
/// transient behaviour over `design_ids` itself.
///
/// Stored behaviours report their cached verdict. The transient one is
/// computed and discarded.
pub fn analyze_game(
    store: &LudicsStore,
    design_ids: &DesignSet,
    config: &LudicsConfig,
) -> Result<GameAnalysis, EngineError> {
    for id in design_ids {
        store.require_design(id)?;
    }

    let mut behaviours = Vec::new();
    let mut designs = design_ids.clone();
    for stored in store
        .behaviours()
        .filter(|b| b.design_ids.iter().any(|d| design_ids.contains(d)))
    {
        designs.extend(stored.design_ids.iter().cloned());
        behaviours.push(GameBehaviour {
            id: Some(stored.id.clone()),
            design_count: stored.design_ids.len(),
            is_closed: stored.is_closed,
        });
    }

    check_closure_budget(store, design_ids, &config.analysis)?;
    let transient_closed = Orthogonality::new(store, &config.closure).is_closed(design_ids)?;
    behaviours.push(GameBehaviour {
        id: None,
        design_count: design_ids.len(),
        is_closed: transient_closed,
    });

    let closed_count = behaviours.iter().filter(|b| b.is_closed).count();
    let disputes: Vec<_> = store
        .disputes()
        .filter(|d| designs.contains(&d.pos_design_id) && designs.contains(&d.neg_design_id))
        .collect();
    let properties = GameProperties {
        any_closed: closed_count > 0,
        determined: disputes.iter().all(|d| {
            matches!(d.status, DisputeStatus::Convergent | DisputeStatus::Stuck)
        }),
        finite: disputes.iter().all(|d| d.status.is_terminal()),
        has_winning_strategy: store
            .strategies()
            .any(|s| designs.contains(&s.design_id) && s.is_innocent && !s.plays.is_empty()),
    };
    debug!(
        behaviours = behaviours.len(),
        designs = designs.len(),
        disputes = disputes.len(),
        closed_count,
        "game analysed"
    );
    Ok(GameAnalysis {
        valid: properties.any_closed,
        behaviour_count: behaviours.len(),
        design_count: designs.len(),
        closed_count,
        any_closed: properties.any_closed,
        dispute_count: disputes.len(),
        properties,
        behaviours,
    })
}

// ── Batch ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub design_id: String,
    pub status: u16,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub total: usize,
    pub valid_count: usize,
    pub results: Vec<DesignAnalysis>,
    pub failures: Vec<BatchFailure>,
}

/// Analyse each design independently. One missing or illegal design is a
/// failure entry, never an abort.
#[must_use]
pub fn analyze_batch(
    store: &LudicsStore,
    design_ids: &[String],
    config: &AnalysisConfig,
) -> BatchReport {
    let mut results = Vec::new();
    let mut failures = Vec::new();

    for raw in design_ids {
        let outcome = DesignId::parse(raw)
            .map_err(|err| EngineError::validation("designIds", err.to_string()))
            .and_then(|id| analyze_design(store, &id, config));
        match outcome {
            Ok(analysis) => {
                if !analysis.valid {
                    failures.push(BatchFailure {
                        design_id: raw.clone(),
                        status: 422,
                        error: analysis.errors.join("; "),
                    });
                }
                results.push(analysis);
            }
            Err(err) => {
                warn!(design_id = %raw, %err, "batch item failed");
                failures.push(BatchFailure {
                    design_id: raw.clone(),
                    status: err.status(),
                    error: err.to_string(),
                });
            }
        }
    }

    BatchReport {
        total: design_ids.len(),
        valid_count: results.iter().filter(|a| a.valid).count(),
        results,
        failures,
    }
}
