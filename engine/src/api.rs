//! JSON request surface for analyses and summaries.
//!
//! Every response carries `ok`. Failures are `{ok: false, error, status}`
//! with `status` from [`EngineError::status`].

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use ludics_config::LudicsConfig;
use ludics_types::{DesignId, DialogueId, IdError, StrategyId};

use crate::analysis::{
    BatchReport, DesignAnalysis, GameAnalysis, StrategyAnalysis, StrategySource, analyze_batch,
    analyze_design, analyze_game, analyze_strategy,
};
use crate::behaviour::DesignSet;
use crate::error::EngineError;
use crate::store::LudicsStore;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum AnalysisRequest {
    Design {
        design_id: Option<String>,
    },
    Strategy {
        strategy_id: Option<String>,
        design_id: Option<String>,
    },
    Game {
        design_id: Option<String>,
        design_ids: Option<Vec<String>>,
    },
    Batch {
        design_ids: Option<Vec<String>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnalysisReport {
    Design(DesignAnalysis),
    Strategy(StrategyAnalysis),
    Game(GameAnalysis),
    Batch(BatchReport),
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub report: AnalysisReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
    pub status: u16,
}

impl From<&EngineError> for ErrorResponse {
    fn from(err: &EngineError) -> Self {
        Self {
            ok: false,
            error: err.to_string(),
            status: err.status(),
        }
    }
}

fn required<T>(
    field: &str,
    raw: Option<&str>,
    parse: fn(&str) -> Result<T, IdError>,
) -> Result<T, EngineError> {
    let raw = raw.ok_or_else(|| EngineError::validation(field, "required"))?;
    parse(raw).map_err(|err| EngineError::validation(field, err.to_string()))
}

fn design_set(ids: &[String]) -> Result<DesignSet, EngineError> {
    ids.iter()
        .map(|raw| required("designIds", Some(raw.as_str()), DesignId::parse))
        .collect()
}

/// Run one analysis request against `store`.
pub fn analyze(
    store: &LudicsStore,
    config: &LudicsConfig,
    request: &AnalysisRequest,
) -> Result<AnalysisReport, EngineError> {
    debug!(?request, "analysis request");
    match request {
        AnalysisRequest::Design { design_id } => {
            let id = required("designId", design_id.as_deref(), DesignId::parse)?;
            analyze_design(store, &id, &config.analysis).map(AnalysisReport::Design)
        }
        AnalysisRequest::Strategy {
            strategy_id,
            design_id,
        } => {
            if let Some(raw) = strategy_id.as_deref() {
                let id = required("strategyId", Some(raw), StrategyId::parse)?;
                return analyze_strategy(store, StrategySource::Stored(&id))
                    .map(AnalysisReport::Strategy);
            }
            let id = required("strategyId or designId", design_id.as_deref(), DesignId::parse)?;
            analyze_strategy(store, StrategySource::Design(&id)).map(AnalysisReport::Strategy)
        }
        AnalysisRequest::Game {
            design_id,
            design_ids,
        } => {
            let mut ids = match design_ids {
                Some(list) => design_set(list)?,
                None => DesignSet::new(),
            };
            if let Some(raw) = design_id.as_deref() {
                ids.insert(required("designId", Some(raw), DesignId::parse)?);
            }
            if ids.is_empty() {
                return Err(EngineError::validation("designId or designIds", "required"));
            }
            analyze_game(store, &ids, config).map(AnalysisReport::Game)
        }
        AnalysisRequest::Batch { design_ids } => match design_ids.as_deref() {
            Some(list) if !list.is_empty() => Ok(AnalysisReport::Batch(analyze_batch(
                store,
                list,
                &config.analysis,
            ))),
            _ => Err(EngineError::validation("designIds", "required")),
        },
    }
}

/// Parse, run and render a raw JSON analysis request.
#[must_use]
pub fn handle(store: &LudicsStore, config: &LudicsConfig, raw: &Value) -> Value {
    let result = AnalysisRequest::deserialize(raw)
        .map_err(|err| EngineError::validation("request", err.to_string()))
        .and_then(|request| analyze(store, config, &request));
    match result {
        Ok(report) => render(&AnalysisResponse { ok: true, report }),
        Err(err) => render(&ErrorResponse::from(&err)),
    }
}

fn render<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value)
        .unwrap_or_else(|err| json!({"ok": false, "error": err.to_string(), "status": 500}))
}

// ── Summary ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub design_id: Option<String>,
    pub dialogue_id: Option<String>,
}

/// Counts read from cached fields only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub designs: usize,
    pub acts: usize,
    pub strategies: usize,
    pub innocent_strategies: usize,
    pub behaviours: usize,
    pub closed_behaviours: usize,
}

/// Summary for one design, or for every design of one dialogue.
pub fn summary(store: &LudicsStore, request: &SummaryRequest) -> Result<Summary, EngineError> {
    let designs: Vec<DesignId> = if let Some(raw) = request.design_id.as_deref() {
        let id = required("designId", Some(raw), DesignId::parse)?;
        store.require_design(&id)?;
        vec![id]
    } else if let Some(raw) = request.dialogue_id.as_deref() {
        let id = required("dialogueId", Some(raw), DialogueId::parse)?;
        let found: Vec<DesignId> = store
            .designs_in_dialogue(&id)
            .map(|d| d.id().clone())
            .collect();
        if found.is_empty() {
            return Err(EngineError::not_found("dialogue", id.as_str()));
        }
        found
    } else {
        return Err(EngineError::validation("designId or dialogueId", "required"));
    };

    let mut out = Summary {
        designs: designs.len(),
        ..Summary::default()
    };
    for id in &designs {
        out.acts += store.design(id).map_or(0, |d| d.len());
    }
    for strategy in store.strategies().filter(|s| designs.contains(&s.design_id)) {
        out.strategies += 1;
        out.innocent_strategies += usize::from(strategy.is_innocent);
    }
    for behaviour in store
        .behaviours()
        .filter(|b| designs.iter().any(|d| b.design_ids.contains(d)))
    {
        out.behaviours += 1;
        out.closed_behaviours += usize::from(behaviour.is_closed);
    }
    Ok(out)
}

#[derive(Debug, Clone, Serialize)]
struct SummaryResponse {
    ok: bool,
    #[serde(flatten)]
    summary: Summary,
}

#[must_use]
pub fn handle_summary(store: &LudicsStore, raw: &Value) -> Value {
    let result = SummaryRequest::deserialize(raw)
        .map_err(|err| EngineError::validation("request", err.to_string()))
        .and_then(|request| summary(store, &request));
    match result {
        Ok(summary) => render(&SummaryResponse { ok: true, summary }),
        Err(err) => render(&ErrorResponse::from(&err)),
    }
}
