//! Move → act compilation.
//!
//! `compile` is pure and never fails: a move with nothing to compile yields
//! no acts. `compile_dialogue` feeds a whole dialogue into a fresh pair of
//! designs and records whatever the design model refuses.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use ludics_config::DesignConfig;
use ludics_types::{
    Act, ActId, AttackRecord, DesignId, DialogueId, Locus, Move, MoveId, MovePayload, Player,
    Provenance, Sign,
};

use crate::design::{Design, InsertPolicy};
use crate::error::{EngineError, InsertError};
use crate::store::LudicsStore;

const ROOT_PATH: &str = "0";

/// Expand one move into its acts, in payload order.
#[must_use]
pub fn compile(mv: &Move) -> Vec<Act> {
    let Some(payload) = &mv.payload else {
        return Vec::new();
    };
    let Some(entries) = &payload.acts else {
        return Vec::new();
    };

    let provenance = Provenance {
        move_id: mv.id.clone(),
        target_type: mv.target_type.clone(),
        target_id: mv.target_id.clone(),
        actor_id: mv.actor_id.clone(),
    };
    let attack = attack_record(payload);

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            Act::new(
                ActId::for_move(&mv.id, i),
                entry.polarity.clone(),
                entry.locus_path.as_deref().unwrap_or(ROOT_PATH),
            )
            .with_openings(entry.openings.iter().copied())
            .with_expression(entry.expression.clone().unwrap_or_default())
            .additive(entry.additive)
            .with_provenance(provenance.clone())
            .with_attack(attack.clone())
        })
        .collect()
}

/// cqKey/cqText come from the payload itself, never from the metadata.
fn attack_record(payload: &MovePayload) -> Option<AttackRecord> {
    let attack = payload.aspic_attack.as_ref()?;
    let meta = payload.aspic_metadata.as_ref();
    Some(AttackRecord {
        attack_type: attack.attack_type,
        attacker_id: attack.attacker_id.clone(),
        defender_id: attack.defender_id.clone(),
        succeeded: attack.succeeded,
        target_scope: meta.and_then(|m| m.target_scope),
        cq_key: payload.cq_key.clone(),
        cq_text: payload.cq_text.clone(),
        reason: meta.and_then(|m| m.reason.clone()),
        scheme_key: meta.and_then(|m| m.scheme_key.clone()),
    })
}

/// Compile a raw JSON move. Anything that is not a readable move compiles
/// to no acts.
#[must_use]
pub fn compile_value(raw: &Value) -> Vec<Act> {
    match Move::deserialize(raw) {
        Ok(mv) => compile(&mv),
        Err(err) => {
            warn!(%err, "unreadable move compiled to no acts");
            Vec::new()
        }
    }
}

// ── Dialogues ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedAct {
    pub act_id: ActId,
    pub move_id: MoveId,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueCompilation {
    pub dialogue_id: DialogueId,
    pub proponent_design_id: DesignId,
    pub opponent_design_id: DesignId,
    /// Compiled acts that landed in their owning design.
    pub inserted: usize,
    /// Dual copies written to the other design.
    pub mirrored: usize,
    pub skipped: Vec<SkippedAct>,
}

#[must_use]
pub fn participant_design_id(dialogue_id: &DialogueId, player: Player) -> DesignId {
    DesignId::new(format!("{dialogue_id}:{player}"))
}

/// Which design owns `act`: the one whose expected sign at the act's depth
/// matches the act's polarity. Acts outside the base go to the Proponent,
/// which rejects them.
fn owner(act: &Act, base: &Locus) -> Result<Player, InsertError> {
    let Some(found) = act.polarity().sign() else {
        return Err(InsertError::UnknownPolarity {
            polarity: act.polarity().to_string(),
        });
    };
    let depth = act
        .locus()
        .ok()
        .and_then(|locus| locus.depth_below(base))
        .unwrap_or(0);
    Ok(if Sign::Positive.at_depth(depth) == found {
        Player::Proponent
    } else {
        Player::Opponent
    })
}

/// Insert `act` into `own` and its dual into `other`, or neither.
fn insert_mirrored(
    own: &mut Design,
    other: &mut Design,
    act: Act,
    policy: InsertPolicy,
) -> Result<bool, InsertError> {
    own.check_insert(&act, policy)?;
    let dual = act.dual(act.id().dual());
    if let Some(dual) = &dual {
        other.check_insert(dual, policy)?;
    }
    own.insert(act, policy)?;
    let mirrored = match dual {
        Some(dual) => {
            other.insert(dual, policy)?;
            true
        }
        None => false,
    };
    Ok(mirrored)
}

/// Compile `moves` into the dialogue's Proponent and Opponent designs.
///
/// Each act goes to the design that owns its depth: a positive act at an
/// even depth (or a negative one at an odd depth) is the Proponent's, the
/// rest are the Opponent's. The other design receives the dual act, so
/// both sides hold the same tree with opposite polarities and a chain such
/// as ASSERT, WHY, GROUNDS stays justified on both. Daimons are not
/// mirrored. Both designs are rebuilt from scratch and replace any earlier
/// unfrozen compilation of the same dialogue.
pub fn compile_dialogue(
    store: &mut LudicsStore,
    dialogue_id: &DialogueId,
    moves: &[Move],
    config: &DesignConfig,
) -> Result<DialogueCompilation, EngineError> {
    let base = Locus::parse(&config.root_locus)
        .map_err(|err| EngineError::validation("design.root_locus", err.to_string()))?;
    let policy = InsertPolicy {
        enforce_polarity: config.enforce_polarity,
    };

    let p_id = participant_design_id(dialogue_id, Player::Proponent);
    let o_id = participant_design_id(dialogue_id, Player::Opponent);
    for id in [&p_id, &o_id] {
        if store.design(id).is_some_and(Design::is_frozen) {
            return Err(InsertError::ConcurrentModification {
                design_id: id.clone(),
            }
            .into());
        }
    }

    let mut proponent = Design::new(p_id.clone(), base.clone(), Sign::Positive)
        .with_dialogue(dialogue_id.clone())
        .with_participant(Player::Proponent);
    let mut opponent = Design::new(o_id.clone(), base.clone(), Sign::Negative)
        .with_dialogue(dialogue_id.clone())
        .with_participant(Player::Opponent);

    let mut inserted = 0;
    let mut mirrored = 0;
    let mut skipped = Vec::new();
    for mv in moves {
        for act in compile(mv) {
            let act_id = act.id().clone();
            let result = owner(&act, &base).and_then(|side| match side {
                Player::Proponent => insert_mirrored(&mut proponent, &mut opponent, act, policy),
                Player::Opponent => insert_mirrored(&mut opponent, &mut proponent, act, policy),
            });
            match result {
                Ok(dual) => {
                    inserted += 1;
                    mirrored += usize::from(dual);
                }
                Err(err) => {
                    warn!(dialogue_id = %dialogue_id, act_id = %act_id, %err, "skipping act");
                    skipped.push(SkippedAct {
                        act_id,
                        move_id: mv.id.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }
    }

    store.put_design(proponent)?;
    store.put_design(opponent)?;
    info!(
        dialogue_id = %dialogue_id,
        moves = moves.len(),
        inserted,
        mirrored,
        skipped = skipped.len(),
        "dialogue compiled"
    );

    Ok(DialogueCompilation {
        dialogue_id: dialogue_id.clone(),
        proponent_design_id: p_id,
        opponent_design_id: o_id,
        inserted,
        mirrored,
        skipped,
    })
}
