//! Strategies reconstructed from disputes, and the innocence checks.
//!
//! A play is the sequence of positive moves of one dispute, each tagged
//! with the player who made it. A player's view of a play prefix follows
//! Hyland-Ong: the player's own moves are kept, and an opponent move jumps
//! back to the move that justified it. A move at `ξ.i` is justified by the
//! latest earlier move at `ξ` whose openings contain `i`.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use ludics_types::{ActId, DesignId, Locus, Player, Polarity, StrategyId};

use crate::digest::digest_id;
use crate::dispute::Dispute;
use crate::error::EngineError;
use crate::store::LudicsStore;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayMove {
    pub player: Player,
    pub act_id: ActId,
    #[serde(rename = "locusPath")]
    pub locus: Locus,
    pub polarity: Polarity,
    #[serde(default)]
    pub openings: BTreeSet<u32>,
}

/// What two moves must share to count as the same move.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MoveKey {
    player: Player,
    locus: Locus,
    openings: BTreeSet<u32>,
    polarity: Polarity,
}

impl PlayMove {
    fn key(&self) -> MoveKey {
        MoveKey {
            player: self.player,
            locus: self.locus.clone(),
            openings: self.openings.clone(),
            polarity: self.polarity.clone(),
        }
    }

    fn same_move(&self, other: &PlayMove) -> bool {
        self.locus == other.locus
            && self.openings == other.openings
            && self.polarity == other.polarity
    }
}

pub type Play = Vec<PlayMove>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub id: StrategyId,
    pub design_id: DesignId,
    pub player: Player,
    #[serde(default)]
    pub plays: Vec<Play>,
    #[serde(default)]
    pub is_innocent: bool,
    #[serde(default)]
    pub play_count: usize,
    #[serde(default)]
    pub satisfies_propagation: bool,
}

impl Strategy {
    #[must_use]
    pub fn id_for(design_id: &DesignId, player: Player) -> StrategyId {
        StrategyId::new(digest_id("str", &[design_id.as_str(), player.as_str()]))
    }

    fn from_plays(id: StrategyId, design_id: DesignId, player: Player, plays: Vec<Play>) -> Self {
        let is_innocent = check_innocence(&plays, player).is_innocent;
        let satisfies_propagation = check_propagation(&plays, player).is_empty();
        Self {
            id,
            design_id,
            player,
            play_count: plays.len(),
            plays,
            is_innocent,
            satisfies_propagation,
        }
    }
}

// ── Plays ────────────────────────────────────────────────────

/// The play of one dispute.
///
/// Each pair contributes its positive act. The mover is whichever design
/// holds that act at the pair's locus; when both do, steps alternate
/// starting with the positive design.
pub fn play_of(store: &LudicsStore, dispute: &Dispute) -> Result<Play, EngineError> {
    let pos = store.require_design(&dispute.pos_design_id)?;
    let neg = store.require_design(&dispute.neg_design_id)?;

    let mut play = Vec::with_capacity(dispute.pairs.len());
    for (k, pair) in dispute.pairs.iter().enumerate() {
        let locus = Locus::parse(&pair.locus_path)
            .map_err(|err| EngineError::validation("pairs.locusPath", err.to_string()))?;
        let in_pos = pos.act_at(&locus).filter(|a| a.id() == &pair.pos_act_id);
        let in_neg = neg.act_at(&locus).filter(|a| a.id() == &pair.pos_act_id);
        let (player, act) = match (in_pos, in_neg) {
            (Some(a), None) => (Player::Proponent, a),
            (None, Some(a)) => (Player::Opponent, a),
            (Some(a), Some(_)) if k % 2 == 0 => (Player::Proponent, a),
            (Some(_), Some(a)) => (Player::Opponent, a),
            (None, None) => {
                return Err(EngineError::validation(
                    "pairs.posActId",
                    format!("act {} not found at {locus}", pair.pos_act_id),
                ));
            }
        };
        play.push(PlayMove {
            player,
            act_id: act.id().clone(),
            locus,
            polarity: act.polarity().clone(),
            openings: act.openings().clone(),
        });
    }
    Ok(play)
}

/// Drop duplicates and plays that are strict prefixes of another play.
#[must_use]
pub fn maximal_plays(plays: Vec<Play>) -> Vec<Play> {
    let mut unique: Vec<Play> = Vec::with_capacity(plays.len());
    for play in plays {
        if !unique.contains(&play) {
            unique.push(play);
        }
    }
    let keep: Vec<bool> = unique
        .iter()
        .map(|p| {
            !unique
                .iter()
                .any(|q| q.len() > p.len() && q[..p.len()] == p[..])
        })
        .collect();
    unique
        .into_iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(p))
        .collect()
}

/// Build `player`'s strategy over `design_id` from the disputes that touch it.
pub fn construct_strategy(
    store: &LudicsStore,
    design_id: &DesignId,
    player: Player,
    disputes: &[&Dispute],
) -> Result<Strategy, EngineError> {
    store.require_design(design_id)?;
    let mut plays = Vec::new();
    for dispute in disputes.iter().filter(|d| d.touches(design_id)) {
        plays.push(play_of(store, dispute)?);
    }
    let plays = maximal_plays(plays);
    let strategy = Strategy::from_plays(
        Strategy::id_for(design_id, player),
        design_id.clone(),
        player,
        plays,
    );
    debug!(
        strategy_id = %strategy.id,
        design_id = %design_id,
        plays = strategy.play_count,
        innocent = strategy.is_innocent,
        "strategy constructed"
    );
    Ok(strategy)
}

// ── Views ────────────────────────────────────────────────────

fn justifiers(play: &[PlayMove]) -> Vec<Option<usize>> {
    play.iter()
        .enumerate()
        .map(|(k, m)| {
            let parent = m.locus.parent()?;
            let label = m.locus.last();
            (0..k)
                .rev()
                .find(|&j| play[j].locus == parent && play[j].openings.contains(&label))
        })
        .collect()
}

/// Indices of the moves in `player`'s view of `play[..end]`.
fn view_indices(
    play: &[PlayMove],
    just: &[Option<usize>],
    end: usize,
    player: Player,
) -> Vec<usize> {
    let mut out = Vec::new();
    let mut cursor = end;
    while cursor > 0 {
        let i = cursor - 1;
        out.push(i);
        if play[i].player == player {
            cursor = i;
        } else if let Some(j) = just[i] {
            cursor = j + 1;
        } else {
            break;
        }
    }
    out.reverse();
    out
}

/// `player`'s view of the whole of `play`.
#[must_use]
pub fn view(play: &[PlayMove], player: Player) -> Vec<PlayMove> {
    let just = justifiers(play);
    view_indices(play, &just, play.len(), player)
        .into_iter()
        .map(|i| play[i].clone())
        .collect()
}

/// Each of `player`'s moves in `play` paired with the view it answered.
fn responses(play: &[PlayMove], player: Player) -> Vec<(Vec<MoveKey>, usize)> {
    let just = justifiers(play);
    play.iter()
        .enumerate()
        .filter(|(_, m)| m.player == player)
        .map(|(k, _)| {
            let view = view_indices(play, &just, k, player)
                .into_iter()
                .map(|i| play[i].key())
                .collect();
            (view, k)
        })
        .collect()
}

// ── Innocence ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InnocenceViolation {
    pub play_a: usize,
    pub play_b: usize,
    /// Loci of the shared view.
    pub view: Vec<String>,
    pub response_a: PlayMove,
    pub response_b: PlayMove,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InnocenceReport {
    pub is_innocent: bool,
    pub violations: Vec<InnocenceViolation>,
}

/// Every place where one view of `player` leads to two different moves.
#[must_use]
pub fn check_innocence(plays: &[Play], player: Player) -> InnocenceReport {
    let mut first: HashMap<Vec<MoveKey>, (usize, usize)> = HashMap::new();
    let mut violations = Vec::new();

    for (pi, play) in plays.iter().enumerate() {
        for (view, k) in responses(play, player) {
            match first.entry(view) {
                Entry::Vacant(slot) => {
                    slot.insert((pi, k));
                }
                Entry::Occupied(seen) => {
                    let (qa, qk) = *seen.get();
                    let earlier = &plays[qa][qk];
                    if !earlier.same_move(&play[k]) {
                        violations.push(InnocenceViolation {
                            play_a: qa,
                            play_b: pi,
                            view: seen.key().iter().map(|m| m.locus.to_string()).collect(),
                            response_a: earlier.clone(),
                            response_b: play[k].clone(),
                        });
                    }
                }
            }
        }
    }

    InnocenceReport {
        is_innocent: violations.is_empty(),
        violations,
    }
}

// ── Propagation ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropagationViolation {
    pub play_a: usize,
    pub play_b: usize,
    pub prefix_len: usize,
    pub locus_path: String,
}

/// Plays that share a prefix and then branch on distinct opponent moves
/// must continue on distinct loci: no locus the player moves on after the
/// branch point in one play may come back in the other. A violation names
/// the first reused locus.
#[must_use]
pub fn check_propagation(plays: &[Play], player: Player) -> Vec<PropagationViolation> {
    let mut violations = Vec::new();
    for a in 0..plays.len() {
        for b in a + 1..plays.len() {
            let (pa, pb) = (&plays[a], &plays[b]);
            let shared = pa
                .iter()
                .zip(pb)
                .take_while(|(x, y)| x.key() == y.key())
                .count();
            let (Some(ma), Some(mb)) = (pa.get(shared), pb.get(shared)) else {
                continue;
            };
            if ma.player == player || mb.player == player {
                continue;
            }
            let continued_a: Vec<&Locus> = pa[shared + 1..]
                .iter()
                .filter(|m| m.player == player)
                .map(|m| &m.locus)
                .collect();
            let reused = pb[shared + 1..]
                .iter()
                .filter(|m| m.player == player)
                .map(|m| &m.locus)
                .find(|locus| continued_a.contains(locus));
            if let Some(locus) = reused {
                violations.push(PropagationViolation {
                    play_a: a,
                    play_b: b,
                    prefix_len: shared,
                    locus_path: locus.to_string(),
                });
            }
        }
    }
    violations
}

// ── Saturation ───────────────────────────────────────────────

/// Whether the strategy contains its own views: for every move of
/// `player`, the view that ends with that move is a prefix of some play.
#[must_use]
pub fn check_saturation(plays: &[Play], player: Player) -> bool {
    plays.iter().all(|play| {
        let just = justifiers(play);
        play.iter()
            .enumerate()
            .filter(|(_, m)| m.player == player)
            .all(|(k, _)| {
                let view: Vec<MoveKey> = view_indices(play, &just, k + 1, player)
                    .into_iter()
                    .map(|i| play[i].key())
                    .collect();
                plays.iter().any(|q| {
                    q.len() >= view.len() && q.iter().zip(&view).all(|(m, key)| &m.key() == key)
                })
            })
    })
}

/// Keep, in order, the plays that agree with the first response seen for
/// every view.
#[must_use]
pub fn make_innocent(strategy: &Strategy) -> Strategy {
    let mut chosen: HashMap<Vec<MoveKey>, MoveKey> = HashMap::new();
    let mut kept = Vec::new();

    for play in &strategy.plays {
        let mut local: HashMap<Vec<MoveKey>, MoveKey> = HashMap::new();
        let consistent = responses(play, strategy.player).into_iter().all(|(view, k)| {
            let answer = play[k].key();
            let prior = chosen.get(&view).or_else(|| local.get(&view));
            match prior {
                Some(prev) => {
                    prev.locus == answer.locus
                        && prev.openings == answer.openings
                        && prev.polarity == answer.polarity
                }
                None => {
                    local.insert(view, answer);
                    true
                }
            }
        });
        if consistent {
            chosen.extend(local);
            kept.push(play.clone());
        }
    }

    debug!(
        strategy_id = %strategy.id,
        before = strategy.plays.len(),
        after = kept.len(),
        "strategy made innocent"
    );
    Strategy::from_plays(
        strategy.id.clone(),
        strategy.design_id.clone(),
        strategy.player,
        kept,
    )
}
