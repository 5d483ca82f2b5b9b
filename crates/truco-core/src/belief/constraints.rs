//! Candidate-hand reconstruction under layered constraints.
//!
//! Constraint sources apply in a fixed priority order, each falling through
//! to the next when it would leave nothing: declared flor, declared envido
//! value, behavioral call-strength history, and finally unconstrained
//! enumeration of every completion from the unseen pool. A passive envido
//! filter then down-weights hands the opponent declined to bet on.

use crate::belief::{CallContext, OpponentModel};
use crate::eval;
use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::seat::Seat;
use crate::model::state::GameState;
use rand::Rng;
use std::collections::HashMap;

/// Largest pool `combinations` accepts; the full deck minus the AI's hand.
const MAX_POOL: usize = 40;

/// Minimum plausible strength for an early truco call when no history
/// exists: the 50th-percentile breakpoint.
const FALLBACK_CALL_STRENGTH: f32 = 11.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppliedConstraint {
    Flor,
    EnvidoValue(u8),
    Behavioral,
    Unconstrained,
}

/// Surviving completions of the opponent's concealed cards, each of size
/// `opponent hand length`, plus which constraint produced them.
#[derive(Debug, Clone)]
pub struct CandidatePool {
    pub hands: Vec<Vec<Card>>,
    pub constraint: AppliedConstraint,
}

impl CandidatePool {
    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConstraintInput<'a> {
    pub state: &'a GameState,
    pub perspective: Seat,
    /// Set when deciding a response to an early opponent truco call; enables
    /// the behavioral strength constraint.
    pub responding_to_truco: bool,
}

/// Request-scoped memo for repeated enumerations of the same pool within one
/// decision. Callers construct one per decision and drop it after; there is
/// deliberately no global cache.
#[derive(Debug, Default)]
pub struct EnumerationCache {
    entries: HashMap<(Vec<u8>, usize), Vec<Vec<Card>>>,
}

impl EnumerationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn combinations(&mut self, pool: &[Card], k: usize) -> Vec<Vec<Card>> {
        let key = (pool.iter().map(|c| c.id()).collect::<Vec<u8>>(), k);
        if let Some(hit) = self.entries.get(&key) {
            return hit.clone();
        }
        let result = combinations(pool, k);
        self.entries.insert(key, result.clone());
        result
    }
}

/// All k-card subsets of `pool`, in pool order.
pub fn combinations(pool: &[Card], k: usize) -> Vec<Vec<Card>> {
    assert!(pool.len() <= MAX_POOL, "combination pool too large");
    assert!(k <= 3, "truco hands never exceed three cards");

    let mut out = Vec::new();
    let mut scratch = Vec::with_capacity(k);
    recurse(pool, k, 0, &mut scratch, &mut out);
    out
}

fn recurse(
    pool: &[Card],
    k: usize,
    start: usize,
    scratch: &mut Vec<Card>,
    out: &mut Vec<Vec<Card>>,
) {
    if scratch.len() == k {
        out.push(scratch.clone());
        return;
    }
    let remaining = k - scratch.len();
    for index in start..pool.len() {
        if pool.len() - index < remaining {
            break;
        }
        scratch.push(pool[index]);
        recurse(pool, k, index + 1, scratch, out);
        scratch.pop();
    }
}

/// Reconstructs the plausible completions of the opponent's hand.
pub fn plausible_hands<R: Rng + ?Sized>(
    input: &ConstraintInput<'_>,
    cache: &mut EnumerationCache,
    rng: &mut R,
) -> CandidatePool {
    let state = input.state;
    let opponent = input.perspective.opponent();
    let need = state.hand(opponent).len();
    let pool = state.unseen_cards(input.perspective);
    let played = state.cards_played(opponent);

    let all = cache.combinations(&pool, need);

    let declared_envido = state.envido.declared[opponent.index()];
    let flor_known = state.flor.declared[opponent.index()];

    let mut selected: Option<CandidatePool> = None;

    if flor_known {
        let hands: Vec<Vec<Card>> = all
            .iter()
            .filter(|completion| {
                let full = full_hand(&played, completion);
                eval::has_flor(&full)
                    && declared_envido.is_none_or(|value| eval::envido_value(&full) == value)
            })
            .cloned()
            .collect();
        if !hands.is_empty() {
            selected = Some(CandidatePool {
                hands,
                constraint: AppliedConstraint::Flor,
            });
        }
    }

    if selected.is_none()
        && let Some(value) = declared_envido
    {
        let hands: Vec<Vec<Card>> = all
            .iter()
            .filter(|completion| eval::envido_value(&full_hand(&played, completion)) == value)
            .cloned()
            .collect();
        if !hands.is_empty() {
            selected = Some(CandidatePool {
                hands,
                constraint: AppliedConstraint::EnvidoValue(value),
            });
        }
    }

    if selected.is_none() && input.responding_to_truco {
        let model = &state.opponent_model;
        let hands: Vec<Vec<Card>> = match model.call_strength_stats() {
            Some((mean, stddev)) => {
                let low = mean - 1.5 * stddev;
                let high = mean + 1.5 * stddev;
                all.iter()
                    .filter(|completion| {
                        let strength =
                            eval::hand_strength(&full_hand(&played, completion)) as f32;
                        strength >= low && strength <= high
                    })
                    .cloned()
                    .collect()
            }
            None => all
                .iter()
                .filter(|completion| {
                    eval::hand_strength(&full_hand(&played, completion)) as f32
                        >= FALLBACK_CALL_STRENGTH
                })
                .cloned()
                .collect(),
        };
        if !hands.is_empty() {
            selected = Some(CandidatePool {
                hands,
                constraint: AppliedConstraint::Behavioral,
            });
        }
    }

    let mut pool_result = selected.unwrap_or(CandidatePool {
        hands: all,
        constraint: AppliedConstraint::Unconstrained,
    });

    if passive_envido_applies(state, opponent) {
        let context = if state.mano == opponent {
            CallContext::Mano
        } else {
            CallContext::Pie
        };
        pool_result.hands = passive_envido_filter(
            pool_result.hands,
            &played,
            &state.opponent_model,
            context,
            rng,
        );
    }

    pool_result
}

fn full_hand(played: &[Card], completion: &[Card]) -> Hand {
    let mut cards = played.to_vec();
    cards.extend_from_slice(completion);
    Hand::with_cards(cards)
}

/// The opponent showed a card during the envido window without calling.
fn passive_envido_applies(state: &GameState, opponent: Seat) -> bool {
    state.tricks[0].card(opponent).is_some()
        && state.envido.calls.is_empty()
        && !state.flor.any_declared()
}

/// Keeps hands below the learned calling threshold, retains near-threshold
/// hands at 30% and clearly-over-threshold hands at 10% (baits and threshold
/// drift happen). Skipped entirely when it would gut the pool.
fn passive_envido_filter<R: Rng + ?Sized>(
    hands: Vec<Vec<Card>>,
    played: &[Card],
    model: &OpponentModel,
    context: CallContext,
    rng: &mut R,
) -> Vec<Vec<Card>> {
    let threshold = model.envido(context).call_threshold;
    let floor = (hands.len() / 10).max(10);

    let filtered: Vec<Vec<Card>> = hands
        .iter()
        .filter(|completion| {
            let value = eval::envido_value(&full_hand(played, completion)) as f32;
            let keep = if value <= threshold {
                1.0
            } else if value <= threshold + 2.0 {
                0.3
            } else {
                0.1
            };
            rng.r#gen::<f32>() < keep
        })
        .cloned()
        .collect();

    if filtered.len() >= floor { filtered } else { hands }
}
