//! Belief state over the opponent: long-lived behavioral statistics plus the
//! per-decision distribution over their unseen cards.

mod constraints;
mod sampler;

pub use constraints::{
    AppliedConstraint, CandidatePool, ConstraintInput, EnumerationCache, combinations,
    plausible_hands,
};
pub use sampler::{SampleCounts, StratifiedHands, stratify};

use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::seat::Seat;
use crate::model::state::GameState;
use crate::model::suit::Suit;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Exponential decay factor for every behavioral running estimate.
pub const MODEL_DECAY: f32 = 0.95;

/// Minimum observations before a decayed estimate starts moving.
pub const MIN_SAMPLES: u32 = 2;

/// Neutral prior for the opponent's envido calling threshold.
pub const DEFAULT_CALL_THRESHOLD: f32 = 27.0;

/// Calling-position context: the mano leads the round, the pie responds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(usize)]
pub enum CallContext {
    Mano = 0,
    Pie = 1,
}

impl CallContext {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Envido tendencies in one calling position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvidoBehavior {
    pub call_threshold: f32,
    pub fold_rate: f32,
    pub escalation_rate: f32,
    pub samples: u32,
}

impl Default for EnvidoBehavior {
    fn default() -> Self {
        Self {
            call_threshold: DEFAULT_CALL_THRESHOLD,
            fold_rate: 0.5,
            escalation_rate: 0.25,
            samples: 0,
        }
    }
}

/// Bluff attempts and how often they worked, split by role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BluffRecord {
    pub attempts: u32,
    pub successes: u32,
}

impl BluffRecord {
    pub fn success_rate(&self) -> f32 {
        if self.attempts == 0 {
            0.0
        } else {
            self.successes as f32 / self.attempts as f32
        }
    }
}

/// Card-play tendencies learned by replaying round histories.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayStyle {
    pub lead_with_highest_rate: f32,
    pub bait_rate: f32,
    pub counter_tendency: f32,
    pub chain_bluff_rate: f32,
    pub envido_primero_rate: f32,
    pub samples: u32,
}

impl Default for PlayStyle {
    fn default() -> Self {
        Self {
            lead_with_highest_rate: 0.7,
            bait_rate: 0.1,
            counter_tendency: 0.5,
            chain_bluff_rate: 0.1,
            envido_primero_rate: 0.3,
            samples: 0,
        }
    }
}

/// Persistent behavioral profile of the opponent.
///
/// Carried across rounds and games; the updater emits a fresh value after
/// every round rather than mutating this one. Only an explicit "new
/// opponent" boundary (outside this crate) resets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentModel {
    pub envido_behavior: [EnvidoBehavior; 2],
    pub truco_fold_rate: f32,
    pub truco_fold_samples: u32,
    pub truco_bluffs: [BluffRecord; 2],
    pub play_style: PlayStyle,
    /// Hand strengths observed when the opponent called truco early; feeds
    /// the behavioral inference constraint.
    pub truco_call_strengths: Vec<f32>,
}

impl Default for OpponentModel {
    fn default() -> Self {
        Self {
            envido_behavior: [EnvidoBehavior::default(); 2],
            truco_fold_rate: 0.5,
            truco_fold_samples: 0,
            truco_bluffs: [BluffRecord::default(); 2],
            play_style: PlayStyle::default(),
            truco_call_strengths: Vec::new(),
        }
    }
}

impl OpponentModel {
    /// Cap on the retained call-strength history.
    pub const CALL_HISTORY_LIMIT: usize = 24;

    pub fn envido(&self, context: CallContext) -> &EnvidoBehavior {
        &self.envido_behavior[context.index()]
    }

    pub fn bluffs(&self, context: CallContext) -> &BluffRecord {
        &self.truco_bluffs[context.index()]
    }

    /// Mean and standard deviation of observed call-time strengths, if at
    /// least two points exist.
    pub fn call_strength_stats(&self) -> Option<(f32, f32)> {
        let n = self.truco_call_strengths.len();
        if n < 2 {
            return None;
        }
        let mean = self.truco_call_strengths.iter().sum::<f32>() / n as f32;
        let variance = self
            .truco_call_strengths
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f32>()
            / n as f32;
        Some((mean, variance.sqrt()))
    }
}

/// Coarse per-decision distribution over the opponent's concealed cards,
/// derived from the surviving candidate pool. Recomputed from scratch on
/// each new piece of information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandProbabilities {
    pub suit_dist: BTreeMap<Suit, f32>,
    pub rank_probs: BTreeMap<Rank, f32>,
    pub unseen: Vec<Card>,
}

impl HandProbabilities {
    /// Builds normalized suit/rank distributions from candidate hands.
    pub fn from_candidates(candidates: &[Vec<Card>], unseen: Vec<Card>) -> Self {
        let mut suit_counts: BTreeMap<Suit, f32> = BTreeMap::new();
        let mut rank_counts: BTreeMap<Rank, f32> = BTreeMap::new();
        let mut total = 0.0f32;

        for hand in candidates {
            for card in hand {
                *suit_counts.entry(card.suit).or_default() += 1.0;
                *rank_counts.entry(card.rank).or_default() += 1.0;
                total += 1.0;
            }
        }

        if total > 0.0 {
            for value in suit_counts.values_mut() {
                *value /= total;
            }
            for value in rank_counts.values_mut() {
                *value /= total;
            }
        }

        Self {
            suit_dist: suit_counts,
            rank_probs: rank_counts,
            unseen,
        }
    }
}

/// Rebuilds the probability summary from the surviving candidate pool.
///
/// Hosts call this after every information event (a play, a declared
/// envido value) and store the result wholesale; the previous value is
/// discarded, never patched.
pub fn refresh_probabilities<R: Rng + ?Sized>(
    state: &GameState,
    perspective: Seat,
    cache: &mut EnumerationCache,
    rng: &mut R,
) -> HandProbabilities {
    let input = ConstraintInput {
        state,
        perspective,
        responding_to_truco: false,
    };
    let pool = plausible_hands(&input, cache, rng);
    HandProbabilities::from_candidates(&pool.hands, state.unseen_cards(perspective))
}
