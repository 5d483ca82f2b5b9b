//! Pure hand evaluators: hierarchy sums, envido/flor scoring, percentile
//! buckets, and the raw card-power heuristic the truco strength blend uses.
//!
//! Envido and flor are always scored against the *initial* three-card hand;
//! callers must not pass the shrinking in-round hand here.

use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::suit::Suit;

/// Sum of card hierarchies. The best possible three-card hand (the three top
/// bravas) scores 14 + 13 + 12 = 39.
pub fn hand_strength(hand: &Hand) -> u32 {
    hand.iter().map(|card| card.hierarchy() as u32).sum()
}

/// Envido score plus the cards that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvidoDetails {
    pub value: u8,
    pub cards: Vec<Card>,
}

pub fn envido_value(hand: &Hand) -> u8 {
    envido_details(hand).value
}

/// Best same-suit pair yields 20 plus both face values; without a pair the
/// highest single face value stands alone.
pub fn envido_details(hand: &Hand) -> EnvidoDetails {
    let mut best: Option<EnvidoDetails> = None;

    for suit in Suit::ALL {
        let mut in_suit: Vec<Card> = hand
            .iter()
            .copied()
            .filter(|card| card.suit == suit)
            .collect();
        if in_suit.len() < 2 {
            continue;
        }
        in_suit.sort_by(|a, b| b.envido_points().cmp(&a.envido_points()));
        let value = 20 + in_suit[0].envido_points() + in_suit[1].envido_points();
        let candidate = EnvidoDetails {
            value,
            cards: vec![in_suit[0], in_suit[1]],
        };
        if best.as_ref().is_none_or(|b| candidate.value > b.value) {
            best = Some(candidate);
        }
    }

    best.unwrap_or_else(|| {
        match hand
            .iter()
            .copied()
            .max_by_key(|card| card.envido_points())
        {
            Some(card) => EnvidoDetails {
                value: card.envido_points(),
                cards: vec![card],
            },
            None => EnvidoDetails {
                value: 0,
                cards: Vec::new(),
            },
        }
    })
}

pub fn has_flor(hand: &Hand) -> bool {
    if hand.len() != 3 {
        return false;
    }
    let first = hand.cards()[0].suit;
    hand.iter().all(|card| card.suit == first)
}

/// 0 unless all three cards share a suit, else 20 plus all face values.
pub fn flor_value(hand: &Hand) -> u8 {
    if !has_flor(hand) {
        return 0;
    }
    20 + hand.iter().map(|card| card.envido_points()).sum::<u8>()
}

/// Fixed strength breakpoints used by the early-truco percentile logic.
const PERCENTILE_BREAKPOINTS: [(u32, u8); 4] = [(20, 90), (16, 75), (11, 50), (7, 25)];

pub fn hand_percentile(hand: &Hand) -> u8 {
    let strength = hand_strength(hand);
    for (threshold, percentile) in PERCENTILE_BREAKPOINTS {
        if strength >= threshold {
            return percentile;
        }
    }
    10
}

/// Raw card-power heuristic in [0, 1], weighted heavily toward the bravas.
/// Blended at 20% with simulated win probability by the truco strategy.
pub fn raw_truco_power(hand: &Hand) -> f32 {
    const WEIGHTS: [f32; 15] = [
        0.0, // hierarchy 0 unused
        0.05, 0.08, 0.12, 0.18, 0.22, 0.27, 0.33, 0.40, 0.45, 0.55, 0.80, 0.85, 0.92, 1.00,
    ];
    // Best achievable three-card total: 1E + 1B + 7E.
    const MAX_POWER: f32 = 1.00 + 0.92 + 0.85;

    let total: f32 = hand
        .iter()
        .map(|card| WEIGHTS[card.hierarchy() as usize])
        .sum();
    (total / MAX_POWER).clamp(0.0, 1.0)
}
