//! Cooperative batch hand analysis.
//!
//! Long sweeps over thousands of hands run in discrete chunks with a
//! progress callback and a cancellation flag checked between chunks, so an
//! interactive host never blocks on a half-applied state.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use truco_core::eval;
use truco_core::model::card::Card;
use truco_core::model::deck::Deck;
use truco_core::model::hand::Hand;

#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub hands: usize,
    pub mean_strength: f32,
    pub mean_envido: f32,
    pub flor_rate: f32,
    /// Hands per percentile bucket, keyed 90/75/50/25/10.
    pub percentile_counts: [(u8, usize); 5],
    pub cancelled: bool,
}

/// Deals `count` random three-card hands from fresh shuffles.
pub fn random_hands(count: usize, seed: u64) -> Vec<[Card; 3]> {
    let mut hands = Vec::with_capacity(count);
    for i in 0..count {
        let deck = Deck::shuffled_with_seed(seed.wrapping_add(i as u64));
        let cards = deck.cards();
        hands.push([cards[0], cards[1], cards[2]]);
    }
    hands
}

/// Sweeps `hands` in `chunk_size` steps. The summary covers every hand
/// processed before cancellation.
pub fn analyze_hands<F>(
    hands: &[[Card; 3]],
    chunk_size: usize,
    mut progress: F,
    cancel: &AtomicBool,
) -> AnalysisSummary
where
    F: FnMut(Progress),
{
    let chunk_size = chunk_size.max(1);
    let mut strength_total = 0u64;
    let mut envido_total = 0u64;
    let mut flores = 0usize;
    let mut buckets = [(90u8, 0usize), (75, 0), (50, 0), (25, 0), (10, 0)];
    let mut processed = 0usize;
    let mut cancelled = false;

    for chunk in hands.chunks(chunk_size) {
        if cancel.load(Ordering::Relaxed) {
            cancelled = true;
            break;
        }
        for cards in chunk {
            let hand = Hand::with_cards(cards.to_vec());
            strength_total += eval::hand_strength(&hand) as u64;
            envido_total += eval::envido_value(&hand) as u64;
            if eval::has_flor(&hand) {
                flores += 1;
            }
            let percentile = eval::hand_percentile(&hand);
            if let Some(bucket) = buckets.iter_mut().find(|(p, _)| *p == percentile) {
                bucket.1 += 1;
            }
        }
        processed += chunk.len();
        progress(Progress {
            processed,
            total: hands.len(),
        });
    }

    let denom = processed.max(1) as f32;
    AnalysisSummary {
        hands: processed,
        mean_strength: strength_total as f32 / denom,
        mean_envido: envido_total as f32 / denom,
        flor_rate: flores as f32 / denom,
        percentile_counts: buckets,
        cancelled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_fires_per_chunk_and_covers_all_hands() {
        let hands = random_hands(25, 7);
        let cancel = AtomicBool::new(false);
        let mut updates = Vec::new();
        let summary = analyze_hands(&hands, 10, |p| updates.push(p.processed), &cancel);

        assert_eq!(summary.hands, 25);
        assert!(!summary.cancelled);
        assert_eq!(updates, vec![10, 20, 25]);
        assert!(summary.mean_strength > 0.0);
        let bucketed: usize = summary.percentile_counts.iter().map(|(_, n)| n).sum();
        assert_eq!(bucketed, 25);
    }

    #[test]
    fn cancellation_stops_between_chunks() {
        let hands = random_hands(30, 11);
        let cancel = AtomicBool::new(false);
        let mut calls = 0;
        let summary = analyze_hands(
            &hands,
            10,
            |_| {
                calls += 1;
                if calls == 1 {
                    cancel.store(true, Ordering::Relaxed);
                }
            },
            &cancel,
        );
        assert!(summary.cancelled);
        assert_eq!(summary.hands, 10);
    }

    #[test]
    fn empty_input_yields_empty_summary() {
        let cancel = AtomicBool::new(false);
        let summary = analyze_hands(&[], 16, |_| {}, &cancel);
        assert_eq!(summary.hands, 0);
        assert_eq!(summary.flor_rate, 0.0);
    }
}
