//! Stratified sampling over the surviving candidate pool.

use crate::eval;
use crate::model::card::Card;
use crate::model::hand::Hand;
use rand::Rng;
use rand::seq::SliceRandom;

/// How many hands to draw per stratum. Callers size this to the decision:
/// single samples for quick checks, larger draws for full strength
/// estimation.
#[derive(Debug, Clone, Copy)]
pub struct SampleCounts {
    pub strong: usize,
    pub medium: usize,
    pub weak: usize,
}

impl Default for SampleCounts {
    fn default() -> Self {
        Self {
            strong: 1,
            medium: 1,
            weak: 1,
        }
    }
}

/// Sampled opponent hands bucketed by strength decile: `strong` from the
/// top decile, `medium` from deciles 4..=6, `weak` from the bottom two.
#[derive(Debug, Clone, Default)]
pub struct StratifiedHands {
    pub strong: Vec<Vec<Card>>,
    pub medium: Vec<Vec<Card>>,
    pub weak: Vec<Vec<Card>>,
}

impl StratifiedHands {
    /// Empty in all strata, meaning the candidate pool itself was empty.
    /// Callers treat this as "no information" and fall back to pure
    /// heuristics.
    pub fn is_empty(&self) -> bool {
        self.strong.is_empty() && self.medium.is_empty() && self.weak.is_empty()
    }

    pub fn iter_all(&self) -> impl Iterator<Item = &Vec<Card>> {
        self.strong
            .iter()
            .chain(self.medium.iter())
            .chain(self.weak.iter())
    }
}

pub fn stratify<R: Rng + ?Sized>(
    candidates: &[Vec<Card>],
    counts: SampleCounts,
    rng: &mut R,
) -> StratifiedHands {
    if candidates.is_empty() {
        return StratifiedHands::default();
    }

    let mut sorted: Vec<Vec<Card>> = candidates.to_vec();
    sorted.sort_by_key(|hand| eval::hand_strength(&Hand::with_cards(hand.clone())));

    let n = sorted.len();
    let decile = |d: usize| (n * d).div_ceil(10).min(n);

    let weak_slice = &sorted[..decile(2)];
    let medium_slice = &sorted[decile(3)..decile(6)];
    let strong_slice = &sorted[decile(9)..];

    StratifiedHands {
        strong: draw(strong_slice, counts.strong, rng, || sorted[n - 1].clone()),
        medium: draw(medium_slice, counts.medium, rng, || sorted[n / 2].clone()),
        weak: draw(weak_slice, counts.weak, rng, || sorted[0].clone()),
    }
}

/// Draws without replacement from `slice`; an empty stratum falls back to a
/// single representative so no stratum goes empty while candidates exist.
fn draw<R: Rng + ?Sized>(
    slice: &[Vec<Card>],
    count: usize,
    rng: &mut R,
    fallback: impl Fn() -> Vec<Card>,
) -> Vec<Vec<Card>> {
    if count == 0 {
        return Vec::new();
    }
    if slice.is_empty() {
        return vec![fallback()];
    }
    slice.choose_multiple(rng, count.min(slice.len())).cloned().collect()
}
