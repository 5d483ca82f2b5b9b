//! Post-round statistical learning.
//!
//! Each statistic is an exponentially decayed running estimate
//! (`new = 0.95·old + 0.05·observed`) that only starts moving once enough
//! observations exist; before that the neutral prior stands. The updater
//! never mutates the incoming model: it emits a fresh value for the host to
//! persist.

use crate::reason::{ReasonCode, StrategyCategory};
use rand::Rng;
use serde::{Deserialize, Serialize};
use truco_core::belief::{CallContext, MIN_SAMPLES, MODEL_DECAY, OpponentModel};
use truco_core::eval;
use truco_core::model::action::Action;
use truco_core::model::card::Card;
use truco_core::model::hand::Hand;
use truco_core::model::seat::Seat;

/// Strength above which leading the hand's lowest card reads as a bait.
const BAIT_STRENGTH_MIN: u32 = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvidoObservation {
    pub opponent_called: bool,
    pub opponent_declared: Option<u8>,
    /// The opponent declined an envido we offered.
    pub opponent_folded: bool,
    pub opponent_escalated: bool,
    /// We offered envido to them at all (fold/escalation context).
    pub offered_to_opponent: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrucoObservation {
    pub opponent_called: bool,
    pub opponent_folded: bool,
    /// We offered (or escalated) truco to them.
    pub offered_to_opponent: bool,
    /// Hand strength reconstructed at showdown, when they called.
    pub opponent_call_strength: Option<f32>,
    /// They called with a hand that lost the showdown badly.
    pub opponent_bluffed: Option<bool>,
    /// Their bluff worked: we folded.
    pub bluff_succeeded: bool,
}

/// One opponent card placed on the table, in play order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayObservation {
    pub trick: usize,
    pub opponent_led: bool,
    pub card: Card,
    /// Our led card when they were responding.
    pub responded_to: Option<Card>,
}

/// Everything observable about the opponent across one finished round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundRecord {
    pub opponent_was_mano: bool,
    pub envido: Option<EnvidoObservation>,
    pub truco: Option<TrucoObservation>,
    pub plays: Vec<PlayObservation>,
    /// Revealed at showdown; absent when the round ended on a fold.
    pub opponent_initial_hand: Option<Vec<Card>>,
    pub envido_primero: bool,
    pub winner: Seat,
}

fn blend(old: f32, observed: f32) -> f32 {
    old * MODEL_DECAY + (1.0 - MODEL_DECAY) * observed
}

fn rate(observed: bool) -> f32 {
    if observed { 1.0 } else { 0.0 }
}

/// Builds the successor model from one round's observations.
pub fn update_model(model: &OpponentModel, record: &RoundRecord) -> OpponentModel {
    let mut next = model.clone();
    let context = if record.opponent_was_mano {
        CallContext::Mano
    } else {
        CallContext::Pie
    };

    if let Some(envido) = &record.envido {
        let behavior = &mut next.envido_behavior[context.index()];
        behavior.samples += 1;
        if behavior.samples > MIN_SAMPLES {
            if envido.opponent_called
                && let Some(value) = envido.opponent_declared
            {
                behavior.call_threshold = blend(behavior.call_threshold, value as f32);
            }
            if envido.offered_to_opponent {
                behavior.fold_rate =
                    blend(behavior.fold_rate, rate(envido.opponent_folded));
                behavior.escalation_rate =
                    blend(behavior.escalation_rate, rate(envido.opponent_escalated));
            }
        }
    }

    if let Some(truco) = &record.truco {
        if truco.offered_to_opponent {
            next.truco_fold_samples += 1;
            if next.truco_fold_samples > MIN_SAMPLES {
                next.truco_fold_rate =
                    blend(next.truco_fold_rate, rate(truco.opponent_folded));
            }
        }
        if let Some(strength) = truco.opponent_call_strength {
            next.truco_call_strengths.push(strength);
            if next.truco_call_strengths.len() > OpponentModel::CALL_HISTORY_LIMIT {
                next.truco_call_strengths.remove(0);
            }
        }
        if truco.opponent_bluffed == Some(true) {
            let bluffs = &mut next.truco_bluffs[context.index()];
            bluffs.attempts += 1;
            if truco.bluff_succeeded {
                bluffs.successes += 1;
            }
        }
    }

    update_play_style(&mut next, record);
    next
}

/// Replays the stored per-trick order against the reconstructed hand and
/// applies simple rank tests to refresh the play-style rates.
fn update_play_style(model: &mut OpponentModel, record: &RoundRecord) {
    let Some(initial) = &record.opponent_initial_hand else {
        return;
    };
    if record.plays.is_empty() {
        return;
    }

    let style = &mut model.play_style;
    style.samples += 1;
    let learning = style.samples > MIN_SAMPLES;

    let full = Hand::with_cards(initial.clone());
    let initial_strength = eval::hand_strength(&full);
    let mut remaining: Vec<Card> = initial.clone();

    let mut lead_highest: Option<bool> = None;
    let mut baited = false;
    let mut countered: Option<bool> = None;

    for play in &record.plays {
        let highest = remaining
            .iter()
            .map(|c| c.hierarchy())
            .max()
            .unwrap_or(0);
        let lowest = remaining
            .iter()
            .map(|c| c.hierarchy())
            .min()
            .unwrap_or(0);

        if play.opponent_led {
            if play.trick == 0 {
                lead_highest = Some(play.card.hierarchy() == highest);
                if play.card.hierarchy() == lowest && initial_strength > BAIT_STRENGTH_MIN {
                    baited = true;
                }
            }
        } else if let Some(ours) = play.responded_to
            && countered.is_none()
        {
            countered = Some(play.card.hierarchy() > ours.hierarchy());
        }

        remaining.retain(|c| *c != play.card);
    }

    if learning {
        if let Some(observed) = lead_highest {
            style.lead_with_highest_rate =
                blend(style.lead_with_highest_rate, rate(observed));
        }
        style.bait_rate = blend(style.bait_rate, rate(baited));
        if let Some(observed) = countered {
            style.counter_tendency = blend(style.counter_tendency, rate(observed));
        }
        if let Some(envido) = &record.envido
            && envido.opponent_called
        {
            style.envido_primero_rate =
                blend(style.envido_primero_rate, rate(record.envido_primero));
        }
        let chained = record.envido.as_ref().is_some_and(|e| {
            e.opponent_called && e.opponent_declared.is_some_and(|v| v < 23)
        }) && record
            .truco
            .as_ref()
            .is_some_and(|t| t.opponent_bluffed == Some(true));
        style.chain_bluff_rate = blend(style.chain_bluff_rate, rate(chained));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseOutcome {
    Win,
    Loss,
}

/// Decision-outcome record for the lightweight case base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiCase {
    pub action: Action,
    pub reason: ReasonCode,
    pub category: StrategyCategory,
    pub pressure: f32,
    pub truco_level: u8,
    pub outcome: CaseOutcome,
}

/// Append-only case store with bounded growth: every deceptive play is
/// kept, everything else at a 10% sample.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaseBase {
    cases: Vec<AiCase>,
}

impl CaseBase {
    const SAMPLE_RATE: f32 = 0.1;

    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the case was retained.
    pub fn record<R: Rng + ?Sized>(&mut self, case: AiCase, rng: &mut R) -> bool {
        let keep = case.category == StrategyCategory::Deceptive
            || rng.r#gen::<f32>() < Self::SAMPLE_RATE;
        if keep {
            self.cases.push(case);
        }
        keep
    }

    pub fn cases(&self) -> &[AiCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}
