//! Truco call/response generation.
//!
//! The load-bearing scalar is [`truco_strength`]: 20% raw card power, 80%
//! simulated win probability against stratified samples of the opponent's
//! plausible holdings, clamped to [0, 1]. Everything here keys off it.

use crate::bot::BotContext;
use crate::reason::ReasonCode;
use crate::reasoning::ReasonFragment;
use crate::strategy::AiMove;
use rand::Rng;
use truco_core::belief::{ConstraintInput, EnumerationCache, SampleCounts, plausible_hands, stratify};
use truco_core::eval;
use truco_core::model::action::Action;
use truco_core::model::phase::GamePhase;
use truco_core::model::round::resolve_round;
use truco_core::model::trick::TrickWinner;
use truco_core::sim::{SimOptions, simulate_round_win};

/// Below this the round is treated as a certain loss.
const CERTAIN_LOSS: f32 = 0.05;
/// Equity margin required for a value call.
const VALUE_CALL_EDGE: f32 = 0.08;
/// Envido values this high leak suit information once declared.
const ENVIDO_LEAK_VALUE: u8 = 27;

#[derive(Debug, Clone, Copy)]
pub struct TrucoAssessment {
    pub strength: f32,
    /// False when the candidate pool was empty and only the raw heuristic
    /// backs the number.
    pub sampled: bool,
}

/// The blended truco strength of our current holding.
pub fn truco_strength<R: Rng + ?Sized>(
    ctx: &BotContext<'_>,
    cache: &mut EnumerationCache,
    rng: &mut R,
) -> TrucoAssessment {
    let raw = eval::raw_truco_power(ctx.my_hand());

    let input = ConstraintInput {
        state: ctx.state,
        perspective: ctx.seat,
        responding_to_truco: ctx.state.phase == GamePhase::TrucoPending,
    };
    let pool = plausible_hands(&input, cache, rng);
    if pool.is_empty() {
        return TrucoAssessment {
            strength: raw,
            sampled: false,
        };
    }

    let counts = SampleCounts {
        strong: ctx.params.samples_per_stratum,
        medium: ctx.params.samples_per_stratum,
        weak: ctx.params.samples_per_stratum,
    };
    let sample = stratify(&pool.hands, counts, rng);
    if sample.is_empty() {
        return TrucoAssessment {
            strength: raw,
            sampled: false,
        };
    }

    let my_cards = ctx.my_hand().cards();
    let start_trick = ctx
        .state
        .trick_winners
        .iter()
        .filter(|w| w.is_some())
        .count();
    let options = SimOptions {
        iterations: ctx.params.sim_iterations_per_sample,
        my_seat: ctx.seat,
        mano: ctx.state.mano,
        prior_winners: ctx.state.trick_winners,
        start_trick,
        i_lead: ctx.state.is_leading(ctx.seat),
        lead_with_highest_rate: ctx.model().play_style.lead_with_highest_rate,
    };

    let mut total = 0.0f32;
    let mut n = 0usize;
    for opponent in sample.iter_all() {
        total += simulate_round_win(my_cards, opponent, &options, rng);
        n += 1;
    }
    let simulated = total / n as f32;

    TrucoAssessment {
        strength: (0.2 * raw + 0.8 * simulated).clamp(0.0, 1.0),
        sampled: true,
    }
}

/// Win fraction over every plausible single-card holdout; only meaningful
/// once both sides are down to their last card.
fn last_card_certainty<R: Rng + ?Sized>(
    ctx: &BotContext<'_>,
    cache: &mut EnumerationCache,
    rng: &mut R,
) -> Option<f32> {
    if ctx.my_hand().len() != 1 || ctx.state.hand(ctx.seat.opponent()).len() != 1 {
        return None;
    }
    let mine = ctx.my_hand().get(0)?;

    let input = ConstraintInput {
        state: ctx.state,
        perspective: ctx.seat,
        responding_to_truco: ctx.state.phase == GamePhase::TrucoPending,
    };
    let pool = plausible_hands(&input, cache, rng);
    if pool.is_empty() {
        return None;
    }

    let trick = ctx.trick_index();
    let mut wins = 0usize;
    for holdout in &pool.hands {
        let theirs = holdout[0];
        let mut winners = ctx.state.trick_winners;
        winners[trick] = Some(match mine.hierarchy().cmp(&theirs.hierarchy()) {
            std::cmp::Ordering::Greater => TrickWinner::from_seat(ctx.seat),
            std::cmp::Ordering::Less => TrickWinner::from_seat(ctx.seat.opponent()),
            std::cmp::Ordering::Equal => TrickWinner::Tie,
        });
        if resolve_round(&winners, ctx.state.mano) == Some(ctx.seat) {
            wins += 1;
        }
    }
    Some(wins as f32 / pool.hands.len() as f32)
}

fn escalation_action(level: u8) -> Option<Action> {
    match level {
        1 => Some(Action::CallTruco),
        2 => Some(Action::CallRetruco),
        3 => Some(Action::CallValeCuatro),
        _ => None,
    }
}

fn strength_note(assessment: TrucoAssessment) -> ReasonFragment {
    ReasonFragment::template_with(
        "truco.strength",
        [
            ("value", format!("{:.3}", assessment.strength)),
            ("sampled", assessment.sampled.to_string()),
        ],
    )
}

/// Candidates for raising the stake during open play.
pub fn call_candidates<R: Rng + ?Sized>(
    ctx: &BotContext<'_>,
    cache: &mut EnumerationCache,
    rng: &mut R,
) -> Vec<AiMove> {
    if !ctx.state.truco.may_raise(ctx.seat) {
        return Vec::new();
    }
    let Some(action) = escalation_action(ctx.state.truco.level + 1) else {
        return Vec::new();
    };
    let mut out = Vec::new();

    // (i) Last-card certainty, slightly randomized to stay unexploitable.
    if let Some(certainty) = last_card_certainty(ctx, cache, rng)
        && certainty >= ctx.params.certainty_threshold
        && rng.r#gen::<f32>() < ctx.params.certainty_action_rate
    {
        out.push(AiMove::new(action, ReasonCode::TrucoCertainWin).with_note(
            ReasonFragment::template_with(
                "truco.certainty",
                [("value", format!("{certainty:.3}"))],
            ),
        ));
        return out;
    }

    // (ii) Elite opening hands escalate early most of the time.
    if ctx.trick_index() == 0
        && ctx.state.truco.level == 0
        && eval::hand_percentile(ctx.state.initial_hand(ctx.seat)) >= 90
        && rng.r#gen::<f32>() < ctx.params.elite_escalate_rate
    {
        out.push(AiMove::new(action, ReasonCode::TrucoEliteCall));
        return out;
    }

    let assessment = truco_strength(ctx, cache, rng);

    // (iii) Certain loss: fold territory, but a desperation bluff scaled by
    // the opponent's fold rate is sometimes better than limping to showdown.
    if assessment.strength < CERTAIN_LOSS {
        let bluff_chance = (ctx.model().truco_fold_rate * (0.5 + 0.3 * ctx.pressure))
            .clamp(0.0, ctx.params.bluff_cap);
        if rng.r#gen::<f32>() < bluff_chance {
            out.push(
                AiMove::new(action, ReasonCode::TrucoDesperateBluff)
                    .with_note(strength_note(assessment)),
            );
        }
        return out;
    }

    // (iv) General equity call with mixed-strategy randomization near the
    // indifference point.
    let equity = call_equity(ctx, assessment.strength);
    let flip_chance =
        ctx.params.mixed_strategy_peak * (1.0 - (equity.abs() / 0.3).min(1.0));
    let flip = rng.r#gen::<f32>() < flip_chance;

    if equity > VALUE_CALL_EDGE {
        if !flip {
            out.push(
                AiMove::new(action, ReasonCode::TrucoValueCall)
                    .with_note(strength_note(assessment)),
            );
        }
        // Flipping a clear call withholds it: no candidate emitted.
    } else if flip {
        out.push(
            AiMove::new(action, ReasonCode::TrucoMixedSignal)
                .with_note(strength_note(assessment)),
        );
    }
    out
}

fn call_equity(ctx: &BotContext<'_>, strength: f32) -> f32 {
    let declared = ctx.state.envido.declared[ctx.seat.index()];
    let envido_leak_penalty = if declared.is_some_and(|v| v >= ENVIDO_LEAK_VALUE) {
        0.05
    } else {
        0.0
    };
    let mut positional_bonus = 0.0;
    if ctx.state.trick_winners[0] == Some(TrickWinner::from_seat(ctx.seat)) {
        positional_bonus += 0.05;
    }
    if ctx.is_mano() {
        positional_bonus += 0.03;
    }
    let bluff_adjustment = (ctx.model().truco_fold_rate - 0.5) * 0.2;
    strength - 0.5 - envido_leak_penalty + positional_bonus + bluff_adjustment
}

/// Candidates for answering a pending truco offer.
pub fn response_candidates<R: Rng + ?Sized>(
    ctx: &BotContext<'_>,
    cache: &mut EnumerationCache,
    rng: &mut R,
) -> Vec<AiMove> {
    let pending = ctx.state.truco.pending.unwrap_or(1);
    let escalation = escalation_action(pending + 1);
    let mut out = Vec::new();

    // (i) Certainty first: with the last card guaranteed to win, escalate.
    if let Some(certainty) = last_card_certainty(ctx, cache, rng)
        && certainty >= ctx.params.certainty_threshold
    {
        if let Some(action) = escalation
            && rng.r#gen::<f32>() < ctx.params.certainty_action_rate
        {
            out.push(AiMove::new(action, ReasonCode::TrucoCertainWin));
        }
        out.push(AiMove::new(Action::Accept, ReasonCode::TrucoAccept));
        return out;
    }

    let assessment = truco_strength(ctx, cache, rng);

    // (iii) Certain loss: desperation bluff or fold.
    if assessment.strength < CERTAIN_LOSS {
        let bluff_chance = (ctx.model().truco_fold_rate * (0.4 + 0.4 * ctx.pressure))
            .clamp(0.0, ctx.params.bluff_cap);
        if let Some(action) = escalation
            && rng.r#gen::<f32>() < bluff_chance
        {
            out.push(
                AiMove::new(action, ReasonCode::TrucoDesperateBluff)
                    .with_note(strength_note(assessment)),
            );
        }
        out.push(
            AiMove::new(Action::Decline, ReasonCode::TrucoFoldCertainLoss)
                .with_note(strength_note(assessment)),
        );
        return out;
    }

    // (ii) Early-call percentile ladder.
    if ctx.trick_index() == 0 && pending == 1 {
        let percentile = eval::hand_percentile(ctx.state.initial_hand(ctx.seat));
        if percentile >= 90 {
            if let Some(action) = escalation
                && rng.r#gen::<f32>() < ctx.params.elite_escalate_rate
            {
                out.push(AiMove::new(action, ReasonCode::TrucoEliteCall));
            }
            out.push(AiMove::new(Action::Accept, ReasonCode::TrucoAccept));
            return out;
        }
        if percentile >= 50 {
            if let Some(action) = escalation
                && rng.r#gen::<f32>() < 0.15
            {
                out.push(AiMove::new(action, ReasonCode::TrucoValueCall));
            }
            out.push(AiMove::new(Action::Accept, ReasonCode::TrucoAccept));
            return out;
        }
        // Weak hand: mostly fold, occasionally accept or bluff-raise.
        if rng.r#gen::<f32>() < ctx.params.weak_fold_rate {
            out.push(AiMove::new(Action::Decline, ReasonCode::TrucoFoldWeak));
            return out;
        }
        if let Some(action) = escalation
            && rng.r#gen::<f32>() < 0.10
        {
            out.push(
                AiMove::new(action, ReasonCode::TrucoBluff).with_note(strength_note(assessment)),
            );
        }
        out.push(AiMove::new(Action::Accept, ReasonCode::TrucoAccept));
        return out;
    }

    // General response: let the evaluator weigh accept against fold on the
    // blended strength, with a mixed flip near indifference.
    let equity = assessment.strength - 0.5 + 0.1 * ctx.pressure;
    let flip_chance =
        ctx.params.mixed_strategy_peak * (1.0 - (equity.abs() / 0.3).min(1.0));
    if assessment.strength > 0.75
        && let Some(action) = escalation
    {
        out.push(
            AiMove::new(action, ReasonCode::TrucoValueCall).with_note(strength_note(assessment)),
        );
    } else if rng.r#gen::<f32>() < flip_chance
        && let Some(action) = escalation
    {
        out.push(
            AiMove::new(action, ReasonCode::TrucoMixedSignal).with_note(strength_note(assessment)),
        );
    }
    out.push(
        AiMove::new(Action::Accept, ReasonCode::TrucoAccept).with_note(strength_note(assessment)),
    );
    out.push(AiMove::new(Action::Decline, ReasonCode::TrucoFoldWeak));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::{Archetype, BotParams};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use truco_core::model::card::Card;
    use truco_core::model::rank::Rank;
    use truco_core::model::seat::Seat;
    use truco_core::model::state::GameState;
    use truco_core::model::suit::Suit;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    fn bravas_vs_unknown() -> GameState {
        GameState::from_hands(
            vec![
                card(Rank::Cuatro, Suit::Copas),
                card(Rank::Cinco, Suit::Oros),
                card(Rank::Sota, Suit::Bastos),
            ],
            vec![
                card(Rank::Uno, Suit::Espadas),
                card(Rank::Uno, Suit::Bastos),
                card(Rank::Siete, Suit::Espadas),
            ],
            Seat::Ai,
        )
    }

    fn junk_hand() -> GameState {
        GameState::from_hands(
            vec![
                card(Rank::Uno, Suit::Espadas),
                card(Rank::Uno, Suit::Bastos),
                card(Rank::Siete, Suit::Espadas),
            ],
            vec![
                card(Rank::Cuatro, Suit::Copas),
                card(Rank::Cinco, Suit::Oros),
                card(Rank::Cuatro, Suit::Oros),
            ],
            Seat::Ai,
        )
    }

    #[test]
    fn strength_is_high_for_bravas_low_for_junk() {
        let params = BotParams::default();
        let strong_state = bravas_vs_unknown();
        let ctx = BotContext::new(Seat::Ai, &strong_state, Archetype::Balanced, &params);
        let mut cache = EnumerationCache::new();
        let mut rng = SmallRng::seed_from_u64(51);
        let strong = truco_strength(&ctx, &mut cache, &mut rng);
        assert!(strong.sampled);
        assert!(strong.strength > 0.8, "bravas scored {}", strong.strength);

        let weak_state = junk_hand();
        let ctx = BotContext::new(Seat::Ai, &weak_state, Archetype::Balanced, &params);
        let mut cache = EnumerationCache::new();
        let weak = truco_strength(&ctx, &mut cache, &mut rng);
        assert!(weak.strength < 0.3, "junk scored {}", weak.strength);
    }

    #[test]
    fn elite_hand_calls_truco_early() {
        let params = BotParams::default();
        let state = bravas_vs_unknown();
        let ctx = BotContext::new(Seat::Ai, &state, Archetype::Balanced, &params);
        let mut fired = false;
        for seed in 0..32 {
            let mut cache = EnumerationCache::new();
            let mut rng = SmallRng::seed_from_u64(seed);
            let moves = call_candidates(&ctx, &mut cache, &mut rng);
            if moves
                .iter()
                .any(|m| m.reason == ReasonCode::TrucoEliteCall && m.action == Action::CallTruco)
            {
                fired = true;
                break;
            }
        }
        assert!(fired, "elite escalation never fired across 32 seeds");
    }

    #[test]
    fn weak_response_mostly_folds() {
        let params = BotParams::default();
        let mut state = junk_hand();
        state.current_turn = Seat::Player;
        let offered = truco_core::game::apply(&state, Action::CallTruco).expect("player calls");
        let ctx = BotContext::new(Seat::Ai, &offered, Archetype::Balanced, &params);

        let mut folds = 0;
        let trials = 64;
        for seed in 0..trials {
            let mut cache = EnumerationCache::new();
            let mut rng = SmallRng::seed_from_u64(seed);
            let moves = response_candidates(&ctx, &mut cache, &mut rng);
            assert!(!moves.is_empty());
            if moves
                .iter()
                .any(|m| matches!(m.reason, ReasonCode::TrucoFoldWeak | ReasonCode::TrucoFoldCertainLoss))
            {
                folds += 1;
            }
        }
        assert!(folds * 2 > trials, "folded only {folds}/{trials}");
    }

    #[test]
    fn certain_last_card_escalates() {
        let params = BotParams::default();
        let mut state = bravas_vs_unknown();
        // Reduce both sides to their final card: Ai keeps the macho.
        state.tricks[0].set_card(Seat::Ai, card(Rank::Uno, Suit::Bastos));
        state.tricks[0].set_card(Seat::Player, card(Rank::Cuatro, Suit::Copas));
        state.trick_winners[0] = Some(truco_core::model::trick::TrickWinner::Ai);
        state.tricks[1].set_card(Seat::Ai, card(Rank::Siete, Suit::Espadas));
        state.tricks[1].set_card(Seat::Player, card(Rank::Cinco, Suit::Oros));
        state.trick_winners[1] = Some(truco_core::model::trick::TrickWinner::Player);
        state.hands[Seat::Ai.index()] = truco_core::model::Hand::with_cards(vec![card(
            Rank::Uno,
            Suit::Espadas,
        )]);
        state.hands[Seat::Player.index()] =
            truco_core::model::Hand::with_cards(vec![card(Rank::Sota, Suit::Bastos)]);
        state.initial_hands[Seat::Ai.index()] = truco_core::model::Hand::with_cards(vec![
            card(Rank::Uno, Suit::Bastos),
            card(Rank::Siete, Suit::Espadas),
            card(Rank::Uno, Suit::Espadas),
        ]);
        state.initial_hands[Seat::Player.index()] = truco_core::model::Hand::with_cards(vec![
            card(Rank::Cuatro, Suit::Copas),
            card(Rank::Cinco, Suit::Oros),
            card(Rank::Sota, Suit::Bastos),
        ]);
        assert!(state.validate().is_ok());

        let ctx = BotContext::new(Seat::Ai, &state, Archetype::Balanced, &params);
        let mut cache = EnumerationCache::new();
        let mut rng = SmallRng::seed_from_u64(77);
        let certainty = last_card_certainty(&ctx, &mut cache, &mut rng).expect("last card");
        // The macho beats every unseen card outright.
        assert_eq!(certainty, 1.0);

        let mut fired = false;
        for seed in 0..32 {
            let mut cache = EnumerationCache::new();
            let mut rng = SmallRng::seed_from_u64(seed);
            let moves = call_candidates(&ctx, &mut cache, &mut rng);
            if moves.iter().any(|m| m.reason == ReasonCode::TrucoCertainWin) {
                fired = true;
                break;
            }
        }
        assert!(fired, "certainty call never fired across 32 seeds");
    }
}
