//! Envido call and response generation.
//!
//! Decisions compare our (mano-adjusted) value against an opponent estimate
//! derived from the learned calling threshold, with every threshold loosened
//! under pressure and weak-hand bluffs scaled by the opponent's fold rate.

use crate::bot::BotContext;
use crate::reason::ReasonCode;
use crate::reasoning::ReasonFragment;
use crate::strategy::AiMove;
use rand::Rng;
use truco_core::model::action::Action;

/// Population-average envido value, the estimate absent any evidence.
const NEUTRAL_ESTIMATE: f32 = 23.0;
/// Values below this are bluff territory.
const WEAK_VALUE: u8 = 21;

/// Our envido value with the mano tie-break advantage folded in.
pub fn adjusted_value(ctx: &BotContext<'_>) -> f32 {
    let bonus = if ctx.is_mano() { 0.5 } else { 0.0 };
    ctx.envido_value() as f32 + bonus
}

/// Model-derived estimate of the opponent's envido value.
///
/// A caller has shown they cleared their own threshold; a passive opponent
/// who let the window slide is estimated below it.
pub fn opponent_estimate(ctx: &BotContext<'_>, responding_to_call: bool) -> f32 {
    let behavior = ctx.model().envido(ctx.opponent_context());
    if responding_to_call {
        behavior.call_threshold + 1.0
    } else if ctx.state.tricks[0].card(ctx.seat.opponent()).is_some() {
        (behavior.call_threshold - 3.0).min(NEUTRAL_ESTIMATE)
    } else {
        NEUTRAL_ESTIMATE
    }
}

fn value_note(ctx: &BotContext<'_>, estimate: f32) -> ReasonFragment {
    ReasonFragment::template_with(
        "envido.comparison",
        [
            ("own", format!("{:.1}", adjusted_value(ctx))),
            ("estimate", format!("{estimate:.1}")),
        ],
    )
}

/// Candidates for opening (or escalating into) the envido ladder during
/// open play, including the envido-primero window over a fresh truco offer.
pub fn call_candidates<R: Rng + ?Sized>(ctx: &BotContext<'_>, rng: &mut R) -> Vec<AiMove> {
    if !ctx.state.envido_window_open() || !ctx.state.envido.calls.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    let my = adjusted_value(ctx);
    let estimate = opponent_estimate(ctx, false);
    // Desperation loosens the calling threshold, comfort tightens it.
    let call_threshold = 27.0 - 2.0 * ctx.pressure;

    if my >= call_threshold {
        out.push(
            AiMove::new(Action::CallEnvido, ReasonCode::EnvidoValueCall)
                .with_note(value_note(ctx, estimate)),
        );
    }
    if my >= 30.0 {
        out.push(
            AiMove::new(Action::CallRealEnvido, ReasonCode::EnvidoEscalate)
                .with_note(value_note(ctx, estimate)),
        );
    }
    if my >= 31.5 || (ctx.state.is_endgame() && my >= 30.0) {
        out.push(
            AiMove::new(Action::CallFaltaEnvido, ReasonCode::EnvidoEscalate)
                .with_note(value_note(ctx, estimate)),
        );
    }

    if out.is_empty() && ctx.envido_value() < WEAK_VALUE {
        let fold_rate = ctx.model().envido(ctx.opponent_context()).fold_rate;
        let bluff_chance =
            (fold_rate * (0.5 + 0.5 * ctx.pressure)).clamp(0.0, ctx.params.bluff_cap);
        if rng.r#gen::<f32>() < bluff_chance {
            out.push(
                AiMove::new(Action::CallEnvido, ReasonCode::EnvidoBluff)
                    .with_note(value_note(ctx, estimate)),
            );
        }
    }
    out
}

/// Candidates for answering a pending envido call.
pub fn response_candidates<R: Rng + ?Sized>(ctx: &BotContext<'_>, rng: &mut R) -> Vec<AiMove> {
    // Flor trumps the envido outright; nothing else competes.
    if ctx.has_flor() {
        return vec![AiMove::new(
            Action::RespondEnvidoWithFlor,
            ReasonCode::FlorOverEnvido,
        )];
    }

    let mut out = Vec::new();
    let my = adjusted_value(ctx);
    let estimate = opponent_estimate(ctx, true);
    let advantage = my - estimate;

    if advantage >= 3.0
        && let Some(action) = next_escalation(ctx)
    {
        out.push(
            AiMove::new(action, ReasonCode::EnvidoEscalate).with_note(value_note(ctx, estimate)),
        );
    }

    if out.is_empty() && ctx.envido_value() < WEAK_VALUE {
        let fold_rate = ctx.model().envido(ctx.opponent_context()).fold_rate;
        let bluff_chance =
            (fold_rate * (0.4 + 0.4 * ctx.pressure)).clamp(0.0, ctx.params.bluff_cap);
        if rng.r#gen::<f32>() < bluff_chance
            && let Some(action) = next_escalation(ctx)
        {
            out.push(
                AiMove::new(action, ReasonCode::EnvidoBluff).with_note(value_note(ctx, estimate)),
            );
        }
    }

    out.push(
        AiMove::new(Action::Accept, ReasonCode::EnvidoAccept).with_note(value_note(ctx, estimate)),
    );
    out.push(AiMove::new(Action::Decline, ReasonCode::EnvidoDecline));
    out
}

fn next_escalation(ctx: &BotContext<'_>) -> Option<Action> {
    if !ctx.state.envido.real_called() && !ctx.state.envido.falta_called() {
        Some(Action::CallRealEnvido)
    } else if !ctx.state.envido.falta_called() {
        Some(Action::CallFaltaEnvido)
    } else {
        None
    }
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

    fn state_with_ai_envido(value_cards: [Card; 3], mano: Seat) -> GameState {
        GameState::from_hands(
            vec![
                card(Rank::Cuatro, Suit::Copas),
                card(Rank::Cinco, Suit::Oros),
                card(Rank::Sota, Suit::Bastos),
            ],
            value_cards.to_vec(),
            mano,
        )
    }

    #[test]
    fn strong_value_opens_the_ladder() {
        // 7 + 6 of oros: envido 33.
        let state = state_with_ai_envido(
            [
                card(Rank::Siete, Suit::Oros),
                card(Rank::Seis, Suit::Oros),
                card(Rank::Dos, Suit::Bastos),
            ],
            Seat::Ai,
        );
        let params = BotParams::default();
        let ctx = BotContext::new(Seat::Ai, &state, Archetype::Balanced, &params);
        let mut rng = SmallRng::seed_from_u64(61);
        let moves = call_candidates(&ctx, &mut rng);

        assert!(moves.iter().any(|m| m.action == Action::CallEnvido));
        assert!(moves.iter().any(|m| m.action == Action::CallRealEnvido));
        assert!(moves.iter().any(|m| m.action == Action::CallFaltaEnvido));
    }

    #[test]
    fn mediocre_value_stays_quiet_without_a_bluff_roll() {
        // Envido 24: below the 27 threshold, above bluff territory.
        let state = state_with_ai_envido(
            [
                card(Rank::Tres, Suit::Oros),
                card(Rank::Uno, Suit::Oros),
                card(Rank::Rey, Suit::Bastos),
            ],
            Seat::Player,
        );
        let params = BotParams::default();
        let ctx = BotContext::new(Seat::Ai, &state, Archetype::Balanced, &params);
        for seed in 0..32 {
            let mut rng = SmallRng::seed_from_u64(seed);
            assert!(call_candidates(&ctx, &mut rng).is_empty());
        }
    }

    #[test]
    fn weak_hand_sometimes_bluffs() {
        // Envido 7: pure bluff territory.
        let state = state_with_ai_envido(
            [
                card(Rank::Siete, Suit::Oros),
                card(Rank::Cuatro, Suit::Copas),
                card(Rank::Rey, Suit::Bastos),
            ],
            Seat::Player,
        );
        let params = BotParams::default();
        let ctx = BotContext::new(Seat::Ai, &state, Archetype::Balanced, &params);
        let mut bluffed = 0;
        for seed in 0..64 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let moves = call_candidates(&ctx, &mut rng);
            if moves.iter().any(|m| m.reason == ReasonCode::EnvidoBluff) {
                bluffed += 1;
            }
        }
        assert!(bluffed > 0, "no bluff in 64 seeds");
        assert!(bluffed < 40, "bluffed {bluffed}/64, cap is 40%");
    }

    #[test]
    fn response_includes_accept_and_decline_baselines() {
        let mut state = state_with_ai_envido(
            [
                card(Rank::Siete, Suit::Oros),
                card(Rank::Seis, Suit::Oros),
                card(Rank::Dos, Suit::Bastos),
            ],
            Seat::Player,
        );
        state = truco_core::game::apply(&state, Action::CallEnvido).expect("player opens");
        let params = BotParams::default();
        let ctx = BotContext::new(Seat::Ai, &state, Archetype::Balanced, &params);
        let mut rng = SmallRng::seed_from_u64(62);
        let moves = response_candidates(&ctx, &mut rng);

        assert!(moves.iter().any(|m| m.action == Action::Accept));
        assert!(moves.iter().any(|m| m.action == Action::Decline));
        // 33 against an estimate of ~28 also justifies a raise.
        assert!(moves.iter().any(|m| m.reason == ReasonCode::EnvidoEscalate));
    }

    #[test]
    fn flor_preempts_any_envido_response() {
        let mut state = GameState::from_hands(
            vec![
                card(Rank::Cuatro, Suit::Copas),
                card(Rank::Cinco, Suit::Oros),
                card(Rank::Sota, Suit::Bastos),
            ],
            vec![
                card(Rank::Siete, Suit::Oros),
                card(Rank::Seis, Suit::Oros),
                card(Rank::Dos, Suit::Oros),
            ],
            Seat::Player,
        );
        state = truco_core::game::apply(&state, Action::CallEnvido).expect("player opens");
        let params = BotParams::default();
        let ctx = BotContext::new(Seat::Ai, &state, Archetype::Balanced, &params);
        let mut rng = SmallRng::seed_from_u64(63);
        let moves = response_candidates(&ctx, &mut rng);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].action, Action::RespondEnvidoWithFlor);
    }
}
