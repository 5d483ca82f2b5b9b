use crate::evaluator;
use crate::strategy::{AiMove, card_play, envido, flor, truco};
use rand::Rng;
use serde::{Deserialize, Serialize};
use truco_core::belief::{CallContext, EnumerationCache, OpponentModel};
use truco_core::eval;
use truco_core::model::phase::GamePhase;
use truco_core::model::seat::Seat;
use truco_core::model::state::GameState;
use truco_core::pressure::game_pressure;

/// Persistent persona. Orthogonal to game pressure: the archetype never
/// changes mid-game, pressure changes every decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Archetype {
    Balanced,
    Aggressive,
    Cautious,
    Deceptive,
}

impl Default for Archetype {
    fn default() -> Self {
        Self::Balanced
    }
}

/// Tunable decision knobs, grouped so tests and the bench harness can pin
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BotParams {
    pub sim_iterations_per_sample: usize,
    pub samples_per_stratum: usize,
    pub certainty_threshold: f32,
    pub certainty_action_rate: f32,
    pub elite_escalate_rate: f32,
    pub weak_fold_rate: f32,
    pub bluff_cap: f32,
    pub mixed_strategy_peak: f32,
}

impl Default for BotParams {
    fn default() -> Self {
        Self {
            sim_iterations_per_sample: 40,
            samples_per_stratum: 2,
            certainty_threshold: 0.95,
            certainty_action_rate: 0.8,
            elite_escalate_rate: 0.85,
            weak_fold_rate: 0.65,
            bluff_cap: 0.4,
            mixed_strategy_peak: 0.10,
        }
    }
}

/// Everything one decision needs: the snapshot, the persona, and the
/// pressure scalar computed once up front.
#[derive(Debug, Clone, Copy)]
pub struct BotContext<'a> {
    pub seat: Seat,
    pub state: &'a GameState,
    pub archetype: Archetype,
    pub params: &'a BotParams,
    pub pressure: f32,
}

impl<'a> BotContext<'a> {
    pub fn new(
        seat: Seat,
        state: &'a GameState,
        archetype: Archetype,
        params: &'a BotParams,
    ) -> Self {
        let pressure = game_pressure(state, seat);
        Self {
            seat,
            state,
            archetype,
            params,
            pressure,
        }
    }

    pub fn model(&self) -> &'a OpponentModel {
        &self.state.opponent_model
    }

    pub fn my_hand(&self) -> &'a truco_core::model::Hand {
        self.state.hand(self.seat)
    }

    pub fn is_mano(&self) -> bool {
        self.state.mano == self.seat
    }

    /// Envido is always read off the initial three cards.
    pub fn envido_value(&self) -> u8 {
        eval::envido_value(self.state.initial_hand(self.seat))
    }

    pub fn has_flor(&self) -> bool {
        eval::has_flor(self.state.initial_hand(self.seat))
    }

    pub fn flor_value(&self) -> u8 {
        eval::flor_value(self.state.initial_hand(self.seat))
    }

    pub fn trick_index(&self) -> usize {
        self.state.current_trick_index()
    }

    /// Calling-position context of the opponent, for model lookups.
    pub fn opponent_context(&self) -> CallContext {
        if self.state.mano == self.seat.opponent() {
            CallContext::Mano
        } else {
            CallContext::Pie
        }
    }
}

/// Produces the move for the current decision point.
///
/// Must only be called when it is `seat`'s turn in a non-terminal phase;
/// anything else is a wiring bug upstream, not a recoverable game state.
pub fn decide<R: Rng + ?Sized>(ctx: &BotContext<'_>, rng: &mut R) -> AiMove {
    assert_eq!(
        ctx.state.current_turn, ctx.seat,
        "decide called out of turn"
    );

    let mut cache = EnumerationCache::new();
    let mut candidates: Vec<AiMove> = Vec::new();

    match ctx.state.phase {
        GamePhase::Playing => {
            candidates.extend(flor::declaration_candidates(ctx, rng));
            // A rolled flor-undersell suppresses the declaration and runs an
            // envido bluff sequence instead; otherwise flor preempts envido.
            let flor_declared = candidates
                .iter()
                .any(|c| c.reason == crate::reason::ReasonCode::FlorDeclare);
            if !flor_declared {
                candidates.extend(envido::call_candidates(ctx, rng));
            }
            candidates.extend(truco::call_candidates(ctx, &mut cache, rng));
            candidates.extend(card_play::candidates(ctx, rng));
        }
        GamePhase::EnvidoPending => {
            candidates.extend(envido::response_candidates(ctx, rng));
        }
        GamePhase::TrucoPending => {
            // Envido primero stays available against a fresh truco offer.
            if ctx.state.envido_window_open() && ctx.state.truco.pending == Some(1) {
                candidates.extend(envido::call_candidates(ctx, rng));
            }
            candidates.extend(truco::response_candidates(ctx, &mut cache, rng));
        }
        GamePhase::FlorPending => {
            candidates.extend(flor::response_candidates(ctx, rng));
        }
        GamePhase::ContraflorPending => {
            candidates.extend(flor::contraflor_response_candidates(ctx));
        }
        GamePhase::RoundOver | GamePhase::GameOver => {
            panic!("decide called in terminal phase {}", ctx.state.phase)
        }
    }

    evaluator::select(candidates, ctx, &mut cache, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use truco_core::model::action::Action;
    use truco_core::model::card::Card;
    use truco_core::model::rank::Rank;
    use truco_core::model::suit::Suit;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    fn state() -> GameState {
        GameState::from_hands(
            vec![
                card(Rank::Cuatro, Suit::Copas),
                card(Rank::Cinco, Suit::Oros),
                card(Rank::Sota, Suit::Bastos),
            ],
            vec![
                card(Rank::Uno, Suit::Espadas),
                card(Rank::Tres, Suit::Oros),
                card(Rank::Seis, Suit::Copas),
            ],
            Seat::Ai,
        )
    }

    #[test]
    fn decide_returns_a_legal_move_in_playing_phase() {
        let state = state();
        let params = BotParams::default();
        let ctx = BotContext::new(Seat::Ai, &state, Archetype::Balanced, &params);
        let mut rng = SmallRng::seed_from_u64(41);
        let mv = decide(&ctx, &mut rng);
        assert!(
            truco_core::game::apply(&state, mv.action).is_ok(),
            "decide proposed illegal {:?}",
            mv.action
        );
        assert!(!mv.reasoning.is_empty());
    }

    #[test]
    fn decide_answers_pending_truco() {
        let mut state = state();
        state.current_turn = Seat::Player;
        let offered = truco_core::game::apply(&state, Action::CallTruco).expect("player calls");
        let params = BotParams::default();
        let ctx = BotContext::new(Seat::Ai, &offered, Archetype::Balanced, &params);
        let mut rng = SmallRng::seed_from_u64(42);
        let mv = decide(&ctx, &mut rng);
        assert!(truco_core::game::apply(&offered, mv.action).is_ok());
    }

    #[test]
    #[should_panic(expected = "decide called out of turn")]
    fn decide_panics_out_of_turn() {
        let mut state = state();
        state.current_turn = Seat::Player;
        let params = BotParams::default();
        let ctx = BotContext::new(Seat::Ai, &state, Archetype::Balanced, &params);
        let mut rng = SmallRng::seed_from_u64(43);
        let _ = decide(&ctx, &mut rng);
    }

    #[test]
    fn pressure_is_computed_once_per_context() {
        let mut state = state();
        state.scores = [9, 3];
        let params = BotParams::default();
        let ctx = BotContext::new(Seat::Ai, &state, Archetype::Cautious, &params);
        assert!(ctx.pressure > 0.0);
        assert_eq!(ctx.opponent_context(), CallContext::Pie);
    }
}
