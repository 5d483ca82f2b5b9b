use crate::bot::{Archetype, BotContext, BotParams, decide};
use crate::strategy::AiMove;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{Level, event};
use truco_core::model::seat::Seat;
use truco_core::model::state::GameState;

/// Unified interface for decision policies, so hosts can swap the heuristic
/// engine for scripted or remote opponents.
pub trait Policy: Send {
    /// Produces the move for the current decision point. Only called when
    /// it is this policy's turn in a non-terminal phase.
    fn choose(&mut self, state: &GameState) -> AiMove;

    fn seat(&self) -> Seat;
}

/// The heuristic engine behind a [`Policy`] face, with its own seeded RNG so
/// whole matches replay deterministically.
pub struct HeuristicPolicy {
    seat: Seat,
    archetype: Archetype,
    params: BotParams,
    rng: SmallRng,
}

impl HeuristicPolicy {
    pub fn new(seat: Seat, archetype: Archetype, seed: u64) -> Self {
        Self {
            seat,
            archetype,
            params: BotParams::default(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn with_params(mut self, params: BotParams) -> Self {
        self.params = params;
        self
    }

    pub fn archetype(&self) -> Archetype {
        self.archetype
    }
}

impl Policy for HeuristicPolicy {
    fn choose(&mut self, state: &GameState) -> AiMove {
        let ctx = BotContext::new(self.seat, state, self.archetype, &self.params);
        let chosen = decide(&ctx, &mut self.rng);
        log_decision(&ctx, &chosen);
        chosen
    }

    fn seat(&self) -> Seat {
        self.seat
    }
}

fn log_decision(ctx: &BotContext<'_>, chosen: &AiMove) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }
    event!(
        Level::INFO,
        seat = %ctx.seat,
        phase = %ctx.state.phase,
        action = %chosen.action,
        reason = chosen.reason.key(),
        category = ?chosen.category,
        pressure = ctx.pressure,
        candidates = chosen.alternatives.len(),
        "bot decision"
    );
}
