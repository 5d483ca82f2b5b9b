//! Flor declaration, flor responses, and the contraflor duel.
//!
//! Flor is mandatory-priority: holding one, the engine declares it ahead of
//! any envido line, unless the undersell bluff path fires on a small flor
//! and runs an envido sequence instead.

use crate::bot::BotContext;
use crate::reason::ReasonCode;
use crate::reasoning::ReasonFragment;
use crate::strategy::AiMove;
use rand::Rng;
use truco_core::eval;
use truco_core::model::action::Action;
use truco_core::model::state::TARGET_SCORE;

/// Flores below this are candidates for the undersell bluff.
const UNDERSELL_MAX: u8 = 26;
/// Declared-flor value worth answering with a contraflor.
const CONTRAFLOR_CALL_MIN: u8 = 28;
/// Base contraflor acceptance threshold, relaxed near game point.
const CONTRAFLOR_ACCEPT_MIN: u8 = 32;
const CONTRAFLOR_ACCEPT_NEAR_WIN: u8 = 30;

fn flor_note(value: u8) -> ReasonFragment {
    ReasonFragment::template_with("flor.value", [("value", value.to_string())])
}

/// Declaration candidates during open play.
pub fn declaration_candidates<R: Rng + ?Sized>(
    ctx: &BotContext<'_>,
    rng: &mut R,
) -> Vec<AiMove> {
    if !ctx.has_flor()
        || ctx.state.flor.declared[ctx.seat.index()]
        || ctx.state.tricks[0].is_complete()
    {
        return Vec::new();
    }

    let value = ctx.flor_value();
    if value < UNDERSELL_MAX && ctx.state.envido_window_open() && rng.r#gen::<f32>() < 0.4 {
        // Undersell: sit on the flor and run an envido bluff line instead,
        // hiding that the whole hand is suited.
        return vec![
            AiMove::new(Action::CallEnvido, ReasonCode::FlorUndersell).with_note(flor_note(value)),
        ];
    }

    vec![AiMove::new(Action::DeclareFlor, ReasonCode::FlorDeclare).with_note(flor_note(value))]
}

/// Responses to an opponent's declared flor.
pub fn response_candidates<R: Rng + ?Sized>(ctx: &BotContext<'_>, _rng: &mut R) -> Vec<AiMove> {
    if ctx.has_flor() && ctx.flor_value() >= CONTRAFLOR_CALL_MIN {
        return vec![
            AiMove::new(Action::CallContraflor, ReasonCode::ContraflorCall)
                .with_note(flor_note(ctx.flor_value())),
            AiMove::new(Action::AcknowledgeFlor, ReasonCode::FlorAcknowledge),
        ];
    }
    vec![AiMove::new(
        Action::AcknowledgeFlor,
        ReasonCode::FlorAcknowledge,
    )]
}

/// Answer to a contraflor: a fixed value threshold, relaxed when taking the
/// duel could close out the game.
pub fn contraflor_response_candidates(ctx: &BotContext<'_>) -> Vec<AiMove> {
    let value = eval::flor_value(ctx.state.initial_hand(ctx.seat));
    let near_win = ctx.state.score(ctx.seat) + 6 >= TARGET_SCORE;
    let threshold = if near_win {
        CONTRAFLOR_ACCEPT_NEAR_WIN
    } else {
        CONTRAFLOR_ACCEPT_MIN
    };

    if value >= threshold {
        vec![
            AiMove::new(Action::AcceptContraflor, ReasonCode::ContraflorAccept)
                .with_note(flor_note(value)),
        ]
    } else {
        vec![
            AiMove::new(Action::DeclineContraflor, ReasonCode::ContraflorDecline)
                .with_note(flor_note(value)),
        ]
    }
}
