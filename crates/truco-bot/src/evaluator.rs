//! Expected-value ranking of candidate moves plus archetype modulation.
//!
//! Base EV is an exhaustive function of the reason code (the compiler keeps
//! the table total); the archetype modifier is likewise total with a default
//! of 1.0. Negative EVs are divided rather than multiplied by the modifier
//! so a risk-tolerant persona shrinks penalties instead of flipping them:
//! the sign of a base EV always survives modulation.

use crate::bot::{Archetype, BotContext};
use crate::reason::ReasonCode;
use crate::reasoning::ReasonFragment;
use crate::strategy::{AiMove, RankedAlternative, card_play, envido, truco};
use rand::Rng;
use truco_core::belief::EnumerationCache;
use truco_core::eval;
use truco_core::model::action::Action;
use truco_core::model::phase::GamePhase;
use truco_core::model::state::{EnvidoKind, TrucoState};

/// Floor for modifiers; keeps the reciprocal rule away from division blowup.
const MIN_MODIFIER: f32 = 0.01;

/// Applies an archetype modifier without ever changing the EV's sign.
pub fn modified_ev(ev: f32, modifier: f32) -> f32 {
    let modifier = modifier.max(MIN_MODIFIER);
    if ev > 0.0 {
        ev * modifier
    } else if ev < 0.0 {
        ev / modifier
    } else {
        0.0
    }
}

/// Total persona table; anything unlisted multiplies by 1.0.
pub fn archetype_modifier(archetype: Archetype, reason: ReasonCode) -> f32 {
    use ReasonCode::*;
    match archetype {
        Archetype::Balanced => 1.0,
        Archetype::Aggressive => match reason {
            TrucoEliteCall => 1.3,
            TrucoValueCall => 1.25,
            TrucoBluff | TrucoDesperateBluff => 1.2,
            TrucoAccept => 1.15,
            EnvidoEscalate => 1.2,
            EnvidoValueCall => 1.15,
            TrucoFoldWeak | EnvidoDecline => 0.8,
            LeadStrongest => 1.1,
            _ => 1.0,
        },
        Archetype::Cautious => match reason {
            TrucoBluff | TrucoDesperateBluff | EnvidoBluff => 0.6,
            SacrificialBait => 0.7,
            LopsidedProbe | PardaYCanto => 0.8,
            HideEnvidoStrength => 0.9,
            TrucoValueCall => 0.85,
            TrucoFoldWeak => 1.25,
            EnvidoDecline => 1.2,
            _ => 1.0,
        },
        Archetype::Deceptive => match reason {
            HideEnvidoStrength => 1.35,
            SacrificialBait | PardaYCanto | FlorUndersell | TrucoMixedSignal => 1.3,
            LopsidedProbe | EnvidoBluff => 1.25,
            TrucoBluff => 1.2,
            _ => 1.0,
        },
    }
}

/// Picks the highest modified-EV candidate; ties go to the earliest
/// candidate (stable). The winner carries the full ranked field.
pub fn select<R: Rng + ?Sized>(
    candidates: Vec<AiMove>,
    ctx: &BotContext<'_>,
    cache: &mut EnumerationCache,
    rng: &mut R,
) -> AiMove {
    assert!(
        !candidates.is_empty(),
        "no candidates for phase {}",
        ctx.state.phase
    );

    let strength = if candidates
        .iter()
        .any(|mv| needs_truco_strength(mv.reason))
    {
        Some(truco::truco_strength(ctx, cache, rng).strength)
    } else {
        None
    };

    let mut scored: Vec<(AiMove, f32)> = candidates
        .into_iter()
        .map(|mv| {
            let base = base_ev(&mv, ctx, strength);
            let modifier = if is_decline(&mv.action) && base >= 0.0 {
                1.0
            } else {
                archetype_modifier(ctx.archetype, mv.reason)
            };
            let ev = modified_ev(base, modifier);
            (mv, ev)
        })
        .collect();

    let best_index = scored
        .iter()
        .enumerate()
        .max_by(|(ia, (_, a)), (ib, (_, b))| {
            a.partial_cmp(b)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(ib.cmp(ia))
        })
        .map(|(index, _)| index)
        .expect("non-empty candidate list");

    let ranking: Vec<RankedAlternative> = {
        let mut ranked: Vec<&(AiMove, f32)> = scored.iter().collect();
        ranked.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        ranked
            .into_iter()
            .map(|(mv, ev)| RankedAlternative {
                action: mv.action,
                reason: mv.reason,
                ev: *ev,
            })
            .collect()
    };

    let (mut winner, ev) = scored.swap_remove(best_index);
    winner.alternatives = ranking;
    winner.reasoning.push(ReasonFragment::template_with(
        "evaluator.selected",
        [
            ("ev", format!("{ev:.3}")),
            ("candidates", winner.alternatives.len().to_string()),
        ],
    ));
    winner
}

fn is_decline(action: &Action) -> bool {
    matches!(action, Action::Decline | Action::DeclineContraflor)
}

fn needs_truco_strength(reason: ReasonCode) -> bool {
    use ReasonCode::*;
    matches!(reason, TrucoEliteCall | TrucoValueCall | TrucoBluff | TrucoAccept)
}

fn base_ev(mv: &AiMove, ctx: &BotContext<'_>, strength: Option<f32>) -> f32 {
    use ReasonCode::*;
    match mv.reason {
        // Card play constants, with the situational bait bonus for probes.
        WinRoundOutright => 2.5,
        CheapestWinner => 1.2,
        DiscardLow => -1.0,
        LeadStrongest => 0.8,
        LeadToWin => 1.0,
        HideEnvidoStrength => 1.3,
        SacrificialBait => 0.9,
        LopsidedProbe => {
            let bait_bonus = if card_play::is_lopsided(ctx) { 1.5 } else { 0.0 };
            0.8 + bait_bonus
        }
        PardaYCanto => 1.4,

        // Truco. Value raises are priced on the acceptance-weighted payoff;
        // rolled deception plays carry fixed values so the generators'
        // probability gates stay the deciding factor.
        TrucoCertainWin => 2.8,
        TrucoEliteCall | TrucoValueCall | TrucoBluff => {
            truco_call_ev(mv, ctx, strength.unwrap_or(0.5))
        }
        TrucoDesperateBluff => 1.15,
        TrucoMixedSignal => 1.2,
        TrucoAccept => {
            let pending = ctx.state.truco.pending.unwrap_or(ctx.state.truco.level);
            let stake = TrucoState::STAKES[(pending as usize).min(3)] as f32;
            (2.0 * strength.unwrap_or(0.5) - 1.0) * stake
        }
        TrucoFoldWeak | TrucoFoldCertainLoss => -(ctx.state.truco.decline_points() as f32),

        // Envido.
        EnvidoValueCall | EnvidoEscalate => envido_call_ev(mv, ctx),
        EnvidoBluff => 1.1,
        EnvidoAccept => {
            let p_win = envido_win_probability(ctx, true);
            (2.0 * p_win - 1.0) * ctx.state.envido.points_if_accepted(ctx.state.scores) as f32
        }
        EnvidoDecline => -(ctx.state.envido.points_if_declined() as f32),
        FlorOverEnvido => 2.2,

        // Flor.
        FlorDeclare => 2.4,
        FlorUndersell => 1.3,
        FlorAcknowledge => 0.0,
        ContraflorCall => (ctx.flor_value() as f32 - 29.0) * 0.4 + 1.0,
        ContraflorAccept => {
            (eval::flor_value(ctx.state.initial_hand(ctx.seat)) as f32 - 31.0) * 0.5 + 0.5
        }
        ContraflorDecline => -4.0,
    }
}

fn envido_win_probability(ctx: &BotContext<'_>, responding: bool) -> f32 {
    let my = envido::adjusted_value(ctx);
    let estimate = envido::opponent_estimate(ctx, responding);
    (0.5 + (my - estimate) * 0.08).clamp(0.05, 0.95)
}

/// Acceptance-weighted showdown swing plus fold equity for a truco raise.
fn truco_call_ev(mv: &AiMove, ctx: &BotContext<'_>, strength: f32) -> f32 {
    let target = match mv.action {
        Action::CallTruco => 1usize,
        Action::CallRetruco => 2,
        Action::CallValeCuatro => 3,
        _ => (ctx.state.truco.level as usize + 1).min(3),
    };
    let win_stake = TrucoState::STAKES[target.min(3)] as f32;
    let fold_stake = TrucoState::STAKES[target - 1] as f32;
    let fold_rate = ctx.model().truco_fold_rate;
    (1.0 - fold_rate) * (2.0 * strength - 1.0) * win_stake + fold_rate * fold_stake
}

/// Acceptance-weighted showdown value plus fold equity for an envido call,
/// with the truco-risk and hopelessness corrections.
fn envido_call_ev(mv: &AiMove, ctx: &BotContext<'_>) -> f32 {
    let responding = ctx.state.phase == GamePhase::EnvidoPending;
    let p_win = envido_win_probability(ctx, responding);
    let fold_rate = ctx.model().envido(ctx.opponent_context()).fold_rate;

    // Project the ladder as it would stand after this call.
    let mut ladder = ctx.state.envido.clone();
    match mv.action {
        Action::CallEnvido => ladder.calls.push(EnvidoKind::Envido),
        Action::CallRealEnvido => ladder.calls.push(EnvidoKind::RealEnvido),
        Action::CallFaltaEnvido => ladder.calls.push(EnvidoKind::FaltaEnvido),
        _ => {}
    }
    let accept_points = ladder.points_if_accepted(ctx.state.scores) as f32;
    let fold_points = ladder.points_if_declined() as f32;

    let mut ev = (1.0 - fold_rate) * (2.0 * p_win - 1.0) * accept_points + fold_rate * fold_points;

    // Committing to envido with a hand that will then lose truco is a trap.
    let envido_value = ctx.envido_value();
    if envido_value >= 28 && eval::raw_truco_power(ctx.state.initial_hand(ctx.seat)) < 0.35 {
        ev -= 0.6;
    }

    // Early table image for personas that want action later.
    if ctx.state.scores == [0, 0]
        && matches!(ctx.archetype, Archetype::Aggressive | Archetype::Deceptive)
    {
        ev += 0.3;
    }

    // Hopeless value raises are forced under the do-nothing baseline so a
    // marginal positive blend can never talk us into them. Deliberate
    // bluffs are priced separately and stay exempt.
    if envido_value < 23 && ctx.archetype != Archetype::Aggressive {
        ev = ev.min(-0.5);
    }

    ev
}
