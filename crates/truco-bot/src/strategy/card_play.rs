//! Card-play candidate generation: deceptive leads in the first trick,
//! straight value play afterwards, and response logic that always checks for
//! an outright round clincher first.

use crate::bot::BotContext;
use crate::reason::ReasonCode;
use crate::reasoning::ReasonFragment;
use crate::strategy::AiMove;
use rand::Rng;
use truco_core::eval;
use truco_core::model::action::Action;
use truco_core::model::card::Card;
use truco_core::model::round::resolve_round;
use truco_core::model::seat::Seat;
use truco_core::model::trick::TrickWinner;

/// Envido worth hiding with a misleading lead.
const HIDE_ENVIDO_MIN: u8 = 28;
/// An opponent calling this light counts as an aggressive envido caller.
const AGGRESSIVE_CALLER_THRESHOLD: f32 = 26.0;

pub fn candidates<R: Rng + ?Sized>(ctx: &BotContext<'_>, rng: &mut R) -> Vec<AiMove> {
    let hand = ctx.my_hand();
    if hand.is_empty() {
        return Vec::new();
    }

    if ctx.state.is_leading(ctx.seat) {
        lead_candidates(ctx, rng)
    } else {
        respond_candidates(ctx, rng)
    }
}

fn lead_candidates<R: Rng + ?Sized>(ctx: &BotContext<'_>, rng: &mut R) -> Vec<AiMove> {
    let hand = ctx.my_hand();
    let trick = ctx.trick_index();
    let mut out = Vec::new();

    if trick == 0 {
        if let Some(card) = envido_hiding_lead(ctx, rng) {
            out.push(play(ctx.seat, hand_index(ctx, card), ReasonCode::HideEnvidoStrength));
        } else if let Some(card) = sacrificial_lead(ctx, rng) {
            out.push(play(ctx.seat, hand_index(ctx, card), ReasonCode::SacrificialBait));
        } else if let Some(card) = lopsided_probe_lead(ctx, rng) {
            out.push(
                play(ctx.seat, hand_index(ctx, card), ReasonCode::LopsidedProbe).with_note(
                    ReasonFragment::template_with(
                        "lead.mask_strong_card",
                        [("card", card.to_string())],
                    ),
                ),
            );
        }
    }

    // The straightforward lead is always on the table; after trick 1 it is
    // the only lead.
    let strongest = hand.highest().expect("caller checked non-empty");
    let reason = if trick == 0 {
        ReasonCode::LeadStrongest
    } else {
        ReasonCode::LeadToWin
    };
    out.push(play(ctx.seat, hand_index(ctx, strongest), reason));
    out
}

/// Tactic (a): a mano hand with big envido but weak truco hides the paired
/// suit. Fires at 40% base, 70% when clearly behind, back to 40% against
/// opponents who call envido light anyway.
fn envido_hiding_lead<R: Rng + ?Sized>(ctx: &BotContext<'_>, rng: &mut R) -> Option<Card> {
    if !ctx.is_mano() || ctx.envido_value() < HIDE_ENVIDO_MIN {
        return None;
    }
    let initial = ctx.state.initial_hand(ctx.seat);
    if eval::hand_percentile(initial) > 50 {
        return None;
    }

    let behind = ctx.pressure >= 0.4;
    let aggressive_caller =
        ctx.model().envido(ctx.opponent_context()).call_threshold < AGGRESSIVE_CALLER_THRESHOLD;
    let chance = if behind && !aggressive_caller { 0.7 } else { 0.4 };
    if rng.r#gen::<f32>() >= chance {
        return None;
    }

    let details = eval::envido_details(initial);
    ctx.my_hand()
        .iter()
        .copied()
        .filter(|card| !details.cards.contains(card))
        .min_by_key(|card| card.hierarchy())
}

/// Tactic (b): with the top card plus a strong-but-not-top card, bait a call
/// by leading the second-best (40%, only as mano before any truco).
fn sacrificial_lead<R: Rng + ?Sized>(ctx: &BotContext<'_>, rng: &mut R) -> Option<Card> {
    if !ctx.is_mano() || ctx.state.truco.level != 0 {
        return None;
    }
    let hand = ctx.my_hand();
    let top = hand.iter().copied().find(|c| c.hierarchy() >= 13)?;
    let second = hand
        .iter()
        .copied()
        .filter(|c| *c != top && (10..=12).contains(&c.hierarchy()))
        .max_by_key(|c| c.hierarchy())?;
    if rng.r#gen::<f32>() < 0.4 { Some(second) } else { None }
}

/// Tactic (c): one very strong card among mediocrity; mask it by opening
/// low 75% of the time.
fn lopsided_probe_lead<R: Rng + ?Sized>(ctx: &BotContext<'_>, rng: &mut R) -> Option<Card> {
    if !is_lopsided(ctx) {
        return None;
    }
    if rng.r#gen::<f32>() < 0.75 {
        ctx.my_hand().lowest()
    } else {
        None
    }
}

pub(crate) fn is_lopsided(ctx: &BotContext<'_>) -> bool {
    let hand = ctx.my_hand();
    if hand.len() < 2 {
        return false;
    }
    let strongest = hand.highest().map(|c| c.hierarchy()).unwrap_or(0);
    strongest >= 12
        && hand
            .iter()
            .filter(|c| c.hierarchy() != strongest)
            .all(|c| c.hierarchy() <= 7)
}

fn respond_candidates<R: Rng + ?Sized>(ctx: &BotContext<'_>, rng: &mut R) -> Vec<AiMove> {
    let hand = ctx.my_hand();
    let led = ctx
        .state
        .current_trick()
        .card(ctx.seat.opponent())
        .expect("responding requires a led card");
    let mut out = Vec::new();

    let beating: Vec<Card> = hand
        .iter()
        .copied()
        .filter(|c| c.hierarchy() > led.hierarchy())
        .collect();

    // A trick win that settles the whole round is taken with the weakest
    // card that does the job.
    if !beating.is_empty() && winning_clinches_round(ctx) {
        let cheapest = *beating
            .iter()
            .min_by_key(|c| c.hierarchy())
            .expect("non-empty");
        out.push(play(ctx.seat, hand_index(ctx, cheapest), ReasonCode::WinRoundOutright));
        return out;
    }

    // Parda y canto: tie on purpose with the lesser card to set up a truco
    // call while the real threat stays hidden.
    let tying = hand
        .iter()
        .copied()
        .find(|c| c.hierarchy() == led.hierarchy() && c.hierarchy() < 12);
    let top_tier = hand.iter().any(|c| c.hierarchy() >= 12);
    if let Some(tie_card) = tying
        && top_tier
        && rng.r#gen::<f32>() < 0.8
    {
        out.push(play(ctx.seat, hand_index(ctx, tie_card), ReasonCode::PardaYCanto));
    }

    if let Some(cheapest) = beating.iter().min_by_key(|c| c.hierarchy()) {
        out.push(play(ctx.seat, hand_index(ctx, *cheapest), ReasonCode::CheapestWinner));
    } else {
        let lowest = hand.lowest().expect("responding with non-empty hand");
        out.push(play(ctx.seat, hand_index(ctx, lowest), ReasonCode::DiscardLow));
    }
    out
}

/// Would taking the current trick end the round in our favor?
fn winning_clinches_round(ctx: &BotContext<'_>) -> bool {
    let mut winners = ctx.state.trick_winners;
    winners[ctx.trick_index()] = Some(TrickWinner::from_seat(ctx.seat));
    resolve_round(&winners, ctx.state.mano) == Some(ctx.seat)
}

fn hand_index(ctx: &BotContext<'_>, card: Card) -> usize {
    ctx.my_hand()
        .index_of(card)
        .expect("candidate card drawn from hand")
}

fn play(seat: Seat, card_index: usize, reason: ReasonCode) -> AiMove {
    AiMove::new(Action::PlayCard { seat, card_index }, reason)
}
