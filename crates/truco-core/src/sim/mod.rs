//! Monte-Carlo playout of the remaining tricks.
//!
//! The leader heuristic is deliberately simple: always lead the highest
//! remaining card. This is decoupled from the richer (deceptive) lead logic
//! in the card-play strategy on purpose; unifying them would make strength
//! estimates reflect the engine's own bluffs. The follower responds
//! optimally: cheapest winning card, else the lowest discard.

use crate::model::card::Card;
use crate::model::round::resolve_round;
use crate::model::seat::Seat;
use crate::model::trick::TrickWinner;
use rand::Rng;

pub const DEFAULT_ITERATIONS: usize = 120;

#[derive(Debug, Clone, Copy)]
pub struct SimOptions {
    pub iterations: usize,
    /// The seat being evaluated (whose win probability is returned).
    pub my_seat: Seat,
    pub mano: Seat,
    /// Outcomes of tricks already settled this round.
    pub prior_winners: [Option<TrickWinner>; 3],
    /// Index of the first trick to simulate.
    pub start_trick: usize,
    /// Whether `my_seat` leads the first simulated trick.
    pub i_lead: bool,
    /// Learned opponent tendency; below 1.0 the opponent sometimes leads
    /// their weakest card on trick 1 as mano.
    pub lead_with_highest_rate: f32,
}

impl SimOptions {
    pub fn fresh_round(my_seat: Seat, mano: Seat) -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            my_seat,
            mano,
            prior_winners: [None; 3],
            start_trick: 0,
            i_lead: mano == my_seat,
            lead_with_highest_rate: 1.0,
        }
    }
}

/// Estimated probability that `my_seat` wins the round, in [0, 1].
pub fn simulate_round_win<R: Rng + ?Sized>(
    my_hand: &[Card],
    opponent_hand: &[Card],
    options: &SimOptions,
    rng: &mut R,
) -> f32 {
    if options.iterations == 0 {
        return 0.5;
    }
    if let Some(winner) = resolve_round(&options.prior_winners, options.mano) {
        return if winner == options.my_seat { 1.0 } else { 0.0 };
    }

    let mut wins = 0usize;
    for _ in 0..options.iterations {
        if play_out(my_hand, opponent_hand, options, rng) == options.my_seat {
            wins += 1;
        }
    }
    wins as f32 / options.iterations as f32
}

fn play_out<R: Rng + ?Sized>(
    my_hand: &[Card],
    opponent_hand: &[Card],
    options: &SimOptions,
    rng: &mut R,
) -> Seat {
    let mut mine = sorted_desc(my_hand);
    let mut theirs = sorted_desc(opponent_hand);
    let mut winners = options.prior_winners;
    let mut i_lead = options.i_lead;
    let opponent = options.my_seat.opponent();
    let opponent_is_mano = options.mano == opponent;

    for trick in options.start_trick..3 {
        if resolve_round(&winners, options.mano).is_some() {
            break;
        }
        if mine.is_empty() || theirs.is_empty() {
            break;
        }

        let (my_card, their_card) = if i_lead {
            let lead = take_highest(&mut mine);
            let follow = respond(&mut theirs, lead);
            (lead, follow)
        } else {
            let deceive = trick == 0
                && opponent_is_mano
                && rng.r#gen::<f32>() >= options.lead_with_highest_rate;
            let lead = if deceive {
                take_lowest(&mut theirs)
            } else {
                take_highest(&mut theirs)
            };
            let follow = respond(&mut mine, lead);
            (follow, lead)
        };

        let outcome = match my_card.hierarchy().cmp(&their_card.hierarchy()) {
            std::cmp::Ordering::Greater => TrickWinner::from_seat(options.my_seat),
            std::cmp::Ordering::Less => TrickWinner::from_seat(opponent),
            std::cmp::Ordering::Equal => TrickWinner::Tie,
        };
        winners[trick] = Some(outcome);

        // Winner leads the next trick; a parda leaves the lead in place.
        match outcome.seat() {
            Some(seat) => i_lead = seat == options.my_seat,
            None => {}
        }
    }

    resolve_round(&winners, options.mano).unwrap_or(options.mano)
}

fn sorted_desc(cards: &[Card]) -> Vec<Card> {
    let mut sorted = cards.to_vec();
    sorted.sort_by(|a, b| b.hierarchy().cmp(&a.hierarchy()));
    sorted
}

fn take_highest(cards: &mut Vec<Card>) -> Card {
    cards.remove(0)
}

fn take_lowest(cards: &mut Vec<Card>) -> Card {
    cards.pop().expect("caller checked non-empty")
}

/// Cheapest card that still beats the lead, else the lowest discard.
fn respond(cards: &mut Vec<Card>, lead: Card) -> Card {
    let beat_index = cards
        .iter()
        .rposition(|card| card.hierarchy() > lead.hierarchy());
    match beat_index {
        Some(index) => cards.remove(index),
        None => take_lowest(cards),
    }
}
