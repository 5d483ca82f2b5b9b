//! Exhaustive coverage of the round-winner table: all 3^3 trick-outcome
//! combinations, both mano assignments, checked against a straightforward
//! reference rendition of the rules.

use truco_core::model::round::resolve_round;
use truco_core::model::seat::Seat;
use truco_core::model::trick::TrickWinner;

const OUTCOMES: [TrickWinner; 3] = [TrickWinner::Player, TrickWinner::Ai, TrickWinner::Tie];

fn wins(winners: &[TrickWinner], seat: Seat) -> usize {
    winners.iter().filter(|w| w.seat() == Some(seat)).count()
}

/// Rule-by-rule reference rendition for a full three-trick sequence.
fn reference_full(winners: [TrickWinner; 3], mano: Seat) -> Seat {
    for seat in Seat::BOTH {
        if wins(&winners, seat) >= 2 {
            return seat;
        }
    }
    let decisive: Vec<TrickWinner> = winners
        .iter()
        .copied()
        .filter(|w| w.is_decisive())
        .collect();
    match decisive.len() {
        0 => mano,
        1 => decisive[0].seat().expect("decisive outcome has a seat"),
        2 => {
            if winners[0].is_decisive() {
                winners[0].seat().expect("decisive outcome has a seat")
            } else {
                mano
            }
        }
        _ => unreachable!("two seats cannot split three decisive tricks evenly"),
    }
}

#[test]
fn full_sequences_match_reference_for_both_manos() {
    for mano in Seat::BOTH {
        for a in OUTCOMES {
            for b in OUTCOMES {
                for c in OUTCOMES {
                    let winners = [Some(a), Some(b), Some(c)];
                    let resolved = resolve_round(&winners, mano);
                    assert_eq!(
                        resolved,
                        Some(reference_full([a, b, c], mano)),
                        "sequence {a}/{b}/{c} with mano {mano}"
                    );
                }
            }
        }
    }
}

#[test]
fn two_trick_prefixes_resolve_exactly_when_decided() {
    for mano in Seat::BOTH {
        for a in OUTCOMES {
            for b in OUTCOMES {
                let winners = [Some(a), Some(b), None];
                let resolved = resolve_round(&winners, mano);
                let expected = match (a, b) {
                    // Same decisive winner twice.
                    _ if a == b && a.is_decisive() => a.seat(),
                    // A parda next to a decisive trick ends the round.
                    (TrickWinner::Tie, other) if other.is_decisive() => other.seat(),
                    (other, TrickWinner::Tie) if other.is_decisive() => other.seat(),
                    // Split wins or double parda: play on.
                    _ => None,
                };
                assert_eq!(resolved, expected, "prefix {a}/{b} with mano {mano}");
            }
        }
    }
}

#[test]
fn one_trick_prefixes_never_resolve() {
    for mano in Seat::BOTH {
        for a in OUTCOMES {
            assert_eq!(resolve_round(&[Some(a), None, None], mano), None);
        }
    }
}

#[test]
fn literal_scenarios_from_the_rulebook() {
    use TrickWinner::{Ai, Player, Tie};

    // Two straight wins decide before the third trick exists.
    for mano in Seat::BOTH {
        assert_eq!(
            resolve_round(&[Some(Ai), Some(Ai), None], mano),
            Some(Seat::Ai)
        );
    }
    // Parda first, decisive second.
    assert_eq!(
        resolve_round(&[Some(Tie), Some(Player), None], Seat::Ai),
        Some(Seat::Player)
    );
    // Three pardas: mano.
    assert_eq!(
        resolve_round(&[Some(Tie), Some(Tie), Some(Tie)], Seat::Player),
        Some(Seat::Player)
    );
}
