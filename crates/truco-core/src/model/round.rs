use crate::model::seat::Seat;
use crate::model::trick::TrickWinner;

/// Resolves the round from the trick outcomes seen so far.
///
/// Returns `None` while the round is still undecided. First to two decisive
/// tricks wins. With two tricks resolved and one of them a parda, the
/// decisive trick's winner takes the round immediately. With all three
/// resolved: all pardas go to the mano; exactly one decisive trick decides;
/// one win each plus a parda goes to the trick-1 winner, unless trick 1
/// itself was the parda, in which case the mano wins.
pub fn resolve_round(winners: &[Option<TrickWinner>; 3], mano: Seat) -> Option<Seat> {
    let resolved: Vec<TrickWinner> = winners.iter().copied().flatten().collect();

    let wins_for = |seat: Seat| resolved.iter().filter(|w| w.seat() == Some(seat)).count();
    for seat in Seat::BOTH {
        if wins_for(seat) >= 2 {
            return Some(seat);
        }
    }

    if resolved.len() == 2 {
        // A parda plus a decisive trick ends the round before trick 3.
        match (resolved[0].is_decisive(), resolved[1].is_decisive()) {
            (true, false) => return resolved[0].seat(),
            (false, true) => return resolved[1].seat(),
            _ => return None,
        }
    }

    if resolved.len() < 3 {
        return None;
    }

    let decisive: Vec<TrickWinner> =
        resolved.iter().copied().filter(|w| w.is_decisive()).collect();
    match decisive.len() {
        0 => Some(mano),
        1 => decisive[0].seat(),
        2 => {
            // One win each plus one parda.
            if resolved[0].is_decisive() {
                resolved[0].seat()
            } else {
                Some(mano)
            }
        }
        // Three decisive tricks between two seats always contain a double
        // winner, caught by the two-win rule above.
        _ => unreachable!("three decisive tricks always contain a double winner"),
    }
}

#[cfg(test)]
mod tests {
    use super::resolve_round;
    use crate::model::seat::Seat;
    use crate::model::trick::TrickWinner::{Ai, Player, Tie};

    #[test]
    fn two_wins_end_the_round_early() {
        assert_eq!(
            resolve_round(&[Some(Ai), Some(Ai), None], Seat::Player),
            Some(Seat::Ai)
        );
    }

    #[test]
    fn parda_then_decisive_goes_to_the_winner() {
        assert_eq!(
            resolve_round(&[Some(Tie), Some(Player), None], Seat::Ai),
            Some(Seat::Player)
        );
    }

    #[test]
    fn decisive_then_parda_goes_to_first_winner() {
        assert_eq!(
            resolve_round(&[Some(Ai), Some(Tie), None], Seat::Player),
            Some(Seat::Ai)
        );
    }

    #[test]
    fn all_pardas_go_to_mano() {
        assert_eq!(
            resolve_round(&[Some(Tie), Some(Tie), Some(Tie)], Seat::Player),
            Some(Seat::Player)
        );
    }

    #[test]
    fn split_wins_with_late_parda_favor_trick_one() {
        assert_eq!(
            resolve_round(&[Some(Player), Some(Ai), Some(Tie)], Seat::Ai),
            Some(Seat::Player)
        );
    }

    #[test]
    fn first_trick_parda_with_split_wins_goes_to_mano() {
        assert_eq!(
            resolve_round(&[Some(Tie), Some(Player), Some(Ai)], Seat::Ai),
            Some(Seat::Ai)
        );
    }

    #[test]
    fn lone_decisive_trick_after_three_decides() {
        assert_eq!(
            resolve_round(&[Some(Tie), Some(Tie), Some(Ai)], Seat::Player),
            Some(Seat::Ai)
        );
    }

    #[test]
    fn undecided_rounds_return_none() {
        assert_eq!(resolve_round(&[Some(Player), None, None], Seat::Ai), None);
        assert_eq!(resolve_round(&[None, None, None], Seat::Player), None);
        assert_eq!(resolve_round(&[Some(Tie), None, None], Seat::Player), None);
    }
}
