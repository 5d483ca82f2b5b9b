//! Game pressure: the per-decision desperation scalar.
//!
//! Distinct from the persistent archetype, this reflects only the score
//! situation of the current game and modulates nearly every threshold in the
//! strategy layer. Positive values mean the seat is behind (desperate),
//! negative values mean it is comfortable.

use crate::model::seat::Seat;
use crate::model::state::{ENDGAME_SCORE, GameState};

/// Pressure in [-1, 1] for `seat` given the current scores.
///
/// In the endgame (either side at 12+) a tied score is maximum desperation;
/// otherwise the deficit dominates on a steep scale. Early game uses a much
/// flatter scale.
pub fn game_pressure(state: &GameState, seat: Seat) -> f32 {
    let diff = state.score_diff(seat) as f32;
    let endgame = state.score(seat).max(state.score(seat.opponent())) >= ENDGAME_SCORE;

    let raw = if endgame {
        if diff == 0.0 { 1.0 } else { -diff / 3.0 }
    } else {
        -diff / 15.0
    };
    raw.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::game_pressure;
    use crate::model::rank::Rank;
    use crate::model::seat::Seat;
    use crate::model::state::GameState;
    use crate::model::suit::Suit;
    use crate::model::card::Card;

    fn state_with_scores(player: u8, ai: u8) -> GameState {
        let mut state = GameState::from_hands(
            vec![
                Card::new(Rank::Cuatro, Suit::Copas),
                Card::new(Rank::Cinco, Suit::Oros),
                Card::new(Rank::Seis, Suit::Bastos),
            ],
            vec![
                Card::new(Rank::Tres, Suit::Oros),
                Card::new(Rank::Dos, Suit::Copas),
                Card::new(Rank::Sota, Suit::Espadas),
            ],
            Seat::Player,
        );
        state.scores = [player, ai];
        state
    }

    #[test]
    fn behind_means_positive_pressure() {
        let state = state_with_scores(9, 3);
        assert!(game_pressure(&state, Seat::Ai) > 0.0);
        assert!(game_pressure(&state, Seat::Player) < 0.0);
    }

    #[test]
    fn early_game_uses_flat_scale() {
        let state = state_with_scores(6, 3);
        let p = game_pressure(&state, Seat::Ai);
        assert!((p - 0.2).abs() < 1e-6);
    }

    #[test]
    fn endgame_tie_is_maximum_desperation() {
        let state = state_with_scores(13, 13);
        assert_eq!(game_pressure(&state, Seat::Ai), 1.0);
        assert_eq!(game_pressure(&state, Seat::Player), 1.0);
    }

    #[test]
    fn endgame_deficit_is_steep_and_clamped() {
        let state = state_with_scores(14, 8);
        assert_eq!(game_pressure(&state, Seat::Ai), 1.0);
        assert_eq!(game_pressure(&state, Seat::Player), -1.0);

        let close = state_with_scores(13, 11);
        let p = game_pressure(&close, Seat::Ai);
        assert!((p - 2.0 / 3.0).abs() < 1e-6);
    }
}
