//! The phase-machine reducer. Applies one [`Action`] to a snapshot and
//! returns the successor snapshot; illegal actions are rejected with a
//! [`RuleError`] and the input state is left untouched.
//!
//! The acting seat is always `state.current_turn`; pending phases park play
//! in `return_turn` and hand the turn to the responder.

use crate::eval;
use crate::model::action::Action;
use crate::model::deck::Deck;
use crate::model::phase::GamePhase;
use crate::model::seat::Seat;
use crate::model::state::{EnvidoKind, GameState, TARGET_SCORE};
use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    GameFinished,
    NotYourTurn { expected: Seat, actual: Seat },
    PhaseMismatch { phase: GamePhase },
    InvalidCardIndex { index: usize },
    EnvidoClosed,
    FlorUnavailable,
    TrucoUnavailable,
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::GameFinished => write!(f, "the game is over"),
            RuleError::NotYourTurn { expected, actual } => {
                write!(f, "expected {expected} to act but got {actual}")
            }
            RuleError::PhaseMismatch { phase } => {
                write!(f, "action is not legal during the {phase} phase")
            }
            RuleError::InvalidCardIndex { index } => {
                write!(f, "card index {index} is out of range")
            }
            RuleError::EnvidoClosed => write!(f, "the envido window has closed"),
            RuleError::FlorUnavailable => write!(f, "flor is not available here"),
            RuleError::TrucoUnavailable => write!(f, "truco cannot be raised here"),
        }
    }
}

impl std::error::Error for RuleError {}

/// Applies `action` on behalf of `state.current_turn`.
pub fn apply(state: &GameState, action: Action) -> Result<GameState, RuleError> {
    if state.phase == GamePhase::GameOver {
        return Err(RuleError::GameFinished);
    }
    let mut next = state.clone();
    let actor = next.current_turn;

    match action {
        Action::PlayCard { seat, card_index } => play_card(&mut next, seat, card_index)?,
        Action::CallEnvido => call_envido(&mut next, actor, EnvidoKind::Envido)?,
        Action::CallRealEnvido => call_envido(&mut next, actor, EnvidoKind::RealEnvido)?,
        Action::CallFaltaEnvido => call_envido(&mut next, actor, EnvidoKind::FaltaEnvido)?,
        Action::DeclareFlor => declare_flor(&mut next, actor)?,
        Action::RespondEnvidoWithFlor => respond_envido_with_flor(&mut next, actor)?,
        Action::AcknowledgeFlor => acknowledge_flor(&mut next, actor)?,
        Action::CallContraflor => call_contraflor(&mut next, actor)?,
        Action::AcceptContraflor => resolve_contraflor(&mut next, actor, true)?,
        Action::DeclineContraflor => resolve_contraflor(&mut next, actor, false)?,
        Action::CallTruco => raise_truco(&mut next, actor, 1)?,
        Action::CallRetruco => raise_truco(&mut next, actor, 2)?,
        Action::CallValeCuatro => raise_truco(&mut next, actor, 3)?,
        Action::Accept => accept_pending(&mut next)?,
        Action::Decline => decline_pending(&mut next, actor)?,
    }

    Ok(next)
}

/// Starts the next round: mano rotates, scores and model carry over.
pub fn next_round(state: &GameState, deck: &Deck) -> GameState {
    GameState::deal(
        deck,
        state.mano.opponent(),
        state.scores,
        state.opponent_model.clone(),
    )
}

/// Every action the current seat could legally take. Built by probing the
/// reducer itself so the two can never disagree.
pub fn legal_actions(state: &GameState) -> Vec<Action> {
    let seat = state.current_turn;
    let mut candidates = vec![
        Action::CallEnvido,
        Action::CallRealEnvido,
        Action::CallFaltaEnvido,
        Action::DeclareFlor,
        Action::RespondEnvidoWithFlor,
        Action::AcknowledgeFlor,
        Action::CallContraflor,
        Action::AcceptContraflor,
        Action::DeclineContraflor,
        Action::CallTruco,
        Action::CallRetruco,
        Action::CallValeCuatro,
        Action::Accept,
        Action::Decline,
    ];
    for card_index in 0..state.hand(seat).len() {
        candidates.push(Action::PlayCard { seat, card_index });
    }
    candidates
        .into_iter()
        .filter(|action| apply(state, *action).is_ok())
        .collect()
}

fn play_card(state: &mut GameState, seat: Seat, card_index: usize) -> Result<(), RuleError> {
    if state.phase != GamePhase::Playing {
        return Err(RuleError::PhaseMismatch { phase: state.phase });
    }
    if seat != state.current_turn {
        return Err(RuleError::NotYourTurn {
            expected: state.current_turn,
            actual: seat,
        });
    }
    let card = state.hands[seat.index()]
        .remove_at(card_index)
        .ok_or(RuleError::InvalidCardIndex { index: card_index })?;

    let trick_index = state.current_trick_index();
    state.tricks[trick_index].set_card(seat, card);

    if let Some(winner) = state.tricks[trick_index].winner() {
        state.trick_winners[trick_index] = Some(winner);
        if let Some(round_winner) = state.round_winner() {
            let stake = state.truco.stake();
            finish_round(state, round_winner, stake);
            return Ok(());
        }
        state.current_turn = winner.seat().unwrap_or(state.trick_leader(trick_index));
    } else {
        state.current_turn = seat.opponent();
    }
    Ok(())
}

fn call_envido(state: &mut GameState, actor: Seat, kind: EnvidoKind) -> Result<(), RuleError> {
    let escalating = state.phase == GamePhase::EnvidoPending;
    let primero = state.phase == GamePhase::TrucoPending;
    if !escalating && !primero && state.phase != GamePhase::Playing {
        return Err(RuleError::PhaseMismatch { phase: state.phase });
    }
    if !state.envido_window_open() {
        return Err(RuleError::EnvidoClosed);
    }
    // Escalation is strictly ordered and each rung fires once.
    let legal = match kind {
        EnvidoKind::Envido => state.envido.calls.is_empty(),
        EnvidoKind::RealEnvido => !state.envido.real_called() && !state.envido.falta_called(),
        EnvidoKind::FaltaEnvido => !state.envido.falta_called(),
    };
    if !legal {
        return Err(RuleError::EnvidoClosed);
    }

    if primero {
        // Envido interrupts a fresh truco offer and annuls it; the truco
        // must be re-called after the count.
        if state.truco.pending != Some(1) {
            return Err(RuleError::EnvidoClosed);
        }
        state.truco.pending = None;
        state.truco.last_caller = None;
        state.envido.primero = true;
    } else if !escalating {
        state.return_turn = Some(state.current_turn);
    }

    state.envido.calls.push(kind);
    state.envido.last_caller = Some(actor);
    state.phase = GamePhase::EnvidoPending;
    state.current_turn = actor.opponent();
    Ok(())
}

fn declare_flor(state: &mut GameState, actor: Seat) -> Result<(), RuleError> {
    if state.phase != GamePhase::Playing {
        return Err(RuleError::PhaseMismatch { phase: state.phase });
    }
    if !eval::has_flor(state.initial_hand(actor))
        || state.flor.declared[actor.index()]
        || state.tricks[0].is_complete()
    {
        return Err(RuleError::FlorUnavailable);
    }
    state.flor.declared[actor.index()] = true;
    state.return_turn = Some(state.current_turn);
    state.phase = GamePhase::FlorPending;
    state.current_turn = actor.opponent();
    Ok(())
}

fn respond_envido_with_flor(state: &mut GameState, actor: Seat) -> Result<(), RuleError> {
    if state.phase != GamePhase::EnvidoPending {
        return Err(RuleError::PhaseMismatch { phase: state.phase });
    }
    if !eval::has_flor(state.initial_hand(actor)) {
        return Err(RuleError::FlorUnavailable);
    }
    // Flor kills the envido outright; no envido points change hands.
    state.envido.calls.clear();
    state.envido.last_caller = None;
    state.flor.declared[actor.index()] = true;
    state.phase = GamePhase::FlorPending;
    state.current_turn = actor.opponent();
    Ok(())
}

fn acknowledge_flor(state: &mut GameState, actor: Seat) -> Result<(), RuleError> {
    if state.phase != GamePhase::FlorPending {
        return Err(RuleError::PhaseMismatch { phase: state.phase });
    }
    let declarer = actor.opponent();
    state.flor.acknowledged = true;
    award_points(state, declarer, 3);
    if state.phase != GamePhase::GameOver {
        resume_play(state);
    }
    Ok(())
}

fn call_contraflor(state: &mut GameState, actor: Seat) -> Result<(), RuleError> {
    if state.phase != GamePhase::FlorPending {
        return Err(RuleError::PhaseMismatch { phase: state.phase });
    }
    if !eval::has_flor(state.initial_hand(actor)) || state.flor.contraflor_called {
        return Err(RuleError::FlorUnavailable);
    }
    state.flor.declared[actor.index()] = true;
    state.flor.contraflor_called = true;
    state.phase = GamePhase::ContraflorPending;
    state.current_turn = actor.opponent();
    Ok(())
}

fn resolve_contraflor(state: &mut GameState, actor: Seat, accepted: bool) -> Result<(), RuleError> {
    if state.phase != GamePhase::ContraflorPending {
        return Err(RuleError::PhaseMismatch { phase: state.phase });
    }
    state.flor.contraflor_accepted = Some(accepted);
    if accepted {
        let mine = eval::flor_value(state.initial_hand(actor));
        let theirs = eval::flor_value(state.initial_hand(actor.opponent()));
        let winner = if mine > theirs {
            actor
        } else if theirs > mine {
            actor.opponent()
        } else {
            state.mano
        };
        award_points(state, winner, 6);
    } else {
        // Declining a contraflor concedes the flor duel at reduced stakes.
        award_points(state, actor.opponent(), 4);
    }
    if state.phase != GamePhase::GameOver {
        resume_play(state);
    }
    Ok(())
}

fn raise_truco(state: &mut GameState, actor: Seat, level: u8) -> Result<(), RuleError> {
    match state.phase {
        GamePhase::Playing => {
            if !state.truco.may_raise(actor) || state.truco.level + 1 != level {
                return Err(RuleError::TrucoUnavailable);
            }
            state.return_turn = Some(state.current_turn);
        }
        GamePhase::TrucoPending => {
            // Counter-raise instead of accepting.
            match state.truco.pending {
                Some(pending) if pending + 1 == level && level <= 3 => {}
                _ => return Err(RuleError::TrucoUnavailable),
            }
        }
        phase => return Err(RuleError::PhaseMismatch { phase }),
    }
    state.truco.pending = Some(level);
    state.truco.last_caller = Some(actor);
    state.phase = GamePhase::TrucoPending;
    state.current_turn = actor.opponent();
    Ok(())
}

fn accept_pending(state: &mut GameState) -> Result<(), RuleError> {
    match state.phase {
        GamePhase::EnvidoPending => {
            state.envido.accepted = true;
            let points = state.envido.points_if_accepted(state.scores);
            settle_envido_count(state, points);
            if state.phase != GamePhase::GameOver {
                resume_play(state);
            }
            Ok(())
        }
        GamePhase::TrucoPending => {
            let level = state.truco.pending.take().unwrap_or(state.truco.level);
            state.truco.level = level;
            resume_play(state);
            Ok(())
        }
        phase => Err(RuleError::PhaseMismatch { phase }),
    }
}

fn decline_pending(state: &mut GameState, actor: Seat) -> Result<(), RuleError> {
    match state.phase {
        GamePhase::EnvidoPending => {
            state.envido.declined = true;
            let caller = state.envido.last_caller.unwrap_or(actor.opponent());
            let points = state.envido.points_if_declined();
            award_points(state, caller, points);
            if state.phase != GamePhase::GameOver {
                resume_play(state);
            }
            Ok(())
        }
        GamePhase::TrucoPending => {
            let caller = state.truco.last_caller.unwrap_or(actor.opponent());
            let points = state.truco.decline_points();
            finish_round(state, caller, points);
            Ok(())
        }
        phase => Err(RuleError::PhaseMismatch { phase }),
    }
}

/// Runs the count after an accepted envido: higher value wins, mano wins
/// ties, and only the winner shows their value.
fn settle_envido_count(state: &mut GameState, points: u8) {
    let player_value = eval::envido_value(state.initial_hand(Seat::Player));
    let ai_value = eval::envido_value(state.initial_hand(Seat::Ai));
    let winner = if player_value > ai_value {
        Seat::Player
    } else if ai_value > player_value {
        Seat::Ai
    } else {
        state.mano
    };
    let value = match winner {
        Seat::Player => player_value,
        Seat::Ai => ai_value,
    };
    state.envido.declared[winner.index()] = Some(value);
    award_points(state, winner, points);
}

fn resume_play(state: &mut GameState) {
    state.phase = GamePhase::Playing;
    if let Some(turn) = state.return_turn.take() {
        state.current_turn = turn;
    }
}

fn award_points(state: &mut GameState, seat: Seat, points: u8) {
    state.scores[seat.index()] =
        (state.scores[seat.index()] + points).min(TARGET_SCORE);
    if state.scores[seat.index()] >= TARGET_SCORE {
        state.phase = GamePhase::GameOver;
    }
}

fn finish_round(state: &mut GameState, winner: Seat, points: u8) {
    award_points(state, winner, points);
    if state.phase != GamePhase::GameOver {
        state.phase = GamePhase::RoundOver;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    /// Player (mano): strong truco hand, no envido pair.
    /// Ai: envido 27 in oros, weak truco cards.
    fn fixture() -> GameState {
        GameState::from_hands(
            vec![
                card(Rank::Uno, Suit::Espadas),
                card(Rank::Tres, Suit::Bastos),
                card(Rank::Cuatro, Suit::Copas),
            ],
            vec![
                card(Rank::Siete, Suit::Oros),
                card(Rank::Rey, Suit::Oros),
                card(Rank::Cinco, Suit::Bastos),
            ],
            Seat::Player,
        )
    }

    #[test]
    fn play_card_advances_turn_and_resolves_trick() {
        let state = fixture();
        let after_lead = apply(
            &state,
            Action::PlayCard {
                seat: Seat::Player,
                card_index: 2,
            },
        )
        .expect("mano leads");
        assert_eq!(after_lead.current_turn, Seat::Ai);
        assert!(after_lead.tricks[0].is_open());

        let after_follow = apply(
            &after_lead,
            Action::PlayCard {
                seat: Seat::Ai,
                card_index: 2,
            },
        )
        .expect("ai follows");
        // 4 of copas (1) loses to 5 of bastos (2).
        assert_eq!(
            after_follow.trick_winners[0],
            Some(crate::model::trick::TrickWinner::Ai)
        );
        assert_eq!(after_follow.current_turn, Seat::Ai);
        assert!(after_follow.validate().is_ok());
    }

    #[test]
    fn round_ends_after_two_decisive_tricks() {
        let mut state = fixture();
        // Player takes tricks 1 and 2 with the macho and a tres.
        for (p_idx, a_idx) in [(0usize, 0usize), (0, 0)] {
            state = apply(
                &state,
                Action::PlayCard {
                    seat: Seat::Player,
                    card_index: p_idx,
                },
            )
            .unwrap();
            state = apply(
                &state,
                Action::PlayCard {
                    seat: Seat::Ai,
                    card_index: a_idx,
                },
            )
            .unwrap();
        }
        assert_eq!(state.phase, GamePhase::RoundOver);
        assert_eq!(state.score(Seat::Player), 1);
        assert_eq!(state.score(Seat::Ai), 0);
    }

    #[test]
    fn envido_accept_counts_and_awards() {
        let state = fixture();
        let called = apply(&state, Action::CallEnvido).expect("mano calls envido");
        assert_eq!(called.phase, GamePhase::EnvidoPending);
        assert_eq!(called.current_turn, Seat::Ai);

        let accepted = apply(&called, Action::Accept).expect("ai accepts");
        // Ai's 27 beats player's envido-poor hand.
        assert_eq!(accepted.score(Seat::Ai), 2);
        assert_eq!(accepted.score(Seat::Player), 0);
        assert_eq!(accepted.envido.declared[Seat::Ai.index()], Some(27));
        assert_eq!(accepted.phase, GamePhase::Playing);
        assert_eq!(accepted.current_turn, Seat::Player);
    }

    #[test]
    fn envido_decline_awards_single_point() {
        let state = fixture();
        let called = apply(&state, Action::CallEnvido).unwrap();
        let declined = apply(&called, Action::Decline).unwrap();
        assert_eq!(declined.score(Seat::Player), 1);
        assert!(declined.envido.declined);
        assert!(!declined.envido_window_open());
    }

    #[test]
    fn envido_escalation_raises_stakes() {
        let state = fixture();
        let called = apply(&state, Action::CallEnvido).unwrap();
        let raised = apply(&called, Action::CallRealEnvido).expect("responder raises");
        assert_eq!(raised.phase, GamePhase::EnvidoPending);
        assert_eq!(raised.current_turn, Seat::Player);
        let accepted = apply(&raised, Action::Accept).unwrap();
        assert_eq!(accepted.score(Seat::Ai), 5);
    }

    #[test]
    fn envido_window_closes_after_first_trick() {
        let mut state = fixture();
        state = apply(
            &state,
            Action::PlayCard {
                seat: Seat::Player,
                card_index: 0,
            },
        )
        .unwrap();
        state = apply(
            &state,
            Action::PlayCard {
                seat: Seat::Ai,
                card_index: 0,
            },
        )
        .unwrap();
        assert!(matches!(
            apply(&state, Action::CallEnvido),
            Err(RuleError::EnvidoClosed)
        ));
    }

    #[test]
    fn truco_decline_ends_round_for_caller() {
        let state = fixture();
        let called = apply(&state, Action::CallTruco).expect("player calls truco");
        assert_eq!(called.phase, GamePhase::TrucoPending);
        let folded = apply(&called, Action::Decline).unwrap();
        assert_eq!(folded.phase, GamePhase::RoundOver);
        assert_eq!(folded.score(Seat::Player), 1);
    }

    #[test]
    fn truco_accept_restores_turn_and_raises_stake() {
        let state = fixture();
        let called = apply(&state, Action::CallTruco).unwrap();
        let accepted = apply(&called, Action::Accept).unwrap();
        assert_eq!(accepted.truco.level, 1);
        assert_eq!(accepted.truco.stake(), 2);
        assert_eq!(accepted.current_turn, Seat::Player);
        assert_eq!(accepted.phase, GamePhase::Playing);
    }

    #[test]
    fn truco_counter_raise_chains() {
        let state = fixture();
        let truco = apply(&state, Action::CallTruco).unwrap();
        let retruco = apply(&truco, Action::CallRetruco).expect("counter-raise");
        assert_eq!(retruco.truco.pending, Some(2));
        assert_eq!(retruco.current_turn, Seat::Player);
        let vale = apply(&retruco, Action::CallValeCuatro).expect("re-counter");
        let accepted = apply(&vale, Action::Accept).unwrap();
        assert_eq!(accepted.truco.level, 3);
        assert_eq!(accepted.truco.stake(), 4);
    }

    #[test]
    fn own_raise_cannot_be_raised_again_by_caller() {
        let state = fixture();
        let truco = apply(&state, Action::CallTruco).unwrap();
        let accepted = apply(&truco, Action::Accept).unwrap();
        // Player called truco; only the Ai may retruco now.
        let err = apply(&accepted, Action::CallRetruco);
        assert!(matches!(err, Err(RuleError::TrucoUnavailable)));
    }

    #[test]
    fn envido_primero_annuls_fresh_truco_offer() {
        let state = fixture();
        let truco = apply(&state, Action::CallTruco).unwrap();
        let envido = apply(&truco, Action::CallEnvido).expect("envido primero");
        assert!(envido.envido.primero);
        assert_eq!(envido.truco.pending, None);
        assert_eq!(envido.phase, GamePhase::EnvidoPending);
        assert_eq!(envido.current_turn, Seat::Player);
    }

    #[test]
    fn flor_declaration_and_acknowledgement() {
        let state = GameState::from_hands(
            vec![
                card(Rank::Uno, Suit::Espadas),
                card(Rank::Tres, Suit::Espadas),
                card(Rank::Cinco, Suit::Espadas),
            ],
            vec![
                card(Rank::Siete, Suit::Oros),
                card(Rank::Rey, Suit::Bastos),
                card(Rank::Cinco, Suit::Copas),
            ],
            Seat::Player,
        );
        let declared = apply(&state, Action::DeclareFlor).expect("mano declares flor");
        assert_eq!(declared.phase, GamePhase::FlorPending);
        let acked = apply(&declared, Action::AcknowledgeFlor).unwrap();
        assert_eq!(acked.score(Seat::Player), 3);
        assert_eq!(acked.phase, GamePhase::Playing);
        assert!(!acked.envido_window_open());
    }

    #[test]
    fn contraflor_showdown_uses_mano_tiebreak() {
        let state = GameState::from_hands(
            vec![
                card(Rank::Uno, Suit::Espadas),
                card(Rank::Tres, Suit::Espadas),
                card(Rank::Cinco, Suit::Espadas),
            ],
            vec![
                card(Rank::Uno, Suit::Oros),
                card(Rank::Tres, Suit::Oros),
                card(Rank::Cinco, Suit::Oros),
            ],
            Seat::Ai,
        );
        // Ai is mano here but Player declares first.
        let mut opening = state.clone();
        opening.current_turn = Seat::Player;
        let declared = apply(&opening, Action::DeclareFlor).unwrap();
        let contraflor = apply(&declared, Action::CallContraflor).expect("ai has flor too");
        assert_eq!(contraflor.phase, GamePhase::ContraflorPending);
        let resolved = apply(&contraflor, Action::AcceptContraflor).unwrap();
        // Equal flor values (29): mano (Ai) takes the 6 points.
        assert_eq!(resolved.score(Seat::Ai), 6);
        assert_eq!(resolved.score(Seat::Player), 0);
    }

    #[test]
    fn game_over_caps_score_and_blocks_actions() {
        let mut state = fixture();
        state.scores = [14, 10];
        let truco = apply(&state, Action::CallTruco).unwrap();
        let folded = apply(&truco, Action::Decline).unwrap();
        assert_eq!(folded.phase, GamePhase::GameOver);
        assert_eq!(folded.score(Seat::Player), 15);
        assert!(matches!(
            apply(&folded, Action::CallTruco),
            Err(RuleError::GameFinished)
        ));
    }

    #[test]
    fn legal_actions_match_reducer_acceptance() {
        let state = fixture();
        let legal = legal_actions(&state);
        assert!(legal.contains(&Action::CallEnvido));
        assert!(legal.contains(&Action::CallTruco));
        assert!(legal.contains(&Action::PlayCard {
            seat: Seat::Player,
            card_index: 0
        }));
        assert!(!legal.contains(&Action::Accept));
        assert!(!legal.contains(&Action::DeclareFlor));
        for action in legal {
            assert!(apply(&state, action).is_ok());
        }
    }

    #[test]
    fn next_round_rotates_mano_and_keeps_scores() {
        let mut state = fixture();
        state.scores = [3, 7];
        let deck = Deck::shuffled_with_seed(77);
        let fresh = next_round(&state, &deck);
        assert_eq!(fresh.mano, Seat::Ai);
        assert_eq!(fresh.scores, [3, 7]);
        assert_eq!(fresh.phase, GamePhase::Playing);
        assert!(fresh.validate().is_ok());
    }
}
