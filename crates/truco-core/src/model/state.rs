use crate::belief::{HandProbabilities, OpponentModel};
use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::phase::GamePhase;
use crate::model::round::resolve_round;
use crate::model::seat::Seat;
use crate::model::trick::{TrickSlot, TrickWinner};
use core::fmt;
use serde::{Deserialize, Serialize};
use std::array;

/// Games are played to 15; the endgame tension threshold sits at 12.
pub const TARGET_SCORE: u8 = 15;
pub const ENDGAME_SCORE: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvidoKind {
    Envido,
    RealEnvido,
    FaltaEnvido,
}

/// Envido call ladder and outcome for the current round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvidoState {
    pub calls: Vec<EnvidoKind>,
    pub last_caller: Option<Seat>,
    pub accepted: bool,
    pub declined: bool,
    /// Values shown at the count, by seat index.
    pub declared: [Option<u8>; 2],
    /// The call interrupted a pending truco offer ("envido primero").
    pub primero: bool,
}

impl EnvidoState {
    pub fn envido_called(&self) -> bool {
        self.calls.contains(&EnvidoKind::Envido)
    }

    pub fn real_called(&self) -> bool {
        self.calls.contains(&EnvidoKind::RealEnvido)
    }

    pub fn falta_called(&self) -> bool {
        self.calls.contains(&EnvidoKind::FaltaEnvido)
    }

    pub fn resolved(&self) -> bool {
        self.accepted || self.declined
    }

    /// Points the caller collects if the responder declines now.
    pub fn points_if_declined(&self) -> u8 {
        if self.calls.len() <= 1 {
            1
        } else {
            self.calls[..self.calls.len() - 1]
                .iter()
                .map(|kind| match kind {
                    EnvidoKind::Envido => 2,
                    EnvidoKind::RealEnvido => 3,
                    // A declined ladder never cashes the falta itself.
                    EnvidoKind::FaltaEnvido => 0,
                })
                .sum::<u8>()
                .max(1)
        }
    }

    /// Points at stake if the responder accepts, given current scores.
    pub fn points_if_accepted(&self, scores: [u8; 2]) -> u8 {
        self.calls
            .iter()
            .map(|kind| match kind {
                EnvidoKind::Envido => 2,
                EnvidoKind::RealEnvido => 3,
                EnvidoKind::FaltaEnvido => {
                    TARGET_SCORE.saturating_sub(scores[0].max(scores[1])).max(1)
                }
            })
            .sum()
    }
}

/// Flor declarations and the contraflor sub-duel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlorState {
    pub declared: [bool; 2],
    pub acknowledged: bool,
    pub contraflor_called: bool,
    pub contraflor_accepted: Option<bool>,
}

impl FlorState {
    pub fn any_declared(&self) -> bool {
        self.declared[0] || self.declared[1]
    }

    pub fn resolved(&self) -> bool {
        self.acknowledged || self.contraflor_accepted.is_some()
    }
}

/// Truco escalation ladder: accepted level 0..=3, plus at most one offer in
/// flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrucoState {
    pub level: u8,
    pub pending: Option<u8>,
    pub last_caller: Option<Seat>,
}

impl TrucoState {
    pub const STAKES: [u8; 4] = [1, 2, 3, 4];

    /// Round stake at the currently accepted level.
    pub fn stake(&self) -> u8 {
        Self::STAKES[self.level as usize]
    }

    /// Points the caller collects if the pending offer is declined.
    pub fn decline_points(&self) -> u8 {
        match self.pending {
            Some(level) => Self::STAKES[(level as usize).saturating_sub(1).min(3)].max(1),
            None => self.stake(),
        }
    }

    pub fn may_raise(&self, seat: Seat) -> bool {
        self.pending.is_none() && self.level < 3 && self.last_caller != Some(seat)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    HandCardMismatch { seat: Seat },
    InitialHandSize { seat: Seat },
    MultipleOpenTricks,
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::HandCardMismatch { seat } => {
                write!(f, "{seat} hand length plus played cards is not 3")
            }
            StateError::InitialHandSize { seat } => {
                write!(f, "{seat} initial hand does not hold 3 cards")
            }
            StateError::MultipleOpenTricks => write!(f, "more than one trick is half-played"),
        }
    }
}

impl std::error::Error for StateError {}

/// Complete read-only snapshot of a round in progress.
///
/// The decision engine consumes this and returns [`crate::model::Action`]
/// values; only the reducer in [`crate::game`] produces new snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub hands: [Hand; 2],
    pub initial_hands: [Hand; 2],
    pub tricks: [TrickSlot; 3],
    pub trick_winners: [Option<TrickWinner>; 3],
    pub scores: [u8; 2],
    pub mano: Seat,
    pub current_turn: Seat,
    pub phase: GamePhase,
    pub envido: EnvidoState,
    pub flor: FlorState,
    pub truco: TrucoState,
    /// Whose turn play resumes on once a pending call resolves.
    pub return_turn: Option<Seat>,
    /// Long-lived behavioral statistics about the non-AI seat; carried
    /// across rounds and games by the host.
    pub opponent_model: OpponentModel,
    /// Derived distribution over the opponent's unseen cards. Replaced
    /// wholesale whenever new information arrives, never edited in place.
    pub opponent_probabilities: Option<HandProbabilities>,
}

impl GameState {
    /// Deals a fresh round. Cards alternate starting with the mano.
    pub fn deal(deck: &Deck, mano: Seat, scores: [u8; 2], model: OpponentModel) -> Self {
        let mut hands = [Hand::new(), Hand::new()];
        let order = [mano, mano.opponent()];
        for (i, card) in deck.cards().iter().take(6).enumerate() {
            hands[order[i % 2].index()].add(*card);
        }
        let initial_hands = hands.clone();
        Self {
            hands,
            initial_hands,
            tricks: [TrickSlot::EMPTY; 3],
            trick_winners: [None; 3],
            scores,
            mano,
            current_turn: mano,
            phase: GamePhase::Playing,
            envido: EnvidoState::default(),
            flor: FlorState::default(),
            truco: TrucoState::default(),
            return_turn: None,
            opponent_model: model,
            opponent_probabilities: None,
        }
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn initial_hand(&self, seat: Seat) -> &Hand {
        &self.initial_hands[seat.index()]
    }

    pub fn score(&self, seat: Seat) -> u8 {
        self.scores[seat.index()]
    }

    pub fn score_diff(&self, seat: Seat) -> i16 {
        self.score(seat) as i16 - self.score(seat.opponent()) as i16
    }

    pub fn is_endgame(&self) -> bool {
        self.scores[0].max(self.scores[1]) >= ENDGAME_SCORE
    }

    /// Index of the trick currently being played, clamped to the last slot.
    pub fn current_trick_index(&self) -> usize {
        self.tricks
            .iter()
            .position(|slot| !slot.is_complete())
            .unwrap_or(2)
            .min(2)
    }

    pub fn current_trick(&self) -> &TrickSlot {
        &self.tricks[self.current_trick_index()]
    }

    /// Who leads the given trick: the mano opens, then the previous trick's
    /// winner; a parda leaves the lead where it was.
    pub fn trick_leader(&self, index: usize) -> Seat {
        if index == 0 {
            return self.mano;
        }
        match self.trick_winners[index - 1].and_then(TrickWinner::seat) {
            Some(winner) => winner,
            None => self.trick_leader(index - 1),
        }
    }

    /// True when `seat` is opening the current trick rather than responding.
    pub fn is_leading(&self, seat: Seat) -> bool {
        self.current_trick().card(seat.opponent()).is_none()
    }

    pub fn cards_played(&self, seat: Seat) -> Vec<Card> {
        self.tricks
            .iter()
            .filter_map(|slot| slot.card(seat))
            .collect()
    }

    /// Every card `perspective` has direct knowledge of: its own initial
    /// hand plus everything the opponent has put on the table.
    pub fn seen_cards(&self, perspective: Seat) -> Vec<Card> {
        let mut seen: Vec<Card> = self.initial_hand(perspective).cards().to_vec();
        seen.extend(self.cards_played(perspective.opponent()));
        seen
    }

    pub fn unseen_cards(&self, perspective: Seat) -> Vec<Card> {
        let seen = self.seen_cards(perspective);
        Deck::standard()
            .cards()
            .iter()
            .copied()
            .filter(|card| !seen.contains(card))
            .collect()
    }

    pub fn round_winner(&self) -> Option<Seat> {
        resolve_round(&self.trick_winners, self.mano)
    }

    /// Envido may only be raised while the first trick is unfinished and no
    /// flor has preempted it.
    pub fn envido_window_open(&self) -> bool {
        !self.tricks[0].is_complete() && !self.envido.resolved() && !self.flor.any_declared()
    }

    pub fn validate(&self) -> Result<(), StateError> {
        for seat in Seat::BOTH {
            if self.initial_hand(seat).len() != 3 {
                return Err(StateError::InitialHandSize { seat });
            }
            let played = self.cards_played(seat).len();
            if self.hand(seat).len() + played != 3 {
                return Err(StateError::HandCardMismatch { seat });
            }
        }
        let open = self.tricks.iter().filter(|slot| slot.is_open()).count();
        if open > 1 {
            return Err(StateError::MultipleOpenTricks);
        }
        Ok(())
    }

    /// Test/fixture constructor from explicit hands.
    pub fn from_hands(player: Vec<Card>, ai: Vec<Card>, mano: Seat) -> Self {
        let hands = [Hand::with_cards(player), Hand::with_cards(ai)];
        let initial_hands = hands.clone();
        Self {
            hands,
            initial_hands,
            tricks: array::from_fn(|_| TrickSlot::EMPTY),
            trick_winners: [None; 3],
            scores: [0, 0],
            mano,
            current_turn: mano,
            phase: GamePhase::Playing,
            envido: EnvidoState::default(),
            flor: FlorState::default(),
            truco: TrucoState::default(),
            return_turn: None,
            opponent_model: OpponentModel::default(),
            opponent_probabilities: None,
        }
    }
}
