use crate::model::card::Card;
use crate::model::seat::Seat;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Who took a trick. A parda (tie) is a first-class outcome in Truco and
/// feeds the round tie-break rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrickWinner {
    Player,
    Ai,
    Tie,
}

impl TrickWinner {
    pub const fn seat(self) -> Option<Seat> {
        match self {
            TrickWinner::Player => Some(Seat::Player),
            TrickWinner::Ai => Some(Seat::Ai),
            TrickWinner::Tie => None,
        }
    }

    pub const fn from_seat(seat: Seat) -> Self {
        match seat {
            Seat::Player => TrickWinner::Player,
            Seat::Ai => TrickWinner::Ai,
        }
    }

    pub const fn is_decisive(self) -> bool {
        !matches!(self, TrickWinner::Tie)
    }
}

impl fmt::Display for TrickWinner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TrickWinner::Player => "player",
            TrickWinner::Ai => "ai",
            TrickWinner::Tie => "tie",
        };
        f.write_str(text)
    }
}

/// One trick slot: each seat plays at most one card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrickSlot {
    pub player: Option<Card>,
    pub ai: Option<Card>,
}

impl TrickSlot {
    pub const EMPTY: TrickSlot = TrickSlot {
        player: None,
        ai: None,
    };

    pub const fn card(&self, seat: Seat) -> Option<Card> {
        match seat {
            Seat::Player => self.player,
            Seat::Ai => self.ai,
        }
    }

    pub fn set_card(&mut self, seat: Seat, card: Card) {
        match seat {
            Seat::Player => self.player = Some(card),
            Seat::Ai => self.ai = Some(card),
        }
    }

    pub const fn is_complete(&self) -> bool {
        self.player.is_some() && self.ai.is_some()
    }

    /// Exactly one side has played.
    pub const fn is_open(&self) -> bool {
        self.player.is_some() != self.ai.is_some()
    }

    pub const fn is_untouched(&self) -> bool {
        self.player.is_none() && self.ai.is_none()
    }

    pub fn winner(&self) -> Option<TrickWinner> {
        match (self.player, self.ai) {
            (Some(p), Some(a)) => Some(compare_cards(p, a)),
            _ => None,
        }
    }
}

/// Resolves a completed trick by relative hierarchy.
pub fn compare_cards(player_card: Card, ai_card: Card) -> TrickWinner {
    use std::cmp::Ordering;
    match player_card.hierarchy().cmp(&ai_card.hierarchy()) {
        Ordering::Greater => TrickWinner::Player,
        Ordering::Less => TrickWinner::Ai,
        Ordering::Equal => TrickWinner::Tie,
    }
}
