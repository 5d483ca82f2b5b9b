use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Truco's relative hierarchy, 1 (weakest) through 14 (strongest).
    ///
    /// The order is not monotonic in rank: the ace of espadas beats
    /// everything, the sevens split into true and false sevens, and the
    /// aces of oros/copas rank below the threes. Every strength computation
    /// in the engine composes this mapping.
    pub const fn hierarchy(self) -> u8 {
        match (self.rank, self.suit) {
            (Rank::Uno, Suit::Espadas) => 14,
            (Rank::Uno, Suit::Bastos) => 13,
            (Rank::Siete, Suit::Espadas) => 12,
            (Rank::Siete, Suit::Oros) => 11,
            (Rank::Tres, _) => 10,
            (Rank::Dos, _) => 9,
            (Rank::Uno, _) => 8,
            (Rank::Rey, _) => 7,
            (Rank::Caballo, _) => 6,
            (Rank::Sota, _) => 5,
            (Rank::Siete, _) => 4,
            (Rank::Seis, _) => 3,
            (Rank::Cinco, _) => 2,
            (Rank::Cuatro, _) => 1,
        }
    }

    /// The four bravas: ace of espadas, ace of bastos, seven of espadas,
    /// seven of oros.
    pub const fn is_brava(self) -> bool {
        self.hierarchy() >= 11
    }

    pub const fn envido_points(self) -> u8 {
        self.rank.envido_points()
    }

    /// Stable 0..39 identifier, suit-major.
    pub const fn id(self) -> u8 {
        (self.suit.index() * 10 + self.rank.position()) as u8
    }

    pub const fn from_id(id: u8) -> Option<Self> {
        if id >= 40 {
            return None;
        }
        let suit = match Suit::from_index((id / 10) as usize) {
            Some(suit) => suit,
            None => return None,
        };
        let rank = match Rank::from_position((id % 10) as usize) {
            Some(rank) => rank,
            None => return None,
        };
        Some(Self::new(rank, suit))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}
