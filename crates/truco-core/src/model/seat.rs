use core::fmt;
use serde::{Deserialize, Serialize};

/// One side of a heads-up match. The human (or external) side is `Player`;
/// the engine side is `Ai`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Seat {
    Player = 0,
    Ai = 1,
}

impl Seat {
    pub const BOTH: [Seat; 2] = [Seat::Player, Seat::Ai];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Seat::Player),
            1 => Some(Seat::Ai),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn opponent(self) -> Seat {
        match self {
            Seat::Player => Seat::Ai,
            Seat::Ai => Seat::Player,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Seat::Player => "player",
            Seat::Ai => "ai",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::Seat;

    #[test]
    fn opponent_flips() {
        assert_eq!(Seat::Player.opponent(), Seat::Ai);
        assert_eq!(Seat::Ai.opponent(), Seat::Player);
    }

    #[test]
    fn from_index_maps() {
        assert_eq!(Seat::from_index(1), Some(Seat::Ai));
        assert_eq!(Seat::from_index(2), None);
    }
}
