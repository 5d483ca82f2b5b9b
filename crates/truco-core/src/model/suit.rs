use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Suit {
    Espadas = 0,
    Bastos = 1,
    Oros = 2,
    Copas = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Espadas, Suit::Bastos, Suit::Oros, Suit::Copas];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Suit::Espadas),
            1 => Some(Suit::Bastos),
            2 => Some(Suit::Oros),
            3 => Some(Suit::Copas),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Suit::Espadas => "E",
            Suit::Bastos => "B",
            Suit::Oros => "O",
            Suit::Copas => "C",
        };
        f.write_str(symbol)
    }
}
