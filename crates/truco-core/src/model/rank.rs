use core::fmt;
use serde::{Deserialize, Serialize};

/// Spanish-deck ranks. Eights and nines do not exist; figures jump to 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[repr(u8)]
pub enum Rank {
    Uno = 1,
    Dos = 2,
    Tres = 3,
    Cuatro = 4,
    Cinco = 5,
    Seis = 6,
    Siete = 7,
    Sota = 10,
    Caballo = 11,
    Rey = 12,
}

impl Rank {
    pub const ORDERED: [Rank; 10] = [
        Rank::Uno,
        Rank::Dos,
        Rank::Tres,
        Rank::Cuatro,
        Rank::Cinco,
        Rank::Seis,
        Rank::Siete,
        Rank::Sota,
        Rank::Caballo,
        Rank::Rey,
    ];

    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Rank::Uno),
            2 => Some(Rank::Dos),
            3 => Some(Rank::Tres),
            4 => Some(Rank::Cuatro),
            5 => Some(Rank::Cinco),
            6 => Some(Rank::Seis),
            7 => Some(Rank::Siete),
            10 => Some(Rank::Sota),
            11 => Some(Rank::Caballo),
            12 => Some(Rank::Rey),
            _ => None,
        }
    }

    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Envido contribution: figures (rank >= 10) count zero, everything else
    /// counts its face value. The ace is rank 1 and contributes 1.
    pub const fn envido_points(self) -> u8 {
        if (self as u8) >= 10 { 0 } else { self as u8 }
    }

    const fn ordinal(self) -> usize {
        match self {
            Rank::Uno => 0,
            Rank::Dos => 1,
            Rank::Tres => 2,
            Rank::Cuatro => 3,
            Rank::Cinco => 4,
            Rank::Seis => 5,
            Rank::Siete => 6,
            Rank::Sota => 7,
            Rank::Caballo => 8,
            Rank::Rey => 9,
        }
    }

    pub(crate) const fn position(self) -> usize {
        self.ordinal()
    }

    pub(crate) const fn from_position(position: usize) -> Option<Self> {
        if position < Self::ORDERED.len() {
            Some(Self::ORDERED[position])
        } else {
            None
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rank::Uno => "1",
            Rank::Dos => "2",
            Rank::Tres => "3",
            Rank::Cuatro => "4",
            Rank::Cinco => "5",
            Rank::Seis => "6",
            Rank::Siete => "7",
            Rank::Sota => "10",
            Rank::Caballo => "11",
            Rank::Rey => "12",
        };
        f.write_str(text)
    }
}
