pub mod action;
pub mod card;
pub mod deck;
pub mod hand;
pub mod phase;
pub mod rank;
pub mod round;
pub mod seat;
pub mod state;
pub mod suit;
pub mod trick;

pub use action::Action;
pub use card::Card;
pub use deck::Deck;
pub use hand::Hand;
pub use phase::GamePhase;
pub use rank::Rank;
pub use round::resolve_round;
pub use seat::Seat;
pub use state::{EnvidoKind, EnvidoState, FlorState, GameState, TrucoState};
pub use suit::Suit;
pub use trick::{TrickSlot, TrickWinner, compare_cards};
