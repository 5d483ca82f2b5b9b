use core::fmt;
use serde::{Deserialize, Serialize};

/// Drives move legality. `Pending` phases wait on the non-caller's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GamePhase {
    Playing,
    EnvidoPending,
    TrucoPending,
    FlorPending,
    ContraflorPending,
    RoundOver,
    GameOver,
}

impl GamePhase {
    pub const fn awaits_response(self) -> bool {
        matches!(
            self,
            GamePhase::EnvidoPending
                | GamePhase::TrucoPending
                | GamePhase::FlorPending
                | GamePhase::ContraflorPending
        )
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, GamePhase::RoundOver | GamePhase::GameOver)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            GamePhase::Playing => "playing",
            GamePhase::EnvidoPending => "envido-pending",
            GamePhase::TrucoPending => "truco-pending",
            GamePhase::FlorPending => "flor-pending",
            GamePhase::ContraflorPending => "contraflor-pending",
            GamePhase::RoundOver => "round-over",
            GamePhase::GameOver => "game-over",
        };
        f.write_str(text)
    }
}
