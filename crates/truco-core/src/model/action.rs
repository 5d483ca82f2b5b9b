use crate::model::seat::Seat;
use core::fmt;
use serde::{Deserialize, Serialize};

/// The closed set of moves either seat can propose. Legality is enforced by
/// the reducer in `crate::game`; the engine only ever proposes actions that
/// the current phase/turn combination accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Action {
    PlayCard { seat: Seat, card_index: usize },
    CallEnvido,
    CallRealEnvido,
    CallFaltaEnvido,
    DeclareFlor,
    RespondEnvidoWithFlor,
    AcknowledgeFlor,
    CallContraflor,
    AcceptContraflor,
    DeclineContraflor,
    CallTruco,
    CallRetruco,
    CallValeCuatro,
    Accept,
    Decline,
}

impl Action {
    pub const fn is_envido_call(self) -> bool {
        matches!(
            self,
            Action::CallEnvido | Action::CallRealEnvido | Action::CallFaltaEnvido
        )
    }

    pub const fn is_truco_call(self) -> bool {
        matches!(
            self,
            Action::CallTruco | Action::CallRetruco | Action::CallValeCuatro
        )
    }

    pub const fn is_flor_call(self) -> bool {
        matches!(
            self,
            Action::DeclareFlor | Action::RespondEnvidoWithFlor | Action::CallContraflor
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::PlayCard { seat, card_index } => {
                write!(f, "play-card({seat}, {card_index})")
            }
            Action::CallEnvido => f.write_str("envido"),
            Action::CallRealEnvido => f.write_str("real-envido"),
            Action::CallFaltaEnvido => f.write_str("falta-envido"),
            Action::DeclareFlor => f.write_str("flor"),
            Action::RespondEnvidoWithFlor => f.write_str("flor-over-envido"),
            Action::AcknowledgeFlor => f.write_str("flor-acknowledged"),
            Action::CallContraflor => f.write_str("contraflor"),
            Action::AcceptContraflor => f.write_str("accept-contraflor"),
            Action::DeclineContraflor => f.write_str("decline-contraflor"),
            Action::CallTruco => f.write_str("truco"),
            Action::CallRetruco => f.write_str("retruco"),
            Action::CallValeCuatro => f.write_str("vale-cuatro"),
            Action::Accept => f.write_str("accept"),
            Action::Decline => f.write_str("decline"),
        }
    }
}
