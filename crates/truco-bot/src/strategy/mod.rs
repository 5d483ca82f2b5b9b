pub mod card_play;
pub mod envido;
pub mod flor;
pub mod truco;

use crate::reason::{ReasonCode, StrategyCategory};
use crate::reasoning::ReasonFragment;
use serde::{Deserialize, Serialize};
use truco_core::model::Action;

/// A losing candidate retained for explainability, with its modified EV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAlternative {
    pub action: Action,
    pub reason: ReasonCode,
    pub ev: f32,
}

/// A candidate (and ultimately the chosen) move.
///
/// Built fresh per decision, never persisted. `alternatives` stays empty on
/// raw candidates; the evaluator fills it on the winner with the full ranked
/// field it beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiMove {
    pub action: Action,
    pub reason: ReasonCode,
    pub category: StrategyCategory,
    pub reasoning: Vec<ReasonFragment>,
    pub alternatives: Vec<RankedAlternative>,
}

impl AiMove {
    pub fn new(action: Action, reason: ReasonCode) -> Self {
        Self {
            action,
            reason,
            category: reason.category(),
            reasoning: vec![ReasonFragment::template(reason.key())],
            alternatives: Vec::new(),
        }
    }

    pub fn with_note(mut self, fragment: ReasonFragment) -> Self {
        self.reasoning.push(fragment);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use truco_core::model::Seat;

    #[test]
    fn new_move_carries_reason_template() {
        let mv = AiMove::new(
            Action::PlayCard {
                seat: Seat::Ai,
                card_index: 0,
            },
            ReasonCode::DiscardLow,
        );
        assert_eq!(mv.category, StrategyCategory::Safe);
        assert_eq!(mv.reasoning.len(), 1);
        assert!(mv.alternatives.is_empty());
    }
}
