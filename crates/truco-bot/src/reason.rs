use serde::{Deserialize, Serialize};

/// Broad shape of a candidate move, used for case retention and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyCategory {
    Safe,
    Aggressive,
    Deceptive,
}

/// Closed set of decision rationales.
///
/// Every variant must have an EV mapping in the evaluator and an archetype
/// multiplier (possibly the default); the exhaustive matches there keep the
/// two tables honest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    // Card play.
    WinRoundOutright,
    CheapestWinner,
    DiscardLow,
    LeadStrongest,
    LeadToWin,
    HideEnvidoStrength,
    SacrificialBait,
    LopsidedProbe,
    PardaYCanto,
    // Envido.
    EnvidoValueCall,
    EnvidoEscalate,
    EnvidoBluff,
    EnvidoAccept,
    EnvidoDecline,
    FlorOverEnvido,
    // Flor.
    FlorDeclare,
    FlorUndersell,
    FlorAcknowledge,
    ContraflorCall,
    ContraflorAccept,
    ContraflorDecline,
    // Truco.
    TrucoCertainWin,
    TrucoEliteCall,
    TrucoValueCall,
    TrucoBluff,
    TrucoDesperateBluff,
    TrucoMixedSignal,
    TrucoAccept,
    TrucoFoldWeak,
    TrucoFoldCertainLoss,
}

impl ReasonCode {
    pub const fn category(self) -> StrategyCategory {
        use ReasonCode::*;
        match self {
            HideEnvidoStrength | SacrificialBait | LopsidedProbe | PardaYCanto | EnvidoBluff
            | FlorUndersell | TrucoBluff | TrucoDesperateBluff | TrucoMixedSignal => {
                StrategyCategory::Deceptive
            }
            EnvidoEscalate | TrucoEliteCall | TrucoValueCall | ContraflorCall => {
                StrategyCategory::Aggressive
            }
            WinRoundOutright | CheapestWinner | DiscardLow | LeadStrongest | LeadToWin
            | EnvidoValueCall | EnvidoAccept | EnvidoDecline | FlorOverEnvido | FlorDeclare
            | FlorAcknowledge | ContraflorAccept | ContraflorDecline | TrucoCertainWin
            | TrucoAccept | TrucoFoldWeak | TrucoFoldCertainLoss => StrategyCategory::Safe,
        }
    }

    /// Stable key for logging and case records.
    pub const fn key(self) -> &'static str {
        use ReasonCode::*;
        match self {
            WinRoundOutright => "play_card_certain_win",
            CheapestWinner => "play_cheapest_winner",
            DiscardLow => "discard_low",
            LeadStrongest => "lead_strongest",
            LeadToWin => "lead_to_win",
            HideEnvidoStrength => "hide_envido_strength",
            SacrificialBait => "sacrificial_bait",
            LopsidedProbe => "lopsided_probe",
            PardaYCanto => "parda_y_canto",
            EnvidoValueCall => "envido_value_call",
            EnvidoEscalate => "envido_escalate",
            EnvidoBluff => "envido_bluff",
            EnvidoAccept => "envido_accept",
            EnvidoDecline => "envido_decline",
            FlorOverEnvido => "flor_over_envido",
            FlorDeclare => "flor_declare",
            FlorUndersell => "flor_undersell",
            FlorAcknowledge => "flor_acknowledge",
            ContraflorCall => "contraflor_call",
            ContraflorAccept => "contraflor_accept",
            ContraflorDecline => "contraflor_decline",
            TrucoCertainWin => "truco_certain_win",
            TrucoEliteCall => "truco_elite_call",
            TrucoValueCall => "truco_value_call",
            TrucoBluff => "truco_bluff",
            TrucoDesperateBluff => "truco_desperate_bluff",
            TrucoMixedSignal => "truco_mixed_signal",
            TrucoAccept => "truco_accept",
            TrucoFoldWeak => "truco_fold_weak",
            TrucoFoldCertainLoss => "truco_fold_certain_loss",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ReasonCode, StrategyCategory};

    #[test]
    fn deception_tactics_are_categorized_deceptive() {
        assert_eq!(
            ReasonCode::SacrificialBait.category(),
            StrategyCategory::Deceptive
        );
        assert_eq!(
            ReasonCode::TrucoMixedSignal.category(),
            StrategyCategory::Deceptive
        );
        assert_eq!(ReasonCode::DiscardLow.category(), StrategyCategory::Safe);
    }

    #[test]
    fn keys_are_unique() {
        use std::collections::HashSet;
        let all = [
            ReasonCode::WinRoundOutright,
            ReasonCode::CheapestWinner,
            ReasonCode::DiscardLow,
            ReasonCode::LeadStrongest,
            ReasonCode::LeadToWin,
            ReasonCode::HideEnvidoStrength,
            ReasonCode::SacrificialBait,
            ReasonCode::LopsidedProbe,
            ReasonCode::PardaYCanto,
            ReasonCode::EnvidoValueCall,
            ReasonCode::EnvidoEscalate,
            ReasonCode::EnvidoBluff,
            ReasonCode::EnvidoAccept,
            ReasonCode::EnvidoDecline,
            ReasonCode::FlorOverEnvido,
            ReasonCode::FlorDeclare,
            ReasonCode::FlorUndersell,
            ReasonCode::FlorAcknowledge,
            ReasonCode::ContraflorCall,
            ReasonCode::ContraflorAccept,
            ReasonCode::ContraflorDecline,
            ReasonCode::TrucoCertainWin,
            ReasonCode::TrucoEliteCall,
            ReasonCode::TrucoValueCall,
            ReasonCode::TrucoBluff,
            ReasonCode::TrucoDesperateBluff,
            ReasonCode::TrucoMixedSignal,
            ReasonCode::TrucoAccept,
            ReasonCode::TrucoFoldWeak,
            ReasonCode::TrucoFoldCertainLoss,
        ];
        let keys: HashSet<_> = all.iter().map(|r| r.key()).collect();
        assert_eq!(keys.len(), all.len());
    }
}
