//! Conversation phase state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ClaimError;

/// Where a conversation is in the intake flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    /// Checking the caller is safe before anything else.
    #[default]
    SafetyCheck,
    /// Gathering claim fields.
    Collecting,
    /// Checking the gathered fields for completeness.
    Validating,
    /// Reading the claim back for the caller to confirm.
    Confirming,
    /// The claim has been accepted by the intake API.
    Submitted,
}

impl ConversationPhase {
    /// Get the phase name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationPhase::SafetyCheck => "safety_check",
            ConversationPhase::Collecting => "collecting",
            ConversationPhase::Validating => "validating",
            ConversationPhase::Confirming => "confirming",
            ConversationPhase::Submitted => "submitted",
        }
    }

    /// Whether the flow permits moving from this phase to `to`.
    pub fn can_transition(self, to: ConversationPhase) -> bool {
        use ConversationPhase::*;

        matches!(
            (self, to),
            (SafetyCheck, SafetyCheck)
                | (SafetyCheck, Collecting)
                | (Collecting, Collecting)
                | (Collecting, Validating)
                | (Validating, Collecting)
                | (Validating, Validating)
                | (Validating, Confirming)
                | (Confirming, Collecting)
                | (Confirming, Validating)
                | (Confirming, Confirming)
                | (Confirming, Submitted)
        )
    }

    /// Move to `to`, rejecting transitions the flow does not allow.
    pub fn transition(self, to: ConversationPhase) -> Result<ConversationPhase, ClaimError> {
        if self.can_transition(to) {
            Ok(to)
        } else {
            Err(ClaimError::InvalidTransition { from: self, to })
        }
    }

    /// `Submitted` is terminal.
    pub fn is_terminal(self) -> bool {
        self == ConversationPhase::Submitted
    }
}

impl fmt::Display for ConversationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
