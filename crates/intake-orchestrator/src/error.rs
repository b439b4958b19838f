//! Error types for orchestrator operations.

use claim_core::{ClaimError, ConversationPhase};
use fnol_tools::ToolError;
use thiserror::Error;

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Tool setup failed.
    #[error("tool setup failed: {0}")]
    Setup(#[from] ToolError),

    /// A claim tool was called before the caller's safety was confirmed.
    #[error("safety has not been confirmed for this call")]
    SafetyNotConfirmed,

    /// The tool is not allowed in the session's current phase.
    #[error(transparent)]
    Phase(#[from] ClaimError),

    /// Submission was attempted before the claim was read back.
    #[error("claim must be confirmed before submission (current phase: {0})")]
    NotConfirmed(ConversationPhase),
}

impl OrchestratorError {
    /// The sentence the voice layer speaks when a call is rejected.
    pub fn spoken_message(&self) -> &'static str {
        match self {
            OrchestratorError::Setup(_) => {
                "An unexpected error occurred. Please try again or contact support."
            }
            OrchestratorError::SafetyNotConfirmed => {
                "Before we go over your claim, I need to make sure everyone is safe. Are you and everyone involved okay?"
            }
            OrchestratorError::Phase(_) => "That step isn't available at this point in the call.",
            OrchestratorError::NotConfirmed(_) => {
                "Before I submit, let's go over the claim details together to make sure they're right."
            }
        }
    }
}
