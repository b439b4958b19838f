//! Error types for claim state operations.

use thiserror::Error;

use crate::phase::ConversationPhase;

/// Errors raised by claim state operations.
///
/// None of these are fatal to a conversation; the tool layer turns each one
/// into a failure result the voice layer can speak.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    /// A phase transition that the conversation flow does not allow.
    #[error("invalid phase transition: {from} -> {to}")]
    InvalidTransition {
        from: ConversationPhase,
        to: ConversationPhase,
    },

    /// The context lacks fields needed to build a submission payload.
    #[error("missing required claim data: {}", .0.join(", "))]
    MissingData(Vec<String>),
}
