//! Error types for the orchestration loop.

use lumen_core::ConversationError;
use thiserror::Error;

use crate::model::ModelError;

/// Fatal failures of an agent run.
///
/// Tool failures never appear here: they are contained as error-status tool
/// results inside the conversation.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Loop configuration is unusable.
    #[error("Invalid loop configuration: {0}")]
    InvalidConfig(String),

    /// A turn broke the conversation structure.
    #[error("Conversation rejected turn: {0}")]
    Conversation(#[from] ConversationError),

    /// The model signaled tool use without emitting any invocation.
    #[error("Model indicated tool use but no tool invocations were found")]
    NoToolInvocations,

    /// The model stopped for a reason the loop cannot continue from.
    #[error("Model stopped for an unsupported reason: {reason}")]
    UnexpectedStop { reason: String },

    /// The iteration bound was reached without a final answer.
    #[error("Max iterations ({limit}) exceeded")]
    IterationBoundExceeded { limit: usize },

    /// The model endpoint failed.
    #[error(transparent)]
    Transport(#[from] ModelError),
}

impl AgentError {
    /// Whether retrying the whole run could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AgentError::Transport(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Model misbehavior, as opposed to transport or configuration problems.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            AgentError::NoToolInvocations | AgentError::UnexpectedStop { .. }
        )
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AgentError::InvalidConfig(_) => "INVALID_CONFIG",
            AgentError::Conversation(_) => "INVALID_CONVERSATION",
            AgentError::NoToolInvocations => "PROTOCOL_VIOLATION",
            AgentError::UnexpectedStop { .. } => "UNEXPECTED_STOP",
            AgentError::IterationBoundExceeded { .. } => "ITERATION_LIMIT",
            AgentError::Transport(_) => "TRANSPORT_FAILURE",
        }
    }
}

/// Result type for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            AgentError::IterationBoundExceeded { limit: 10 }.to_string(),
            "Max iterations (10) exceeded"
        );
    }

    #[test]
    fn test_transport_is_transparent() {
        let err = AgentError::from(ModelError::EmptyResponse);
        assert_eq!(err.to_string(), "No response from model");
        assert_eq!(err.error_code(), "TRANSPORT_FAILURE");
    }

    #[test]
    fn test_is_retryable() {
        let throttled = AgentError::from(ModelError::Api {
            status: 503,
            message: "unavailable".into(),
        });
        assert!(throttled.is_retryable());
        assert!(!AgentError::NoToolInvocations.is_retryable());
    }

    #[test]
    fn test_protocol_violations() {
        assert!(AgentError::NoToolInvocations.is_protocol_violation());
        assert!(
            AgentError::UnexpectedStop {
                reason: "content_filtered".into()
            }
            .is_protocol_violation()
        );
        assert!(!AgentError::IterationBoundExceeded { limit: 1 }.is_protocol_violation());
    }
}
