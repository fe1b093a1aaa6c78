//! Model client contract.
//!
//! One [`ModelClient::send`] call is one full model turn: the whole
//! conversation goes out, exactly one assistant [`Turn`] comes back together
//! with the [`StopSignal`] that tells the loop what to do next. Clients never
//! retry; failures surface as [`ModelError`].

use async_trait::async_trait;
use lumen_core::{Conversation, Turn};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use thiserror::Error;

use crate::adapter::WireToolSpec;

/// Why the model stopped producing output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StopSignal {
    /// Finished normally.
    Done,
    /// Cut off by the output token limit.
    LengthLimited,
    /// Wants one or more tools run before continuing.
    ToolRequested,
    /// Any other reason, carrying the raw value.
    Other(String),
}

impl StopSignal {
    /// Map a Converse `stopReason`.
    pub fn from_stop_reason(reason: &str) -> Self {
        match reason {
            "end_turn" | "stop_sequence" => StopSignal::Done,
            "max_tokens" => StopSignal::LengthLimited,
            "tool_use" => StopSignal::ToolRequested,
            other => StopSignal::Other(other.to_string()),
        }
    }
}

/// Token counts reported by the model endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
        }
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.input_tokens += rhs.input_tokens;
        self.output_tokens += rhs.output_tokens;
        self.total_tokens += rhs.total_tokens;
    }
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfig {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

/// A single model turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub turn: Turn,
    pub stop_signal: StopSignal,
    pub usage: TokenUsage,
}

/// Transport, authentication, quota and decoding failures.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model endpoint returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed model response: {0}")]
    Decode(String),

    #[error("No response from model")]
    EmptyResponse,

    #[error("Invalid model client configuration: {0}")]
    Config(String),
}

impl ModelError {
    /// Whether a caller-level retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ModelError::Http(err) => err.is_timeout() || err.is_connect(),
            ModelError::Api { status, .. } => *status == 429 || *status >= 500,
            ModelError::Decode(_) | ModelError::EmptyResponse | ModelError::Config(_) => false,
        }
    }
}

/// Generative model endpoint.
///
/// Implementations must be safe to share across concurrent runs.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send the full conversation and return the model's next turn.
    ///
    /// # Errors
    ///
    /// Any [`ModelError`]; the loop propagates it without retrying.
    async fn send(
        &self,
        conversation: &Conversation,
        tools: &[WireToolSpec],
        system_prompt: &str,
        inference: &InferenceConfig,
    ) -> Result<ModelResponse, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_reason_mapping() {
        assert_eq!(StopSignal::from_stop_reason("end_turn"), StopSignal::Done);
        assert_eq!(StopSignal::from_stop_reason("stop_sequence"), StopSignal::Done);
        assert_eq!(
            StopSignal::from_stop_reason("max_tokens"),
            StopSignal::LengthLimited
        );
        assert_eq!(
            StopSignal::from_stop_reason("tool_use"),
            StopSignal::ToolRequested
        );
        assert_eq!(
            StopSignal::from_stop_reason("guardrail_intervened"),
            StopSignal::Other("guardrail_intervened".to_string())
        );
    }

    #[test]
    fn test_usage_accumulates() {
        let mut total = TokenUsage::default();
        total += TokenUsage::new(100, 20);
        total += TokenUsage::new(50, 5);
        assert_eq!(total, TokenUsage::new(150, 25));
        assert_eq!(total.total_tokens, 175);
    }

    #[test]
    fn test_retryable_statuses() {
        let throttled = ModelError::Api {
            status: 429,
            message: "slow down".into(),
        };
        let denied = ModelError::Api {
            status: 403,
            message: "no".into(),
        };
        assert!(throttled.is_retryable());
        assert!(!denied.is_retryable());
        assert!(!ModelError::EmptyResponse.is_retryable());
    }
}
