//! # Scripted Model Client
//!
//! A [`ModelClient`] that replays a fixed sequence of responses and records
//! every request it receives, so loop behavior can be tested without a
//! model endpoint.

use async_trait::async_trait;
use lumen_agent::{
    InferenceConfig, ModelClient, ModelError, ModelResponse, StopSignal, TokenUsage, WireToolSpec,
};
use lumen_core::{ContentBlock, Conversation, ToolInvocation, Turn};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// What the scripted model saw on one call.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub turns: Vec<Turn>,
    pub tool_names: Vec<String>,
    pub system_prompt: String,
    pub inference: InferenceConfig,
}

/// Replays queued responses in order.
///
/// When the queue runs dry the client either repeats its fallback response
/// (see [`repeating`](Self::repeating)) or fails with a decode error.
#[derive(Debug, Clone, Default)]
pub struct ScriptedModelClient {
    script: Arc<Mutex<VecDeque<Result<ModelResponse, ModelError>>>>,
    fallback: Option<ModelResponse>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ScriptedModelClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client answering every call with `response`.
    pub fn repeating(response: ModelResponse) -> Self {
        Self {
            fallback: Some(response),
            ..Self::default()
        }
    }

    /// Queue a response.
    pub fn then(self, response: ModelResponse) -> Self {
        self.script.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue a failure.
    pub fn then_fail(self, error: ModelError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Responses still queued.
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelClient for ScriptedModelClient {
    async fn send(
        &self,
        conversation: &Conversation,
        tools: &[WireToolSpec],
        system_prompt: &str,
        inference: &InferenceConfig,
    ) -> Result<ModelResponse, ModelError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            turns: conversation.turns().to_vec(),
            tool_names: tools.iter().map(|t| t.tool_spec.name.clone()).collect(),
            system_prompt: system_prompt.to_string(),
            inference: inference.clone(),
        });

        let next = self.script.lock().unwrap().pop_front();
        match (next, &self.fallback) {
            (Some(step), _) => step,
            (None, Some(fallback)) => Ok(fallback.clone()),
            (None, None) => Err(ModelError::Decode(
                "scripted model has no more responses".to_string(),
            )),
        }
    }
}

/// Final answer with the given text.
pub fn text_response(text: &str) -> ModelResponse {
    ModelResponse {
        turn: Turn::assistant_text(text),
        stop_signal: StopSignal::Done,
        usage: TokenUsage::new(100, 20),
    }
}

/// Tool request for each `(id, name, input)`.
pub fn tool_request(calls: &[(&str, &str, Value)]) -> ModelResponse {
    let content = calls
        .iter()
        .map(|(id, name, input)| {
            ContentBlock::ToolInvocation(ToolInvocation::new(*id, *name, input.clone()))
        })
        .collect();
    ModelResponse {
        turn: Turn::assistant(content),
        stop_signal: StopSignal::ToolRequested,
        usage: TokenUsage::new(150, 40),
    }
}

/// Arbitrary turn and stop signal.
pub fn response(turn: Turn, stop_signal: StopSignal) -> ModelResponse {
    ModelResponse {
        turn,
        stop_signal,
        usage: TokenUsage::new(100, 20),
    }
}
