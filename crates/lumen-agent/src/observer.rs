//! Run observers.
//!
//! Observers are the loop's only side channel. For each tool-dispatch phase
//! `on_tool_call` fires once per invocation, in invocation order, before the
//! next model call. `on_response` fires exactly once, and only when the run
//! succeeds.

use lumen_core::{ToolResult, ToolStatus};
use serde::Serialize;
use serde_json::Value;
use std::sync::{Mutex, PoisonError};

use crate::adapter::unwrap_payload;

pub trait LoopObserver: Send + Sync {
    /// A tool invocation finished, successfully or not.
    fn on_tool_call(&self, _name: &str, _input: &Value, _result: &ToolResult) {}

    /// The run produced its final text.
    fn on_response(&self, _text: &str) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl LoopObserver for NoopObserver {}

/// One observed tool call, with the payload unwrapped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCallRecord {
    pub name: String,
    pub input: Value,
    pub result: Value,
    pub status: ToolStatus,
}

/// Observer that keeps every tool call and the final response.
#[derive(Debug, Default)]
pub struct CollectingObserver {
    calls: Mutex<Vec<ToolCallRecord>>,
    response: Mutex<Option<String>>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool_calls(&self) -> Vec<ToolCallRecord> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn response(&self) -> Option<String> {
        self.response
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn into_tool_calls(self) -> Vec<ToolCallRecord> {
        self.calls.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LoopObserver for CollectingObserver {
    fn on_tool_call(&self, name: &str, input: &Value, result: &ToolResult) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ToolCallRecord {
                name: name.to_string(),
                input: input.clone(),
                result: unwrap_payload(&result.payload),
                status: result.status,
            });
    }

    fn on_response(&self, text: &str) {
        *self.response.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.to_string());
    }
}
