//! # Mock Tools for Testing
//!
//! Tool implementations with predictable responses, call recording and
//! optional latency, for exercising dispatch and containment paths.

use async_trait::async_trait;
use lumen_core::{Tool, ToolDefinition, ToolError, ToolExecutor};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
enum MockOutcome {
    Success(Value),
    Failure(String),
}

/// A mock tool that returns predefined responses based on its input
#[derive(Debug, Clone)]
pub struct MockTool {
    name: String,
    description: String,
    input_schema: Value,
    responses: Vec<(Value, MockOutcome)>,
    default_response: MockOutcome,
    delay: Option<Duration>,
    call_history: Arc<Mutex<Vec<Value>>>,
}

impl MockTool {
    /// Create a mock that returns `null` for any input
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            description: format!("Mock tool {name}"),
            name,
            input_schema: json!({"type": "object"}),
            responses: Vec::new(),
            default_response: MockOutcome::Success(Value::Null),
            delay: None,
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Respond with `output` when called with exactly `input`
    pub fn with_response(mut self, input: Value, output: Value) -> Self {
        self.responses.push((input, MockOutcome::Success(output)));
        self
    }

    /// Fail with `error` when called with exactly `input`
    pub fn with_failure(mut self, input: Value, error: impl Into<String>) -> Self {
        self.responses
            .push((input, MockOutcome::Failure(error.into())));
        self
    }

    /// Respond with `output` for any unmatched input
    pub fn with_default_response(mut self, output: Value) -> Self {
        self.default_response = MockOutcome::Success(output);
        self
    }

    /// Fail for any unmatched input
    pub fn with_default_failure(mut self, error: impl Into<String>) -> Self {
        self.default_response = MockOutcome::Failure(error.into());
        self
    }

    pub fn with_schema(mut self, input_schema: Value) -> Self {
        self.input_schema = input_schema;
        self
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the number of times this tool has been called
    pub fn call_count(&self) -> usize {
        self.call_history.lock().unwrap().len()
    }

    /// Get the history of inputs passed to this tool
    pub fn call_history(&self) -> Vec<Value> {
        self.call_history.lock().unwrap().clone()
    }

    pub fn was_called_with(&self, input: &Value) -> bool {
        self.call_history.lock().unwrap().contains(input)
    }

    pub fn reset(&self) {
        self.call_history.lock().unwrap().clear();
    }
}

#[async_trait]
impl ToolExecutor for MockTool {
    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        self.call_history.lock().unwrap().push(input.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = self
            .responses
            .iter()
            .find(|(expected, _)| *expected == input)
            .map(|(_, outcome)| outcome)
            .unwrap_or(&self.default_response);

        match outcome {
            MockOutcome::Success(output) => Ok(output.clone()),
            MockOutcome::Failure(message) => {
                Err(ToolError::execution_failed(&self.name, message.clone()))
            }
        }
    }
}

impl Tool for MockTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(&self.name, &self.description, self.input_schema.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_matching_and_default_responses() {
        let tool = MockTool::new("lookup")
            .with_response(json!({"id": 1}), json!({"name": "one"}))
            .with_failure(json!({"id": 2}), "not found")
            .with_default_response(json!([]));

        assert_eq!(tool.execute(json!({"id": 1})).await.unwrap(), json!({"name": "one"}));
        assert!(tool.execute(json!({"id": 2})).await.is_err());
        assert_eq!(tool.execute(json!({"id": 3})).await.unwrap(), json!([]));

        assert_eq!(tool.call_count(), 3);
        assert!(tool.was_called_with(&json!({"id": 2})));
    }

    #[tokio::test]
    async fn test_clones_share_history() {
        let tool = MockTool::new("shared");
        let clone = tool.clone();
        clone.execute(json!({})).await.unwrap();
        assert_eq!(tool.call_count(), 1);
        tool.reset();
        assert_eq!(clone.call_count(), 0);
    }
}
