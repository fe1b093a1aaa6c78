//! Tool contracts.
//!
//! A tool is a [`ToolDefinition`] (what the model sees) paired with a
//! [`ToolExecutor`] (what runs). Executors receive the raw JSON input the
//! model produced, after the registry has validated it against the schema.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;

use crate::ToolError;

/// Declared name, description and JSON Schema of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Asynchronous body of a tool.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Run the tool against validated input.
    ///
    /// # Errors
    ///
    /// Any failure is reported as a [`ToolError`]; its display string is what
    /// the model eventually reads.
    async fn execute(&self, input: Value) -> Result<Value, ToolError>;
}

/// A self-describing executor.
pub trait Tool: ToolExecutor {
    fn definition(&self) -> ToolDefinition;
}

/// Executor backed by an async closure.
///
/// ```rust
/// use lumen_core::{ToolExecutor, executor_fn};
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let echo = executor_fn(|input| async move { Ok(input) });
/// assert_eq!(echo.execute(json!({"a": 1})).await.unwrap(), json!({"a": 1}));
/// # });
/// ```
pub struct FnExecutor<F> {
    f: F,
}

pub fn executor_fn<F, Fut>(f: F) -> FnExecutor<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    FnExecutor { f }
}

#[async_trait]
impl<F, Fut> ToolExecutor for FnExecutor<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        (self.f)(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Upper;

    #[async_trait]
    impl ToolExecutor for Upper {
        async fn execute(&self, input: Value) -> Result<Value, ToolError> {
            let text = input["text"]
                .as_str()
                .ok_or_else(|| ToolError::invalid_input("upper", "missing text"))?;
            Ok(json!({ "text": text.to_uppercase() }))
        }
    }

    impl Tool for Upper {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new(
                "upper",
                "Uppercase text",
                json!({"type": "object", "properties": {"text": {"type": "string"}}}),
            )
        }
    }

    #[tokio::test]
    async fn test_tool_executes() {
        let tool = Upper;
        assert_eq!(tool.definition().name, "upper");
        let out = tool.execute(json!({"text": "hi"})).await.unwrap();
        assert_eq!(out, json!({"text": "HI"}));
        assert!(tool.execute(json!({})).await.is_err());
    }

    #[tokio::test]
    async fn test_fn_executor() {
        let failing = executor_fn(|_| async { Err(ToolError::execution_failed("f", "nope")) });
        let err = failing.execute(json!(null)).await.unwrap_err();
        assert_eq!(err.to_string(), "Tool 'f' failed: nope");
    }

    #[test]
    fn test_definition_serializes_camel_case() {
        let def = ToolDefinition::new("t", "d", json!({"type": "object"}));
        let value = serde_json::to_value(def).unwrap();
        assert_eq!(value["inputSchema"]["type"], "object");
    }
}
