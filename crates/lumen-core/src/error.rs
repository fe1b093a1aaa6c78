//! Error types for tool lookup, validation and execution.

use thiserror::Error;

/// Failures raised while resolving or running a tool.
///
/// None of these abort an agent run: the loop converts them into an
/// error-status tool result and lets the model react.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// No tool is registered under the requested name.
    #[error("Tool not found: {name}")]
    NotFound { name: String },

    /// Input did not satisfy the tool's declared schema or typed parameters.
    #[error("Invalid input for tool '{tool}': {reason}")]
    InvalidInput { tool: String, reason: String },

    /// The executor ran and failed.
    #[error("Tool '{tool}' failed: {message}")]
    ExecutionFailed { tool: String, message: String },

    /// The declared input schema is not a valid JSON Schema.
    #[error("Invalid input schema for tool '{tool}': {reason}")]
    InvalidSchema { tool: String, reason: String },
}

impl ToolError {
    pub fn not_found(name: impl Into<String>) -> Self {
        ToolError::NotFound { name: name.into() }
    }

    pub fn invalid_input(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        ToolError::InvalidInput {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    pub fn execution_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        ToolError::ExecutionFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Name of the tool the error refers to.
    pub fn tool_name(&self) -> &str {
        match self {
            ToolError::NotFound { name } => name,
            ToolError::InvalidInput { tool, .. }
            | ToolError::ExecutionFailed { tool, .. }
            | ToolError::InvalidSchema { tool, .. } => tool,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ToolError::NotFound { .. } => "TOOL_NOT_FOUND",
            ToolError::InvalidInput { .. } => "INVALID_INPUT",
            ToolError::ExecutionFailed { .. } => "EXECUTION_FAILED",
            ToolError::InvalidSchema { .. } => "INVALID_SCHEMA",
        }
    }
}
