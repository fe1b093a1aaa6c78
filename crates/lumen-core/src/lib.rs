//! # Lumen Core
//!
//! Shared vocabulary of the Lumen analytics agent: the append-only
//! [`Conversation`] exchanged with the model, and the [`Tool`] contracts the
//! agent dispatches to.
//!
//! ## Key Types
//!
//! - **[`Conversation`] / [`Turn`] / [`ContentBlock`]**: transcript model with
//!   role alternation and tool-result correlation enforced on append
//! - **[`ToolDefinition`]**: name, description and JSON Schema shown to the model
//! - **[`ToolExecutor`] / [`Tool`]**: asynchronous tool bodies
//! - **[`ToolError`]**: lookup, validation and execution failures

pub mod conversation;
pub mod error;
pub mod tool;

pub use conversation::{
    ContentBlock, Conversation, ConversationError, Role, ToolInvocation, ToolResult, ToolStatus,
    Turn,
};
pub use error::ToolError;
pub use tool::{FnExecutor, Tool, ToolDefinition, ToolExecutor, executor_fn};
