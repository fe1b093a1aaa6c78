//! # Lumen Testing
//!
//! Test doubles for the agent's collaborators.
//!
//! ## Components
//!
//! - **[`ScriptedModelClient`]**: replays canned model turns and records requests
//! - **[`MockTool`]**: predictable tool with call history and optional latency
//! - response builders: [`text_response`], [`tool_request`], [`response`]
//!
//! ## Usage
//!
//! ```rust
//! use lumen_agent::{AgentLoop, LoopConfig};
//! use lumen_core::Conversation;
//! use lumen_testing::{MockTool, ScriptedModelClient, text_response, tool_request};
//! use lumen_tools::ToolRegistry;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let model = ScriptedModelClient::new()
//!     .then(tool_request(&[("t1", "lookup", json!({}))]))
//!     .then(text_response("Found it"));
//! let registry = ToolRegistry::new()
//!     .with_tool(MockTool::new("lookup").with_default_response(json!({"ok": true})))
//!     .unwrap();
//!
//! let agent = AgentLoop::new(
//!     Arc::new(model),
//!     Arc::new(registry),
//!     "system",
//!     LoopConfig::default(),
//! )
//! .unwrap();
//! let outcome = agent.run("find it", Conversation::new()).await.unwrap();
//! assert_eq!(outcome.final_text, "Found it");
//! # });
//! ```

pub mod mock_model;
pub mod mock_tools;

pub use mock_model::{RecordedRequest, ScriptedModelClient, response, text_response, tool_request};
pub use mock_tools::MockTool;
