//! # Lumen
//!
//! Conversational analytics assistant. A generative model decides when to
//! call a fixed set of data tools; the agent loop runs those calls, feeds
//! the results back and returns the model's final answer.
//!
//! ## Core Components
//!
//! - **[`Conversation`]**: ordered transcript of user and assistant turns
//! - **[`ToolRegistry`]**: named, schema-validated tool executors
//! - **[`ModelClient`]**: one request/response round trip to the model, with
//!   [`BedrockClient`] as the production implementation
//! - **[`AgentLoop`]**: the tool-use state machine tying the three together
//! - **[`HttpChatRuntime`]**: axum front door with usage accounting
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lumen::{AgentLoop, BedrockClient, Conversation, LoopConfig, standard_registry};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let agent = AgentLoop::new(
//!     Arc::new(BedrockClient::from_env()?),
//!     Arc::new(standard_registry()?),
//!     lumen::prompt::base_system_prompt(),
//!     LoopConfig::default(),
//! )?;
//!
//! let outcome = agent
//!     .run("What was block utilization last month?", Conversation::new())
//!     .await?;
//! println!("{}", outcome.final_text);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Module aliases for namespaced access
// ============================================================================

pub use lumen_agent as agent;
pub use lumen_agent::prompt;
pub use lumen_core as core;
pub use lumen_http as http;
pub use lumen_tools as tools;

#[cfg(feature = "testing")]
pub use lumen_testing as testing;

// ============================================================================
// Conversation model and tool contracts
// ============================================================================

pub use lumen_core::{
    ContentBlock, Conversation, ConversationError, Role, Tool, ToolDefinition, ToolError,
    ToolExecutor, ToolInvocation, ToolResult, ToolStatus, Turn, executor_fn,
};

// ============================================================================
// Tools
// ============================================================================

pub use lumen_tools::{ToolRegistry, register_block_util_tools, standard_registry};

// ============================================================================
// Agent loop and model client
// ============================================================================

pub use lumen_agent::{
    AgentError, AgentLoop, AgentResult, BedrockClient, BedrockConfig, CollectingObserver,
    DispatchMode, InferenceConfig, LoopConfig, LoopObserver, LoopOutcome, ModelClient,
    ModelError, ModelResponse, RunFailure, RunStats, StopSignal, TokenUsage, unwrap_payload,
    wrap_payload,
};

// ============================================================================
// HTTP runtime
// ============================================================================

pub use lumen_http::{
    DashboardCatalog, DashboardManifest, HttpChatRuntime, HttpConfig, HttpConfigBuilder,
    SiteConfig, UsageTracker,
};
