//! # Lumen Agent
//!
//! The tool-use orchestration loop behind the Lumen analytics assistant.
//!
//! ## Components
//!
//! - **[`AgentLoop`]**: state machine that calls the model, dispatches
//!   requested tools through a [`ToolRegistry`](lumen_tools::ToolRegistry),
//!   feeds results back and stops on a final answer or the iteration bound
//! - **[`ModelClient`]**: one-turn request/response contract, implemented for
//!   Bedrock Converse by [`BedrockClient`]
//! - **[`adapter`]**: wire conversion, text/invocation extraction and the
//!   tool-result payload wrapping convention
//! - **[`LoopObserver`]**: ordered callbacks for tool calls and the final response
//! - **[`prompt`]**: system prompt assembly
//!
//! ## Example
//!
//! ```rust,no_run
//! use lumen_agent::{AgentLoop, BedrockClient, LoopConfig, prompt};
//! use lumen_core::Conversation;
//! use lumen_tools::standard_registry;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let agent = AgentLoop::new(
//!     Arc::new(BedrockClient::from_env()?),
//!     Arc::new(standard_registry()?),
//!     prompt::base_system_prompt(),
//!     LoopConfig::default(),
//! )?;
//!
//! let outcome = agent
//!     .run("How did orthopedics use its blocks in March?", Conversation::new())
//!     .await?;
//! println!("{}", outcome.final_text);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod agent_loop;
pub mod bedrock;
pub mod error;
pub mod model;
pub mod observer;
pub mod prompt;

pub use adapter::{WireToolSpec, unwrap_payload, wrap_payload};
pub use agent_loop::{AgentLoop, DispatchMode, LoopConfig, LoopOutcome, RunFailure, RunStats};
pub use bedrock::{BedrockClient, BedrockConfig};
pub use error::{AgentError, AgentResult};
pub use model::{InferenceConfig, ModelClient, ModelError, ModelResponse, StopSignal, TokenUsage};
pub use observer::{CollectingObserver, LoopObserver, NoopObserver, ToolCallRecord};
