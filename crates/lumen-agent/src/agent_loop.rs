//! # Orchestration Loop
//!
//! Drives the ask-model / run-tools / feed-back cycle until the model gives a
//! final answer or the iteration bound is hit.
//!
//! ```text
//! AwaitingModel ──done / lengthLimited──▶ Responding (success)
//!      │   ▲
//!      │   └────────── results appended ─────────┐
//!      └──toolRequested──▶ Dispatching ──────────┘
//! AwaitingModel ──iterations == max──▶ Exceeded (failure)
//! ```
//!
//! Exactly one model call is in flight per run. Tool invocations of a single
//! assistant turn may run concurrently, but their results are always
//! appended in invocation order.

use futures::future::join_all;
use lumen_core::{ContentBlock, Conversation, ToolInvocation, ToolResult, ToolStatus, Turn};
use lumen_tools::ToolRegistry;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::adapter::{self, WireToolSpec};
use crate::error::{AgentError, AgentResult};
use crate::model::{InferenceConfig, ModelClient, StopSignal, TokenUsage};
use crate::observer::{LoopObserver, NoopObserver};

/// How invocations of one assistant turn are executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// All invocations of a turn run at once.
    #[default]
    Concurrent,
    /// One after another, in emission order.
    Sequential,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopConfig {
    /// Upper bound on model calls per run. Must be at least 1.
    pub max_iterations: usize,
    pub inference: InferenceConfig,
    pub dispatch: DispatchMode,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            inference: InferenceConfig::default(),
            dispatch: DispatchMode::default(),
        }
    }
}

impl LoopConfig {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_inference(mut self, inference: InferenceConfig) -> Self {
        self.inference = inference;
        self
    }

    pub fn with_dispatch(mut self, dispatch: DispatchMode) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn validate(&self) -> AgentResult<()> {
        if self.max_iterations == 0 {
            return Err(AgentError::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.inference.max_tokens == 0 {
            return Err(AgentError::InvalidConfig(
                "inference.max_tokens must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Countable quantities of one run, available on success and failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    /// Model calls made.
    pub iterations: usize,
    pub usage: TokenUsage,
    /// Tool invocations dispatched.
    pub tool_calls: usize,
    pub duration: Duration,
}

impl RunStats {
    pub fn duration_ms(&self) -> u64 {
        u64::try_from(self.duration.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Successful run.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    pub final_text: String,
    pub conversation: Conversation,
    pub stats: RunStats,
}

/// Failed run, with the conversation as far as it got.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RunFailure {
    #[source]
    pub error: AgentError,
    pub conversation: Conversation,
    pub stats: RunStats,
}

enum LoopState {
    AwaitingModel,
    Dispatching(Vec<ToolInvocation>),
    Responding,
    Exceeded,
}

struct RunContext {
    conversation: Conversation,
    stats: RunStats,
    started: Instant,
}

impl RunContext {
    fn new(conversation: Conversation) -> Self {
        Self {
            conversation,
            stats: RunStats::default(),
            started: Instant::now(),
        }
    }

    fn fail(mut self, error: AgentError) -> RunFailure {
        self.stats.duration = self.started.elapsed();
        RunFailure {
            error,
            conversation: self.conversation,
            stats: self.stats,
        }
    }

    fn finish(mut self, final_text: String) -> LoopOutcome {
        self.stats.duration = self.started.elapsed();
        LoopOutcome {
            final_text,
            conversation: self.conversation,
            stats: self.stats,
        }
    }
}

/// The agent tool-use loop.
///
/// Collaborators are passed in explicitly. One `AgentLoop` can serve any
/// number of concurrent runs; each run owns its own [`Conversation`].
pub struct AgentLoop {
    model: Arc<dyn ModelClient>,
    tools: Arc<ToolRegistry>,
    tool_specs: Vec<WireToolSpec>,
    system_prompt: String,
    config: LoopConfig,
}

impl AgentLoop {
    /// # Errors
    ///
    /// `InvalidConfig` if `config` fails [`LoopConfig::validate`].
    pub fn new(
        model: Arc<dyn ModelClient>,
        tools: Arc<ToolRegistry>,
        system_prompt: impl Into<String>,
        config: LoopConfig,
    ) -> AgentResult<Self> {
        config.validate()?;
        let tool_specs = adapter::to_wire_tool_specs(&tools.list_definitions());
        Ok(Self {
            model,
            tools,
            tool_specs,
            system_prompt: system_prompt.into(),
            config,
        })
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.names().map(str::to_string).collect()
    }

    /// Run without observers.
    pub async fn run(
        &self,
        user_message: impl Into<String>,
        prior: Conversation,
    ) -> Result<LoopOutcome, RunFailure> {
        self.run_observed(user_message, prior, &NoopObserver).await
    }

    /// Append `user_message` to `prior` and drive the loop to completion.
    ///
    /// # Errors
    ///
    /// A [`RunFailure`] carrying the partial conversation when the model
    /// transport fails, the model violates the tool-use protocol, the
    /// iteration bound is reached, or `prior` cannot accept a user turn.
    pub async fn run_observed(
        &self,
        user_message: impl Into<String>,
        prior: Conversation,
        observer: &dyn LoopObserver,
    ) -> Result<LoopOutcome, RunFailure> {
        let mut run = RunContext::new(prior);
        if let Err(err) = run.conversation.push(Turn::user_text(user_message)) {
            return Err(run.fail(err.into()));
        }

        let limit = self.config.max_iterations;
        let mut state = LoopState::AwaitingModel;

        loop {
            state = match state {
                LoopState::AwaitingModel if run.stats.iterations >= limit => LoopState::Exceeded,
                LoopState::AwaitingModel => match self.step(&mut run).await {
                    Ok(next) => next,
                    Err(err) => {
                        warn!(error = %err, iteration = run.stats.iterations, "Agent run failed");
                        return Err(run.fail(err));
                    }
                },
                LoopState::Dispatching(invocations) => {
                    run.stats.tool_calls += invocations.len();
                    let results = self.dispatch(&invocations, observer).await;
                    if let Err(err) = run.conversation.push(Turn::user(results)) {
                        return Err(run.fail(err.into()));
                    }
                    LoopState::AwaitingModel
                }
                LoopState::Responding => {
                    let text = run
                        .conversation
                        .last()
                        .map(adapter::extract_text)
                        .unwrap_or_default();
                    observer.on_response(&text);
                    info!(
                        iterations = run.stats.iterations,
                        tool_calls = run.stats.tool_calls,
                        input_tokens = run.stats.usage.input_tokens,
                        output_tokens = run.stats.usage.output_tokens,
                        "Agent run completed"
                    );
                    return Ok(run.finish(text));
                }
                LoopState::Exceeded => {
                    warn!(limit, "Agent run hit the iteration bound");
                    return Err(run.fail(AgentError::IterationBoundExceeded { limit }));
                }
            };
        }
    }

    /// One model call and the transition it implies.
    async fn step(&self, run: &mut RunContext) -> AgentResult<LoopState> {
        run.stats.iterations += 1;
        debug!(iteration = run.stats.iterations, turns = run.conversation.len(), "Calling model");

        let response = self
            .model
            .send(
                &run.conversation,
                &self.tool_specs,
                &self.system_prompt,
                &self.config.inference,
            )
            .await?;
        run.stats.usage += response.usage;

        // Recorded before the stop signal is interpreted so the transcript
        // matches what was on the wire.
        run.conversation.push(response.turn)?;

        debug!(stop_signal = ?response.stop_signal, "Model turn received");
        match response.stop_signal {
            StopSignal::Done => Ok(LoopState::Responding),
            StopSignal::LengthLimited => {
                warn!("Model response truncated by the token limit");
                Ok(LoopState::Responding)
            }
            StopSignal::ToolRequested => {
                let invocations = run
                    .conversation
                    .last()
                    .map(adapter::extract_invocations)
                    .unwrap_or_default();
                if invocations.is_empty() {
                    return Err(AgentError::NoToolInvocations);
                }
                Ok(LoopState::Dispatching(invocations))
            }
            StopSignal::Other(reason) => Err(AgentError::UnexpectedStop { reason }),
        }
    }

    /// Run every invocation and build the result blocks in invocation order.
    async fn dispatch(
        &self,
        invocations: &[ToolInvocation],
        observer: &dyn LoopObserver,
    ) -> Vec<ContentBlock> {
        let results = match self.config.dispatch {
            DispatchMode::Concurrent => {
                join_all(invocations.iter().map(|invocation| self.invoke(invocation))).await
            }
            DispatchMode::Sequential => {
                let mut results = Vec::with_capacity(invocations.len());
                for invocation in invocations {
                    results.push(self.invoke(invocation).await);
                }
                results
            }
        };

        invocations
            .iter()
            .zip(results)
            .map(|(invocation, result)| {
                observer.on_tool_call(&invocation.name, &invocation.input, &result);
                ContentBlock::ToolResult(result)
            })
            .collect()
    }

    async fn invoke(&self, invocation: &ToolInvocation) -> ToolResult {
        debug!(tool = %invocation.name, id = %invocation.id, "Dispatching tool");
        match self
            .tools
            .execute(&invocation.name, invocation.input.clone())
            .await
        {
            Ok(payload) => adapter::tool_result(&invocation.id, payload, ToolStatus::Success),
            Err(err) => {
                warn!(
                    tool = %invocation.name,
                    id = %invocation.id,
                    error = %err,
                    "Tool call failed; returning error result to the model"
                );
                adapter::tool_result(
                    &invocation.id,
                    json!({ "error": err.to_string() }),
                    ToolStatus::Error,
                )
            }
        }
    }
}
