//! `POST /chat`

use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};
use chrono::Utc;
use lumen_agent::{CollectingObserver, LoopObserver};
use lumen_core::{ToolResult, Turn};
use serde_json::Value;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::conversations::ConversationLease;
use crate::metrics::ChatMetrics;
use crate::runtime::{
    ApiError, HttpChatRuntime,
    types::{ChatRequest, ChatResponse, ResponseMeta, UsageSummary},
};
use crate::usage::{UsageRecord, calculate_cost};

/// Collects tool calls for the response and counts them in metrics.
struct ChatObserver<'a> {
    metrics: &'a ChatMetrics,
    calls: CollectingObserver,
}

impl LoopObserver for ChatObserver<'_> {
    fn on_tool_call(&self, name: &str, input: &Value, result: &ToolResult) {
        self.metrics.record_tool_call(name, result.status.as_str());
        self.calls.on_tool_call(name, input, result);
    }

    fn on_response(&self, text: &str) {
        self.calls.on_response(text);
    }
}

pub async fn chat(
    State(runtime): State<HttpChatRuntime>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::InvalidRequest(format!("Invalid request body: {}", rejection.body_text()))
    })?;
    let message = request
        .message
        .filter(|message| !message.trim().is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("Missing or invalid 'message' field".into()))?;
    let resolved = runtime.resolve_agent(request.dashboard.as_deref())?;
    let dashboard = request.dashboard;

    let request_id = Uuid::new_v4().to_string();
    let timestamp = Utc::now();
    let conversation_id = request
        .conversation_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| format!("conv_{}", Uuid::new_v4().simple()));

    let lease = if runtime.history_enabled() {
        Some(runtime.conversations.checkout(&conversation_id)?)
    } else {
        None
    };
    let prior = lease
        .as_ref()
        .map(ConversationLease::prior)
        .unwrap_or_default();

    info!(
        request_id = %request_id,
        conversation_id = %conversation_id,
        dashboard = dashboard.as_deref().unwrap_or("-"),
        history_turns = prior.len(),
        "Chat request received"
    );

    let observer = ChatObserver {
        metrics: &runtime.metrics,
        calls: CollectingObserver::new(),
    };
    let record = UsageRecord::new(
        request_id.clone(),
        timestamp,
        dashboard.clone(),
        message.chars().count(),
    );
    let started = Instant::now();
    let timeout = runtime.config.request_timeout();

    let run = tokio::time::timeout(
        timeout,
        resolved.agent.run_observed(message, prior, &observer),
    )
    .await;

    // A dropped lease restores the prior history.
    let outcome = match run {
        Err(_) => {
            let secs = timeout.as_secs();
            let mut record = record.failed(format!("Request timed out after {secs}s"));
            record.tool_call_count = observer.calls.tool_calls().len();
            record.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            runtime.metrics.record_chat("timeout", 0, started.elapsed());
            runtime.usage.log(record).await;
            return Err(ApiError::Timeout { request_id, secs });
        }
        Ok(Err(failure)) => {
            runtime
                .metrics
                .record_chat("error", failure.stats.iterations, failure.stats.duration);
            runtime
                .usage
                .log(
                    record
                        .with_stats(&failure.stats)
                        .failed(failure.error.to_string()),
                )
                .await;
            return Err(ApiError::AgentFailed {
                request_id,
                error: failure.error,
            });
        }
        Ok(Ok(outcome)) => outcome,
    };

    // A final turn with unanswered invocations cannot be extended, so the
    // prior history is kept instead.
    if let Some(lease) = lease {
        if outcome.conversation.last().is_some_and(Turn::has_invocations) {
            warn!(
                request_id = %request_id,
                conversation_id = %conversation_id,
                "Final turn has unanswered tool invocations; keeping prior history"
            );
        } else {
            lease.commit(outcome.conversation.clone());
        }
    }

    let stats = &outcome.stats;
    runtime
        .metrics
        .record_chat("success", stats.iterations, stats.duration);
    let entry = runtime.usage.log(record.with_stats(stats)).await;

    info!(
        request_id = %request_id,
        iterations = stats.iterations,
        tool_calls = stats.tool_calls,
        input_tokens = stats.usage.input_tokens,
        output_tokens = stats.usage.output_tokens,
        estimated_cost = entry.estimated_cost,
        duration_ms = stats.duration_ms(),
        "Chat request completed"
    );

    let tool_calls = if runtime.show_tool_calls() {
        observer.calls.tool_calls()
    } else {
        Vec::new()
    };

    Ok(Json(ChatResponse {
        response: outcome.final_text,
        conversation_id,
        tool_calls,
        dashboard,
        available_tools: resolved.agent.tool_names(),
        usage: UsageSummary {
            input_tokens: stats.usage.input_tokens,
            output_tokens: stats.usage.output_tokens,
            total_tokens: stats.usage.total_tokens,
            estimated_cost: calculate_cost(stats.usage.input_tokens, stats.usage.output_tokens),
        },
        meta: ResponseMeta {
            request_id,
            timestamp,
            iterations: stats.iterations,
            duration_ms: stats.duration_ms(),
        },
    }))
}
