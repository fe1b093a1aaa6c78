//! Prometheus metrics for the chat surface.
//!
//! Each [`ChatMetrics`] owns its own registry so several runtimes (and
//! tests) can coexist in one process.

use prometheus::{Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Duration;

const DURATION_BUCKETS: &[f64] = &[0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0];
const ITERATION_BUCKETS: &[f64] = &[1.0, 2.0, 3.0, 4.0, 5.0, 7.0, 10.0, 15.0, 20.0];

#[derive(Debug, Clone)]
pub struct ChatMetrics {
    registry: Registry,
    chat_requests_total: IntCounterVec,
    tool_calls_total: IntCounterVec,
    agent_iterations: Histogram,
    chat_duration_seconds: Histogram,
}

impl ChatMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let chat_requests_total = IntCounterVec::new(
            Opts::new("lumen_chat_requests_total", "Chat requests by outcome"),
            &["status"],
        )?;
        let tool_calls_total = IntCounterVec::new(
            Opts::new("lumen_tool_calls_total", "Tool invocations by tool and outcome"),
            &["tool", "status"],
        )?;
        let agent_iterations = Histogram::with_opts(
            HistogramOpts::new("lumen_agent_iterations", "Model calls per chat request")
                .buckets(ITERATION_BUCKETS.to_vec()),
        )?;
        let chat_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "lumen_chat_duration_seconds",
                "Wall-clock duration of chat requests",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
        )?;

        registry.register(Box::new(chat_requests_total.clone()))?;
        registry.register(Box::new(tool_calls_total.clone()))?;
        registry.register(Box::new(agent_iterations.clone()))?;
        registry.register(Box::new(chat_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            chat_requests_total,
            tool_calls_total,
            agent_iterations,
            chat_duration_seconds,
        })
    }

    /// `status` is `success`, `error` or `timeout`.
    pub fn record_chat(&self, status: &str, iterations: usize, duration: Duration) {
        self.chat_requests_total.with_label_values(&[status]).inc();
        self.agent_iterations.observe(iterations as f64);
        self.chat_duration_seconds.observe(duration.as_secs_f64());
    }

    pub fn record_tool_call(&self, tool: &str, status: &str) {
        self.tool_calls_total.with_label_values(&[tool, status]).inc();
    }

    pub fn chat_requests(&self, status: &str) -> u64 {
        self.chat_requests_total.with_label_values(&[status]).get()
    }

    pub fn tool_calls(&self, tool: &str, status: &str) -> u64 {
        self.tool_calls_total.with_label_values(&[tool, status]).get()
    }

    /// Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_independent_registries() {
        let first = ChatMetrics::new().unwrap();
        let second = ChatMetrics::new().unwrap();
        first.record_chat("success", 2, Duration::from_millis(300));
        assert_eq!(first.chat_requests("success"), 1);
        assert_eq!(second.chat_requests("success"), 0);
    }

    #[test]
    fn test_render_contains_series() {
        let metrics = ChatMetrics::new().unwrap();
        metrics.record_chat("error", 1, Duration::from_secs(1));
        metrics.record_tool_call("block_util_summary", "success");

        let text = metrics.render().unwrap();
        assert!(text.contains("lumen_chat_requests_total{status=\"error\"} 1"));
        assert!(text.contains("tool=\"block_util_summary\""));
        assert_eq!(metrics.tool_calls("block_util_summary", "success"), 1);
        assert!(text.contains("lumen_agent_iterations_bucket"));
        assert!(text.contains("lumen_chat_duration_seconds_count 1"));
    }
}
