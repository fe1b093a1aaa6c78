//! Health and metrics handlers.

use axum::{extract::State, http::StatusCode, response::Json};
use std::sync::OnceLock;
use std::time::Instant;

use crate::runtime::HttpChatRuntime;

// Track service start time for uptime calculation
static START_TIME: OnceLock<Instant> = OnceLock::new();

pub(crate) fn mark_started() {
    START_TIME.get_or_init(Instant::now);
}

fn get_uptime_seconds() -> u64 {
    START_TIME.get_or_init(Instant::now).elapsed().as_secs()
}

/// GET /health - liveness with version info
pub async fn health_check(State(runtime): State<HttpChatRuntime>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "lumen",
        "timestamp": chrono::Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": get_uptime_seconds(),
        "tools": runtime.tools().len(),
        "dashboards": runtime.dashboards.len(),
    }))
}

/// GET /metrics - Prometheus text exposition
pub async fn metrics_endpoint(
    State(runtime): State<HttpChatRuntime>,
) -> Result<String, (StatusCode, String)> {
    runtime.metrics.render().map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode metrics: {e}"),
        )
    })
}
