//! Usage and cost reporting endpoints under `/admin`.

use axum::{
    extract::{Query, State},
    response::Json,
};

use crate::runtime::{
    HttpChatRuntime,
    types::{DaysQuery, LimitQuery},
};
use crate::usage::{DailyCost, DashboardUsage, UsageLog, UsageStats};

const DEFAULT_DAYS: usize = 30;
const MAX_DAYS: usize = 366;
const DEFAULT_LOG_LIMIT: usize = 100;
const DEFAULT_ERROR_LIMIT: usize = 50;
const MAX_LIMIT: usize = 1_000;

fn bounded(value: Option<usize>, default: usize, max: usize) -> usize {
    value.filter(|v| *v > 0).unwrap_or(default).min(max)
}

/// GET /admin/stats
pub async fn usage_stats(State(runtime): State<HttpChatRuntime>) -> Json<UsageStats> {
    Json(runtime.usage.stats().await)
}

/// GET /admin/daily-costs?days=
pub async fn daily_costs(
    State(runtime): State<HttpChatRuntime>,
    Query(query): Query<DaysQuery>,
) -> Json<Vec<DailyCost>> {
    let days = bounded(query.days, DEFAULT_DAYS, MAX_DAYS);
    Json(runtime.usage.daily_costs(days).await)
}

/// GET /admin/dashboard-usage
pub async fn dashboard_usage(State(runtime): State<HttpChatRuntime>) -> Json<Vec<DashboardUsage>> {
    Json(runtime.usage.dashboard_usage().await)
}

/// GET /admin/logs?limit=
pub async fn recent_logs(
    State(runtime): State<HttpChatRuntime>,
    Query(query): Query<LimitQuery>,
) -> Json<Vec<UsageLog>> {
    let limit = bounded(query.limit, DEFAULT_LOG_LIMIT, MAX_LIMIT);
    Json(runtime.usage.recent_logs(limit).await)
}

/// GET /admin/errors?limit=
pub async fn recent_errors(
    State(runtime): State<HttpChatRuntime>,
    Query(query): Query<LimitQuery>,
) -> Json<Vec<UsageLog>> {
    let limit = bounded(query.limit, DEFAULT_ERROR_LIMIT, MAX_LIMIT);
    Json(runtime.usage.recent_errors(limit).await)
}
