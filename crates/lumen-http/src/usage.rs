//! # Usage and Cost Tracking
//!
//! In-memory log of chat requests with token counts and estimated cost.
//! Only the most recent entries are kept; nothing survives a restart.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use lumen_agent::RunStats;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Claude Sonnet 4.5 on Bedrock, USD per million input tokens.
pub const INPUT_COST_PER_MILLION: f64 = 3.0;
/// Claude Sonnet 4.5 on Bedrock, USD per million output tokens.
pub const OUTPUT_COST_PER_MILLION: f64 = 15.0;
pub const DEFAULT_USAGE_CAPACITY: usize = 10_000;

pub fn calculate_cost(input_tokens: u64, output_tokens: u64) -> f64 {
    (input_tokens as f64 / 1_000_000.0) * INPUT_COST_PER_MILLION
        + (output_tokens as f64 / 1_000_000.0) * OUTPUT_COST_PER_MILLION
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageStatus {
    Success,
    Error,
}

/// One chat request as reported by the handler.
#[derive(Debug, Clone)]
pub struct UsageRecord {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub dashboard: Option<String>,
    pub message_length: usize,
    pub tool_call_count: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub iterations: usize,
    pub duration_ms: u64,
    pub status: UsageStatus,
    pub error_message: Option<String>,
}

impl UsageRecord {
    /// A successful request with no model usage yet.
    pub fn new(
        request_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        dashboard: Option<String>,
        message_length: usize,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            timestamp,
            dashboard,
            message_length,
            tool_call_count: 0,
            input_tokens: 0,
            output_tokens: 0,
            total_tokens: 0,
            iterations: 0,
            duration_ms: 0,
            status: UsageStatus::Success,
            error_message: None,
        }
    }

    pub fn with_stats(mut self, stats: &RunStats) -> Self {
        self.tool_call_count = stats.tool_calls;
        self.input_tokens = stats.usage.input_tokens;
        self.output_tokens = stats.usage.output_tokens;
        self.total_tokens = stats.usage.total_tokens;
        self.iterations = stats.iterations;
        self.duration_ms = stats.duration_ms();
        self
    }

    pub fn failed(mut self, message: impl Into<String>) -> Self {
        self.status = UsageStatus::Error;
        self.error_message = Some(message.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageLog {
    pub id: Uuid,
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<String>,
    pub message_length: usize,
    pub tool_call_count: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub estimated_cost: f64,
    pub iterations: usize,
    pub duration_ms: u64,
    pub status: UsageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl UsageLog {
    fn from_record(record: UsageRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            estimated_cost: calculate_cost(record.input_tokens, record.output_tokens),
            request_id: record.request_id,
            timestamp: record.timestamp,
            dashboard: record.dashboard,
            message_length: record.message_length,
            tool_call_count: record.tool_call_count,
            input_tokens: record.input_tokens,
            output_tokens: record.output_tokens,
            total_tokens: record.total_tokens,
            iterations: record.iterations,
            duration_ms: record.duration_ms,
            status: record.status,
            error_message: record.error_message,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub total_cost: f64,
    pub cost_today: f64,
    pub cost_this_week: f64,
    pub cost_this_month: f64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_calls: usize,
    pub successful_calls: usize,
    pub failed_calls: usize,
    pub avg_response_time_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCost {
    pub date: NaiveDate,
    pub cost: f64,
    pub calls: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardUsage {
    pub dashboard: String,
    pub total_calls: usize,
    pub total_cost: f64,
    pub total_tokens: u64,
}

/// Bounded usage log. Calendar boundaries are UTC.
#[derive(Debug)]
pub struct UsageTracker {
    logs: RwLock<VecDeque<UsageLog>>,
    capacity: usize,
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::new(DEFAULT_USAGE_CAPACITY)
    }
}

impl UsageTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            logs: RwLock::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Store a record, evicting the oldest entry when full.
    pub async fn log(&self, record: UsageRecord) -> UsageLog {
        let entry = UsageLog::from_record(record);
        let mut logs = self.logs.write().await;
        logs.push_back(entry.clone());
        while logs.len() > self.capacity {
            logs.pop_front();
        }
        entry
    }

    pub async fn len(&self) -> usize {
        self.logs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.logs.read().await.is_empty()
    }

    pub async fn stats(&self) -> UsageStats {
        self.stats_at(Utc::now()).await
    }

    /// Totals with "today", "this week" (last 7 days) and "this month"
    /// measured from `now`.
    pub async fn stats_at(&self, now: DateTime<Utc>) -> UsageStats {
        let today = now.date_naive();
        let today_start = Utc.from_utc_datetime(&today.and_time(chrono::NaiveTime::MIN));
        let week_ago = now - Duration::days(7);
        let month_start = today
            .with_day(1)
            .map(|day| Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN)))
            .unwrap_or(today_start);

        let logs = self.logs.read().await;
        let mut stats = UsageStats {
            total_calls: logs.len(),
            ..UsageStats::default()
        };
        let mut total_duration_ms = 0u64;

        for log in logs.iter() {
            stats.total_cost += log.estimated_cost;
            stats.total_input_tokens += log.input_tokens;
            stats.total_output_tokens += log.output_tokens;
            total_duration_ms += log.duration_ms;
            match log.status {
                UsageStatus::Success => stats.successful_calls += 1,
                UsageStatus::Error => stats.failed_calls += 1,
            }
            if log.timestamp >= today_start {
                stats.cost_today += log.estimated_cost;
            }
            if log.timestamp >= week_ago {
                stats.cost_this_week += log.estimated_cost;
            }
            if log.timestamp >= month_start {
                stats.cost_this_month += log.estimated_cost;
            }
        }

        if !logs.is_empty() {
            stats.avg_response_time_ms = total_duration_ms as f64 / logs.len() as f64;
        }
        stats
    }

    pub async fn daily_costs(&self, days: usize) -> Vec<DailyCost> {
        self.daily_costs_at(days, Utc::now()).await
    }

    /// One entry per day for the last `days` days ending at `now`, newest
    /// first, including days without traffic.
    pub async fn daily_costs_at(&self, days: usize, now: DateTime<Utc>) -> Vec<DailyCost> {
        let today = now.date_naive();
        let mut daily: BTreeMap<NaiveDate, DailyCost> = (0..days)
            .filter_map(|offset| {
                let offset = i64::try_from(offset).ok()?;
                today.checked_sub_signed(Duration::days(offset))
            })
            .map(|date| {
                (
                    date,
                    DailyCost {
                        date,
                        cost: 0.0,
                        calls: 0,
                        input_tokens: 0,
                        output_tokens: 0,
                    },
                )
            })
            .collect();

        for log in self.logs.read().await.iter() {
            if let Some(day) = daily.get_mut(&log.timestamp.date_naive()) {
                day.cost += log.estimated_cost;
                day.calls += 1;
                day.input_tokens += log.input_tokens;
                day.output_tokens += log.output_tokens;
            }
        }

        daily.into_values().rev().collect()
    }

    /// Per-dashboard totals, highest cost first. Requests without a
    /// dashboard are grouped under `"unknown"`.
    pub async fn dashboard_usage(&self) -> Vec<DashboardUsage> {
        let mut by_dashboard: HashMap<String, DashboardUsage> = HashMap::new();
        for log in self.logs.read().await.iter() {
            let dashboard = log.dashboard.as_deref().unwrap_or("unknown");
            let usage = by_dashboard
                .entry(dashboard.to_string())
                .or_insert_with(|| DashboardUsage {
                    dashboard: dashboard.to_string(),
                    total_calls: 0,
                    total_cost: 0.0,
                    total_tokens: 0,
                });
            usage.total_calls += 1;
            usage.total_cost += log.estimated_cost;
            usage.total_tokens += log.total_tokens;
        }

        let mut usage: Vec<_> = by_dashboard.into_values().collect();
        usage.sort_by(|a, b| {
            b.total_cost
                .total_cmp(&a.total_cost)
                .then_with(|| a.dashboard.cmp(&b.dashboard))
        });
        usage
    }

    /// Newest first.
    pub async fn recent_logs(&self, limit: usize) -> Vec<UsageLog> {
        self.logs
            .read()
            .await
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    /// Failed requests, newest first.
    pub async fn recent_errors(&self, limit: usize) -> Vec<UsageLog> {
        self.logs
            .read()
            .await
            .iter()
            .rev()
            .filter(|log| log.status == UsageStatus::Error)
            .take(limit)
            .cloned()
            .collect()
    }
}
