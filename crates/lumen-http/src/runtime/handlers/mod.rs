//! HTTP request handlers

pub mod admin;
pub mod catalog;
pub mod chat;
pub mod health;

pub use admin::{daily_costs, dashboard_usage, recent_errors, recent_logs, usage_stats};
pub use catalog::{list_dashboards, list_tools};
pub use chat::chat;
pub use health::{health_check, metrics_endpoint};
