//! # Lumen HTTP
//!
//! axum front door for the analytics agent.
//!
//! ## Endpoints
//!
//! - `POST /chat` - run the agent loop for one message, optionally scoped to
//!   a dashboard and continuing a conversation
//! - `GET /tools`, `GET /dashboards` - what the assistant can use
//! - `GET /admin/stats`, `/admin/daily-costs`, `/admin/dashboard-usage`,
//!   `/admin/logs`, `/admin/errors` - usage and cost reporting
//! - `GET /health`, `GET /metrics` - liveness and Prometheus metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use lumen_agent::BedrockClient;
//! use lumen_http::{HttpChatRuntime, HttpConfigBuilder};
//! use lumen_tools::standard_registry;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpConfigBuilder::from_env()?.build()?;
//! let port = config.port;
//! let app = HttpChatRuntime::builder(Arc::new(BedrockClient::from_env()?), standard_registry()?)
//!     .config(config)
//!     .build()?
//!     .router();
//!
//! let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod conversations;
pub mod dashboards;
pub mod metrics;
pub mod runtime;
pub mod site;
pub mod usage;

pub use conversations::{ConversationBusy, ConversationLease, ConversationStore};
pub use dashboards::{DashboardCatalog, DashboardError, DashboardManifest};
pub use metrics::ChatMetrics;
pub use runtime::{
    ApiError, ChatRequest, ChatResponse, ConfigError, ErrorResponse, HttpChatRuntime,
    HttpChatRuntimeBuilder, HttpConfig, HttpConfigBuilder, shutdown_signal,
};
pub use site::{SiteConfig, SiteConfigError};
pub use usage::{UsageLog, UsageRecord, UsageStats, UsageStatus, UsageTracker, calculate_cost};
