use lumen_agent::{AgentError, ModelError};
use lumen_core::ToolError;
use lumen_http::{ApiError, ConfigError, DashboardError, SiteConfigError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Site(#[from] SiteConfigError),

    #[error(transparent)]
    Dashboards(#[from] DashboardError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}
