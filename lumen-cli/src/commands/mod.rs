mod ask;
mod dashboards;
mod serve;
mod tools;

pub use ask::{AskArgs, run_ask};
pub use dashboards::run_dashboards;
pub use serve::{ServeArgs, run_serve};
pub use tools::{ToolsCommand, run_tools};

use clap::Args;
use lumen_agent::{BedrockClient, BedrockConfig};
use lumen_http::{DashboardCatalog, HttpChatRuntime, HttpConfig, HttpConfigBuilder, SiteConfig};
use lumen_tools::standard_registry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::error::CliError;

/// Flags shared by every command that builds an agent. Each one overrides
/// the matching `LUMEN_*` environment variable.
#[derive(Args, Debug, Default)]
pub struct RuntimeArgs {
    /// Site configuration JSON
    #[arg(long)]
    pub site_config: Option<PathBuf>,
    /// Directory of dashboard manifests
    #[arg(long)]
    pub dashboards_dir: Option<PathBuf>,
    /// Model calls allowed per run
    #[arg(long)]
    pub max_iterations: Option<usize>,
}

impl RuntimeArgs {
    fn apply(&self, mut builder: HttpConfigBuilder) -> HttpConfigBuilder {
        if let Some(path) = &self.site_config {
            builder = builder.site_config_path(path.clone());
        }
        if let Some(dir) = &self.dashboards_dir {
            builder = builder.dashboards_dir(dir.clone());
        }
        if let Some(max) = self.max_iterations {
            builder = builder.max_iterations(max);
        }
        builder
    }
}

/// Load site, dashboards and the Bedrock client, then assemble the runtime.
fn build_runtime(config: HttpConfig) -> Result<HttpChatRuntime, CliError> {
    let site = config
        .site_config_path
        .as_ref()
        .map(SiteConfig::load)
        .transpose()?;
    let dashboards = match &config.dashboards_dir {
        Some(dir) => DashboardCatalog::load_dir(dir)?,
        None => DashboardCatalog::new(),
    };

    let bedrock = match &site {
        Some(site) => site.apply_to(BedrockConfig::from_env()),
        None => BedrockConfig::from_env(),
    };
    info!(
        region = %bedrock.region,
        model = %bedrock.model_id,
        dashboards = dashboards.len(),
        site = site.as_ref().map(|s| s.site_id.as_str()).unwrap_or("-"),
        "Building agent runtime"
    );
    let model = Arc::new(BedrockClient::new(bedrock)?);

    let mut builder = HttpChatRuntime::builder(model, standard_registry()?)
        .config(config)
        .dashboards(dashboards);
    if let Some(site) = site {
        builder = builder.site(site);
    }
    Ok(builder.build()?)
}
