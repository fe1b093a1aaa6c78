use clap::Args;
use lumen_http::{HttpConfigBuilder, shutdown_signal};
use tokio::net::TcpListener;
use tracing::info;

use super::{RuntimeArgs, build_runtime};
use crate::error::CliError;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen port
    #[arg(long)]
    pub port: Option<u16>,
    #[command(flatten)]
    pub runtime: RuntimeArgs,
}

pub async fn run_serve(args: ServeArgs) -> Result<(), CliError> {
    let mut builder = args.runtime.apply(HttpConfigBuilder::from_env()?);
    if let Some(port) = args.port {
        builder = builder.port(port);
    }
    let config = builder.build()?;
    let port = config.port;

    let runtime = build_runtime(config)?;
    info!(tools = runtime.tools().len(), "Tool registry ready");

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "Lumen listening");
    axum::serve(listener, runtime.router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
