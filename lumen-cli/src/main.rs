use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod error;

use commands::{AskArgs, ServeArgs, ToolsCommand, run_ask, run_dashboards, run_serve, run_tools};
use error::CliError;

#[derive(Parser, Debug)]
#[command(name = "lumen", version)]
#[command(about = "Lumen - conversational analytics assistant for operating-room block utilization")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP chat server
    Serve(ServeArgs),
    /// Ask a single question from the terminal
    Ask(AskArgs),
    /// Inspect or run the analytics tools
    Tools {
        #[command(subcommand)]
        tools_command: ToolsCommand,
    },
    /// List dashboard manifests in a directory
    Dashboards {
        /// Directory of dashboard manifests
        #[arg(long, env = "LUMEN_DASHBOARDS_DIR")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let env_filter = match "info".parse() {
        Ok(directive) => env_filter.add_directive(directive),
        Err(_) => env_filter,
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    let result: Result<(), CliError> = match cli.command {
        Commands::Serve(args) => run_serve(args).await,
        Commands::Ask(args) => run_ask(args).await,
        Commands::Tools { tools_command } => run_tools(tools_command).await,
        Commands::Dashboards { dir } => run_dashboards(&dir),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Command failed");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_with_dashboard() {
        let cli = Cli::try_parse_from([
            "lumen",
            "ask",
            "Which surgeons underused their blocks last month?",
            "--dashboard",
            "block-utilization",
            "--max-iterations",
            "4",
        ])
        .unwrap();

        match cli.command {
            Commands::Ask(args) => {
                assert_eq!(args.message, "Which surgeons underused their blocks last month?");
                assert_eq!(args.dashboard.as_deref(), Some("block-utilization"));
                assert_eq!(args.runtime.max_iterations, Some(4));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_tools_call_defaults_input() {
        let cli = Cli::try_parse_from(["lumen", "tools", "call", "block_util_summary"]).unwrap();
        match cli.command {
            Commands::Tools {
                tools_command: ToolsCommand::Call { name, input },
            } => {
                assert_eq!(name, "block_util_summary");
                assert_eq!(input, "{}");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_serve_port() {
        let cli = Cli::try_parse_from(["lumen", "serve", "--port", "8080"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(8080));
                assert!(args.runtime.site_config.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
