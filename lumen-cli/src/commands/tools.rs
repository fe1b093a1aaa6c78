use clap::Subcommand;
use lumen_tools::standard_registry;
use serde_json::Value;

use crate::error::CliError;

#[derive(Subcommand, Debug)]
pub enum ToolsCommand {
    /// List the registered tools
    List {
        /// Print the full definitions, input schemas included, as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run one tool directly, bypassing the model
    Call {
        /// Tool name
        name: String,
        /// Tool input as a JSON object
        #[arg(long, default_value = "{}")]
        input: String,
    },
}

pub async fn run_tools(command: ToolsCommand) -> Result<(), CliError> {
    let registry = standard_registry()?;

    match command {
        ToolsCommand::List { json: true } => {
            let definitions = registry.list_definitions();
            println!("{}", serde_json::to_string_pretty(&definitions)?);
        }
        ToolsCommand::List { json: false } => {
            for definition in registry.list_definitions() {
                println!("{:<32} {}", definition.name, definition.description);
            }
        }
        ToolsCommand::Call { name, input } => {
            let input: Value = serde_json::from_str(&input)?;
            let output = registry.execute(&name, input).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
