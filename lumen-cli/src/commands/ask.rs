use clap::Args;
use lumen_agent::CollectingObserver;
use lumen_core::Conversation;
use lumen_http::{HttpConfigBuilder, calculate_cost};

use super::{RuntimeArgs, build_runtime};
use crate::error::CliError;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Question for the assistant
    pub message: String,
    /// Scope the question to one dashboard
    #[arg(long)]
    pub dashboard: Option<String>,
    #[command(flatten)]
    pub runtime: RuntimeArgs,
}

/// One-shot question from the terminal, no history.
pub async fn run_ask(args: AskArgs) -> Result<(), CliError> {
    let config = args.runtime.apply(HttpConfigBuilder::from_env()?).build()?;
    let runtime = build_runtime(config)?;
    let resolved = runtime.resolve_agent(args.dashboard.as_deref())?;

    let observer = CollectingObserver::new();
    let outcome = resolved
        .agent
        .run_observed(args.message, Conversation::new(), &observer)
        .await
        .map_err(|failure| failure.error)?;

    let calls = observer.into_tool_calls();
    for call in &calls {
        println!("-> {} {} [{}]", call.name, call.input, call.status.as_str());
        println!("   {}", call.result);
    }
    if !calls.is_empty() {
        println!();
    }
    println!("{}", outcome.final_text);

    let stats = &outcome.stats;
    println!();
    println!(
        "[{} iterations, {} tool calls, {} in / {} out tokens, ~${:.4}, {}ms]",
        stats.iterations,
        stats.tool_calls,
        stats.usage.input_tokens,
        stats.usage.output_tokens,
        calculate_cost(stats.usage.input_tokens, stats.usage.output_tokens),
        stats.duration_ms()
    );
    Ok(())
}
