use lumen_http::DashboardCatalog;
use std::path::Path;

use crate::error::CliError;

pub fn run_dashboards(dir: &Path) -> Result<(), CliError> {
    let catalog = DashboardCatalog::load_dir(dir)?;
    if catalog.is_empty() {
        println!("No dashboard manifests found in {}", dir.display());
        return Ok(());
    }

    for manifest in catalog.manifests() {
        println!("{} - {}", manifest.id, manifest.name);
        if !manifest.available_tools.is_empty() {
            println!("  tools: {}", manifest.available_tools.join(", "));
        }
        for question in &manifest.suggested_questions {
            println!("  ? {question}");
        }
    }
    Ok(())
}
