//! Dashboard manifests.
//!
//! Each dashboard is a `<id>.json` file naming the tools a chat scoped to
//! that dashboard may use. The catalog is read once at startup.

use lumen_agent::prompt::PromptBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Failed to read dashboards directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardManifest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub available_tools: Vec<String>,
    #[serde(default)]
    pub out_of_scope: Vec<String>,
    #[serde(default)]
    pub suggested_questions: Vec<String>,
}

impl DashboardManifest {
    /// Prompt section describing the dashboard the user is looking at.
    pub fn prompt_section(&self) -> String {
        let mut header = format!("## Current Dashboard: {}", self.name);
        if !self.description.is_empty() {
            header.push('\n');
            header.push_str(&self.description);
        }
        PromptBuilder::empty()
            .section(header)
            .bulleted(
                "Outside this dashboard's scope (point the user elsewhere)",
                &self.out_of_scope,
            )
            .build()
    }
}

/// Dashboards keyed by id, in id order.
#[derive(Debug, Clone, Default)]
pub struct DashboardCatalog {
    dashboards: BTreeMap<String, DashboardManifest>,
}

impl DashboardCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` manifest in `dir`, keyed by file stem.
    ///
    /// Unreadable or malformed manifests are skipped with a warning.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, DashboardError> {
        let dir = dir.as_ref();
        let io_err = |source| DashboardError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut catalog = Self::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            let manifest = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|content| {
                    serde_json::from_str::<DashboardManifest>(&content).map_err(|e| e.to_string())
                });
            match manifest {
                Ok(manifest) => {
                    if manifest.id != id {
                        warn!(file = %path.display(), id = %manifest.id, "Manifest id differs from file name; using file name");
                    }
                    catalog.dashboards.insert(id.to_string(), manifest);
                }
                Err(error) => {
                    warn!(file = %path.display(), %error, "Skipping unreadable dashboard manifest");
                }
            }
        }

        info!(dir = %dir.display(), count = catalog.len(), "Loaded dashboard catalog");
        Ok(catalog)
    }

    pub fn from_manifests(manifests: impl IntoIterator<Item = DashboardManifest>) -> Self {
        Self {
            dashboards: manifests
                .into_iter()
                .map(|manifest| (manifest.id.clone(), manifest))
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&DashboardManifest> {
        self.dashboards.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DashboardManifest)> {
        self.dashboards
            .iter()
            .map(|(id, manifest)| (id.as_str(), manifest))
    }

    pub fn manifests(&self) -> impl Iterator<Item = &DashboardManifest> {
        self.dashboards.values()
    }

    pub fn len(&self) -> usize {
        self.dashboards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dashboards.is_empty()
    }
}
