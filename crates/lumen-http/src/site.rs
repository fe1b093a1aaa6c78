//! # Site Configuration
//!
//! Per-deployment settings loaded from a camelCase JSON file: model
//! parameters, feature switches, the data scope the assistant should assume
//! and the topics it may or may not answer.
//!
//! ```json
//! {
//!   "siteId": "demo",
//!   "siteName": "Demo Hospital",
//!   "llm": { "provider": "bedrock", "region": "us-east-1", "model": "...", "maxTokens": 4096, "temperature": 0.7 },
//!   "features": { "enabledDashboards": ["block-utilization"], "conversationHistory": true },
//!   "dataScope": { "facilityIds": null, "serviceLines": null, "dateRangeLimitDays": 365 },
//!   "boundaries": { "canAnswer": ["Block utilization"], "cannotAnswer": ["Patient data"] }
//! }
//! ```

use lumen_agent::prompt::PromptBuilder;
use lumen_agent::{BedrockConfig, InferenceConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SiteConfigError {
    #[error("Failed to read site config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse site config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteConfig {
    pub site_id: String,
    pub site_name: String,
    pub llm: LlmSettings,
    pub features: SiteFeatures,
    pub data_scope: DataScope,
    pub boundaries: Boundaries,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmSettings {
    pub provider: String,
    pub region: Option<String>,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        let inference = InferenceConfig::default();
        Self {
            provider: "bedrock".to_string(),
            region: None,
            model: None,
            max_tokens: inference.max_tokens,
            temperature: inference.temperature,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteFeatures {
    pub enabled_dashboards: Vec<String>,
    /// Dashboard chats keep the full tool set instead of the dashboard's subset.
    pub allow_cross_dashboard: bool,
    pub max_queries_per_session: Option<u32>,
    pub show_calculation_explanations: bool,
    /// Include tool calls in chat responses.
    pub show_tool_calls: bool,
    /// Keep conversation history between requests sharing a `conversationId`.
    pub conversation_history: bool,
    pub response_streaming: bool,
}

impl Default for SiteFeatures {
    fn default() -> Self {
        Self {
            enabled_dashboards: Vec::new(),
            allow_cross_dashboard: false,
            max_queries_per_session: None,
            show_calculation_explanations: false,
            show_tool_calls: true,
            conversation_history: false,
            response_streaming: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataScope {
    pub facility_ids: Option<Vec<String>>,
    pub service_lines: Option<Vec<String>>,
    pub date_range_limit_days: u32,
}

impl Default for DataScope {
    fn default() -> Self {
        Self {
            facility_ids: None,
            service_lines: None,
            date_range_limit_days: 365,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Boundaries {
    pub can_answer: Vec<String>,
    pub cannot_answer: Vec<String>,
}

impl SiteConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SiteConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SiteConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&content).map_err(|source| SiteConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        info!(site = %config.site_name, path = %path.display(), "Loaded site config");
        Ok(config)
    }

    pub fn is_dashboard_enabled(&self, dashboard_id: &str) -> bool {
        self.features
            .enabled_dashboards
            .iter()
            .any(|id| id == dashboard_id)
    }

    /// Can/cannot-answer lists as prompt sections. Empty when both are empty.
    pub fn boundaries_prompt(&self) -> String {
        PromptBuilder::empty()
            .bulleted("What you CAN help with", &self.boundaries.can_answer)
            .bulleted(
                "What you CANNOT help with (politely decline these)",
                &self.boundaries.cannot_answer,
            )
            .build()
    }

    pub fn data_scope_prompt(&self) -> String {
        let scope = &self.data_scope;
        let mut items = Vec::new();
        if let Some(facilities) = &scope.facility_ids {
            items.push(format!("Limited to facilities: {}", facilities.join(", ")));
        }
        if let Some(service_lines) = &scope.service_lines {
            items.push(format!(
                "Limited to service lines: {}",
                service_lines.join(", ")
            ));
        }
        items.push(format!(
            "Date range limited to last {} days",
            scope.date_range_limit_days
        ));
        PromptBuilder::empty().bulleted("Data Scope", items).build()
    }

    pub fn inference_config(&self) -> InferenceConfig {
        InferenceConfig {
            max_tokens: self.llm.max_tokens,
            temperature: self.llm.temperature,
        }
    }

    /// Apply the site's region and model to a client configuration.
    pub fn apply_to(&self, bedrock: BedrockConfig) -> BedrockConfig {
        let mut bedrock = bedrock;
        if let Some(region) = &self.llm.region {
            bedrock = bedrock.with_region(region.clone());
        }
        if let Some(model) = &self.llm.model {
            bedrock = bedrock.with_model_id(model.clone());
        }
        bedrock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample() -> SiteConfig {
        serde_json::from_value(serde_json::json!({
            "siteId": "demo",
            "siteName": "Demo Hospital",
            "llm": {"provider": "bedrock", "region": "us-west-2", "model": "m-1", "maxTokens": 2048, "temperature": 0.2},
            "features": {"enabledDashboards": ["block-utilization"], "conversationHistory": true},
            "dataScope": {"facilityIds": ["F1", "F2"], "serviceLines": null, "dateRangeLimitDays": 90},
            "boundaries": {"canAnswer": ["Block utilization"], "cannotAnswer": ["Patient data"]}
        }))
        .unwrap()
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: SiteConfig = serde_json::from_str(r#"{"siteName": "Bare"}"#).unwrap();
        assert_eq!(config.site_name, "Bare");
        assert!(config.features.show_tool_calls);
        assert!(!config.features.conversation_history);
        assert_eq!(config.data_scope.date_range_limit_days, 365);
        assert_eq!(config.inference_config(), InferenceConfig::default());
    }

    #[test]
    fn test_dashboard_enabled() {
        let config = sample();
        assert!(config.is_dashboard_enabled("block-utilization"));
        assert!(!config.is_dashboard_enabled("case-volume"));
    }

    #[test]
    fn test_boundaries_prompt() {
        assert_eq!(
            sample().boundaries_prompt(),
            "## What you CAN help with:\n- Block utilization\n\n\
             ## What you CANNOT help with (politely decline these):\n- Patient data"
        );
        assert!(SiteConfig::default().boundaries_prompt().is_empty());
    }

    #[test]
    fn test_data_scope_prompt() {
        assert_eq!(
            sample().data_scope_prompt(),
            "## Data Scope:\n- Limited to facilities: F1, F2\n- Date range limited to last 90 days"
        );
    }

    #[test]
    fn test_apply_to_bedrock_config() {
        let bedrock = sample().apply_to(BedrockConfig::default());
        assert_eq!(bedrock.region, "us-west-2");
        assert_eq!(bedrock.model_id, "m-1");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&sample()).unwrap()).unwrap();
        assert_eq!(SiteConfig::load(file.path()).unwrap(), sample());

        let mut broken = tempfile::NamedTempFile::new().unwrap();
        write!(broken, "{{not json").unwrap();
        assert!(matches!(
            SiteConfig::load(broken.path()),
            Err(SiteConfigError::Parse { .. })
        ));
        assert!(matches!(
            SiteConfig::load("/nonexistent/site.json"),
            Err(SiteConfigError::Io { .. })
        ));
    }
}
