//! # HTTP Chat Runtime
//!
//! Shared state behind the axum router: one [`AgentLoop`] per dashboard
//! (plus the default, unscoped one), the usage tracker, conversation
//! history and metrics.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod shutdown;
pub mod types;

use lumen_agent::prompt::PromptBuilder;
use lumen_agent::{AgentError, AgentLoop, AgentResult, LoopConfig, ModelClient};
use lumen_tools::ToolRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

pub use config::{ConfigError, HttpConfig, HttpConfigBuilder};
pub use error::{ApiError, ErrorResponse};
pub use shutdown::shutdown_signal;
pub use types::{ChatRequest, ChatResponse};

use crate::conversations::ConversationStore;
use crate::dashboards::{DashboardCatalog, DashboardManifest};
use crate::metrics::ChatMetrics;
use crate::site::SiteConfig;
use crate::usage::UsageTracker;

/// Agent selected for one chat request.
pub struct ResolvedAgent {
    pub agent: Arc<AgentLoop>,
    pub dashboard: Option<DashboardManifest>,
}

#[derive(Clone)]
pub struct HttpChatRuntime {
    pub config: Arc<HttpConfig>,
    pub site: Option<Arc<SiteConfig>>,
    pub dashboards: Arc<DashboardCatalog>,
    pub usage: Arc<UsageTracker>,
    pub conversations: Arc<ConversationStore>,
    pub metrics: Arc<ChatMetrics>,
    tools: Arc<ToolRegistry>,
    default_agent: Arc<AgentLoop>,
    dashboard_agents: Arc<HashMap<String, Arc<AgentLoop>>>,
}

impl HttpChatRuntime {
    pub fn builder(model: Arc<dyn ModelClient>, tools: ToolRegistry) -> HttpChatRuntimeBuilder {
        HttpChatRuntimeBuilder {
            model,
            tools,
            config: HttpConfig::default(),
            site: None,
            dashboards: DashboardCatalog::default(),
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Whether `conversationId` history is kept between requests.
    pub fn history_enabled(&self) -> bool {
        self.site
            .as_ref()
            .is_some_and(|site| site.features.conversation_history)
    }

    pub fn show_tool_calls(&self) -> bool {
        self.site
            .as_ref()
            .is_none_or(|site| site.features.show_tool_calls)
    }

    /// Without a site config every dashboard in the catalog is enabled.
    pub fn is_dashboard_enabled(&self, dashboard_id: &str) -> bool {
        self.site
            .as_ref()
            .is_none_or(|site| site.is_dashboard_enabled(dashboard_id))
    }

    /// Pick the agent for an optional dashboard id.
    ///
    /// # Errors
    ///
    /// `DashboardNotFound` for ids missing from the catalog and
    /// `DashboardDisabled` for dashboards the site has not enabled.
    pub fn resolve_agent(&self, dashboard: Option<&str>) -> Result<ResolvedAgent, ApiError> {
        let Some(id) = dashboard else {
            return Ok(ResolvedAgent {
                agent: self.default_agent.clone(),
                dashboard: None,
            });
        };

        let (Some(manifest), Some(agent)) = (self.dashboards.get(id), self.dashboard_agents.get(id))
        else {
            return Err(ApiError::DashboardNotFound(id.to_string()));
        };
        if !self.is_dashboard_enabled(id) {
            return Err(ApiError::DashboardDisabled(id.to_string()));
        }
        Ok(ResolvedAgent {
            agent: agent.clone(),
            dashboard: Some(manifest.clone()),
        })
    }
}

pub struct HttpChatRuntimeBuilder {
    model: Arc<dyn ModelClient>,
    tools: ToolRegistry,
    config: HttpConfig,
    site: Option<SiteConfig>,
    dashboards: DashboardCatalog,
}

impl HttpChatRuntimeBuilder {
    pub fn config(mut self, config: HttpConfig) -> Self {
        self.config = config;
        self
    }

    pub fn site(mut self, site: SiteConfig) -> Self {
        self.site = Some(site);
        self
    }

    pub fn dashboards(mut self, dashboards: DashboardCatalog) -> Self {
        self.dashboards = dashboards;
        self
    }

    /// Assemble prompts and build one agent per dashboard.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the resulting loop configuration is invalid.
    pub fn build(self) -> AgentResult<HttpChatRuntime> {
        let mut prompt = PromptBuilder::new();
        let mut loop_config = LoopConfig::default().with_max_iterations(self.config.max_iterations);
        if let Some(site) = &self.site {
            prompt = prompt
                .section(site.boundaries_prompt())
                .section(site.data_scope_prompt());
            loop_config = loop_config.with_inference(site.inference_config());
        }

        let tools = Arc::new(self.tools);
        let default_agent = Arc::new(AgentLoop::new(
            self.model.clone(),
            tools.clone(),
            prompt.build(),
            loop_config.clone(),
        )?);

        let cross_dashboard = self
            .site
            .as_ref()
            .is_some_and(|site| site.features.allow_cross_dashboard);
        let mut dashboard_agents = HashMap::new();
        for (id, manifest) in self.dashboards.iter() {
            let scoped = if cross_dashboard {
                tools.clone()
            } else {
                Arc::new(tools.subset(&manifest.available_tools))
            };
            if scoped.is_empty() {
                warn!(dashboard = %id, "Dashboard exposes no registered tools");
            }
            let agent = AgentLoop::new(
                self.model.clone(),
                scoped,
                prompt.clone().section(manifest.prompt_section()).build(),
                loop_config.clone(),
            )?;
            dashboard_agents.insert(id.to_string(), Arc::new(agent));
        }

        info!(
            tools = tools.len(),
            dashboards = dashboard_agents.len(),
            max_iterations = loop_config.max_iterations,
            "Chat runtime ready"
        );

        Ok(HttpChatRuntime {
            usage: Arc::new(UsageTracker::new(self.config.usage_log_capacity)),
            conversations: Arc::new(ConversationStore::new(self.config.conversation_capacity)),
            metrics: Arc::new(
                ChatMetrics::new()
                    .map_err(|e| AgentError::InvalidConfig(format!("metrics registry: {e}")))?,
            ),
            config: Arc::new(self.config),
            site: self.site.map(Arc::new),
            dashboards: Arc::new(self.dashboards),
            tools,
            default_agent,
            dashboard_agents: Arc::new(dashboard_agents),
        })
    }
}
