//! # Bedrock Converse Client
//!
//! [`ModelClient`] over the Amazon Bedrock Converse HTTP API:
//! `POST {endpoint}/model/{modelId}/converse`.
//!
//! Requests authenticate with a Bedrock API key sent as a bearer token
//! (`AWS_BEARER_TOKEN_BEDROCK`). The client performs no retries.
//!
//! ## Environment Variables
//!
//! - `AWS_REGION` - region used to derive the endpoint (default: `us-east-1`)
//! - `AWS_BEARER_TOKEN_BEDROCK` - Bedrock API key
//! - `LUMEN_MODEL_ID` - model or inference profile id
//! - `LUMEN_BEDROCK_ENDPOINT` - full endpoint override, e.g. for a proxy

use async_trait::async_trait;
use lumen_core::{Conversation, Role};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use crate::adapter::{self, WireMessage, WireToolSpec};
use crate::model::{InferenceConfig, ModelClient, ModelError, ModelResponse, StopSignal, TokenUsage};

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_MODEL_ID: &str = "us.anthropic.claude-sonnet-4-5-20250929-v1:0";

/// Connection settings for [`BedrockClient`].
#[derive(Clone)]
pub struct BedrockConfig {
    pub region: String,
    pub model_id: String,
    /// Overrides the regional endpoint when set.
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for BedrockConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            endpoint: None,
            api_key: None,
            timeout: Duration::from_secs(120),
        }
    }
}

impl fmt::Debug for BedrockConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BedrockConfig")
            .field("region", &self.region)
            .field("model_id", &self.model_id)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl BedrockConfig {
    /// Defaults overlaid with whatever the environment provides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(region) = non_empty_env("AWS_REGION") {
            config.region = region;
        }
        if let Some(model_id) = non_empty_env("LUMEN_MODEL_ID") {
            config.model_id = model_id;
        }
        config.endpoint = non_empty_env("LUMEN_BEDROCK_ENDPOINT");
        config.api_key = non_empty_env("AWS_BEARER_TOKEN_BEDROCK");
        config
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL requests are sent to.
    pub fn endpoint_url(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://bedrock-runtime.{}.amazonaws.com", self.region))
    }

    fn converse_url(&self) -> Result<Url, ModelError> {
        let endpoint = self.endpoint_url();
        let mut url = Url::parse(&endpoint)
            .map_err(|e| ModelError::Config(format!("invalid endpoint '{endpoint}': {e}")))?;
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                ModelError::Config(format!("endpoint '{endpoint}' cannot carry a path"))
            })?;
            segments
                .pop_if_empty()
                .extend(["model", self.model_id.as_str(), "converse"]);
        }
        Ok(url)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConverseRequest<'a> {
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    system: Vec<SystemBlock<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<ToolConfig<'a>>,
    inference_config: &'a InferenceConfig,
}

#[derive(Serialize)]
struct SystemBlock<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct ToolConfig<'a> {
    tools: &'a [WireToolSpec],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConverseResponse {
    #[serde(default)]
    output: Option<ConverseOutput>,
    stop_reason: String,
    #[serde(default)]
    usage: Option<ConverseUsage>,
}

#[derive(Deserialize)]
struct ConverseOutput {
    #[serde(default)]
    message: Option<RawMessage>,
}

#[derive(Deserialize)]
struct RawMessage {
    role: Role,
    #[serde(default)]
    content: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConverseUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
    #[serde(default)]
    total_tokens: Option<u64>,
}

impl From<ConverseUsage> for TokenUsage {
    fn from(usage: ConverseUsage) -> Self {
        TokenUsage {
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            total_tokens: usage
                .total_tokens
                .unwrap_or(usage.input_tokens + usage.output_tokens),
        }
    }
}

/// Bedrock Converse [`ModelClient`].
#[derive(Debug, Clone)]
pub struct BedrockClient {
    http: reqwest::Client,
    url: Url,
    config: BedrockConfig,
}

impl BedrockClient {
    /// # Errors
    ///
    /// `ModelError::Config` if the endpoint URL is invalid, or
    /// `ModelError::Http` if the HTTP client cannot be built.
    pub fn new(config: BedrockConfig) -> Result<Self, ModelError> {
        if config.api_key.is_none() {
            warn!("No Bedrock API key configured; requests will be sent unauthenticated");
        }
        let url = config.converse_url()?;
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, url, config })
    }

    pub fn from_env() -> Result<Self, ModelError> {
        Self::new(BedrockConfig::from_env())
    }

    pub fn config(&self) -> &BedrockConfig {
        &self.config
    }
}

#[async_trait]
impl ModelClient for BedrockClient {
    async fn send(
        &self,
        conversation: &Conversation,
        tools: &[WireToolSpec],
        system_prompt: &str,
        inference: &InferenceConfig,
    ) -> Result<ModelResponse, ModelError> {
        let body = ConverseRequest {
            messages: adapter::conversation_to_wire(conversation),
            system: if system_prompt.is_empty() {
                Vec::new()
            } else {
                vec![SystemBlock {
                    text: system_prompt,
                }]
            },
            tool_config: (!tools.is_empty()).then_some(ToolConfig { tools }),
            inference_config: inference,
        };

        debug!(
            model = %self.config.model_id,
            messages = body.messages.len(),
            tools = tools.len(),
            "Sending Converse request"
        );

        let mut request = self.http.post(self.url.clone()).json(&body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                message: error_message(&raw),
            });
        }

        let parsed: ConverseResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Decode(e.to_string()))?;

        let message = parsed
            .output
            .and_then(|output| output.message)
            .ok_or(ModelError::EmptyResponse)?;
        if message.role != Role::Assistant {
            return Err(ModelError::Decode(format!(
                "expected an assistant message, got '{}'",
                message.role
            )));
        }

        let stop_signal = StopSignal::from_stop_reason(&parsed.stop_reason);
        let usage = parsed.usage.map(TokenUsage::from).unwrap_or_default();
        debug!(
            stop_reason = %parsed.stop_reason,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Converse response received"
        );

        Ok(ModelResponse {
            turn: adapter::turn_from_wire(Role::Assistant, message.content),
            stop_signal,
            usage,
        })
    }
}

/// Bedrock error bodies look like `{"message": "..."}`.
fn error_message(raw: &str) -> String {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|body| {
            body.get("message")
                .or_else(|| body.get("Message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| raw.trim().to_string())
}
