use log::{debug, info};
use reqwest::header::{HeaderName, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::config::AnthropicConfig;
use crate::error::{Result, SummarizeError};
use crate::retry::{read_body, HttpRequest, RetryPolicy};

const API_NAME: &str = "Anthropic";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

impl MessageResponse {
    /// All `text` blocks joined in order.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect()
    }
}

pub struct AnthropicClient {
    http: reqwest::Client,
    retry: RetryPolicy,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn with_config(config: AnthropicConfig, retry: RetryPolicy) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(SummarizeError::ConfigError(
                "Anthropic API key is required".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| SummarizeError::ConfigError(format!("Invalid HTTP client: {}", e)))?;

        Ok(Self {
            http,
            retry,
            config,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Sends `prompt` as a single user message and returns the reply text.
    pub async fn send_message(&self, prompt: &str, cancel: &CancellationToken) -> Result<String> {
        let payload = MessageRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let request = HttpRequest::post(&self.config.api_url)
            .json(&payload)?
            .static_header(CONTENT_TYPE, "application/json")
            .header(HeaderName::from_static("x-api-key"), &self.config.api_key)?
            .header(
                HeaderName::from_static("anthropic-version"),
                &self.config.api_version,
            )?;

        info!(
            "Requesting summary from {} ({} prompt bytes)",
            self.config.model,
            prompt.len()
        );

        let response = self
            .retry
            .execute(&self.http, &request, cancel)
            .await
            .map_err(|e| e.for_api(API_NAME))?;

        let status = response.status();
        let body = read_body(response, cancel)
            .await
            .map_err(|e| e.for_api(API_NAME))?;

        if !status.is_success() {
            let upstream = serde_json::from_slice::<MessageResponse>(&body)
                .ok()
                .and_then(|r| r.error);
            debug!("Anthropic error body: {}", String::from_utf8_lossy(&body));
            return Err(SummarizeError::AnthropicStatus {
                status,
                error_type: upstream.as_ref().map(|e| e.kind.clone()),
                message: upstream.map(|e| e.message),
            });
        }

        let result: MessageResponse =
            serde_json::from_slice(&body).map_err(|source| SummarizeError::Decode {
                api: API_NAME,
                source,
            })?;

        if result.content.is_empty() {
            return Err(SummarizeError::EmptyResponse);
        }

        Ok(result.text())
    }
}
