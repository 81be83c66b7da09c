use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_ISSUES: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SummarizeConfig {
    pub github: GitHubConfig,
    pub anthropic: AnthropicConfig,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Optional token; unauthenticated requests get the public rate limit.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    pub api_base_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub per_page: u8,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base_url: "https://api.github.com".to_string(),
            user_agent: "gitissuesum".to_string(),
            timeout_seconds: 30,
            per_page: 100,
        }
    }
}

impl GitHubConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    #[serde(default, skip_serializing)]
    pub api_key: String,
    pub api_url: String,
    pub api_version: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: "https://api.anthropic.com/v1/messages".to_string(),
            api_version: "2023-06-01".to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 4096,
            timeout_seconds: 120,
        }
    }
}

impl AnthropicConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Fixed retry schedule shared by both API clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Wait before each attempt. The first entry is never waited on.
    pub schedule_ms: Vec<u64>,
    pub transient_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            schedule_ms: vec![0, 1000, 2000],
            transient_statuses: vec![429, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    pub fn schedule(&self) -> Vec<Duration> {
        self.schedule_ms
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect()
    }
}
