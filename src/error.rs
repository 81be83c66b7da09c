use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("Invalid repository format: {0}")]
    InvalidRepository(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to build request: {0}")]
    RequestBuild(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("{api} API request failed: {source}")]
    RequestFailed {
        api: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("GitHub API returned status {} for {url}", .status.as_u16())]
    GitHubStatus { status: StatusCode, url: String },

    #[error("Anthropic API returned status {}{}", .status.as_u16(), describe_upstream(.error_type, .message))]
    AnthropicStatus {
        status: StatusCode,
        error_type: Option<String>,
        message: Option<String>,
    },

    #[error("failed to decode {api} response: {source}")]
    Decode {
        api: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("empty response from Claude")]
    EmptyResponse,

    #[error("operation cancelled")]
    Cancelled,

    #[error("failed to fetch issues: {0}")]
    FetchFailed(#[source] Box<SummarizeError>),

    #[error("failed to get summary from Claude: {0}")]
    SummaryFailed(#[source] Box<SummarizeError>),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SummarizeError {
    /// True when the run was aborted through its cancellation token, at any
    /// depth of stage wrapping.
    pub fn is_cancelled(&self) -> bool {
        match self {
            SummarizeError::Cancelled => true,
            SummarizeError::FetchFailed(inner) | SummarizeError::SummaryFailed(inner) => {
                inner.is_cancelled()
            }
            _ => false,
        }
    }

    /// Attach the API name to a transport failure coming out of the retry
    /// executor. Other errors pass through untouched.
    pub(crate) fn for_api(self, api: &'static str) -> Self {
        match self {
            SummarizeError::NetworkError(source) => SummarizeError::RequestFailed { api, source },
            other => other,
        }
    }
}

fn describe_upstream(error_type: &Option<String>, message: &Option<String>) -> String {
    match (error_type.as_deref(), message.as_deref()) {
        (Some(kind), Some(msg)) if !msg.is_empty() => format!(": {}: {}", kind, msg),
        (Some(kind), _) => format!(": {}", kind),
        (None, Some(msg)) if !msg.is_empty() => format!(": {}", msg),
        _ => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, SummarizeError>;
