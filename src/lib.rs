pub mod anthropic;
pub mod client;
pub mod config;
pub mod error;
pub mod pagination;
pub mod prompt;
pub mod retry;
pub mod types;

use std::io::Write;
use std::time::Duration;

use log::info;
use tokio_util::sync::CancellationToken;

pub use anthropic::{AnthropicClient, MessageRequest, MessageResponse};
pub use client::{GitHubClient, IssuePage};
pub use config::{AnthropicConfig, GitHubConfig, RetryConfig, SummarizeConfig};
pub use error::{Result, SummarizeError};
pub use pagination::parse_next_link;
pub use prompt::build_prompt;
pub use retry::{HttpRequest, RetryPolicy};
pub use types::{GitHubLabel, GitHubUser, Issue, PullRequestMarker, Repository};

/// Fetches a repository's open issues and asks Claude to summarize them.
pub struct IssueSummarizer {
    github: GitHubClient,
    anthropic: AnthropicClient,
}

impl IssueSummarizer {
    pub fn with_config(config: SummarizeConfig) -> Result<Self> {
        let retry = RetryPolicy::from(&config.retry);
        let github = GitHubClient::with_config(config.github, retry.clone())?;
        let anthropic = AnthropicClient::with_config(config.anthropic, retry)?;

        Ok(Self { github, anthropic })
    }

    pub fn github(&self) -> &GitHubClient {
        &self.github
    }

    pub fn anthropic(&self) -> &AnthropicClient {
        &self.anthropic
    }

    pub async fn fetch_issues(
        &self,
        repo: &Repository,
        max_issues: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<Issue>> {
        self.github.fetch_issues(repo, max_issues, cancel).await
    }

    /// Runs fetch, prompt and summary in sequence, writing progress and the
    /// final summary to `out`. A repository without open issues is reported
    /// and returns `Ok` without contacting the model.
    pub async fn summarize<W: Write>(
        &self,
        repo: &Repository,
        max_issues: usize,
        cancel: &CancellationToken,
        out: &mut W,
    ) -> Result<()> {
        writeln!(out, "Fetching issues from {}...", repo.full_name)?;

        let issues = self
            .github
            .fetch_issues(repo, max_issues, cancel)
            .await
            .map_err(|e| SummarizeError::FetchFailed(Box::new(e)))?;

        if issues.is_empty() {
            writeln!(out, "No open issues found.")?;
            return Ok(());
        }

        writeln!(
            out,
            "Found {} issues. Sending to Claude for analysis...",
            issues.len()
        )?;
        out.flush()?;

        let prompt = build_prompt(repo, &issues);
        info!(
            "Built prompt for {} issues ({} bytes)",
            issues.len(),
            prompt.len()
        );

        let summary = self
            .anthropic
            .send_message(&prompt, cancel)
            .await
            .map_err(|e| SummarizeError::SummaryFailed(Box::new(e)))?;

        writeln!(out)?;
        writeln!(out, "{}", summary)?;
        out.flush()?;
        Ok(())
    }
}

pub struct IssueSummarizerBuilder {
    config: SummarizeConfig,
}

impl IssueSummarizerBuilder {
    pub fn new() -> Self {
        Self {
            config: SummarizeConfig::default(),
        }
    }

    pub fn anthropic_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.anthropic.api_key = key.into();
        self
    }

    pub fn github_token(mut self, token: Option<String>) -> Self {
        self.config.github.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.anthropic.model = model.into();
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.anthropic.max_tokens = max_tokens;
        self
    }

    pub fn github_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.github.api_base_url = url.into();
        self
    }

    pub fn anthropic_api_url(mut self, url: impl Into<String>) -> Self {
        self.config.anthropic.api_url = url.into();
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.github.user_agent = agent.into();
        self
    }

    pub fn github_timeout(mut self, seconds: u64) -> Self {
        self.config.github.timeout_seconds = seconds;
        self
    }

    pub fn anthropic_timeout(mut self, seconds: u64) -> Self {
        self.config.anthropic.timeout_seconds = seconds;
        self
    }

    /// Waits longer than `u64::MAX` milliseconds saturate.
    pub fn retry_schedule(mut self, schedule: &[Duration]) -> Self {
        self.config.retry.schedule_ms = schedule
            .iter()
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .collect();
        self
    }

    pub fn config(&self) -> &SummarizeConfig {
        &self.config
    }

    pub fn build(self) -> Result<IssueSummarizer> {
        IssueSummarizer::with_config(self.config)
    }
}

impl Default for IssueSummarizerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Summarizes `owner/repo` to stdout with the default endpoints.
pub async fn run(
    owner: &str,
    repo: &str,
    api_key: &str,
    github_token: Option<String>,
    model: &str,
    max_issues: usize,
    cancel: &CancellationToken,
) -> Result<()> {
    let builder = IssueSummarizerBuilder::new()
        .anthropic_api_key(api_key)
        .github_token(github_token)
        .model(model);

    let mut out = std::io::stdout();
    run_with(builder, owner, repo, max_issues, cancel, &mut out).await
}

/// Like [`run`], but endpoints, credentials and timeouts come from `builder`
/// and output goes to `out`.
pub async fn run_with<W: Write>(
    builder: IssueSummarizerBuilder,
    owner: &str,
    repo: &str,
    max_issues: usize,
    cancel: &CancellationToken,
    out: &mut W,
) -> Result<()> {
    let repository = Repository::parse(&format!("{}/{}", owner, repo))?;
    builder
        .build()?
        .summarize(&repository, max_issues, cancel, out)
        .await
}
