use log::{debug, info, warn};
use reqwest::header::{ACCEPT, AUTHORIZATION, LINK};
use tokio_util::sync::CancellationToken;

use crate::config::GitHubConfig;
use crate::error::{Result, SummarizeError};
use crate::pagination::parse_next_link;
use crate::retry::{read_body, HttpRequest, RetryPolicy};
use crate::types::{Issue, Repository};

const API_NAME: &str = "GitHub";

/// One decoded page of the issue listing.
#[derive(Debug)]
pub struct IssuePage {
    pub issues: Vec<Issue>,
    pub next: Option<String>,
}

pub struct GitHubClient {
    http: reqwest::Client,
    retry: RetryPolicy,
    config: GitHubConfig,
}

impl GitHubClient {
    pub fn new() -> Result<Self> {
        Self::with_config(GitHubConfig::default(), RetryPolicy::default())
    }

    pub fn with_config(config: GitHubConfig, retry: RetryPolicy) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(|e| SummarizeError::ConfigError(format!("Invalid HTTP client: {}", e)))?;

        Ok(Self {
            http,
            retry,
            config,
        })
    }

    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    pub fn issues_url(&self, repo: &Repository) -> String {
        format!(
            "{}/repos/{}/{}/issues?state=open&per_page={}",
            self.config.api_base_url.trim_end_matches('/'),
            repo.owner,
            repo.name,
            self.config.per_page
        )
    }

    /// Collects open issues in listing order, following `Link` cursors until
    /// the listing ends or `max_issues` issues are held. Pull requests are
    /// dropped and do not count toward the cap.
    pub async fn fetch_issues(
        &self,
        repo: &Repository,
        max_issues: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<Issue>> {
        info!("Collecting open issues from {}", repo.full_name);

        let mut all_issues: Vec<Issue> = Vec::new();
        let mut url = Some(self.issues_url(repo));
        let mut pages = 0usize;

        while let Some(page_url) = url.take() {
            if all_issues.len() >= max_issues {
                break;
            }

            debug!("Fetching page {} for {}: {}", pages + 1, repo.full_name, page_url);
            let page = self.fetch_page(&page_url, cancel).await?;
            pages += 1;

            for issue in page.issues {
                if issue.is_pull_request() {
                    continue;
                }
                all_issues.push(issue);
                if all_issues.len() >= max_issues {
                    info!("Reached maximum issue limit: {}", max_issues);
                    break;
                }
            }

            url = page.next;
        }

        info!(
            "Collected {} issues from {} in {} page(s)",
            all_issues.len(),
            repo.full_name,
            pages
        );

        Ok(all_issues)
    }

    /// Fetches and decodes a single page of the issue listing.
    pub async fn fetch_page(&self, url: &str, cancel: &CancellationToken) -> Result<IssuePage> {
        let mut request =
            HttpRequest::get(url).static_header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = self.config.token.as_deref().filter(|t| !t.is_empty()) {
            request = request.header(AUTHORIZATION, &format!("Bearer {}", token))?;
        }

        let response = self
            .retry
            .execute(&self.http, &request, cancel)
            .await
            .map_err(|e| e.for_api(API_NAME))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SummarizeError::GitHubStatus {
                status,
                url: url.to_string(),
            });
        }

        let next = match response.headers().get(LINK) {
            Some(value) => match value.to_str() {
                Ok(link) => parse_next_link(link),
                Err(e) => {
                    warn!(
                        "Ignoring undecodable Link header on {}: {}; treating page as last",
                        url, e
                    );
                    None
                }
            },
            None => None,
        };

        let body = read_body(response, cancel)
            .await
            .map_err(|e| e.for_api(API_NAME))?;
        let issues: Vec<Issue> = serde_json::from_slice(&body).map_err(|source| {
            SummarizeError::Decode {
                api: API_NAME,
                source,
            }
        })?;

        Ok(IssuePage { issues, next })
    }
}
