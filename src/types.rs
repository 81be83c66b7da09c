use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SummarizeError};

/// One record of the `/repos/{owner}/{repo}/issues` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub user: GitHubUser,
    #[serde(default)]
    pub labels: Vec<GitHubLabel>,
    #[serde(default)]
    pub comments: u32,
    pub created_at: DateTime<Utc>,
    /// Set by GitHub when the record is actually a pull request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<PullRequestMarker>,
}

impl Issue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    pub fn label_names(&self) -> Vec<&str> {
        self.labels.iter().map(|label| label.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubLabel {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestMarker {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
    pub full_name: String,
}

fn repo_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9._-]+$").expect("valid repository name regex"))
}

impl Repository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        let owner = owner.into();
        let name = name.into();
        let full_name = format!("{}/{}", owner, name);
        Self {
            owner,
            name,
            full_name,
        }
    }

    /// Accepts `owner/repo` or a repository URL such as
    /// `https://github.com/owner/repo.git`. Anything after the repo segment
    /// (`/tree/main`, `/issues`) is ignored.
    pub fn parse(arg: &str) -> Result<Self> {
        let path = if arg.contains("://") {
            let url = reqwest::Url::parse(arg).map_err(|e| {
                SummarizeError::InvalidRepository(format!("invalid URL {:?}: {}", arg, e))
            })?;
            let path = url.path().trim_start_matches('/');
            path.strip_suffix(".git").unwrap_or(path).to_string()
        } else {
            arg.to_string()
        };

        let parts: Vec<&str> = path.splitn(3, '/').collect();
        if parts.len() < 2 || parts[0].is_empty() || parts[1].is_empty() {
            return Err(SummarizeError::InvalidRepository(format!(
                "{:?}, expected owner/repo or a GitHub URL",
                path
            )));
        }

        let re = repo_name_regex();
        if !re.is_match(parts[0]) || !re.is_match(parts[1]) {
            return Err(SummarizeError::InvalidRepository(format!(
                "invalid owner or repo name in {:?}",
                path
            )));
        }

        Ok(Self::new(parts[0], parts[1]))
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full_name)
    }
}
