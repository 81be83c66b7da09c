//! `gitissuesum`: summarize a GitHub repository's open issues with Claude.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use gitissuesum::config::{DEFAULT_MAX_ISSUES, DEFAULT_MODEL};
use gitissuesum::{IssueSummarizerBuilder, Repository, SummarizeError};
use log::warn;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "gitissuesum")]
#[command(version)]
#[command(about = "Summarize open GitHub issues using Claude")]
#[command(
    long_about = "Fetches open issues from a GitHub repository and generates an AI-powered \
summary using Claude."
)]
#[command(after_long_help = r#"EXAMPLES
    $ gitissuesum tokio-rs/axum
    $ gitissuesum https://github.com/rust-lang/cargo --max-issues 50

ENVIRONMENT VARIABLES
    ANTHROPIC_API_KEY   Anthropic API key (required)
    GITHUB_TOKEN        GitHub token, raises the API rate limit (optional)
    RUST_LOG            Log filter, e.g. gitissuesum=debug
"#)]
struct Cli {
    /// Repository as owner/repo or a GitHub URL
    #[arg(value_name = "REPO")]
    repo: String,

    /// Maximum number of issues to fetch
    #[arg(long, default_value_t = DEFAULT_MAX_ISSUES, value_parser = parse_max_issues)]
    max_issues: usize,

    /// Claude model to use
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Abort the whole run after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true, hide = true)]
    anthropic_api_key: Option<String>,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, hide = true)]
    github_token: Option<String>,
}

fn parse_max_issues(value: &str) -> Result<usize, String> {
    let n: usize = value
        .parse()
        .map_err(|_| format!("{:?} is not a whole number", value))?;
    if n == 0 {
        return Err("must be at least 1".to_string());
    }
    Ok(n)
}

fn install_cancellation(cancel: &CancellationToken, timeout: Option<u64>) {
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            on_signal.cancel();
        }
    });

    if let Some(secs) = timeout {
        let on_deadline = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            warn!("Deadline of {}s reached, cancelling", secs);
            on_deadline.cancel();
        });
    }
}

async fn run(cli: Cli, cancel: &CancellationToken) -> anyhow::Result<()> {
    let repo = Repository::parse(&cli.repo)?;

    let api_key = cli
        .anthropic_api_key
        .filter(|key| !key.is_empty())
        .context("ANTHROPIC_API_KEY environment variable is required")?;

    let summarizer = IssueSummarizerBuilder::new()
        .anthropic_api_key(api_key)
        .github_token(cli.github_token)
        .model(cli.model)
        .build()?;

    let mut out = std::io::stdout();
    summarizer
        .summarize(&repo, cli.max_issues, cancel, &mut out)
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let cancel = CancellationToken::new();
    install_cancellation(&cancel, cli.timeout);

    match run(cli, &cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            let cancelled = err
                .downcast_ref::<SummarizeError>()
                .map_or(false, SummarizeError::is_cancelled);
            if cancelled {
                ExitCode::from(130)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
