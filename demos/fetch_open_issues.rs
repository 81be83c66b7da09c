use gitissuesum::{GitHubClient, GitHubConfig, Repository, RetryPolicy};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = GitHubConfig {
        token: std::env::var("GITHUB_TOKEN").ok(),
        ..Default::default()
    };
    let client = GitHubClient::with_config(config, RetryPolicy::default())?;

    let repo = Repository::parse("tokio-rs/tokio")?;
    let issues = client
        .fetch_issues(&repo, 20, &CancellationToken::new())
        .await?;

    println!("Found {} open issues in {}", issues.len(), repo);
    for issue in &issues {
        let labels = issue.label_names();
        if labels.is_empty() {
            println!("  #{}: {}", issue.number, issue.title);
        } else {
            println!("  #{}: {} [{}]", issue.number, issue.title, labels.join(", "));
        }
    }

    Ok(())
}
