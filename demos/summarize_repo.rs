use gitissuesum::{IssueSummarizerBuilder, Repository};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let target = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tokio-rs/axum".to_string());
    let repo = Repository::parse(&target)?;

    let summarizer = IssueSummarizerBuilder::new()
        .anthropic_api_key(std::env::var("ANTHROPIC_API_KEY")?)
        .github_token(std::env::var("GITHUB_TOKEN").ok())
        .build()?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        on_signal.cancel();
    });

    let mut out = std::io::stdout();
    summarizer.summarize(&repo, 50, &cancel, &mut out).await?;

    Ok(())
}
