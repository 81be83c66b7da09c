//! Summarize Workflow Tests
//!
//! These tests drive `IssueSummarizer::summarize` end to end: GitHub listing,
//! prompt rendering and the Claude call, with both APIs served by one mock
//! server.

use std::time::Duration;

use gitissuesum::{
    build_prompt, run_with, Issue, IssueSummarizer, IssueSummarizerBuilder, Repository,
};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn builder_for(server: &MockServer) -> IssueSummarizerBuilder {
    IssueSummarizerBuilder::new()
        .anthropic_api_key("test-key")
        .github_api_base_url(server.uri())
        .anthropic_api_url(format!("{}/v1/messages", server.uri()))
        .model("test-model")
        .retry_schedule(&[Duration::ZERO, Duration::from_millis(1), Duration::from_millis(1)])
}

fn summarizer_for(server: &MockServer) -> IssueSummarizer {
    builder_for(server).build().unwrap()
}

fn issues_json() -> Value {
    json!([
        {
            "number": 7,
            "title": "Crash on startup",
            "body": "  It crashes.  ",
            "user": {"login": "alice"},
            "labels": [{"name": "bug"}, {"name": "urgent"}],
            "comments": 5,
            "created_at": "2025-02-03T12:00:00Z"
        },
        {
            "number": 8,
            "title": "Add docs",
            "body": null,
            "user": {"login": "bob"},
            "labels": [],
            "comments": 0,
            "created_at": "2025-02-04T12:00:00Z",
            "pull_request": {"url": "https://api.github.com/repos/o/r/pulls/8"}
        },
        {
            "number": 9,
            "title": "Slow build",
            "body": "",
            "user": {"login": "carol"},
            "labels": [],
            "comments": 1,
            "created_at": "2025-02-05T12:00:00Z"
        }
    ])
}

async fn mount_issues(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/repos/o/r/issues"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_no_open_issues_skips_the_model() {
    let server = MockServer::start().await;
    mount_issues(&server, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    summarizer_for(&server)
        .summarize(&Repository::new("o", "r"), 200, &CancellationToken::new(), &mut out)
        .await
        .unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Fetching issues from o/r...\nNo open issues found.\n"
    );
}

#[tokio::test]
async fn test_only_pull_requests_counts_as_no_issues() {
    let server = MockServer::start().await;
    mount_issues(
        &server,
        json!([{
            "number": 1, "title": "pr", "user": {"login": "a"},
            "created_at": "2025-01-01T00:00:00Z",
            "pull_request": {"url": "https://api.github.com/repos/o/r/pulls/1"}
        }]),
    )
    .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    summarizer_for(&server)
        .summarize(&Repository::new("o", "r"), 200, &CancellationToken::new(), &mut out)
        .await
        .unwrap();

    assert!(String::from_utf8(out).unwrap().ends_with("No open issues found.\n"));
}

#[tokio::test]
async fn test_full_workflow_prints_summary() {
    let server = MockServer::start().await;
    mount_issues(&server, issues_json()).await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                {"type": "text", "text": "Two issues. "},
                {"type": "text", "text": "Fix the crash first."}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let repo = Repository::new("o", "r");
    let mut out = Vec::new();
    summarizer_for(&server)
        .summarize(&repo, 200, &CancellationToken::new(), &mut out)
        .await
        .unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Fetching issues from o/r...\n\
Found 2 issues. Sending to Claude for analysis...\n\
\n\
Two issues. Fix the crash first.\n"
    );

    // The prompt sent upstream is exactly the rendering of the filtered issues.
    let requests = server.received_requests().await.unwrap();
    let post = requests
        .iter()
        .find(|request| request.method.as_str() == "POST")
        .unwrap();
    let sent: Value = serde_json::from_slice(&post.body).unwrap();
    let content = sent["messages"][0]["content"].as_str().unwrap();

    let all: Vec<Issue> = serde_json::from_value(issues_json()).unwrap();
    let kept: Vec<Issue> = all.into_iter().filter(|i| !i.is_pull_request()).collect();
    assert_eq!(content, build_prompt(&repo, &kept));
    assert!(content.contains("Labels: bug, urgent\nBody: It crashes.\n"));
    assert!(content.contains("--- Issue #9 ---"));
    assert!(!content.contains("--- Issue #8 ---"));
    assert_eq!(sent["model"], "test-model");
}

#[tokio::test]
async fn test_fetch_failure_stops_before_the_model() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    let err = summarizer_for(&server)
        .summarize(&Repository::new("o", "r"), 200, &CancellationToken::new(), &mut out)
        .await
        .unwrap_err();

    assert!(err
        .to_string()
        .starts_with("failed to fetch issues: GitHub API returned status 401"));
    assert_eq!(String::from_utf8(out).unwrap(), "Fetching issues from o/r...\n");
}

#[tokio::test]
async fn test_model_failure_is_wrapped() {
    let server = MockServer::start().await;
    mount_issues(&server, issues_json()).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "type": "error",
            "error": {"type": "authentication_error", "message": "invalid x-api-key"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    let err = summarizer_for(&server)
        .summarize(&Repository::new("o", "r"), 200, &CancellationToken::new(), &mut out)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "failed to get summary from Claude: Anthropic API returned status 401: \
authentication_error: invalid x-api-key"
    );
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.ends_with("Found 2 issues. Sending to Claude for analysis...\n"));
}

#[tokio::test]
async fn test_cancelled_run_is_distinguishable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut out = Vec::new();
    let err = summarizer_for(&server)
        .summarize(&Repository::new("o", "r"), 200, &cancel, &mut out)
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
}

#[tokio::test]
async fn test_run_with_owner_and_repo() {
    let server = MockServer::start().await;
    mount_issues(&server, issues_json()).await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "All good."}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    run_with(
        builder_for(&server),
        "o",
        "r",
        200,
        &CancellationToken::new(),
        &mut out,
    )
    .await
    .unwrap();

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.starts_with("Fetching issues from o/r...\n"));
    assert!(printed.ends_with("\nAll good.\n"));
}

/// Runs against the real APIs (requires ANTHROPIC_API_KEY).
#[tokio::test]
#[ignore] // Run with: cargo test --ignored -- --nocapture
async fn test_live_summary() {
    let Ok(api_key) = std::env::var("ANTHROPIC_API_KEY") else {
        eprintln!("Skipping: ANTHROPIC_API_KEY not set");
        return;
    };

    let summarizer = IssueSummarizerBuilder::new()
        .anthropic_api_key(api_key)
        .github_token(std::env::var("GITHUB_TOKEN").ok())
        .build()
        .expect("Failed to create summarizer");

    let mut out = Vec::new();
    let result = summarizer
        .summarize(
            &Repository::new("tokio-rs", "axum"),
            20,
            &CancellationToken::new(),
            &mut out,
        )
        .await;

    assert!(result.is_ok(), "summary failed: {:?}", result.err());
    println!("{}", String::from_utf8_lossy(&out));
}
