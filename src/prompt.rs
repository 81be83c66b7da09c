use std::fmt::Write;

use crate::types::{Issue, Repository};

pub const MAX_BODY_CHARS: usize = 500;
pub const ELLIPSIS: &str = "...";

const INSTRUCTIONS: &str = "Please provide:
1. A high-level summary of the open issues (2-3 sentences)
2. Main themes/categories you see, with approximate counts
3. Notable patterns (e.g., recurring problems, areas needing attention)
4. The top 5 most important issues and why they stand out

Be concise and actionable.";

/// Renders the summarization prompt. Output depends only on the arguments.
pub fn build_prompt(repo: &Repository, issues: &[Issue]) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        "You are analyzing open GitHub issues for the repository {}.",
        repo.full_name
    );
    let _ = writeln!(out, "There are {} open issues. Here they are:\n", issues.len());

    for issue in issues {
        render_issue(&mut out, issue);
    }

    out.push_str(INSTRUCTIONS);
    out
}

fn render_issue(out: &mut String, issue: &Issue) {
    let _ = writeln!(out, "--- Issue #{} ---", issue.number);
    let _ = writeln!(out, "Title: {}", issue.title);
    let _ = writeln!(out, "Author: {}", issue.user.login);
    let _ = writeln!(out, "Created: {}", issue.created_at.format("%Y-%m-%d"));
    let _ = writeln!(out, "Comments: {}", issue.comments);

    if !issue.labels.is_empty() {
        let _ = writeln!(out, "Labels: {}", issue.label_names().join(", "));
    }

    let body = truncate(issue.body.as_deref().unwrap_or(""), MAX_BODY_CHARS);
    if !body.is_empty() {
        let _ = writeln!(out, "Body: {}", body);
    }

    out.push('\n');
}

/// Trims `text` and cuts it to `max_chars` characters, marking the cut with
/// [`ELLIPSIS`].
pub fn truncate(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
    }
}
