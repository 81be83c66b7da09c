//! Cursor extraction from RFC 8288 `Link` headers.
//!
//! GitHub advertises the following page as
//! `<https://api.github.com/...&page=2>; rel="next"` among other relations.

use std::sync::OnceLock;

use regex::Regex;

fn next_link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"<([^>]+)>;\s*rel="next""#).expect("valid link regex"))
}

/// Returns the URL of the first `rel="next"` entry, if any.
pub fn parse_next_link(header: &str) -> Option<String> {
    if header.is_empty() {
        return None;
    }

    let re = next_link_regex();
    header
        .split(',')
        .find_map(|part| re.captures(part))
        .map(|caps| caps[1].to_string())
}
