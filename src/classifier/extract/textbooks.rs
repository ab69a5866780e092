use std::sync::LazyLock;

use regex::Regex;

use super::{keyword_match, TextbookCandidate, MAX_ITEMS};
use crate::classifier::summary;

const KEYWORDS: &[&str] = &["textbook", "required", "isbn", "reading", "materials"];

static ISBN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:97[89][\- ]?)?\d{9}[\- ]?\d\b").unwrap());
static BY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\s+by\s+").unwrap());

pub fn extract(lines: &[String]) -> Vec<TextbookCandidate> {
    lines
        .iter()
        .filter(|line| keyword_match(line, KEYWORDS))
        .map(|line| TextbookCandidate {
            title: summary::summarize(line, summary::SUMMARY_LIMIT),
            author: extract_author(line),
            isbn: ISBN_RE.find(line).map(|m| m.as_str().to_string()),
            notes: None,
            source_text: line.clone(),
        })
        .take(MAX_ITEMS)
        .collect()
}

/// Everything after the first " by ". Trailing metadata on the same line
/// (an ISBN, an edition) stays inside the captured author text; known
/// quirk, kept rather than corrected.
fn extract_author(line: &str) -> Option<String> {
    if !line.to_lowercase().contains(" by ") {
        return None;
    }
    BY_RE.split(line).nth(1).map(|s| s.trim().to_string())
}
