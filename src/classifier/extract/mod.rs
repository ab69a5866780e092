pub mod deadlines;
pub mod policies;
pub mod textbooks;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

pub use policies::PolicyType;

/// Per-category cap on extracted candidates.
pub const MAX_ITEMS: usize = 25;

/// Candidate records are unverified: a human reviews them (with their
/// `source_text` citation) before anything downstream happens.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeadlineCandidate {
    pub title: String,
    pub due_at: Option<DateTime<Utc>>,
    pub details: Option<String>,
    pub source_text: String,
}

impl DeadlineCandidate {
    /// No recognizable date in the line. The caller surfaces this for
    /// human review instead of treating it as an error.
    pub fn needs_review(&self) -> bool {
        self.due_at.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyCandidate {
    pub policy_type: PolicyType,
    pub text: String,
    pub source_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextbookCandidate {
    pub title: String,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub notes: Option<String>,
    pub source_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub deadlines: Vec<DeadlineCandidate>,
    pub policies: Vec<PolicyCandidate>,
    pub textbooks: Vec<TextbookCandidate>,
}

/// Run the three extractors over the same line list. The filters are
/// independent, so one line may land in several categories.
pub fn extract_all(lines: &[String], today: NaiveDate) -> Extraction {
    Extraction {
        deadlines: deadlines::extract(lines, today),
        policies: policies::extract(lines),
        textbooks: textbooks::extract(lines),
    }
}

/// Case-insensitive substring match against a keyword set.
pub(crate) fn keyword_match(line: &str, keywords: &[&str]) -> bool {
    let lower = line.to_lowercase();
    keywords.iter().any(|kw| lower.contains(kw))
}
