use chrono::NaiveDate;

use super::{keyword_match, DeadlineCandidate, MAX_ITEMS};
use crate::classifier::{dates, summary};

const KEYWORDS: &[&str] = &[
    "deadline",
    "due",
    "exam",
    "midterm",
    "final",
    "quiz",
    "assignment",
    "project",
];

pub fn extract(lines: &[String], today: NaiveDate) -> Vec<DeadlineCandidate> {
    lines
        .iter()
        .filter(|line| keyword_match(line, KEYWORDS))
        .map(|line| DeadlineCandidate {
            title: summary::summarize(&summary::clean_title(line), summary::TITLE_LIMIT),
            due_at: dates::parse_date(line, today),
            details: None,
            source_text: line.clone(),
        })
        .take(MAX_ITEMS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn numeric_date_line() {
        let out = extract(&lines(&["Midterm exam due 2/18"]), today());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "exam due");
        assert_eq!(out[0].due_at.unwrap().to_rfc3339(), "2025-02-18T00:00:00+00:00");
        assert_eq!(out[0].source_text, "Midterm exam due 2/18");
    }

    #[test]
    fn month_name_date_line() {
        let out = extract(&lines(&["Final paper due March 3"]), today());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "paper due");
        assert_eq!(out[0].due_at.unwrap().to_rfc3339(), "2025-03-03T00:00:00+00:00");
    }

    #[test]
    fn dateless_line_needs_review() {
        let out = extract(&lines(&["Quiz every Friday in section."]), today());
        assert_eq!(out.len(), 1);
        assert!(out[0].due_at.is_none());
        assert!(out[0].needs_review());
    }

    #[test]
    fn keyword_less_line_dropped() {
        assert!(extract(&lines(&["Office hours after lecture."]), today()).is_empty());
    }

    #[test]
    fn capped_in_source_order() {
        let many: Vec<String> = (0..40).map(|i| format!("Assignment {} due 3/{}", i, 1 + i % 28)).collect();
        let out = extract(&many, today());
        assert_eq!(out.len(), MAX_ITEMS);
        assert_eq!(out[0].source_text, many[0]);
        assert_eq!(out[24].source_text, many[24]);
    }
}
