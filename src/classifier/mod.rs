pub mod dates;
pub mod extract;
pub mod summary;

use chrono::NaiveDate;

pub use extract::{
    DeadlineCandidate, Extraction, PolicyCandidate, PolicyType, TextbookCandidate,
};

/// Single pass over a document's text: split into trimmed, non-empty lines,
/// then run the deadline/policy/textbook extractors over the same list.
///
/// `today` drives year inference for dates with no explicit year; callers
/// inject it so the whole pipeline stays deterministic. Never fails: text
/// with no matching lines just yields empty categories.
pub fn classify(text: &str, today: NaiveDate) -> Extraction {
    let lines = to_lines(text);
    extract::extract_all(&lines, today)
}

/// Trimmed, non-empty lines in document order.
fn to_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.txt", name)).unwrap()
    }

    #[test]
    fn empty_text_yields_empty_categories() {
        let out = classify("", today());
        assert!(out.deadlines.is_empty());
        assert!(out.policies.is_empty());
        assert!(out.textbooks.is_empty());

        let out = classify("\n\n   \r\n\t\n", today());
        assert!(out.deadlines.is_empty());
    }

    #[test]
    fn source_text_is_always_a_verbatim_input_line() {
        let text = fixture("bio101");
        let lines: HashSet<String> = to_lines(&text).into_iter().collect();
        let out = classify(&text, today());
        for c in &out.deadlines {
            assert!(lines.contains(&c.source_text), "not an input line: {}", c.source_text);
        }
        for c in &out.policies {
            assert!(lines.contains(&c.source_text), "not an input line: {}", c.source_text);
        }
        for c in &out.textbooks {
            assert!(lines.contains(&c.source_text), "not an input line: {}", c.source_text);
        }
    }

    #[test]
    fn one_line_can_land_in_several_categories() {
        // "exam" is both a deadline keyword and a policy keyword.
        let out = classify("All exams are closed book; see the exam policy handout.", today());
        assert_eq!(out.deadlines.len(), 1);
        assert_eq!(out.policies.len(), 1);
        assert_eq!(out.deadlines[0].source_text, out.policies[0].source_text);
    }

    #[test]
    fn same_input_same_date_same_output() {
        let text = fixture("cs2110");
        let a = classify(&text, today());
        let b = classify(&text, today());
        assert_eq!(a, b);
    }

    #[test]
    fn bio101_fixture() {
        let out = classify(&fixture("bio101"), today());

        assert_eq!(out.deadlines.len(), 6);
        let dated: Vec<_> = out.deadlines.iter().filter(|d| d.due_at.is_some()).collect();
        assert_eq!(dated.len(), 5);
        assert!(out.deadlines.iter().any(|d| d.needs_review()));

        assert_eq!(out.policies.len(), 6);
        let types: Vec<PolicyType> = out.policies.iter().map(|p| p.policy_type).collect();
        assert!(types.contains(&PolicyType::Late));
        assert!(types.contains(&PolicyType::Attendance));
        assert!(types.contains(&PolicyType::Grading));
        assert!(types.contains(&PolicyType::AcademicIntegrity));

        assert_eq!(out.textbooks.len(), 3);
        let campbell = out
            .textbooks
            .iter()
            .find(|t| t.isbn.is_some())
            .expect("ISBN line missing");
        assert_eq!(campbell.isbn.as_deref(), Some("9780134093413"));
        assert_eq!(campbell.author.as_deref(), Some("Reece, ISBN 9780134093413"));
    }

    #[test]
    fn bio101_dates_resolve_against_injected_year() {
        let out = classify(&fixture("bio101"), today());
        let due: Vec<String> = out
            .deadlines
            .iter()
            .filter_map(|d| d.due_at.map(|t| t.format("%Y-%m-%d").to_string()))
            .collect();
        assert!(due.contains(&"2025-10-14".to_string())); // Midterm exam 10/14
        assert!(due.contains(&"2025-12-05".to_string())); // Research project due Dec 5
    }

    #[test]
    fn cs2110_fixture() {
        let out = classify(&fixture("cs2110"), today());

        assert_eq!(out.deadlines.len(), 6);
        let proposal = out
            .deadlines
            .iter()
            .find(|d| d.source_text.starts_with("Project proposal"))
            .unwrap();
        assert_eq!(proposal.title, "Project proposal");
        assert_eq!(
            proposal.due_at.unwrap().format("%Y-%m-%d").to_string(),
            "2025-02-27"
        );

        let hw2 = out
            .deadlines
            .iter()
            .find(|d| d.source_text.starts_with("Homework 2"))
            .unwrap();
        assert_eq!(hw2.due_at.unwrap().format("%Y-%m-%d").to_string(), "2026-02-13");

        let types: Vec<PolicyType> = out.policies.iter().map(|p| p.policy_type).collect();
        assert!(types.contains(&PolicyType::Collaboration));
        assert!(types.contains(&PolicyType::Exam));

        assert_eq!(out.textbooks.len(), 2);
    }
}
