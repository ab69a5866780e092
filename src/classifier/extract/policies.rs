use serde::Serialize;

use super::{keyword_match, PolicyCandidate, MAX_ITEMS};
use crate::classifier::summary;

const KEYWORDS: &[&str] = &[
    "policy",
    "late",
    "attendance",
    "grading",
    "exam",
    "collaboration",
    "academic integrity",
];

/// Ordered rules, first match wins: "late" beats "exam" when both appear.
const TYPE_RULES: &[(&[&str], PolicyType)] = &[
    (&["late"], PolicyType::Late),
    (&["attendance"], PolicyType::Attendance),
    (&["grading", "grade"], PolicyType::Grading),
    (&["exam"], PolicyType::Exam),
    (&["collaboration"], PolicyType::Collaboration),
    (&["integrity", "honor"], PolicyType::AcademicIntegrity),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PolicyType {
    #[serde(rename = "late policy")]
    Late,
    #[serde(rename = "attendance")]
    Attendance,
    #[serde(rename = "grading")]
    Grading,
    #[serde(rename = "exam policy")]
    Exam,
    #[serde(rename = "collaboration")]
    Collaboration,
    #[serde(rename = "academic integrity")]
    AcademicIntegrity,
    #[serde(rename = "general")]
    General,
}

impl PolicyType {
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyType::Late => "late policy",
            PolicyType::Attendance => "attendance",
            PolicyType::Grading => "grading",
            PolicyType::Exam => "exam policy",
            PolicyType::Collaboration => "collaboration",
            PolicyType::AcademicIntegrity => "academic integrity",
            PolicyType::General => "general",
        }
    }

    /// Inverse of `as_str`; unknown labels come back as General.
    pub fn parse(s: &str) -> PolicyType {
        match s {
            "late policy" => PolicyType::Late,
            "attendance" => PolicyType::Attendance,
            "grading" => PolicyType::Grading,
            "exam policy" => PolicyType::Exam,
            "collaboration" => PolicyType::Collaboration,
            "academic integrity" => PolicyType::AcademicIntegrity,
            _ => PolicyType::General,
        }
    }
}

pub fn extract(lines: &[String]) -> Vec<PolicyCandidate> {
    lines
        .iter()
        .filter(|line| keyword_match(line, KEYWORDS))
        .map(|line| PolicyCandidate {
            policy_type: infer_type(line),
            text: summary::summarize(line, summary::SUMMARY_LIMIT),
            source_text: line.clone(),
        })
        .take(MAX_ITEMS)
        .collect()
}

fn infer_type(line: &str) -> PolicyType {
    let lower = line.to_lowercase();
    TYPE_RULES
        .iter()
        .find(|(kws, _)| kws.iter().any(|kw| lower.contains(kw)))
        .map(|(_, t)| *t)
        .unwrap_or(PolicyType::General)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn late_beats_exam() {
        let out = extract(&lines(&["Late submissions of exam corrections lose credit."]));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].policy_type, PolicyType::Late);
    }

    #[test]
    fn type_chain_in_order() {
        let cases = [
            ("Late work accepted up to 48 hours with 10% penalty.", PolicyType::Late),
            ("Attendance counts toward participation.", PolicyType::Attendance),
            ("Grading is on a straight scale.", PolicyType::Grading),
            ("All exams are closed book.", PolicyType::Exam),
            ("Collaboration is encouraged on labs.", PolicyType::Collaboration),
            ("Violations go to the honor board per the academic integrity code.", PolicyType::AcademicIntegrity),
            ("Course policy overview follows.", PolicyType::General),
        ];
        for (line, expected) in cases {
            let out = extract(&lines(&[line]));
            assert_eq!(out.len(), 1, "line not selected: {}", line);
            assert_eq!(out[0].policy_type, expected, "wrong type for: {}", line);
        }
    }

    #[test]
    fn full_sentence_kept_under_limit() {
        let line = "Late work accepted up to 48 hours with 10% penalty.";
        let out = extract(&lines(&[line]));
        assert_eq!(out[0].text, line);
        assert_eq!(out[0].source_text, line);
    }

    #[test]
    fn keyword_less_line_dropped() {
        assert!(extract(&lines(&["Lectures meet twice a week."])).is_empty());
    }

    #[test]
    fn capped_at_max_items() {
        let many: Vec<String> = (0..40).map(|i| format!("Policy item {}", i)).collect();
        assert_eq!(extract(&many).len(), MAX_ITEMS);
    }
}
