use std::sync::LazyLock;

use regex::Regex;

use super::dates;

/// Policy and textbook summaries keep this many chars at most.
pub const SUMMARY_LIMIT: usize = 180;
/// Deadline titles are tighter.
pub const TITLE_LIMIT: usize = 120;

static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-–—|,]+").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(due|deadline|exam|midterm|final)\b[:\s\-]*").unwrap());

/// First sentence of the line, hard-capped at `limit` chars. The trailing
/// ellipsis counts toward the cap, so output never exceeds `limit` chars.
pub fn summarize(line: &str, limit: usize) -> String {
    let sentence = first_sentence(line).trim();
    if sentence.chars().count() <= limit {
        return sentence.to_string();
    }
    let mut out: String = sentence.chars().take(limit - 1).collect();
    out.push('…');
    out
}

/// Deadline title: drop the date text, collapse separator punctuation and
/// whitespace runs, strip the first label word (due/deadline/exam/...).
/// Falls back to the whole line when nothing survives.
pub fn clean_title(line: &str) -> String {
    let cleaned = match dates::find_date_text(line) {
        Some(date) => line.replacen(date, "", 1),
        None => line.to_string(),
    };
    let cleaned = SEPARATOR_RE.replace_all(&cleaned, " ");
    let cleaned = WHITESPACE_RE.replace_all(&cleaned, " ");
    let cleaned = LABEL_RE.replace(&cleaned, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        line.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Prefix through the first `.`/`!`/`?` that is followed by whitespace.
/// Terminal punctuation with nothing after it does not split.
fn first_sentence(line: &str) -> &str {
    let mut chars = line.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if matches!(ch, '.' | '!' | '?') {
            if let Some((_, next)) = chars.peek() {
                if next.is_whitespace() {
                    return &line[..idx + ch.len_utf8()];
                }
            }
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_line_unchanged() {
        assert_eq!(summarize("Bring a calculator.", SUMMARY_LIMIT), "Bring a calculator.");
    }

    #[test]
    fn first_sentence_beats_limit() {
        let line = "Late work loses 10% per day. See the course site for the appeal form.";
        assert_eq!(summarize(line, SUMMARY_LIMIT), "Late work loses 10% per day.");
    }

    #[test]
    fn abbreviation_dot_mid_word_does_not_split() {
        // "4.5" has no whitespace after the dot, so the sentence runs on.
        assert_eq!(summarize("Read chapters 4.5 through 6", 180), "Read chapters 4.5 through 6");
    }

    #[test]
    fn long_line_truncated_with_ellipsis() {
        let line = "x".repeat(200);
        let out = summarize(&line, SUMMARY_LIMIT);
        assert_eq!(out.chars().count(), SUMMARY_LIMIT);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn title_strips_date_and_label() {
        assert_eq!(clean_title("Midterm exam due 2/18"), "exam due");
        assert_eq!(clean_title("Project proposal deadline: Feb 27"), "Project proposal");
    }

    #[test]
    fn title_collapses_separators() {
        assert_eq!(clean_title("Essay 2 — peer review | 3/14"), "Essay 2 peer review");
    }

    #[test]
    fn title_falls_back_to_original_line() {
        // Everything is stripped away, so the original line is kept.
        assert_eq!(clean_title("Due: 3/14"), "Due: 3/14");
    }
}
