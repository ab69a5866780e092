use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use regex::Regex;

static NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}[/\-]\d{1,2}([/\-]\d{2,4})?\b").unwrap());
static MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\s+(\d{1,2})(?:,?\s+(\d{4}))?")
        .unwrap()
});

const MONTHS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun",
    "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Find a due date in the line. Numeric forms ("2/18", "10-24-25") win over
/// month names ("March 3", "Sept 12, 2025"). A numeric match that fails
/// calendar validation yields None without falling back to the month path.
/// `today` supplies the year when the text carries none.
pub fn parse_date(line: &str, today: NaiveDate) -> Option<DateTime<Utc>> {
    if let Some(m) = NUMERIC_RE.find(line) {
        return parse_numeric(m.as_str(), today);
    }
    MONTH_RE
        .captures(line)
        .and_then(|caps| parse_month_name(&caps, today))
}

/// The date substring to strip during title cleanup. Month-name matches take
/// precedence here, the reverse of `parse_date`; kept as-is.
pub fn find_date_text(line: &str) -> Option<&str> {
    MONTH_RE
        .find(line)
        .or_else(|| NUMERIC_RE.find(line))
        .map(|m| m.as_str())
}

fn parse_numeric(raw: &str, today: NaiveDate) -> Option<DateTime<Utc>> {
    let value = raw.replace('-', "/");
    let parts: Vec<&str> = value.split('/').map(str::trim).collect();
    let (month, day, year) = match parts.as_slice() {
        [m, d] => (m.parse().ok()?, d.parse().ok()?, today.year()),
        [m, d, y] => (m.parse().ok()?, d.parse().ok()?, expand_year(y.parse().ok()?)),
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, day).map(midnight_utc)
}

fn parse_month_name(caps: &regex::Captures, today: NaiveDate) -> Option<DateTime<Utc>> {
    let name = caps[1].to_lowercase();
    let month = MONTHS.iter().position(|m| name.starts_with(m))? as u32 + 1;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = caps
        .get(3)
        .and_then(|y| y.as_str().parse().ok())
        .unwrap_or_else(|| today.year());
    NaiveDate::from_ymd_opt(year, month, day).map(midnight_utc)
}

/// Two-digit years follow the chrono `%y` convention: 00-68 land in the
/// 2000s, 69-99 in the 1900s.
fn expand_year(y: i32) -> i32 {
    match y {
        0..=68 => 2000 + y,
        69..=99 => 1900 + y,
        _ => y,
    }
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
