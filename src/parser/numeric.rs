use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:,\d{3})*").unwrap());
static POINTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:,\d{3})*)\s*points?").unwrap());
static COMMENTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:,\d{3})*)\s*comments?").unwrap());

/// Which count a free-text subline is searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Points,
    Comments,
}

impl Keyword {
    fn pattern(self) -> &'static Regex {
        match self {
            Keyword::Points => &*POINTS_RE,
            Keyword::Comments => &*COMMENTS_RE,
        }
    }
}

/// First run of digits in `text` (comma thousands groups allowed), or 0.
pub fn extract_number(text: &str) -> u64 {
    NUMBER_RE
        .find(text)
        .map(|m| parse_digits(m.as_str()))
        .unwrap_or(0)
}

/// Count anchored on a keyword, e.g. "88 comments" in "250 points | 88 comments".
pub fn extract_keyword_count(subline: &str, keyword: Keyword) -> u64 {
    keyword
        .pattern()
        .captures(subline)
        .map(|c| parse_digits(&c[1]))
        .unwrap_or(0)
}

/// Structured column first; when that gives nothing, fall back to the subline text.
pub fn resolve_count(structured: Option<&str>, subline: Option<&str>, keyword: Keyword) -> u64 {
    let direct = structured.map(extract_number).unwrap_or(0);
    if direct > 0 {
        return direct;
    }
    let fallback = subline
        .map(|s| extract_keyword_count(s, keyword))
        .unwrap_or(0);
    if fallback > 0 {
        trace!(?keyword, fallback, "count recovered from subline");
    }
    fallback
}

fn parse_digits(s: &str) -> u64 {
    let digits: String = s.chars().filter(char::is_ascii_digit).collect();
    // Runs too long for u64 degrade like any other unreadable value.
    digits.parse().unwrap_or(0)
}
