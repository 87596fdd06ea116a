//! Chapter heading recognition on page text.

use crate::text::normalize_whitespace;
use once_cell::sync::Lazy;
use regex::Regex;

/// Lines longer than this are never headings.
pub const MAX_HEADING_LINE_CHARS: usize = 140;

/// Only this many non-empty lines from the top of a page are examined.
pub const MAX_SCAN_LINES: usize = 25;

static NUMERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*chapter\s+(?P<label>[0-9]+|[ivxlcdm]+)\b\s*(?P<title>.*)$")
        .expect("numeral heading regex is valid")
});

static WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*chapter\s+(?P<label>[a-z]+)\b\s*(?P<title>.*)$")
        .expect("word heading regex is valid")
});

static ABBREVIATED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:ch\.?|chap\.?)\s*[-:]?\s*(?P<label>[0-9]+|[ivxlcdm]+)\b\s*(?P<title>.*)$")
        .expect("abbreviated heading regex is valid")
});

/// A recognized chapter heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingMatch {
    /// Chapter identifier as written ("3", "IV", "One")
    pub label: String,
    /// Trailing title text with any leading separator removed; may be empty
    pub title: String,
}

/// One keyword variant a chapter heading can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingPattern {
    /// `Chapter 12`, `CHAPTER IV`
    Numeral,
    /// `Chapter One`
    Word,
    /// `Ch. 3`, `Chap 3`, `CHAP: IX`
    Abbreviated,
}

/// Heading patterns in priority order.
pub const DEFAULT_PATTERNS: [HeadingPattern; 3] = [
    HeadingPattern::Numeral,
    HeadingPattern::Word,
    HeadingPattern::Abbreviated,
];

impl HeadingPattern {
    fn regex(self) -> &'static Regex {
        match self {
            HeadingPattern::Numeral => &NUMERAL,
            HeadingPattern::Word => &WORD,
            HeadingPattern::Abbreviated => &ABBREVIATED,
        }
    }

    /// Match the whole line against this variant.
    pub fn match_line(self, line: &str) -> Option<HeadingMatch> {
        let caps = self.regex().captures(line)?;
        let label = normalize_whitespace(caps.name("label")?.as_str());
        let title = caps
            .name("title")
            .map(|m| clean_title(m.as_str()))
            .unwrap_or_default();
        Some(HeadingMatch { label, title })
    }
}

/// Strip a leading run of dash/colon separators from a heading title.
fn clean_title(raw: &str) -> String {
    let title = normalize_whitespace(raw);
    title
        .trim_start_matches(['-', ':', '\u{2013}', '\u{2014}'])
        .trim()
        .to_string()
}

/// Test one line against `patterns` in order; the first full-line match wins.
pub fn match_heading_line(line: &str, patterns: &[HeadingPattern]) -> Option<HeadingMatch> {
    if line.chars().count() > MAX_HEADING_LINE_CHARS {
        return None;
    }
    patterns.iter().find_map(|pattern| pattern.match_line(line))
}

/// Find the first chapter heading near the top of a page.
pub fn find_heading_on_page(text: &str) -> Option<HeadingMatch> {
    find_heading_with(text, &DEFAULT_PATTERNS)
}

/// Like [`find_heading_on_page`], with an explicit pattern list.
pub fn find_heading_with(text: &str, patterns: &[HeadingPattern]) -> Option<HeadingMatch> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_SCAN_LINES)
        .find_map(|line| match_heading_line(line, patterns))
}
