//! Chapters from a document's embedded outline.

use super::{Chapter, OUTLINE_LABEL, build_partition};
use crate::document::OutlineEntry;
use crate::text::normalize_whitespace;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Outline titles that look like chapter entries.
static CHAPTER_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bchapter\b|\bch\.\b|\bchap\.\b").expect("chapter hint regex is valid")
});

/// A surviving entry must start at least this many pages after the previous one.
const MIN_START_GAP: usize = 1;

/// Build a chapter partition from outline entries.
///
/// Entries whose titles mention a chapter are preferred; when none do, every
/// top-level entry is used instead. Returns an empty list when nothing
/// usable remains, leaving the caller to fall back to scanning.
pub fn chapters_from_outline(entries: &[OutlineEntry], page_count: usize) -> Vec<Chapter> {
    if entries.is_empty() || page_count == 0 {
        return Vec::new();
    }

    let hinted: Vec<&OutlineEntry> = entries
        .iter()
        .filter(|e| CHAPTER_HINT.is_match(&e.title))
        .collect();
    let candidates: Vec<&OutlineEntry> = if hinted.is_empty() {
        entries.iter().filter(|e| e.level == 1).collect()
    } else {
        hinted
    };

    let mut seen = HashSet::new();
    let mut starts: Vec<(usize, String, String)> = Vec::new();
    for entry in candidates {
        if entry.page == 0 {
            continue;
        }
        let start = (entry.page - 1).min(page_count - 1);
        if !seen.insert(start) {
            continue;
        }
        starts.push((
            start,
            OUTLINE_LABEL.to_string(),
            normalize_whitespace(&entry.title),
        ));
    }

    starts.sort_by_key(|(start, _, _)| *start);

    let mut last_start: Option<usize> = None;
    build_partition(starts, page_count)
        .into_iter()
        .filter(|chapter| {
            let keep = last_start.is_none_or(|last| chapter.start_page() >= last + MIN_START_GAP);
            if keep {
                last_start = Some(chapter.start_page());
            }
            keep
        })
        .collect()
}
