//! Chapters found by scanning page text for headings.

use super::heading::find_heading_on_page;
use super::{Chapter, build_partition};
use crate::document::PageSource;
use log::debug;

/// A kept heading must be at least this many pages after the previous kept one.
///
/// Running headers reprint a chapter heading on the following page; a gap of
/// one page is treated as the same chapter.
const MIN_HEADING_GAP: usize = 2;

/// Scan every page for chapter headings and build a partition from them.
#[cfg(test)]
pub fn chapters_by_scanning<S: PageSource + ?Sized>(source: &S) -> Vec<Chapter> {
    chapters_by_scanning_with_progress(source, |_, _| {})
}

/// Scan every page for chapter headings, calling `on_page(pages_done, page_count)`
/// after each page.
pub fn chapters_by_scanning_with_progress<S, F>(source: &S, mut on_page: F) -> Vec<Chapter>
where
    S: PageSource + ?Sized,
    F: FnMut(usize, usize),
{
    let page_count = source.page_count();
    let mut hits = Vec::new();

    for index in 0..page_count {
        let text = source.page_text(index).unwrap_or_else(|e| {
            debug!("No text for page {}: {}", index + 1, e);
            String::new()
        });
        if let Some(heading) = find_heading_on_page(&text) {
            debug!(
                "Heading on page {}: {} {}",
                index + 1,
                heading.label,
                heading.title
            );
            hits.push((index, heading.label, heading.title));
        }
        on_page(index + 1, page_count);
    }

    let mut last_kept: Option<usize> = None;
    let kept: Vec<(usize, String, String)> = hits
        .into_iter()
        .filter(|(page, _, _)| {
            let keep = last_kept.is_none_or(|last| *page >= last + MIN_HEADING_GAP);
            if keep {
                last_kept = Some(*page);
            }
            keep
        })
        .collect();

    build_partition(kept, page_count)
}
