//! Chapter detection: outline first, page scan second, otherwise nothing.

pub mod heading;
mod outline;
mod scan;

pub use outline::chapters_from_outline;
pub use scan::chapters_by_scanning_with_progress;

use crate::document::PageSource;
use crate::error::{NarratorError, Result};
use crate::narration::PageRange;
use log::{debug, info, warn};

/// Label given to chapters that come from the document outline.
pub const OUTLINE_LABEL: &str = "TOC";

/// One contiguous page range belonging to a logical section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    label: String,
    title: String,
    start_page: usize,
    end_page: usize,
}

impl Chapter {
    /// Create a chapter; `end_page` is raised to `start_page` if it falls short.
    pub fn new(
        label: impl Into<String>,
        title: impl Into<String>,
        start_page: usize,
        end_page: usize,
    ) -> Self {
        Self {
            label: label.into(),
            title: title.into(),
            start_page,
            end_page: end_page.max(start_page),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// First page, zero-based.
    pub fn start_page(&self) -> usize {
        self.start_page
    }

    /// Last page, zero-based and inclusive.
    pub fn end_page(&self) -> usize {
        self.end_page
    }

    pub fn page_range(&self) -> PageRange {
        PageRange::new(self.start_page, self.end_page)
    }

    /// Menu line, e.g. `3 — The Return   (pages 41-58)`.
    pub fn menu_label(&self) -> String {
        let label = if self.label.is_empty() || self.label == OUTLINE_LABEL {
            String::new()
        } else {
            format!("{} ", self.label)
        };
        let title = if self.title.is_empty() {
            String::new()
        } else {
            format!(" \u{2014} {}", self.title)
        };
        format!(
            "{}   (pages {}-{})",
            format!("{}{}", label, title).trim(),
            self.start_page + 1,
            self.end_page + 1
        )
    }
}

/// Outcome of chapter detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// Chapters taken from the embedded outline
    Outline(Vec<Chapter>),
    /// Chapters found by scanning pages for headings
    Scanned(Vec<Chapter>),
    /// Neither tier produced anything
    NotDetected,
}

impl Detection {
    /// The detected chapters, if any tier succeeded.
    pub fn chapters(&self) -> Option<&[Chapter]> {
        match self {
            Detection::Outline(chapters) | Detection::Scanned(chapters) => Some(chapters),
            Detection::NotDetected => None,
        }
    }

    pub fn into_result(self) -> Result<Vec<Chapter>> {
        match self {
            Detection::Outline(chapters) | Detection::Scanned(chapters) => Ok(chapters),
            Detection::NotDetected => Err(NarratorError::NoStructureDetected),
        }
    }

    /// Short name of the tier that produced the result.
    pub fn source_name(&self) -> &'static str {
        match self {
            Detection::Outline(_) => "table of contents",
            Detection::Scanned(_) => "page scan",
            Detection::NotDetected => "none",
        }
    }
}

/// Detect chapters, preferring the outline over a page scan.
#[cfg(test)]
pub fn detect_chapters<S: PageSource + ?Sized>(source: &S) -> Detection {
    detect_chapters_with_progress(source, |_, _| {})
}

/// Detect chapters, preferring the outline over a page scan.
///
/// Scan progress is reported as `(pages_done, page_count)`.
pub fn detect_chapters_with_progress<S, F>(source: &S, on_page: F) -> Detection
where
    S: PageSource + ?Sized,
    F: FnMut(usize, usize),
{
    let page_count = source.page_count();

    let outline = match source.outline() {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Could not read outline, falling back to page scan: {}", e);
            Vec::new()
        }
    };
    debug!("Outline has {} entries", outline.len());

    let from_outline = chapters_from_outline(&outline, page_count);
    if !from_outline.is_empty() {
        info!("Detected {} chapters from outline", from_outline.len());
        return Detection::Outline(from_outline);
    }

    let scanned = chapters_by_scanning_with_progress(source, on_page);
    if !scanned.is_empty() {
        info!("Detected {} chapters by scanning pages", scanned.len());
        return Detection::Scanned(scanned);
    }

    info!("No chapter structure detected");
    Detection::NotDetected
}

/// Turn sorted `(start_page, label, title)` starts into a gap-free partition.
///
/// Each chapter ends the page before the next one starts; the last ends on
/// the final page.
pub(crate) fn build_partition(
    starts: Vec<(usize, String, String)>,
    page_count: usize,
) -> Vec<Chapter> {
    let last_page = page_count.saturating_sub(1);
    let next_starts: Vec<Option<usize>> = starts
        .iter()
        .skip(1)
        .map(|(start, _, _)| Some(*start))
        .chain(std::iter::once(None))
        .collect();

    starts
        .into_iter()
        .zip(next_starts)
        .map(|((start, label, title), next)| {
            let end = next.map(|n| n.saturating_sub(1)).unwrap_or(last_page);
            Chapter::new(label, title, start, end)
        })
        .collect()
}
