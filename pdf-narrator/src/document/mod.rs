//! Paginated document access: page text and the embedded outline.

pub mod pdf;

use crate::error::Result;

pub use pdf::PdfBook;

/// One row of a document's embedded outline (table of contents).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    /// Depth in the outline tree; top-level entries are depth 1
    pub level: usize,
    /// Entry title as stored in the document
    pub title: String,
    /// One-based destination page, or 0 when the destination is unknown
    pub page: usize,
}

impl OutlineEntry {
    pub fn new(level: usize, title: impl Into<String>, page: usize) -> Self {
        Self {
            level,
            title: title.into(),
            page,
        }
    }
}

/// A paginated text source that chapter detection and narration read from.
///
/// Pages are addressed by zero-based index. Implementations are read
/// sequentially and never mutated.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Raw text of one page. Image-only pages yield an empty string.
    fn page_text(&self, index: usize) -> Result<String>;

    /// The embedded outline in document order; empty when there is none.
    fn outline(&self) -> Result<Vec<OutlineEntry>>;
}

/// In-memory page source for tests.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub pages: Vec<String>,
    pub outline: Vec<OutlineEntry>,
}

#[cfg(test)]
impl MemorySource {
    /// A document of `count` pages with placeholder body text.
    pub fn blank(count: usize) -> Self {
        Self {
            pages: (0..count).map(|i| format!("Body text of page {}.", i + 1)).collect(),
            outline: Vec::new(),
        }
    }

    pub fn with_page(mut self, index: usize, text: &str) -> Self {
        self.pages[index] = text.to_string();
        self
    }

    pub fn with_outline(mut self, outline: Vec<OutlineEntry>) -> Self {
        self.outline = outline;
        self
    }
}

#[cfg(test)]
impl PageSource for MemorySource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String> {
        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }

    fn outline(&self) -> Result<Vec<OutlineEntry>> {
        Ok(self.outline.clone())
    }
}
