//! PDF page source backed by lopdf.

use super::{OutlineEntry, PageSource};
use crate::error::{NarratorError, Result};
use indexmap::IndexMap;
use log::debug;
use lopdf::{Document, Object, ObjectId, Outline, decode_text_string};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// An opened PDF book.
pub struct PdfBook {
    /// Path the book was loaded from
    path: PathBuf,
    doc: Document,
    page_count: usize,
}

impl PdfBook {
    /// Load a PDF from disk.
    pub fn open(path: &Path) -> Result<Self> {
        debug!("Loading PDF from: {}", path.display());
        let doc = Document::load(path)?;
        let page_count = doc.get_pages().len();
        debug!("PDF has {} pages", page_count);

        Ok(Self {
            path: path.to_path_buf(),
            doc,
            page_count,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name for display.
    pub fn display_name(&self) -> String {
        crate::library::display_name(&self.path)
    }

    fn has_outline(&self) -> bool {
        self.doc
            .catalog()
            .map(|catalog| catalog.get(b"Outlines").is_ok())
            .unwrap_or(false)
    }

    /// Flatten an outline tree in document order, one entry per node.
    fn collect_outline(
        &self,
        outlines: &[Outline],
        level: usize,
        page_numbers: &HashMap<ObjectId, u32>,
        entries: &mut Vec<OutlineEntry>,
    ) {
        for outline in outlines {
            match outline {
                Outline::Destination(destination) => {
                    let title = destination
                        .title()
                        .map(|t| self.decode_title(t))
                        .unwrap_or_default();
                    let page = match destination.page().map(Object::as_reference) {
                        Some(Ok(id)) => page_numbers.get(&id).copied().unwrap_or_else(|| {
                            debug!("Outline entry {:?} points outside the page tree", title);
                            0
                        }),
                        _ => {
                            debug!("Outline entry {:?} has no page reference", title);
                            0
                        }
                    };
                    entries.push(OutlineEntry::new(level, title, page as usize));
                }
                Outline::SubOutlines(children) => {
                    self.collect_outline(children, level + 1, page_numbers, entries);
                }
            }
        }
    }

    fn decode_title(&self, title: &Object) -> String {
        let title = match title.as_reference() {
            Ok(id) => self.doc.get_object(id).unwrap_or(title),
            Err(_) => title,
        };
        decode_text_string(title)
            .or_else(|_| title.as_str().map(|raw| String::from_utf8_lossy(raw).into_owned()))
            .unwrap_or_default()
    }
}

impl PageSource for PdfBook {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_text(&self, index: usize) -> Result<String> {
        if index >= self.page_count {
            return Err(NarratorError::InvalidPageRange(format!(
                "page {} of {}",
                index + 1,
                self.page_count
            )));
        }
        // lopdf numbers pages from 1
        let text = self.doc.extract_text(&[index as u32 + 1])?;
        Ok(text)
    }

    fn outline(&self) -> Result<Vec<OutlineEntry>> {
        if !self.has_outline() {
            return Ok(Vec::new());
        }

        let mut named_destinations = IndexMap::new();
        let Some(outlines) = self.doc.get_outlines(None, None, &mut named_destinations)? else {
            return Ok(Vec::new());
        };

        let page_numbers: HashMap<ObjectId, u32> = self
            .doc
            .get_pages()
            .into_iter()
            .map(|(number, id)| (id, number))
            .collect();

        let mut entries = Vec::new();
        self.collect_outline(&outlines, 1, &page_numbers, &mut entries);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Object, Stream, dictionary};
    use tempfile::TempDir;

    /// One bookmark in a test outline. `page: None` writes a destination
    /// that is not a page reference.
    struct Mark {
        title: &'static str,
        page: Option<usize>,
        children: Vec<Mark>,
    }

    fn mark(title: &'static str, page: usize) -> Mark {
        Mark {
            title,
            page: Some(page),
            children: Vec::new(),
        }
    }

    /// Write `marks` as linked outline items under `parent`; returns the first and last ids.
    fn add_marks(
        doc: &mut Document,
        parent: ObjectId,
        marks: &[Mark],
        page_ids: &[ObjectId],
    ) -> Option<(ObjectId, ObjectId)> {
        let ids: Vec<ObjectId> = marks.iter().map(|_| doc.new_object_id()).collect();
        for (i, m) in marks.iter().enumerate() {
            let target: Object = match m.page {
                Some(page) => page_ids[page].into(),
                None => 0.into(),
            };
            let mut item = dictionary! {
                "Title" => Object::string_literal(m.title),
                "Parent" => parent,
                "Dest" => vec![target, "Fit".into()],
            };
            if i > 0 {
                item.set("Prev", ids[i - 1]);
            }
            if i + 1 < ids.len() {
                item.set("Next", ids[i + 1]);
            }
            if let Some((first, last)) = add_marks(doc, ids[i], &m.children, page_ids) {
                item.set("First", first);
                item.set("Last", last);
                item.set("Count", m.children.len() as i64);
            }
            doc.objects.insert(ids[i], Object::Dictionary(item));
        }
        Some((*ids.first()?, *ids.last()?))
    }

    /// Write a minimal PDF whose pages each show one line of text.
    fn write_pdf(path: &Path, lines: &[&str]) {
        write_pdf_with_outline(path, lines, &[]);
    }

    fn write_pdf_with_outline(path: &Path, lines: &[&str], marks: &[Mark]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut page_ids: Vec<ObjectId> = Vec::new();
        for line in lines {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*line)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            page_ids.push(page_id);
        }

        let kids: Vec<Object> = page_ids.iter().map(|&id| id.into()).collect();
        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        if !marks.is_empty() {
            let outlines_id = doc.new_object_id();
            if let Some((first, last)) = add_marks(&mut doc, outlines_id, marks, &page_ids) {
                doc.objects.insert(
                    outlines_id,
                    Object::Dictionary(dictionary! {
                        "Type" => "Outlines",
                        "First" => first,
                        "Last" => last,
                        "Count" => marks.len() as i64,
                    }),
                );
                catalog.set("Outlines", outlines_id);
            }
        }
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn test_open_counts_pages() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("book.pdf");
        write_pdf(&path, &["Chapter 1", "Body", "Chapter 2"]);

        let book = PdfBook::open(&path).unwrap();
        assert_eq!(book.page_count(), 3);
        assert_eq!(book.display_name(), "book.pdf");
    }

    #[test]
    fn test_page_text_extracts_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("book.pdf");
        write_pdf(&path, &["Hello", "World"]);

        let book = PdfBook::open(&path).unwrap();
        assert!(book.page_text(1).unwrap().contains("World"));
    }

    #[test]
    fn test_page_text_out_of_range() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("book.pdf");
        write_pdf(&path, &["Only page"]);

        let book = PdfBook::open(&path).unwrap();
        assert!(matches!(
            book.page_text(5),
            Err(NarratorError::InvalidPageRange(_))
        ));
    }

    #[test]
    fn test_missing_outline_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("book.pdf");
        write_pdf(&path, &["No outline here"]);

        let book = PdfBook::open(&path).unwrap();
        assert!(book.outline().unwrap().is_empty());
    }

    #[test]
    fn test_outline_keeps_entries_with_repeated_titles() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("book.pdf");
        write_pdf_with_outline(
            &path,
            &["One", "Body", "Intro A", "Intro B"],
            &[mark("Chapter One", 0), mark("Intro", 2), mark("Intro", 3)],
        );

        let book = PdfBook::open(&path).unwrap();
        assert_eq!(
            book.outline().unwrap(),
            vec![
                OutlineEntry::new(1, "Chapter One", 1),
                OutlineEntry::new(1, "Intro", 3),
                OutlineEntry::new(1, "Intro", 4),
            ]
        );
    }

    #[test]
    fn test_outline_depth_follows_nesting() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("book.pdf");
        let part_one = Mark {
            children: vec![mark("Chapter 1", 1), mark("Chapter 2", 2)],
            ..mark("Part One", 0)
        };
        write_pdf_with_outline(
            &path,
            &["Part One", "Ch 1", "Ch 2", "Part Two"],
            &[part_one, mark("Part Two", 3)],
        );

        let book = PdfBook::open(&path).unwrap();
        assert_eq!(
            book.outline().unwrap(),
            vec![
                OutlineEntry::new(1, "Part One", 1),
                OutlineEntry::new(2, "Chapter 1", 2),
                OutlineEntry::new(2, "Chapter 2", 3),
                OutlineEntry::new(1, "Part Two", 4),
            ]
        );
    }

    #[test]
    fn test_outline_destination_without_page_reference() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("book.pdf");
        let remote = Mark {
            title: "Appendix",
            page: None,
            children: Vec::new(),
        };
        write_pdf_with_outline(&path, &["One", "Two"], &[mark("Chapter 1", 0), remote]);

        let book = PdfBook::open(&path).unwrap();
        assert_eq!(
            book.outline().unwrap(),
            vec![
                OutlineEntry::new(1, "Chapter 1", 1),
                OutlineEntry::new(1, "Appendix", 0),
            ]
        );
    }

    #[test]
    fn test_open_missing_file_fails() {
        let result = PdfBook::open(Path::new("/nonexistent/book.pdf"));
        assert!(result.is_err());
    }
}
