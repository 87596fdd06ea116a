//! Saved reading positions, so a stopped narration can be resumed next run.

use super::PageRange;
use crate::error::{NarratorError, Result};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};

/// Where a reader stopped in one book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Hash identifying the book's contents
    pub book_hash: String,
    /// Path the book was read from
    pub book_path: PathBuf,
    /// Range that was being narrated
    pub range: PageRange,
    /// Zero-based page to resume at
    pub page: usize,
    /// When the bookmark was last written
    pub updated_at: DateTime<Utc>,
}

impl Bookmark {
    pub fn new(book_hash: String, book_path: PathBuf, range: PageRange, page: usize) -> Self {
        Self {
            book_hash,
            book_path,
            range,
            page,
            updated_at: Utc::now(),
        }
    }

    /// Whether the bookmark still fits a document of `page_count` pages.
    pub fn fits(&self, page_count: usize) -> bool {
        self.range.end < page_count && self.range.contains(self.page)
    }
}

/// Compute a hash of the book file for bookmark lookup.
///
/// Uses SHA256 of the first 1MB, so renamed or moved books are still found.
pub fn compute_book_hash(book_path: &Path) -> Result<String> {
    let file = File::open(book_path)?;
    let mut reader = BufReader::new(file).take(1024 * 1024);
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    let digest = Sha256::digest(&buffer);
    Ok(format!("{:x}", digest)[..16].to_string())
}

/// Bookmark files stored as JSON, one per book.
pub struct BookmarkStore {
    dir: PathBuf,
}

impl BookmarkStore {
    /// Store under the user's local data directory.
    pub fn open_default() -> Result<Self> {
        let dir = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .map(|d| d.join("pdf-narrator").join("bookmarks"))
            .ok_or_else(|| {
                NarratorError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "could not determine data directory",
                ))
            })?;
        Self::in_dir(dir)
    }

    /// Store under `dir`, creating it if needed.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, book_hash: &str) -> PathBuf {
        self.dir.join(format!("{}.json", book_hash))
    }

    /// Load the bookmark for a book, if one was saved.
    ///
    /// An unreadable bookmark file is treated as missing.
    pub fn load(&self, book_hash: &str) -> Result<Option<Bookmark>> {
        let path = self.path_for(book_hash);
        if !path.exists() {
            return Ok(None);
        }

        let reader = BufReader::new(File::open(&path)?);
        match serde_json::from_reader::<_, Bookmark>(reader) {
            Ok(bookmark) => Ok(Some(bookmark)),
            Err(e) => {
                debug!("Ignoring unreadable bookmark {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    /// Save a bookmark, replacing any earlier one for the same book.
    pub fn save(&self, bookmark: &Bookmark) -> Result<()> {
        let mut bookmark = bookmark.clone();
        bookmark.updated_at = Utc::now();

        let file = File::create(self.path_for(&bookmark.book_hash))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &bookmark)?;
        debug!(
            "Saved bookmark for {} at page {}",
            bookmark.book_path.display(),
            bookmark.page + 1
        );
        Ok(())
    }

    /// Remove a book's bookmark; missing bookmarks are not an error.
    pub fn clear(&self, book_hash: &str) -> Result<()> {
        let path = self.path_for(book_hash);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_compute_book_hash() {
        let temp_dir = TempDir::new().unwrap();
        let book_path = temp_dir.path().join("book.pdf");
        fs::write(&book_path, b"%PDF-1.5 test content").unwrap();

        let hash = compute_book_hash(&book_path).unwrap();
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, compute_book_hash(&book_path).unwrap());
    }

    #[test]
    fn test_hash_differs_by_content() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.pdf");
        let b = temp_dir.path().join("b.pdf");
        fs::write(&a, b"one").unwrap();
        fs::write(&b, b"two").unwrap();
        assert_ne!(compute_book_hash(&a).unwrap(), compute_book_hash(&b).unwrap());
    }

    #[test]
    fn test_save_load_clear() {
        let temp_dir = TempDir::new().unwrap();
        let store = BookmarkStore::in_dir(temp_dir.path().join("bookmarks")).unwrap();
        let bookmark = Bookmark::new(
            "abc123".to_string(),
            PathBuf::from("/books/novel.pdf"),
            PageRange::new(4, 9),
            6,
        );

        assert_eq!(store.load("abc123").unwrap(), None);
        store.save(&bookmark).unwrap();

        let loaded = store.load("abc123").unwrap().unwrap();
        assert_eq!(loaded.page, 6);
        assert_eq!(loaded.range, PageRange::new(4, 9));
        assert_eq!(loaded.book_path, PathBuf::from("/books/novel.pdf"));

        store.clear("abc123").unwrap();
        assert_eq!(store.load("abc123").unwrap(), None);
        store.clear("abc123").unwrap();
    }

    #[test]
    fn test_corrupt_bookmark_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let store = BookmarkStore::in_dir(temp_dir.path()).unwrap();
        fs::write(temp_dir.path().join("bad.json"), "{ not json").unwrap();
        assert_eq!(store.load("bad").unwrap(), None);
    }

    #[test]
    fn test_bookmark_fits() {
        let bookmark = Bookmark::new(
            "h".to_string(),
            PathBuf::from("b.pdf"),
            PageRange::new(4, 9),
            6,
        );
        assert!(bookmark.fits(10));
        assert!(!bookmark.fits(9));

        let stray = Bookmark { page: 12, ..bookmark };
        assert!(!stray.fits(20));
    }
}
