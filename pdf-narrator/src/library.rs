//! Finding PDF books in the books folder.

use crate::error::{NarratorError, Result};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// List the PDFs in `dir`, sorted case-insensitively by file name.
///
/// Fails if the folder is missing or holds no PDFs.
pub fn find_pdf_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(NarratorError::InputNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    if recursive {
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry.map_err(|e| NarratorError::Io(e.into()))?;
            if entry.file_type().is_file() && is_pdf(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }
    } else {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && is_pdf(&path) {
                files.push(path);
            }
        }
    }

    if files.is_empty() {
        return Err(NarratorError::NoPdfFiles {
            path: dir.to_path_buf(),
        });
    }

    files.sort_by_key(|p| display_name(p).to_lowercase());
    Ok(files)
}

/// Check if a path is a PDF (case-insensitive extension)
fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// File name of a book for menus.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
