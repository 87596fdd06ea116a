//! Text processing for narration: whitespace normalization and speech chunking.

pub mod chunker;

pub use chunker::{DEFAULT_MAX_CHARS, chunk_for_speech};

/// Collapse every run of whitespace to a single space and trim the ends.
///
/// The result never contains a newline, so it is safe to print on one line
/// or hand to a speech engine as a single utterance.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
