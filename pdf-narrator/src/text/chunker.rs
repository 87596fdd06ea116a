//! Splitting page text into speakable chunks.

use super::normalize_whitespace;
use once_cell::sync::Lazy;
use regex::Regex;

/// Default maximum chunk size in characters.
pub const DEFAULT_MAX_CHARS: usize = 900;

/// Paragraph boundary: a blank line, possibly containing stray whitespace.
static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("paragraph regex is valid"));

/// Sentence terminator followed by the whitespace that separates sentences.
static SENTENCE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+").expect("sentence regex is valid"));

/// Split page text into chunks of at most `max_chars` characters.
///
/// Paragraphs (separated by blank lines) that fit are emitted whole. Longer
/// paragraphs are split into sentences and packed greedily. A single sentence
/// longer than `max_chars` is emitted on its own as an oversized chunk; it is
/// never cut mid-sentence.
pub fn chunk_for_speech(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();

    for paragraph in PARAGRAPH_BREAK.split(text) {
        let paragraph = normalize_whitespace(paragraph);
        if paragraph.is_empty() {
            continue;
        }

        if char_len(&paragraph) <= max_chars {
            chunks.push(paragraph);
            continue;
        }

        let mut buffer = String::new();
        for sentence in split_sentences(&paragraph) {
            if buffer.is_empty() {
                buffer.push_str(sentence);
            } else if char_len(&buffer) + char_len(sentence) + 1 <= max_chars {
                buffer.push(' ');
                buffer.push_str(sentence);
            } else {
                chunks.push(std::mem::take(&mut buffer));
                buffer.push_str(sentence);
            }
        }

        if !buffer.is_empty() {
            chunks.push(buffer);
        }
    }

    chunks
}

/// Split normalized text after every `.`, `!` or `?` that is followed by whitespace.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in SENTENCE_BREAK.find_iter(text) {
        // Terminators are ASCII, so the sentence ends one byte into the match.
        let sentence = text[start..m.start() + 1].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = m.end();
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }

    sentences
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_paragraph_is_one_chunk() {
        let chunks = chunk_for_speech("Hello world. How are you?", DEFAULT_MAX_CHARS);
        assert_eq!(chunks, vec!["Hello world. How are you?"]);
    }

    #[test]
    fn test_paragraphs_are_separate_chunks() {
        let text = "First paragraph\nwraps here.\n\n  \nSecond paragraph.";
        let chunks = chunk_for_speech(text, DEFAULT_MAX_CHARS);
        assert_eq!(chunks, vec!["First paragraph wraps here.", "Second paragraph."]);
    }

    #[test]
    fn test_empty_text() {
        assert!(chunk_for_speech("", DEFAULT_MAX_CHARS).is_empty());
        assert!(chunk_for_speech("   \n\n   ", DEFAULT_MAX_CHARS).is_empty());
    }

    #[test]
    fn test_long_paragraph_packs_sentences() {
        let text = "One two three. Four five six! Seven eight nine? Ten eleven twelve.";
        let chunks = chunk_for_speech(text, 30);
        assert_eq!(
            chunks,
            vec!["One two three. Four five six!", "Seven eight nine?", "Ten eleven twelve."]
        );
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 30, "Chunk too long: {}", chunk);
        }
    }

    #[test]
    fn test_exact_limit_is_one_chunk() {
        let text = "a".repeat(40);
        let chunks = chunk_for_speech(&text, 40);
        assert_eq!(chunks, vec![text]);
    }

    #[test]
    fn test_oversized_sentence_is_not_split() {
        let sentence = format!("{} end", "word ".repeat(30).trim_end());
        let chunks = chunk_for_speech(&sentence, 20);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], sentence);
    }

    #[test]
    fn test_oversized_sentence_between_short_ones() {
        let long = "x".repeat(50);
        let text = format!("Short one. {}. Short two.", long);
        let chunks = chunk_for_speech(&text, 20);
        assert_eq!(chunks, vec!["Short one.".to_string(), format!("{}.", long), "Short two.".to_string()]);
    }

    #[test]
    fn test_limit_counts_characters_not_bytes() {
        let text = "é".repeat(10);
        assert_eq!(chunk_for_speech(&text, 10).len(), 1);
    }

    #[test]
    fn test_split_sentences() {
        assert_eq!(
            split_sentences("Hi there. Yes! Really? ok"),
            vec!["Hi there.", "Yes!", "Really?", "ok"]
        );
        assert_eq!(split_sentences("v1.2 stays whole."), vec!["v1.2 stays whole."]);
    }

    proptest! {
        #[test]
        fn prop_chunks_rejoin_to_normalized_paragraph(
            words in proptest::collection::vec("[a-z]{1,8}[.!?]?", 1..60),
            max_chars in 10usize..120,
        ) {
            let paragraph = words.join(" ");
            let chunks = chunk_for_speech(&paragraph, max_chars);
            prop_assert_eq!(chunks.join(" "), normalize_whitespace(&paragraph));
        }

        #[test]
        fn prop_short_paragraph_is_unchanged(text in "[a-zA-Z ,.!?]{1,80}") {
            let normalized = normalize_whitespace(&text);
            prop_assume!(!normalized.is_empty());
            let chunks = chunk_for_speech(&text, 80);
            prop_assert_eq!(chunks, vec![normalized]);
        }
    }
}
