//! Interactive page-by-page narration over a page range.

pub mod bookmark;

use crate::document::PageSource;
use crate::error::{NarratorError, Result};
use crate::prompt::{Prompter, is_plain_number};
use crate::text::{DEFAULT_MAX_CHARS, chunk_for_speech};
use crate::tts::SpeechSink;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

/// Default pause between spoken chunks.
pub const DEFAULT_CHUNK_PAUSE: Duration = Duration::from_millis(30);

const RULE_WIDTH: usize = 90;

/// A zero-based, inclusive page range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

impl PageRange {
    /// Create a range, swapping the bounds if they are reversed.
    pub fn new(start: usize, end: usize) -> Self {
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    pub fn contains(&self, page: usize) -> bool {
        (self.start..=self.end).contains(&page)
    }

    /// One-based description, e.g. `5-10`.
    pub fn display_one_based(&self) -> String {
        format!("{}-{}", self.start + 1, self.end + 1)
    }
}

/// Build a page range from manually entered one-based page numbers.
///
/// Both answers must be plain numbers. Values are clamped into the document
/// and swapped if given in reverse order.
pub fn manual_range(start: &str, end: &str, page_count: usize) -> Result<PageRange> {
    let parse = |s: &str| -> Result<usize> {
        let s = s.trim();
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(NarratorError::InvalidPageRange(format!("not a page number: {:?}", s)));
        }
        s.parse::<usize>()
            .map_err(|_| NarratorError::InvalidPageRange(format!("page number too large: {}", s)))
    };

    if page_count == 0 {
        return Err(NarratorError::InvalidPageRange("document has no pages".to_string()));
    }

    let last = page_count - 1;
    let start = parse(start)?.saturating_sub(1).min(last);
    let end = parse(end)?.saturating_sub(1).min(last);
    Ok(PageRange::new(start, end))
}

/// A user command entered after a page has been read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Empty input: go to the next page
    Next,
    /// `b`: previous page, never before the range start
    Back,
    /// `r`: read the current page again
    Repeat,
    /// `g`: prompt for a page to jump to
    GoTo,
    /// `q`: stop narrating
    Quit,
    /// Anything else; treated as [`Command::Next`] with a warning
    Unknown(String),
}

impl Command {
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "" => Command::Next,
            "b" => Command::Back,
            "r" => Command::Repeat,
            "g" => Command::GoTo,
            "q" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        }
    }
}

/// Where a narration session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrationState {
    /// Reading page `p` (zero-based)
    AtPage(usize),
    Stopped,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrationOutcome {
    /// Read past the last page of the range
    Finished,
    /// Stopped by `q` or end of input while on `page`
    Stopped { page: usize },
}

/// Narration tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrationSettings {
    /// Maximum characters per spoken chunk
    pub max_chunk_chars: usize,
    /// Pause after each chunk
    pub chunk_pause: Duration,
}

impl Default for NarrationSettings {
    fn default() -> Self {
        Self {
            max_chunk_chars: DEFAULT_MAX_CHARS,
            chunk_pause: DEFAULT_CHUNK_PAUSE,
        }
    }
}

/// Reads a page range aloud, one page at a time, taking commands between pages.
pub struct NarrationSession<'a, S: PageSource + ?Sized, K: SpeechSink + ?Sized> {
    source: &'a S,
    sink: &'a mut K,
    range: PageRange,
    settings: NarrationSettings,
}

impl<'a, S: PageSource + ?Sized, K: SpeechSink + ?Sized> NarrationSession<'a, S, K> {
    pub fn new(
        source: &'a S,
        sink: &'a mut K,
        range: PageRange,
        settings: NarrationSettings,
    ) -> Self {
        Self {
            source,
            sink,
            range,
            settings,
        }
    }

    /// Narrate from the start of the range.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        prompter: &mut Prompter<R, W>,
    ) -> io::Result<NarrationOutcome> {
        self.run_from(self.range.start, prompter)
    }

    /// Narrate from `page`, which is clamped into the range.
    pub fn run_from<R: BufRead, W: Write>(
        &mut self,
        page: usize,
        prompter: &mut Prompter<R, W>,
    ) -> io::Result<NarrationOutcome> {
        let mut page = page.clamp(self.range.start, self.range.end);

        while page <= self.range.end {
            self.narrate_page(page, prompter)?;

            prompter.say("")?;
            prompter.say(
                "Controls: [Enter]=next page | b=back | r=repeat | g=go to page | q=stop",
            )?;
            let command = match prompter.ask("> ")? {
                Some(input) => Command::parse(&input),
                None => Command::Quit,
            };

            match self.next_state(page, command, prompter)? {
                NarrationState::AtPage(next) => page = next,
                NarrationState::Stopped => return Ok(NarrationOutcome::Stopped { page }),
            }
        }

        Ok(NarrationOutcome::Finished)
    }

    /// Apply one command at page `page`.
    ///
    /// `AtPage(end + 1)` means the range has been read to the end.
    pub fn next_state<R: BufRead, W: Write>(
        &self,
        page: usize,
        command: Command,
        prompter: &mut Prompter<R, W>,
    ) -> io::Result<NarrationState> {
        let range = self.range;
        let state = match command {
            Command::Next => NarrationState::AtPage(page + 1),
            Command::Back => NarrationState::AtPage(page.saturating_sub(1).max(range.start)),
            Command::Repeat => NarrationState::AtPage(page),
            Command::Quit => NarrationState::Stopped,
            Command::Unknown(input) => {
                debug!("Unknown narration command: {:?}", input);
                prompter.say("Unknown command. Moving to next page.")?;
                NarrationState::AtPage(page + 1)
            }
            Command::GoTo => {
                let prompt = format!(
                    "Go to page number (1-based, {}): ",
                    range.display_one_based()
                );
                let answer = prompter.ask(&prompt)?.unwrap_or_default();
                if !is_plain_number(&answer) {
                    prompter.say("Invalid page number.")?;
                    return Ok(NarrationState::AtPage(page));
                }
                // Digits too large for usize are past the end of any range.
                match answer.parse::<usize>() {
                    Ok(number) if number >= 1 && range.contains(number - 1) => {
                        NarrationState::AtPage(number - 1)
                    }
                    _ => {
                        prompter.say("Out of range.")?;
                        NarrationState::AtPage(page)
                    }
                }
            }
        };
        Ok(state)
    }

    /// Print the page header and speak the page's text.
    fn narrate_page<R: BufRead, W: Write>(
        &mut self,
        page: usize,
        prompter: &mut Prompter<R, W>,
    ) -> io::Result<()> {
        let rule = "-".repeat(RULE_WIDTH);
        prompter.say("")?;
        prompter.say(&rule)?;
        prompter.say(format!(
            "NARRATING PAGE {}/{}   (range: {})",
            page + 1,
            self.source.page_count(),
            self.range.display_one_based()
        ))?;
        prompter.say(&rule)?;

        let text = self.source.page_text(page).unwrap_or_else(|e| {
            warn!("Could not extract text from page {}: {}", page + 1, e);
            String::new()
        });
        let text = text.trim();
        if text.is_empty() {
            prompter.say("(No readable text on this page.)")?;
            return Ok(());
        }

        for chunk in chunk_for_speech(text, self.settings.max_chunk_chars) {
            if let Err(e) = self.sink.speak(&chunk) {
                warn!("Speech failed on page {}: {}", page + 1, e);
                prompter.say(format!("(Could not speak part of this page: {})", e))?;
            }
            if !self.settings.chunk_pause.is_zero() {
                thread::sleep(self.settings.chunk_pause);
            }
        }
        Ok(())
    }
}
