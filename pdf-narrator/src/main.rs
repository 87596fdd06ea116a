//! pdf-narrator - Detect chapters in PDF books and read them aloud

mod chapters;
mod config;
mod document;
mod error;
mod library;
mod narration;
mod prompt;
mod text;
mod tts;

use anyhow::{Context, Result};
use chapters::{Chapter, Detection};
use clap::{Parser, Subcommand};
use config::NarratorConfig;
use document::{PageSource, PdfBook};
use indicatif::{ProgressBar, ProgressStyle};
use narration::bookmark::{Bookmark, BookmarkStore, compute_book_hash};
use narration::{NarrationOutcome, NarrationSession, NarrationSettings, PageRange};
use error::NarratorError;
use prompt::{Prompter, is_plain_number};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tts::SpeechSink;

#[derive(Parser, Debug)]
#[command(name = "pdf-narrator")]
#[command(about = "Detect chapters in PDF books and read them aloud", long_about = None)]
#[command(version)]
struct Args {
    /// Folder to look for PDF books in (overrides the configured folder)
    #[arg(long)]
    books_dir: Option<PathBuf>,

    /// Search subfolders for books too
    #[arg(short, long)]
    recursive: bool,

    /// Ignore saved bookmarks
    #[arg(long)]
    no_resume: bool,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the folder searched for books
    SetBooksDir {
        /// Path to the books folder
        path: PathBuf,
    },
    /// Set the default voice id
    SetVoice {
        /// Voice id as listed by the speech engine
        id: String,
    },
    /// Set the default speech rate
    SetRate {
        /// Words per minute (e.g. 160-220)
        wpm: u32,
    },
    /// Set the maximum characters spoken per chunk
    SetMaxChars {
        /// Characters per chunk (default 900)
        value: usize,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Some(Commands::Config { action }) = &args.command {
        return handle_config_command(action);
    }

    let config = NarratorConfig::load().context("Failed to load configuration")?;
    let books_dir = args.books_dir.clone().unwrap_or_else(|| config.books_dir.clone());

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut prompter = Prompter::new(stdin.lock(), stdout.lock());

    run(&args, &config, &books_dir, &mut prompter)
}

/// The interactive flow: pick a book, set up speech, pick a chapter, narrate.
fn run<R: BufRead, W: Write>(
    args: &Args,
    config: &NarratorConfig,
    books_dir: &Path,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    let books = library::find_pdf_files(books_dir, args.recursive)?;

    prompter.say(format!("\nBooks found in: {}\n", books_dir.display()))?;
    for (i, path) in books.iter().enumerate() {
        prompter.say(format!("[{}] {}", i + 1, library::display_name(path)))?;
    }

    let Some(book_idx) = prompter.choose_index(books.len(), "\nSelect a book (number): ")? else {
        return Ok(());
    };
    let book_path = &books[book_idx];
    prompter.say(format!("\nOpening: {}", library::display_name(book_path)))?;

    let book = PdfBook::open(book_path)
        .with_context(|| format!("Failed to open PDF: {}", book_path.display()))?;
    log::info!("Opened {} ({} pages)", book.display_name(), book.page_count());

    let mut sink = tts::create_sink().context("Failed to start speech engine")?;
    apply_configured_voice(sink.as_mut(), config);
    setup_speech(sink.as_mut(), prompter)?;

    let settings = config.narration_settings();
    let store = if args.no_resume {
        None
    } else {
        open_bookmarks(book.path())
    };

    if let Some(saved) = &store {
        if let Some(bookmark) = saved.bookmark.as_ref().filter(|b| b.fits(book.page_count())) {
            let question = format!(
                "\nResume at page {} (range {})? [Y/n]: ",
                bookmark.page + 1,
                bookmark.range.display_one_based()
            );
            let Some(resume) = prompter.confirm(&question)? else {
                return Ok(());
            };
            if resume {
                let outcome = NarrationSession::new(&book, sink.as_mut(), bookmark.range, settings)
                    .run_from(bookmark.page, prompter)?;
                saved.record(bookmark.range, outcome);
                return Ok(());
            }
        }
    }

    prompter.say("\nDetecting chapters...")?;
    let detection = detect_with_progress(&book);

    let source_name = detection.source_name();
    let picked = match detection.into_result() {
        Ok(chapters) => {
            prompter.say(format!("\nDetected chapters/sections ({}):\n", source_name))?;
            choose_chapter(&chapters, prompter)?
        }
        Err(NarratorError::NoStructureDetected) => {
            ask_manual_range(book.page_count(), prompter)?
        }
        Err(e) => return Err(e.into()),
    };
    let Some(range) = picked else {
        return Ok(());
    };

    let outcome = narrate(&book, sink.as_mut(), range, settings, prompter)?;

    if let Some(saved) = &store {
        saved.record(range, outcome);
    }

    Ok(())
}

fn narrate<R: BufRead, W: Write>(
    book: &PdfBook,
    sink: &mut dyn SpeechSink,
    range: PageRange,
    settings: NarrationSettings,
    prompter: &mut Prompter<R, W>,
) -> Result<NarrationOutcome> {
    let outcome = NarrationSession::new(book, sink, range, settings).run(prompter)?;
    Ok(outcome)
}

/// Run detection, showing a progress bar while pages are scanned.
fn detect_with_progress(book: &PdfBook) -> Detection {
    let pb = ProgressBar::new(book.page_count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Scanning pages [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let detection = chapters::detect_chapters_with_progress(book, |done, _| {
        pb.set_position(done as u64);
    });
    pb.finish_and_clear();
    log::debug!(
        "Detection via {}: {} chapters",
        detection.source_name(),
        detection.chapters().map_or(0, <[Chapter]>::len)
    );
    detection
}

/// List chapters and ask which to narrate.
fn choose_chapter<R: BufRead, W: Write>(
    chapters: &[Chapter],
    prompter: &mut Prompter<R, W>,
) -> Result<Option<PageRange>> {
    for (i, chapter) in chapters.iter().enumerate() {
        prompter.say(format!("[{}] {}", i + 1, chapter.menu_label()))?;
    }

    let Some(idx) = prompter.choose_index(
        chapters.len(),
        "\nWhich chapter do you want to narrate? (number): ",
    )?
    else {
        return Ok(None);
    };

    let chapter = &chapters[idx];
    log::debug!(
        "Selected chapter {:?} (pages {}-{})",
        chapter.label(),
        chapter.start_page() + 1,
        chapter.end_page() + 1
    );
    let range = chapter.page_range();
    prompter.say("\nStarting narration:")?;
    prompter.say(format!("  Pages: {}", range.display_one_based()))?;
    if !chapter.title().is_empty() {
        prompter.say(format!("  Title: {}", chapter.title()))?;
    }
    Ok(Some(range))
}

/// Fallback when no chapters were found: ask for a start and end page.
fn ask_manual_range<R: BufRead, W: Write>(
    page_count: usize,
    prompter: &mut Prompter<R, W>,
) -> Result<Option<PageRange>> {
    prompter.say("\nNo chapters detected automatically.")?;
    prompter.say(
        "This usually happens if the PDF has no Table of Contents and no 'CHAPTER' headings, or it is scanned images.",
    )?;
    prompter.say("Fallback: choose a page range to narrate.\n")?;

    let start = prompter
        .ask(&format!("Start page (1-{}): ", page_count))?
        .unwrap_or_default();
    let end = prompter
        .ask(&format!("End page (1-{}): ", page_count))?
        .unwrap_or_default();

    match narration::manual_range(&start, &end, page_count) {
        Ok(range) => Ok(Some(range)),
        Err(e) => {
            log::debug!("Manual range rejected: {}", e);
            prompter.say("Invalid page numbers.")?;
            Ok(None)
        }
    }
}

/// Apply the voice and rate from the config file, warning on failure.
fn apply_configured_voice(sink: &mut dyn SpeechSink, config: &NarratorConfig) {
    if let Some(voice) = &config.voice {
        if let Err(e) = sink.set_voice(voice) {
            log::warn!("Configured voice {:?} not applied: {}", voice, e);
        }
    }
    if let Some(rate) = config.rate {
        if let Err(e) = sink.set_rate(rate) {
            log::warn!("Configured rate {} not applied: {}", rate, e);
        }
    }
}

/// Optional interactive voice and rate selection.
fn setup_speech<R: BufRead, W: Write>(
    sink: &mut dyn SpeechSink,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    prompter.say(format!("\nTTS setup ({}, optional):", sink.name()))?;
    prompter.say("  - Press Enter to accept defaults")?;
    prompter.say("  - Or type 'v' to list voices")?;

    let choice = prompter.ask("Choice (Enter/v): ")?.unwrap_or_default();
    if choice.eq_ignore_ascii_case("v") {
        match sink.voices() {
            Ok(voices) => {
                for (i, voice) in voices.iter().enumerate() {
                    prompter.say(format!(
                        "[{}] {} | id={} | languages={:?}",
                        i, voice.name, voice.id, voice.languages
                    ))?;
                }
                let answer = prompter
                    .ask("Select voice index (Enter to skip): ")?
                    .unwrap_or_default();
                let picked = is_plain_number(&answer)
                    .then(|| answer.parse::<usize>().ok())
                    .flatten()
                    .filter(|&i| i < voices.len());
                match picked {
                    Some(i) => match sink.set_voice(&voices[i].id) {
                        Ok(()) => prompter.say(format!("Voice set to: {}", voices[i].name))?,
                        Err(e) => prompter.say(format!("Voice not changed: {}", e))?,
                    },
                    None if answer.is_empty() => {}
                    None => prompter.say("Invalid voice index. Keeping the current voice.")?,
                }
            }
            Err(e) => prompter.say(format!("Could not list voices: {}", e))?,
        }
    }

    let rate = prompter
        .ask("Speech rate (e.g., 160-220, Enter to keep default): ")?
        .unwrap_or_default();
    if !rate.is_empty() {
        let wpm = is_plain_number(&rate)
            .then(|| rate.parse::<u32>().ok())
            .flatten();
        match wpm.map(|wpm| (wpm, sink.set_rate(wpm))) {
            Some((wpm, Ok(()))) => prompter.say(format!("Speech rate set to: {}", wpm))?,
            Some((_, Err(e))) => prompter.say(format!("Speech rate not changed: {}", e))?,
            None => prompter.say("Invalid rate. Keeping the current rate.")?,
        }
    }
    Ok(())
}

/// The bookmark store together with this book's identity and saved position.
struct SavedPosition {
    store: BookmarkStore,
    book_hash: String,
    book_path: PathBuf,
    bookmark: Option<Bookmark>,
}

impl SavedPosition {
    /// Save where narration stopped, or forget the bookmark once a range is finished.
    fn record(&self, range: PageRange, outcome: NarrationOutcome) {
        let result = match outcome {
            NarrationOutcome::Stopped { page } => self.store.save(&Bookmark::new(
                self.book_hash.clone(),
                self.book_path.clone(),
                range,
                page,
            )),
            NarrationOutcome::Finished => self.store.clear(&self.book_hash),
        };
        if let Err(e) = result {
            log::warn!("Could not update bookmark: {}", e);
        }
    }
}

/// Open the bookmark store and look up this book; failures only disable resuming.
fn open_bookmarks(book_path: &Path) -> Option<SavedPosition> {
    let opened = BookmarkStore::open_default().and_then(|store| {
        let book_hash = compute_book_hash(book_path)?;
        Ok((store, book_hash))
    });
    let (store, book_hash) = match opened {
        Ok(opened) => opened,
        Err(e) => {
            log::warn!("Bookmarks unavailable: {}", e);
            return None;
        }
    };

    let bookmark = store.load(&book_hash).unwrap_or_else(|e| {
        log::warn!("Could not read bookmark: {}", e);
        None
    });
    Some(SavedPosition {
        store,
        book_hash,
        book_path: book_path.to_path_buf(),
        bookmark,
    })
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = NarratorConfig::load()?;
            println!("Configuration file: {:?}", NarratorConfig::config_path()?);
            println!();
            println!("books_dir = \"{}\"", config.books_dir.display());
            match &config.voice {
                Some(voice) => println!("voice = \"{}\"", voice),
                None => println!("voice = (engine default)"),
            }
            match config.rate {
                Some(rate) => println!("rate = {}", rate),
                None => println!("rate = (engine default)"),
            }
            println!("max_chunk_chars = {}", config.max_chunk_chars);
            println!("chunk_pause_ms = {}", config.chunk_pause_ms);
        }
        ConfigAction::SetBooksDir { path } => {
            let mut config = NarratorConfig::load()?;
            config.books_dir = path.clone();
            config.save()?;
            println!("Books folder set to: {}", path.display());
        }
        ConfigAction::SetVoice { id } => {
            let mut config = NarratorConfig::load()?;
            config.voice = Some(id.clone());
            config.save()?;
            println!("Default voice set to: {}", id);
        }
        ConfigAction::SetRate { wpm } => {
            let mut config = NarratorConfig::load()?;
            config.rate = Some((*wpm).max(1));
            config.save()?;
            println!("Default speech rate set to: {}", wpm);
        }
        ConfigAction::SetMaxChars { value } => {
            let mut config = NarratorConfig::load()?;
            config.max_chunk_chars = (*value).max(1);
            config.save()?;
            println!("Default chunk size set to: {}", config.max_chunk_chars);
        }
    }
    Ok(())
}
