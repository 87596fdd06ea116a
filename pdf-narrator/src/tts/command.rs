//! Speech through a system command: macOS `say` or espeak-ng.

use super::{SpeechSink, Voice};
use crate::error::{NarratorError, Result};
use crate::text::normalize_whitespace;
use log::debug;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// A command-line speech engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    /// macOS `say`
    Say,
    /// `espeak-ng`
    EspeakNg,
    /// Classic `espeak`
    Espeak,
}

impl Engine {
    /// Engines in order of preference.
    pub const ALL: [Engine; 3] = [Engine::Say, Engine::EspeakNg, Engine::Espeak];

    pub fn program(self) -> &'static str {
        match self {
            Engine::Say => "say",
            Engine::EspeakNg => "espeak-ng",
            Engine::Espeak => "espeak",
        }
    }

    fn rate_flag(self) -> &'static str {
        match self {
            Engine::Say => "-r",
            Engine::EspeakNg | Engine::Espeak => "-s",
        }
    }

    fn list_voices_args(self) -> &'static [&'static str] {
        match self {
            Engine::Say => &["-v", "?"],
            Engine::EspeakNg | Engine::Espeak => &["--voices"],
        }
    }

    fn parse_voices(self, listing: &str) -> Vec<Voice> {
        match self {
            Engine::Say => parse_say_voices(listing),
            Engine::EspeakNg | Engine::Espeak => parse_espeak_voices(listing),
        }
    }
}

/// Speech sink that runs one engine process per utterance.
///
/// `speak` waits for the process to exit, so no engine process outlives a call.
pub struct CommandSink {
    engine: Engine,
    program: PathBuf,
    voice: Option<String>,
    rate: Option<u32>,
}

impl CommandSink {
    /// Use the first engine found on `PATH`.
    pub fn detect() -> Result<Self> {
        for engine in Engine::ALL {
            match which::which(engine.program()) {
                Ok(program) => {
                    debug!("Using speech engine {} at {}", engine.program(), program.display());
                    return Ok(Self::new(engine, program));
                }
                Err(e) => debug!("Speech engine {} unavailable: {}", engine.program(), e),
            }
        }
        Err(NarratorError::SpeechEngine(
            "No speech engine found. Install espeak-ng, or run on macOS where `say` is built in."
                .to_string(),
        ))
    }

    pub fn new(engine: Engine, program: PathBuf) -> Self {
        Self {
            engine,
            program,
            voice: None,
            rate: None,
        }
    }

    /// Arguments for speaking `text` with the current voice and rate.
    fn speak_args(&self, text: &str) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(voice) = &self.voice {
            args.push("-v".to_string());
            args.push(voice.clone());
        }
        if let Some(rate) = self.rate {
            args.push(self.engine.rate_flag().to_string());
            args.push(rate.to_string());
        }
        // Keep text that starts with '-' from being read as a flag.
        args.push("--".to_string());
        args.push(text.to_string());
        args
    }
}

impl SpeechSink for CommandSink {
    fn speak(&mut self, text: &str) -> Result<()> {
        let text = normalize_whitespace(text);
        if text.is_empty() {
            return Ok(());
        }

        let status = Command::new(&self.program)
            .args(self.speak_args(&text))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;

        if !status.success() {
            return Err(NarratorError::SpeechEngine(format!(
                "{} exited with {}",
                self.engine.program(),
                status
            )));
        }
        Ok(())
    }

    fn voices(&self) -> Result<Vec<Voice>> {
        let output = Command::new(&self.program)
            .args(self.engine.list_voices_args())
            .output()?;
        if !output.status.success() {
            return Err(NarratorError::SpeechEngine(format!(
                "{} could not list voices: {}",
                self.engine.program(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(self
            .engine
            .parse_voices(&String::from_utf8_lossy(&output.stdout)))
    }

    fn set_voice(&mut self, id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(NarratorError::InvalidSelection("empty voice id".to_string()));
        }
        self.voice = Some(id.trim().to_string());
        Ok(())
    }

    fn set_rate(&mut self, words_per_minute: u32) -> Result<()> {
        if words_per_minute == 0 {
            return Err(NarratorError::InvalidSelection("rate must be positive".to_string()));
        }
        self.rate = Some(words_per_minute);
        Ok(())
    }

    fn name(&self) -> &str {
        self.engine.program()
    }
}

/// Parse `say -v '?'` output: `Name   locale   # sample sentence`.
fn parse_say_voices(listing: &str) -> Vec<Voice> {
    listing
        .lines()
        .filter_map(|line| {
            let described = line.split('#').next()?.trim();
            let mut tokens: Vec<&str> = described.split_whitespace().collect();
            if tokens.len() < 2 {
                return None;
            }
            let language = tokens.pop()?.to_string();
            let name = tokens.join(" ");
            Some(Voice {
                id: name.clone(),
                name,
                languages: vec![language],
            })
        })
        .collect()
}

/// Parse `espeak-ng --voices` output.
///
/// Columns: `Pty Language Age/Gender VoiceName File Other-Languages`; the
/// header row is skipped.
fn parse_espeak_voices(listing: &str) -> Vec<Voice> {
    listing
        .lines()
        .skip(1)
        .filter_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 4 {
                return None;
            }
            let mut languages = vec![tokens[1].to_string()];
            languages.extend(
                tokens
                    .iter()
                    .skip(5)
                    .map(|t| t.trim_matches(|c| c == '(' || c == ')').to_string())
                    .filter(|t| !t.is_empty() && !t.chars().all(|c| c.is_ascii_digit())),
            );
            Some(Voice {
                name: tokens[3].replace('_', " "),
                id: tokens[1].to_string(),
                languages,
            })
        })
        .collect()
}
