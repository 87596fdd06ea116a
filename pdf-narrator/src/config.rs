//! pdf-narrator configuration management.

use crate::error::Result;
use crate::narration::NarrationSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_MAX_CHUNK_CHARS: usize = crate::text::DEFAULT_MAX_CHARS;
const DEFAULT_CHUNK_PAUSE_MS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarratorConfig {
    /// Folder searched for PDF books
    #[serde(default = "default_books_dir")]
    pub books_dir: PathBuf,

    /// Voice id passed to the speech engine. None keeps the engine default.
    #[serde(default)]
    pub voice: Option<String>,

    /// Speaking rate in words per minute. None keeps the engine default.
    #[serde(default)]
    pub rate: Option<u32>,

    /// Maximum characters per spoken chunk
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// Pause between spoken chunks, in milliseconds
    #[serde(default = "default_chunk_pause_ms")]
    pub chunk_pause_ms: u64,
}

fn default_books_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("Books"))
        .unwrap_or_else(|| PathBuf::from("Books"))
}

fn default_max_chunk_chars() -> usize {
    DEFAULT_MAX_CHUNK_CHARS
}

fn default_chunk_pause_ms() -> u64 {
    DEFAULT_CHUNK_PAUSE_MS
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            books_dir: default_books_dir(),
            voice: None,
            rate: None,
            max_chunk_chars: default_max_chunk_chars(),
            chunk_pause_ms: default_chunk_pause_ms(),
        }
    }
}

impl NarratorConfig {
    /// Get the config file path: ~/.config/cli-programs/pdf-narrator.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found")
        })?;
        Ok(home
            .join(".config")
            .join("cli-programs")
            .join("pdf-narrator.toml"))
    }

    /// Load config from the default path, returning defaults if the file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: NarratorConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Narration settings derived from this config.
    pub fn narration_settings(&self) -> NarrationSettings {
        NarrationSettings {
            max_chunk_chars: self.max_chunk_chars.max(1),
            chunk_pause: Duration::from_millis(self.chunk_pause_ms),
        }
    }
}
