use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NarratorError {
    #[error("Books folder not found: {}", .path.display())]
    InputNotFound { path: PathBuf },

    #[error("No PDF files found in: {}", .path.display())]
    NoPdfFiles { path: PathBuf },

    #[error("No chapters detected (no outline entries and no chapter headings)")]
    NoStructureDetected,

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    #[error("Speech engine error: {0}")]
    SpeechEngine(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, NarratorError>;
