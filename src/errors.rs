// ABOUTME: Error types for the deck2pdf application
// ABOUTME: Provides structured error handling for each stage of the pipeline

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Failed to read file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWriteError(std::io::Error),

    #[error("Path not found: {0}")]
    PathNotFoundError(PathBuf),

    #[error("Input validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Font blob error: {0}")]
    FontError(String),

    #[error("Stylesheet marker not found: {0}")]
    MarkerNotFound(String),

    #[error("HTML preprocessing error: {0}")]
    CleanError(String),

    #[error("Headless browser error: {message}")]
    BrowserError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Failed to render PDF: {0}")]
    PdfError(String),

    #[error("Conversion failed for {path}: {message}")]
    ConvertError { path: PathBuf, message: String },

    #[error("Unknown error: {0}")]
    UnknownError(String),
}

// Implement conversion from anyhow::Error to our DeckError
impl From<anyhow::Error> for DeckError {
    fn from(err: anyhow::Error) -> Self {
        DeckError::UnknownError(err.to_string())
    }
}

// Regex compilation failures only occur for malformed configured patterns
impl From<regex::Error> for DeckError {
    fn from(err: regex::Error) -> Self {
        DeckError::CleanError(format!("Invalid substitution pattern: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, DeckError>;
