// ABOUTME: Font blob handling for the deck2pdf application
// ABOUTME: Reads base64-encoded font files and builds embedded @font-face declarations

use crate::errors::{DeckError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::info;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// A font to embed into the cleaned document: a CSS family name, the
/// weight its replacement face declaration should carry, and the path of
/// a text file holding the base64-encoded font data.
#[derive(Debug, Clone, Deserialize)]
pub struct FontBlob {
    pub family: String,
    pub weight: String,
    pub path: String,
}

impl FontBlob {
    pub fn new(family: &str, weight: &str, path: &str) -> Self {
        Self {
            family: family.to_string(),
            weight: weight.to_string(),
            path: path.to_string(),
        }
    }

    /// Read the base64 blob from disk. The file is plain text; surrounding
    /// whitespace is trimmed. The content is checked to actually decode as
    /// base64 so a truncated or binary file fails here rather than as a
    /// broken font inside the browser.
    pub fn content(&self) -> Result<String> {
        info!("Reading font blob: {}", self.path);
        if !Path::new(&self.path).exists() {
            return Err(DeckError::PathNotFoundError(
                Path::new(&self.path).to_path_buf(),
            ));
        }

        let raw = fs::read_to_string(&self.path).map_err(DeckError::FileReadError)?;
        let encoded = raw.trim().to_string();

        if encoded.is_empty() {
            return Err(DeckError::FontError(format!(
                "Font blob is empty: {}",
                self.path
            )));
        }

        STANDARD.decode(&encoded).map_err(|e| {
            DeckError::FontError(format!("Font blob is not valid base64 ({}): {}", self.path, e))
        })?;

        Ok(encoded)
    }

    /// Build the replacement @font-face declaration embedding the blob as an
    /// inline data URL at this font's fixed weight.
    pub fn face_declaration(&self) -> Result<String> {
        let encoded = self.content()?;
        Ok(format!(
            "@font-face {{\n    font-family: '{}';\n    src: url(data:font/truetype;base64,{}) format('truetype');\n    font-weight: {};\n}}\n",
            self.family, encoded, self.weight
        ))
    }
}
