// ABOUTME: Configuration module for the deck2pdf application
// ABOUTME: Externalizes paths, font specs, and slide names into a validated structure

use crate::batch::BatchConfig;
use crate::clean::CleanConfig;
use crate::errors::{DeckError, Result};
use crate::fonts::FontBlob;
use crate::render::RenderConfig;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Global configuration for the application. Loadable from a JSON file;
/// everything the conversion keys on (paths, font specs, slide names,
/// geometry) lives here instead of being embedded in code.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source slide deck document.
    pub source_html: Option<PathBuf>,
    /// Directory receiving the per-slide PDFs; defaults to the source's
    /// directory when unset.
    pub output_dir: Option<PathBuf>,
    /// Fixed prefix of every per-slide PDF filename.
    pub prefix: String,
    /// Fonts to embed into the cleaned document.
    pub fonts: Vec<FontBlob>,
    /// Human-readable slide names, positionally aligned with the slides.
    pub slide_names: Vec<String>,
    pub slide_class: String,
    pub label_class: String,
    pub style_marker: String,
    pub width: u32,
    pub height: u32,
    pub timeout_ms: u64,
    pub browser_path: Option<String>,
    /// External converter binary for batch conversion.
    pub converter_bin: String,
    /// Batch conversion inputs: explicit paths and/or a glob pattern.
    pub batch_inputs: Vec<PathBuf>,
    pub batch_pattern: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let clean_defaults = CleanConfig::default();
        Self {
            source_html: None,
            output_dir: None,
            prefix: "Slide Deck".to_string(),
            fonts: Vec::new(),
            slide_names: Vec::new(),
            slide_class: clean_defaults.slide_class,
            label_class: clean_defaults.label_class,
            style_marker: clean_defaults.style_marker,
            width: 1920,
            height: 1080,
            timeout_ms: 30000, // 30 seconds
            browser_path: env::var("BROWSER_PATH").ok(),
            converter_bin: "wkhtmltopdf".to_string(),
            batch_inputs: Vec::new(),
            batch_pattern: None,
        }
    }
}

impl Config {
    /// Create a new configuration instance with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a JSON file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(DeckError::FileReadError)?;
        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| DeckError::ConfigError(format!("Invalid config file {:?}: {}", path, e)))?;
        config.apply_env();
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env(&mut self) {
        if let Ok(path) = env::var("BROWSER_PATH") {
            if !path.is_empty() {
                self.browser_path = Some(path);
            }
        }
        if let Some(timeout) = env::var("DEFAULT_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.timeout_ms = timeout;
        }
    }

    /// Fail-fast startup validation: referenced files must exist and the
    /// geometry must be sane before any browser is launched.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(DeckError::ConfigError(
                "Viewport width and height must be non-zero".to_string(),
            ));
        }

        if let Some(source) = &self.source_html {
            if !source.is_file() {
                return Err(DeckError::PathNotFoundError(source.clone()));
            }
        }

        for font in &self.fonts {
            if !Path::new(&font.path).is_file() {
                return Err(DeckError::PathNotFoundError(PathBuf::from(&font.path)));
            }
        }

        Ok(())
    }

    /// Get a preprocessor configuration from this config
    pub fn clean_config(&self) -> CleanConfig {
        CleanConfig {
            slide_class: self.slide_class.clone(),
            label_class: self.label_class.clone(),
            style_marker: self.style_marker.clone(),
            ..CleanConfig::default()
        }
    }

    /// Get a render configuration from this config
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            width: self.width,
            height: self.height,
            slide_class: self.slide_class.clone(),
            prefix: self.prefix.clone(),
            timeout_ms: self.timeout_ms,
            browser_path: self.browser_path.clone(),
        }
    }

    /// Get a batch conversion configuration from this config
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            converter_bin: self.converter_bin.clone(),
            inputs: self.batch_inputs.clone(),
            pattern: self.batch_pattern.clone(),
        }
    }

    /// Directory the per-slide PDFs are written into: the configured output
    /// directory, or the source document's directory.
    pub fn resolve_output_dir(&self, source: &Path) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| source.parent().unwrap_or_else(|| Path::new(".")).to_path_buf())
    }
}
