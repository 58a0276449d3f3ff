// ABOUTME: Batch conversion module for the deck2pdf application
// ABOUTME: Converts whole HTML documents to PDF via an external converter binary

use crate::errors::{DeckError, Result};
use crate::utils::validate_file_exists;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Configuration for the external-tool batch converter
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Converter binary, resolved on PATH or given as an absolute path.
    pub converter_bin: String,
    /// Explicit input documents.
    pub inputs: Vec<PathBuf>,
    /// Optional glob pattern; matches are appended to `inputs` in sorted order.
    pub pattern: Option<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            converter_bin: "wkhtmltopdf".to_string(),
            inputs: Vec::new(),
            pattern: None,
        }
    }
}

/// Outcome of a batch run. A failed document never aborts the batch, so both
/// lists can be non-empty at once.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub converted: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, String)>,
}

/// Resolve the full input list: explicit paths first, then glob matches.
pub fn resolve_inputs(config: &BatchConfig) -> Result<Vec<PathBuf>> {
    let mut inputs = config.inputs.clone();

    if let Some(pattern) = &config.pattern {
        let mut matched: Vec<PathBuf> = glob::glob(pattern)
            .map_err(|e| DeckError::ConfigError(format!("Invalid glob pattern: {}", e)))?
            .filter_map(std::result::Result::ok)
            .collect();
        matched.sort();
        inputs.extend(matched);
    }

    if inputs.is_empty() {
        return Err(DeckError::ValidationError(
            "Batch conversion has no input documents".to_string(),
        ));
    }

    Ok(inputs)
}

/// Convert each input document to a PDF named after it with the extension
/// swapped. A document that is missing from disk or whose conversion exits
/// non-zero is recorded as a failure and logged; the batch continues with
/// the next document.
pub fn convert_batch(config: &BatchConfig) -> Result<BatchOutcome> {
    let inputs = resolve_inputs(config)?;
    info!("Converting {} documents with {}", inputs.len(), config.converter_bin);

    let mut outcome = BatchOutcome::default();

    for input in &inputs {
        match convert_document(&config.converter_bin, input) {
            Ok(output) => {
                info!("Converted: {:?} -> {:?}", input, output);
                outcome.converted.push(output);
            }
            Err(e) => {
                warn!("Conversion failed for {:?}: {}", input, e);
                outcome.failures.push((input.clone(), e.to_string()));
            }
        }
    }

    info!(
        "Batch complete: {} converted, {} failed",
        outcome.converted.len(),
        outcome.failures.len()
    );

    Ok(outcome)
}

/// Convert one document. The converter contract is "exit code 0 means the
/// output file exists at the given path".
fn convert_document(converter_bin: &str, input: &Path) -> Result<PathBuf> {
    validate_file_exists(input)?;

    let output = input.with_extension("pdf");

    let result = Command::new(converter_bin)
        .args([
            "--orientation",
            "Landscape",
            "--page-size",
            "A4",
            "--no-background",
            "--enable-local-file-access",
        ])
        .arg(input)
        .arg(&output)
        .output()
        .map_err(|e| DeckError::ConvertError {
            path: input.to_path_buf(),
            message: format!("Failed to run {}: {}", converter_bin, e),
        })?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(DeckError::ConvertError {
            path: input.to_path_buf(),
            message: format!(
                "{} exited with {}: {}",
                converter_bin,
                result.status,
                stderr.trim()
            ),
        });
    }

    if !output.exists() {
        return Err(DeckError::ConvertError {
            path: input.to_path_buf(),
            message: format!("{} reported success but produced no output", converter_bin),
        });
    }

    Ok(output)
}
