// ABOUTME: HTML preprocessing module for the deck2pdf application
// ABOUTME: Embeds font data and strips screen-only styling before PDF rendering

use crate::errors::{DeckError, Result};
use crate::fonts::FontBlob;
use crate::utils::{ensure_parent_directory_exists, validate_file_exists};
use log::info;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for the HTML preprocessor. Every literal the substitutions
/// key on lives here rather than in the code.
#[derive(Debug, Clone)]
pub struct CleanConfig {
    /// CSS class identifying one printable slide.
    pub slide_class: String,
    /// Class of the overlay label elements to delete (no nested markup).
    pub label_class: String,
    /// Comment literal in the stylesheet before which the embedded
    /// font-face declarations are inserted.
    pub style_marker: String,
    /// Screen-centering margin declaration and its print replacement.
    pub screen_margin: String,
    pub print_margin: String,
    /// Dark screen background declaration and its print replacement.
    pub screen_background: String,
    pub print_background: String,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            slide_class: "slide".to_string(),
            label_class: "slide-label".to_string(),
            style_marker: "/* ============================================".to_string(),
            screen_margin: "margin: 20px auto;".to_string(),
            print_margin: "margin: 0;".to_string(),
            screen_background: "background: #1a1a1a;".to_string(),
            print_background: "background: white;".to_string(),
        }
    }
}

/// Apply all preprocessing substitutions to an HTML document.
///
/// Font-face handling is strict: the existing declarations for each
/// configured family are deleted and fresh ones embedding the blob data are
/// inserted before the stylesheet marker. A missing marker is an error, since
/// silently writing a document without embedded fonts produces PDFs rendered
/// in fallback fonts. The remaining substitutions are best-effort: a pattern
/// that does not occur is a no-op, which also makes re-cleaning an already
/// cleaned document harmless.
pub fn clean_document(html: &str, fonts: &[FontBlob], config: &CleanConfig) -> Result<String> {
    let mut cleaned = html.to_string();

    // Drop the original face declarations for each configured family.
    for font in fonts {
        let pattern = format!(
            r"@font-face\s*\{{[^}}]*font-family:\s*'{}'[^}}]*\}}",
            regex::escape(&font.family)
        );
        let re = Regex::new(&pattern)?;
        cleaned = re.replace_all(&cleaned, "").to_string();
    }

    // Insert the embedded replacements just before the stylesheet marker.
    if !fonts.is_empty() {
        if !cleaned.contains(&config.style_marker) {
            return Err(DeckError::MarkerNotFound(config.style_marker.clone()));
        }

        let mut new_faces = String::from("\n");
        for font in fonts {
            new_faces.push_str(&font.face_declaration()?);
            new_faces.push('\n');
        }

        let replacement = format!("{}{}", new_faces, config.style_marker);
        cleaned = cleaned.replacen(&config.style_marker, &replacement, 1);
    }

    // Remove overlay labels. The labels contain text only, no nested markup.
    let label_re = Regex::new(&format!(
        r#"<div class="{}">[^<]*</div>"#,
        regex::escape(&config.label_class)
    ))?;
    cleaned = label_re.replace_all(&cleaned, "").to_string();

    // Remove all box-shadows.
    let shadow_re = Regex::new(r"box-shadow:\s*[^;]+;")?;
    cleaned = shadow_re.replace_all(&cleaned, "").to_string();

    // Zero the slide margin and lighten the page background for print.
    cleaned = cleaned.replace(&config.screen_margin, &config.print_margin);
    cleaned = cleaned.replace(&config.screen_background, &config.print_background);

    Ok(cleaned)
}

/// Derive the cleaned document's path from the source path: the suffix
/// `" - Clean"` is inserted before the extension.
pub fn derive_clean_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let file_name = match source.extension() {
        Some(ext) => format!("{} - Clean.{}", stem, ext.to_string_lossy()),
        None => format!("{} - Clean", stem),
    };

    source.with_file_name(file_name)
}

/// Count the slide elements in a document by occurrences of the slide class.
/// Used to validate the slide-name list before a browser is ever launched.
pub fn count_slide_elements(html: &str, slide_class: &str) -> usize {
    // Matches the class attribute token exactly, so e.g. a "slide-label"
    // class does not count as a "slide".
    let pattern = format!(
        r#"<[a-zA-Z][^>]*class="(?:[^"]*\s)?{}(?:\s[^"]*)?""#,
        regex::escape(slide_class)
    );
    match Regex::new(&pattern) {
        Ok(re) => re.find_iter(html).count(),
        Err(_) => 0,
    }
}

/// Run the preprocessor over a source file and write the cleaned document
/// next to it. Returns the cleaned document's path.
pub fn clean_file(source: &Path, fonts: &[FontBlob], config: &CleanConfig) -> Result<PathBuf> {
    info!("Preprocessing slide document: {:?}", source);
    validate_file_exists(source)?;

    let html = fs::read_to_string(source).map_err(DeckError::FileReadError)?;
    let cleaned = clean_document(&html, fonts, config)?;

    let output_path = derive_clean_path(source);
    ensure_parent_directory_exists(&output_path)?;
    fs::write(&output_path, &cleaned).map_err(DeckError::FileWriteError)?;

    info!("Wrote cleaned document: {:?}", output_path);
    Ok(output_path)
}
