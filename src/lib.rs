// ABOUTME: Library module for the deck2pdf program.
// ABOUTME: Contains core functionality for cleaning slide HTML and rendering PDFs.

// Reexport modules
pub mod batch;
pub mod clean;
pub mod config;
pub mod errors;
pub mod fonts;
pub mod render;
pub mod utils;

// Reexport common types and functions
pub use batch::{BatchConfig, BatchOutcome, convert_batch};
pub use clean::{CleanConfig, clean_document, clean_file, count_slide_elements, derive_clean_path};
pub use config::Config;
pub use errors::{DeckError, Result};
pub use fonts::FontBlob;
pub use render::{RenderConfig, render_slides, validate_slide_names};

#[cfg(test)]
mod tests;
