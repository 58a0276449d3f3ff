// ABOUTME: Browser rendering module for the deck2pdf application
// ABOUTME: Prints each slide of a cleaned HTML document to its own PDF page

use crate::errors::{DeckError, Result};
use crate::utils::{ensure_directory_exists, get_absolute_path, validate_directory_writable};
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptionsBuilder, Tab};
use log::{info, warn};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

// PDF paper geometry is specified in inches; Chrome lays out CSS pixels
// at 96 per inch.
const CSS_PIXELS_PER_INCH: f64 = 96.0;

/// Configuration for browser rendering
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub slide_class: String,
    pub prefix: String,
    pub timeout_ms: u64,
    pub browser_path: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            slide_class: "slide".to_string(),
            prefix: "Slide Deck".to_string(),
            timeout_ms: 30000, // 30 seconds
            browser_path: None,
        }
    }
}

/// Validate that the slide-name list covers every slide found in the
/// document. Extra names are allowed and ignored; too few names would leave
/// later slides without a deterministic output path, so that fails before
/// any PDF is produced.
pub fn validate_slide_names(names: &[String], slide_count: usize) -> Result<()> {
    if names.len() < slide_count {
        return Err(DeckError::ValidationError(format!(
            "Found {} slides but only {} slide names were supplied",
            slide_count,
            names.len()
        )));
    }
    Ok(())
}

/// Render each slide of a cleaned HTML document to its own single-page PDF.
///
/// The document is loaded once into a tab to enumerate the slides; each
/// slide is then extracted into a minimal standalone document and printed
/// from a fresh tab that is closed before the next slide begins. A slide
/// whose capture fails is logged and skipped; the remaining slides still
/// render. Returns the paths of the PDFs actually produced, in document
/// order.
pub fn render_slides(
    html_path: &Path,
    output_dir: &Path,
    names: &[String],
    config: &RenderConfig,
) -> Result<Vec<PathBuf>> {
    info!("Rendering slides to PDF from: {:?}", html_path);

    // Validate input file exists
    if !html_path.exists() {
        return Err(DeckError::PathNotFoundError(html_path.to_path_buf()));
    }

    // Ensure output directory exists and is writable before launching anything
    ensure_directory_exists(output_dir)?;
    validate_directory_writable(output_dir)?;

    // Configure browser launch options
    let mut launch_options_builder = LaunchOptionsBuilder::default();

    // Set window size and headless mode
    launch_options_builder.window_size(Some((config.width, config.height)));
    launch_options_builder.headless(true);

    // Use custom browser path if specified
    if let Some(browser_path) = &config.browser_path {
        launch_options_builder.path(Some(browser_path.into()));
    } else if let Ok(path) = env::var("BROWSER_PATH") {
        if !path.is_empty() {
            launch_options_builder.path(Some(path.into()));
        }
    }

    let launch_options = launch_options_builder
        .build()
        .map_err(|e| DeckError::BrowserError {
            message: format!("Failed to build browser options: {:?}", e),
            source: None,
        })?;

    // Launch headless browser
    info!("Launching headless browser");
    let browser = match Browser::new(launch_options) {
        Ok(browser) => browser,
        Err(e) => {
            let message = format!("Failed to launch browser: {}", e);
            warn!("{}", message);
            return Err(DeckError::BrowserError {
                message,
                source: None,
            });
        }
    };

    // Navigate to the cleaned document
    let html_path_abs = get_absolute_path(html_path)?;
    let url = url::Url::from_file_path(&html_path_abs)
        .map_err(|_| {
            DeckError::ValidationError(format!(
                "Failed to convert path to file URL: {:?}",
                html_path_abs
            ))
        })?
        .to_string();

    info!("Opening page at URL: {}", url);

    let tab = browser.new_tab().map_err(|e| DeckError::BrowserError {
        message: format!("Failed to create new tab: {}", e),
        source: None,
    })?;
    tab.set_default_timeout(Duration::from_millis(config.timeout_ms));

    tab.navigate_to(&url).map_err(|e| DeckError::BrowserError {
        message: format!("Failed to navigate to HTML: {}", e),
        source: None,
    })?;

    tab.wait_until_navigated()
        .map_err(|e| DeckError::BrowserError {
            message: format!("Navigation failed: {}", e),
            source: None,
        })?;

    // Block until the embedded fonts have finished decoding, instead of
    // sleeping a fixed duration and hoping.
    wait_for_fonts(&tab)?;

    // Enumerate the slides in document order
    let slide_count = count_slides_in_tab(&tab, &config.slide_class)?;
    info!("Found {} slides", slide_count);

    validate_slide_names(names, slide_count)?;

    let estimated_seconds = (slide_count as f64) * 1.5;
    info!(
        "It will probably take about {:.1} seconds to render the slides. Sit back and relax.",
        estimated_seconds
    );

    let start_time = Instant::now();
    let mut output_files = Vec::with_capacity(slide_count);

    for (i, name) in names.iter().enumerate().take(slide_count) {
        let output_file = output_dir.join(format!("{} - {}.pdf", config.prefix, name));

        match render_one_slide(&browser, &tab, i, &output_file, config) {
            Ok(()) => {
                info!("Created: {:?}", output_file);
                output_files.push(output_file);
            }
            Err(e) => {
                // Log the error but continue with the remaining slides
                warn!("Failed to render slide {}: {}", i + 1, e);
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        "Rendering complete. Produced {} of {} PDFs in {:.2} seconds",
        output_files.len(),
        slide_count,
        elapsed.as_secs_f64()
    );

    Ok(output_files)
}

/// Wait for the page's fonts to finish loading. `document.fonts.ready`
/// resolves once all pending font loads settle; awaiting it is bounded by
/// the tab's default timeout, and expiry surfaces as an error here.
fn wait_for_fonts(tab: &Arc<Tab>) -> Result<()> {
    tab.evaluate(
        "document.fonts.ready.then(function () { return document.fonts.status; })",
        true,
    )
    .map_err(|e| DeckError::BrowserError {
        message: format!("Fonts did not become ready: {}", e),
        source: None,
    })?;
    Ok(())
}

/// Count the slide elements present in the loaded document.
fn count_slides_in_tab(tab: &Arc<Tab>, slide_class: &str) -> Result<usize> {
    let js = format!(
        "document.querySelectorAll('.{}').length",
        slide_class
    );

    let result = tab.evaluate(&js, false).map_err(|e| DeckError::BrowserError {
        message: format!("Failed to count slide elements: {}", e),
        source: None,
    })?;

    result
        .value
        .as_ref()
        .and_then(serde_json::Value::as_u64)
        .map(|n| n as usize)
        .ok_or_else(|| DeckError::BrowserError {
            message: "Slide count script returned no value".to_string(),
            source: None,
        })
}

/// Extract slide `index` into a minimal standalone document and print it to
/// a single PDF page at the configured pixel geometry. The per-slide tab and
/// its backing temp file are released before returning.
fn render_one_slide(
    browser: &Browser,
    deck_tab: &Arc<Tab>,
    index: usize,
    output_file: &Path,
    config: &RenderConfig,
) -> Result<()> {
    let slide_html = extract_slide_html(deck_tab, index, &config.slide_class)?;

    // The fresh tab loads from a temp file so relative resolution and font
    // decoding behave exactly as they do for a navigated document.
    let temp_path =
        env::temp_dir().join(format!("deck2pdf_slide_{}.html", uuid::Uuid::new_v4()));
    fs::write(&temp_path, &slide_html).map_err(DeckError::FileWriteError)?;

    let result = print_slide_pdf(browser, &temp_path, output_file, config);

    if let Err(e) = fs::remove_file(&temp_path) {
        warn!("Failed to remove temp file {:?}: {}", temp_path, e);
    }

    result
}

/// Build the standalone single-slide document in-page: that slide's markup
/// plus the deck's style block, with a transparent zero-margin body reset.
fn extract_slide_html(tab: &Arc<Tab>, index: usize, slide_class: &str) -> Result<String> {
    let js = format!(
        r#"(function () {{
            var slides = document.querySelectorAll('.{class}');
            if ({index} >= slides.length) {{ return null; }}
            var styleEl = document.querySelector('style');
            var styles = styleEl ? styleEl.outerHTML : '';
            return '<!DOCTYPE html><html><head><meta charset="UTF-8">' + styles +
                '<style>body{{margin:0;padding:0;background:transparent;}}.{class}{{margin:0;}}</style>' +
                '</head><body>' + slides[{index}].outerHTML + '</body></html>';
        }})()"#,
        class = slide_class,
        index = index
    );

    let result = tab.evaluate(&js, false).map_err(|e| DeckError::BrowserError {
        message: format!("Failed to extract slide {}: {}", index + 1, e),
        source: None,
    })?;

    result
        .value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .map(|s| s.to_string())
        .ok_or_else(|| DeckError::BrowserError {
            message: format!("Slide {} not found in document", index + 1),
            source: None,
        })
}

/// Open a fresh tab on the standalone document and print it to PDF.
fn print_slide_pdf(
    browser: &Browser,
    slide_path: &Path,
    output_file: &Path,
    config: &RenderConfig,
) -> Result<()> {
    let url = url::Url::from_file_path(slide_path)
        .map_err(|_| {
            DeckError::ValidationError(format!(
                "Failed to convert path to file URL: {:?}",
                slide_path
            ))
        })?
        .to_string();

    let tab = browser.new_tab().map_err(|e| DeckError::BrowserError {
        message: format!("Failed to create slide tab: {}", e),
        source: None,
    })?;
    tab.set_default_timeout(Duration::from_millis(config.timeout_ms));

    let print_result = (|| -> Result<Vec<u8>> {
        tab.navigate_to(&url).map_err(|e| DeckError::BrowserError {
            message: format!("Failed to navigate to slide: {}", e),
            source: None,
        })?;
        tab.wait_until_navigated()
            .map_err(|e| DeckError::BrowserError {
                message: format!("Slide navigation failed: {}", e),
                source: None,
            })?;
        wait_for_fonts(&tab)?;

        let options = PrintToPdfOptions {
            print_background: Some(true),
            paper_width: Some(config.width as f64 / CSS_PIXELS_PER_INCH),
            paper_height: Some(config.height as f64 / CSS_PIXELS_PER_INCH),
            margin_top: Some(0.0),
            margin_bottom: Some(0.0),
            margin_left: Some(0.0),
            margin_right: Some(0.0),
            ..Default::default()
        };

        tab.print_to_pdf(Some(options))
            .map_err(|e| DeckError::PdfError(format!("PDF capture failed: {}", e)))
    })();

    // Close the per-slide tab regardless of the print outcome.
    if let Err(e) = tab.close(true) {
        warn!("Failed to close slide tab: {}", e);
    }

    let pdf_bytes = print_result?;
    fs::write(output_file, &pdf_bytes).map_err(DeckError::FileWriteError)?;

    Ok(())
}
