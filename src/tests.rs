use super::*;
use crate::batch::resolve_inputs;
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};

// base64 of "fontdata"
const BLOB_B64: &str = "Zm9udGRhdGE=";

fn create_temp_blob_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes()).expect("Failed to write to temp file");
    file
}

fn sample_fonts() -> (Vec<FontBlob>, Vec<NamedTempFile>) {
    let ogg_blob = create_temp_blob_file(BLOB_B64);
    let satoshi_blob = create_temp_blob_file(BLOB_B64);
    let fonts = vec![
        FontBlob::new("Ogg Bold", "bold", ogg_blob.path().to_str().unwrap()),
        FontBlob::new("Satoshi", "400", satoshi_blob.path().to_str().unwrap()),
    ];
    (fonts, vec![ogg_blob, satoshi_blob])
}

fn sample_deck_html() -> String {
    r#"<!DOCTYPE html>
<html>
<head>
<style>
@font-face {
    font-family: 'Ogg Bold';
    src: url('fonts/ogg-bold.ttf') format('truetype');
    font-weight: bold;
}

@font-face {
    font-family: 'Satoshi';
    src: url('fonts/satoshi.ttf') format('truetype');
    font-weight: 400;
}

/* ============================================
   DECK STYLES
   ============================================ */
body {
    background: #1a1a1a;
}
.slide {
    margin: 20px auto;
    box-shadow: 0 10px 40px rgba(0,0,0,0.5);
}
</style>
</head>
<body>
<div class="slide"><div class="slide-label">Slide 1</div><h1>One</h1></div>
<div class="slide"><div class="slide-label">Slide 2</div><h1>Two</h1></div>
<div class="slide"><h1>Three</h1></div>
</body>
</html>"#
        .to_string()
}

#[test]
fn test_derive_clean_path() {
    let path = Path::new("/decks/Day 2 Revised Slides.html");
    assert_eq!(
        derive_clean_path(path),
        Path::new("/decks/Day 2 Revised Slides - Clean.html")
    );

    let bare = Path::new("/decks/notes");
    assert_eq!(derive_clean_path(bare), Path::new("/decks/notes - Clean"));
}

#[test]
fn test_font_face_declaration() {
    let blob = create_temp_blob_file(BLOB_B64);
    let font = FontBlob::new("Satoshi", "400", blob.path().to_str().unwrap());

    let declaration = font.face_declaration().expect("Failed to build declaration");
    assert!(declaration.contains("font-family: 'Satoshi';"));
    assert!(declaration.contains(&format!(
        "src: url(data:font/truetype;base64,{}) format('truetype');",
        BLOB_B64
    )));
    assert!(declaration.contains("font-weight: 400;"));
}

#[test]
fn test_font_blob_trims_whitespace() {
    let blob = create_temp_blob_file(&format!("  {}\n", BLOB_B64));
    let font = FontBlob::new("Satoshi", "400", blob.path().to_str().unwrap());
    assert_eq!(font.content().unwrap(), BLOB_B64);
}

#[test]
fn test_font_blob_invalid_base64() {
    let blob = create_temp_blob_file("not base64 at all!!");
    let font = FontBlob::new("Satoshi", "400", blob.path().to_str().unwrap());
    assert!(matches!(font.content(), Err(DeckError::FontError(_))));
}

#[test]
fn test_font_blob_missing_file() {
    let font = FontBlob::new("Satoshi", "400", "/nonexistent/satoshi-base64.txt");
    assert!(matches!(
        font.content(),
        Err(DeckError::PathNotFoundError(_))
    ));
}

#[test]
fn test_clean_document_embeds_fonts() {
    let (fonts, _blobs) = sample_fonts();
    let config = CleanConfig::default();

    let cleaned = clean_document(&sample_deck_html(), &fonts, &config)
        .expect("Failed to clean document");

    // Exactly one face declaration per family, embedding the blob
    assert_eq!(cleaned.matches("font-family: 'Ogg Bold'").count(), 1);
    assert_eq!(cleaned.matches("font-family: 'Satoshi'").count(), 1);
    assert_eq!(
        cleaned
            .matches(&format!("data:font/truetype;base64,{}", BLOB_B64))
            .count(),
        2
    );

    // The original file-backed declarations are gone
    assert!(!cleaned.contains("fonts/ogg-bold.ttf"));
    assert!(!cleaned.contains("fonts/satoshi.ttf"));

    // The marker itself survives, with the new declarations before it
    let marker_pos = cleaned.find(&config.style_marker).unwrap();
    let face_pos = cleaned.find("font-family: 'Ogg Bold'").unwrap();
    assert!(face_pos < marker_pos);
}

#[test]
fn test_clean_document_missing_marker_is_error() {
    let (fonts, _blobs) = sample_fonts();
    let config = CleanConfig::default();
    let html = sample_deck_html().replace(&config.style_marker, "/* styles */");

    let result = clean_document(&html, &fonts, &config);
    assert!(matches!(result, Err(DeckError::MarkerNotFound(_))));
}

#[test]
fn test_clean_document_no_fonts_skips_marker() {
    // Without fonts to embed, a missing marker is not an error
    let config = CleanConfig::default();
    let html = sample_deck_html().replace(&config.style_marker, "/* styles */");

    let cleaned = clean_document(&html, &[], &config).expect("Failed to clean document");
    assert!(!cleaned.contains("slide-label"));
}

#[test]
fn test_clean_document_removes_labels_and_shadows() {
    let config = CleanConfig::default();
    let cleaned = clean_document(&sample_deck_html(), &[], &config)
        .expect("Failed to clean document");

    assert!(!cleaned.contains(r#"<div class="slide-label">"#));
    assert!(!cleaned.contains("box-shadow"));

    // The slide content itself is untouched
    assert!(cleaned.contains("<h1>One</h1>"));
    assert!(cleaned.contains("<h1>Three</h1>"));
}

#[test]
fn test_clean_document_print_styles() {
    let config = CleanConfig::default();
    let cleaned = clean_document(&sample_deck_html(), &[], &config)
        .expect("Failed to clean document");

    assert!(!cleaned.contains("margin: 20px auto;"));
    assert!(cleaned.contains("margin: 0;"));
    assert!(!cleaned.contains("background: #1a1a1a;"));
    assert!(cleaned.contains("background: white;"));
}

#[test]
fn test_clean_document_idempotent_for_removals() {
    let config = CleanConfig::default();
    let once = clean_document(&sample_deck_html(), &[], &config)
        .expect("Failed to clean document");
    let twice = clean_document(&once, &[], &config).expect("Failed to re-clean document");

    assert_eq!(once, twice);
}

#[test]
fn test_clean_document_absent_patterns_are_noops() {
    let config = CleanConfig::default();
    let html = "<html><head><style>.slide { color: black; }</style></head>\
                <body><div class=\"slide\"></div></body></html>";

    let cleaned = clean_document(html, &[], &config).expect("Failed to clean document");
    assert_eq!(cleaned, html);
}

#[test]
fn test_clean_file_writes_derived_path() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let source = dir.path().join("deck.html");
    std::fs::write(&source, sample_deck_html()).expect("Failed to write source");

    let config = CleanConfig::default();
    let output = clean_file(&source, &[], &config).expect("Failed to clean file");

    assert_eq!(output, dir.path().join("deck - Clean.html"));
    let written = std::fs::read_to_string(&output).expect("Failed to read output");
    assert!(!written.contains("slide-label"));
}

#[test]
fn test_clean_file_unwritable_output_is_write_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let source = dir.path().join("deck.html");
    std::fs::write(&source, sample_deck_html()).expect("Failed to write source");

    // A directory squatting on the derived path makes the write fail
    std::fs::create_dir(dir.path().join("deck - Clean.html"))
        .expect("Failed to create blocking dir");

    let result = clean_file(&source, &[], &CleanConfig::default());
    assert!(matches!(result, Err(DeckError::FileWriteError(_))));
}

#[test]
fn test_ensure_parent_directory_exists() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let nested = dir.path().join("out").join("decks").join("deck - Clean.html");

    crate::utils::ensure_parent_directory_exists(&nested)
        .expect("Failed to create parent directories");
    assert!(nested.parent().unwrap().is_dir());

    // Already-existing parents are fine
    crate::utils::ensure_parent_directory_exists(&nested)
        .expect("Existing parent directories should be accepted");
}

#[test]
fn test_clean_file_missing_source() {
    let config = CleanConfig::default();
    let result = clean_file(Path::new("/nonexistent/deck.html"), &[], &config);
    assert!(matches!(result, Err(DeckError::PathNotFoundError(_))));
}

#[test]
fn test_count_slide_elements() {
    let html = sample_deck_html();
    // Three slides; the slide-label divs must not be counted
    assert_eq!(count_slide_elements(&html, "slide"), 3);
    assert_eq!(count_slide_elements(&html, "slide-label"), 2);
    assert_eq!(count_slide_elements("", "slide"), 0);
}

#[test]
fn test_count_slide_elements_multiple_classes() {
    let html = r#"<div class="slide dark"></div><section class="deck slide"></section>"#;
    assert_eq!(count_slide_elements(html, "slide"), 2);
}

#[test]
fn test_validate_slide_names() {
    let names = vec!["A".to_string(), "B".to_string(), "C".to_string()];

    assert!(validate_slide_names(&names, 3).is_ok());
    assert!(validate_slide_names(&names, 2).is_ok());
    assert!(matches!(
        validate_slide_names(&names, 4),
        Err(DeckError::ValidationError(_))
    ));
}

#[test]
fn test_resolve_inputs_requires_documents() {
    let config = BatchConfig::default();
    assert!(matches!(
        resolve_inputs(&config),
        Err(DeckError::ValidationError(_))
    ));
}

#[test]
fn test_resolve_inputs_glob_sorted() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    for name in ["b.html", "a.html", "c.html"] {
        std::fs::write(dir.path().join(name), "<html></html>").expect("Failed to write file");
    }

    let config = BatchConfig {
        pattern: Some(format!("{}/*.html", dir.path().to_string_lossy())),
        ..BatchConfig::default()
    };

    let inputs = resolve_inputs(&config).expect("Failed to resolve inputs");
    let names: Vec<_> = inputs
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, ["a.html", "b.html", "c.html"]);
}

#[test]
fn test_convert_batch_missing_file_continues() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let missing = dir.path().join("missing.html");

    let config = BatchConfig {
        inputs: vec![missing.clone()],
        ..BatchConfig::default()
    };

    let outcome = convert_batch(&config).expect("Batch itself should not fail");
    assert!(outcome.converted.is_empty());
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].0, missing);
}

#[test]
fn test_convert_batch_converter_failure_continues() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let first = dir.path().join("first.html");
    let second = dir.path().join("second.html");
    std::fs::write(&first, "<html></html>").expect("Failed to write file");
    std::fs::write(&second, "<html></html>").expect("Failed to write file");

    // `false` always exits non-zero: both conversions fail, the batch still
    // completes and reports both failures.
    let config = BatchConfig {
        converter_bin: "false".to_string(),
        inputs: vec![first.clone(), second.clone()],
        ..BatchConfig::default()
    };

    let outcome = convert_batch(&config).expect("Batch itself should not fail");
    assert!(outcome.converted.is_empty());
    assert_eq!(outcome.failures.len(), 2);
    assert_eq!(outcome.failures[0].0, first);
    assert_eq!(outcome.failures[1].0, second);
}

#[test]
fn test_convert_batch_requires_output_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let input = dir.path().join("deck.html");
    std::fs::write(&input, "<html></html>").expect("Failed to write file");

    // `true` exits 0 without writing anything; the contract requires the
    // output file to exist.
    let config = BatchConfig {
        converter_bin: "true".to_string(),
        inputs: vec![input],
        ..BatchConfig::default()
    };

    let outcome = convert_batch(&config).expect("Batch itself should not fail");
    assert!(outcome.converted.is_empty());
    assert_eq!(outcome.failures.len(), 1);
    assert!(outcome.failures[0].1.contains("produced no output"));
}

#[test]
fn test_config_defaults() {
    let config = Config::new();
    assert_eq!(config.width, 1920);
    assert_eq!(config.height, 1080);
    assert_eq!(config.slide_class, "slide");
    assert_eq!(config.converter_bin, "wkhtmltopdf");
}

#[test]
fn test_config_from_file() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    let blob = create_temp_blob_file(BLOB_B64);
    write!(
        file,
        r#"{{
            "prefix": "Day 2",
            "slide_names": ["Persona", "Context", "Goal"],
            "fonts": [
                {{"family": "Satoshi", "weight": "400", "path": "{}"}}
            ],
            "width": 1280,
            "height": 720
        }}"#,
        blob.path().to_string_lossy()
    )
    .expect("Failed to write config");

    let config = Config::from_file(file.path()).expect("Failed to load config");
    assert_eq!(config.prefix, "Day 2");
    assert_eq!(config.slide_names.len(), 3);
    assert_eq!(config.fonts.len(), 1);
    assert_eq!(config.fonts[0].family, "Satoshi");
    assert_eq!(config.width, 1280);
    // Unspecified fields keep their defaults
    assert_eq!(config.slide_class, "slide");

    config.validate().expect("Config should validate");
}

#[test]
fn test_config_validate_rejects_missing_font() {
    let mut config = Config::new();
    config.fonts = vec![FontBlob::new("Satoshi", "400", "/nonexistent/blob.txt")];
    assert!(matches!(
        config.validate(),
        Err(DeckError::PathNotFoundError(_))
    ));
}

#[test]
fn test_config_validate_rejects_zero_viewport() {
    let mut config = Config::new();
    config.width = 0;
    assert!(matches!(config.validate(), Err(DeckError::ConfigError(_))));
}

#[test]
fn test_render_missing_input() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let result = render_slides(
        Path::new("/nonexistent/deck - Clean.html"),
        dir.path(),
        &[],
        &crate::render::RenderConfig::default(),
    );
    assert!(matches!(result, Err(DeckError::PathNotFoundError(_))));
}
