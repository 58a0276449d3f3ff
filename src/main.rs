// ABOUTME: Main entry point for the deck2pdf program.
// ABOUTME: Provides CLI interface and executes commands from the library.

use clap::{Args, Parser, Subcommand};
use deck2pdf::{Config, DeckError};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Preprocess a slide deck: embed fonts and strip screen-only styling
    Clean(CleanArgs),

    /// Render each slide of a deck to its own PDF (cleans first)
    Render(RenderArgs),

    /// Convert whole HTML documents to PDF with an external converter
    Convert(ConvertArgs),
}

#[derive(Args)]
struct CleanArgs {
    /// Path to a JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the source slide deck (overrides the config file)
    #[arg(short, long)]
    input: Option<PathBuf>,
}

#[derive(Args)]
struct RenderArgs {
    /// Path to a JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the source slide deck (overrides the config file)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory for the per-slide PDFs (defaults to the source's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Prefix for the per-slide PDF filenames
    #[arg(long)]
    prefix: Option<String>,

    /// Slide names, in document order
    #[arg(long, value_delimiter = ',')]
    names: Option<Vec<String>>,

    /// Skip preprocessing and render the input document as-is
    #[arg(long)]
    skip_clean: bool,
}

#[derive(Args)]
struct ConvertArgs {
    /// Path to a JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input documents to convert
    inputs: Vec<PathBuf>,

    /// Glob pattern selecting additional input documents
    #[arg(long)]
    pattern: Option<String>,

    /// Converter binary to invoke
    #[arg(long)]
    converter: Option<String>,
}

fn load_config(path: &Option<PathBuf>) -> Result<Config, DeckError> {
    match path {
        Some(path) => Config::from_file(path),
        None => {
            let mut config = Config::new();
            config.apply_env();
            Ok(config)
        }
    }
}

fn run_clean(args: &CleanArgs) -> Result<(), DeckError> {
    let mut config = load_config(&args.config)?;
    if let Some(input) = &args.input {
        config.source_html = Some(input.clone());
    }
    config.validate()?;

    let source = config
        .source_html
        .clone()
        .ok_or_else(|| DeckError::ConfigError("No source document configured".to_string()))?;

    let cleaned = deck2pdf::clean_file(&source, &config.fonts, &config.clean_config())?;
    println!("Cleaned document written: {:?}", cleaned);
    Ok(())
}

fn run_render(args: &RenderArgs) -> Result<(), DeckError> {
    let mut config = load_config(&args.config)?;
    if let Some(input) = &args.input {
        config.source_html = Some(input.clone());
    }
    if let Some(output_dir) = &args.output_dir {
        config.output_dir = Some(output_dir.clone());
    }
    if let Some(prefix) = &args.prefix {
        config.prefix = prefix.clone();
    }
    if let Some(names) = &args.names {
        config.slide_names = names.clone();
    }
    config.validate()?;

    let source = config
        .source_html
        .clone()
        .ok_or_else(|| DeckError::ConfigError("No source document configured".to_string()))?;

    let cleaned = if args.skip_clean {
        source.clone()
    } else {
        deck2pdf::clean_file(&source, &config.fonts, &config.clean_config())?
    };

    // Fail fast on a short name list before a browser is launched.
    let html = fs::read_to_string(&cleaned).map_err(DeckError::FileReadError)?;
    let slide_count = deck2pdf::count_slide_elements(&html, &config.slide_class);
    deck2pdf::validate_slide_names(&config.slide_names, slide_count)?;

    let output_dir = config.resolve_output_dir(&source);
    let outputs = deck2pdf::render_slides(
        &cleaned,
        &output_dir,
        &config.slide_names,
        &config.render_config(),
    )?;

    for output in &outputs {
        println!("Created: {:?}", output);
    }
    println!("Done! {} PDFs written to {:?}", outputs.len(), output_dir);
    Ok(())
}

fn run_convert(args: &ConvertArgs) -> Result<(), DeckError> {
    let mut config = load_config(&args.config)?;
    if !args.inputs.is_empty() {
        config.batch_inputs = args.inputs.clone();
    }
    if let Some(pattern) = &args.pattern {
        config.batch_pattern = Some(pattern.clone());
    }
    if let Some(converter) = &args.converter {
        config.converter_bin = converter.clone();
    }

    let outcome = deck2pdf::convert_batch(&config.batch_config())?;

    for output in &outcome.converted {
        println!("Converted: {:?}", output);
    }
    for (path, message) in &outcome.failures {
        eprintln!("Failed: {:?}: {}", path, message);
    }
    println!(
        "Batch complete: {} converted, {} failed",
        outcome.converted.len(),
        outcome.failures.len()
    );

    // Per-document failures do not fail the batch.
    Ok(())
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Some(Commands::Clean(args)) => run_clean(args),
        Some(Commands::Render(args)) => run_render(args),
        Some(Commands::Convert(args)) => run_convert(args),
        None => {
            println!("No command specified. Use --help for usage information.");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
