//! product-ocr command-line driver

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use product_ocr::batch::{BatchDriver, BatchResult, FsImageSource};
use product_ocr::config::{self, AppConfig};
use product_ocr::consolidate::PipelineMode;
use product_ocr::extract::{load_catalog, FieldExtractor};
use product_ocr::scanner::ProductScanner;
use product_ocr::storage;
use product_ocr::vision::TesseractCli;

/// product-ocr - Extract text and product attributes from package photos
#[derive(Parser, Debug)]
#[command(name = "product-ocr")]
#[command(about = "Consolidates multi-pass OCR of product packages into text and product attributes")]
struct Args {
    /// Image files to process
    #[arg(required_unless_present = "write_config")]
    images: Vec<String>,

    /// Configuration file (defaults to config.toml in the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Catalog file replacing the configured vocabularies
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Catalog files whose entries are appended to the vocabularies
    #[arg(long = "extend-catalog")]
    extend_catalog: Vec<PathBuf>,

    /// Pipeline mode
    #[arg(short, long, value_enum)]
    mode: Option<PipelineMode>,

    /// Number of images processed concurrently
    #[arg(short, long)]
    workers: Option<usize>,

    /// Drop tokens whose confidence is at or below this value
    #[arg(long, conflicts_with = "no_confidence_floor")]
    confidence_floor: Option<i32>,

    /// Keep tokens regardless of confidence
    #[arg(long)]
    no_confidence_floor: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Write the effective configuration to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = build_config(&args)?;

    if let Some(path) = &args.write_config {
        config::save_config(&config, path)
            .with_context(|| format!("Failed to write config to {:?}", path))?;
        println!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    config.validate()?;

    let scanner = build_scanner(&config)?;
    let source = FsImageSource::new();

    info!(
        "Processing {} images ({:?} mode)",
        args.images.len(),
        scanner.mode()
    );
    let results = BatchDriver::new(&source, &scanner)
        .with_workers(config.batch.workers)
        .run(&args.images);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            print_result(result);
        }
    }

    Ok(())
}

/// Load configuration and apply command-line overrides
fn build_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => load_default_config(),
    };

    if let Some(path) = &args.catalog {
        config.catalog = load_catalog(path)?;
        info!("Loaded catalog from {:?}", path);
    }
    for path in &args.extend_catalog {
        config.catalog.merge(load_catalog(path)?);
        info!("Extended catalog from {:?}", path);
    }

    if let Some(mode) = args.mode {
        config.pipeline.mode = mode;
    }
    if let Some(workers) = args.workers {
        config.batch.workers = workers;
    }
    if let Some(floor) = args.confidence_floor {
        config.pipeline.confidence_filter = true;
        config.pipeline.confidence_floor = floor;
    }
    if args.no_confidence_floor {
        config.pipeline.confidence_filter = false;
    }

    Ok(config)
}

/// Load configuration from the user config directory or fall back to defaults
fn load_default_config() -> AppConfig {
    if let Ok(config_path) = storage::default_config_path() {
        if config_path.exists() {
            match config::load_config(&config_path) {
                Ok(config) => {
                    info!("Loaded configuration from {:?}", config_path);
                    return config;
                }
                Err(e) => warn!("Ignoring unreadable configuration: {:#}", e),
            }
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}

/// Assemble the scanner from configuration
fn build_scanner(config: &AppConfig) -> Result<ProductScanner> {
    let engine = TesseractCli::with_binary(&config.ocr.binary, &config.ocr.language);
    if !engine.is_available() {
        warn!(
            "{} is not runnable; every image will report an OCR error",
            config.ocr.binary
        );
    }

    let extractor = FieldExtractor::new(&config.catalog).context("Invalid extraction catalog")?;

    Ok(ProductScanner::new(
        Arc::new(engine),
        config.ocr.variants.clone(),
        config.ocr.engine_configs(config.pipeline.mode),
        config.pipeline.admission_filter(),
        config.consolidate_options(),
        extractor,
    ))
}

/// Print one result in the human-readable layout
fn print_result(result: &BatchResult) {
    println!("\nImage: {}", result.image());
    match result {
        BatchResult::Failure { error, .. } => println!("Error: {}", error),
        BatchResult::Success {
            extracted_text,
            product_info,
            ..
        } => {
            println!("Extracted Text: {}", extracted_text);
            println!("Product Info:");
            for (label, value) in product_info.fields() {
                println!("  {}: {}", label, value);
            }
        }
    }
}
