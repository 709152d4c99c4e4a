//! Scan command - extract line items from a single receipt image.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use boleta_core::{ProgressTracker, ReceiptScanner};

use super::load_config;
use super::output::{emit, format_result, print_warnings, OutputFormat};
use crate::recognizer::TesseractProcess;

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Receipt image (PNG, JPEG, WebP, TIFF, BMP)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Use the strict extraction rules
    #[arg(long)]
    strict: bool,

    /// Skip image preprocessing
    #[arg(long)]
    no_preprocess: bool,

    /// Tesseract binary (default: found in PATH)
    #[arg(long)]
    tesseract: Option<PathBuf>,
}

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.strict {
        config.extraction = config.extraction.with_strict_rules();
    }
    if args.no_preprocess {
        config.preprocess.enabled = false;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Scanning receipt: {}", args.input.display());

    let recognizer = match &args.tesseract {
        Some(binary) => TesseractProcess::with_binary(binary.clone(), &config.ocr),
        None => TesseractProcess::locate(&config.ocr)?,
    };

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    pb.set_message("Loading image...");
    let image = image::open(&args.input)?;

    pb.set_message("Running OCR...");
    let scanner = ReceiptScanner::from_config(recognizer, &config);
    let result = {
        let mut progress = ProgressTracker::new(|p| pb.set_position(u64::from(p)));
        scanner.scan(&image, &mut progress)?
    };
    pb.finish_and_clear();

    print_warnings(&result);
    let output = format_result(&result, args.format)?;
    emit(&output, args.output.as_deref())?;

    if result.is_empty() {
        eprintln!(
            "{} No items recognized. Try a sharper, well-lit photo.",
            style("ℹ").blue()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}
