//! Batch processing command for multiple receipt images.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use boleta_core::{BoletaConfig, ExtractionResult, ProgressTracker, ReceiptScanner};

use super::load_config;
use super::output::{format_result, OutputFormat};
use crate::recognizer::TesseractProcess;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "tiff", "tif", "bmp"];

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching receipt images
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Use the strict extraction rules
    #[arg(long)]
    strict: bool,

    /// Tesseract binary (default: found in PATH)
    #[arg(long)]
    tesseract: Option<PathBuf>,
}

/// Result of scanning a single file.
struct ScanOutcome {
    path: PathBuf,
    result: Option<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.strict {
        config.extraction = config.extraction.with_strict_rules();
    }
    let config = Arc::new(config);

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} receipts to scan",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let recognizer = match &args.tesseract {
        Some(binary) => TesseractProcess::with_binary(binary.clone(), &config.ocr),
        None => TesseractProcess::locate(&config.ocr)?,
    };

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    // Each file waits for a permit, then scans on the blocking pool. Once a
    // scan fails without --continue-on-error, files still waiting are skipped.
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let cancelled = Arc::new(AtomicBool::new(false));
    let mut handles = Vec::with_capacity(files.len());

    for path in files {
        let semaphore = Arc::clone(&semaphore);
        let cancelled = Arc::clone(&cancelled);
        let recognizer = recognizer.clone();
        let config = Arc::clone(&config);
        let pb = overall_pb.clone();

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            if cancelled.load(Ordering::SeqCst) {
                return Ok(None);
            }

            let scanned = tokio::task::spawn_blocking(move || {
                let file_start = Instant::now();
                let result = scan_file(&path, recognizer, &config);
                (path, result, file_start.elapsed().as_millis() as u64)
            })
            .await?;
            pb.inc(1);
            Ok::<_, anyhow::Error>(Some(scanned))
        }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    let mut failure = None;
    for handle in handles {
        let Some((path, result, processing_time_ms)) = handle.await?? else {
            continue;
        };

        match result {
            Ok(result) => outcomes.push(ScanOutcome {
                path,
                result: Some(result),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to scan {}: {}", path.display(), error_msg);
                    outcomes.push(ScanOutcome {
                        path,
                        result: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else if failure.is_none() {
                    error!("Failed to scan {}: {}", path.display(), error_msg);
                    cancelled.store(true, Ordering::SeqCst);
                    failure = Some(error_msg);
                }
            }
        }
    }

    // Every task has finished or been skipped by now.
    if let Some(error_msg) = failure {
        overall_pb.abandon();
        anyhow::bail!("Scanning failed: {}", error_msg);
    }

    overall_pb.finish_with_message("Complete");

    if let Some(output_dir) = &args.output_dir {
        let names = output_names(outcomes.iter().map(|o| o.path.as_path()));
        for (outcome, name) in outcomes.iter().zip(names) {
            if let Some(result) = &outcome.result {
                let output_path =
                    output_dir.join(format!("{}.{}", name, args.format.extension()));

                fs::write(&output_path, format_result(result, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &outcomes)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let successful = outcomes.iter().filter(|o| o.result.is_some()).count();
    let failed: Vec<_> = outcomes.iter().filter(|o| o.error.is_some()).collect();
    let empty = outcomes
        .iter()
        .filter(|o| o.result.as_ref().is_some_and(ExtractionResult::is_empty))
        .count();

    println!();
    println!(
        "{} Scanned {} receipts in {:?}",
        style("✓").green(),
        outcomes.len(),
        start.elapsed()
    );
    println!(
        "   {} successful ({} with no items), {} failed",
        style(successful).green(),
        style(empty).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for outcome in &failed {
            println!(
                "  - {}: {}",
                outcome.path.display(),
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn scan_file(
    path: &Path,
    recognizer: TesseractProcess,
    config: &BoletaConfig,
) -> anyhow::Result<ExtractionResult> {
    let image = image::open(path)?;
    let scanner = ReceiptScanner::from_config(recognizer, config);
    Ok(scanner.scan(&image, &mut ProgressTracker::silent())?)
}

/// Output base names, one per path. Repeated stems get a `-2`, `-3`, ...
/// suffix in input order.
fn output_names<'a>(paths: impl Iterator<Item = &'a Path>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();

    paths
        .map(|path| {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("receipt")
                .to_string();
            let count = seen.entry(stem.to_lowercase()).or_insert(0);
            *count += 1;
            if *count == 1 {
                stem
            } else {
                format!("{}-{}", stem, count)
            }
        })
        .collect()
}

fn write_summary(path: &Path, outcomes: &[ScanOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "items",
        "total",
        "strategy",
        "processing_time_ms",
        "error",
    ])?;

    for outcome in outcomes {
        let filename = outcome.path.display().to_string();
        let filename = filename.as_str();

        if let Some(result) = &outcome.result {
            let strategy = serde_json::to_value(result.strategy)?;
            wtr.write_record([
                filename,
                "success",
                &result.len().to_string(),
                &result.total().to_string(),
                strategy.as_str().unwrap_or(""),
                &outcome.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                &outcome.processing_time_ms.to_string(),
                outcome.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
