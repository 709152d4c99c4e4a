//! Preprocess command - write the image the OCR engine would see.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use boleta_core::ImagePreprocessor;

use super::load_config;

/// Arguments for the preprocess command.
#[derive(Args)]
pub struct PreprocessArgs {
    /// Receipt image
    #[arg(required = true)]
    input: PathBuf,

    /// Output PNG file
    #[arg(short, long, required = true)]
    output: PathBuf,

    /// Scale factor (overrides config)
    #[arg(long)]
    scale: Option<f32>,

    /// Contrast factor (overrides config)
    #[arg(long)]
    contrast: Option<f32>,
}

pub async fn run(args: PreprocessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let mut preprocessor = ImagePreprocessor::from_config(&config.preprocess);
    if let Some(scale) = args.scale {
        preprocessor = preprocessor.with_scale(scale);
    }
    if let Some(contrast) = args.contrast {
        preprocessor = preprocessor.with_contrast(contrast);
    }

    let image = image::open(&args.input)?;
    info!(
        "Preprocessing {} (scale {}, contrast {})",
        args.input.display(),
        preprocessor.scale(),
        preprocessor.contrast()
    );

    let png = preprocessor.process_to_png(&image)?;
    fs::write(&args.output, png)?;

    println!(
        "{} Preprocessed image written to {}",
        style("✓").green(),
        args.output.display()
    );

    Ok(())
}
