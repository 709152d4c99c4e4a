//! Parse command - extract line items from saved OCR output.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Deserialize;
use tracing::info;

use boleta_core::{OcrOutput, ReceiptParser, Token};

use super::load_config;
use super::output::{emit, format_result, print_warnings, OutputFormat};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// OCR dump: Tesseract TSV (.tsv), tokens (.json) or plain text
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

    /// Ignore word positions and parse the text only
    #[arg(long)]
    text_only: bool,
}

/// JSON dumps: a bare token array or a full `{tokens, text}` object.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonDump {
    Tokens(Vec<Token>),
    Output(OcrOutput),
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if args.strict {
        config.extraction = config.extraction.with_strict_rules();
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let mut ocr = read_dump(&args.input)?;
    if args.text_only {
        ocr.tokens.clear();
    }
    info!(
        "Loaded {} tokens and {} characters of text from {}",
        ocr.tokens.len(),
        ocr.text.len(),
        args.input.display()
    );

    let result = ReceiptParser::from_config(&config).parse(&ocr);

    print_warnings(&result);
    let output = format_result(&result, args.format)?;
    emit(&output, args.output.as_deref())
}

fn read_dump(path: &Path) -> anyhow::Result<OcrOutput> {
    let content = fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let ocr = match extension.as_str() {
        "tsv" => OcrOutput::from_tesseract_tsv(&content)?,
        "json" => match serde_json::from_str(&content) {
            Ok(JsonDump::Tokens(tokens)) => OcrOutput::from_tokens(tokens),
            Ok(JsonDump::Output(output)) if output.text.trim().is_empty() => {
                OcrOutput::from_tokens(output.tokens)
            }
            Ok(JsonDump::Output(output)) => output,
            Err(e) => anyhow::bail!("Invalid token JSON in {}: {}", path.display(), e),
        },
        _ => OcrOutput::from_text(content),
    };
    Ok(ocr)
}
