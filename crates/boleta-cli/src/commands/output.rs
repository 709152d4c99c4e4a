//! Rendering extraction results.

use std::fs;
use std::path::Path;

use boleta_core::{ExtractionResult, Strategy};
use console::style;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output (id,name,qty,price)
    Csv,
    /// Plain text table
    Text,
}

impl OutputFormat {
    /// File extension for written outputs.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["id", "name", "qty", "price"])?;
    for item in &result.items {
        wtr.write_record([
            item.id.to_string(),
            item.name.clone(),
            item.quantity.to_string(),
            item.price.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    if result.is_empty() {
        output.push_str("No line items found.\n");
    } else {
        let width = result
            .items
            .iter()
            .map(|i| i.name.chars().count())
            .max()
            .unwrap_or(0)
            .max(4);

        output.push_str(&format!(
            "{:>3}  {:<width$}  {:>4}  {:>10}\n",
            "#", "Item", "Qty", "Price"
        ));
        for item in &result.items {
            output.push_str(&format!(
                "{:>3}  {:<width$}  {:>4}  {:>10}\n",
                item.id, item.name, item.quantity, item.price
            ));
        }
        output.push('\n');
        output.push_str(&format!("Total: {}\n", result.total()));
    }

    let source = match result.strategy {
        Strategy::Geometric => "word positions",
        Strategy::FlatText => "text fallback",
        Strategy::None => "none",
    };
    output.push_str(&format!(
        "Source: {} ({} lines, {} rejected)\n",
        source, result.stats.lines_seen, result.stats.lines_rejected
    ));

    output
}

/// Write to a file, or print to stdout when no path is given.
pub fn emit(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content)?;
            eprintln!(
                "{} Output written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => println!("{}", content.trim_end()),
    }
    Ok(())
}

/// Print reviewer warnings to stderr.
pub fn print_warnings(result: &ExtractionResult) {
    for warning in &result.warnings {
        eprintln!("{} {}", style("!").yellow(), warning);
    }
}
