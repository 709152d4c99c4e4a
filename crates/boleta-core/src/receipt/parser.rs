//! Hybrid receipt parser: geometric extraction with a flat-text fallback.

use tracing::{debug, info};

use super::dedup::Deduplicator;
use super::flat_text::FlatTextExtractor;
use super::geometric::GeometricExtractor;
use super::{ExtractionPass, ReceiptExtractor};
use crate::models::config::{BoletaConfig, ExtractionConfig};
use crate::models::receipt::{ExtractionResult, ExtractionStats, Strategy};
use crate::ocr::{OcrOutput, Token};

/// Receipt parser combining both extractors and the deduplicator.
///
/// Holds no state between runs; every call allocates its own lines and
/// candidates, so one parser can serve concurrent scans.
#[derive(Debug, Clone)]
pub struct ReceiptParser {
    geometric: GeometricExtractor,
    flat: FlatTextExtractor,
    dedup: Deduplicator,
    /// Retry with the text blob when the geometric pass finds nothing.
    flat_text_fallback: bool,
}

impl ReceiptParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::from_config(&BoletaConfig::default())
    }

    /// Create a parser from configuration.
    pub fn from_config(config: &BoletaConfig) -> Self {
        Self {
            geometric: GeometricExtractor::from_config(config),
            flat: FlatTextExtractor::from_config(&config.extraction),
            dedup: Deduplicator::new(),
            flat_text_fallback: config.extraction.flat_text_fallback,
        }
    }

    /// Parser using the strict extraction preset.
    pub fn strict() -> Self {
        Self::from_config(&BoletaConfig {
            extraction: ExtractionConfig::strict(),
            ..BoletaConfig::default()
        })
    }

    /// Set the flat-text fallback.
    pub fn with_flat_text_fallback(mut self, enabled: bool) -> Self {
        self.flat_text_fallback = enabled;
        self
    }

    /// Parse OCR output.
    ///
    /// Uses the geometric extractor when tokens are present and the flat-text
    /// extractor otherwise, or when the geometric pass yields no candidate.
    pub fn parse(&self, output: &OcrOutput) -> ExtractionResult {
        let timer = Stopwatch::start();
        let mut warnings = Vec::new();
        let mut stats = ExtractionStats::default();

        info!(
            "Parsing receipt: {} tokens, {} characters of text",
            output.tokens.len(),
            output.text.len()
        );

        let has_text = !output.text.trim().is_empty();
        let (strategy, pass) = if output.has_geometry() {
            let pass = self.geometric.extract(&output.tokens);
            record(&mut stats, &pass);

            if pass.is_empty() && self.flat_text_fallback && has_text {
                debug!("Geometric pass found nothing, retrying with flat text");
                let fallback = self.flat.extract(&output.text);
                record(&mut stats, &fallback);
                if !fallback.is_empty() {
                    warnings.push(
                        "No items found from word positions; used the text fallback".to_string(),
                    );
                }
                (Strategy::FlatText, fallback)
            } else {
                (Strategy::Geometric, pass)
            }
        } else if has_text {
            let pass = self.flat.extract(&output.text);
            record(&mut stats, &pass);
            (Strategy::FlatText, pass)
        } else {
            warnings.push("OCR returned no text".to_string());
            (Strategy::None, ExtractionPass::default())
        };

        stats.candidates = pass.candidates.len();
        let (items, merged) = self.dedup.finalize(pass.candidates);
        stats.merged = merged;

        let strategy = if items.is_empty() {
            if !output.is_blank() {
                warnings.push("No line items found".to_string());
            }
            Strategy::None
        } else {
            strategy
        };

        info!(
            "Extracted {} items ({:?}) from {} lines",
            items.len(),
            strategy,
            stats.lines_seen
        );

        ExtractionResult {
            items,
            strategy,
            stats,
            warnings,
            processing_time_ms: timer.elapsed_ms(),
        }
    }

    /// Parse a text blob with the flat-text extractor.
    pub fn parse_text(&self, text: &str) -> ExtractionResult {
        self.parse(&OcrOutput::from_text(text))
    }

    /// Parse tokens without a text blob; no fallback is possible.
    pub fn parse_tokens(&self, tokens: Vec<Token>) -> ExtractionResult {
        self.parse(&OcrOutput {
            tokens,
            text: String::new(),
        })
    }
}

impl Default for ReceiptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiptExtractor for ReceiptParser {
    fn extract(&self, output: &OcrOutput) -> ExtractionResult {
        self.parse(output)
    }

    fn extract_from_text(&self, text: &str) -> ExtractionResult {
        self.parse_text(text)
    }
}

fn record(stats: &mut ExtractionStats, pass: &ExtractionPass) {
    stats.lines_seen += pass.lines_seen;
    stats.lines_rejected += pass.lines_rejected;
}

/// Wall-clock timer; reads zero where `Instant` is unavailable.
struct Stopwatch {
    #[cfg(not(target_arch = "wasm32"))]
    start: std::time::Instant,
}

impl Stopwatch {
    fn start() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            start: std::time::Instant::now(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    #[cfg(target_arch = "wasm32")]
    fn elapsed_ms(&self) -> u64 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::receipt::LineItem;
    use pretty_assertions::assert_eq;

    fn row(words: &[&str], y: f32) -> Vec<Token> {
        words
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let x = 20.0 + i as f32 * 100.0;
                Token::new(*w, x, y, x + 90.0, y + 20.0)
            })
            .collect()
    }

    fn item(id: u32, name: &str, quantity: u32, price: u64) -> LineItem {
        LineItem {
            id,
            name: name.to_string(),
            quantity,
            price,
        }
    }

    #[test]
    fn test_single_price_token() {
        let result = ReceiptParser::new().parse_tokens(row(&["Pizza", "12.000"], 100.0));

        assert_eq!(result.items, vec![item(1, "Pizza", 1, 12000)]);
        assert_eq!(result.strategy, Strategy::Geometric);
    }

    #[test]
    fn test_leading_quantity() {
        let result = ReceiptParser::new().parse_tokens(row(&["2", "Bebidas", "2.500"], 100.0));
        assert_eq!(result.items, vec![item(1, "Bebidas", 2, 2500)]);
    }

    #[test]
    fn test_subtotal_is_noise() {
        let parser = ReceiptParser::new().with_flat_text_fallback(false);
        let result = parser.parse_tokens(row(&["SUBTOTAL", "14500"], 100.0));

        assert!(result.is_empty());
        assert_eq!(result.stats.lines_rejected, 1);
        assert_eq!(result.strategy, Strategy::None);
    }

    #[test]
    fn test_inflected_totals_are_noise() {
        let parser = ReceiptParser::new();

        let result = parser.parse_text("TOTALES 14.500\nSUBTOTALES 13.050\nPropinas 1.450");
        assert!(result.is_empty());
        assert_eq!(result.stats.lines_rejected, 3);

        let mut tokens = row(&["TOTALES", "14.500"], 100.0);
        tokens.extend(row(&["Pizza", "12.000"], 140.0));
        let result = parser.parse_tokens(tokens);
        assert_eq!(result.items, vec![item(1, "Pizza", 1, 12000)]);
    }

    #[test]
    fn test_duplicate_lines_merge() {
        let mut tokens = row(&["Agua", "1.500"], 100.0);
        tokens.extend(row(&["Agua", "1.500"], 140.0));

        let result = ReceiptParser::new().parse_tokens(tokens);

        assert_eq!(result.items, vec![item(1, "Agua", 2, 1500)]);
        assert_eq!(result.stats.candidates, 2);
        assert_eq!(result.stats.merged, 1);
    }

    #[test]
    fn test_flat_text_blob() {
        let result = ReceiptParser::new().parse_text("Pan 3 1.200\nTOTAL 3600");

        assert_eq!(result.items, vec![item(1, "Pan", 3, 1200)]);
        assert_eq!(result.strategy, Strategy::FlatText);
        assert_eq!(result.stats.lines_rejected, 1);
    }

    #[test]
    fn test_timestamp_without_letters() {
        let result = ReceiptParser::new().parse_tokens(row(&["20:06:30"], 100.0));
        assert!(result.is_empty());

        let result = ReceiptParser::new().parse_text("20:06:30");
        assert!(result.is_empty());
    }

    #[test]
    fn test_full_receipt() {
        let mut tokens = Vec::new();
        tokens.extend(row(&["PRE-CUENTA"], 10.0));
        tokens.extend(row(&["Mesa", "12", "Garzón:", "Ana"], 40.0));
        tokens.extend(row(&["Fecha:", "14/08/25", "20:06:30"], 70.0));
        tokens.extend(row(&["2", "Empanada", "pino", "5.000"], 120.0));
        tokens.extend(row(&["Pisco", "sour", "—", "4.500"], 150.0));
        tokens.extend(row(&["Empanada", "pino", "5.000"], 180.0));
        tokens.extend(row(&["Café", "$", "1", "990"], 210.0));
        tokens.extend(row(&["SUBTOTAL", "15.490"], 260.0));
        tokens.extend(row(&["Propina", "sugerida", "1.549"], 290.0));
        tokens.extend(row(&["TOTAL", "17.039"], 320.0));

        let result = ReceiptParser::new().parse_tokens(tokens);

        assert_eq!(
            result.items,
            vec![
                item(1, "Empanada pino", 3, 5000),
                item(2, "Pisco sour", 1, 4500),
                item(3, "Café", 1, 1990),
            ]
        );
        assert_eq!(result.stats.lines_seen, 10);
        assert_eq!(result.stats.lines_rejected, 6);
        assert!(result.warnings.is_empty());
        assert_eq!(result.total(), 21490);
    }

    #[test]
    fn test_falls_back_to_text() {
        // Word boxes are useless (one token per row, no prices) but the blob parses.
        let output = OcrOutput {
            tokens: row(&["Lomo"], 10.0),
            text: "Lomo a lo pobre 9.990".to_string(),
        };

        let result = ReceiptParser::new().parse(&output);
        assert_eq!(result.items, vec![item(1, "Lomo a lo pobre", 1, 9990)]);
        assert_eq!(result.strategy, Strategy::FlatText);
        assert_eq!(result.warnings.len(), 1);

        let result = ReceiptParser::new().with_flat_text_fallback(false).parse(&output);
        assert!(result.is_empty());
    }

    #[test]
    fn test_blank_output_is_zero_extraction() {
        let result = ReceiptParser::new().parse(&OcrOutput::default());

        assert!(result.is_empty());
        assert_eq!(result.strategy, Strategy::None);
        assert_eq!(result.warnings, vec!["OCR returned no text".to_string()]);
    }

    #[test]
    fn test_emitted_items_are_valid() {
        let blob = "0 Agua 1.500\nAgua 0000\nPan 3 1.200\n2 Bebidas 2.500\n1000 Velas 1.000";
        let result = ReceiptParser::new().parse_text(blob);

        assert!(!result.is_empty());
        for item in &result.items {
            assert!(item.price > 0);
            assert!(item.quantity >= 1);
            assert!(!item.name.is_empty());
        }
    }

    #[test]
    fn test_strict_preset() {
        let text = "Pizza 12.000\nPizza Napolitana 12.000\nHora 20:06 Caja 3 1.000";

        assert_eq!(ReceiptParser::new().parse_text(text).len(), 3);

        let result = ReceiptParser::strict().parse_text(text);
        assert_eq!(result.items, vec![item(1, "Pizza Napolitana", 1, 12000)]);
    }
}
