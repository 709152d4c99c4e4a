//! Receipt line item extraction.
//!
//! Tokens are grouped into rows, each row is screened by the noise filter,
//! split into a price column and a name with an optional quantity, and the
//! resulting candidates are merged by the deduplicator. A flat-text extractor
//! covers OCR output that lacks word geometry.

mod dedup;
mod flat_text;
mod geometric;
mod grouping;
mod parser;
mod price_column;
pub mod rules;
mod scanner;

pub use dedup::{assign_ids, Deduplicator};
pub use flat_text::FlatTextExtractor;
pub use geometric::GeometricExtractor;
pub use grouping::{Line, LineGrouper};
pub use parser::ReceiptParser;
pub use price_column::{PriceColumn, PriceColumnLocator};
pub use rules::LineRejection;
pub use scanner::ReceiptScanner;

use crate::models::receipt::{CandidateItem, ExtractionResult};
use crate::ocr::OcrOutput;

/// Turns OCR output into line items.
///
/// Extraction never fails: lines that do not qualify are dropped and an
/// empty result means nothing on the receipt looked like an item.
pub trait ReceiptExtractor {
    /// Extract items from OCR output.
    fn extract(&self, output: &OcrOutput) -> ExtractionResult;

    /// Extract items from plain text.
    fn extract_from_text(&self, text: &str) -> ExtractionResult {
        self.extract(&OcrOutput::from_text(text))
    }
}

/// Candidates and line counters from one extractor pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionPass {
    pub candidates: Vec<CandidateItem>,
    pub lines_seen: usize,
    pub lines_rejected: usize,
}

impl ExtractionPass {
    fn accept(&mut self, item: CandidateItem) {
        self.lines_seen += 1;
        self.candidates.push(item);
    }

    fn reject(&mut self) {
        self.lines_seen += 1;
        self.lines_rejected += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
