//! Receipt line item models.

use serde::{Deserialize, Serialize};

/// A parsed receipt line before deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateItem {
    /// Item name as printed (quantity prefix removed).
    pub name: String,

    /// Number of units, always at least 1.
    #[serde(rename = "qty")]
    pub quantity: u32,

    /// Amount in the receipt currency's smallest printed unit, always positive.
    pub price: u64,
}

impl CandidateItem {
    pub fn new(name: impl Into<String>, quantity: u32, price: u64) -> Self {
        Self {
            name: name.into(),
            quantity,
            price,
        }
    }
}

/// An accepted, deduplicated line item handed to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Sequential identifier, unique within one extraction run, starting at 1.
    pub id: u32,

    /// Item name.
    pub name: String,

    /// Number of units.
    #[serde(rename = "qty")]
    pub quantity: u32,

    /// Price as printed on the receipt.
    pub price: u64,
}

impl LineItem {
    /// Quantity times price.
    pub fn line_total(&self) -> u64 {
        u64::from(self.quantity).saturating_mul(self.price)
    }

    /// Drop the identifier, e.g. to feed reviewed items back through dedup.
    pub fn to_candidate(&self) -> CandidateItem {
        CandidateItem::new(self.name.clone(), self.quantity, self.price)
    }
}

/// Which extractor produced the items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Tokens grouped into lines by bounding box.
    Geometric,
    /// Text blob split on line breaks.
    FlatText,
    /// Nothing was extracted.
    #[default]
    None,
}

/// Counters collected during one extraction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Lines considered (after grouping or splitting).
    pub lines_seen: usize,
    /// Lines dropped by the noise filter, price locator or decomposer.
    pub lines_rejected: usize,
    /// Candidate items before deduplication.
    pub candidates: usize,
    /// Candidates folded into an earlier item with the same name and price.
    pub merged: usize,
}

/// Result of one extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Deduplicated items in first-seen order.
    pub items: Vec<LineItem>,
    /// Extractor that produced `items`.
    pub strategy: Strategy,
    /// Run counters.
    pub stats: ExtractionStats,
    /// Notes for the reviewer (fallback used, nothing found, ...).
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    /// Recognition succeeded but no line qualified as an item.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Sum of all line totals, shown to the reviewer next to the printed total.
    pub fn total(&self) -> u64 {
        self.items
            .iter()
            .fold(0u64, |acc, item| acc.saturating_add(item.line_total()))
    }
}
