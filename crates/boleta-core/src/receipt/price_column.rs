//! Locating the price at the right end of a line.

use super::rules::{digit_count, is_amount_like, is_price_token, parse_amount};
use crate::models::config::ExtractionConfig;

/// A validated price and where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceColumn {
    /// Index of the first price token; tokens before it form the name.
    pub boundary: usize,
    /// Parsed amount, always positive.
    pub price: u64,
}

/// Finds the price column of a line.
///
/// First tries the contiguous run of numeric tokens at the end of the line.
/// When that run is missing or too short, optionally falls back to the
/// rightmost token that has enough digits on its own; everything from that
/// token to the end of the line is read as the amount.
#[derive(Debug, Clone)]
pub struct PriceColumnLocator {
    min_digits: usize,
    candidate_scan: bool,
}

impl PriceColumnLocator {
    pub fn new(min_digits: usize) -> Self {
        Self {
            min_digits,
            candidate_scan: true,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.min_price_digits).with_candidate_scan(config.candidate_scan)
    }

    /// Enable the rightmost-candidate fallback.
    pub fn with_candidate_scan(mut self, enabled: bool) -> Self {
        self.candidate_scan = enabled;
        self
    }

    pub fn locate(&self, tokens: &[&str]) -> Option<PriceColumn> {
        self.contiguous_suffix(tokens).or_else(|| {
            if self.candidate_scan {
                self.rightmost_candidate(tokens)
            } else {
                None
            }
        })
    }

    fn contiguous_suffix(&self, tokens: &[&str]) -> Option<PriceColumn> {
        let boundary = tokens
            .iter()
            .rposition(|t| !is_price_token(t))
            .map_or(0, |i| i + 1);
        if boundary == tokens.len() {
            return None;
        }
        self.accept(tokens, boundary)
    }

    fn rightmost_candidate(&self, tokens: &[&str]) -> Option<PriceColumn> {
        let boundary = tokens
            .iter()
            .rposition(|t| digit_count(t) >= self.min_digits)?;
        self.accept(tokens, boundary)
    }

    fn accept(&self, tokens: &[&str], boundary: usize) -> Option<PriceColumn> {
        let amount = tokens[boundary..].concat();
        if !is_amount_like(&amount, self.min_digits) {
            return None;
        }
        parse_amount(&amount).map(|price| PriceColumn { boundary, price })
    }
}

impl Default for PriceColumnLocator {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_contiguous_suffix() {
        let locator = PriceColumnLocator::default();

        assert_eq!(
            locator.locate(&["Pizza", "12.000"]),
            Some(PriceColumn { boundary: 1, price: 12000 })
        );
        assert_eq!(
            locator.locate(&["2", "Bebidas", "$", "2", "500"]),
            Some(PriceColumn { boundary: 2, price: 2500 })
        );
        // A quantity column right before the price is read as part of the amount.
        assert_eq!(
            locator.locate(&["Pan", "3", "1.200"]),
            Some(PriceColumn { boundary: 1, price: 31200 })
        );
    }

    #[test]
    fn test_rightmost_candidate_fallback() {
        let locator = PriceColumnLocator::default();

        // Trailing "c/u" breaks the numeric suffix.
        assert_eq!(
            locator.locate(&["Empanada", "2.500", "c/u"]),
            Some(PriceColumn { boundary: 1, price: 2500 })
        );
        assert_eq!(
            locator.locate(&["Café", "grande", "$2.000", "aprox"]),
            Some(PriceColumn { boundary: 2, price: 2000 })
        );
        // Suffix "500" is too short and no token has four digits on its own.
        assert_eq!(locator.locate(&["Vino", "1.99", "x", "500"]), None);
        // Adjacent numeric tokens join into one suffix.
        assert_eq!(
            locator.locate(&["Vino", "1.99", "500"]),
            Some(PriceColumn { boundary: 1, price: 199500 })
        );

        let suffix_only = PriceColumnLocator::default().with_candidate_scan(false);
        assert_eq!(suffix_only.locate(&["Empanada", "2.500", "c/u"]), None);
    }

    #[test]
    fn test_no_price() {
        let locator = PriceColumnLocator::default();

        assert_eq!(locator.locate(&[]), None);
        assert_eq!(locator.locate(&["Gracias", "por", "su", "visita"]), None);
        assert_eq!(locator.locate(&["Pan", "500"]), None);
        assert_eq!(locator.locate(&["Pan", "0.000"]), None);
    }

    #[test]
    fn test_min_digits_is_configurable() {
        let locator = PriceColumnLocator::new(3);
        assert_eq!(
            locator.locate(&["Pan", "500"]),
            Some(PriceColumn { boundary: 1, price: 500 })
        );
    }
}
