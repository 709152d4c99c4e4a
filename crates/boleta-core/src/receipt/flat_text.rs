//! Fallback extraction from the recognized text blob.
//!
//! Used when the OCR engine returned no word geometry, or when the geometric
//! pass found nothing. Each line must look like `[qty] name [qty] amount`.

use tracing::{debug, trace};

use super::rules::patterns::FLAT_LINE;
use super::rules::{
    has_minimum_letter_content, normalize_name, parse_amount, LineRejection, NoiseFilter,
};
use super::ExtractionPass;
use crate::models::config::ExtractionConfig;
use crate::models::receipt::CandidateItem;

#[derive(Debug, Clone)]
pub struct FlatTextExtractor {
    noise: NoiseFilter,
    max_quantity: u32,
    require_letter_content: bool,
}

impl FlatTextExtractor {
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            noise: NoiseFilter::from_config(config),
            max_quantity: config.max_quantity,
            require_letter_content: config.require_letter_content,
        }
    }

    /// Extract candidates from a text blob, one receipt row per line.
    pub fn extract(&self, text: &str) -> ExtractionPass {
        let mut pass = ExtractionPass::default();

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            match self.parse_line(line) {
                Ok(item) => pass.accept(item),
                Err(reason) => {
                    trace!("Rejected text line {:?}: {}", line, reason);
                    pass.reject();
                }
            }
        }

        debug!(
            "Flat-text pass: {} lines, {} candidates",
            pass.lines_seen,
            pass.candidates.len()
        );
        pass
    }

    /// Parse a single text line.
    ///
    /// When both a leading and a trailing quantity are present the leading one
    /// wins and the trailing digits stay part of the name (`2 Pisco 35 9.000`).
    pub fn parse_line(&self, line: &str) -> Result<CandidateItem, LineRejection> {
        let line = line.trim();
        self.noise.check(line)?;

        let caps = FLAT_LINE.captures(line).ok_or(LineRejection::NoMatch)?;
        let leading = caps.get(1).map(|m| m.as_str());
        let trailing = caps.get(3).map(|m| m.as_str());
        let raw_name = caps.get(2).map_or("", |m| m.as_str());
        let amount = caps.get(4).map_or("", |m| m.as_str());

        let (quantity, name) = match (leading, trailing) {
            (Some(q), Some(t)) => (q, normalize_name(&format!("{} {}", raw_name, t))),
            (Some(q), None) | (None, Some(q)) => (q, normalize_name(raw_name)),
            (None, None) => ("1", normalize_name(raw_name)),
        };

        let quantity: u32 = quantity
            .parse()
            .map_err(|_| LineRejection::InvalidQuantity)?;
        if quantity == 0 || quantity > self.max_quantity {
            return Err(LineRejection::InvalidQuantity);
        }
        if name.is_empty() {
            return Err(LineRejection::EmptyName);
        }
        if self.require_letter_content && !has_minimum_letter_content(&name) {
            return Err(LineRejection::InsufficientLetters);
        }

        let price = parse_amount(amount).ok_or(LineRejection::NoPrice)?;
        Ok(CandidateItem::new(name, quantity, price))
    }
}

impl Default for FlatTextExtractor {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_line_shapes() {
        let extractor = FlatTextExtractor::default();

        assert_eq!(extractor.parse_line("Pizza 12.000"), Ok(CandidateItem::new("Pizza", 1, 12000)));
        assert_eq!(
            extractor.parse_line("2 Bebidas 2.500"),
            Ok(CandidateItem::new("Bebidas", 2, 2500))
        );
        assert_eq!(extractor.parse_line("Pan 3 1.200"), Ok(CandidateItem::new("Pan", 3, 1200)));
        assert_eq!(
            extractor.parse_line("Lomo a lo pobre 9 990"),
            Ok(CandidateItem::new("Lomo a lo pobre", 1, 9990))
        );
        assert_eq!(
            extractor.parse_line("Empanada — pino 2,500"),
            Ok(CandidateItem::new("Empanada pino", 1, 2500))
        );
        assert_eq!(
            extractor.parse_line("Cerveza 1·990"),
            Ok(CandidateItem::new("Cerveza", 1, 1990))
        );
        assert_eq!(extractor.parse_line("Jugo 3500"), Ok(CandidateItem::new("Jugo", 1, 3500)));
    }

    #[test]
    fn test_leading_quantity_wins() {
        let extractor = FlatTextExtractor::default();
        assert_eq!(
            extractor.parse_line("2 Pisco 35 9.000"),
            Ok(CandidateItem::new("Pisco 35", 2, 9000))
        );
    }

    #[test]
    fn test_rejections() {
        let extractor = FlatTextExtractor::default();

        assert_eq!(extractor.parse_line("TOTAL 3600"), Err(LineRejection::StopTerm));
        assert_eq!(extractor.parse_line("20:06:30"), Err(LineRejection::NoLetters));
        assert_eq!(extractor.parse_line("Pan 500"), Err(LineRejection::NoMatch));
        assert_eq!(extractor.parse_line("Gracias por su visita"), Err(LineRejection::NoMatch));
        assert_eq!(extractor.parse_line("0 Agua 1.500"), Err(LineRejection::InvalidQuantity));
        assert_eq!(extractor.parse_line("Agua 0000"), Err(LineRejection::NoPrice));
    }

    #[test]
    fn test_strict_letter_content() {
        let extractor = FlatTextExtractor::from_config(&ExtractionConfig::strict());

        assert_eq!(
            extractor.parse_line("Pizza 12.000"),
            Err(LineRejection::InsufficientLetters)
        );
        assert_eq!(
            extractor.parse_line("Fecha 14/08 Caja 1.000"),
            Err(LineRejection::StopTerm)
        );
        assert_eq!(
            extractor.parse_line("Hora 20:06 Caja 1.000"),
            Err(LineRejection::DateTimeField)
        );
        assert_eq!(
            extractor.parse_line("Empanada 2.500"),
            Ok(CandidateItem::new("Empanada", 1, 2500))
        );
    }

    #[test]
    fn test_extract_blob() {
        let pass = FlatTextExtractor::default().extract("Pan 3 1.200\n\n  \nTOTAL 3600\n");

        assert_eq!(pass.candidates, vec![CandidateItem::new("Pan", 3, 1200)]);
        assert_eq!(pass.lines_seen, 2);
        assert_eq!(pass.lines_rejected, 1);
    }
}
