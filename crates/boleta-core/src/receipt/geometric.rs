//! Line item extraction from positioned tokens.

use tracing::{debug, trace};

use super::grouping::{Line, LineGrouper};
use super::price_column::PriceColumnLocator;
use super::rules::{LineRejection, NameDecomposer, NoiseFilter};
use super::ExtractionPass;
use crate::models::config::BoletaConfig;
use crate::models::receipt::CandidateItem;
use crate::ocr::Token;

/// Primary extractor: groups tokens into rows and reads each row as
/// `[qty] name ... price`.
#[derive(Debug, Clone)]
pub struct GeometricExtractor {
    grouper: LineGrouper,
    noise: NoiseFilter,
    locator: PriceColumnLocator,
    decomposer: NameDecomposer,
}

impl GeometricExtractor {
    pub fn from_config(config: &BoletaConfig) -> Self {
        Self {
            grouper: LineGrouper::from_config(&config.grouping),
            noise: NoiseFilter::from_config(&config.extraction),
            locator: PriceColumnLocator::from_config(&config.extraction),
            decomposer: NameDecomposer::from_config(&config.extraction),
        }
    }

    /// Extract candidates from tokens. Blank tokens are ignored.
    pub fn extract(&self, tokens: &[Token]) -> ExtractionPass {
        let lines = self
            .grouper
            .group(tokens.iter().filter(|t| !t.text.trim().is_empty()));

        let mut pass = ExtractionPass::default();
        for line in &lines {
            match self.parse_line(line) {
                Ok(item) => pass.accept(item),
                Err(reason) => {
                    trace!("Rejected line {:?}: {}", line.text(), reason);
                    pass.reject();
                }
            }
        }

        debug!(
            "Geometric pass: {} lines, {} candidates",
            pass.lines_seen,
            pass.candidates.len()
        );
        pass
    }

    /// Parse one grouped line.
    pub fn parse_line(&self, line: &Line<'_>) -> Result<CandidateItem, LineRejection> {
        self.noise.check(&line.text())?;

        let texts = line.texts();
        let column = self.locator.locate(&texts).ok_or(LineRejection::NoPrice)?;
        let (name, quantity) = self.decomposer.decompose_tokens(&texts[..column.boundary])?;

        Ok(CandidateItem::new(name, quantity, column.price))
    }
}

impl Default for GeometricExtractor {
    fn default() -> Self {
        Self::from_config(&BoletaConfig::default())
    }
}
