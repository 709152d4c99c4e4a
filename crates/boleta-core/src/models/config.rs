//! Configuration structures for the receipt pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{BoletaError, Result};

/// Main configuration for the boleta pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoletaConfig {
    /// Token-to-line grouping.
    pub grouping: GroupingConfig,

    /// Line item extraction heuristics.
    pub extraction: ExtractionConfig,

    /// Image preprocessing before OCR.
    pub preprocess: PreprocessConfig,

    /// OCR engine hints.
    pub ocr: OcrConfig,
}

/// Line grouping configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Maximum distance (pixels) between a token's vertical center and the
    /// center recorded for a line for the token to join that line.
    pub line_tolerance_px: f32,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            line_tolerance_px: 12.0,
        }
    }
}

/// Extraction heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Minimum digits for a price (4 suits CLP-style integer amounts).
    pub min_price_digits: usize,

    /// Minimum characters in an item name.
    pub min_name_chars: usize,

    /// Fall back to the rightmost token with enough digits when the trailing
    /// numeric run is not a valid price.
    pub candidate_scan: bool,

    /// Require at least two lettered words or six letters in a name.
    pub require_letter_content: bool,

    /// Reject lines shaped like labeled date/time fields.
    pub reject_date_time_fields: bool,

    /// Retry with the flat-text extractor when the geometric pass finds nothing.
    pub flat_text_fallback: bool,

    /// Largest accepted quantity.
    pub max_quantity: u32,

    /// Receipt boilerplate vocabulary, matched case-insensitively.
    pub stop_terms: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_price_digits: 4,
            min_name_chars: 3,
            candidate_scan: true,
            require_letter_content: false,
            reject_date_time_fields: false,
            flat_text_fallback: true,
            max_quantity: 999,
            stop_terms: default_stop_terms(),
        }
    }
}

impl ExtractionConfig {
    /// Stricter preset for receipts where false positives are costly.
    pub fn strict() -> Self {
        Self::default().with_strict_rules()
    }

    /// Enable the letter-content and date/time rules, keeping other settings.
    pub fn with_strict_rules(mut self) -> Self {
        self.require_letter_content = true;
        self.reject_date_time_fields = true;
        self
    }
}

/// Default stop-term vocabulary (Spanish and English receipt boilerplate).
pub fn default_stop_terms() -> Vec<String> {
    [
        "PRE-CUENTA", "SUBTOTAL", "SUB-TOTAL", "TOTAL", "PROPINA", "SUGERIDA",
        "COMPROBANTE", "VALIDO", "VÁLIDO", "BOLETA", "SOFTWARE", "GARZON", "GARZÓN",
        "MESA", "PERSONAS", "FECHA", "ID", "AQUI", "USAMOS", "FUDO", "#",
        "TIP", "GRATUITY", "SUGGESTED", "TABLE", "DATE",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Image preprocessing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Run the preprocessor before OCR.
    pub enabled: bool,

    /// Scale factor for both dimensions (1.2 - 1.3 helps small receipt fonts).
    pub upscale: f32,

    /// Linear contrast factor applied around mid-gray.
    pub contrast: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            upscale: 1.3,
            contrast: 1.15,
        }
    }
}

/// Settings passed to the OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Recognition languages, Tesseract style (`spa+eng`).
    pub language: String,

    /// Page segmentation mode, engine default when unset.
    pub page_segmentation: Option<u8>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "spa+eng".to_string(),
            page_segmentation: None,
        }
    }
}

impl BoletaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| BoletaError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| BoletaError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        let tolerance = self.grouping.line_tolerance_px;
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(BoletaError::Config(format!(
                "grouping.line_tolerance_px must be positive, got {}",
                tolerance
            )));
        }

        if self.extraction.min_price_digits == 0 {
            return Err(BoletaError::Config(
                "extraction.min_price_digits must be at least 1".to_string(),
            ));
        }

        if self.extraction.max_quantity == 0 {
            return Err(BoletaError::Config(
                "extraction.max_quantity must be at least 1".to_string(),
            ));
        }

        if self.extraction.stop_terms.iter().any(|t| t.trim().is_empty()) {
            return Err(BoletaError::Config(
                "extraction.stop_terms must not contain blank terms".to_string(),
            ));
        }

        let upscale = self.preprocess.upscale;
        if !upscale.is_finite() || upscale <= 0.0 {
            return Err(BoletaError::Config(format!(
                "preprocess.upscale must be positive, got {}",
                upscale
            )));
        }

        let contrast = self.preprocess.contrast;
        if !contrast.is_finite() || contrast < 0.0 {
            return Err(BoletaError::Config(format!(
                "preprocess.contrast must not be negative, got {}",
                contrast
            )));
        }

        if self.ocr.language.trim().is_empty() {
            return Err(BoletaError::Config("ocr.language must not be empty".to_string()));
        }

        Ok(())
    }
}
