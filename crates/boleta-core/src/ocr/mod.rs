//! Interface to the OCR engine and the image preprocessing that feeds it.
//!
//! The OCR engine itself is an external collaborator. It hands back a
//! sequence of positioned [`Token`]s, a recognized text blob, or both,
//! wrapped in an [`OcrOutput`].

mod preprocessing;
mod progress;
mod tsv;

pub use preprocessing::{luminance, stretch_contrast, ImagePreprocessor};
pub use progress::ProgressTracker;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::RecognitionError;
use crate::receipt::LineGrouper;

/// A single recognized word with its axis-aligned pixel bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Recognized text.
    pub text: String,
    /// Left edge.
    pub x0: f32,
    /// Right edge.
    pub x1: f32,
    /// Top edge.
    pub y0: f32,
    /// Bottom edge.
    pub y1: f32,
}

impl Token {
    pub fn new(text: impl Into<String>, x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            text: text.into(),
            x0,
            x1,
            y0,
            y1,
        }
    }

    /// Vertical center of the bounding box.
    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Horizontal center of the bounding box.
    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// What the OCR collaborator produced for one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrOutput {
    /// Word tokens with geometry. Empty when the engine only returned text.
    pub tokens: Vec<Token>,

    /// Full recognized text, lines separated by newlines.
    pub text: String,
}

impl OcrOutput {
    /// Output with a text blob and no geometry.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            tokens: Vec::new(),
            text: text.into(),
        }
    }

    /// Output with tokens only; the text blob is rebuilt from the grouped
    /// lines, one line per row.
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        let text = LineGrouper::new()
            .group(tokens.iter().filter(|t| !t.text.trim().is_empty()))
            .iter()
            .map(|line| line.text())
            .collect::<Vec<_>>()
            .join("\n");
        Self { tokens, text }
    }

    /// Whether any token carries non-blank text.
    pub fn has_geometry(&self) -> bool {
        self.tokens.iter().any(|t| !t.text.trim().is_empty())
    }

    /// True when neither tokens nor text carry anything.
    pub fn is_blank(&self) -> bool {
        !self.has_geometry() && self.text.trim().is_empty()
    }
}

/// An OCR engine that turns an image into tokens and text.
///
/// Implementations report progress through the tracker; the call itself is
/// the only blocking step of a scan.
pub trait Recognizer {
    /// Recognize text in an image.
    fn recognize(
        &self,
        image: &DynamicImage,
        progress: &mut ProgressTracker<'_>,
    ) -> Result<OcrOutput, RecognitionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_geometry() {
        let token = Token::new("Pizza", 10.0, 20.0, 60.0, 40.0);
        assert_eq!(token.center_y(), 30.0);
        assert_eq!(token.center_x(), 35.0);
        assert_eq!(token.width(), 50.0);
        assert_eq!(token.height(), 20.0);
    }

    #[test]
    fn test_from_tokens_builds_text() {
        let output = OcrOutput::from_tokens(vec![
            Token::new("Agua", 0.0, 0.0, 10.0, 10.0),
            Token::new("  ", 12.0, 0.0, 14.0, 10.0),
            Token::new("1.500", 20.0, 0.0, 40.0, 10.0),
            Token::new("Pan", 0.0, 30.0, 10.0, 40.0),
        ]);

        assert_eq!(output.text, "Agua 1.500\nPan");
        assert!(output.has_geometry());
    }

    #[test]
    fn test_blank_output() {
        assert!(OcrOutput::default().is_blank());
        assert!(OcrOutput::from_text("  \n ").is_blank());
        assert!(!OcrOutput::from_text("Pan 1.200").is_blank());
        assert!(!OcrOutput::from_text("Pan 1.200").has_geometry());
    }

    #[test]
    fn test_deserialize_without_text() {
        let output: OcrOutput = serde_json::from_str(
            r#"{"tokens": [{"text": "Pan", "x0": 0, "x1": 10, "y0": 0, "y1": 8}]}"#,
        )
        .unwrap();

        assert_eq!(output.tokens.len(), 1);
        assert!(output.text.is_empty());
    }
}
