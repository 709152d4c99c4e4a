//! Error types for the boleta-core library.

use thiserror::Error;

/// Main error type for the boleta library.
#[derive(Error, Debug)]
pub enum BoletaError {
    /// The OCR collaborator could not process the image.
    #[error("recognition failed: {0}")]
    Recognition(#[from] RecognitionError),

    /// Image preprocessing error.
    #[error("preprocessing error: {0}")]
    Preprocessing(#[from] PreprocessError),

    /// Image decoding/encoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed OCR dump (TSV or JSON tokens).
    #[error("invalid token input: {0}")]
    TokenInput(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Failures of the OCR collaborator.
///
/// A run that recognizes text but finds no items is not a failure; it yields
/// an empty [`ExtractionResult`](crate::ExtractionResult).
#[derive(Error, Debug)]
pub enum RecognitionError {
    /// The image is corrupt or unreadable.
    #[error("unreadable image: {0}")]
    Unreadable(String),

    /// The engine ran but reported an error.
    #[error("OCR engine error: {0}")]
    Engine(String),

    /// The engine is not installed or could not be started.
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The caller abandoned the recognition request.
    #[error("recognition cancelled")]
    Cancelled,
}

/// Errors related to image preprocessing.
#[derive(Error, Debug)]
pub enum PreprocessError {
    /// The image has a zero dimension.
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    /// Scale factor is not a positive finite number.
    #[error("invalid scale factor: {0}")]
    InvalidScale(f32),

    /// Encoding the processed image failed.
    #[error("failed to encode image: {0}")]
    Encode(String),
}

/// Result type for the boleta library.
pub type Result<T> = std::result::Result<T, BoletaError>;
