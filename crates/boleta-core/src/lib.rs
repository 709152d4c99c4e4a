//! Core library for receipt OCR processing.
//!
//! This crate provides:
//! - Image preprocessing ahead of the OCR engine (upscale, grayscale, contrast)
//! - The OCR collaborator interface (tokens, text blob, progress)
//! - Receipt line item extraction from positioned tokens or flat text
//! - Configuration and error types shared by the CLI and WASM front-ends

pub mod error;
pub mod models;
pub mod ocr;
pub mod receipt;

pub use error::{BoletaError, PreprocessError, RecognitionError, Result};
pub use models::config::BoletaConfig;
pub use models::receipt::{CandidateItem, ExtractionResult, ExtractionStats, LineItem, Strategy};
pub use ocr::{ImagePreprocessor, OcrOutput, ProgressTracker, Recognizer, Token};
pub use receipt::{ReceiptExtractor, ReceiptParser, ReceiptScanner};
