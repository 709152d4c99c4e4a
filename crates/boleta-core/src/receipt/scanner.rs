//! End-to-end scan: preprocess, recognize, extract.

use std::borrow::Cow;

use image::DynamicImage;
use tracing::{debug, info};

use super::{ReceiptExtractor, ReceiptParser};
use crate::error::Result;
use crate::models::config::BoletaConfig;
use crate::models::receipt::ExtractionResult;
use crate::ocr::{ImagePreprocessor, ProgressTracker, Recognizer};

/// Runs one receipt image through the whole pipeline.
///
/// Recognition is the only fallible step. When it fails the error is
/// returned as is and nothing is extracted.
pub struct ReceiptScanner<R, E = ReceiptParser> {
    recognizer: R,
    extractor: E,
    preprocessor: Option<ImagePreprocessor>,
}

impl<R: Recognizer> ReceiptScanner<R> {
    /// Create a scanner with the default parser and preprocessing.
    pub fn new(recognizer: R) -> Self {
        Self::from_config(recognizer, &BoletaConfig::default())
    }

    /// Create a scanner from configuration.
    pub fn from_config(recognizer: R, config: &BoletaConfig) -> Self {
        let preprocessor = config
            .preprocess
            .enabled
            .then(|| ImagePreprocessor::from_config(&config.preprocess));

        Self {
            recognizer,
            extractor: ReceiptParser::from_config(config),
            preprocessor,
        }
    }
}

impl<R: Recognizer, E: ReceiptExtractor> ReceiptScanner<R, E> {
    /// Replace the extractor.
    pub fn with_extractor<E2: ReceiptExtractor>(self, extractor: E2) -> ReceiptScanner<R, E2> {
        ReceiptScanner {
            recognizer: self.recognizer,
            extractor,
            preprocessor: self.preprocessor,
        }
    }

    /// Set or disable preprocessing.
    pub fn with_preprocessor(mut self, preprocessor: Option<ImagePreprocessor>) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    /// Scan a receipt image.
    pub fn scan(
        &self,
        image: &DynamicImage,
        progress: &mut ProgressTracker<'_>,
    ) -> Result<ExtractionResult> {
        let prepared = match &self.preprocessor {
            Some(preprocessor) => {
                Cow::Owned(DynamicImage::ImageRgba8(preprocessor.process(image)?))
            }
            None => Cow::Borrowed(image),
        };

        debug!("Running recognition on {}x{} image", prepared.width(), prepared.height());
        let output = self.recognizer.recognize(&prepared, progress)?;
        progress.finish();

        let result = self.extractor.extract(&output);
        info!("Scan finished with {} items", result.len());
        Ok(result)
    }
}
