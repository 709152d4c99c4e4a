//! Tesseract command-line engine as a [`Recognizer`].

use std::path::PathBuf;
use std::process::Command;

use boleta_core::models::config::OcrConfig;
use boleta_core::{OcrOutput, ProgressTracker, RecognitionError, Recognizer};
use image::{DynamicImage, ImageFormat};
use tracing::debug;

/// Runs the `tesseract` binary and reads its TSV output.
#[derive(Debug, Clone)]
pub struct TesseractProcess {
    binary: PathBuf,
    language: String,
    page_segmentation: Option<u8>,
}

impl TesseractProcess {
    /// Find `tesseract` in `PATH`.
    pub fn locate(config: &OcrConfig) -> Result<Self, RecognitionError> {
        let binary = which::which("tesseract").map_err(|e| {
            RecognitionError::EngineUnavailable(format!("tesseract not found in PATH: {}", e))
        })?;
        Ok(Self::with_binary(binary, config))
    }

    /// Use a specific binary.
    pub fn with_binary(binary: PathBuf, config: &OcrConfig) -> Self {
        Self {
            binary,
            language: config.language.clone(),
            page_segmentation: config.page_segmentation,
        }
    }

    fn command(&self, input: &std::path::Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(input).arg("stdout").arg("-l").arg(&self.language);
        if let Some(psm) = self.page_segmentation {
            cmd.arg("--psm").arg(psm.to_string());
        }
        cmd.arg("tsv");
        cmd
    }
}

impl Recognizer for TesseractProcess {
    fn recognize(
        &self,
        image: &DynamicImage,
        progress: &mut ProgressTracker<'_>,
    ) -> Result<OcrOutput, RecognitionError> {
        let dir = tempfile::tempdir()
            .map_err(|e| RecognitionError::Engine(format!("cannot create temp dir: {}", e)))?;
        let input = dir.path().join("receipt.png");

        image
            .save_with_format(&input, ImageFormat::Png)
            .map_err(|e| RecognitionError::Unreadable(e.to_string()))?;
        progress.report(10);

        debug!("Running {} on {}", self.binary.display(), input.display());
        let output = self.command(&input).output().map_err(|e| {
            RecognitionError::EngineUnavailable(format!("{}: {}", self.binary.display(), e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecognitionError::Engine(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        progress.report(90);

        let tsv = String::from_utf8_lossy(&output.stdout);
        OcrOutput::from_tesseract_tsv(&tsv).map_err(|e| RecognitionError::Engine(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_arguments() {
        let config = OcrConfig {
            language: "spa".to_string(),
            page_segmentation: Some(6),
        };
        let engine = TesseractProcess::with_binary(PathBuf::from("/usr/bin/tesseract"), &config);
        let cmd = engine.command(std::path::Path::new("/tmp/in.png"));

        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, ["/tmp/in.png", "stdout", "-l", "spa", "--psm", "6", "tsv"]);
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let engine = TesseractProcess::with_binary(
            PathBuf::from("/nonexistent/tesseract"),
            &OcrConfig::default(),
        );
        let image = DynamicImage::new_rgba8(4, 4);

        let err = engine
            .recognize(&image, &mut ProgressTracker::silent())
            .unwrap_err();
        assert!(matches!(err, RecognitionError::EngineUnavailable(_)));
    }
}
