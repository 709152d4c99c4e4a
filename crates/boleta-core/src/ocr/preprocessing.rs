//! Image preprocessing for OCR.
//!
//! Small receipt fonts recognize better after a slight upscale, a grayscale
//! conversion and a linear contrast stretch. The transform is deterministic
//! and does not branch on image content.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
use tracing::debug;

use crate::error::PreprocessError;
use crate::models::config::PreprocessConfig;

/// ITU-R BT.709 luma weights.
const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;

const MID_GRAY: f32 = 128.0;

/// Image preprocessor for the OCR pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePreprocessor {
    /// Scale factor for both dimensions.
    scale: f32,
    /// Contrast factor around mid-gray.
    contrast: f32,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with default settings.
    pub fn new() -> Self {
        Self::from_config(&PreprocessConfig::default())
    }

    /// Create a preprocessor from configuration.
    pub fn from_config(config: &PreprocessConfig) -> Self {
        Self {
            scale: config.upscale,
            contrast: config.contrast,
        }
    }

    /// Set the scale factor.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Set the contrast factor.
    pub fn with_contrast(mut self, contrast: f32) -> Self {
        self.contrast = contrast;
        self
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn contrast(&self) -> f32 {
        self.contrast
    }

    /// Output dimensions for an input of the given size.
    pub fn target_dimensions(&self, width: u32, height: u32) -> Result<(u32, u32), PreprocessError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(PreprocessError::InvalidScale(self.scale));
        }
        if width == 0 || height == 0 {
            return Err(PreprocessError::EmptyImage { width, height });
        }

        let new_width = (width as f32 * self.scale).round() as u32;
        let new_height = (height as f32 * self.scale).round() as u32;

        Ok((new_width.max(1), new_height.max(1)))
    }

    /// Upscale, convert to grayscale and stretch contrast.
    pub fn process(&self, image: &DynamicImage) -> Result<RgbaImage, PreprocessError> {
        let (width, height) = image.dimensions();
        debug!("Preprocessing image: {}x{}", width, height);

        self.process_rgba(&image.to_rgba8())
    }

    /// Same as [`process`](Self::process) for an RGBA buffer.
    pub fn process_rgba(&self, image: &RgbaImage) -> Result<RgbaImage, PreprocessError> {
        let (width, height) = image.dimensions();
        let (new_width, new_height) = self.target_dimensions(width, height)?;

        let mut scaled = if (new_width, new_height) == (width, height) {
            image.clone()
        } else {
            imageops::resize(image, new_width, new_height, FilterType::Triangle)
        };

        for pixel in scaled.pixels_mut() {
            let Rgba([r, g, b, a]) = *pixel;
            let v = stretch_contrast(luminance(r, g, b), self.contrast);
            *pixel = Rgba([v, v, v, a]);
        }

        debug!("Preprocessed image: {}x{}", new_width, new_height);
        Ok(scaled)
    }

    /// Process and encode as PNG.
    pub fn process_to_png(&self, image: &DynamicImage) -> Result<Vec<u8>, PreprocessError> {
        let processed = self.process(image)?;
        encode_png(&processed)
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// BT.709 luminance of an RGB pixel.
pub fn luminance(r: u8, g: u8, b: u8) -> f32 {
    LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32
}

/// `(v - 128) * k + 128`, clamped and rounded to a channel value.
pub fn stretch_contrast(value: f32, k: f32) -> u8 {
    ((value - MID_GRAY) * k + MID_GRAY).clamp(0.0, 255.0).round() as u8
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buffer.into_inner())
}
