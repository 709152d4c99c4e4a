//! WASM bindings for receipt line item extraction.
//!
//! The browser runs the OCR engine (tesseract.js) and hands its words and
//! text to these functions. Results come back as plain JS objects.

use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::Clamped;
use web_sys::ImageData;

use boleta_core::models::config::ExtractionConfig;
use boleta_core::{BoletaConfig, ExtractionResult, ImagePreprocessor, OcrOutput, ReceiptParser, Token};
use image::RgbaImage;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// A tesseract.js word: `{ text, bbox: { x0, y0, x1, y1 } }`.
#[derive(Debug, Deserialize)]
struct TesseractWord {
    text: String,
    bbox: WordBox,
}

#[derive(Debug, Deserialize)]
struct WordBox {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
}

impl From<TesseractWord> for Token {
    fn from(word: TesseractWord) -> Self {
        Token::new(word.text, word.bbox.x0, word.bbox.y0, word.bbox.x1, word.bbox.y1)
    }
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Build OCR output from tesseract.js `data.words` (may be `null`) and `data.text`.
fn ocr_output(words: JsValue, text: &str) -> Result<OcrOutput, JsValue> {
    let words: Vec<TesseractWord> = if words.is_null() || words.is_undefined() {
        Vec::new()
    } else {
        serde_wasm_bindgen::from_value(words).map_err(to_js_error)?
    };

    Ok(OcrOutput {
        tokens: words.into_iter().map(Token::from).collect(),
        text: text.to_string(),
    })
}

fn run(parser: &ReceiptParser, output: &OcrOutput) -> Result<JsValue, JsValue> {
    let start = js_sys::Date::now();
    let mut result: ExtractionResult = parser.parse(output);
    result.processing_time_ms = (js_sys::Date::now() - start).max(0.0) as u64;

    serde_wasm_bindgen::to_value(&result).map_err(to_js_error)
}

/// Extract line items from tesseract.js words and text.
///
/// Words drive the geometric extractor; the text is used when words are
/// missing or yield nothing.
#[wasm_bindgen]
pub fn extract_items(words: JsValue, text: &str) -> Result<JsValue, JsValue> {
    run(&ReceiptParser::new(), &ocr_output(words, text)?)
}

/// Extract line items from recognized text only.
#[wasm_bindgen]
pub fn extract_items_from_text(text: &str) -> Result<JsValue, JsValue> {
    run(&ReceiptParser::new(), &OcrOutput::from_text(text))
}

/// Upscale, grayscale and contrast-stretch canvas `ImageData`.
#[wasm_bindgen]
pub fn preprocess_image_data(
    image: &ImageData,
    scale: f32,
    contrast: f32,
) -> Result<ImageData, JsValue> {
    let processed = preprocess_rgba(image.data().0, image.width(), image.height(), scale, contrast)?;
    ImageData::new_with_u8_clamped_array_and_sh(
        Clamped(processed.data.as_slice()),
        processed.width,
        processed.height,
    )
}

/// Preprocess a raw RGBA buffer.
#[wasm_bindgen]
pub fn preprocess_rgba(
    data: Vec<u8>,
    width: u32,
    height: u32,
    scale: f32,
    contrast: f32,
) -> Result<PreprocessedImage, JsValue> {
    let image = RgbaImage::from_raw(width, height, data).ok_or_else(|| {
        JsValue::from_str(&format!("buffer does not hold a {}x{} RGBA image", width, height))
    })?;

    let processed = ImagePreprocessor::new()
        .with_scale(scale)
        .with_contrast(contrast)
        .process_rgba(&image)
        .map_err(to_js_error)?;

    Ok(PreprocessedImage {
        width: processed.width(),
        height: processed.height(),
        data: processed.into_raw(),
    })
}

/// RGBA pixels produced by the preprocessor.
#[wasm_bindgen]
pub struct PreprocessedImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

#[wasm_bindgen]
impl PreprocessedImage {
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel data, four bytes per pixel.
    #[wasm_bindgen(getter)]
    pub fn data(&self) -> Vec<u8> {
        self.data.clone()
    }
}

/// Receipt extractor class for browser use.
#[wasm_bindgen]
pub struct ReceiptExtractor {
    config: BoletaConfig,
    parser: ReceiptParser,
}

#[wasm_bindgen]
impl ReceiptExtractor {
    /// Create a new receipt extractor with default settings.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        let config = BoletaConfig::default();
        Self {
            parser: ReceiptParser::from_config(&config),
            config,
        }
    }

    /// Toggle the strict rules (letter content, date/time lines).
    #[wasm_bindgen]
    pub fn set_strict(&mut self, strict: bool) {
        let stop_terms = std::mem::take(&mut self.config.extraction.stop_terms);
        let mut extraction = if strict {
            ExtractionConfig::strict()
        } else {
            ExtractionConfig::default()
        };
        extraction.stop_terms = stop_terms;
        self.config.extraction = extraction;
        self.rebuild();
    }

    /// Set the vertical line grouping tolerance in pixels.
    #[wasm_bindgen]
    pub fn set_line_tolerance(&mut self, pixels: f32) -> Result<(), JsValue> {
        self.config.grouping.line_tolerance_px = pixels;
        self.apply()
    }

    /// Set the minimum number of digits in a price.
    #[wasm_bindgen]
    pub fn set_min_price_digits(&mut self, digits: usize) -> Result<(), JsValue> {
        self.config.extraction.min_price_digits = digits;
        self.apply()
    }

    /// Replace the stop-term vocabulary.
    #[wasm_bindgen]
    pub fn set_stop_terms(&mut self, terms: Vec<String>) -> Result<(), JsValue> {
        self.config.extraction.stop_terms = terms;
        self.apply()
    }

    /// Extract items from tesseract.js words and text.
    #[wasm_bindgen]
    pub fn extract(&self, words: JsValue, text: &str) -> Result<JsValue, JsValue> {
        run(&self.parser, &ocr_output(words, text)?)
    }

    /// Extract items from text only.
    #[wasm_bindgen]
    pub fn extract_text(&self, text: &str) -> Result<JsValue, JsValue> {
        run(&self.parser, &OcrOutput::from_text(text))
    }

    /// Current configuration as a JS object.
    #[wasm_bindgen]
    pub fn config(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.config).map_err(to_js_error)
    }

    fn apply(&mut self) -> Result<(), JsValue> {
        self.config.validate().map_err(to_js_error)?;
        self.rebuild();
        Ok(())
    }

    fn rebuild(&mut self) {
        self.parser = ReceiptParser::from_config(&self.config);
    }
}

impl Default for ReceiptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn words_json() -> JsValue {
        let words = js_sys::JSON::parse(
            r#"[
                {"text": "Pizza", "bbox": {"x0": 10, "y0": 10, "x1": 80, "y1": 30}, "confidence": 91},
                {"text": "12.000", "bbox": {"x0": 300, "y0": 11, "x1": 380, "y1": 31}, "confidence": 88},
                {"text": "SUBTOTAL", "bbox": {"x0": 10, "y0": 60, "x1": 120, "y1": 80}, "confidence": 90},
                {"text": "12.000", "bbox": {"x0": 300, "y0": 61, "x1": 380, "y1": 81}, "confidence": 90}
            ]"#,
        );
        words.unwrap()
    }

    #[wasm_bindgen_test]
    fn test_words_become_tokens() {
        let output = ocr_output(words_json(), "").unwrap();

        assert_eq!(output.tokens.len(), 4);
        assert_eq!(output.tokens[1], Token::new("12.000", 300.0, 11.0, 380.0, 31.0));
    }

    #[wasm_bindgen_test]
    fn test_null_words_use_text() {
        let output = ocr_output(JsValue::NULL, "Pan 3 1.200").unwrap();
        assert!(output.tokens.is_empty());

        let result = ReceiptParser::new().parse(&output);
        assert_eq!(result.items[0].name, "Pan");
        assert_eq!(result.items[0].quantity, 3);
    }

    #[wasm_bindgen_test]
    fn test_extract_items_returns_object() {
        let value = extract_items(words_json(), "").unwrap();
        let items = js_sys::Reflect::get(&value, &JsValue::from_str("items")).unwrap();

        assert_eq!(js_sys::Array::from(&items).length(), 1);
    }

    #[wasm_bindgen_test]
    fn test_preprocess_rgba() {
        let data = vec![200u8, 30, 90, 255].repeat(10 * 10);
        let processed = preprocess_rgba(data, 10, 10, 1.3, 1.15).unwrap();

        assert_eq!((processed.width(), processed.height()), (13, 13));
        assert_eq!(processed.data().len(), 13 * 13 * 4);
        assert!(preprocess_rgba(vec![0; 7], 10, 10, 1.3, 1.15).is_err());
    }

    #[wasm_bindgen_test]
    fn test_strict_extractor() {
        let mut extractor = ReceiptExtractor::new();
        extractor.set_strict(true);

        let value = extractor.extract_text("Pizza 12.000\nPizza Napolitana 12.000").unwrap();
        let items = js_sys::Reflect::get(&value, &JsValue::from_str("items")).unwrap();
        assert_eq!(js_sys::Array::from(&items).length(), 1);

        assert!(extractor.set_line_tolerance(0.0).is_err());
    }
}
