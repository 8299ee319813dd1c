//! OCR Service
//!
//! Runs the recognition engine over a normalized image and shapes the result.

use std::sync::Arc;

use image::RgbImage;

use super::{
    engine::OcrEngine,
    types::{EngineError, Language, RecognitionResult, TokenConfidence},
};

/// Engine flags: LSTM/legacy auto engine mode, single uniform block of text.
///
/// Output on multi-column or sparse layouts depends on this; keep it fixed.
pub const TESSERACT_CONFIG: &str = "--oem 3 --psm 6";

/// Text extraction over an injected OCR engine
#[derive(Clone)]
pub struct TextExtractor {
    engine: Arc<dyn OcrEngine>,
}

impl TextExtractor {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &dyn OcrEngine {
        self.engine.as_ref()
    }

    /// Extract text and confidence from `image`.
    ///
    /// The engine runs twice with identical language and config: once for
    /// text, once for per-token confidences.
    pub async fn extract(
        &self,
        image: &RgbImage,
        language: Language,
    ) -> Result<RecognitionResult, EngineError> {
        let (raw_text, confidences) = self
            .engine
            .recognize_with_confidences(image, language, TESSERACT_CONFIG)
            .await?;

        let text = raw_text.trim().to_string();
        let word_count = word_count(&text);

        Ok(RecognitionResult {
            success: true,
            text,
            language,
            confidence: average_confidence(&confidences),
            word_count,
        })
    }
}

/// Mean of the positive confidences, rounded to two decimals; 0 if none.
pub fn average_confidence(confidences: &[TokenConfidence]) -> f64 {
    let (sum, count) = confidences
        .iter()
        .filter(|conf| conf.has_text())
        .fold((0i64, 0usize), |(sum, count), conf| {
            (sum + i64::from(conf.0), count + 1)
        });

    if count == 0 {
        return 0.0;
    }

    let mean = sum as f64 / count as f64;
    (mean * 100.0).round() / 100.0
}

/// Number of whitespace-delimited words in `text`
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
