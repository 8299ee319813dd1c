//! OCR Module
//!
//! The extraction pipeline: validate the upload, normalize the image to RGB,
//! run the recognition engine and aggregate its confidences.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ocr_server::ocr::{normalize_image, Language, TesseractEngine, TextExtractor};
//!
//! let extractor = TextExtractor::new(Arc::new(TesseractEngine::new("tesseract")));
//! let image = normalize_image(&bytes)?;
//! let result = extractor.extract(&image, Language::English).await?;
//! println!("{} words at {}%", result.word_count, result.confidence);
//! ```

mod engine;
mod normalize;
mod request;
mod service;
mod tesseract;
mod types;

pub use engine::OcrEngine;
pub use normalize::{normalize_image, ImageDecodeError};
pub use request::{ExtractionRequest, UploadForm, UploadedFile, ValidationError};
pub use service::{average_confidence, word_count, TextExtractor, TESSERACT_CONFIG};
pub use tesseract::TesseractEngine;
pub use types::{EngineError, Language, RecognitionResult, TokenConfidence, UnsupportedLanguage};

#[cfg(test)]
pub(crate) use engine::MockEngine;
