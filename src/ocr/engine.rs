//! OCR engine contract
//!
//! The recognition algorithm itself lives outside this crate. Engines get
//! an already-normalized RGB image and pass the language tag and config
//! string through unchanged.

use async_trait::async_trait;
use image::RgbImage;

use super::types::{EngineError, Language, TokenConfidence};

/// OCR engine trait
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short engine name for logs
    fn name(&self) -> &'static str;

    /// Check if the engine can be invoked
    async fn is_available(&self) -> bool;

    /// Recognize the image as plain text
    async fn recognize(
        &self,
        image: &RgbImage,
        language: Language,
        config: &str,
    ) -> Result<String, EngineError>;

    /// Recognize the image as structured data, one confidence per row
    async fn recognize_structured(
        &self,
        image: &RgbImage,
        language: Language,
        config: &str,
    ) -> Result<Vec<TokenConfidence>, EngineError>;

    /// Text pass followed by the structured pass, same language and config.
    ///
    /// Engines that stage the image somewhere override this to stage it once.
    async fn recognize_with_confidences(
        &self,
        image: &RgbImage,
        language: Language,
        config: &str,
    ) -> Result<(String, Vec<TokenConfidence>), EngineError> {
        let text = self.recognize(image, language, config).await?;
        let confidences = self.recognize_structured(image, language, config).await?;
        Ok((text, confidences))
    }
}

/// Mock engine for testing
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MockEngine {
    pub text: String,
    pub confidences: Vec<i32>,
    /// Fail the text pass
    pub fail_text: bool,
    /// Fail the structured pass
    pub fail_structured: bool,
    pub calls: std::sync::Arc<std::sync::Mutex<Vec<(Language, String)>>>,
}

#[cfg(test)]
impl MockEngine {
    pub fn new(text: &str, confidences: &[i32]) -> Self {
        Self {
            text: text.to_string(),
            confidences: confidences.to_vec(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_text: true,
            ..Self::default()
        }
    }

    fn failure() -> EngineError {
        EngineError::Failed {
            status: "exit status: 1".to_string(),
            stderr: "Failed loading language 'ukr'".to_string(),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl OcrEngine for MockEngine {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn recognize(
        &self,
        _image: &RgbImage,
        language: Language,
        config: &str,
    ) -> Result<String, EngineError> {
        self.calls.lock().unwrap().push((language, config.to_string()));
        if self.fail_text {
            return Err(Self::failure());
        }
        Ok(self.text.clone())
    }

    async fn recognize_structured(
        &self,
        _image: &RgbImage,
        language: Language,
        config: &str,
    ) -> Result<Vec<TokenConfidence>, EngineError> {
        self.calls.lock().unwrap().push((language, config.to_string()));
        if self.fail_structured {
            return Err(Self::failure());
        }
        Ok(self.confidences.iter().copied().map(TokenConfidence).collect())
    }
}
