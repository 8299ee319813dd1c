//! Extraction request validation
//!
//! The upload handler drains the multipart body into an [`UploadForm`];
//! [`UploadForm::validate`] turns it into an [`ExtractionRequest`] or a
//! client-facing [`ValidationError`].

use axum::body::Bytes;

use super::types::{Language, UnsupportedLanguage};

/// A file part from the multipart form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Filename from the part's content disposition, if it had one
    pub filename: Option<String>,
    pub data: Bytes,
}

/// Raw form fields relevant to extraction
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub image: Option<UploadedFile>,
    pub language: Option<String>,
}

/// A validated extraction request
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub image: Bytes,
    pub language: Language,
    /// Advisory only, used in log lines
    pub filename: String,
}

/// Client input errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("No image file provided")]
    MissingImage,

    #[error("No image file selected")]
    EmptyFilename,

    #[error("Unsupported language: '{0}'. Supported languages: {supported}", supported = Language::supported_codes())]
    UnsupportedLanguage(String),
}

impl From<UnsupportedLanguage> for ValidationError {
    fn from(err: UnsupportedLanguage) -> Self {
        Self::UnsupportedLanguage(err.0)
    }
}

impl UploadForm {
    /// Validate the form.
    ///
    /// Checks run in order: image present, filename non-empty, language
    /// supported. An absent language defaults to `eng`; an empty one is
    /// rejected like any other unsupported value.
    pub fn validate(self) -> Result<ExtractionRequest, ValidationError> {
        let file = self.image.ok_or(ValidationError::MissingImage)?;

        // A part without a filename attribute is a plain form value, not a file
        let filename = file.filename.ok_or(ValidationError::MissingImage)?;
        if filename.is_empty() {
            return Err(ValidationError::EmptyFilename);
        }

        let language = match self.language {
            Some(code) => code.parse::<Language>()?,
            None => Language::default(),
        };

        Ok(ExtractionRequest {
            image: file.data,
            language,
            filename,
        })
    }
}
