//! OCR Types
//!
//! Defines the language catalog, engine output and result types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Supported recognition language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Language {
    /// English
    #[default]
    #[serde(rename = "eng")]
    English,
    /// Ukrainian
    #[serde(rename = "ukr")]
    Ukrainian,
    /// English and Ukrainian combined
    #[serde(rename = "eng+ukr")]
    EnglishUkrainian,
}

impl Language {
    /// Every supported language, in catalog order
    pub const ALL: [Language; 3] = [
        Language::English,
        Language::Ukrainian,
        Language::EnglishUkrainian,
    ];

    /// Engine language tag, passed to the engine unchanged
    pub fn code(self) -> &'static str {
        match self {
            Self::English => "eng",
            Self::Ukrainian => "ukr",
            Self::EnglishUkrainian => "eng+ukr",
        }
    }

    /// Human-readable name
    pub fn display_name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Ukrainian => "Ukrainian",
            Self::EnglishUkrainian => "English + Ukrainian",
        }
    }

    /// Individual language packs the engine needs for this language
    pub fn packs(self) -> impl Iterator<Item = &'static str> {
        self.code().split('+')
    }

    /// Code to display name for every supported language
    pub fn catalog() -> BTreeMap<&'static str, &'static str> {
        Self::ALL
            .iter()
            .map(|lang| (lang.code(), lang.display_name()))
            .collect()
    }

    /// Comma-separated list of supported codes, for error messages
    pub fn supported_codes() -> String {
        Self::ALL
            .iter()
            .map(|lang| lang.code())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error for a language code outside the catalog
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported language: '{0}'")]
pub struct UnsupportedLanguage(pub String);

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    /// Exact match only: no trimming, no case folding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.code() == s)
            .ok_or_else(|| UnsupportedLanguage(s.to_string()))
    }
}

/// Confidence the engine assigned to one structured-data row.
///
/// Non-positive values mark rows without recognized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenConfidence(pub i32);

impl TokenConfidence {
    /// Whether this row carries recognized text
    pub fn has_text(self) -> bool {
        self.0 > 0
    }
}

/// Successful text extraction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognitionResult {
    pub success: bool,
    /// Recognized text, trimmed
    pub text: String,
    /// Language used for recognition
    pub language: Language,
    /// Mean token confidence (0-100, two decimals)
    pub confidence: f64,
    /// Whitespace-delimited word count of `text`
    pub word_count: usize,
}

/// OCR engine errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Failed to launch OCR engine '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("OCR engine exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Failed to prepare image for OCR engine: {0}")]
    ImagePreparation(String),

    #[error("Invalid OCR engine output: {0}")]
    InvalidOutput(String),
}
