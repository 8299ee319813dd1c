//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::ocr::{OcrEngine, TextExtractor};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    extractor: TextExtractor,
}

impl AppState {
    /// Create application state around an OCR engine
    pub fn with_engine(config: Config, engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                extractor: TextExtractor::new(engine),
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the text extractor
    pub fn extractor(&self) -> &TextExtractor {
        &self.inner.extractor
    }
}
