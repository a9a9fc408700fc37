//! The OCR engine seam.
//!
//! The pipeline only talks to [`OcrEngine`]. The Tesseract backend lives behind the
//! `ocr` feature; without it [`default_engine`] returns an engine that always reports
//! itself unavailable, which the callers turn into an `OcrFailed` degradation.

use async_trait::async_trait;
use image::GrayImage;
use std::sync::Arc;

use super::error::OcrError;
use super::language::OcrLanguage;
use crate::core::config::OcrConfig;
use crate::types::OcrToken;

/// Text and per-token confidences from one recognition call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrOutput {
    pub text: String,
    pub tokens: Vec<OcrToken>,
}

#[async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Recognize text on an already pre-processed single-channel image.
    async fn recognize(&self, image: GrayImage, language: OcrLanguage) -> Result<OcrOutput, OcrError>;

    /// Describe the engine if it can run, for dependency health reports.
    async fn check_available(&self) -> Result<String, OcrError>;
}

/// Engine used when no OCR backend is compiled in.
#[derive(Debug, Clone)]
pub struct UnavailableEngine {
    reason: String,
}

impl UnavailableEngine {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[async_trait]
impl OcrEngine for UnavailableEngine {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn recognize(&self, _image: GrayImage, _language: OcrLanguage) -> Result<OcrOutput, OcrError> {
        Err(OcrError::EngineUnavailable(self.reason.clone()))
    }

    async fn check_available(&self) -> Result<String, OcrError> {
        Err(OcrError::EngineUnavailable(self.reason.clone()))
    }
}

/// The engine a pipeline uses unless one is injected.
#[cfg(feature = "ocr")]
pub fn default_engine(config: &OcrConfig) -> Arc<dyn OcrEngine> {
    Arc::new(super::tesseract::TesseractEngine::from_config(config))
}

#[cfg(not(feature = "ocr"))]
pub fn default_engine(_config: &OcrConfig) -> Arc<dyn OcrEngine> {
    Arc::new(UnavailableEngine::new(
        "docingest was built without the `ocr` feature",
    ))
}
