//! Tesseract-backed [`OcrEngine`].

use async_trait::async_trait;
use image::GrayImage;
use kreuzberg_tesseract::{TessPageSegMode, TesseractAPI};
use std::env;
use std::path::{Path, PathBuf};

use super::engine::{OcrEngine, OcrOutput};
use super::error::OcrError;
use super::language::OcrLanguage;
use super::tsv::parse_tsv_tokens;
use crate::core::config::OcrConfig;

const TESSDATA_FALLBACK_PATHS: &[&str] = &[
    "/opt/homebrew/share/tessdata",
    "/opt/homebrew/opt/tesseract/share/tessdata",
    "/usr/local/opt/tesseract/share/tessdata",
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
    r#"C:\Program Files\Tesseract-OCR\tessdata"#,
];

#[derive(Debug, Clone)]
pub struct TesseractEngine {
    tessdata_path: Option<PathBuf>,
    page_segmentation_mode: i32,
}

impl TesseractEngine {
    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            tessdata_path: config.tessdata_path.clone(),
            page_segmentation_mode: config.page_segmentation_mode,
        }
    }

    /// Configured directory, then `TESSDATA_PREFIX`, then well-known install locations.
    fn resolve_tessdata(&self) -> Option<PathBuf> {
        if let Some(path) = &self.tessdata_path {
            return Some(path.clone());
        }

        if let Some(prefix) = env::var_os("TESSDATA_PREFIX").filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(prefix));
        }

        TESSDATA_FALLBACK_PATHS
            .iter()
            .map(Path::new)
            .find(|p| p.exists())
            .map(Path::to_path_buf)
    }
}

fn recognize_blocking(
    image: &GrayImage,
    tessdata: &Path,
    language: OcrLanguage,
    psm: i32,
) -> Result<OcrOutput, OcrError> {
    let lang = language.tesseract_code();

    // A missing traineddata file can crash the native library instead of failing init.
    let traineddata = tessdata.join(format!("{}.traineddata", lang));
    if !traineddata.exists() {
        return Err(OcrError::TesseractInitializationFailed(format!(
            "Language '{}' not found. Traineddata file does not exist: {}",
            lang,
            traineddata.display()
        )));
    }

    let (width, height) = image.dimensions();
    let api = TesseractAPI::new();

    api.init(&tessdata.to_string_lossy(), lang).map_err(|e| {
        OcrError::TesseractInitializationFailed(format!("Failed to initialize language '{}': {}", lang, e))
    })?;

    api.set_page_seg_mode(TessPageSegMode::from_int(psm))
        .map_err(|e| OcrError::InvalidConfiguration(format!("Failed to set PSM mode: {}", e)))?;

    api.set_image(image.as_raw(), width as i32, height as i32, 1, width as i32)
        .map_err(|e| OcrError::ProcessingFailed(format!("Failed to set image: {}", e)))?;

    api.recognize()
        .map_err(|e| OcrError::ProcessingFailed(format!("Failed to recognize text: {}", e)))?;

    let text = api
        .get_utf8_text()
        .map_err(|e| OcrError::ProcessingFailed(format!("Failed to extract text: {}", e)))?;

    let tsv = api
        .get_tsv_text(0)
        .map_err(|e| OcrError::ProcessingFailed(format!("Failed to extract TSV: {}", e)))?;

    Ok(OcrOutput {
        text,
        tokens: parse_tsv_tokens(&tsv),
    })
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, image: GrayImage, language: OcrLanguage) -> Result<OcrOutput, OcrError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(OcrError::ImageProcessingFailed("Image has zero area".to_string()));
        }

        let tessdata = self
            .resolve_tessdata()
            .ok_or_else(|| OcrError::EngineUnavailable("No tessdata directory found".to_string()))?;
        let psm = self.page_segmentation_mode;

        tracing::debug!(tessdata = %tessdata.display(), language = language.tesseract_code(), psm, "Running Tesseract");

        tokio::task::spawn_blocking(move || recognize_blocking(&image, &tessdata, language, psm))
            .await
            .map_err(|e| OcrError::ProcessingFailed(format!("OCR task panicked: {}", e)))?
    }

    async fn check_available(&self) -> Result<String, OcrError> {
        let tessdata = self
            .resolve_tessdata()
            .ok_or_else(|| OcrError::EngineUnavailable("No tessdata directory found".to_string()))?;
        Ok(format!(
            "tesseract {} (tessdata: {})",
            TesseractAPI::version(),
            tessdata.display()
        ))
    }
}
