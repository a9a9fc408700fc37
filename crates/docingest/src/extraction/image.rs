//! Image inputs go straight to OCR.

use crate::Result;
use crate::core::config::OcrConfig;
use crate::core::io::DocumentHandle;
use crate::ocr::{OcrEngine, OcrLanguage, ocr_image_bytes};
use crate::types::{Degradation, FormatMetadata, ImageMetadata, RawExtraction};

/// OCR an image file.
///
/// With OCR disabled the result is empty text annotated `OcrSkipped`. An OCR failure is
/// recorded as `OcrFailed` on an empty result. Only reading the file can fail.
#[tracing::instrument(skip_all, fields(path = %handle.path().display(), engine = engine.name()))]
pub async fn extract_image(handle: &DocumentHandle, ocr: &OcrConfig, engine: &dyn OcrEngine) -> Result<RawExtraction> {
    let empty = || RawExtraction::new(String::new(), FormatMetadata::Image(ImageMetadata::default()));

    if !ocr.enabled {
        tracing::info!("OCR disabled, image left unprocessed");
        return Ok(empty().with_degradation(Degradation::OcrSkipped));
    }

    let bytes = tokio::fs::read(handle.path()).await?;

    match ocr_image_bytes(bytes, engine, OcrLanguage::from_code(&ocr.language)).await {
        Ok(recognized) => Ok(RawExtraction::new(
            recognized.text,
            FormatMetadata::Image(recognized.metadata),
        )),
        Err(e) => {
            tracing::warn!(error = %e, "Image OCR failed");
            Ok(empty().with_degradation(Degradation::OcrFailed { message: e.to_string() }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{OcrError, OcrOutput, UnavailableEngine};
    use crate::types::{ImageDimensions, OcrToken};
    use async_trait::async_trait;
    use image::{GrayImage, ImageFormat, Luma};
    use std::io::Cursor;
    use tempfile::tempdir;

    struct EchoEngine;

    #[async_trait]
    impl OcrEngine for EchoEngine {
        fn name(&self) -> &str {
            "echo"
        }

        async fn recognize(&self, image: GrayImage, language: OcrLanguage) -> std::result::Result<OcrOutput, OcrError> {
            Ok(OcrOutput {
                text: format!("{}x{} {}", image.width(), image.height(), language.code()),
                tokens: vec![
                    OcrToken {
                        text: "a".to_string(),
                        confidence: 90.0,
                    },
                    OcrToken {
                        text: "b".to_string(),
                        confidence: 30.0,
                    },
                ],
            })
        }

        async fn check_available(&self) -> std::result::Result<String, OcrError> {
            Ok("echo".to_string())
        }
    }

    async fn png_handle(dir: &std::path::Path) -> DocumentHandle {
        let image = GrayImage::from_pixel(40, 20, Luma([255u8]));
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        let path = dir.join("scan.png");
        std::fs::write(&path, bytes).unwrap();
        DocumentHandle::open(&path).await.unwrap()
    }

    #[tokio::test]
    async fn test_disabled_ocr_is_skipped() {
        let dir = tempdir().unwrap();
        let handle = png_handle(dir.path()).await;
        let config = OcrConfig {
            enabled: false,
            ..OcrConfig::default()
        };

        let raw = extract_image(&handle, &config, &EchoEngine).await.unwrap();
        assert!(raw.text.is_empty());
        assert_eq!(raw.degradations, vec![Degradation::OcrSkipped]);
    }

    #[tokio::test]
    async fn test_recognized_text_and_statistics() {
        let dir = tempdir().unwrap();
        let handle = png_handle(dir.path()).await;
        let config = OcrConfig {
            language: "en".to_string(),
            ..OcrConfig::default()
        };

        let raw = extract_image(&handle, &config, &EchoEngine).await.unwrap();
        assert_eq!(raw.text, "40x20 en");
        assert!(raw.degradations.is_empty());
        assert_eq!(
            raw.metadata,
            FormatMetadata::Image(ImageMetadata {
                ocr_confidence: Some(60.0),
                image_dimensions: Some(ImageDimensions { width: 40, height: 20 }),
                detected_text_blocks: Some(1),
            })
        );
    }

    #[tokio::test]
    async fn test_engine_failure_becomes_degradation() {
        let dir = tempdir().unwrap();
        let handle = png_handle(dir.path()).await;
        let engine = UnavailableEngine::new("no tesseract here");

        let raw = extract_image(&handle, &OcrConfig::default(), &engine).await.unwrap();
        assert!(raw.text.is_empty());
        assert!(matches!(
            raw.degradations.as_slice(),
            [Degradation::OcrFailed { message }] if message.contains("no tesseract here")
        ));
    }

    #[tokio::test]
    async fn test_undecodable_image_becomes_degradation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\ntruncated").unwrap();
        let handle = DocumentHandle::open(&path).await.unwrap();

        let raw = extract_image(&handle, &OcrConfig::default(), &EchoEngine).await.unwrap();
        assert!(matches!(raw.degradations.as_slice(), [Degradation::OcrFailed { .. }]));
    }
}
