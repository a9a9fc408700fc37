//! OCR drivers for image inputs and rasterized PDF pages.

use std::path::Path;

use super::engine::OcrEngine;
use super::error::OcrError;
use super::language::OcrLanguage;
use super::preprocessing::prepare_image_bytes;
use crate::core::io::ScratchDir;
use crate::pdf::rendering::PageRasterizer;
use crate::types::{ConfidenceSample, Degradation, ImageMetadata};

/// Confidence above which a recognized token counts as a detected text block.
pub const TEXT_BLOCK_CONFIDENCE: f64 = 50.0;

/// Marker inserted before each OCR'd PDF page.
pub const OCR_PAGE_MARKER: &str = "\n--- OCR Page ---\n";

const PAGE_SCRATCH_PREFIX: &str = "docingest_pages";

/// Recognized text of one image plus its statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageOcr {
    pub text: String,
    pub metadata: ImageMetadata,
}

/// Concatenated OCR text for the pages of a PDF.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageOcr {
    pub text: String,
    pub degradations: Vec<Degradation>,
}

/// Decode, pre-process and recognize one encoded image.
pub async fn ocr_image_bytes(
    bytes: Vec<u8>,
    engine: &dyn OcrEngine,
    language: OcrLanguage,
) -> std::result::Result<ImageOcr, OcrError> {
    let prepared = tokio::task::spawn_blocking(move || prepare_image_bytes(&bytes))
        .await
        .map_err(|e| OcrError::ImageProcessingFailed(format!("Pre-processing task panicked: {}", e)))??;

    let dimensions = prepared.dimensions;
    let output = engine.recognize(prepared.binary, language).await?;

    let sample = ConfidenceSample::from_tokens(&output.tokens);
    tracing::debug!(
        engine = engine.name(),
        tokens = sample.len(),
        confidence = sample.mean(),
        "Image recognized"
    );

    Ok(ImageOcr {
        text: output.text,
        metadata: ImageMetadata {
            ocr_confidence: Some(sample.mean()),
            image_dimensions: Some(dimensions),
            detected_text_blocks: Some(sample.count_above(TEXT_BLOCK_CONFIDENCE)),
        },
    })
}

/// Rasterize every page of `pdf` and OCR the pages in page order.
///
/// Nothing here is fatal: scratch, rasterizer, page read and engine failures are returned
/// as `OcrFailed` degradations alongside whatever text was recognized. The page scratch
/// directory is removed before this function returns.
pub async fn ocr_pdf_pages(
    pdf: &Path,
    scratch_parent: &Path,
    rasterizer: &dyn PageRasterizer,
    engine: &dyn OcrEngine,
    language: OcrLanguage,
) -> PageOcr {
    let mut result = PageOcr::default();
    let scratch = match ScratchDir::create(scratch_parent, PAGE_SCRATCH_PREFIX).await {
        Ok(scratch) => scratch,
        Err(e) => {
            tracing::warn!(error = %e, "Could not create page scratch directory");
            result.degradations.push(Degradation::OcrFailed {
                message: format!("scratch directory: {}", e),
            });
            return result;
        }
    };

    let pages = match rasterizer.rasterize(pdf, scratch.path()).await {
        Ok(pages) => pages,
        Err(e) => {
            tracing::warn!(rasterizer = rasterizer.name(), error = %e, "Page rasterization failed");
            result.degradations.push(Degradation::OcrFailed {
                message: OcrError::RasterizationFailed(e.to_string()).to_string(),
            });
            return result;
        }
    };

    tracing::debug!(pages = pages.len(), "Pages rasterized");

    for (index, page) in pages.iter().enumerate() {
        let bytes = match tokio::fs::read(page).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(page = index + 1, path = %page.display(), error = %e, "Rendered page unreadable");
                result.degradations.push(Degradation::OcrFailed {
                    message: format!("page {}: {}", index + 1, e),
                });
                continue;
            }
        };

        match ocr_image_bytes(bytes, engine, language).await {
            Ok(ocr) => {
                let text = ocr.text.trim();
                if !text.is_empty() {
                    result.text.push_str(OCR_PAGE_MARKER);
                    result.text.push_str(text);
                }
            }
            Err(e) => {
                tracing::warn!(page = index + 1, error = %e, "OCR failed on rendered page");
                result.degradations.push(Degradation::OcrFailed {
                    message: format!("page {}: {}", index + 1, e),
                });
            }
        }
    }

    drop(scratch);
    result
}
