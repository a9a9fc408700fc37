//! PDF strategy: direct text layer first, OCR of rendered pages when that is not enough.

use lopdf::Document;

use crate::core::config::ExtractionConfig;
use crate::core::io::DocumentHandle;
use crate::ocr::{OcrEngine, OcrLanguage, ocr_pdf_pages};
use crate::pdf::PageRasterizer;
use crate::pdf::error::PdfError;
use crate::pdf::metadata::extract_metadata;
use crate::pdf::text::{PageTexts, extract_page_texts, load_document};
use crate::types::{Degradation, FormatMetadata, PdfMetadata, RawExtraction};
use crate::{DocingestError, Result};

/// Text layer read outcome. Metadata survives a failed text layer when the file parsed.
struct DirectRead {
    metadata: PdfMetadata,
    pages: std::result::Result<PageTexts, PdfError>,
}

fn read_direct(bytes: &[u8]) -> std::result::Result<DirectRead, PdfError> {
    let document: Document = load_document(bytes)?;
    Ok(DirectRead {
        metadata: extract_metadata(&document),
        pages: extract_page_texts(&document),
    })
}

/// Extract a PDF.
///
/// - Enough text on the text layer (at least `ocr.min_text_length` characters of page
///   text): that text, nothing else.
/// - Too little text: OCR text of every page is appended, or `OcrSkipped` when OCR is off.
/// - Unreadable text layer: OCR text replaces it, or empty text with
///   `TextLayerUnavailable` when OCR is off.
#[tracing::instrument(skip_all, fields(path = %handle.path().display()))]
pub async fn extract_pdf(
    handle: &DocumentHandle,
    config: &ExtractionConfig,
    rasterizer: &dyn PageRasterizer,
    engine: &dyn OcrEngine,
) -> Result<RawExtraction> {
    let bytes = tokio::fs::read(handle.path()).await?;
    let direct = tokio::task::spawn_blocking(move || read_direct(&bytes))
        .await
        .map_err(|e| DocingestError::Other(format!("PDF parsing task panicked: {}", e)))?;

    let (mut metadata, pages) = match direct {
        Ok(read) => (read.metadata, read.pages),
        Err(e) => (PdfMetadata::default(), Err(e)),
    };

    let ocr = &config.ocr;
    let mut degradations = Vec::new();

    let text = match pages {
        Ok(pages) => {
            for (page, message) in pages.failures {
                tracing::warn!(page, error = %message, "Skipping unreadable PDF page");
                degradations.push(Degradation::PartialExtraction {
                    unit: "page".to_string(),
                    index: page as usize,
                    message,
                });
            }

            let mut text = pages.text;
            if pages.char_count < ocr.min_text_length {
                if ocr.enabled {
                    tracing::info!(
                        chars = pages.char_count,
                        threshold = ocr.min_text_length,
                        "Text layer too short, running OCR fallback"
                    );
                    let fallback = run_page_ocr(handle, config, rasterizer, engine).await;
                    text.push_str(&fallback.text);
                    degradations.extend(fallback.degradations);
                    metadata.ocr_fallback_used = true;
                } else {
                    tracing::info!(chars = pages.char_count, "Text layer too short and OCR disabled");
                    degradations.push(Degradation::OcrSkipped);
                }
            }
            text
        }
        Err(e) => {
            tracing::warn!(error = %e, "PDF text layer unreadable");
            if ocr.enabled {
                tracing::info!("Replacing unreadable text layer with OCR");
                let fallback = run_page_ocr(handle, config, rasterizer, engine).await;
                degradations.extend(fallback.degradations);
                metadata.ocr_fallback_used = true;
                fallback.text
            } else {
                degradations.push(Degradation::TextLayerUnavailable { message: e.to_string() });
                String::new()
            }
        }
    };

    Ok(RawExtraction {
        text: text.trim().to_string(),
        metadata: FormatMetadata::Pdf(metadata),
        degradations,
    })
}

async fn run_page_ocr(
    handle: &DocumentHandle,
    config: &ExtractionConfig,
    rasterizer: &dyn PageRasterizer,
    engine: &dyn OcrEngine,
) -> crate::ocr::PageOcr {
    ocr_pdf_pages(
        handle.path(),
        &config.staging_dir(),
        rasterizer,
        engine,
        OcrLanguage::from_code(&config.ocr.language),
    )
    .await
}
