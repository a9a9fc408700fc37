//! Extraction method table: one strategy per document family.

use crate::core::io::DocumentHandle;
use crate::core::pipeline::Pipeline;
use crate::extraction;
use crate::types::{DocumentFamily, RawExtraction, TypeTag};
use crate::{DocingestError, Result};

/// Run the strategy bound to `tag`'s family.
///
/// The match is exhaustive over [`DocumentFamily`]: a new family does not compile until
/// it has a strategy.
pub async fn dispatch(pipeline: &Pipeline, handle: &DocumentHandle, tag: TypeTag) -> Result<RawExtraction> {
    let family = tag.family();
    tracing::info!(
        file = handle.original_name(),
        file_type = %tag,
        strategy = strategy_name(family),
        "Dispatching extraction"
    );

    let config = pipeline.config();

    match family {
        DocumentFamily::Document => extract_pdf(pipeline, handle).await,
        DocumentFamily::LegacyDocument
        | DocumentFamily::LegacyPresentation
        | DocumentFamily::LegacySpreadsheet
        | DocumentFamily::RichText => {
            extraction::extract_legacy(handle, tag, pipeline.converter(), &config.staging_dir()).await
        }
        DocumentFamily::PlainText => {
            let bytes = tokio::fs::read(handle.path()).await?;
            Ok(extraction::parse_text(&bytes))
        }
        DocumentFamily::TabularText => parse_blocking(handle, extraction::parse_csv).await,
        DocumentFamily::StructuredDocument => parse_docx(handle).await,
        DocumentFamily::Presentation => parse_presentation(handle).await,
        DocumentFamily::Spreadsheet => parse_spreadsheet(handle).await,
        DocumentFamily::Image => extraction::extract_image(handle, &config.ocr, pipeline.ocr_engine()).await,
    }
}

fn strategy_name(family: DocumentFamily) -> &'static str {
    match family {
        DocumentFamily::Document => "pdf-text-layer",
        DocumentFamily::LegacyDocument
        | DocumentFamily::LegacyPresentation
        | DocumentFamily::LegacySpreadsheet
        | DocumentFamily::RichText => "legacy-converter",
        DocumentFamily::PlainText => "plain-text",
        DocumentFamily::TabularText => "csv",
        DocumentFamily::StructuredDocument => "docx",
        DocumentFamily::Presentation => "presentation",
        DocumentFamily::Spreadsheet => "spreadsheet",
        DocumentFamily::Image => "image-ocr",
    }
}

/// Read the file and run a synchronous parser on the blocking pool.
async fn parse_blocking<F>(handle: &DocumentHandle, parser: F) -> Result<RawExtraction>
where
    F: FnOnce(&[u8]) -> Result<RawExtraction> + Send + 'static,
{
    let bytes = tokio::fs::read(handle.path()).await?;
    tokio::task::spawn_blocking(move || parser(&bytes))
        .await
        .map_err(|e| DocingestError::Other(format!("Extraction task panicked: {}", e)))?
}

#[cfg(feature = "pdf")]
async fn extract_pdf(pipeline: &Pipeline, handle: &DocumentHandle) -> Result<RawExtraction> {
    extraction::extract_pdf(handle, pipeline.config(), pipeline.rasterizer(), pipeline.ocr_engine()).await
}

#[cfg(not(feature = "pdf"))]
async fn extract_pdf(_pipeline: &Pipeline, _handle: &DocumentHandle) -> Result<RawExtraction> {
    Err(feature_disabled("PDF", "pdf"))
}

#[cfg(feature = "office")]
async fn parse_docx(handle: &DocumentHandle) -> Result<RawExtraction> {
    parse_blocking(handle, extraction::parse_docx).await
}

#[cfg(not(feature = "office"))]
async fn parse_docx(_handle: &DocumentHandle) -> Result<RawExtraction> {
    Err(feature_disabled("DOCX", "office"))
}

#[cfg(feature = "office")]
async fn parse_presentation(handle: &DocumentHandle) -> Result<RawExtraction> {
    parse_blocking(handle, extraction::parse_presentation).await
}

#[cfg(not(feature = "office"))]
async fn parse_presentation(_handle: &DocumentHandle) -> Result<RawExtraction> {
    Err(feature_disabled("PPTX", "office"))
}

#[cfg(feature = "excel")]
async fn parse_spreadsheet(handle: &DocumentHandle) -> Result<RawExtraction> {
    parse_blocking(handle, extraction::parse_spreadsheet).await
}

#[cfg(not(feature = "excel"))]
async fn parse_spreadsheet(_handle: &DocumentHandle) -> Result<RawExtraction> {
    Err(feature_disabled("Spreadsheet", "excel"))
}

#[cfg(not(all(feature = "pdf", feature = "office", feature = "excel")))]
fn feature_disabled(format: &str, feature: &str) -> DocingestError {
    DocingestError::UnsupportedFormat(format!(
        "{} extraction requires the `{}` feature",
        format, feature
    ))
}
