//! OCR path: language profiles, image pre-processing and the recognition engine seam.
//!
//! Every failure on this path is recoverable. Callers record an [`error::OcrError`] as a
//! [`crate::types::Degradation::OcrFailed`] instead of failing the extraction.

pub mod engine;
pub mod error;
pub mod language;
pub mod preprocessing;
pub mod processor;
#[cfg(feature = "ocr")]
pub mod tesseract;
pub mod tsv;

pub use engine::{OcrEngine, OcrOutput, UnavailableEngine, default_engine};
pub use error::OcrError;
pub use language::OcrLanguage;
pub use processor::{ImageOcr, OCR_PAGE_MARKER, PageOcr, ocr_image_bytes, ocr_pdf_pages};
#[cfg(feature = "ocr")]
pub use tesseract::TesseractEngine;
