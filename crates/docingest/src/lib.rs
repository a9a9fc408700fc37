//! docingest - multi-format document ingestion pipeline
//!
//! One entry point turns a PDF, Office document, legacy document, spreadsheet, CSV, plain
//! text or image into a uniform [`ExtractionResult`]: extracted text plus metadata that
//! always carries the file size, the resolved [`TypeTag`] and the original file name.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use docingest::{ExtractionConfig, extract_file};
//!
//! # async fn example() -> docingest::Result<()> {
//! let config = ExtractionConfig::default();
//! let result = extract_file("contrat.pdf", None, &config).await?;
//! println!("{}", result.text_content);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core** (`core`): format resolution, dispatch, envelope, config, batch extraction
//! - **Extraction** (`extraction`): one strategy per document family
//! - **OCR** (`ocr`): image pre-processing and the recognition engine seam
//! - **PDF** (`pdf`): text layer, document information, page rasterization
//! - **Analysis** (`analysis`): keyword classification and entity extraction
//!
//! # Degraded results
//!
//! Recoverable sub-failures (OCR errors, unreadable pages, disabled OCR) do not fail an
//! extraction. They are listed in [`ExtractionResult::degradations`].

#![deny(unsafe_code)]

pub mod analysis;
pub mod core;
pub mod error;
pub mod extraction;
pub mod ocr;
pub mod pdf;
pub mod types;

pub use error::{DocingestError, Result};
pub use types::*;

pub use core::config::{ConverterConfig, ExtractionConfig, OcrConfig, RasterizerConfig};
pub use core::extractor::{batch_extract_files, extract_bytes, extract_file};
pub use core::fingerprint::{cache_key, fingerprint_bytes, fingerprint_file};
pub use core::formats::{DependencyReport, DependencyStatus, FormatInfo, check_dependencies, supported_formats};
pub use core::io::{DocumentHandle, StagedDocument};
pub use core::mime::{resolve_by_extension, resolve_type_tag, supported_extensions};
pub use core::pipeline::Pipeline;

pub use extraction::libreoffice::{DocumentConverter, SofficeConverter};
pub use ocr::{OcrEngine, OcrError, OcrLanguage, OcrOutput};
pub use pdf::rendering::{PageRasterizer, PdftoppmRasterizer};
