//! The extraction pipeline and its external collaborators.
//!
//! A [`Pipeline`] owns the configuration plus the three seams to the outside world:
//! the page rasterizer, the OCR engine and the legacy document converter. The defaults
//! shell out to `pdftoppm`, Tesseract and `soffice`; tests swap in fakes through the
//! `with_*` builders.
//!
//! One run is: resolve the type tag, dispatch to the strategy of its family, wrap the
//! raw output in the result envelope.

use std::fmt;
use std::sync::Arc;

use crate::core::config::ExtractionConfig;
use crate::core::dispatch::dispatch;
use crate::core::envelope::build_envelope;
use crate::core::io::DocumentHandle;
use crate::core::mime::resolve_type_tag;
use crate::extraction::libreoffice::{DocumentConverter, SofficeConverter};
use crate::ocr::{OcrEngine, default_engine};
use crate::pdf::rendering::{PageRasterizer, PdftoppmRasterizer};
use crate::types::{ExtractionResult, TypeTag};
use crate::{DocingestError, Result};

#[derive(Clone)]
pub struct Pipeline {
    config: Arc<ExtractionConfig>,
    rasterizer: Arc<dyn PageRasterizer>,
    ocr_engine: Arc<dyn OcrEngine>,
    converter: Arc<dyn DocumentConverter>,
}

impl Pipeline {
    /// Pipeline with the default external tools, located according to `config`.
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            rasterizer: Arc::new(PdftoppmRasterizer::from_config(&config.rasterizer)),
            ocr_engine: default_engine(&config.ocr),
            converter: Arc::new(SofficeConverter::from_config(&config.converter)),
            config: Arc::new(config),
        }
    }

    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn with_ocr_engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.ocr_engine = engine;
        self
    }

    pub fn with_converter(mut self, converter: Arc<dyn DocumentConverter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn rasterizer(&self) -> &dyn PageRasterizer {
        self.rasterizer.as_ref()
    }

    pub fn ocr_engine(&self) -> &dyn OcrEngine {
        self.ocr_engine.as_ref()
    }

    pub fn converter(&self) -> &dyn DocumentConverter {
        self.converter.as_ref()
    }

    /// Resolve, extract and envelope one document.
    ///
    /// A type declared on the handle is trusted; otherwise the file is sniffed, then its
    /// extension is consulted.
    pub async fn run(&self, handle: &DocumentHandle) -> Result<ExtractionResult> {
        let tag = match handle.declared_type() {
            Some(tag) => tag,
            None => resolve_tag(handle).await?,
        };

        let raw = dispatch(self, handle, tag).await?;
        let result = build_envelope(raw, handle, tag);

        if result.is_degraded() {
            tracing::warn!(
                file = handle.original_name(),
                degradations = result.degradations.len(),
                "Extraction finished with degraded content"
            );
        }

        Ok(result)
    }
}

async fn resolve_tag(handle: &DocumentHandle) -> Result<TypeTag> {
    let path = handle.path().to_path_buf();
    tokio::task::spawn_blocking(move || resolve_type_tag(path))
        .await
        .map_err(|e| DocingestError::Other(format!("Format resolution task panicked: {}", e)))?
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("rasterizer", &self.rasterizer.name())
            .field("ocr_engine", &self.ocr_engine.name())
            .field("converter", &self.converter.name())
            .finish()
    }
}
