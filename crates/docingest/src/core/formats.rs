//! Supported format listing and external dependency health.

use serde::Serialize;

use crate::core::config::ExtractionConfig;
use crate::core::pipeline::Pipeline;
use crate::types::{DocumentFamily, TypeTag};

/// One supported type tag as reported to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatInfo {
    pub tag: TypeTag,
    pub name: &'static str,
    pub family: DocumentFamily,
    pub extensions: &'static [&'static str],
    pub mime_type: &'static str,
}

/// Every type tag, in declaration order.
pub fn supported_formats() -> Vec<FormatInfo> {
    TypeTag::ALL
        .iter()
        .map(|&tag| FormatInfo {
            tag,
            name: tag.as_str(),
            family: tag.family(),
            extensions: tag.extensions(),
            mime_type: tag.mime_type(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DependencyStatus {
    Available { detail: String },
    Missing { reason: String },
}

impl DependencyStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, DependencyStatus::Available { .. })
    }
}

impl<E: std::fmt::Display> From<std::result::Result<String, E>> for DependencyStatus {
    fn from(result: std::result::Result<String, E>) -> Self {
        match result {
            Ok(detail) => DependencyStatus::Available { detail },
            Err(e) => DependencyStatus::Missing { reason: e.to_string() },
        }
    }
}

/// Availability of the three external tools the pipeline may need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyReport {
    pub converter: DependencyStatus,
    pub rasterizer: DependencyStatus,
    pub ocr_engine: DependencyStatus,
}

impl DependencyReport {
    pub fn all_available(&self) -> bool {
        self.converter.is_available() && self.rasterizer.is_available() && self.ocr_engine.is_available()
    }
}

/// Probe the default tools located according to `config`.
pub async fn check_dependencies(config: &ExtractionConfig) -> DependencyReport {
    Pipeline::new(config.clone()).check_dependencies().await
}

impl Pipeline {
    /// Probe this pipeline's converter, rasterizer and OCR engine.
    pub async fn check_dependencies(&self) -> DependencyReport {
        let (converter, rasterizer, ocr_engine) = tokio::join!(
            self.converter().check_available(),
            self.rasterizer().check_available(),
            self.ocr_engine().check_available(),
        );

        let report = DependencyReport {
            converter: converter.into(),
            rasterizer: rasterizer.into(),
            ocr_engine: ocr_engine.into(),
        };
        tracing::debug!(?report, "Dependency check finished");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::UnavailableEngine;
    use std::sync::Arc;

    #[test]
    fn test_every_tag_listed_once() {
        let formats = supported_formats();
        assert_eq!(formats.len(), TypeTag::ALL.len());

        let jpeg = formats.iter().find(|f| f.tag == TypeTag::Jpeg).unwrap();
        assert_eq!(jpeg.name, "jpeg");
        assert_eq!(jpeg.extensions, &["jpeg", "jpg"]);
        assert_eq!(jpeg.family, DocumentFamily::Image);
        assert_eq!(jpeg.mime_type, "image/jpeg");

        let json = serde_json::to_value(&formats[0]).unwrap();
        assert_eq!(json["name"], "pdf");
        assert_eq!(json["family"], "document");
    }

    #[tokio::test]
    async fn test_missing_engine_reported() {
        let pipeline = Pipeline::new(ExtractionConfig::default())
            .with_ocr_engine(Arc::new(UnavailableEngine::new("built without OCR")));
        let report = pipeline.check_dependencies().await;

        assert!(!report.all_available());
        match &report.ocr_engine {
            DependencyStatus::Missing { reason } => assert!(reason.contains("built without OCR")),
            other => panic!("unexpected status {:?}", other),
        }
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["ocr_engine"]["status"], "missing");
    }
}
