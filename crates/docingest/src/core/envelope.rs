//! Result envelope builder.

use std::collections::HashMap;

use crate::core::io::DocumentHandle;
use crate::types::{ExtractionResult, Metadata, RawExtraction, TypeTag};

/// Merge a strategy's raw output with the pipeline-level fields.
///
/// Pure: the handle's size and name were captured when it was opened, so the source
/// file is not touched again.
pub fn build_envelope(raw: RawExtraction, handle: &DocumentHandle, tag: TypeTag) -> ExtractionResult {
    ExtractionResult {
        text_content: raw.text,
        metadata: Metadata {
            file_size: handle.size(),
            file_type: tag,
            original_filename: handle.original_name().to_string(),
            mime_type: Some(tag.mime_type().to_string()),
            format: Some(raw.metadata),
            additional: HashMap::new(),
        },
        degradations: raw.degradations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Degradation, FormatMetadata, TextMetadata};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_envelope_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("staged_copy.txt");
        std::fs::write(&path, "hello\nworld").unwrap();
        let handle = DocumentHandle::open(&path)
            .await
            .unwrap()
            .with_original_name("Rapport final.txt");

        let raw = RawExtraction::new("hello\nworld", FormatMetadata::Text(TextMetadata { line_count: 2 }))
            .with_degradation(Degradation::OcrSkipped);

        // The envelope must not re-read the file.
        std::fs::remove_file(&path).unwrap();
        let result = build_envelope(raw, &handle, TypeTag::Txt);

        assert_eq!(result.text_content, "hello\nworld");
        assert_eq!(result.metadata.file_size, 11);
        assert_eq!(result.metadata.file_type, TypeTag::Txt);
        assert_eq!(result.metadata.original_filename, "Rapport final.txt");
        assert_eq!(result.metadata.mime_type.as_deref(), Some("text/plain"));
        assert!(result.is_degraded());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["metadata"]["file_type"], "txt");
        assert_eq!(json["metadata"]["format_type"], "text");
        assert_eq!(json["metadata"]["line_count"], 2);
        assert_eq!(json["degradations"][0]["kind"], "ocr_skipped");
    }
}
