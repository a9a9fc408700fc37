//! Format resolution.
//!
//! Maps a file to exactly one [`TypeTag`] using a fixed fallback chain:
//!
//! 1. content sniffing (`infer`) looked up in [`SIGNATURE_TO_TAG`]
//! 2. the file extension looked up in [`EXT_TO_TAG`], with aliases normalized
//! 3. rejection with [`DocingestError::UnsupportedFormat`]
//!
//! A sniffing failure (unreadable file, unknown signature) is never fatal on its own;
//! resolution falls through to the extension table.

use crate::types::TypeTag;
use crate::{DocingestError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const PLAIN_TEXT_MIME_TYPE: &str = "text/plain";
pub const CSV_MIME_TYPE: &str = "text/csv";
pub const RTF_MIME_TYPE: &str = "application/rtf";
pub const DOCX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const DOC_MIME_TYPE: &str = "application/msword";
pub const PPTX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const PPT_MIME_TYPE: &str = "application/vnd.ms-powerpoint";
pub const XLSX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const XLS_MIME_TYPE: &str = "application/vnd.ms-excel";

/// Content signature (as reported by `infer`) to type tag.
static SIGNATURE_TO_TAG: Lazy<HashMap<&'static str, TypeTag>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert(PDF_MIME_TYPE, TypeTag::Pdf);
    m.insert(DOCX_MIME_TYPE, TypeTag::Docx);
    m.insert(DOC_MIME_TYPE, TypeTag::Doc);
    m.insert(PLAIN_TEXT_MIME_TYPE, TypeTag::Txt);
    m.insert(RTF_MIME_TYPE, TypeTag::Rtf);
    m.insert("text/rtf", TypeTag::Rtf);
    m.insert(PPTX_MIME_TYPE, TypeTag::Pptx);
    m.insert(PPT_MIME_TYPE, TypeTag::Ppt);
    m.insert(XLSX_MIME_TYPE, TypeTag::Xlsx);
    m.insert(XLS_MIME_TYPE, TypeTag::Xls);
    m.insert(CSV_MIME_TYPE, TypeTag::Csv);

    m.insert("image/png", TypeTag::Png);
    m.insert("image/jpeg", TypeTag::Jpeg);
    m.insert("image/jpg", TypeTag::Jpeg);
    m.insert("image/tiff", TypeTag::Tiff);
    m.insert("image/bmp", TypeTag::Bmp);
    m.insert("image/x-ms-bmp", TypeTag::Bmp);
    m.insert("image/gif", TypeTag::Gif);

    m
});

/// Lowercase extension (without dot) to type tag, aliases included.
static EXT_TO_TAG: Lazy<HashMap<&'static str, TypeTag>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for tag in TypeTag::ALL {
        for ext in tag.extensions() {
            m.insert(*ext, tag);
        }
    }
    m
});

/// Look up a content signature (MIME string) in the signature table.
pub fn type_tag_from_signature(mime_type: &str) -> Option<TypeTag> {
    let normalized = mime_type
        .split(';')
        .next()
        .unwrap_or(mime_type)
        .trim()
        .to_ascii_lowercase();
    SIGNATURE_TO_TAG.get(normalized.as_str()).copied()
}

/// Look up an extension in the extension table. Accepts a leading dot and any case.
pub fn type_tag_from_extension(extension: &str) -> Option<TypeTag> {
    let ext = extension.trim().trim_start_matches('.').to_ascii_lowercase();
    EXT_TO_TAG.get(ext.as_str()).copied()
}

/// Sniff leading bytes and map the detected signature to a type tag.
pub fn sniff_bytes(bytes: &[u8]) -> Option<TypeTag> {
    infer::get(bytes).and_then(|kind| type_tag_from_signature(kind.mime_type()))
}

/// Sniff a file's content. Read errors and unknown signatures both yield `None`.
pub fn sniff_file(path: &Path) -> Option<TypeTag> {
    match infer::get_from_path(path) {
        Ok(Some(kind)) => {
            let tag = type_tag_from_signature(kind.mime_type());
            if tag.is_none() {
                tracing::debug!(
                    path = %path.display(),
                    signature = kind.mime_type(),
                    "Content signature not in table, falling back to extension"
                );
            }
            tag
        }
        Ok(None) => None,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Content sniffing failed, falling back to extension");
            None
        }
    }
}

/// Resolve a file to its type tag: content signature, then extension, then rejection.
///
/// # Errors
///
/// Returns `DocingestError::UnsupportedFormat` when neither the signature nor the
/// extension is in the supported set.
pub fn resolve_type_tag(path: impl AsRef<Path>) -> Result<TypeTag> {
    let path = path.as_ref();

    if let Some(tag) = sniff_file(path) {
        return Ok(tag);
    }

    resolve_by_extension(path)
}

/// Resolve by extension alone, skipping content inspection.
pub fn resolve_by_extension(path: impl AsRef<Path>) -> Result<TypeTag> {
    let path = path.as_ref();

    let extension = path.extension().and_then(|ext| ext.to_str());
    if let Some(ext) = extension
        && let Some(tag) = type_tag_from_extension(ext)
    {
        return Ok(tag);
    }

    Err(DocingestError::UnsupportedFormat(match extension {
        Some(ext) => format!("Unsupported file type: .{} ({})", ext.to_ascii_lowercase(), path.display()),
        None => format!("Unsupported file type: {}", path.display()),
    }))
}

/// Every supported extension, aliases included, sorted.
pub fn supported_extensions() -> Vec<&'static str> {
    let mut exts: Vec<&'static str> = EXT_TO_TAG.keys().copied().collect();
    exts.sort_unstable();
    exts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, b'I', b'H', b'D', b'R'];

    #[test]
    fn test_extension_aliases_normalize() {
        assert_eq!(type_tag_from_extension("jpg"), Some(TypeTag::Jpeg));
        assert_eq!(type_tag_from_extension("JPEG"), Some(TypeTag::Jpeg));
        assert_eq!(type_tag_from_extension("tif"), Some(TypeTag::Tiff));
        assert_eq!(type_tag_from_extension(".csv"), Some(TypeTag::Csv));
        assert_eq!(type_tag_from_extension("odt"), None);
    }

    #[test]
    fn test_signature_lookup_ignores_parameters() {
        assert_eq!(type_tag_from_signature("text/plain; charset=utf-8"), Some(TypeTag::Txt));
        assert_eq!(type_tag_from_signature("IMAGE/JPG"), Some(TypeTag::Jpeg));
        assert_eq!(type_tag_from_signature("application/zip"), None);
    }

    #[test]
    fn test_resolve_by_extension_all_supported() {
        let dir = tempdir().unwrap();
        for ext in supported_extensions() {
            let path = dir.path().join(format!("sample.{}", ext));
            File::create(&path).unwrap();
            let tag = resolve_type_tag(&path).unwrap();
            assert!(tag.extensions().contains(&ext), "{} resolved to {}", ext, tag);
        }
    }

    #[test]
    fn test_content_signature_wins_over_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("picture.txt");
        fs::write(&path, PNG_HEADER).unwrap();
        assert_eq!(resolve_type_tag(&path).unwrap(), TypeTag::Png);
    }

    #[test]
    fn test_unknown_signature_falls_back_to_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.TXT");
        fs::write(&path, b"plain words").unwrap();
        assert_eq!(resolve_type_tag(&path).unwrap(), TypeTag::Txt);
    }

    #[test]
    fn test_missing_file_falls_through_to_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("does-not-exist.pdf");
        assert_eq!(resolve_type_tag(&path).unwrap(), TypeTag::Pdf);
    }

    #[test]
    fn test_unsupported_extension_and_signature() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("archive.xyz");
        fs::write(&path, b"\x00\x01\x02 opaque").unwrap();
        let err = resolve_type_tag(&path).unwrap_err();
        assert!(err.is_unsupported_format());
        assert!(err.to_string().contains(".xyz"));
    }

    #[test]
    fn test_no_extension_is_unsupported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("README");
        fs::write(&path, b"plain words").unwrap();
        assert!(resolve_type_tag(&path).unwrap_err().is_unsupported_format());
    }

    #[test]
    fn test_sniff_bytes() {
        assert_eq!(sniff_bytes(PNG_HEADER), Some(TypeTag::Png));
        assert_eq!(sniff_bytes(b"%PDF-1.7\n"), Some(TypeTag::Pdf));
        assert_eq!(sniff_bytes(b"hello"), None);
    }
}
