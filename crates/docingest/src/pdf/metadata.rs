//! Document information dictionary.

use lopdf::{Dictionary, Document, Object};

use crate::types::PdfMetadata;

/// Page count plus the `Info` fields. Missing or undecodable entries stay `None`.
pub fn extract_metadata(document: &Document) -> PdfMetadata {
    let mut metadata = PdfMetadata {
        pages: document.get_pages().len(),
        ..PdfMetadata::default()
    };

    let Some(info) = info_dictionary(document) else {
        return metadata;
    };

    metadata.title = string_entry(document, info, b"Title");
    metadata.author = string_entry(document, info, b"Author");
    metadata.subject = string_entry(document, info, b"Subject");
    metadata.creator = string_entry(document, info, b"Creator");
    metadata.creation_date = string_entry(document, info, b"CreationDate");

    metadata
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

fn info_dictionary(document: &Document) -> Option<&Dictionary> {
    let info = document.trailer.get(b"Info").ok()?;
    resolve(document, info)?.as_dict().ok()
}

fn string_entry(document: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    let value = resolve(document, dict.get(key).ok()?)?;
    match value {
        Object::String(bytes, _) => {
            let decoded = decode_text_string(bytes);
            let trimmed = decoded.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    }
}

/// Decode a PDF text string: UTF-16BE when BOM-prefixed, otherwise lossy UTF-8.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{StringFormat, dictionary};

    #[test]
    fn test_decode_utf16be_with_bom() {
        let bytes = [0xFE, 0xFF, 0x00, b'R', 0x00, 0xE9, 0x00, b's'];
        assert_eq!(decode_text_string(&bytes), "Rés");
    }

    #[test]
    fn test_decode_plain_bytes() {
        assert_eq!(decode_text_string(b"Annual report"), "Annual report");
        assert_eq!(decode_text_string(&[0xEF, 0xBB, 0xBF, b'x']), "x");
    }

    #[test]
    fn test_info_dictionary_by_reference() {
        let mut doc = Document::with_version("1.5");
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::String(b"Quarterly figures".to_vec(), StringFormat::Literal),
            "Author" => Object::String(vec![0xFE, 0xFF, 0x00, b'A', 0x00, b'n'], StringFormat::Hexadecimal),
            "Subject" => Object::String(b"   ".to_vec(), StringFormat::Literal),
            "CreationDate" => Object::string_literal("D:20240131120000Z"),
        });
        doc.trailer.set("Info", info_id);

        let metadata = extract_metadata(&doc);
        assert_eq!(metadata.pages, 0);
        assert_eq!(metadata.title.as_deref(), Some("Quarterly figures"));
        assert_eq!(metadata.author.as_deref(), Some("An"));
        assert_eq!(metadata.subject, None);
        assert_eq!(metadata.creator, None);
        assert_eq!(metadata.creation_date.as_deref(), Some("D:20240131120000Z"));
    }

    #[test]
    fn test_missing_info_leaves_fields_empty() {
        let doc = Document::with_version("1.5");
        let metadata = extract_metadata(&doc);
        assert_eq!(metadata.title, None);
        assert!(!metadata.ocr_fallback_used);
    }
}
