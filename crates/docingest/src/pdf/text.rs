//! Direct text-layer extraction with lopdf.

use lopdf::Document;

use super::error::{PdfError, Result};

/// Text layer of a whole document, one marked section per non-blank page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageTexts {
    pub text: String,
    /// Characters of trimmed page text, markers excluded.
    pub char_count: usize,
    pub page_count: usize,
    /// Pages (1-based) whose content stream could not be decoded.
    pub failures: Vec<(u32, String)>,
}

pub fn page_marker(page_number: u32) -> String {
    format!("\n--- Page {} ---\n", page_number)
}

/// Parse a PDF, decrypting it with the empty password when needed.
pub fn load_document(bytes: &[u8]) -> Result<Document> {
    let mut document = Document::load_mem(bytes)?;

    if document.is_encrypted() && document.decrypt("").is_err() {
        return Err(PdfError::PasswordRequired);
    }

    Ok(document)
}

/// Read every page's text layer in page order.
///
/// A page that fails to decode is recorded in [`PageTexts::failures`] and skipped.
/// Fails only when the document has pages and none of them could be read.
pub fn extract_page_texts(document: &Document) -> Result<PageTexts> {
    let pages = document.get_pages();
    let mut result = PageTexts {
        page_count: pages.len(),
        ..PageTexts::default()
    };

    for page_number in pages.keys().copied() {
        match document.extract_text(&[page_number]) {
            Ok(raw) => {
                let page_text = raw.trim();
                if page_text.is_empty() {
                    continue;
                }
                result.text.push_str(&page_marker(page_number));
                result.text.push_str(page_text);
                result.char_count += page_text.chars().count();
            }
            Err(e) => result.failures.push((page_number, e.to_string())),
        }
    }

    if result.page_count > 0 && result.failures.len() == result.page_count {
        let (page, message) = &result.failures[0];
        return Err(PdfError::TextExtractionFailed(format!(
            "no readable page (page {}: {})",
            page, message
        )));
    }

    Ok(result)
}
