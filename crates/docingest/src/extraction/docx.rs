//! Word-processing (docx) extraction over `word/document.xml`.

use roxmltree::Node;

use super::office::{OfficeArchive, W_NAMESPACE, WP_NAMESPACE, extract_core_properties, parse_xml, utf8};
use crate::types::{DocxMetadata, FormatMetadata, RawExtraction};
use crate::{DocingestError, Result};

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract body-level paragraph text plus structure counts and core properties.
pub fn parse_docx(bytes: &[u8]) -> Result<RawExtraction> {
    let mut archive = OfficeArchive::open(bytes, "DOCX")?;

    let document = archive.read_required(DOCUMENT_PART)?;
    let xml = utf8(&document, DOCUMENT_PART)?;
    let doc = parse_xml(xml, DOCUMENT_PART)?;

    let body = doc
        .descendants()
        .find(|n| is_w(n, "body"))
        .ok_or_else(|| DocingestError::parsing("No <w:body> in word/document.xml"))?;

    let mut paragraphs = Vec::new();
    let mut tables = 0;
    for child in body.children().filter(Node::is_element) {
        if is_w(&child, "p") {
            paragraphs.push(paragraph_text(child));
        } else if is_w(&child, "tbl") {
            tables += 1;
        }
    }

    let images = body
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "inline" && n.tag_name().namespace() == Some(WP_NAMESPACE))
        .count();

    // Missing or broken core properties never fail the document.
    let core = extract_core_properties(&mut archive).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Ignoring unreadable docx core properties");
        Default::default()
    });

    Ok(RawExtraction::new(
        paragraphs.join("\n"),
        FormatMetadata::Docx(DocxMetadata {
            paragraphs: paragraphs.len(),
            tables,
            images,
            title: core.title,
            author: core.creator,
            subject: core.subject,
            created: core.created,
            modified: core.modified,
        }),
    ))
}

fn paragraph_text(p: Node<'_, '_>) -> String {
    let mut text = String::new();
    for node in p.descendants() {
        if is_w(&node, "t") {
            text.push_str(node.text().unwrap_or_default());
        } else if is_w(&node, "tab") {
            text.push('\t');
        } else if is_w(&node, "br") || is_w(&node, "cr") {
            text.push('\n');
        }
    }
    text
}

fn is_w(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(W_NAMESPACE)
}
