//! Presentation extraction.
//!
//! Slides are read in presentation order (from `ppt/_rels/presentation.xml.rels`, or by
//! slide number when the relationships part is missing). Every text-bearing shape
//! contributes its paragraphs followed by a newline; tables contribute one tab-joined
//! line per row.

use roxmltree::Node;

use super::office::{A_NAMESPACE, OfficeArchive, P_NAMESPACE, parse_xml, utf8};
use crate::types::{Degradation, FormatMetadata, PresentationMetadata, RawExtraction};
use crate::{DocingestError, Result};

const PRESENTATION_RELS: &str = "ppt/_rels/presentation.xml.rels";
const SLIDE_REL_TYPE_SUFFIX: &str = "/relationships/slide";

pub fn parse_presentation(bytes: &[u8]) -> Result<RawExtraction> {
    let mut archive = OfficeArchive::open(bytes, "PPTX")?;
    let slide_paths = find_slide_paths(&mut archive)?;

    let mut text = String::new();
    let mut degradations = Vec::new();

    for (index, path) in slide_paths.iter().enumerate() {
        match read_slide(&mut archive, path) {
            Ok(slide_text) => text.push_str(&slide_text),
            Err(DocingestError::Io(e)) => return Err(DocingestError::Io(e)),
            Err(e) => {
                tracing::warn!(slide = index + 1, path = %path, error = %e, "Skipping unreadable slide");
                degradations.push(Degradation::PartialExtraction {
                    unit: "slide".to_string(),
                    index: index + 1,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(RawExtraction {
        text,
        metadata: FormatMetadata::Presentation(PresentationMetadata {
            slides: slide_paths.len(),
        }),
        degradations,
    })
}

fn find_slide_paths(archive: &mut OfficeArchive<'_>) -> Result<Vec<String>> {
    if let Some(rels) = archive.read(PRESENTATION_RELS)? {
        match parse_presentation_rels(&rels) {
            Ok(paths) if !paths.is_empty() => return Ok(paths),
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %e, "Unusable presentation relationships, scanning slide parts"),
        }
    }

    let mut numbered: Vec<(u32, String)> = archive
        .part_names()
        .into_iter()
        .filter_map(|name| {
            let number = name
                .strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?
                .parse::<u32>()
                .ok()?;
            Some((number, name))
        })
        .collect();

    numbered.sort_by_key(|(number, _)| *number);
    Ok(numbered.into_iter().map(|(_, name)| name).collect())
}

fn parse_presentation_rels(rels: &[u8]) -> Result<Vec<String>> {
    let xml = utf8(rels, "presentation rels")?;
    let doc = parse_xml(xml, "presentation rels")?;

    let mut slide_paths = Vec::new();
    for node in doc.descendants() {
        if node.has_tag_name("Relationship")
            && let Some(rel_type) = node.attribute("Type")
            && rel_type.ends_with(SLIDE_REL_TYPE_SUFFIX)
            && let Some(target) = node.attribute("Target")
        {
            let target = target.strip_prefix('/').unwrap_or(target);
            slide_paths.push(if target.starts_with("ppt/") {
                target.to_string()
            } else {
                format!("ppt/{}", target)
            });
        }
    }

    Ok(slide_paths)
}

fn read_slide(archive: &mut OfficeArchive<'_>, path: &str) -> Result<String> {
    let bytes = archive.read_required(path)?;
    let xml = utf8(&bytes, path)?;
    let doc = parse_xml(xml, path)?;

    let sp_tree = doc
        .descendants()
        .find(|n| is_p(n, "spTree"))
        .ok_or_else(|| DocingestError::parsing(format!("No <p:spTree> in {}", path)))?;

    let mut text = String::new();
    for child in sp_tree.children().filter(Node::is_element) {
        append_shape(&mut text, child);
    }
    Ok(text)
}

fn append_shape(buffer: &mut String, node: Node<'_, '_>) {
    if is_p(&node, "sp") {
        if let Some(tx_body) = node.children().find(|n| is_p(n, "txBody")) {
            buffer.push_str(&text_body(tx_body));
            buffer.push('\n');
        }
    } else if is_p(&node, "graphicFrame") {
        if let Some(tbl) = node.descendants().find(|n| is_a(n, "tbl")) {
            append_table(buffer, tbl);
        }
    } else if is_p(&node, "grpSp") {
        for child in node.children().filter(Node::is_element) {
            append_shape(buffer, child);
        }
    }
}

fn append_table(buffer: &mut String, tbl: Node<'_, '_>) {
    for tr in tbl.children().filter(|n| is_a(n, "tr")) {
        let cells: Vec<String> = tr
            .children()
            .filter(|n| is_a(n, "tc"))
            .map(|tc| {
                tc.children()
                    .find(|n| is_a(n, "txBody"))
                    .map(text_body)
                    .unwrap_or_default()
            })
            .collect();
        buffer.push_str(&cells.join("\t"));
        buffer.push('\n');
    }
}

/// Paragraph texts of a text body joined by newlines.
fn text_body(tx_body: Node<'_, '_>) -> String {
    tx_body
        .children()
        .filter(|n| is_a(n, "p"))
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn paragraph_text(p: Node<'_, '_>) -> String {
    let mut text = String::new();
    for node in p.descendants() {
        if is_a(&node, "t") {
            text.push_str(node.text().unwrap_or_default());
        } else if is_a(&node, "br") {
            text.push('\n');
        }
    }
    text
}

fn is_p(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(P_NAMESPACE)
}

fn is_a(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(A_NAMESPACE)
}
