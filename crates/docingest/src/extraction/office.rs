//! Office Open XML container access shared by the presentation and word-processing
//! strategies.

use std::io::{Cursor, Read};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::{DocingestError, Result};

pub const A_NAMESPACE: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const P_NAMESPACE: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub const W_NAMESPACE: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const WP_NAMESPACE: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";

/// A zip-packaged Office document held in memory.
pub struct OfficeArchive<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> OfficeArchive<'a> {
    pub fn open(bytes: &'a [u8], kind: &str) -> Result<Self> {
        match ZipArchive::new(Cursor::new(bytes)) {
            Ok(archive) => Ok(Self { archive }),
            Err(ZipError::Io(io_err)) if io_err.kind() != std::io::ErrorKind::InvalidData => Err(io_err.into()),
            Err(e) => Err(DocingestError::parsing(format!(
                "Failed to read {} archive (invalid format): {}",
                kind, e
            ))),
        }
    }

    /// Read a part by name. `Ok(None)` when the part does not exist.
    pub fn read(&mut self, path: &str) -> Result<Option<Vec<u8>>> {
        let mut file = match self.archive.by_name(path) {
            Ok(f) => f,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(ZipError::Io(io_err)) => return Err(io_err.into()),
            Err(e) => return Err(DocingestError::parsing(format!("Zip error reading {}: {}", path, e))),
        };

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| DocingestError::parsing(format!("Failed to read {}: {}", path, e)))?;
        Ok(Some(contents))
    }

    /// Read a part that must exist.
    pub fn read_required(&mut self, path: &str) -> Result<Vec<u8>> {
        self.read(path)?
            .ok_or_else(|| DocingestError::parsing(format!("Missing part in archive: {}", path)))
    }

    pub fn part_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }
}

/// Parse XML bytes, naming `part` in the error.
pub fn parse_xml<'x>(xml: &'x str, part: &str) -> Result<roxmltree::Document<'x>> {
    roxmltree::Document::parse(xml).map_err(|e| DocingestError::parsing(format!("Failed to parse {}: {}", part, e)))
}

pub fn utf8<'x>(bytes: &'x [u8], part: &str) -> Result<&'x str> {
    std::str::from_utf8(bytes).map_err(|_| DocingestError::parsing(format!("Invalid UTF-8 in {}", part)))
}

/// Subset of `docProps/core.xml` reported in the result metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreProperties {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub created: Option<String>,
    pub modified: Option<String>,
}

/// Read core properties; a missing `docProps/core.xml` yields empty properties.
pub fn extract_core_properties(archive: &mut OfficeArchive<'_>) -> Result<CoreProperties> {
    let Some(bytes) = archive.read("docProps/core.xml")? else {
        return Ok(CoreProperties::default());
    };

    let xml = utf8(&bytes, "core.xml")?;
    let doc = parse_xml(xml, "core.xml")?;
    let root = doc.root_element();

    Ok(CoreProperties {
        title: element_text(root, "title"),
        subject: element_text(root, "subject"),
        creator: element_text(root, "creator"),
        created: element_text(root, "created"),
        modified: element_text(root, "modified"),
    })
}

/// Trimmed text of the first descendant named `local_name`, if non-empty.
fn element_text(node: roxmltree::Node<'_, '_>, local_name: &str) -> Option<String> {
    node.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == local_name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
