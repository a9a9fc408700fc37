use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::DocingestError;

/// Closed set of document formats the pipeline accepts.
///
/// Every document resolves to exactly one tag or the pipeline fails with
/// [`DocingestError::UnsupportedFormat`]. The serialized form is the canonical
/// lowercase name (`"pdf"`, `"jpeg"`, ...), which is what `metadata.file_type` carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Pdf,
    Docx,
    Doc,
    Txt,
    Rtf,
    Pptx,
    Ppt,
    Xlsx,
    Xls,
    Csv,
    Png,
    Jpeg,
    Tiff,
    Bmp,
    Gif,
}

/// Format family of a [`TypeTag`]; drives which extraction strategy runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentFamily {
    Document,
    StructuredDocument,
    LegacyDocument,
    PlainText,
    RichText,
    Presentation,
    LegacyPresentation,
    Spreadsheet,
    LegacySpreadsheet,
    TabularText,
    Image,
}

impl TypeTag {
    pub const ALL: [TypeTag; 15] = [
        TypeTag::Pdf,
        TypeTag::Docx,
        TypeTag::Doc,
        TypeTag::Txt,
        TypeTag::Rtf,
        TypeTag::Pptx,
        TypeTag::Ppt,
        TypeTag::Xlsx,
        TypeTag::Xls,
        TypeTag::Csv,
        TypeTag::Png,
        TypeTag::Jpeg,
        TypeTag::Tiff,
        TypeTag::Bmp,
        TypeTag::Gif,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::Pdf => "pdf",
            TypeTag::Docx => "docx",
            TypeTag::Doc => "doc",
            TypeTag::Txt => "txt",
            TypeTag::Rtf => "rtf",
            TypeTag::Pptx => "pptx",
            TypeTag::Ppt => "ppt",
            TypeTag::Xlsx => "xlsx",
            TypeTag::Xls => "xls",
            TypeTag::Csv => "csv",
            TypeTag::Png => "png",
            TypeTag::Jpeg => "jpeg",
            TypeTag::Tiff => "tiff",
            TypeTag::Bmp => "bmp",
            TypeTag::Gif => "gif",
        }
    }

    pub fn family(self) -> DocumentFamily {
        match self {
            TypeTag::Pdf => DocumentFamily::Document,
            TypeTag::Docx => DocumentFamily::StructuredDocument,
            TypeTag::Doc => DocumentFamily::LegacyDocument,
            TypeTag::Txt => DocumentFamily::PlainText,
            TypeTag::Rtf => DocumentFamily::RichText,
            TypeTag::Pptx => DocumentFamily::Presentation,
            TypeTag::Ppt => DocumentFamily::LegacyPresentation,
            TypeTag::Xlsx => DocumentFamily::Spreadsheet,
            TypeTag::Xls => DocumentFamily::LegacySpreadsheet,
            TypeTag::Csv => DocumentFamily::TabularText,
            TypeTag::Png | TypeTag::Jpeg | TypeTag::Tiff | TypeTag::Bmp | TypeTag::Gif => DocumentFamily::Image,
        }
    }

    /// File extensions accepted for this tag, canonical spelling first.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            TypeTag::Jpeg => &["jpeg", "jpg"],
            TypeTag::Tiff => &["tiff", "tif"],
            TypeTag::Pdf => &["pdf"],
            TypeTag::Docx => &["docx"],
            TypeTag::Doc => &["doc"],
            TypeTag::Txt => &["txt"],
            TypeTag::Rtf => &["rtf"],
            TypeTag::Pptx => &["pptx"],
            TypeTag::Ppt => &["ppt"],
            TypeTag::Xlsx => &["xlsx"],
            TypeTag::Xls => &["xls"],
            TypeTag::Csv => &["csv"],
            TypeTag::Png => &["png"],
            TypeTag::Bmp => &["bmp"],
            TypeTag::Gif => &["gif"],
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            TypeTag::Pdf => crate::core::mime::PDF_MIME_TYPE,
            TypeTag::Docx => crate::core::mime::DOCX_MIME_TYPE,
            TypeTag::Doc => crate::core::mime::DOC_MIME_TYPE,
            TypeTag::Txt => crate::core::mime::PLAIN_TEXT_MIME_TYPE,
            TypeTag::Rtf => crate::core::mime::RTF_MIME_TYPE,
            TypeTag::Pptx => crate::core::mime::PPTX_MIME_TYPE,
            TypeTag::Ppt => crate::core::mime::PPT_MIME_TYPE,
            TypeTag::Xlsx => crate::core::mime::XLSX_MIME_TYPE,
            TypeTag::Xls => crate::core::mime::XLS_MIME_TYPE,
            TypeTag::Csv => crate::core::mime::CSV_MIME_TYPE,
            TypeTag::Png => "image/png",
            TypeTag::Jpeg => "image/jpeg",
            TypeTag::Tiff => "image/tiff",
            TypeTag::Bmp => "image/bmp",
            TypeTag::Gif => "image/gif",
        }
    }

    pub fn is_image(self) -> bool {
        self.family() == DocumentFamily::Image
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = DocingestError;

    /// Parses a canonical name or a known alias (`jpg`, `tif`, `.pdf`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::core::mime::type_tag_from_extension(s)
            .ok_or_else(|| DocingestError::UnsupportedFormat(format!("Unknown type tag: {}", s)))
    }
}

/// Recoverable sub-failure recorded on an otherwise successful extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// OCR was required but disabled by configuration.
    OcrSkipped,
    /// The OCR engine or the page rasterizer failed; text from that step is empty.
    OcrFailed { message: String },
    /// One page, slide or sheet could not be read and was skipped.
    PartialExtraction { unit: String, index: usize, message: String },
    /// The PDF text layer could not be read at all.
    TextLayerUnavailable { message: String },
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degradation::OcrSkipped => write!(f, "OCR skipped"),
            Degradation::OcrFailed { message } => write!(f, "OCR failed: {}", message),
            Degradation::PartialExtraction { unit, index, message } => {
                write!(f, "{} {} skipped: {}", unit, index, message)
            }
            Degradation::TextLayerUnavailable { message } => write!(f, "Text layer unavailable: {}", message),
        }
    }
}

/// Output of one extraction strategy, before the envelope adds pipeline-level fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RawExtraction {
    pub text: String,
    pub metadata: FormatMetadata,
    pub degradations: Vec<Degradation>,
}

impl RawExtraction {
    pub fn new(text: impl Into<String>, metadata: FormatMetadata) -> Self {
        Self {
            text: text.into(),
            metadata,
            degradations: Vec::new(),
        }
    }

    pub fn with_degradation(mut self, degradation: Degradation) -> Self {
        self.degradations.push(degradation);
        self
    }
}

/// Format-specific metadata.
///
/// Serializes with a `format_type` discriminator and is flattened into [`Metadata`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format_type", rename_all = "snake_case")]
pub enum FormatMetadata {
    Pdf(PdfMetadata),
    Docx(DocxMetadata),
    Converted(ConvertedMetadata),
    Text(TextMetadata),
    Csv(CsvMetadata),
    Presentation(PresentationMetadata),
    Spreadsheet(SpreadsheetMetadata),
    Image(ImageMetadata),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfMetadata {
    pub pages: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(default)]
    pub ocr_fallback_used: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocxMetadata {
    pub paragraphs: usize,
    pub tables: usize,
    pub images: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
}

/// Metadata of documents read back through the legacy converter bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertedMetadata {
    pub converted_via: String,
    pub source_format: TypeTag,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextMetadata {
    pub line_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvMetadata {
    pub format: String,
    pub rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresentationMetadata {
    pub slides: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpreadsheetMetadata {
    pub sheets: usize,
    pub sheet_names: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// OCR statistics for an image input. All fields are absent when OCR was skipped or failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_dimensions: Option<ImageDimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_text_blocks: Option<usize>,
}

/// Extraction result metadata.
///
/// `file_size`, `file_type` and `original_filename` are always present; the remaining
/// keys depend on which strategy produced the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub file_size: u64,
    pub file_type: TypeTag,
    pub original_filename: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatMetadata>,

    /// Caller-supplied extra fields.
    #[serde(flatten)]
    pub additional: HashMap<String, serde_json::Value>,
}

/// The uniform result record produced once per document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub text_content: String,
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degradations: Vec<Degradation>,
}

impl ExtractionResult {
    /// True when a recoverable sub-failure reduced the extracted content.
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

/// One recognized token and its engine confidence (0-100, negative when unknown).
#[derive(Debug, Clone, PartialEq)]
pub struct OcrToken {
    pub text: String,
    pub confidence: f64,
}

/// Per-token confidences captured during one OCR invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfidenceSample {
    values: Vec<f64>,
}

impl ConfidenceSample {
    pub fn from_tokens(tokens: &[OcrToken]) -> Self {
        Self {
            values: tokens.iter().map(|t| t.confidence).collect(),
        }
    }

    /// Arithmetic mean of confidences strictly greater than zero, 0 when there are none.
    pub fn mean(&self) -> f64 {
        let (sum, count) = self
            .values
            .iter()
            .filter(|c| **c > 0.0)
            .fold((0.0_f64, 0_usize), |(sum, count), c| (sum + c.min(100.0), count + 1));

        if count == 0 {
            return 0.0;
        }
        (sum / count as f64).clamp(0.0, 100.0)
    }

    pub fn count_above(&self, threshold: f64) -> usize {
        self.values.iter().filter(|c| **c > threshold).count()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
