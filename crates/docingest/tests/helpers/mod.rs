//! Fixture builders and fake collaborators shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use docingest::ocr::{OcrError, OcrOutput};
use docingest::{
    DocingestError, DocumentConverter, ExtractionConfig, OcrEngine, OcrLanguage, OcrToken, PageRasterizer, Result,
};
use image::{GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use zip::write::{SimpleFileOptions, ZipWriter};

/// Config whose scratch and staging files all land in `dir`.
pub fn config_in(dir: &Path) -> ExtractionConfig {
    ExtractionConfig {
        staging_dir: Some(dir.to_path_buf()),
        ..ExtractionConfig::default()
    }
}

/// Entries left in `dir`, sorted.
pub fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn zip_parts(parts: &[(&str, String)]) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = SimpleFileOptions::default();
        for (name, content) in parts {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buffer
}

/// One PDF page per entry, each holding a single text run.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let kids: Vec<Object> = pages
        .iter()
        .map(|text| {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 11.into()]),
                    Operation::new("Td", vec![50.into(), 750.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            })
            .into()
        })
        .collect();

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Rapport annuel"),
        "Author" => Object::string_literal("Service Qualite"),
    });
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Workbook with one worksheet per `(name, rows)`, every cell an inline string.
pub fn xlsx_with_sheets(sheets: &[(&str, &[&[&str]])]) -> Vec<u8> {
    const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
    const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    let mut sheet_entries = String::new();
    let mut rels = String::new();
    let mut overrides = String::new();
    let mut parts: Vec<(String, String)> = Vec::new();

    for (i, (name, rows)) in sheets.iter().enumerate() {
        let n = i + 1;
        sheet_entries.push_str(&format!(r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#, name, n, n));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{}/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            n, REL_NS, n
        ));
        overrides.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            n
        ));

        let mut data = String::new();
        for (r, row) in rows.iter().enumerate() {
            data.push_str(&format!(r#"<row r="{}">"#, r + 1));
            for (c, value) in row.iter().enumerate() {
                let col = (b'A' + c as u8) as char;
                data.push_str(&format!(
                    r#"<c r="{}{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    col,
                    r + 1,
                    value
                ));
            }
            data.push_str("</row>");
        }
        parts.push((
            format!("xl/worksheets/sheet{}.xml", n),
            format!(r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="{}"><sheetData>{}</sheetData></worksheet>"#, MAIN_NS, data),
        ));
    }

    let content_types = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>{}</Types>"#,
        overrides
    );
    let root_rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
        REL_NS
    );
    let workbook = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="{}" xmlns:r="{}"><sheets>{}</sheets></workbook>"#,
        MAIN_NS, REL_NS, sheet_entries
    );
    let workbook_rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        rels
    );

    let mut all: Vec<(&str, String)> = vec![
        ("[Content_Types].xml", content_types),
        ("_rels/.rels", root_rels),
        ("xl/workbook.xml", workbook),
        ("xl/_rels/workbook.xml.rels", workbook_rels),
    ];
    for (name, content) in &parts {
        all.push((name.as_str(), content.clone()));
    }
    zip_parts(&all)
}

/// Presentation with one text shape per slide, one paragraph per line.
pub fn pptx_with_slides(slides: &[&[&str]]) -> Vec<u8> {
    const P_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
    const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

    let mut rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    let mut parts: Vec<(String, String)> = Vec::new();

    for (i, lines) in slides.iter().enumerate() {
        let n = i + 1;
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
            n + 1,
            n
        ));
        let paragraphs: String = lines
            .iter()
            .map(|line| format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", line))
            .collect();
        parts.push((
            format!("ppt/slides/slide{}.xml", n),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><p:sld xmlns:p="{}" xmlns:a="{}"><p:cSld><p:spTree><p:sp><p:txBody>{}</p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#,
                P_NS, A_NS, paragraphs
            ),
        ));
    }
    rels.push_str("</Relationships>");

    let mut all: Vec<(&str, String)> = vec![
        (
            "ppt/presentation.xml",
            format!(r#"<?xml version="1.0" encoding="UTF-8"?><p:presentation xmlns:p="{}"/>"#, P_NS),
        ),
        ("ppt/_rels/presentation.xml.rels", rels),
    ];
    for (name, content) in &parts {
        all.push((name.as_str(), content.clone()));
    }
    zip_parts(&all)
}

/// Word document with one paragraph per entry and optional core properties.
pub fn docx_with_paragraphs(paragraphs: &[&str], title: Option<&str>) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut all: Vec<(&str, String)> = vec![("word/document.xml", document)];
    if let Some(title) = title {
        all.push((
            "docProps/core.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>{}</dc:title><dc:creator>Jeanne Martin</dc:creator></cp:coreProperties>"#,
                title
            ),
        ));
    }
    zip_parts(&all)
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = GrayImage::from_pixel(width, height, Luma([255u8]));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

/// A small RGB image encoded in `format`.
pub fn encoded_image(format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(8, 8, |x, y| if (x + y) % 2 == 0 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) });
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, format).unwrap();
    bytes.into_inner()
}

#[derive(Clone, Copy, PartialEq)]
enum RasterMode {
    Write,
    Fail,
    ListOnly,
}

/// Rasterizer writing one blank page per call, or failing on demand.
pub struct FakeRasterizer {
    pub calls: AtomicUsize,
    mode: RasterMode,
}

impl FakeRasterizer {
    pub fn new() -> Self {
        Self::with_mode(RasterMode::Write)
    }

    pub fn failing() -> Self {
        Self::with_mode(RasterMode::Fail)
    }

    /// Reports a rendered page without writing it.
    pub fn missing_page() -> Self {
        Self::with_mode(RasterMode::ListOnly)
    }

    fn with_mode(mode: RasterMode) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            mode,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageRasterizer for FakeRasterizer {
    fn name(&self) -> &str {
        "fake-rasterizer"
    }

    async fn rasterize(&self, _pdf: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.mode == RasterMode::Fail {
            return Err(DocingestError::MissingDependency("pdftoppm not installed".to_string()));
        }
        let path = out_dir.join("page-1.png");
        if self.mode == RasterMode::Write {
            std::fs::write(&path, png(32, 32))?;
        }
        Ok(vec![path])
    }

    async fn check_available(&self) -> Result<String> {
        Ok("fake".to_string())
    }
}

/// Engine answering every image with fixed text and token confidences.
pub struct FakeEngine {
    text: String,
    confidences: Vec<f64>,
    fail: bool,
}

impl FakeEngine {
    pub fn answering(text: &str, confidences: &[f64]) -> Self {
        Self {
            text: text.to_string(),
            confidences: confidences.to_vec(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            text: String::new(),
            confidences: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl OcrEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake-engine"
    }

    async fn recognize(&self, _image: GrayImage, _language: OcrLanguage) -> std::result::Result<OcrOutput, OcrError> {
        if self.fail {
            return Err(OcrError::ProcessingFailed("engine crashed".to_string()));
        }
        Ok(OcrOutput {
            text: self.text.clone(),
            tokens: self
                .confidences
                .iter()
                .map(|&confidence| OcrToken {
                    text: "w".to_string(),
                    confidence,
                })
                .collect(),
        })
    }

    async fn check_available(&self) -> std::result::Result<String, OcrError> {
        Ok("fake".to_string())
    }
}

/// Converter that writes fixed text, or fails, and remembers where it was pointed.
pub struct FakeConverter {
    output: Option<&'static str>,
    pub seen: Mutex<Option<(PathBuf, PathBuf)>>,
}

impl FakeConverter {
    pub fn writing(text: &'static str) -> Self {
        Self {
            output: Some(text),
            seen: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            output: None,
            seen: Mutex::new(None),
        }
    }

    pub fn scratch_dir(&self) -> Option<PathBuf> {
        self.seen
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|(source, _)| source.parent().map(Path::to_path_buf))
    }
}

#[async_trait]
impl DocumentConverter for FakeConverter {
    fn name(&self) -> &str {
        "fake-converter"
    }

    async fn convert_to_text(&self, source: &Path, out_dir: &Path) -> Result<()> {
        *self.seen.lock().unwrap() = Some((source.to_path_buf(), out_dir.to_path_buf()));
        match self.output {
            Some(text) => {
                let stem = source.file_stem().unwrap().to_string_lossy();
                std::fs::write(out_dir.join(format!("{}.txt", stem)), text)?;
                Ok(())
            }
            None => Err(DocingestError::conversion("soffice exited with status 1")),
        }
    }

    async fn check_available(&self) -> Result<String> {
        Ok("fake".to_string())
    }
}
