//! Plain text and CSV extraction.
//!
//! # Example
//!
//! ```rust
//! use docingest::extraction::text::parse_csv;
//!
//! let raw = parse_csv(b"name,amount\n\"Dupont, SA\",12\n").unwrap();
//! assert_eq!(raw.text, "name\tamount\nDupont, SA\t12\n");
//! ```

use crate::types::{CsvMetadata, FormatMetadata, RawExtraction, TextMetadata};
use crate::{DocingestError, Result};

/// Return the content unchanged, decoding invalid UTF-8 lossily.
pub fn parse_text(bytes: &[u8]) -> RawExtraction {
    let text = String::from_utf8_lossy(bytes).into_owned();
    let line_count = text.lines().count();

    RawExtraction::new(text, FormatMetadata::Text(TextMetadata { line_count }))
}

/// Re-emit every CSV record as its fields joined by tabs, one record per line.
///
/// Fields may be double-quoted; a doubled quote inside a quoted field is a literal quote.
/// Records may have different field counts.
pub fn parse_csv(bytes: &[u8]) -> Result<RawExtraction> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut text = String::new();
    let mut rows = 0;

    for record in reader.byte_records() {
        let record =
            record.map_err(|e| DocingestError::parsing_with_source(format!("Invalid CSV at record {}", rows + 1), e))?;

        let fields: Vec<String> = record
            .iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect();
        text.push_str(&fields.join("\t"));
        text.push('\n');
        rows += 1;
    }

    Ok(RawExtraction::new(
        text,
        FormatMetadata::Csv(CsvMetadata {
            format: "csv".to_string(),
            rows,
        }),
    ))
}
