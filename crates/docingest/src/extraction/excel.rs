//! Spreadsheet extraction using the `calamine` library.
//!
//! Every sheet contributes a `--- Feuille: {name} ---` marker followed by one line per
//! non-blank row, cells joined by tabs. Sheets keep workbook order.
//!
//! # Example
//!
//! ```rust,no_run
//! use docingest::extraction::excel::parse_spreadsheet;
//!
//! # fn example() -> docingest::Result<()> {
//! let bytes = std::fs::read("budget.xlsx")?;
//! let raw = parse_spreadsheet(&bytes)?;
//! println!("{}", raw.text);
//! # Ok(())
//! # }
//! ```
use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use std::fmt::Write as FmtWrite;
use std::io::Cursor;

use crate::types::{Degradation, FormatMetadata, RawExtraction, SpreadsheetMetadata};
use crate::{DocingestError, Result};

pub fn sheet_marker(name: &str) -> String {
    format!("\n--- Feuille: {} ---\n", name)
}

/// Walk all sheets of an xlsx/xls workbook.
///
/// A sheet that cannot be read is skipped and recorded as a `PartialExtraction`
/// degradation; a workbook that cannot be opened at all is a parsing error.
pub fn parse_spreadsheet(bytes: &[u8]) -> Result<RawExtraction> {
    // Only format errors are wrapped; real I/O errors bubble up unchanged.
    let mut workbook = match open_workbook_auto_from_rs(Cursor::new(bytes)) {
        Ok(wb) => wb,
        Err(calamine::Error::Io(io_err)) if io_err.kind() != std::io::ErrorKind::InvalidData => {
            return Err(io_err.into());
        }
        Err(e) => {
            return Err(DocingestError::parsing_with_source("Failed to open workbook", e));
        }
    };

    let sheet_names = workbook.sheet_names();
    let mut text = String::new();
    let mut degradations = Vec::new();

    for (index, name) in sheet_names.iter().enumerate() {
        match workbook.worksheet_range(name) {
            Ok(range) => {
                text.push_str(&sheet_marker(name));
                append_rows(&mut text, &range);
            }
            Err(e) => {
                tracing::warn!(sheet = %name, error = %e, "Skipping unreadable sheet");
                degradations.push(Degradation::PartialExtraction {
                    unit: "sheet".to_string(),
                    index: index + 1,
                    message: format!("{}: {}", name, e),
                });
            }
        }
    }

    Ok(RawExtraction {
        text,
        metadata: FormatMetadata::Spreadsheet(SpreadsheetMetadata {
            sheets: sheet_names.len(),
            sheet_names,
        }),
        degradations,
    })
}

fn append_rows(buffer: &mut String, range: &Range<Data>) {
    let mut row_text = String::new();

    for row in range.rows() {
        row_text.clear();
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                row_text.push('\t');
            }
            format_cell_value_into(&mut row_text, cell);
        }

        if row_text.trim().is_empty() {
            continue;
        }
        buffer.push_str(&row_text);
        buffer.push('\n');
    }
}

#[inline]
fn format_cell_value_into(buffer: &mut String, data: &Data) {
    match data {
        Data::Empty => {}
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => buffer.push_str(s),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                let _ = write!(buffer, "{}", *f as i64);
            } else {
                let _ = write!(buffer, "{}", f);
            }
        }
        Data::Int(i) => {
            let _ = write!(buffer, "{}", i);
        }
        Data::Bool(b) => buffer.push_str(if *b { "True" } else { "False" }),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => {
                let _ = write!(buffer, "{}", datetime);
            }
            None => {
                let _ = write!(buffer, "{}", dt.as_f64());
            }
        },
        Data::Error(e) => {
            let _ = write!(buffer, "{}", e);
        }
    }
}
