use crate::types::OcrToken;

/// Minimum number of tab-separated fields in a Tesseract TSV row.
pub const TSV_MIN_FIELDS: usize = 12;
/// TSV `level` value of word rows.
pub const TSV_WORD_LEVEL: u32 = 5;

/// Extract word tokens and their confidences from Tesseract TSV output.
///
/// The header row, non-word rows and malformed rows are skipped. A confidence that
/// does not parse is recorded as `-1.0`, which the averaging step ignores.
pub fn parse_tsv_tokens(tsv_data: &str) -> Vec<OcrToken> {
    let mut tokens = Vec::new();

    for (line_num, line) in tsv_data.lines().enumerate() {
        if line_num == 0 && line.starts_with("level") {
            continue;
        }

        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < TSV_MIN_FIELDS {
            continue;
        }

        let level = fields[0].trim().parse::<u32>().unwrap_or(0);
        if level != TSV_WORD_LEVEL {
            continue;
        }

        tokens.push(OcrToken {
            text: fields[11].trim().to_string(),
            confidence: fields[10].trim().parse::<f64>().unwrap_or(-1.0),
        });
    }

    tokens
}
