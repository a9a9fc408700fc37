//! Language profile selection.

use serde::{Deserialize, Serialize};

/// OCR language profile. Caller language codes map onto exactly one profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrLanguage {
    #[default]
    French,
    English,
}

impl OcrLanguage {
    /// Map a two-letter code to a profile; unrecognized codes select French.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => OcrLanguage::English,
            "fr" => OcrLanguage::French,
            other => {
                tracing::debug!(code = other, "Unrecognized language code, using French profile");
                OcrLanguage::French
            }
        }
    }

    /// Tesseract traineddata name.
    pub fn tesseract_code(self) -> &'static str {
        match self {
            OcrLanguage::French => "fra",
            OcrLanguage::English => "eng",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            OcrLanguage::French => "fr",
            OcrLanguage::English => "en",
        }
    }
}
