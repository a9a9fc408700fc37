use std::fmt;

/// OCR-specific errors.
///
/// These never escape the OCR path as fatal pipeline errors; the pipeline records them
/// as a [`crate::types::Degradation::OcrFailed`] annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum OcrError {
    EngineUnavailable(String),
    TesseractInitializationFailed(String),
    InvalidConfiguration(String),
    ImageProcessingFailed(String),
    RasterizationFailed(String),
    ProcessingFailed(String),
}

impl fmt::Display for OcrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EngineUnavailable(msg) => write!(f, "OCR engine unavailable: {}", msg),
            Self::TesseractInitializationFailed(msg) => {
                write!(f, "Tesseract initialization failed: {}", msg)
            }
            Self::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            Self::ImageProcessingFailed(msg) => write!(f, "Image processing failed: {}", msg),
            Self::RasterizationFailed(msg) => write!(f, "Page rasterization failed: {}", msg),
            Self::ProcessingFailed(msg) => write!(f, "OCR processing failed: {}", msg),
        }
    }
}

impl std::error::Error for OcrError {}

// No From<std::io::Error>: I/O failures stay DocingestError::Io.
