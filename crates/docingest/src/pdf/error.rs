use std::fmt;

/// Failures reading a PDF's text layer or document information.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfError {
    InvalidPdf(String),
    PasswordRequired,
    TextExtractionFailed(String),
    MetadataExtractionFailed(String),
}

impl fmt::Display for PdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfError::InvalidPdf(msg) => write!(f, "Invalid PDF: {}", msg),
            PdfError::PasswordRequired => write!(f, "PDF is password-protected"),
            PdfError::TextExtractionFailed(msg) => write!(f, "Text extraction failed: {}", msg),
            PdfError::MetadataExtractionFailed(msg) => {
                write!(f, "Metadata extraction failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for PdfError {}

// No From<std::io::Error>: I/O failures stay DocingestError::Io.

impl From<lopdf::Error> for PdfError {
    fn from(err: lopdf::Error) -> Self {
        PdfError::InvalidPdf(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PdfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(PdfError::InvalidPdf("bad xref".to_string()).to_string(), "Invalid PDF: bad xref");
        assert_eq!(PdfError::PasswordRequired.to_string(), "PDF is password-protected");
    }

    #[test]
    fn test_into_docingest_error_is_parsing() {
        let err: crate::DocingestError = PdfError::TextExtractionFailed("page 2".to_string()).into();
        assert!(matches!(err, crate::DocingestError::Parsing { .. }));
        assert!(err.to_string().contains("page 2"));
    }
}
