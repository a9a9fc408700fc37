//! Error types for docingest.
//!
//! Every fallible library operation returns [`Result`], backed by [`DocingestError`].
//!
//! # Fatal vs. recoverable
//!
//! Only fatal outcomes travel as `Err`:
//! - `UnsupportedFormat` - neither content signature nor extension resolved to a type tag
//! - `Conversion` - the external converter failed, timed out, or produced no output file
//! - `Io` - real system errors, always bubbled up unchanged
//!
//! Recoverable sub-failures (an OCR engine error, a single unreadable page or sheet) never
//! become an `Err`. They are recorded as a [`crate::types::Degradation`] on the result instead,
//! so callers can tell a degraded extraction apart from a failed one.
//!
//! # Example
//!
//! ```rust
//! use docingest::{DocingestError, Result};
//!
//! fn read_non_empty(path: &str) -> Result<String> {
//!     let content = std::fs::read_to_string(path)?;
//!     if content.is_empty() {
//!         return Err(DocingestError::validation(format!("File is empty: {}", path)));
//!     }
//!     Ok(content)
//! }
//! ```
use thiserror::Error;

/// Result type alias using `DocingestError`.
pub type Result<T> = std::result::Result<T, DocingestError>;

/// Main error type for all docingest operations.
#[derive(Debug, Error)]
pub enum DocingestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing error: {message}")]
    Parsing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Conversion error: {message}")]
    Conversion {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Image processing error: {message}")]
    ImageProcessing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "excel")]
impl From<calamine::Error> for DocingestError {
    fn from(err: calamine::Error) -> Self {
        DocingestError::Parsing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for DocingestError {
    fn from(err: serde_json::Error) -> Self {
        DocingestError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "pdf")]
impl From<crate::pdf::error::PdfError> for DocingestError {
    fn from(err: crate::pdf::error::PdfError) -> Self {
        DocingestError::Parsing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<crate::ocr::error::OcrError> for DocingestError {
    fn from(err: crate::ocr::error::OcrError) -> Self {
        DocingestError::Ocr {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl DocingestError {
    error_constructor!(parsing, Parsing);
    error_constructor!(conversion, Conversion);
    error_constructor!(ocr, Ocr);
    error_constructor!(validation, Validation);
    error_constructor!(image_processing, ImageProcessing);
    error_constructor!(serialization, Serialization);

    /// Whether this error signals an unsupported document type.
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, Self::UnsupportedFormat(_))
    }
}
