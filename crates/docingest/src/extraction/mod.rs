pub mod image;
pub mod libreoffice;
pub mod text;

#[cfg(feature = "excel")]
pub mod excel;

#[cfg(feature = "office")]
pub mod docx;

#[cfg(feature = "office")]
pub mod office;

#[cfg(feature = "pdf")]
pub mod pdf;

#[cfg(feature = "office")]
pub mod pptx;

pub use image::extract_image;
pub use libreoffice::{DocumentConverter, SofficeConverter, extract_legacy};
pub use text::{parse_csv, parse_text};

#[cfg(feature = "excel")]
pub use excel::parse_spreadsheet;

#[cfg(feature = "office")]
pub use docx::parse_docx;

#[cfg(feature = "office")]
pub use office::{CoreProperties, extract_core_properties};

#[cfg(feature = "pdf")]
pub use pdf::extract_pdf;

#[cfg(feature = "office")]
pub use pptx::parse_presentation;
