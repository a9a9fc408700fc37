//! Text analysis over extracted content: classification and entity extraction.
//!
//! These consume [`crate::types::ExtractionResult::text_content`] and never take part in
//! extraction itself.

pub mod classifier;
pub mod entities;
pub mod registry;

pub use classifier::{Classification, Classifier, KeywordClassifier};
pub use entities::{Entity, extract_entities};
pub use registry::{ModelRegistry, Readiness};
