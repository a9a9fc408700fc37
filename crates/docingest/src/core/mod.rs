//! Core extraction orchestration.
//!
//! - **Entry points**: [`extract_file`], [`extract_bytes`], [`batch_extract_files`]
//! - **Format resolution**: content sniffing, then the extension table ([`mime`])
//! - **Dispatch**: one strategy per document family ([`dispatch`])
//! - **Envelope**: uniform result record ([`envelope`])
//! - **Configuration**: TOML/YAML/JSON loading and discovery ([`config`])
//! - **I/O**: document handles, staged uploads, scratch directories ([`io`])
//!
//! # Example
//!
//! ```rust,no_run
//! use docingest::core::extractor::extract_file;
//! use docingest::core::config::ExtractionConfig;
//!
//! # async fn example() -> docingest::Result<()> {
//! let config = ExtractionConfig::default();
//! let result = extract_file("scan.png", None, &config).await?;
//! for degradation in &result.degradations {
//!     eprintln!("degraded: {}", degradation);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod extractor;
pub mod fingerprint;
pub mod formats;
pub mod io;
pub mod mime;
pub mod pipeline;
pub mod process;

pub use config::{ConverterConfig, ExtractionConfig, OcrConfig, RasterizerConfig};
pub use extractor::{batch_extract_files, extract_bytes, extract_file};
pub use fingerprint::{cache_key, fingerprint_bytes, fingerprint_file};
pub use formats::{DependencyReport, DependencyStatus, FormatInfo, check_dependencies, supported_formats};
pub use io::{DocumentHandle, StagedDocument};
pub use pipeline::Pipeline;
