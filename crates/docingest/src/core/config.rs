//! Configuration loading and management.
//!
//! This module provides utilities for loading extraction configuration from TOML, YAML
//! or JSON files, and for discovering a `docingest.toml` in the directory hierarchy.

use crate::{DocingestError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the file searched for by [`ExtractionConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "docingest.toml";

/// Main extraction configuration.
///
/// # Example
///
/// ```rust
/// use docingest::core::config::ExtractionConfig;
///
/// let config = ExtractionConfig::default();
/// assert!(config.ocr.enabled);
/// assert_eq!(config.ocr.language, "fr");
///
/// // let config = ExtractionConfig::from_toml_file("docingest.toml")?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// OCR fallback behaviour
    #[serde(default)]
    pub ocr: OcrConfig,

    /// Legacy converter bridge (headless office suite)
    #[serde(default)]
    pub converter: ConverterConfig,

    /// PDF page rasterizer used by the OCR fallback
    #[serde(default)]
    pub rasterizer: RasterizerConfig,

    /// Directory for staged uploads and scratch directories (None = OS temp dir)
    #[serde(default)]
    pub staging_dir: Option<PathBuf>,

    /// Upper bound on concurrent extractions in batch mode (None = number of CPUs)
    #[serde(default)]
    pub max_concurrent_extractions: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Attempt OCR for images and text-poor PDFs
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Two-letter language code (`fr`, `en`); anything else selects French
    #[serde(default = "default_language")]
    pub language: String,

    /// PDFs with fewer characters than this on their text layer go through OCR
    #[serde(default = "default_min_text_length")]
    pub min_text_length: usize,

    /// Directory holding `*.traineddata` files
    #[serde(default)]
    pub tessdata_path: Option<PathBuf>,

    /// Tesseract page segmentation mode
    #[serde(default = "default_psm")]
    pub page_segmentation_mode: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterConfig {
    #[serde(default)]
    pub binary: Option<PathBuf>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterizerConfig {
    #[serde(default)]
    pub binary: Option<PathBuf>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_language() -> String {
    "fr".to_string()
}

fn default_min_text_length() -> usize {
    100
}

fn default_psm() -> i32 {
    6
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            ocr: OcrConfig::default(),
            converter: ConverterConfig::default(),
            rasterizer: RasterizerConfig::default(),
            staging_dir: None,
            max_concurrent_extractions: None,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: default_language(),
            min_text_length: default_min_text_length(),
            tessdata_path: None,
            page_segmentation_mode: default_psm(),
        }
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            binary: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for RasterizerConfig {
    fn default() -> Self {
        Self {
            binary: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ExtractionConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `DocingestError::Validation` if the file can't be read or is invalid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        toml::from_str(&content)
            .map_err(|e| DocingestError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        serde_yaml_ng::from_str(&content)
            .map_err(|e| DocingestError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        serde_json::from_str(&content)
            .map_err(|e| DocingestError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration, picking the format from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("toml") => Self::from_toml_file(path),
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(DocingestError::validation(format!(
                "Unsupported config file format: {} (expected .toml, .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }

    /// Discover configuration file in parent directories.
    ///
    /// Searches for `docingest.toml` in the current directory and its parents.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let current = std::env::current_dir().map_err(DocingestError::Io)?;
        Self::discover_from(&current)
    }

    /// Like [`discover`](Self::discover), starting at `start` instead of the current directory.
    pub fn discover_from(start: &Path) -> Result<Option<Self>> {
        let mut current = start.to_path_buf();

        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                return Ok(Some(Self::from_toml_file(candidate)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }

    /// Directory used for staged files and scratch directories.
    pub fn staging_dir(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn concurrency_limit(&self) -> usize {
        self.max_concurrent_extractions
            .unwrap_or_else(num_cpus::get)
            .max(1)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| DocingestError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
