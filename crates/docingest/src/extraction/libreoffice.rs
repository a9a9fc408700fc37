//! Legacy converter bridge.
//!
//! Formats without a native parser (`doc`, `rtf`, `ppt`, `xls`) are converted to plain
//! text by a headless office suite:
//!
//! ```text
//! soffice --headless --convert-to txt:Text --outdir <scratch>/out <scratch>/document.<ext>
//! ```
//!
//! and `<scratch>/out/document.txt` is read back. The scratch directory is owned by one
//! conversion and removed on every exit path.
//!
//! # System Requirement
//!
//! LibreOffice must be installed:
//! - **macOS**: `brew install --cask libreoffice`
//! - **Linux**: `apt install libreoffice`
//! - **Windows**: `winget install LibreOffice.LibreOffice`
//!
//! A custom location can be set in `[converter] binary` or through the
//! `DOCINGEST_LIBREOFFICE_PATH` environment variable.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::process::Command;

use crate::core::config::ConverterConfig;
use crate::core::io::{DocumentHandle, ScratchDir};
use crate::core::process::{describe_failure, executable_candidates, first_existing, run_with_timeout};
use crate::types::{ConvertedMetadata, FormatMetadata, RawExtraction, TypeTag};
use crate::{DocingestError, Result};

/// Value of `converted_via` in the result metadata.
pub const CONVERTED_VIA: &str = "libreoffice";

/// Filter argument selecting plain-text output.
pub const TEXT_FILTER: &str = "txt:Text";

const SCRATCH_PREFIX: &str = "docingest_convert";
const INPUT_STEM: &str = "document";

const ENV_VARS: &[&str] = &["DOCINGEST_LIBREOFFICE_PATH", "SOFFICE_PATH", "LIBREOFFICE_PATH"];

#[cfg(target_os = "macos")]
const WELL_KNOWN_PATHS: &[&str] = &[
    "/Applications/LibreOffice.app/Contents/MacOS/soffice",
    "/opt/homebrew/bin/soffice",
];
#[cfg(target_os = "windows")]
const WELL_KNOWN_PATHS: &[&str] = &[
    "C:\\Program Files\\LibreOffice\\program\\soffice.exe",
    "C:\\Program Files (x86)\\LibreOffice\\program\\soffice.exe",
];
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const WELL_KNOWN_PATHS: &[&str] = &[
    "/usr/bin/soffice",
    "/usr/lib/libreoffice/program/soffice",
    "/opt/libreoffice/program/soffice",
    "/snap/bin/libreoffice",
];

fn install_message() -> String {
    "LibreOffice (soffice/libreoffice) is required for legacy formats (.doc, .rtf, .ppt, .xls). \
Install: macOS: 'brew install --cask libreoffice', Linux: 'apt install libreoffice', \
Windows: 'winget install LibreOffice.LibreOffice'. \
For a custom location set DOCINGEST_LIBREOFFICE_PATH to the soffice executable."
        .to_string()
}

/// Converts a source document into a plain-text file.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    fn name(&self) -> &str;

    /// Convert `source` to text, writing `<source stem>.txt` into `out_dir`.
    ///
    /// Implementations report a failed run as `DocingestError::Conversion`; the caller
    /// checks that the output file exists.
    async fn convert_to_text(&self, source: &Path, out_dir: &Path) -> Result<()>;

    async fn check_available(&self) -> Result<String>;
}

/// [`DocumentConverter`] that shells out to `soffice --headless`.
#[derive(Debug, Clone)]
pub struct SofficeConverter {
    binary: Option<PathBuf>,
    timeout_secs: u64,
}

impl SofficeConverter {
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    pub fn locate(&self) -> Result<PathBuf> {
        first_existing(executable_candidates(
            self.binary.as_deref(),
            ENV_VARS,
            WELL_KNOWN_PATHS,
            &["soffice", "libreoffice", "soffice.exe"],
        ))
        .ok_or_else(|| DocingestError::MissingDependency(install_message()))
    }
}

#[async_trait]
impl DocumentConverter for SofficeConverter {
    fn name(&self) -> &str {
        CONVERTED_VIA
    }

    async fn convert_to_text(&self, source: &Path, out_dir: &Path) -> Result<()> {
        let soffice = self.locate()?;

        let mut command = Command::new(&soffice);
        command
            .arg("--headless")
            .arg("--convert-to")
            .arg(TEXT_FILTER)
            .arg("--outdir")
            .arg(out_dir)
            .arg(source);

        let output = run_with_timeout(command, "LibreOffice conversion", self.timeout_secs).await?;

        if !output.status.success() {
            return Err(DocingestError::conversion(format!(
                "LibreOffice conversion failed with {}",
                describe_failure(&output)
            )));
        }

        Ok(())
    }

    async fn check_available(&self) -> Result<String> {
        let soffice = self.locate()?;

        let mut command = Command::new(&soffice);
        command.arg("--version");
        let output = run_with_timeout(command, "LibreOffice", 30).await?;

        if !output.status.success() {
            return Err(DocingestError::MissingDependency(format!(
                "LibreOffice executable '{}' failed on '--version': {}",
                soffice.display(),
                describe_failure(&output)
            )));
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(if version.is_empty() {
            soffice.display().to_string()
        } else {
            version
        })
    }
}

/// Run a legacy document through `converter` and read the text back.
///
/// An empty output file is a valid, empty document. A missing output file, a failed
/// run or a timeout is a `Conversion` error.
#[tracing::instrument(skip_all, fields(path = %handle.path().display(), source_format = %tag))]
pub async fn extract_legacy(
    handle: &DocumentHandle,
    tag: TypeTag,
    converter: &dyn DocumentConverter,
    scratch_parent: &Path,
) -> Result<RawExtraction> {
    let scratch = ScratchDir::create(scratch_parent, SCRATCH_PREFIX).await?;
    let out_dir = scratch.path().join("out");
    fs::create_dir_all(&out_dir).await?;

    let source = scratch.path().join(format!("{}.{}", INPUT_STEM, tag.as_str()));
    fs::copy(handle.path(), &source).await?;

    converter.convert_to_text(&source, &out_dir).await.inspect_err(|e| {
        tracing::error!(converter = converter.name(), error = %e, "Legacy conversion failed");
    })?;

    let output_path = out_dir.join(format!("{}.txt", INPUT_STEM));
    let bytes = match fs::read(&output_path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DocingestError::conversion(format!(
                "{} finished but produced no output file ({})",
                converter.name(),
                output_path.display()
            )));
        }
        Err(e) => {
            return Err(DocingestError::conversion_with_source(
                format!("Failed to read converted output {}", output_path.display()),
                e,
            ));
        }
    };

    let text = String::from_utf8_lossy(&bytes).into_owned();
    tracing::debug!(chars = text.len(), "Legacy conversion produced text");

    Ok(RawExtraction::new(
        text,
        FormatMetadata::Converted(ConvertedMetadata {
            converted_via: CONVERTED_VIA.to_string(),
            source_format: tag,
        }),
    ))
}
