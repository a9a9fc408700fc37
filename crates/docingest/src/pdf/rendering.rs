//! Page rasterization for the PDF OCR sub-path.
//!
//! Rendering is delegated to an external tool (`pdftoppm` from poppler). The
//! [`PageRasterizer`] trait is the seam the pipeline depends on, so a stub can stand in
//! for the tool in tests.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::core::config::RasterizerConfig;
use crate::core::process::{describe_failure, executable_candidates, first_existing, run_with_timeout};
use crate::{DocingestError, Result};

/// File name prefix handed to the rasterizer; pages come back as `page-N.png`.
pub const PAGE_PREFIX: &str = "page";

#[async_trait]
pub trait PageRasterizer: Send + Sync {
    fn name(&self) -> &str;

    /// Render every page of `pdf` into `out_dir` and return the images in page order.
    async fn rasterize(&self, pdf: &Path, out_dir: &Path) -> Result<Vec<PathBuf>>;

    async fn check_available(&self) -> Result<String>;
}

/// [`PageRasterizer`] backed by `pdftoppm -png`.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    binary: Option<PathBuf>,
    timeout_secs: u64,
}

impl PdftoppmRasterizer {
    pub fn from_config(config: &RasterizerConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    /// Configured path, then `DOCINGEST_PDFTOPPM_PATH`, then `PATH`.
    pub fn locate(&self) -> Option<PathBuf> {
        first_existing(executable_candidates(
            self.binary.as_deref(),
            &["DOCINGEST_PDFTOPPM_PATH"],
            &[],
            &["pdftoppm", "pdftoppm.exe"],
        ))
    }

    fn program(&self) -> PathBuf {
        self.locate().unwrap_or_else(|| PathBuf::from("pdftoppm"))
    }
}

#[async_trait]
impl PageRasterizer for PdftoppmRasterizer {
    fn name(&self) -> &str {
        "pdftoppm"
    }

    async fn rasterize(&self, pdf: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut command = Command::new(self.program());
        command.arg("-png").arg(pdf).arg(out_dir.join(PAGE_PREFIX));

        let output = run_with_timeout(command, "pdftoppm", self.timeout_secs).await?;
        if !output.status.success() {
            return Err(DocingestError::conversion(format!(
                "pdftoppm failed with {}",
                describe_failure(&output)
            )));
        }

        let pages = collect_page_images(out_dir).await?;
        if pages.is_empty() {
            return Err(DocingestError::conversion("pdftoppm produced no page images"));
        }
        Ok(pages)
    }

    async fn check_available(&self) -> Result<String> {
        self.locate()
            .map(|path| path.display().to_string())
            .ok_or_else(|| DocingestError::MissingDependency("pdftoppm not found".to_string()))
    }
}

/// Rendered `page-N.png` files in `dir`, sorted by `N`.
///
/// pdftoppm zero-pads the page number to the width of the page count, so the number is
/// parsed rather than compared as text.
pub async fn collect_page_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut numbered = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if let Some(number) = page_number(&path) {
            numbered.push((number, path));
        }
    }

    numbered.sort_by_key(|(number, _)| *number);
    Ok(numbered.into_iter().map(|(_, path)| path).collect())
}

fn page_number(path: &Path) -> Option<u32> {
    if path.extension().and_then(|e| e.to_str()) != Some("png") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix(PAGE_PREFIX)?.strip_prefix('-')?.parse().ok()
}
