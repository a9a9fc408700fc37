//! Main extraction entry points.
//!
//! - [`extract_file`] - extract a file already on local storage
//! - [`extract_bytes`] - stage uploaded bytes, extract them, delete the staged copy
//! - [`batch_extract_files`] - extract many files concurrently, one result per file
//!
//! The free functions build a [`Pipeline`] with the default external tools; the methods
//! of the same name run on a caller-configured pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::core::config::ExtractionConfig;
use crate::core::io::{DocumentHandle, StagedDocument};
use crate::core::pipeline::Pipeline;
use crate::types::{ExtractionResult, TypeTag};
use crate::{DocingestError, Result};

/// Extract content from a file.
///
/// # Arguments
///
/// * `path` - Path to the file to extract
/// * `declared_type` - Optional type override. If None, the type is resolved from the content, then the extension
/// * `config` - Extraction configuration
///
/// # Errors
///
/// Returns `DocingestError::Validation` if the file doesn't exist.
/// Returns `DocingestError::UnsupportedFormat` if the type cannot be resolved.
/// Returns `DocingestError::Conversion` if a legacy document could not be converted.
/// Returns `DocingestError::Io` for file I/O errors (these always bubble up).
///
/// # Example
///
/// ```rust,no_run
/// use docingest::core::extractor::extract_file;
/// use docingest::core::config::ExtractionConfig;
///
/// # async fn example() -> docingest::Result<()> {
/// let config = ExtractionConfig::default();
/// let result = extract_file("document.pdf", None, &config).await?;
/// println!("{}", result.text_content);
/// # Ok(())
/// # }
/// ```
pub async fn extract_file(
    path: impl AsRef<Path>,
    declared_type: Option<TypeTag>,
    config: &ExtractionConfig,
) -> Result<ExtractionResult> {
    Pipeline::new(config.clone()).extract_file(path, declared_type).await
}

/// Extract content from uploaded bytes.
///
/// The bytes are staged under `config.staging_dir` and the staged copy is removed before
/// this function returns, whether extraction succeeded or not.
pub async fn extract_bytes(
    content: &[u8],
    original_name: &str,
    declared_type: Option<TypeTag>,
    config: &ExtractionConfig,
) -> Result<ExtractionResult> {
    Pipeline::new(config.clone())
        .extract_bytes(content, original_name, declared_type)
        .await
}

/// Extract many files concurrently. See [`Pipeline::batch_extract_files`].
pub async fn batch_extract_files(
    paths: Vec<impl AsRef<Path>>,
    config: &ExtractionConfig,
) -> Vec<Result<ExtractionResult>> {
    Pipeline::new(config.clone()).batch_extract_files(paths).await
}

impl Pipeline {
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn extract_file(
        &self,
        path: impl AsRef<Path>,
        declared_type: Option<TypeTag>,
    ) -> Result<ExtractionResult> {
        let handle = DocumentHandle::open(path.as_ref()).await?.with_declared_type(declared_type);
        self.run(&handle).await.inspect_err(|e| log_fatal(&handle, e))
    }

    #[tracing::instrument(skip_all, fields(original_name = %original_name, size = content.len()))]
    pub async fn extract_bytes(
        &self,
        content: &[u8],
        original_name: &str,
        declared_type: Option<TypeTag>,
    ) -> Result<ExtractionResult> {
        let staged = StagedDocument::stage(content, original_name, &self.config().staging_dir()).await?;
        let handle = staged.handle().clone().with_declared_type(declared_type);

        let result = self.run(&handle).await.inspect_err(|e| log_fatal(&handle, e));
        drop(staged);
        result
    }

    /// Extract `paths` concurrently, at most `max_concurrent_extractions` at a time.
    ///
    /// Results come back in input order. A failed file yields its own `Err` and never
    /// aborts the rest of the batch.
    #[tracing::instrument(skip_all, fields(batch_size = paths.len()))]
    pub async fn batch_extract_files(&self, paths: Vec<impl AsRef<Path>>) -> Vec<Result<ExtractionResult>> {
        if paths.is_empty() {
            return Vec::new();
        }

        let semaphore = Arc::new(Semaphore::new(self.config().concurrency_limit()));
        let mut tasks = JoinSet::new();
        let total = paths.len();

        for (index, path) in paths.into_iter().enumerate() {
            let path: PathBuf = path.as_ref().to_path_buf();
            let pipeline = self.clone();
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => pipeline.extract_file(&path, None).await,
                    Err(e) => Err(DocingestError::Other(format!("Batch semaphore closed: {}", e))),
                };
                (index, result)
            });
        }

        let mut results: Vec<Option<Result<ExtractionResult>>> = (0..total).map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(join_err) => {
                    tracing::error!(error = %join_err, "Batch extraction task panicked");
                }
            }
        }

        results
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| Err(DocingestError::Other("Extraction task panicked".to_string()))))
            .collect()
    }
}

fn log_fatal(handle: &DocumentHandle, error: &DocingestError) {
    tracing::error!(
        file = handle.original_name(),
        path = %handle.path().display(),
        error = %error,
        "Extraction failed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> ExtractionConfig {
        ExtractionConfig {
            staging_dir: Some(dir.to_path_buf()),
            max_concurrent_extractions: Some(2),
            ..ExtractionConfig::default()
        }
    }

    #[tokio::test]
    async fn test_extract_file_missing_is_validation_error() {
        let dir = tempdir().unwrap();
        let err = extract_file(dir.path().join("gone.txt"), None, &config_in(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, DocingestError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_extract_bytes_removes_staged_copy() {
        let staging = tempdir().unwrap();
        let config = config_in(staging.path());

        let result = extract_bytes(b"hello\nworld", "note.txt", None, &config).await.unwrap();
        assert_eq!(result.text_content, "hello\nworld");
        assert_eq!(result.metadata.original_filename, "note.txt");
        assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 0);

        let err = extract_bytes(b"???", "mystery.bin", None, &config).await.unwrap_err();
        assert!(err.is_unsupported_format());
        assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_batch_keeps_order_and_isolates_failures() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.unknown");
        let c = dir.path().join("c.csv");
        std::fs::write(&a, "first").unwrap();
        std::fs::write(&b, "???").unwrap();
        std::fs::write(&c, "x,y\n").unwrap();

        let results = batch_extract_files(vec![&a, &b, &c], &config_in(dir.path())).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().text_content, "first");
        assert!(results[1].as_ref().unwrap_err().is_unsupported_format());
        assert_eq!(results[2].as_ref().unwrap().text_content, "x\ty\n");
    }

    #[tokio::test]
    async fn test_batch_empty() {
        let dir = tempdir().unwrap();
        let paths: Vec<PathBuf> = Vec::new();
        assert!(batch_extract_files(paths, &config_in(dir.path())).await.is_empty());
    }
}
