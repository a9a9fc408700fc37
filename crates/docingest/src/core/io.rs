//! Document handles and scoped filesystem resources.
//!
//! - [`DocumentHandle`] points at a readable local file and carries its size and original name.
//! - [`StagedDocument`] owns a staged copy of uploaded bytes and deletes it when dropped.
//! - [`ScratchDir`] owns a uniquely named working directory for external tools and removes
//!   it when dropped.
//!
//! Removal in `Drop` is synchronous so that a directory never outlives the pipeline run
//! that created it, whichever way that run exits.

use crate::types::TypeTag;
use crate::{DocingestError, Result};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;

/// A readable file on local storage, as seen by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentHandle {
    path: PathBuf,
    declared_type: Option<TypeTag>,
    size: u64,
    original_name: String,
}

impl DocumentHandle {
    /// Stat `path` and build a handle. The original name defaults to the file name.
    ///
    /// # Errors
    ///
    /// Returns `DocingestError::Validation` if the file does not exist or is not a regular file.
    /// Other I/O errors bubble up unchanged.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let metadata = match fs::metadata(path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DocingestError::validation(format!(
                    "File does not exist: {}",
                    path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        if !metadata.is_file() {
            return Err(DocingestError::validation(format!(
                "Not a regular file: {}",
                path.display()
            )));
        }

        let original_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            declared_type: None,
            size: metadata.len(),
            original_name,
        })
    }

    pub fn with_declared_type(mut self, declared_type: Option<TypeTag>) -> Self {
        self.declared_type = declared_type;
        self
    }

    pub fn with_original_name(mut self, name: impl Into<String>) -> Self {
        self.original_name = name.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn declared_type(&self) -> Option<TypeTag> {
        self.declared_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }
}

/// Uploaded bytes written to the staging directory for one pipeline run.
///
/// The staged file is deleted when this value is dropped.
#[derive(Debug)]
pub struct StagedDocument {
    handle: DocumentHandle,
}

impl StagedDocument {
    /// Write `bytes` to `{staging_dir}/{unix_ts}_{id}_{sanitized_name}`.
    ///
    /// The handle keeps `original_name` unchanged so it can be reported in the envelope.
    pub async fn stage(bytes: &[u8], original_name: &str, staging_dir: &Path) -> Result<Self> {
        fs::create_dir_all(staging_dir).await?;

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let unique = uuid::Uuid::new_v4().simple().to_string();
        let file_name = format!("{}_{}_{}", timestamp, &unique[..8], sanitize_filename(original_name));
        let path = staging_dir.join(file_name);

        fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Staged upload");

        let handle = match DocumentHandle::open(&path).await {
            Ok(h) => h.with_original_name(original_name),
            Err(e) => {
                let _ = std::fs::remove_file(&path);
                return Err(e);
            }
        };

        Ok(Self { handle })
    }

    pub fn handle(&self) -> &DocumentHandle {
        &self.handle
    }

    pub fn path(&self) -> &Path {
        self.handle.path()
    }
}

impl Drop for StagedDocument {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(self.handle.path())
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %self.handle.path().display(), error = %e, "Failed to remove staged file");
        }
    }
}

/// Uniquely named working directory, removed when dropped.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Create `{parent}/{prefix}_{uuid}`.
    pub async fn create(parent: &Path, prefix: &str) -> Result<Self> {
        let path = parent.join(format!("{}_{}", prefix, uuid::Uuid::new_v4().simple()));
        fs::create_dir_all(&path).await?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove scratch directory");
        }
    }
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_filename(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        "upload".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("report 2024.pdf"), "report_2024.pdf");
        assert_eq!(sanitize_filename("facture_été.docx"), "facture__t_.docx");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(""), "upload");
        assert_eq!(sanitize_filename(".."), "upload");
    }

    #[tokio::test]
    async fn test_open_missing_file_is_validation_error() {
        let dir = tempdir().unwrap();
        let err = DocumentHandle::open(dir.path().join("missing.txt")).await.unwrap_err();
        assert!(matches!(err, DocingestError::Validation { .. }));
        assert!(err.to_string().contains("File does not exist"));
    }

    #[tokio::test]
    async fn test_open_directory_is_rejected() {
        let dir = tempdir().unwrap();
        let err = DocumentHandle::open(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("Not a regular file"));
    }

    #[tokio::test]
    async fn test_open_reads_size_and_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, "hello\nworld").unwrap();

        let handle = DocumentHandle::open(&path).await.unwrap();
        assert_eq!(handle.size(), 11);
        assert_eq!(handle.original_name(), "hello.txt");
        assert_eq!(handle.declared_type(), None);
    }

    #[tokio::test]
    async fn test_staged_document_removed_on_drop() {
        let dir = tempdir().unwrap();
        let staged = StagedDocument::stage(b"abc", "my file.txt", dir.path()).await.unwrap();
        let path = staged.path().to_path_buf();

        assert!(path.exists());
        assert_eq!(staged.handle().original_name(), "my file.txt");
        assert_eq!(staged.handle().size(), 3);
        assert!(path.file_name().unwrap().to_string_lossy().ends_with("_my_file.txt"));

        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_scratch_dir_removed_on_drop() {
        let dir = tempdir().unwrap();
        let scratch = ScratchDir::create(dir.path(), "docingest_test").await.unwrap();
        let path = scratch.path().to_path_buf();
        std::fs::write(path.join("page-1.png"), b"x").unwrap();

        assert!(path.is_dir());
        drop(scratch);
        assert!(!path.exists());
    }
}
