//! Content fingerprints and cache keys.
//!
//! The fingerprint is the SHA-256 of the file bytes, so the same document maps to the
//! same key in every process. The cache itself lives outside this crate.

use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

use crate::Result;
use crate::core::config::ExtractionConfig;
use crate::ocr::OcrLanguage;

const READ_CHUNK: usize = 64 * 1024;

/// Hex SHA-256 of a file, read in chunks.
pub async fn fingerprint_file(path: impl AsRef<Path>) -> Result<String> {
    let mut file = tokio::fs::File::open(path.as_ref()).await?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; READ_CHUNK];

    loop {
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// `doc:{fingerprint}:{language}:{ocr|no-ocr}`.
///
/// The language is the resolved profile code, so `de` and `fr` share a key.
pub fn cache_key(fingerprint: &str, config: &ExtractionConfig) -> String {
    format!(
        "doc:{}:{}:{}",
        fingerprint,
        OcrLanguage::from_code(&config.ocr.language).code(),
        if config.ocr.enabled { "ocr" } else { "no-ocr" }
    )
}
