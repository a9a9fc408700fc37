//! External-process plumbing shared by the converter bridge and the page rasterizer.
//!
//! Every invocation is an argument list (no shell), runs under a timeout, and is killed
//! if the waiting future is dropped.

use crate::{DocingestError, Result};
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tokio::time::{Duration, timeout};

/// Run `command` to completion, capturing stdout and stderr.
///
/// # Errors
///
/// - `MissingDependency` if the program cannot be found
/// - `Conversion` if it cannot be spawned, waited on, or exceeds `timeout_secs`
///
/// A non-zero exit status is not an error here; callers inspect `Output::status`.
pub async fn run_with_timeout(mut command: Command, tool: &str, timeout_secs: u64) -> Result<Output> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    tracing::debug!(tool, command = ?command.as_std(), timeout_secs, "Spawning external process");

    let child = command.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DocingestError::MissingDependency(format!("{} executable not found: {}", tool, e))
        } else {
            DocingestError::conversion_with_source(format!("Failed to execute {}", tool), e)
        }
    })?;

    let child_id = child.id();

    match timeout(Duration::from_secs(timeout_secs.max(1)), child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(DocingestError::conversion_with_source(
            format!("Failed to wait for {}", tool),
            e,
        )),
        // The child is dropped with the cancelled future and killed by kill_on_drop.
        Err(_) => Err(DocingestError::conversion(format!(
            "{} timed out after {} seconds (PID: {:?})",
            tool, timeout_secs, child_id
        ))),
    }
}

/// Short human-readable summary of a failed process run.
pub fn describe_failure(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let detail = if !stderr.trim().is_empty() { stderr } else { stdout };
    format!(
        "exit code {}: {}",
        output.status.code().map_or_else(|| "none".to_string(), |c| c.to_string()),
        detail.trim()
    )
}

/// Deduplicated candidate list: the configured path, env vars, well-known locations,
/// then `names` in every `PATH` entry.
pub fn executable_candidates(
    configured: Option<&Path>,
    env_vars: &[&str],
    well_known: &[&str],
    names: &[&str],
) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    let mut push_candidate = |path: PathBuf| {
        if seen.insert(path.clone()) {
            candidates.push(path);
        }
    };

    if let Some(path) = configured {
        push_candidate(path.to_path_buf());
    }

    for var in env_vars {
        if let Some(value) = env::var_os(var).filter(|v| !v.is_empty()) {
            push_candidate(PathBuf::from(value));
        }
    }

    for path in well_known {
        push_candidate(PathBuf::from(path));
    }

    if let Some(path_env) = env::var_os("PATH") {
        for dir in env::split_paths(&path_env) {
            for name in names {
                push_candidate(dir.join(name));
            }
        }
    }

    candidates
}

/// First candidate that exists and is a regular file.
pub fn first_existing(candidates: Vec<PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_configured_path_comes_first() {
        let dir = tempdir().unwrap();
        let tool = dir.path().join("mytool");
        std::fs::write(&tool, b"").unwrap();

        let candidates = executable_candidates(Some(&tool), &[], &[], &["mytool"]);
        assert_eq!(candidates[0], tool);
        assert_eq!(first_existing(candidates), Some(tool));
    }

    #[test]
    fn test_first_existing_none() {
        let dir = tempdir().unwrap();
        assert_eq!(first_existing(vec![dir.path().join("nope")]), None);
    }

    #[tokio::test]
    async fn test_missing_program_is_missing_dependency() {
        let command = Command::new("docingest-definitely-not-installed-binary");
        let err = run_with_timeout(command, "fake tool", 5).await.unwrap_err();
        assert!(matches!(err, DocingestError::MissingDependency(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_is_conversion_error() {
        let mut command = Command::new("sleep");
        command.arg("5");
        let err = run_with_timeout(command, "sleep", 1).await.unwrap_err();
        assert!(matches!(err, DocingestError::Conversion { .. }));
        assert!(err.to_string().contains("timed out"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_returned() {
        let mut command = Command::new("sh");
        command.arg("-c").arg("echo broken >&2; exit 3");
        let output = run_with_timeout(command, "sh", 5).await.unwrap();
        assert!(!output.status.success());
        assert_eq!(describe_failure(&output), "exit code 3: broken");
    }
}
