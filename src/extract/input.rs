//! Input resolution: normalise a user-supplied path or URL to a local file.
//!
//! Converters work on file-system paths, so URL inputs are downloaded into a
//! `TempDir` that lives as long as the [`ResolvedInput`] and is removed when
//! it is dropped.

use crate::error::DocSuiteError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// File name used when a URL path does not name a file.
pub const DEFAULT_DOWNLOAD_NAME: &str = "document.pdf";

/// The resolved input: either a local path or a downloaded temp file.
#[derive(Debug)]
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was a URL, downloaded into `_temp_dir`.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    /// Path to the file regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }

    /// File name component, used as the document name in results.
    pub fn file_name(&self) -> String {
        self.path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_DOWNLOAD_NAME.to_string())
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a readable local file.
///
/// URLs are downloaded with `timeout_secs` as the overall request timeout;
/// local paths must exist and be readable.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, DocSuiteError> {
    if input.trim().is_empty() {
        return Err(DocSuiteError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

fn resolve_local(path_str: &str) -> Result<ResolvedInput, DocSuiteError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(DocSuiteError::FileNotFound { path });
    }
    if path.is_dir() {
        return Err(DocSuiteError::InvalidInput {
            input: path_str.to_string(),
        });
    }

    match std::fs::File::open(&path) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(DocSuiteError::PermissionDenied { path });
        }
        Err(_) => return Err(DocSuiteError::FileNotFound { path }),
    }

    debug!("Resolved local input: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

/// Reject files larger than `limit_mb` megabytes.
pub fn check_size(path: &Path, limit_mb: u64) -> Result<u64, DocSuiteError> {
    let len = std::fs::metadata(path)
        .map_err(|_| DocSuiteError::FileNotFound {
            path: path.to_path_buf(),
        })?
        .len();
    check_len(&path.display().to_string(), len, limit_mb)?;
    Ok(len)
}

/// Reject a payload of `len` bytes when it exceeds `limit_mb` megabytes.
pub fn check_len(name: &str, len: u64, limit_mb: u64) -> Result<(), DocSuiteError> {
    if len > limit_mb.saturating_mul(1024 * 1024) {
        return Err(DocSuiteError::FileTooLarge {
            name: name.to_string(),
            size_mb: len as f64 / (1024.0 * 1024.0),
            limit_mb,
        });
    }
    Ok(())
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, DocSuiteError> {
    info!("Downloading document from: {}", url);

    let failed = |reason: String| DocSuiteError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            DocSuiteError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let filename = filename_from_url(url);
    let temp_dir = TempDir::new().map_err(|e| DocSuiteError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(&filename);

    let bytes = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            DocSuiteError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| DocSuiteError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded {} bytes to: {}", bytes.len(), file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        _temp_dir: temp_dir,
    })
}

/// Last URL path segment when it looks like a file name, else
/// [`DEFAULT_DOWNLOAD_NAME`].
pub fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }
    DEFAULT_DOWNLOAD_NAME.to_string()
}
