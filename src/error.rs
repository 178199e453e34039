//! Error types for the docsuite library.
//!
//! * [`DocSuiteError`] is fatal: the requested operation cannot proceed
//!   (missing file, oversized upload, broken converter, bad configuration).
//!
//! * [`AssistError`] is non-fatal: a model-backed service failed, but the
//!   caller still receives a fallback result. It is recorded as text in the
//!   `error` field of the service's result type and never propagated.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docsuite library.
#[derive(Debug, Error)]
pub enum DocSuiteError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// Upload or local file exceeds the configured size limit.
    #[error("File '{name}' is {size_mb:.1} MB, the limit is {limit_mb} MB")]
    FileTooLarge {
        name: String,
        size_mb: f64,
        limit_mb: u64,
    },

    /// No registered converter handles this format.
    #[error("Unsupported format for '{path}': {detail}")]
    UnsupportedFormat { path: PathBuf, detail: String },

    // ── Processing errors ─────────────────────────────────────────────────
    /// The document converter failed.
    #[error("Conversion of '{path}' failed: {detail}")]
    ConversionFailed { path: PathBuf, detail: String },

    /// An image given to a vision service could not be read.
    #[error("Failed to read image '{path}': {source}")]
    ImageReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configured provider could not be initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal failure of a model-backed service.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum AssistError {
    /// No provider is available.
    #[error("No LLM provider configured")]
    NotConfigured,

    /// The provider call failed after all retries.
    #[error("LLM call failed after {retries} retries: {detail}")]
    LlmFailed { retries: u32, detail: String },

    /// The provider call timed out.
    #[error("LLM call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The model answered, but not with the expected JSON.
    #[error("Could not decode model reply: {reason}")]
    Decode { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_too_large_display() {
        let e = DocSuiteError::FileTooLarge {
            name: "big.pdf".into(),
            size_mb: 51.25,
            limit_mb: 50,
        };
        let msg = e.to_string();
        assert!(msg.contains("big.pdf"), "got: {msg}");
        assert!(msg.contains("51.2 MB") || msg.contains("51.3 MB"), "got: {msg}");
        assert!(msg.contains("50 MB"), "got: {msg}");
    }

    #[test]
    fn provider_not_configured_display() {
        let e = DocSuiteError::ProviderNotConfigured {
            provider: "openai".into(),
            hint: "Set OPENAI_API_KEY".into(),
        };
        assert!(e.to_string().contains("openai"));
        assert!(e.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn image_read_failed_keeps_source() {
        use std::error::Error as _;
        let e = DocSuiteError::ImageReadFailed {
            path: "chart.png".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("chart.png"));
    }

    #[test]
    fn assist_timeout_display() {
        let e = AssistError::Timeout { secs: 60 };
        assert!(e.to_string().contains("60s"));
    }

    #[test]
    fn assist_error_serialises() {
        let e = AssistError::Decode {
            reason: "no JSON object".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("Decode"));
        assert!(json.contains("no JSON object"));
    }
}
