//! Configuration types for docsuite.
//!
//! Everything tunable lives in [`SuiteConfig`], built via
//! [`SuiteConfigBuilder`]. The LLM fields only matter to the
//! [`crate::assist`] services; the core structure and compare paths take no
//! configuration beyond context lines.

use crate::error::DocSuiteError;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Configuration for extraction, comparison and the assist services.
///
/// # Example
/// ```rust
/// use docsuite::SuiteConfig;
///
/// let config = SuiteConfig::builder()
///     .max_file_size_mb(20)
///     .context_lines(5)
///     .model("gpt-4.1-nano")
///     .build()
///     .unwrap();
/// assert_eq!(config.max_file_size_bytes(), 20 * 1024 * 1024);
/// ```
#[derive(Clone)]
pub struct SuiteConfig {
    /// Largest accepted input file in megabytes. Default: 50.
    pub max_file_size_mb: u64,

    /// Run OCR on scanned pages when the converter supports it. Default: true.
    pub enable_ocr: bool,

    /// Extract tables from converted documents. Default: true.
    pub extract_tables: bool,

    /// Ask the converter for embedded images. Default: true.
    pub extract_images: bool,

    /// Directory the converter saves extracted images into. Images are only
    /// extracted when this is set. Default: None.
    pub image_dir: Option<PathBuf>,

    /// Output format used by the CLI when none is given. Default: Markdown.
    pub default_output_format: OutputFormat,

    /// Context lines around each change in diffs. Default: 3.
    pub context_lines: usize,

    /// LLM model identifier, e.g. "gpt-4o". If None, uses provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.1.
    pub temperature: f32,

    /// Maximum tokens per completion. Default: 2048.
    pub max_tokens: usize,

    /// Retry attempts on a failed LLM call. Default: 3.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled after each attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-call LLM timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Concurrent LLM calls for batch operations. Default: 4.
    pub concurrency: usize,

    /// Upper bound on key points kept from a summary. Default: 20.
    pub max_summary_bullets: usize,

    /// Download timeout for URL inputs in seconds. Default: 60.
    pub download_timeout_secs: u64,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 50,
            enable_ocr: true,
            extract_tables: true,
            extract_images: true,
            image_dir: None,
            default_output_format: OutputFormat::default(),
            context_lines: 3,
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.1,
            max_tokens: 2048,
            max_retries: 3,
            retry_backoff_ms: 500,
            api_timeout_secs: 60,
            concurrency: 4,
            max_summary_bullets: 20,
            download_timeout_secs: 60,
        }
    }
}

impl fmt::Debug for SuiteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteConfig")
            .field("max_file_size_mb", &self.max_file_size_mb)
            .field("enable_ocr", &self.enable_ocr)
            .field("extract_tables", &self.extract_tables)
            .field("extract_images", &self.extract_images)
            .field("image_dir", &self.image_dir)
            .field("default_output_format", &self.default_output_format)
            .field("context_lines", &self.context_lines)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl SuiteConfig {
    /// Create a new builder for `SuiteConfig`.
    pub fn builder() -> SuiteConfigBuilder {
        SuiteConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Builder for [`SuiteConfig`].
#[derive(Debug)]
pub struct SuiteConfigBuilder {
    config: SuiteConfig,
}

impl SuiteConfigBuilder {
    pub fn max_file_size_mb(mut self, mb: u64) -> Self {
        self.config.max_file_size_mb = mb;
        self
    }

    pub fn enable_ocr(mut self, v: bool) -> Self {
        self.config.enable_ocr = v;
        self
    }

    pub fn extract_tables(mut self, v: bool) -> Self {
        self.config.extract_tables = v;
        self
    }

    pub fn extract_images(mut self, v: bool) -> Self {
        self.config.extract_images = v;
        self
    }

    pub fn image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.image_dir = Some(dir.into());
        self
    }

    pub fn default_output_format(mut self, format: OutputFormat) -> Self {
        self.config.default_output_format = format;
        self
    }

    pub fn context_lines(mut self, n: usize) -> Self {
        self.config.context_lines = n;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn max_summary_bullets(mut self, n: usize) -> Self {
        self.config.max_summary_bullets = n;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SuiteConfig, DocSuiteError> {
        let c = &self.config;
        if c.max_file_size_mb == 0 {
            return Err(DocSuiteError::InvalidConfig(
                "max_file_size_mb must be ≥ 1".into(),
            ));
        }
        if c.concurrency == 0 {
            return Err(DocSuiteError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 || c.download_timeout_secs == 0 {
            return Err(DocSuiteError::InvalidConfig(
                "Timeouts must be at least one second".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Output format for rendered results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
    Text,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
            OutputFormat::Text => "text",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = DocSuiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            "text" | "txt" => Ok(OutputFormat::Text),
            other => Err(DocSuiteError::InvalidConfig(format!(
                "Unknown output format '{other}' (expected markdown, json or text)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = SuiteConfig::default();
        assert_eq!(c.max_file_size_mb, 50);
        assert!(c.enable_ocr);
        assert!(c.extract_tables);
        assert!(c.extract_images);
        assert_eq!(c.image_dir, None);
        assert_eq!(c.default_output_format, OutputFormat::Markdown);
        assert_eq!(c.context_lines, 3);
        assert_eq!(c.max_tokens, 2048);
        assert_eq!(c.concurrency, 4);
        assert!(c.provider.is_none());
    }

    #[test]
    fn builder_clamps() {
        let c = SuiteConfig::builder()
            .temperature(5.0)
            .concurrency(0)
            .build()
            .unwrap();
        assert_eq!(c.temperature, 2.0);
        assert_eq!(c.concurrency, 1);
    }

    #[test]
    fn build_rejects_zero_size_limit() {
        let err = SuiteConfig::builder().max_file_size_mb(0).build().unwrap_err();
        assert!(matches!(err, DocSuiteError::InvalidConfig(_)));
    }

    #[test]
    fn build_rejects_zero_timeout() {
        assert!(SuiteConfig::builder().api_timeout_secs(0).build().is_err());
    }

    #[test]
    fn output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("html".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }

    #[test]
    fn debug_hides_provider() {
        let dbg = format!("{:?}", SuiteConfig::default());
        assert!(dbg.contains("SuiteConfig"));
        assert!(dbg.contains("max_file_size_mb"));
    }
}
