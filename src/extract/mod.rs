//! Document extraction: turn an input file into Markdown, plain text and
//! structured metadata.
//!
//! ```text
//!  path or URL
//!     │  input::resolve_input
//!     ▼
//!  local file ──▶ format::detect_format ──▶ size check
//!     │
//!     ▼  spawn_blocking
//!  DocumentConverter::convert ──▶ ConvertedDocument
//!     │
//!     ▼  assemble
//!  ExtractionResult { markdown, text, tables, images, headings, title, language, … }
//! ```
//!
//! The heavy lifting (PDF layout analysis, OCR) belongs to a
//! [`DocumentConverter`] implementation chosen by the embedding application
//! and injected once into an [`Extractor`]. The crate ships
//! [`TextConverter`] for Markdown and plain-text inputs; everything after
//! conversion (heading outline, table fallback, title, language) is
//! computed here and is identical for every converter.

pub mod format;
pub mod input;
pub mod tables;

pub use format::{detect_format, InputFormat};
pub use input::{resolve_input, ResolvedInput};

use crate::config::SuiteConfig;
use crate::error::DocSuiteError;
use crate::languages;
use crate::structure::{self, ElementKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// A table found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedTable {
    pub index: usize,
    /// 1-based page, or 0 when unknown.
    pub page: usize,
    pub markdown: String,
    pub csv: Option<String>,
}

/// An entry of the document outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    pub page: usize,
}

/// An image the converter pulled out of a document and saved to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedImage {
    pub index: usize,
    /// 1-based page, or 0 when unknown.
    pub page: usize,
    pub path: PathBuf,
    pub caption: Option<String>,
}

/// Options passed to a converter for one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub format: InputFormat,
    pub enable_ocr: bool,
    pub extract_tables: bool,
    pub extract_images: bool,
    /// Where to save images. Converters pick their own location when unset.
    pub image_dir: Option<PathBuf>,
}

/// Raw output of a [`DocumentConverter`].
///
/// Only `markdown` is required; every other field is filled in by the
/// [`Extractor`] when the converter leaves it empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvertedDocument {
    pub markdown: String,
    pub text: Option<String>,
    pub num_pages: usize,
    pub tables: Vec<ExtractedTable>,
    pub images: Vec<ExtractedImage>,
    pub headings: Vec<Heading>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
}

/// Converts a file on disk into Markdown.
///
/// Implementations are called from a blocking thread and may do CPU-heavy
/// or synchronous I/O work.
pub trait DocumentConverter: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    fn supports(&self, format: InputFormat) -> bool;

    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertedDocument, DocSuiteError>;
}

/// Converter for inputs that already are Markdown or plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextConverter;

impl DocumentConverter for TextConverter {
    fn name(&self) -> &str {
        "text"
    }

    fn supports(&self, format: InputFormat) -> bool {
        matches!(format, InputFormat::Markdown | InputFormat::Text)
    }

    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertedDocument, DocSuiteError> {
        let bytes = std::fs::read(path).map_err(|e| DocSuiteError::ConversionFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        let content = String::from_utf8_lossy(&bytes).into_owned();
        let text = match options.format {
            InputFormat::Text => Some(content.clone()),
            _ => None,
        };
        Ok(ConvertedDocument {
            markdown: content,
            text,
            num_pages: 1,
            ..Default::default()
        })
    }
}

/// Complete extraction result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub filename: String,
    pub num_pages: usize,
    pub markdown: String,
    pub text: String,
    pub tables: Vec<ExtractedTable>,
    pub images: Vec<ExtractedImage>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    pub headings: Vec<Heading>,
}

/// Runs a [`DocumentConverter`] over inputs and assembles the results.
#[derive(Clone)]
pub struct Extractor {
    converter: Arc<dyn DocumentConverter>,
    max_file_size_mb: u64,
    download_timeout_secs: u64,
    enable_ocr: bool,
    extract_tables: bool,
    extract_images: bool,
    image_dir: Option<PathBuf>,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("converter", &self.converter.name())
            .field("max_file_size_mb", &self.max_file_size_mb)
            .field("enable_ocr", &self.enable_ocr)
            .field("extract_tables", &self.extract_tables)
            .field("extract_images", &self.extract_images)
            .field("image_dir", &self.image_dir)
            .finish()
    }
}

impl Extractor {
    pub fn new(config: &SuiteConfig, converter: Arc<dyn DocumentConverter>) -> Self {
        Self {
            converter,
            max_file_size_mb: config.max_file_size_mb,
            download_timeout_secs: config.download_timeout_secs,
            enable_ocr: config.enable_ocr,
            extract_tables: config.extract_tables,
            extract_images: config.extract_images,
            image_dir: config.image_dir.clone(),
        }
    }

    /// Extractor backed by the built-in [`TextConverter`].
    pub fn with_text_converter(config: &SuiteConfig) -> Self {
        Self::new(config, Arc::new(TextConverter))
    }

    pub fn converter_name(&self) -> &str {
        self.converter.name()
    }

    /// Extract a local path or HTTP(S) URL.
    pub async fn extract(&self, input: &str) -> Result<ExtractionResult, DocSuiteError> {
        let resolved = resolve_input(input, self.download_timeout_secs).await?;
        let mut result = self.extract_path(resolved.path()).await?;
        result.filename = resolved.file_name();
        Ok(result)
    }

    /// Extract a file that is already on disk.
    pub async fn extract_path(&self, path: &Path) -> Result<ExtractionResult, DocSuiteError> {
        input::check_size(path, self.max_file_size_mb)?;
        let format = detect_format(path)?;
        if !self.converter.supports(format) {
            return Err(DocSuiteError::UnsupportedFormat {
                path: path.to_path_buf(),
                detail: format!("converter '{}' does not handle {format}", self.converter.name()),
            });
        }

        let options = ConvertOptions {
            format,
            enable_ocr: self.enable_ocr,
            extract_tables: self.extract_tables,
            extract_images: self.extract_images,
            image_dir: self.image_dir.clone(),
        };
        info!(
            "Converting {} ({}) with '{}'",
            path.display(),
            format,
            self.converter.name()
        );

        let converter = Arc::clone(&self.converter);
        let owned: PathBuf = path.to_path_buf();
        let task_options = options.clone();
        let doc = tokio::task::spawn_blocking(move || converter.convert(&owned, &task_options))
            .await
            .map_err(|e| DocSuiteError::Internal(format!("Conversion task failed: {e}")))??;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(assemble(filename, doc, &options))
    }
}

/// Fill in everything the converter left out.
///
/// * text: the converter's, else the structure parser's plain text
/// * headings: the converter's, else every parsed heading (page 1)
/// * tables: the converter's, else GFM tables found in the markdown
/// * images: the converter's, ordered by index, dropped when disabled
/// * title: the converter's, else the first level-1 heading
/// * language: the converter's, else detected from the text
pub fn assemble(filename: String, doc: ConvertedDocument, options: &ConvertOptions) -> ExtractionResult {
    let elements = structure::parse(&doc.markdown);

    let text = doc
        .text
        .unwrap_or_else(|| structure::plain_text(&elements));

    let headings = if doc.headings.is_empty() {
        elements
            .iter()
            .filter_map(|el| {
                el.kind.heading_level().map(|level| Heading {
                    level,
                    text: el.content.clone(),
                    page: 1,
                })
            })
            .collect()
    } else {
        doc.headings
    };

    let tables = match (options.extract_tables, doc.tables.is_empty()) {
        (false, _) => Vec::new(),
        (true, true) => tables::find_tables(&doc.markdown, 1),
        (true, false) => doc.tables,
    };

    let mut images = if options.extract_images {
        doc.images
    } else {
        Vec::new()
    };
    images.sort_by_key(|img| img.index);

    let title = doc.title.filter(|t| !t.trim().is_empty()).or_else(|| {
        elements
            .iter()
            .find(|el| el.kind == ElementKind::Heading1)
            .map(|el| el.content.trim().to_string())
    });

    let language = doc
        .language
        .or_else(|| Some(languages::detect_language(&text).to_string()));

    debug!(
        "Assembled '{}': {} headings, {} tables, {} images, language {:?}",
        filename,
        headings.len(),
        tables.len(),
        images.len(),
        language
    );

    ExtractionResult {
        filename,
        num_pages: doc.num_pages,
        markdown: doc.markdown,
        text,
        tables,
        images,
        title,
        author: doc.author,
        language,
        headings,
    }
}
