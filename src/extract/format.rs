//! Input format detection.

use crate::error::DocSuiteError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::Path;

const PDF_MAGIC: &[u8; 4] = b"%PDF";
const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

/// Document formats an [`super::Extractor`] can be asked to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Pdf,
    Docx,
    Pptx,
    Html,
    Image,
    Markdown,
    Text,
}

impl InputFormat {
    /// Guess the format from the file extension alone.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        let format = match ext.as_str() {
            "pdf" => InputFormat::Pdf,
            "docx" => InputFormat::Docx,
            "pptx" => InputFormat::Pptx,
            "html" | "htm" => InputFormat::Html,
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "tif" | "tiff" | "webp" => InputFormat::Image,
            "md" | "markdown" => InputFormat::Markdown,
            "txt" | "text" => InputFormat::Text,
            _ => return None,
        };
        Some(format)
    }

    /// Leading bytes every file of this format must start with, if any.
    fn magic(self) -> Option<&'static [u8; 4]> {
        match self {
            InputFormat::Pdf => Some(PDF_MAGIC),
            InputFormat::Docx | InputFormat::Pptx => Some(ZIP_MAGIC),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InputFormat::Pdf => "pdf",
            InputFormat::Docx => "docx",
            InputFormat::Pptx => "pptx",
            InputFormat::Html => "html",
            InputFormat::Image => "image",
            InputFormat::Markdown => "markdown",
            InputFormat::Text => "text",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the format of a file on disk.
///
/// The extension picks the format; for PDF and OOXML formats the first
/// bytes must match the expected signature. A file without a known
/// extension that starts with `%PDF` is still treated as a PDF.
pub fn detect_format(path: &Path) -> Result<InputFormat, DocSuiteError> {
    let mut head = [0u8; 4];
    let read = std::fs::File::open(path)
        .and_then(|mut f| f.read(&mut head))
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => DocSuiteError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => DocSuiteError::FileNotFound {
                path: path.to_path_buf(),
            },
        })?;
    let head = &head[..read];

    match InputFormat::from_extension(path) {
        Some(format) => match format.magic() {
            Some(magic) if head != magic => Err(DocSuiteError::UnsupportedFormat {
                path: path.to_path_buf(),
                detail: format!("not a valid {format} file (first bytes: {head:?})"),
            }),
            _ => Ok(format),
        },
        None if head == PDF_MAGIC => Ok(InputFormat::Pdf),
        None => Err(DocSuiteError::UnsupportedFormat {
            path: path.to_path_buf(),
            detail: "unrecognised file extension".into(),
        }),
    }
}
