//! # docsuite
//!
//! Document processing toolkit: Markdown structure parsing, document
//! comparison, extraction, OCR touch-ups and model-assisted analysis.
//!
//! ## Overview
//!
//! ```text
//! input (path / URL)
//!  │
//!  ├─ extract    converter → markdown, text, tables, outline, language
//!  ├─ structure  markdown → headings / paragraphs / lists / code blocks
//!  ├─ compare    similarity %, line diff, word diff, side-by-side HTML
//!  ├─ ocr        rule-based fixes and quality score
//!  └─ assist     summaries, structured data, charts, diagrams, OCR fixes
//!                (LLM via edgequake-llm, typed fallbacks without one)
//! ```
//!
//! The structure parser and diff engine are pure and synchronous. Extraction
//! and the assist services are async (tokio).
//!
//! ## Quick Start
//!
//! ```rust
//! use docsuite::{compare_documents, structure};
//!
//! let elements = structure::parse("# Title\n\nSome text.");
//! assert_eq!(elements.len(), 2);
//!
//! let result = compare_documents("a\nb", "a\nb\nc", "old.md", "new.md", 3);
//! assert_eq!(result.added_lines, 1);
//! println!("{}", result.summary);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docsuite` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docsuite = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assist;
pub mod compare;
pub mod config;
pub mod error;
pub mod extract;
pub mod languages;
pub mod ocr;
pub mod prompts;
pub mod structure;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use assist::Assistant;
pub use compare::{
    compare_documents, generate_html_diff, get_word_level_diff, ChangeType, CompareOptions,
    ComparisonResult, TextDiff, WordChange,
};
pub use config::{OutputFormat, SuiteConfig, SuiteConfigBuilder};
pub use error::{AssistError, DocSuiteError};
pub use extract::{
    DocumentConverter, ExtractedImage, ExtractionResult, Extractor, InputFormat, TextConverter,
};
pub use ocr::{calculate_ocr_confidence, quick_fix_ocr, OcrQuality};
pub use structure::{ElementKind, StructuralElement};
