//! End-to-end integration tests for docsuite.
//!
//! The offline tests exercise the public API against fixture files written
//! to a temporary directory. Tests that make live LLM API calls are gated
//! behind the `E2E_ENABLED` environment variable.
//!
//! Run the live tests with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use docsuite::assist::{Assistant, CorrectionMethod};
use docsuite::compare::{self, CompareOptions};
use docsuite::extract::{ConvertOptions, ConvertedDocument, Extractor, Heading};
use docsuite::{
    compare_documents, get_word_level_diff, structure, ChangeType, DocSuiteError,
    DocumentConverter, ElementKind, InputFormat, SuiteConfig, WordChange,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

const REPORT: &str = "# Quarterly Report\n\
\n\
The quarter was strong for the company and the team shipped the new release of the product to all of the customers.\n\
\n\
## Revenue\n\
\n\
| Region | Revenue |\n\
|--------|---------|\n\
| North  | 120     |\n\
| South  | 95      |\n\
\n\
- Hired five engineers\n\
- Opened a new office\n\
\n\
```\n\
let total = 215;\n\
```\n";

fn write_fixture(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

macro_rules! e2e_skip_unless_enabled {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    }};
}

// ── Structure ────────────────────────────────────────────────────────────────

#[test]
fn test_structure_of_report() {
    let elements = structure::parse(REPORT);
    let kinds: Vec<ElementKind> = elements.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ElementKind::Heading1,
            ElementKind::Paragraph,
            ElementKind::Heading2,
            ElementKind::Paragraph,
            ElementKind::List,
            ElementKind::CodeBlock,
        ]
    );
    assert_eq!(elements[0].content, "Quarterly Report");
    assert_eq!(elements[5].content, "let total = 215;");

    let json = serde_json::to_value(&elements[2]).unwrap();
    assert_eq!(json["type"], "heading_2");
}

// ── Compare ──────────────────────────────────────────────────────────────────

#[test]
fn test_compare_revisions() {
    let v1 = "alpha\nbeta\ngamma\n";
    let v2 = "alpha\nbeta\ngamma\ndelta\n";
    let result = compare_documents(v1, v2, "v1.md", "v2.md", 3);

    assert_eq!(result.doc1_name, "v1.md");
    assert_eq!(result.total_lines_doc1, 3);
    assert_eq!(result.total_lines_doc2, 4);
    assert_eq!(result.added_lines, 1);
    assert_eq!(result.removed_lines, 0);
    assert_eq!(result.changed_lines, 0);
    assert_eq!(result.diffs.len(), 1);
    assert_eq!(result.diffs[0].change, ChangeType::Added);
    assert_eq!(result.diffs[0].content, "delta");
    assert!(result.summary.ends_with("1 lines added, 0 lines removed."));
}

#[test]
fn test_compare_identical() {
    let result = compare::compare_with(REPORT, REPORT, &CompareOptions::default());
    assert_eq!(result.similarity_percent, 100.0);
    assert!(result.diffs.is_empty());
    assert_eq!(result.doc1_name, "Document 1");
    assert!(compare::unified_diff_text(REPORT, REPORT, "a", "b", 3).is_empty());
}

#[test]
fn test_html_and_word_diff() {
    let html = compare::generate_html_diff("one two", "one three", "left<a>", "right");
    assert!(html.contains("left&lt;a&gt;"));
    assert!(html.to_lowercase().contains("<table"));

    let words = get_word_level_diff("the quick fox", "the slow fox");
    assert_eq!(
        words,
        vec![WordChange::Changed {
            old: "quick".into(),
            new: "slow".into(),
            position: 1,
        }]
    );
}

// ── Extract ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_extract_markdown_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "report.md", REPORT.as_bytes());

    let extractor = Extractor::with_text_converter(&SuiteConfig::default());
    let result = extractor.extract(path.to_str().unwrap()).await.unwrap();

    assert_eq!(result.filename, "report.md");
    assert_eq!(result.num_pages, 1);
    assert_eq!(result.title.as_deref(), Some("Quarterly Report"));
    assert_eq!(result.language.as_deref(), Some("en"));
    assert_eq!(result.tables.len(), 1);
    assert_eq!(
        result.tables[0].csv.as_deref(),
        Some("Region,Revenue\nNorth,120\nSouth,95\n")
    );
    assert_eq!(
        result.headings,
        vec![
            Heading {
                level: 1,
                text: "Quarterly Report".into(),
                page: 1
            },
            Heading {
                level: 2,
                text: "Revenue".into(),
                page: 1
            },
        ]
    );
}

#[tokio::test]
async fn test_extract_respects_table_switch() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "report.md", REPORT.as_bytes());

    let config = SuiteConfig::builder().extract_tables(false).build().unwrap();
    let result = Extractor::with_text_converter(&config)
        .extract_path(&path)
        .await
        .unwrap();
    assert!(result.tables.is_empty());
}

#[tokio::test]
async fn test_extract_errors() {
    let dir = tempfile::tempdir().unwrap();
    let extractor = Extractor::with_text_converter(&SuiteConfig::default());

    let err = extractor
        .extract(dir.path().join("missing.md").to_str().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, DocSuiteError::FileNotFound { .. }));

    let pdf = write_fixture(dir.path(), "paper.pdf", b"%PDF-1.7\n");
    let err = extractor.extract_path(&pdf).await.unwrap_err();
    assert!(matches!(err, DocSuiteError::UnsupportedFormat { .. }));
}

/// Converter that returns canned output for PDFs.
struct CannedPdf;

impl DocumentConverter for CannedPdf {
    fn name(&self) -> &str {
        "canned"
    }

    fn supports(&self, format: InputFormat) -> bool {
        format == InputFormat::Pdf
    }

    fn convert(&self, _path: &Path, options: &ConvertOptions) -> Result<ConvertedDocument, DocSuiteError> {
        assert_eq!(options.format, InputFormat::Pdf);
        Ok(ConvertedDocument {
            markdown: "# Rapport annuel\n\nLe chiffre d'affaires de l'entreprise est en forte hausse cette année et les clients sont très satisfaits de nos services.".into(),
            num_pages: 7,
            author: Some("Finance".into()),
            ..Default::default()
        })
    }
}

#[tokio::test]
async fn test_extract_with_injected_converter() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_fixture(dir.path(), "rapport.pdf", b"%PDF-1.4\n");

    let extractor = Extractor::new(&SuiteConfig::default(), Arc::new(CannedPdf));
    assert_eq!(extractor.converter_name(), "canned");

    let result = extractor.extract_path(&pdf).await.unwrap();
    assert_eq!(result.num_pages, 7);
    assert_eq!(result.author.as_deref(), Some("Finance"));
    assert_eq!(result.title.as_deref(), Some("Rapport annuel"));
    assert_eq!(result.language.as_deref(), Some("fr"));
}

// ── OCR + assist (offline) ───────────────────────────────────────────────────

#[tokio::test]
async fn test_offline_assistant() {
    let config = SuiteConfig::default();
    let assistant = Assistant::offline(&config);

    let fixed = assistant.fix_ocr("Tne  report vvas late", "en", None).await;
    assert_eq!(fixed.method, CorrectionMethod::RuleBased);
    assert_eq!(fixed.corrected_text, "The report was late");

    let summary = assistant.summarize(REPORT, 1, 1).await;
    assert_eq!(summary.summary, "Document with 1 pages and 1 tables.");

    let dir = tempfile::tempdir().unwrap();
    let img = write_fixture(dir.path(), "chart.png", b"\x89PNG\r\n");
    let chart = assistant.analyze_chart(&img, Some("bar")).await.unwrap();
    assert_eq!(chart.error.as_deref(), Some("No vision API configured"));
}

// ── Live LLM (gated) ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_live_summary() {
    e2e_skip_unless_enabled!();

    let assistant = Assistant::new(&SuiteConfig::default());
    if !assistant.is_configured() {
        println!("SKIP: no LLM provider configured");
        return;
    }

    let summary = assistant.summarize(REPORT, 1, 1).await;
    println!("{}", serde_json::to_string_pretty(&summary).unwrap());
    assert_eq!(summary.error, None, "summary failed: {:?}", summary.error);
    assert!(!summary.summary.trim().is_empty());
    assert!(summary.key_points.len() <= SuiteConfig::default().max_summary_bullets);
}

#[tokio::test]
async fn test_live_ocr_fix() {
    e2e_skip_unless_enabled!();

    let assistant = Assistant::new(&SuiteConfig::default());
    if !assistant.is_configured() {
        println!("SKIP: no LLM provider configured");
        return;
    }

    let fixed = assistant
        .fix_ocr("Tne rneeting vvill start at 1O am.", "en", Some("memo"))
        .await;
    println!("{}", serde_json::to_string_pretty(&fixed).unwrap());
    assert!(!fixed.corrected_text.trim().is_empty());
    if fixed.method == CorrectionMethod::Ai {
        assert!((0.0..=1.0).contains(&fixed.confidence));
    }
}
