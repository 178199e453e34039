//! Model-backed services: summaries, structured data, chart and diagram
//! analysis, OCR correction.
//!
//! Every service degrades instead of failing. Without a provider, or when
//! the provider call or the reply decode fails, the caller still gets a
//! typed result: a rule-based answer where one exists, otherwise an empty
//! result whose `error` field says what went wrong. Only local I/O problems
//! (an unreadable image) surface as [`DocSuiteError`].

pub mod decode;
pub mod llm;
pub mod ocr_fix;
pub mod summarize;
pub mod vision;

pub use decode::{decode_model_json, ModelReply};
pub use llm::{resolve_provider, Completion, ModelClient};
pub use ocr_fix::{CorrectionMethod, OcrCorrection};
pub use summarize::{DocumentSummary, StructuredData};
pub use vision::{ChartData, DiagramInfo};

use crate::config::SuiteConfig;
use crate::error::DocSuiteError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Entry point to the model-backed services.
///
/// Built once from a [`SuiteConfig`]; cheap to clone and share between
/// tasks.
#[derive(Debug, Clone)]
pub struct Assistant {
    client: Option<ModelClient>,
    max_summary_bullets: usize,
    concurrency: usize,
}

impl Assistant {
    /// Resolve a provider from `config`; without one the assistant runs in
    /// fallback mode.
    pub fn new(config: &SuiteConfig) -> Self {
        let client = match ModelClient::from_config(config) {
            Ok(client) => {
                info!("LLM provider configured");
                Some(client)
            }
            Err(e) => {
                debug!("No LLM provider, using fallbacks: {}", e);
                None
            }
        };
        Self::with_client(client, config)
    }

    /// Use `client` (or none) as given.
    pub fn with_client(client: Option<ModelClient>, config: &SuiteConfig) -> Self {
        Self {
            client,
            max_summary_bullets: config.max_summary_bullets,
            concurrency: config.concurrency,
        }
    }

    /// Assistant that never calls a model.
    pub fn offline(config: &SuiteConfig) -> Self {
        Self::with_client(None, config)
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub async fn summarize(&self, markdown: &str, table_count: usize, num_pages: usize) -> DocumentSummary {
        summarize::summarize(
            self.client.as_ref(),
            markdown,
            table_count,
            num_pages,
            self.max_summary_bullets,
        )
        .await
    }

    pub async fn extract_structured_data(&self, content: &str) -> StructuredData {
        summarize::extract_structured_data(self.client.as_ref(), content).await
    }

    pub async fn analyze_chart(&self, path: &Path, hint: Option<&str>) -> Result<ChartData, DocSuiteError> {
        vision::analyze_chart(self.client.as_ref(), path, hint).await
    }

    pub async fn analyze_diagram(&self, path: &Path, hint: Option<&str>) -> Result<DiagramInfo, DocSuiteError> {
        vision::analyze_diagram(self.client.as_ref(), path, hint).await
    }

    /// Analyse several charts concurrently; results keep the input order.
    pub async fn analyze_charts(
        &self,
        paths: &[PathBuf],
        hint: Option<&str>,
    ) -> Vec<(PathBuf, Result<ChartData, DocSuiteError>)> {
        vision::analyze_charts(self.client.as_ref(), paths, hint, self.concurrency).await
    }

    pub async fn fix_ocr(&self, text: &str, language: &str, context: Option<&str>) -> OcrCorrection {
        ocr_fix::fix_ocr(self.client.as_ref(), text, language, context).await
    }
}
