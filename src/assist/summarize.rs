//! Document summaries and structured-data extraction.

use super::decode::{decode_model_json, null_as_default, ModelReply};
use super::llm::ModelClient;
use crate::error::AssistError;
use crate::prompts;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_data: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportantNumber {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub context: String,
}

/// Itemised summary of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    #[serde(default)]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_points: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tables_summary: Vec<TableSummary>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub figures_mentioned: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub important_numbers: Vec<ImportantNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DocumentSummary {
    /// Summary produced without a model.
    pub fn basic(num_pages: usize, table_count: usize) -> Self {
        Self {
            summary: format!("Document with {num_pages} pages and {table_count} tables."),
            ..Default::default()
        }
    }

    /// Summary produced when the model call or decode failed.
    pub fn failed(num_pages: usize, error: impl Into<String>) -> Self {
        Self {
            summary: format!("Document with {num_pages} pages."),
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Fields extracted from a typed document (invoice, form, report, …).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredData {
    #[serde(default = "unknown_type")]
    pub document_type: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub extracted_fields: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub line_items: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn unknown_type() -> String {
    "unknown".to_string()
}

impl StructuredData {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            document_type: unknown_type(),
            confidence: None,
            extracted_fields: Map::new(),
            line_items: Vec::new(),
            error: Some(error.into()),
        }
    }
}

async fn ask<T: serde::de::DeserializeOwned>(client: &ModelClient, prompt: &str) -> Result<T, String> {
    let completion = client.complete(prompt).await.map_err(|e| e.to_string())?;
    match decode_model_json::<T>(&completion.content) {
        ModelReply::Data(value) => Ok(value),
        ModelReply::NoData { reason } => Err(reason),
    }
}

/// Summarise `markdown`, keeping at most `max_bullets` key points.
pub async fn summarize(
    client: Option<&ModelClient>,
    markdown: &str,
    table_count: usize,
    num_pages: usize,
    max_bullets: usize,
) -> DocumentSummary {
    let Some(client) = client else {
        return DocumentSummary::basic(num_pages, table_count);
    };

    let prompt = prompts::summary_prompt(markdown, table_count, max_bullets);
    match ask::<DocumentSummary>(client, &prompt).await {
        Ok(mut summary) => {
            summary.key_points.truncate(max_bullets);
            summary
        }
        Err(reason) => {
            warn!("Summary failed: {}", reason);
            DocumentSummary::failed(num_pages, reason)
        }
    }
}

/// Detect the document type and pull out its fields.
pub async fn extract_structured_data(client: Option<&ModelClient>, content: &str) -> StructuredData {
    let Some(client) = client else {
        return StructuredData::failed(AssistError::NotConfigured.to_string());
    };

    match ask::<StructuredData>(client, &prompts::structured_data_prompt(content)).await {
        Ok(data) => data,
        Err(reason) => {
            warn!("Structured extraction failed: {}", reason);
            StructuredData::failed(reason)
        }
    }
}
