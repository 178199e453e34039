//! Chart and diagram analysis with a vision-capable model.

use super::decode::{decode_model_json, null_as_default, ModelReply};
use super::llm::ModelClient;
use crate::error::DocSuiteError;
use crate::prompts;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Reported when no provider is available.
pub const NO_VISION_API: &str = "No vision API configured";

/// Data read off a chart image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default = "unknown", deserialize_with = "null_as_default")]
    pub chart_type: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Data points; their shape depends on the chart type.
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Value>,
    #[serde(default)]
    pub x_axis: Option<String>,
    #[serde(default)]
    pub y_axis: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub legend: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub insights: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn unknown() -> String {
    "unknown".to_string()
}

impl ChartData {
    /// Empty result carrying `error`.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            chart_type: unknown(),
            title: None,
            data: Vec::new(),
            x_axis: None,
            y_axis: None,
            legend: Vec::new(),
            insights: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Components and connections read off a diagram image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramInfo {
    #[serde(default)]
    pub diagram_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub components: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub connections: Vec<Value>,
    #[serde(default)]
    pub hierarchy: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_elements: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DiagramInfo {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// MIME type for an image path, by suffix; PNG when unknown.
pub fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

/// Read an image file and wrap it as base64 `ImageData`.
pub async fn load_image(path: &Path) -> Result<ImageData, DocSuiteError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| DocSuiteError::ImageReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
    let b64 = STANDARD.encode(&bytes);
    debug!("Encoded {} → {} bytes base64", path.display(), b64.len());
    Ok(ImageData::new(b64, media_type_for(path)).with_detail("high"))
}

async fn ask<T: serde::de::DeserializeOwned>(
    client: &ModelClient,
    prompt: &str,
    image: ImageData,
) -> Result<T, String> {
    let completion = client
        .complete_with_image(prompt, image)
        .await
        .map_err(|e| e.to_string())?;
    match decode_model_json::<T>(&completion.content) {
        ModelReply::Data(value) => Ok(value),
        ModelReply::NoData { reason } => Err(reason),
    }
}

/// Extract chart data from the image at `path`.
///
/// An unreadable file is an error; every model-side problem yields a
/// [`ChartData`] with `error` set.
pub async fn analyze_chart(
    client: Option<&ModelClient>,
    path: &Path,
    hint: Option<&str>,
) -> Result<ChartData, DocSuiteError> {
    let image = load_image(path).await?;
    let Some(client) = client else {
        return Ok(ChartData::failed(NO_VISION_API));
    };

    Ok(match ask::<ChartData>(client, &prompts::chart_prompt(hint), image).await {
        Ok(chart) => chart,
        Err(reason) => {
            warn!("Chart analysis of {} failed: {}", path.display(), reason);
            ChartData::failed(reason)
        }
    })
}

/// Extract components and connections from the diagram at `path`.
pub async fn analyze_diagram(
    client: Option<&ModelClient>,
    path: &Path,
    hint: Option<&str>,
) -> Result<DiagramInfo, DocSuiteError> {
    let image = load_image(path).await?;
    let Some(client) = client else {
        return Ok(DiagramInfo::failed(NO_VISION_API));
    };

    Ok(match ask::<DiagramInfo>(client, &prompts::diagram_prompt(hint), image).await {
        Ok(info) => info,
        Err(reason) => {
            warn!("Diagram analysis of {} failed: {}", path.display(), reason);
            DiagramInfo::failed(reason)
        }
    })
}

/// Analyse several chart images, at most `concurrency` at a time.
///
/// Results come back in input order.
pub async fn analyze_charts(
    client: Option<&ModelClient>,
    paths: &[PathBuf],
    hint: Option<&str>,
    concurrency: usize,
) -> Vec<(PathBuf, Result<ChartData, DocSuiteError>)> {
    info!("Analysing {} chart images", paths.len());
    let mut results: Vec<(usize, PathBuf, Result<ChartData, DocSuiteError>)> =
        stream::iter(paths.iter().enumerate().map(|(idx, path)| async move {
            let result = analyze_chart(client, path, hint).await;
            (idx, path.clone(), result)
        }))
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    results.sort_by_key(|(idx, _, _)| *idx);
    results
        .into_iter()
        .map(|(_, path, result)| (path, result))
        .collect()
}
