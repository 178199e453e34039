//! Model-assisted OCR correction with a rule-based fallback.

use super::decode::{decode_model_json, null_as_default, ModelReply};
use super::llm::ModelClient;
use crate::ocr::quick_fix_ocr;
use crate::prompts;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Confidence reported for rule-based corrections.
pub const RULE_BASED_CONFIDENCE: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CorrectionMethod {
    Ai,
    RuleBased,
}

/// One word-level fix reported by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub original: String,
    pub corrected: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Corrected text and how it was obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrCorrection {
    pub corrected_text: String,
    pub corrections: Vec<Correction>,
    pub confidence: f64,
    pub method: CorrectionMethod,
    /// Why the model path was abandoned, when it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_error: Option<String>,
}

impl OcrCorrection {
    pub fn rule_based(text: &str, ai_error: Option<String>) -> Self {
        Self {
            corrected_text: quick_fix_ocr(text),
            corrections: Vec::new(),
            confidence: RULE_BASED_CONFIDENCE,
            method: CorrectionMethod::RuleBased,
            ai_error,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ModelCorrection {
    corrected_text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    corrections: Vec<Correction>,
    #[serde(default)]
    overall_confidence: Option<f64>,
    #[serde(default)]
    confidence: Option<f64>,
}

impl From<ModelCorrection> for OcrCorrection {
    fn from(reply: ModelCorrection) -> Self {
        Self {
            corrected_text: reply.corrected_text,
            corrections: reply.corrections,
            confidence: reply.overall_confidence.or(reply.confidence).unwrap_or(0.0),
            method: CorrectionMethod::Ai,
            ai_error: None,
        }
    }
}

/// Correct OCR errors in `text`, with the model when one is available.
pub async fn fix_ocr(
    client: Option<&ModelClient>,
    text: &str,
    language: &str,
    context: Option<&str>,
) -> OcrCorrection {
    let Some(client) = client else {
        return OcrCorrection::rule_based(text, None);
    };

    let prompt = prompts::ocr_fix_prompt(text, language, context);
    let reason = match client.complete(&prompt).await {
        Ok(completion) => match decode_model_json::<ModelCorrection>(&completion.content) {
            ModelReply::Data(reply) => return reply.into(),
            ModelReply::NoData { reason } => reason,
        },
        Err(e) => e.to_string(),
    };

    warn!("OCR correction fell back to rules: {}", reason);
    OcrCorrection::rule_based(text, Some(reason))
}
