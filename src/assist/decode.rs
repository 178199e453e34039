//! Lenient decoding of JSON replies from language models.
//!
//! Models wrap JSON in Markdown fences, prefix it with prose or append a
//! closing remark. [`decode_model_json`] peels those layers off and reports
//! an undecodable reply as [`ModelReply::NoData`] rather than an error, so
//! services can fall back without a failure path of their own.

use crate::error::AssistError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

const FENCE: &str = "```";

/// Outcome of decoding a model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply<T> {
    Data(T),
    NoData { reason: String },
}

impl<T> ModelReply<T> {
    pub fn into_result(self) -> Result<T, AssistError> {
        match self {
            ModelReply::Data(value) => Ok(value),
            ModelReply::NoData { reason } => Err(AssistError::Decode { reason }),
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, ModelReply::Data(_))
    }
}

/// Field deserializer that maps an explicit `null` to the default value.
///
/// Models often answer `"legend": null` instead of omitting the key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of the first fenced block, without a leading `json` tag.
fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };
    let body = rest.split(FENCE).next().unwrap_or(rest);
    let body = body
        .strip_prefix("json")
        .or_else(|| body.strip_prefix("JSON"))
        .unwrap_or(body);
    body.trim()
}

/// The span from the first `{` to the last `}`, if any.
fn outer_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Decode a model reply into `T`.
///
/// Tries, in order: the reply with fences and a `json` tag removed, then the
/// outermost `{...}` span of the raw reply.
pub fn decode_model_json<T: DeserializeOwned>(raw: &str) -> ModelReply<T> {
    if raw.trim().is_empty() {
        return ModelReply::NoData {
            reason: "empty reply".into(),
        };
    }

    let first_err = match serde_json::from_str::<T>(strip_fences(raw)) {
        Ok(value) => return ModelReply::Data(value),
        Err(e) => e,
    };

    if let Some(span) = outer_object(raw) {
        if let Ok(value) = serde_json::from_str::<T>(span) {
            return ModelReply::Data(value);
        }
    }

    ModelReply::NoData {
        reason: first_err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Reply {
        summary: String,
        #[serde(default, deserialize_with = "null_as_default")]
        key_points: Vec<String>,
    }

    fn data(raw: &str) -> Option<Reply> {
        match decode_model_json::<Reply>(raw) {
            ModelReply::Data(r) => Some(r),
            ModelReply::NoData { .. } => None,
        }
    }

    #[test]
    fn bare_json() {
        let r = data(r#"{"summary": "ok", "key_points": ["a"]}"#).unwrap();
        assert_eq!(r.summary, "ok");
        assert_eq!(r.key_points, vec!["a"]);
    }

    #[test]
    fn fenced_json_with_tag() {
        let raw = "```json\n{\"summary\": \"fenced\"}\n```";
        assert_eq!(data(raw).unwrap().summary, "fenced");
    }

    #[test]
    fn fenced_json_without_tag() {
        let raw = "```\n{\"summary\": \"plain fence\"}\n```\nHope this helps!";
        assert_eq!(data(raw).unwrap().summary, "plain fence");
    }

    #[test]
    fn json_inside_prose() {
        let raw = "Sure! Here is the result: {\"summary\": \"found\"} Let me know.";
        assert_eq!(data(raw).unwrap().summary, "found");
    }

    #[test]
    fn garbage_is_no_data() {
        match decode_model_json::<Reply>("I cannot read this image.") {
            ModelReply::NoData { reason } => assert!(!reason.is_empty()),
            ModelReply::Data(_) => panic!("expected no data"),
        }
    }

    #[test]
    fn empty_reply() {
        let reply = decode_model_json::<Reply>("   ");
        assert_eq!(
            reply,
            ModelReply::NoData {
                reason: "empty reply".into()
            }
        );
    }

    #[test]
    fn null_list_becomes_empty() {
        let r = data(r#"{"summary": "s", "key_points": null}"#).unwrap();
        assert!(r.key_points.is_empty());
    }

    #[test]
    fn wrong_shape_is_no_data() {
        assert!(!decode_model_json::<Reply>(r#"{"other": 1}"#).is_data());
    }

    #[test]
    fn into_result_maps_to_decode_error() {
        let err = decode_model_json::<Reply>("nope").into_result().unwrap_err();
        assert!(matches!(err, AssistError::Decode { .. }));
    }
}
