//! Reply normalization: structured parse with plain-text fallback.
//!
//! Providers are asked to answer as a JSON object carrying `content`,
//! `confidence`, and `reasoning`. Backends do not always comply; a reply
//! that cannot be parsed degrades into a plain-text response with a default
//! confidence instead of failing the call.

use std::time::Duration;

use serde::Deserialize;

use super::{AiResponse, ProviderId};

/// Confidence assigned when the provider did not report one.
pub const DEFAULT_CONFIDENCE: f32 = 0.8;

fn default_confidence() -> f32 {
    DEFAULT_CONFIDENCE
}

/// The structured shape providers are prompted to return.
#[derive(Debug, Deserialize)]
struct StructuredReply {
    content: String,
    #[serde(default = "default_confidence")]
    confidence: f32,
    #[serde(default)]
    reasoning: String,
}

/// Normalize raw reply text into an [`AiResponse`].
///
/// Structured JSON replies keep their reported confidence (clamped to
/// `[0, 1]`); anything else becomes the content verbatim with
/// [`DEFAULT_CONFIDENCE`] and `"unstructured"` reasoning.
pub fn into_response(
    provider: ProviderId,
    raw: &str,
    tokens_used: u32,
    execution_time: Duration,
) -> AiResponse {
    match serde_json::from_str::<StructuredReply>(raw) {
        Ok(parsed) => AiResponse {
            provider,
            content: parsed.content,
            confidence: parsed.confidence.clamp(0.0, 1.0),
            reasoning: parsed.reasoning,
            execution_time,
            tokens_used,
        },
        Err(_) => AiResponse {
            provider,
            content: raw.to_string(),
            confidence: DEFAULT_CONFIDENCE,
            reasoning: "unstructured".to_string(),
            execution_time,
            tokens_used,
        },
    }
}

/// Whitespace-token estimate for backends that report no usage.
pub fn estimate_tokens(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}
