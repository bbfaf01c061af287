//! Google Gemini generateContent adapter.
//!
//! Gemini reports no token usage for this endpoint, so usage is estimated
//! from the reply text.

use std::time::Instant;

use async_trait::async_trait;
use serde_json::json;

use crate::registry;
use crate::task::AiTask;

use super::reply;
use super::{AiResponse, ProviderClient, ProviderError, ProviderId};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MODEL: &str = "gemini-pro";

/// Client for the Gemini generateContent API.
pub struct GeminiClient {
    api_key: String,
    http: reqwest::Client,
    max_tokens: u32,
}

impl GeminiClient {
    pub fn new(api_key: String, http: reqwest::Client, max_tokens: u32) -> Self {
        Self {
            api_key,
            http,
            max_tokens,
        }
    }

    fn prompt(&self, task: &AiTask) -> String {
        let spec = registry::specialization_of(ProviderId::Gemini);
        format!(
            "Task: {}\n\
             Description: {}\n\
             Context: {}\n\n\
             Focus on: {}\n\n\
             Provide response in JSON format with content, confidence, and reasoning.",
            task.task_type,
            task.description,
            task.context_json(),
            spec.strengths.join(", ")
        )
    }
}

#[async_trait]
impl ProviderClient for GeminiClient {
    fn id(&self) -> ProviderId {
        ProviderId::Gemini
    }

    async fn complete(&self, task: &AiTask) -> Result<AiResponse, ProviderError> {
        let start = Instant::now();

        let request_body = json!({
            "contents": [{"parts": [{"text": self.prompt(task)}]}],
            "generationConfig": {
                "temperature": 0.3,
                "maxOutputTokens": self.max_tokens,
            }
        });

        let url = format!(
            "{}/{}:generateContent?key={}",
            API_BASE, MODEL, self.api_key
        );

        let response = self
            .http
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed {
                provider: ProviderId::Gemini,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::RequestFailed {
                provider: ProviderId::Gemini,
                message: format!("Gemini API error ({}): {}", status, body),
            });
        }

        let envelope: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| ProviderError::RequestFailed {
                    provider: ProviderId::Gemini,
                    message: e.to_string(),
                })?;

        let text = envelope["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or("");
        let tokens_used = reply::estimate_tokens(text);

        Ok(reply::into_response(
            ProviderId::Gemini,
            text,
            tokens_used,
            start.elapsed(),
        ))
    }
}
