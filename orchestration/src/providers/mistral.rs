//! Mistral chat-completions adapter.

use std::time::Instant;

use async_trait::async_trait;
use serde_json::json;

use crate::registry;
use crate::task::AiTask;

use super::reply;
use super::{AiResponse, ProviderClient, ProviderError, ProviderId};

const API_URL: &str = "https://api.mistral.ai/v1/chat/completions";
const MODEL: &str = "mistral-large-latest";

/// Client for the Mistral chat-completions API.
pub struct MistralClient {
    api_key: String,
    http: reqwest::Client,
    max_tokens: u32,
}

impl MistralClient {
    pub fn new(api_key: String, http: reqwest::Client, max_tokens: u32) -> Self {
        Self {
            api_key,
            http,
            max_tokens,
        }
    }

    fn prompt(&self, task: &AiTask) -> String {
        let spec = registry::specialization_of(ProviderId::Mistral);
        format!(
            "Task: {}\n\
             Description: {}\n\
             Context: {}\n\n\
             Specializing in: {}\n\n\
             Respond in JSON with content, confidence, and reasoning.",
            task.task_type,
            task.description,
            task.context_json(),
            spec.strengths.join(", ")
        )
    }
}

#[async_trait]
impl ProviderClient for MistralClient {
    fn id(&self) -> ProviderId {
        ProviderId::Mistral
    }

    async fn complete(&self, task: &AiTask) -> Result<AiResponse, ProviderError> {
        let start = Instant::now();

        let request_body = json!({
            "model": MODEL,
            "messages": [{"role": "user", "content": self.prompt(task)}],
            "max_tokens": self.max_tokens,
        });

        let response = self
            .http
            .post(API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed {
                provider: ProviderId::Mistral,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::RequestFailed {
                provider: ProviderId::Mistral,
                message: format!("Mistral API error ({}): {}", status, body),
            });
        }

        let envelope: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| ProviderError::RequestFailed {
                    provider: ProviderId::Mistral,
                    message: e.to_string(),
                })?;

        let text = envelope["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("");
        let tokens_used = envelope["usage"]["total_tokens"].as_u64().unwrap_or(0) as u32;

        Ok(reply::into_response(
            ProviderId::Mistral,
            text,
            tokens_used,
            start.elapsed(),
        ))
    }
}
