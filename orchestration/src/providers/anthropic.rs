//! Anthropic messages adapter.

use std::time::Instant;

use async_trait::async_trait;
use serde_json::json;

use crate::registry;
use crate::task::AiTask;

use super::reply;
use super::{AiResponse, ProviderClient, ProviderError, ProviderId};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const MODEL: &str = "claude-3-sonnet-20240229";
const API_VERSION: &str = "2023-06-01";

/// Client for the Anthropic messages API.
pub struct AnthropicClient {
    api_key: String,
    http: reqwest::Client,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(api_key: String, http: reqwest::Client, max_tokens: u32) -> Self {
        Self {
            api_key,
            http,
            max_tokens,
        }
    }

    fn prompt(&self, task: &AiTask) -> String {
        let spec = registry::specialization_of(ProviderId::Anthropic);
        format!(
            "Task: {}\n\
             Description: {}\n\
             Context: {}\n\n\
             As an AI specializing in {}, provide your analysis and recommendations.\n\n\
             Respond in JSON format with content, confidence, and reasoning.",
            task.task_type,
            task.description,
            task.context_json(),
            spec.strengths.join(", ")
        )
    }
}

#[async_trait]
impl ProviderClient for AnthropicClient {
    fn id(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    async fn complete(&self, task: &AiTask) -> Result<AiResponse, ProviderError> {
        let start = Instant::now();

        let request_body = json!({
            "model": MODEL,
            "max_tokens": self.max_tokens,
            "messages": [{"role": "user", "content": self.prompt(task)}],
        });

        let response = self
            .http
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed {
                provider: ProviderId::Anthropic,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::RequestFailed {
                provider: ProviderId::Anthropic,
                message: format!("Anthropic API error ({}): {}", status, body),
            });
        }

        let envelope: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| ProviderError::RequestFailed {
                    provider: ProviderId::Anthropic,
                    message: e.to_string(),
                })?;

        let text = envelope["content"][0]["text"].as_str().unwrap_or("");
        let tokens_used = (envelope["usage"]["input_tokens"].as_u64().unwrap_or(0)
            + envelope["usage"]["output_tokens"].as_u64().unwrap_or(0)) as u32;

        Ok(reply::into_response(
            ProviderId::Anthropic,
            text,
            tokens_used,
            start.elapsed(),
        ))
    }
}
