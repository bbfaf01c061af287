//! OpenAI chat-completions adapter.

use std::time::Instant;

use async_trait::async_trait;
use serde_json::json;

use crate::registry;
use crate::task::AiTask;

use super::reply;
use super::{AiResponse, ProviderClient, ProviderError, ProviderId};

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4";

/// Client for the OpenAI chat-completions API.
pub struct OpenAiClient {
    api_key: String,
    http: reqwest::Client,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(api_key: String, http: reqwest::Client, max_tokens: u32, temperature: f32) -> Self {
        Self {
            api_key,
            http,
            max_tokens,
            temperature,
        }
    }

    fn system_prompt(&self, task: &AiTask) -> String {
        let spec = registry::specialization_of(ProviderId::OpenAi);
        format!(
            "You are an expert software architect collaborating with other AI systems.\n\
             Task: {}\n\
             Focus on: {}\n\n\
             Provide your response in JSON format with:\n\
             - content: Your main response\n\
             - confidence: Your confidence level (0-1)\n\
             - reasoning: Why you chose this approach",
            task.task_type,
            spec.strengths.join(", ")
        )
    }
}

#[async_trait]
impl ProviderClient for OpenAiClient {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    async fn complete(&self, task: &AiTask) -> Result<AiResponse, ProviderError> {
        let start = Instant::now();

        let request_body = json!({
            "model": MODEL,
            "messages": [
                {"role": "system", "content": self.system_prompt(task)},
                {
                    "role": "user",
                    "content": format!("{}\n\nContext: {}", task.description, task.context_json()),
                }
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        let response = self
            .http
            .post(API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed {
                provider: ProviderId::OpenAi,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::RequestFailed {
                provider: ProviderId::OpenAi,
                message: format!("OpenAI API error ({}): {}", status, body),
            });
        }

        let envelope: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| ProviderError::RequestFailed {
                    provider: ProviderId::OpenAi,
                    message: e.to_string(),
                })?;

        let text = envelope["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("");
        let tokens_used = envelope["usage"]["total_tokens"].as_u64().unwrap_or(0) as u32;

        Ok(reply::into_response(
            ProviderId::OpenAi,
            text,
            tokens_used,
            start.elapsed(),
        ))
    }
}
