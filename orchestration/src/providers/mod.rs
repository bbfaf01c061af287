//! Provider adapters: a uniform call contract over heterogeneous AI backends.
//!
//! Each backend (OpenAI, Anthropic, Gemini, Mistral) implements the same
//! [`ProviderClient`] contract and normalizes its reply into an
//! [`AiResponse`]. The [`ProviderPool`] owns one live client per configured
//! credential; providers without a credential are simply absent, never
//! constructed.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::task::AiTask;

pub mod anthropic;
pub mod gemini;
pub mod mistral;
pub mod openai;
pub mod reply;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use mistral::MistralClient;
pub use openai::OpenAiClient;

/// Errors from a single provider call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider {0} is not configured")]
    NotConfigured(ProviderId),

    #[error("request to {provider} failed: {message}")]
    RequestFailed {
        provider: ProviderId,
        message: String,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Identity of an AI backend. The set is closed; registration order is
/// fixed as listed here and drives deterministic routing tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    OpenAi,
    Anthropic,
    Gemini,
    Mistral,
}

impl ProviderId {
    /// All provider identities in registration order.
    pub fn all() -> &'static [ProviderId] {
        &[
            ProviderId::OpenAi,
            ProviderId::Anthropic,
            ProviderId::Gemini,
            ProviderId::Mistral,
        ]
    }

    /// The string form, also the key in the credential map.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::Mistral => "mistral",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a provider name.
#[derive(Debug, thiserror::Error)]
#[error("unknown provider: {0}")]
pub struct UnknownProvider(String);

impl std::str::FromStr for ProviderId {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "gemini" => Ok(Self::Gemini),
            "mistral" => Ok(Self::Mistral),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// Normalized reply from a single provider call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiResponse {
    /// Which backend produced this response.
    pub provider: ProviderId,
    /// The main response text.
    pub content: String,
    /// Self-reported confidence in `[0, 1]`; defaulted on degraded parses.
    pub confidence: f32,
    /// Why the provider chose this approach.
    pub reasoning: String,
    /// Wall-clock span of the outbound call.
    pub execution_time: Duration,
    /// Token usage, best-effort estimated when the backend reports none.
    pub tokens_used: u32,
}

/// Uniform async contract to one AI backend.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// The identity of this backend.
    fn id(&self) -> ProviderId;

    /// Issue one completion call for the task.
    async fn complete(&self, task: &AiTask) -> Result<AiResponse, ProviderError>;
}

/// Configuration for building a provider pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Credential per provider name; absent entries disable that provider.
    pub api_keys: HashMap<String, String>,
    /// Transport timeout applied to every outbound call.
    pub timeout: Duration,
    /// Maximum tokens requested per completion.
    pub max_tokens: u32,
    /// Sampling temperature for completions.
    pub temperature: f32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let mut api_keys = HashMap::new();

        // Load from environment
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            api_keys.insert("openai".to_string(), key);
        }
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            api_keys.insert("anthropic".to_string(), key);
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            api_keys.insert("gemini".to_string(), key);
        }
        if let Ok(key) = std::env::var("MISTRAL_API_KEY") {
            api_keys.insert("mistral".to_string(), key);
        }

        Self {
            api_keys,
            timeout: Duration::from_secs(120),
            max_tokens: 4000,
            temperature: 0.7,
        }
    }
}

/// Owns the live clients for all configured providers.
///
/// The client set is populated once at construction and read-only for the
/// lifetime of the pool. Missing credentials leave a provider absent;
/// construction itself only fails if the HTTP client cannot be built.
pub struct ProviderPool {
    clients: Vec<Box<dyn ProviderClient>>,
}

impl ProviderPool {
    /// Build a pool from configuration, creating one client per present
    /// credential in registration order.
    pub fn new(config: &PoolConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::HttpClient(e.to_string()))?;

        let mut clients: Vec<Box<dyn ProviderClient>> = Vec::new();

        if let Some(key) = config.api_keys.get(ProviderId::OpenAi.as_str()) {
            clients.push(Box::new(OpenAiClient::new(
                key.clone(),
                http.clone(),
                config.max_tokens,
                config.temperature,
            )));
        }
        if let Some(key) = config.api_keys.get(ProviderId::Anthropic.as_str()) {
            clients.push(Box::new(AnthropicClient::new(
                key.clone(),
                http.clone(),
                config.max_tokens,
            )));
        }
        if let Some(key) = config.api_keys.get(ProviderId::Gemini.as_str()) {
            clients.push(Box::new(GeminiClient::new(
                key.clone(),
                http.clone(),
                config.max_tokens,
            )));
        }
        if let Some(key) = config.api_keys.get(ProviderId::Mistral.as_str()) {
            clients.push(Box::new(MistralClient::new(
                key.clone(),
                http.clone(),
                config.max_tokens,
            )));
        }

        info!(providers = clients.len(), "Provider pool initialized");

        Ok(Self { clients })
    }

    /// Build a pool from pre-constructed clients. Registration order is the
    /// order of the vector. Used to plug in custom or stub backends.
    pub fn from_clients(clients: Vec<Box<dyn ProviderClient>>) -> Self {
        Self { clients }
    }

    /// Providers with a live client, in registration order.
    pub fn available(&self) -> Vec<ProviderId> {
        self.clients.iter().map(|c| c.id()).collect()
    }

    /// Whether a specific provider has a live client.
    pub fn is_available(&self, provider: ProviderId) -> bool {
        self.clients.iter().any(|c| c.id() == provider)
    }

    /// Number of configured providers.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether no providers are configured.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Invoke one provider with one task.
    ///
    /// Fails with [`ProviderError::NotConfigured`] when the provider has no
    /// live client; transport and auth failures surface as
    /// [`ProviderError::RequestFailed`].
    pub async fn invoke(
        &self,
        provider: ProviderId,
        task: &AiTask,
    ) -> Result<AiResponse, ProviderError> {
        let client = self
            .clients
            .iter()
            .find(|c| c.id() == provider)
            .ok_or(ProviderError::NotConfigured(provider))?;

        debug!(
            provider = %provider,
            task_id = %task.id,
            task_type = %task.task_type,
            "Invoking provider"
        );

        let response = client.complete(task).await?;

        debug!(
            provider = %provider,
            confidence = response.confidence,
            tokens = response.tokens_used,
            elapsed_ms = response.execution_time.as_millis() as u64,
            "Provider responded"
        );

        Ok(response)
    }
}
