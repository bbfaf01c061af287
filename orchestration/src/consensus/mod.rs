//! Aggregator and consensus engine.
//!
//! Two reduction modes over multi-provider output:
//! - **Combine**: concatenate responses under labeled section headers,
//!   preserving input order. Used after the parallel generation phase.
//! - **Consensus**: put the same question to every available provider and
//!   reduce the answers to a mean-confidence score plus a recommendation.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::dispatch::{Dispatcher, TaskOutcome};
use crate::providers::{AiResponse, ProviderId, ProviderPool};
use crate::task::AiTask;

/// Error type for consensus operations.
#[derive(Debug, thiserror::Error)]
pub enum ConsensusError {
    #[error("no providers configured")]
    NoProviders,

    #[error("no responses carried a confidence value")]
    NoConsensusData,
}

/// Banner opening every combined blob.
pub const COMBINED_BANNER: &str = "// === MULTI-AI COLLABORATIVE CODE ===";

/// Recommendation text when no response content is available.
pub const NO_RESPONSES_SENTINEL: &str = "No responses available";

static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^// === Section \d+: Generated by (\w+) ===$")
        .expect("SECTION_RE regex should compile")
});

/// Concatenate responses into one blob under labeled section headers.
///
/// Sections follow input order; each header names the producing provider
/// and its confidence and wall-clock time.
pub fn combine_responses(responses: &[AiResponse]) -> String {
    let mut combined = format!("{}\n\n", COMBINED_BANNER);

    for (i, response) in responses.iter().enumerate() {
        combined.push_str(&format!(
            "// === Section {}: Generated by {} ===\n",
            i + 1,
            response.provider
        ));
        combined.push_str(&format!(
            "// Confidence: {}, Execution Time: {:.2}s\n",
            response.confidence,
            response.execution_time.as_secs_f64()
        ));
        combined.push_str(&response.content);
        combined.push_str("\n\n");
    }

    combined
}

/// Split a combined blob back into `(provider, body)` sections.
///
/// Inverse of [`combine_responses`] up to surrounding whitespace: section
/// labels come back in their original order.
pub fn split_combined(combined: &str) -> Vec<(ProviderId, String)> {
    let headers: Vec<regex::Captures<'_>> = SECTION_RE.captures_iter(combined).collect();

    let mut sections = Vec::new();
    for (i, caps) in headers.iter().enumerate() {
        let Ok(provider) = caps[1].parse::<ProviderId>() else {
            continue;
        };
        let start = caps.get(0).map(|m| m.end()).unwrap_or(0);
        let end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(combined.len());

        let body = combined[start..end]
            .lines()
            .filter(|line| !line.starts_with("// Confidence:"))
            .collect::<Vec<_>>()
            .join("\n");

        sections.push((provider, body.trim().to_string()));
    }

    sections
}

/// Result of a consensus round across all available providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusReport {
    /// One outcome per available provider, in registration order.
    pub responses: Vec<TaskOutcome>,
    /// Arithmetic mean of the confidence values actually present.
    pub consensus_score: f32,
    /// Content of the first successful response.
    pub recommendation: String,
}

/// Puts the same question to every available provider and reduces the
/// answers.
pub struct ConsensusEngine {
    pool: Arc<ProviderPool>,
    dispatcher: Dispatcher,
}

impl ConsensusEngine {
    pub fn new(pool: Arc<ProviderPool>) -> Self {
        let dispatcher = Dispatcher::new(pool.clone());
        Self { pool, dispatcher }
    }

    /// Ask every available provider the same question and score agreement.
    ///
    /// Fails with [`ConsensusError::NoProviders`] when nothing is
    /// configured, and with [`ConsensusError::NoConsensusData`] when no
    /// response carried a confidence value.
    pub async fn ask(
        &self,
        question: &str,
        context: Value,
    ) -> Result<ConsensusReport, ConsensusError> {
        let available = self.pool.available();
        if available.is_empty() {
            return Err(ConsensusError::NoProviders);
        }

        let assignments: Vec<(ProviderId, AiTask)> = available
            .iter()
            .map(|&provider| {
                (
                    provider,
                    AiTask::new("consensus_question", question).with_context(context.clone()),
                )
            })
            .collect();

        let responses = self.dispatcher.dispatch_all(&assignments).await;

        let confidences: Vec<f32> = responses
            .iter()
            .filter_map(|outcome| outcome.response().map(|r| r.confidence))
            .collect();

        if confidences.is_empty() {
            return Err(ConsensusError::NoConsensusData);
        }

        let consensus_score = confidences.iter().sum::<f32>() / confidences.len() as f32;

        let recommendation = responses
            .iter()
            .find_map(|outcome| outcome.response())
            .map(|r| r.content.clone())
            .unwrap_or_else(|| NO_RESPONSES_SENTINEL.to_string());

        info!(
            providers = responses.len(),
            consensus_score, "Consensus round complete"
        );

        Ok(ConsensusReport {
            responses,
            consensus_score,
            recommendation,
        })
    }
}
