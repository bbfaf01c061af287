//! Collaboration coordinator: the four-phase generation pipeline.
//!
//! Drives architecture design, parallel code generation, parallel review,
//! and final integration across whatever providers are configured. Phases
//! run strictly in order because each consumes the previous phase's output;
//! the calls inside a phase run concurrently.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                   CollabCoordinator                     │
//! │  1. Architecture  - design specialist                   │
//! │  2. Generation    - frontend/backend/database/api       │
//! │  3. Review        - security/performance/best-practices │
//! │  4. Integration   - primary provider merges everything  │
//! └───────────┬───────────────┬───────────────┬─────────────┘
//!             ▼               ▼               ▼
//!       ┌───────────┐   ┌───────────┐   ┌───────────┐
//!       │  Router   │   │Dispatcher │   │ Consensus │
//!       └───────────┘   └───────────┘   └───────────┘
//! ```
//!
//! A provider dropping out mid-phase degrades that slot to an error-marked
//! entry; the pipeline aborts only when zero providers are configured.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::consensus::{self, ConsensusEngine, ConsensusError, ConsensusReport};
use crate::dispatch::{Dispatcher, TaskOutcome};
use crate::providers::{
    AiResponse, PoolConfig, ProviderClient, ProviderError, ProviderId, ProviderPool,
};
use crate::registry;
use crate::router::{RouteError, TaskRouter};
use crate::task::AiTask;

/// Error type for coordinator operations.
#[derive(Debug, thiserror::Error)]
pub enum CollabError {
    #[error("no providers configured")]
    NoProviders,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Routing(#[from] RouteError),
}

/// Fixed task set for the parallel generation phase.
const GENERATION_TASKS: [(&str, &str); 4] = [
    ("frontend_code", "Generate frontend components"),
    ("backend_code", "Generate backend services"),
    ("database_design", "Design database schema"),
    ("api_design", "Design API endpoints"),
];

/// Fixed task set for the review phase.
const REVIEW_TASKS: [(&str, &str); 3] = [
    ("security_review", "Review code for security issues"),
    ("performance_review", "Optimize for performance"),
    ("best_practices_review", "Apply best practices"),
];

/// Collaboration features surfaced in the capability report.
pub const COLLABORATION_FEATURES: [&str; 5] = [
    "Parallel code generation",
    "Cross-model code review",
    "Consensus building",
    "Specialized task assignment",
    "Quality scoring",
];

/// Derived statistics over every response produced in a collaboration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaborationSummary {
    /// Distinct providers that contributed across all phases.
    pub total_ais_used: usize,
    /// Sum of wall-clock time across all dispatched calls.
    pub total_execution_time: Duration,
    /// Mean confidence over all responses.
    pub average_confidence: f32,
    /// Sum of token usage across all responses.
    pub total_tokens_used: u64,
    /// Contributing providers in response order (with repeats).
    pub providers_used: Vec<ProviderId>,
}

impl CollaborationSummary {
    fn from_responses(responses: &[&AiResponse]) -> Self {
        let distinct: HashSet<ProviderId> = responses.iter().map(|r| r.provider).collect();
        let average_confidence = if responses.is_empty() {
            0.0
        } else {
            responses.iter().map(|r| r.confidence).sum::<f32>() / responses.len() as f32
        };

        Self {
            total_ais_used: distinct.len(),
            total_execution_time: responses.iter().map(|r| r.execution_time).sum(),
            average_confidence,
            total_tokens_used: responses.iter().map(|r| u64::from(r.tokens_used)).sum(),
            providers_used: responses.iter().map(|r| r.provider).collect(),
        }
    }
}

/// Final artifact of a collaboration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaborationResult {
    /// Architecture produced in Phase 1.
    pub architecture: String,
    /// Integrated code produced in Phase 4.
    pub code: String,
    /// Successful review responses from Phase 3, in task order.
    pub reviews: Vec<AiResponse>,
    /// Derived statistics over the whole run.
    pub summary: CollaborationSummary,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// One entry of the capability report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCapability {
    pub provider: ProviderId,
    pub strengths: Vec<String>,
    pub best_for: Vec<String>,
    pub status: String,
}

/// Snapshot of configured providers and what they are good at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityReport {
    pub capabilities: Vec<ProviderCapability>,
    pub total_ais: usize,
    pub collaboration_features: Vec<String>,
}

/// Central orchestrator owning the provider pool and its sub-components.
///
/// Constructed once with a credential map; the client set is read-only
/// afterwards. All state lives behind `Arc`, so the coordinator is cheap to
/// share across an outer transport layer.
pub struct CollabCoordinator {
    pool: Arc<ProviderPool>,
    router: TaskRouter,
    dispatcher: Dispatcher,
    consensus: ConsensusEngine,
    primary: ProviderId,
}

impl CollabCoordinator {
    /// Build a coordinator from configuration. Missing credentials disable
    /// individual providers; only the HTTP client construction can fail.
    pub fn new(config: PoolConfig) -> Result<Self, CollabError> {
        let pool = Arc::new(ProviderPool::new(&config)?);
        Ok(Self::from_pool(pool))
    }

    /// Build a coordinator over pre-constructed clients (custom or stub
    /// backends). Registration order is the vector order.
    pub fn from_clients(clients: Vec<Box<dyn ProviderClient>>) -> Self {
        Self::from_pool(Arc::new(ProviderPool::from_clients(clients)))
    }

    fn from_pool(pool: Arc<ProviderPool>) -> Self {
        Self {
            router: TaskRouter::new(),
            dispatcher: Dispatcher::new(pool.clone()),
            consensus: ConsensusEngine::new(pool.clone()),
            pool,
            primary: ProviderId::OpenAi,
        }
    }

    /// Override the provider preferred for final integration.
    pub fn with_primary(mut self, primary: ProviderId) -> Self {
        self.primary = primary;
        self
    }

    /// Providers with a live client, in registration order.
    pub fn available_providers(&self) -> Vec<ProviderId> {
        self.pool.available()
    }

    /// Invoke one specific provider directly.
    ///
    /// Propagates [`ProviderError::NotConfigured`] when the provider was
    /// explicitly requested but has no client.
    pub async fn invoke(
        &self,
        provider: ProviderId,
        task: &AiTask,
    ) -> Result<AiResponse, ProviderError> {
        self.pool.invoke(provider, task).await
    }

    /// Drive the full four-phase collaborative generation pipeline.
    pub async fn collaborative_generate(
        &self,
        description: &str,
        tech_stack: &str,
    ) -> Result<CollaborationResult, CollabError> {
        let available = self.pool.available();
        if available.is_empty() {
            return Err(CollabError::NoProviders);
        }

        let started_at = Utc::now();
        info!(
            description,
            tech_stack,
            providers = available.len(),
            "Starting collaborative generation"
        );

        // Phase 1: architecture design
        let architecture_task = AiTask::new(
            "architecture_design",
            format!("Design system architecture for: {}", description),
        )
        .with_context(json!({
            "tech_stack": tech_stack,
            "project_description": description,
        }));

        let architect = match registry::specialist_for("system_design", &available) {
            Some(provider) => provider,
            None => self.router.select(&architecture_task, &available)?,
        };
        let architecture = self.pool.invoke(architect, &architecture_task).await?;
        info!(provider = %architect, "Architecture phase complete");

        // Phase 2: parallel code generation
        let generation_outcomes = self
            .route_and_dispatch(
                &GENERATION_TASKS,
                json!({"architecture": architecture.content}),
                &available,
            )
            .await?;
        let generation: Vec<AiResponse> = generation_outcomes
            .iter()
            .filter_map(|outcome| outcome.response().cloned())
            .collect();
        let combined_code = consensus::combine_responses(&generation);
        info!(
            completed = generation.len(),
            dispatched = generation_outcomes.len(),
            "Generation phase complete"
        );

        // Phase 3: parallel review
        let review_outcomes = self
            .route_and_dispatch(&REVIEW_TASKS, json!({"code": combined_code}), &available)
            .await?;
        let reviews: Vec<AiResponse> = review_outcomes
            .iter()
            .filter_map(|outcome| outcome.response().cloned())
            .collect();
        info!(
            completed = reviews.len(),
            dispatched = review_outcomes.len(),
            "Review phase complete"
        );

        // Phase 4: final integration and consensus
        let integrator = if available.contains(&self.primary) {
            self.primary
        } else {
            available[0]
        };
        let review_contents: Vec<&str> = reviews.iter().map(|r| r.content.as_str()).collect();
        let consensus_task = AiTask::new(
            "consensus_building",
            "Integrate feedback and create final optimized code",
        )
        .with_context(json!({
            "original_code": combined_code,
            "reviews": review_contents,
            "feedback_summary": summarize_reviews(&reviews),
        }));
        let final_response = self.pool.invoke(integrator, &consensus_task).await?;
        info!(provider = %integrator, "Integration phase complete");

        let mut all_responses: Vec<&AiResponse> =
            Vec::with_capacity(generation.len() + reviews.len() + 2);
        all_responses.push(&architecture);
        all_responses.extend(&generation);
        all_responses.extend(&reviews);
        all_responses.push(&final_response);
        let summary = CollaborationSummary::from_responses(&all_responses);

        Ok(CollaborationResult {
            architecture: architecture.content,
            code: final_response.content,
            reviews,
            summary,
            started_at,
            completed_at: Utc::now(),
        })
    }

    /// Ask every available provider the same question and score agreement.
    pub async fn consensus(
        &self,
        question: &str,
        context: Value,
    ) -> Result<ConsensusReport, ConsensusError> {
        self.consensus.ask(question, context).await
    }

    /// Report configured providers and their declared capabilities.
    pub fn capabilities(&self) -> CapabilityReport {
        let capabilities: Vec<ProviderCapability> = self
            .pool
            .available()
            .into_iter()
            .map(|provider| {
                let spec = registry::specialization_of(provider);
                ProviderCapability {
                    provider,
                    strengths: spec.strengths.iter().map(|s| s.to_string()).collect(),
                    best_for: spec.use_for.iter().map(|s| s.to_string()).collect(),
                    status: "connected".to_string(),
                }
            })
            .collect();

        CapabilityReport {
            total_ais: capabilities.len(),
            capabilities,
            collaboration_features: COLLABORATION_FEATURES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Route each fixed task, then dispatch the whole batch concurrently.
    async fn route_and_dispatch(
        &self,
        specs: &[(&str, &str)],
        context: Value,
        available: &[ProviderId],
    ) -> Result<Vec<TaskOutcome>, RouteError> {
        let assignments = specs
            .iter()
            .map(|(task_type, description)| {
                let task =
                    AiTask::new(*task_type, *description).with_context(context.clone());
                let provider = self.router.select(&task, available)?;
                Ok((provider, task))
            })
            .collect::<Result<Vec<_>, RouteError>>()?;

        Ok(self.dispatcher.dispatch_all(&assignments).await)
    }
}

/// Truncated per-review digest fed into the integration prompt.
fn summarize_reviews(reviews: &[AiResponse]) -> String {
    let mut summary = String::from("Review Summary:\n");
    for review in reviews {
        let preview: String = review.content.chars().take(200).collect();
        summary.push_str(&format!("- {}: {}...\n", review.provider, preview));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubProvider;

    fn coordinator(providers: Vec<StubProvider>) -> CollabCoordinator {
        CollabCoordinator::from_clients(
            providers
                .into_iter()
                .map(|p| Box::new(p) as Box<dyn ProviderClient>)
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_zero_providers_is_fatal() {
        let coordinator = coordinator(vec![]);
        let err = coordinator
            .collaborative_generate("todo app", "React")
            .await
            .unwrap_err();
        assert!(matches!(err, CollabError::NoProviders));
    }

    #[tokio::test]
    async fn test_single_provider_runs_all_phases() {
        let stub = StubProvider::new(ProviderId::Anthropic, 0.85).with_content("fn main() {}");
        let calls = stub.call_log();
        let coordinator = coordinator(vec![stub]);

        let result = coordinator
            .collaborative_generate("todo app", "React")
            .await
            .unwrap();

        assert!(!result.code.is_empty());
        assert!(!result.architecture.is_empty());
        assert_eq!(result.reviews.len(), 3);
        assert_eq!(result.summary.total_ais_used, 1);
        // 1 architecture + 4 generation + 3 review + 1 integration
        let log = calls.lock().unwrap();
        assert_eq!(log.len(), 9);
        assert_eq!(log[0], "architecture_design");
        assert_eq!(log[8], "consensus_building");
    }

    #[tokio::test]
    async fn test_security_review_goes_to_specialist() {
        let openai = StubProvider::new(ProviderId::OpenAi, 0.9);
        let anthropic = StubProvider::new(ProviderId::Anthropic, 0.8);
        let anthropic_calls = anthropic.call_log();
        let coordinator = coordinator(vec![openai, anthropic]);

        coordinator
            .collaborative_generate("todo app", "React")
            .await
            .unwrap();

        let log = anthropic_calls.lock().unwrap();
        assert!(log.iter().any(|t| t == "security_review"));
    }

    #[tokio::test]
    async fn test_integration_prefers_primary() {
        let openai = StubProvider::new(ProviderId::OpenAi, 0.9);
        let openai_calls = openai.call_log();
        let coordinator = coordinator(vec![
            openai,
            StubProvider::new(ProviderId::Mistral, 0.8),
        ]);

        coordinator
            .collaborative_generate("blog engine", "Axum")
            .await
            .unwrap();

        let log = openai_calls.lock().unwrap();
        assert!(log.iter().any(|t| t == "consensus_building"));
    }

    #[tokio::test]
    async fn test_integration_falls_back_without_primary() {
        let gemini = StubProvider::new(ProviderId::Gemini, 0.9);
        let gemini_calls = gemini.call_log();
        let coordinator = coordinator(vec![
            gemini,
            StubProvider::new(ProviderId::Mistral, 0.8),
        ]);

        coordinator
            .collaborative_generate("blog engine", "Axum")
            .await
            .unwrap();

        // Primary (openai) is absent; first registered takes integration.
        let log = gemini_calls.lock().unwrap();
        assert!(log.iter().any(|t| t == "consensus_building"));
    }

    #[tokio::test]
    async fn test_failed_review_calls_are_excluded_not_fatal() {
        let coordinator = coordinator(vec![
            StubProvider::new(ProviderId::Gemini, 0.9),
            StubProvider::new(ProviderId::Anthropic, 0.8).failing(),
        ]);

        let result = coordinator
            .collaborative_generate("todo app", "React")
            .await
            .unwrap();

        // Anthropic takes security and best-practices reviews and fails
        // both; the performance review survives on gemini.
        assert_eq!(result.reviews.len(), 1);
        assert!(!result.code.is_empty());
    }

    #[tokio::test]
    async fn test_summary_spans_all_phases() {
        let coordinator = coordinator(vec![
            StubProvider::new(ProviderId::OpenAi, 0.9),
            StubProvider::new(ProviderId::Gemini, 0.7),
        ]);

        let result = coordinator
            .collaborative_generate("todo app", "React")
            .await
            .unwrap();

        assert_eq!(result.summary.total_ais_used, 2);
        assert_eq!(result.summary.providers_used.len(), 9);
        assert!(result.summary.average_confidence > 0.0);
        assert!(result.summary.total_tokens_used > 0);
        assert!(result.completed_at >= result.started_at);
    }

    #[test]
    fn test_capabilities_lists_only_configured() {
        let coordinator = coordinator(vec![
            StubProvider::new(ProviderId::Anthropic, 0.8),
            StubProvider::new(ProviderId::Mistral, 0.8),
        ]);

        let report = coordinator.capabilities();
        assert_eq!(report.total_ais, 2);
        assert_eq!(report.capabilities[0].provider, ProviderId::Anthropic);
        assert!(report.capabilities[0]
            .strengths
            .contains(&"security_review".to_string()));
        assert_eq!(report.collaboration_features.len(), 5);
    }

    #[test]
    fn test_summarize_reviews_truncates() {
        let review = AiResponse {
            provider: ProviderId::Anthropic,
            content: "x".repeat(500),
            confidence: 0.8,
            reasoning: String::new(),
            execution_time: Duration::ZERO,
            tokens_used: 1,
        };
        let summary = summarize_reviews(&[review]);
        assert!(summary.starts_with("Review Summary:\n"));
        assert!(summary.contains(&"x".repeat(200)));
        assert!(!summary.contains(&"x".repeat(201)));
    }
}
