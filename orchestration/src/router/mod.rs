//! Task router: deterministic provider selection.
//!
//! Scores every available provider against a task's type tag and picks the
//! best match. Review tasks mentioning security or performance are overridden
//! to the matching specialist regardless of score.
//!
//! # Selection strategy
//!
//! ```text
//! Signal                              | Score
//! ------------------------------------|------
//! strengths tag substring of task_type| +3
//! use_for tag substring of task_type  | +2
//! ```
//!
//! Ties and the all-zero case resolve to the first provider in registration
//! order, so routing is reproducible for a fixed available set.

use tracing::debug;

use crate::providers::ProviderId;
use crate::registry;
use crate::task::AiTask;

/// Error type for routing operations.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("no providers are available for routing")]
    NoProviders,
}

/// Strengths-tag hit weight.
const STRENGTH_WEIGHT: u32 = 3;
/// Use-for-tag hit weight.
const USE_FOR_WEIGHT: u32 = 2;

/// Deterministic task-to-provider router.
#[derive(Debug, Default, Clone, Copy)]
pub struct TaskRouter;

impl TaskRouter {
    pub fn new() -> Self {
        Self
    }

    /// Select the best provider for a task from the available set.
    ///
    /// Fails only when `available` is empty.
    pub fn select(
        &self,
        task: &AiTask,
        available: &[ProviderId],
    ) -> Result<ProviderId, RouteError> {
        if available.is_empty() {
            return Err(RouteError::NoProviders);
        }

        // Specialist overrides for review-type tasks take precedence
        // over generic scoring.
        if task.task_type.contains("security") {
            if let Some(provider) = registry::specialist_for("security_review", available) {
                debug!(task_type = %task.task_type, provider = %provider, "Security override");
                return Ok(provider);
            }
        }
        if task.task_type.contains("performance") {
            if let Some(provider) = registry::specialist_for("performance_optimization", available)
            {
                debug!(task_type = %task.task_type, provider = %provider, "Performance override");
                return Ok(provider);
            }
        }

        // Strict > keeps the first-registered provider on ties, and the
        // all-zero case falls through to the first available provider.
        let mut best = available[0];
        let mut best_score = 0;
        for &provider in available {
            let score = Self::score(provider, &task.task_type);
            if score > best_score {
                best = provider;
                best_score = score;
            }
        }

        debug!(
            task_type = %task.task_type,
            provider = %best,
            score = best_score,
            "Routed task"
        );

        Ok(best)
    }

    fn score(provider: ProviderId, task_type: &str) -> u32 {
        let spec = registry::specialization_of(provider);
        let mut score = 0;
        if spec.strengths.iter().any(|s| task_type.contains(s)) {
            score += STRENGTH_WEIGHT;
        }
        if spec.use_for.iter().any(|u| task_type.contains(u)) {
            score += USE_FOR_WEIGHT;
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(task_type: &str) -> AiTask {
        AiTask::new(task_type, "test task")
    }

    #[test]
    fn test_empty_available_set() {
        let router = TaskRouter::new();
        let result = router.select(&task("frontend_code"), &[]);
        assert!(matches!(result, Err(RouteError::NoProviders)));
    }

    #[test]
    fn test_frontend_routes_to_gemini() {
        let router = TaskRouter::new();
        let selected = router
            .select(&task("frontend_code"), ProviderId::all())
            .unwrap();
        assert_eq!(selected, ProviderId::Gemini);
    }

    #[test]
    fn test_best_practices_routes_to_anthropic() {
        let router = TaskRouter::new();
        let selected = router
            .select(&task("best_practices_review"), ProviderId::all())
            .unwrap();
        assert_eq!(selected, ProviderId::Anthropic);
    }

    #[test]
    fn test_zero_score_falls_back_to_first_registered() {
        let router = TaskRouter::new();
        let selected = router
            .select(&task("interpretive_dance"), ProviderId::all())
            .unwrap();
        assert_eq!(selected, ProviderId::OpenAi);

        let selected = router
            .select(
                &task("interpretive_dance"),
                &[ProviderId::Mistral, ProviderId::Gemini],
            )
            .unwrap();
        assert_eq!(selected, ProviderId::Mistral);
    }

    #[test]
    fn test_security_override() {
        let router = TaskRouter::new();
        let selected = router
            .select(&task("security_review"), ProviderId::all())
            .unwrap();
        assert_eq!(selected, ProviderId::Anthropic);
    }

    #[test]
    fn test_security_override_skipped_when_specialist_absent() {
        let router = TaskRouter::new();
        let available = [ProviderId::OpenAi, ProviderId::Gemini];
        let selected = router.select(&task("security_review"), &available).unwrap();
        assert_eq!(selected, ProviderId::OpenAi);
    }

    #[test]
    fn test_performance_override() {
        let router = TaskRouter::new();
        let selected = router
            .select(&task("performance_review"), ProviderId::all())
            .unwrap();
        assert_eq!(selected, ProviderId::Mistral);
    }

    #[test]
    fn test_routing_is_deterministic() {
        let router = TaskRouter::new();
        let first = router
            .select(&task("architecture_design"), ProviderId::all())
            .unwrap();
        for _ in 0..10 {
            let again = router
                .select(&task("architecture_design"), ProviderId::all())
                .unwrap();
            assert_eq!(again, first);
        }
    }
}
