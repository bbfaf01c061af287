//! Parallel dispatcher: concurrent batch execution over provider pairs.
//!
//! All (provider, task) pairs in a batch are launched concurrently and the
//! batch settles only when every call has completed or failed. A failing
//! call never cancels its siblings; it yields an error-marked entry in
//! place of a response at the same index.

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::providers::{AiResponse, ProviderId, ProviderPool};
use crate::task::AiTask;

/// Outcome of one dispatched (provider, task) pair.
///
/// Output order always matches input order, so `outcome[i]` correlates with
/// `assignment[i]` regardless of completion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TaskOutcome {
    /// The provider returned a normalized response.
    Completed(AiResponse),
    /// The call failed; the entry stands in for the missing response.
    Failed { provider: ProviderId, error: String },
}

impl TaskOutcome {
    /// The provider this outcome belongs to.
    pub fn provider(&self) -> ProviderId {
        match self {
            Self::Completed(response) => response.provider,
            Self::Failed { provider, .. } => *provider,
        }
    }

    /// The response, when the call succeeded.
    pub fn response(&self) -> Option<&AiResponse> {
        match self {
            Self::Completed(response) => Some(response),
            Self::Failed { .. } => None,
        }
    }

    /// Whether the call failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Runs batches of provider calls concurrently.
pub struct Dispatcher {
    pool: Arc<ProviderPool>,
}

impl Dispatcher {
    pub fn new(pool: Arc<ProviderPool>) -> Self {
        Self { pool }
    }

    /// Execute every (provider, task) pair concurrently.
    ///
    /// The returned vector has exactly the length and order of
    /// `assignments`; no entry is ever dropped.
    pub async fn dispatch_all(&self, assignments: &[(ProviderId, AiTask)]) -> Vec<TaskOutcome> {
        let calls = assignments
            .iter()
            .map(|(provider, task)| self.run_one(*provider, task));
        join_all(calls).await
    }

    async fn run_one(&self, provider: ProviderId, task: &AiTask) -> TaskOutcome {
        match self.pool.invoke(provider, task).await {
            Ok(response) => TaskOutcome::Completed(response),
            Err(e) => {
                warn!(
                    provider = %provider,
                    task_id = %task.id,
                    task_type = %task.task_type,
                    error = %e,
                    "Provider call failed"
                );
                TaskOutcome::Failed {
                    provider,
                    error: e.to_string(),
                }
            }
        }
    }
}
