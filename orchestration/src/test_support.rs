//! Stub provider clients for unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::providers::{AiResponse, ProviderClient, ProviderError, ProviderId};
use crate::task::AiTask;

/// A canned provider backend that records the task types it is asked to run.
pub(crate) struct StubProvider {
    id: ProviderId,
    content: String,
    confidence: f32,
    fail: bool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StubProvider {
    pub fn new(id: ProviderId, confidence: f32) -> Self {
        Self {
            id,
            content: format!("{} output", id),
            confidence,
            fail: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Handle to the recorded task types, shared with the stub.
    pub fn call_log(&self) -> Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl ProviderClient for StubProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn complete(&self, task: &AiTask) -> Result<AiResponse, ProviderError> {
        self.calls.lock().unwrap().push(task.task_type.clone());

        if self.fail {
            return Err(ProviderError::RequestFailed {
                provider: self.id,
                message: "stub failure".to_string(),
            });
        }

        Ok(AiResponse {
            provider: self.id,
            content: self.content.clone(),
            confidence: self.confidence,
            reasoning: String::new(),
            execution_time: Duration::from_millis(5),
            tokens_used: 42,
        })
    }
}
