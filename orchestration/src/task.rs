//! Task descriptor submitted to AI providers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Arbitrary key→value context attached to a task and forwarded to the
/// provider prompt.
pub type TaskContext = Map<String, Value>;

/// A unit of work for a single provider call.
///
/// Tasks are immutable once dispatched. The `id` exists for log correlation
/// across the dispatch boundary and carries no semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiTask {
    /// Unique identifier for tracing.
    pub id: Uuid,
    /// Tag describing the kind of work, e.g. `security_review`.
    pub task_type: String,
    /// What the provider should produce.
    pub description: String,
    /// Context embedded in the prompt.
    pub context: TaskContext,
    /// Relative priority (informational only).
    pub priority: i32,
}

impl AiTask {
    /// Create a task with empty context and default priority.
    pub fn new(task_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_type: task_type.into(),
            description: description.into(),
            context: TaskContext::new(),
            priority: 1,
        }
    }

    /// Attach context from a JSON object. Non-object values are ignored.
    pub fn with_context(mut self, context: Value) -> Self {
        if let Value::Object(map) = context {
            self.context = map;
        }
        self
    }

    /// Set the task priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// The context serialized for prompt embedding.
    pub fn context_json(&self) -> String {
        serde_json::to_string(&self.context).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_defaults() {
        let task = AiTask::new("frontend_code", "Generate frontend components");
        assert_eq!(task.task_type, "frontend_code");
        assert_eq!(task.priority, 1);
        assert!(task.context.is_empty());
    }

    #[test]
    fn test_with_context() {
        let task = AiTask::new("backend_code", "Generate backend services")
            .with_context(json!({"architecture": "three-tier"}));
        assert_eq!(task.context["architecture"], "three-tier");
        assert!(task.context_json().contains("three-tier"));
    }

    #[test]
    fn test_non_object_context_ignored() {
        let task = AiTask::new("api_design", "Design API endpoints").with_context(json!("not a map"));
        assert!(task.context.is_empty());
    }

    #[test]
    fn test_with_priority() {
        let task = AiTask::new("security_review", "Review code").with_priority(3);
        assert_eq!(task.priority, 3);
    }

    #[test]
    fn test_unique_ids() {
        let a = AiTask::new("t", "d");
        let b = AiTask::new("t", "d");
        assert_ne!(a.id, b.id);
    }
}
