//! Multi-Provider AI Orchestration Library
//!
//! This library provides the orchestration core of a collaborative
//! code-generation assistant:
//! - Uniform adapters over heterogeneous AI backends (OpenAI, Anthropic,
//!   Gemini, Mistral)
//! - Capability-based task routing with deterministic tie-breaks
//! - Parallel dispatch with per-call failure isolation
//! - Response aggregation: labeled combination and mean-confidence consensus
//! - A four-phase collaboration pipeline (architecture → generation →
//!   review → integration)
//!
//! # Usage
//!
//! ```ignore
//! use orchestration::{CollabCoordinator, PoolConfig};
//!
//! // Credentials come from the environment; absent keys disable providers.
//! let coordinator = CollabCoordinator::new(PoolConfig::default())?;
//!
//! let result = coordinator
//!     .collaborative_generate("todo app with auth", "React + Axum")
//!     .await?;
//! println!("{}", result.code);
//!
//! let report = coordinator
//!     .consensus("Which database fits?", serde_json::json!({"scale": "small"}))
//!     .await?;
//! println!("{} ({:.2})", report.recommendation, report.consensus_score);
//! ```
//!
//! The library is transport-agnostic: an HTTP handler, CLI, or queue
//! consumer can all drive the same coordinator handle.

pub mod consensus;
pub mod coordinator;
pub mod dispatch;
pub mod generator;
pub mod providers;
pub mod registry;
pub mod router;
pub mod task;

#[cfg(test)]
mod test_support;

// Re-export core task types
pub use task::{AiTask, TaskContext};

// Re-export provider types
pub use providers::{
    AiResponse, PoolConfig, ProviderClient, ProviderError, ProviderId, ProviderPool,
    UnknownProvider,
};

// Re-export registry types
pub use registry::{specialist_for, specialization_of, Specialization};

// Re-export routing types
pub use router::{RouteError, TaskRouter};

// Re-export dispatch types
pub use dispatch::{Dispatcher, TaskOutcome};

// Re-export aggregation types
pub use consensus::{
    combine_responses, split_combined, ConsensusEngine, ConsensusError, ConsensusReport,
    COMBINED_BANNER,
};

// Re-export coordinator types
pub use coordinator::{
    CapabilityReport, CollabCoordinator, CollabError, CollaborationResult, CollaborationSummary,
    ProviderCapability, COLLABORATION_FEATURES,
};

// Re-export generator types
pub use generator::{
    extract_files, quality_score, repo_name, AiInsights, ProjectBundle, ProjectGenerator,
};
