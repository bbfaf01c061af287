//! Project generator: turns a collaboration run into a project bundle.
//!
//! Wraps [`CollabCoordinator::collaborative_generate`] and post-processes
//! the result: splits the integrated code into individual files on
//! `// FILE:` markers, asks the review and performance specialists for a
//! README and a deployment config, and derives a quality score from the
//! collaboration summary.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::coordinator::{CollabCoordinator, CollabError, CollaborationResult, CollaborationSummary};
use crate::providers::ProviderId;
use crate::task::AiTask;

static NON_ALNUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\s]").expect("NON_ALNUM_RE regex should compile"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE_RE regex should compile"));

/// Maximum length of a generated repository name.
const REPO_NAME_MAX: usize = 50;

/// Insights derived from a collaboration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiInsights {
    pub architecture_quality: String,
    pub code_complexity: usize,
    pub review_findings: usize,
    pub collaboration_efficiency: f32,
}

impl AiInsights {
    fn from_result(result: &CollaborationResult) -> Self {
        let architecture_quality = if result.architecture.to_lowercase().contains("microservice")
        {
            "High"
        } else {
            "Standard"
        };

        Self {
            architecture_quality: architecture_quality.to_string(),
            code_complexity: result.code.len(),
            review_findings: result.reviews.len(),
            collaboration_efficiency: result.summary.average_confidence,
        }
    }
}

/// A generated project ready for an external persistence/deployment layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectBundle {
    pub repo_name: String,
    pub description: String,
    pub tech_stack: String,
    /// File name → content, split from the integrated code.
    pub files: HashMap<String, String>,
    pub summary: CollaborationSummary,
    pub insights: AiInsights,
    pub quality_score: f32,
}

/// Enhances collaboration output into a complete project bundle.
pub struct ProjectGenerator {
    coordinator: Arc<CollabCoordinator>,
}

impl ProjectGenerator {
    pub fn new(coordinator: Arc<CollabCoordinator>) -> Self {
        Self { coordinator }
    }

    /// Generate a project with the collaborative pipeline plus auxiliary
    /// assets (README, deployment config) from the matching specialists.
    pub async fn generate_enhanced_project(
        &self,
        description: &str,
        tech_stack: &str,
        requirements: &[String],
    ) -> Result<ProjectBundle, CollabError> {
        let mut full_description = description.to_string();
        if !requirements.is_empty() {
            full_description.push_str("\nRequirements: ");
            full_description.push_str(&requirements.join(", "));
        }

        let result = self
            .coordinator
            .collaborative_generate(&full_description, tech_stack)
            .await?;

        let mut files = extract_files(&result.code);
        for (name, content) in self.generate_assets(description, tech_stack, &files).await {
            files.insert(name, content);
        }

        let insights = AiInsights::from_result(&result);
        let quality_score = quality_score(&result);

        Ok(ProjectBundle {
            repo_name: repo_name(description),
            description: description.to_string(),
            tech_stack: tech_stack.to_string(),
            files,
            summary: result.summary,
            insights,
            quality_score,
        })
    }

    /// README from the review specialist, deployment config from the
    /// performance specialist. Missing providers or failed calls just skip
    /// the asset; the bundle is still produced.
    async fn generate_assets(
        &self,
        description: &str,
        tech_stack: &str,
        files: &HashMap<String, String>,
    ) -> Vec<(String, String)> {
        let available = self.coordinator.available_providers();
        let file_names: Vec<&str> = files.keys().map(|k| k.as_str()).collect();
        let mut assets = Vec::new();

        if available.contains(&ProviderId::Anthropic) {
            let readme_task = AiTask::new(
                "documentation",
                format!("Generate comprehensive README for {}", description),
            )
            .with_context(json!({"tech_stack": tech_stack, "files": file_names}));

            match self
                .coordinator
                .invoke(ProviderId::Anthropic, &readme_task)
                .await
            {
                Ok(response) => assets.push(("README.md".to_string(), response.content)),
                Err(e) => warn!(error = %e, "README generation failed"),
            }
        }

        if available.contains(&ProviderId::Mistral) {
            let deploy_task = AiTask::new(
                "deployment_config",
                format!("Generate deployment configuration for {}", tech_stack),
            )
            .with_context(json!({"project_files": file_names}));

            match self
                .coordinator
                .invoke(ProviderId::Mistral, &deploy_task)
                .await
            {
                Ok(response) => assets.push(("deploy.yml".to_string(), response.content)),
                Err(e) => warn!(error = %e, "Deployment config generation failed"),
            }
        }

        assets
    }
}

/// Split integrated code into individual files on `// FILE:` / `# FILE:`
/// markers. Code without markers lands in a single `main.py` entry.
pub fn extract_files(code: &str) -> HashMap<String, String> {
    let mut files = HashMap::new();
    let mut current_file: Option<String> = None;
    let mut current_content: Vec<&str> = Vec::new();

    for line in code.lines() {
        let marker = line
            .strip_prefix("// FILE:")
            .or_else(|| line.strip_prefix("# FILE:"));

        if let Some(name) = marker {
            if let Some(previous) = current_file.take() {
                files.insert(previous, current_content.join("\n"));
            }
            current_file = Some(name.trim().to_string());
            current_content.clear();
        } else if current_file.is_some() {
            current_content.push(line);
        }
    }

    if let Some(name) = current_file {
        files.insert(name, current_content.join("\n"));
    }

    if files.is_empty() {
        files.insert("main.py".to_string(), code.to_string());
    }

    files
}

/// Slugify a description into a repository name: lowercase, punctuation
/// stripped, whitespace collapsed to hyphens, truncated.
pub fn repo_name(description: &str) -> String {
    let lowered = description.to_lowercase();
    let stripped = NON_ALNUM_RE.replace_all(&lowered, "");
    let slug = WHITESPACE_RE.replace_all(stripped.trim(), "-");
    slug.chars().take(REPO_NAME_MAX).collect()
}

/// Overall quality score: base confidence plus capped bonuses for provider
/// diversity and review coverage, saturating at 1.0.
pub fn quality_score(result: &CollaborationResult) -> f32 {
    let base = result.summary.average_confidence;
    let ai_bonus = (0.1 * result.summary.total_ais_used as f32).min(0.3);
    let review_bonus = (0.05 * result.reviews.len() as f32).min(0.2);
    (base + ai_bonus + review_bonus).min(1.0)
}
