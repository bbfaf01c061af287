//! Capability registry: static provider specializations.
//!
//! A read-only table of what each provider is best at, consulted by the
//! task router. Compiled in at build time, never mutated.

use crate::providers::ProviderId;

/// Declared strengths and preferred use-cases for one provider.
#[derive(Debug, Clone, Copy)]
pub struct Specialization {
    /// Task tags this provider is strongest at.
    pub strengths: &'static [&'static str],
    /// Task tags this provider should be reached for first.
    pub use_for: &'static [&'static str],
}

const OPENAI: Specialization = Specialization {
    strengths: &[
        "code_generation",
        "project_architecture",
        "debugging",
        "documentation",
    ],
    use_for: &["complex_coding", "system_design", "api_development"],
};

const ANTHROPIC: Specialization = Specialization {
    strengths: &[
        "code_analysis",
        "security_review",
        "best_practices",
        "refactoring",
    ],
    use_for: &["code_review", "optimization", "safety_checks"],
};

const GEMINI: Specialization = Specialization {
    strengths: &[
        "ui_design",
        "frontend_development",
        "user_experience",
        "creative_solutions",
    ],
    use_for: &["frontend_code", "design_patterns", "user_interfaces"],
};

const MISTRAL: Specialization = Specialization {
    strengths: &[
        "performance_optimization",
        "algorithms",
        "data_structures",
        "efficiency",
    ],
    use_for: &["performance_tuning", "algorithm_design", "backend_optimization"],
};

/// Look up the specialization record for a provider. Infallible.
pub fn specialization_of(provider: ProviderId) -> &'static Specialization {
    match provider {
        ProviderId::OpenAi => &OPENAI,
        ProviderId::Anthropic => &ANTHROPIC,
        ProviderId::Gemini => &GEMINI,
        ProviderId::Mistral => &MISTRAL,
    }
}

/// The first available provider (in registration order) whose strengths or
/// use-cases contain `tag` exactly.
pub fn specialist_for(tag: &str, available: &[ProviderId]) -> Option<ProviderId> {
    available.iter().copied().find(|&provider| {
        let spec = specialization_of(provider);
        spec.strengths.contains(&tag) || spec.use_for.contains(&tag)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_provider_has_a_specialization() {
        for &provider in ProviderId::all() {
            let spec = specialization_of(provider);
            assert!(!spec.strengths.is_empty());
            assert!(!spec.use_for.is_empty());
        }
    }

    #[test]
    fn test_security_specialist() {
        let available = ProviderId::all();
        assert_eq!(
            specialist_for("security_review", available),
            Some(ProviderId::Anthropic)
        );
    }

    #[test]
    fn test_performance_specialist() {
        let available = ProviderId::all();
        assert_eq!(
            specialist_for("performance_optimization", available),
            Some(ProviderId::Mistral)
        );
    }

    #[test]
    fn test_design_specialist() {
        assert_eq!(
            specialist_for("system_design", ProviderId::all()),
            Some(ProviderId::OpenAi)
        );
    }

    #[test]
    fn test_specialist_respects_availability() {
        let available = [ProviderId::Gemini];
        assert_eq!(specialist_for("security_review", &available), None);
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(specialist_for("quantum_computing", ProviderId::all()), None);
    }
}
