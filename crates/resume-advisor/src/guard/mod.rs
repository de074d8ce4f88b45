//! Evidence guard.
//!
//! The last step before any generated text reaches the caller. Runs the
//! metric guard first, then the experience guard, so reframed claims are
//! built from text that is already free of unsupported numbers.

mod evidence;
mod metrics;

pub use evidence::{is_experience_claim, EvidenceChecker};
pub use metrics::{enforce_no_fake_metrics, has_digit, hedge, strip_numbers, METRIC_NOTE};

use resume_match::normalize;
use resume_types::{AdvisorConfig, Section, Suggestion};
use tracing::debug;

/// Sanitizes suggestions against one resume.
#[derive(Debug, Clone)]
pub struct EvidenceGuard {
    checker: EvidenceChecker,
    vocabulary: Vec<String>,
}

impl EvidenceGuard {
    /// Build a guard from the product families, generic tokens and canonical
    /// skills of `config`.
    pub fn from_config(config: &AdvisorConfig) -> Self {
        Self {
            checker: EvidenceChecker::new(config.product_families.clone(), &config.generic_tokens),
            vocabulary: config.canonical_skills.clone(),
        }
    }

    /// Sanitize suggestions.
    ///
    /// `extra_vocabulary` adds phrases (job terms, missing skills) that
    /// count as claims when named in experience framing, on top of the
    /// canonical skills and product family aliases.
    pub fn sanitize(
        &self,
        suggestions: Vec<Suggestion>,
        resume_text: &str,
        extra_vocabulary: &[String],
    ) -> Vec<Suggestion> {
        let before = suggestions.len();
        let suggestions = enforce_no_fake_metrics(suggestions, resume_text);

        let resume = normalize(resume_text);
        let vocabulary: Vec<String> = self
            .vocabulary
            .iter()
            .chain(extra_vocabulary.iter())
            .cloned()
            .collect();
        let out: Vec<Suggestion> = suggestions
            .into_iter()
            .map(|s| self.checker.check(s, &resume, &vocabulary))
            .collect();

        debug!(before, after = out.len(), "Suggestions sanitized");
        out
    }

    /// Sanitize free-standing lines such as ready bullets.
    pub fn sanitize_lines(
        &self,
        lines: Vec<String>,
        resume_text: &str,
        extra_vocabulary: &[String],
    ) -> Vec<String> {
        let wrapped = lines
            .into_iter()
            .map(|line| Suggestion::add_bullet(Section::Experience, line, ""))
            .collect();
        self.sanitize(wrapped, resume_text, extra_vocabulary)
            .into_iter()
            .map(|s| s.suggested_text().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> EvidenceGuard {
        EvidenceGuard::from_config(&AdvisorConfig::default())
    }

    #[test]
    fn test_metrics_then_evidence() {
        let out = guard().sanitize(
            vec![Suggestion::add_bullet(
                Section::Experience,
                "Deployed Kubernetes clusters, cutting costs by 30%.",
                "Job theme",
            )],
            "Python developer who writes tests",
            &[],
        );

        assert_eq!(out.len(), 1);
        let text = out[0].suggested_text();
        assert!(!has_digit(text));
        assert!(text.starts_with("Building familiarity with kubernetes"));
        assert_eq!(out[0].section(), Section::Projects);
        assert!(out[0].rationale().contains(METRIC_NOTE));
    }

    #[test]
    fn test_evidenced_numeric_resume_untouched() {
        let s = Suggestion::add_bullet(
            Section::Experience,
            "Deployed Kubernetes clusters, cutting costs by 30%.",
            "Job theme",
        );
        let out = guard().sanitize(vec![s.clone()], "Ran 12 Kubernetes clusters", &[]);
        assert_eq!(out, vec![s]);
    }

    #[test]
    fn test_extra_vocabulary_counts_as_claims() {
        let guard = guard();
        let s = Suggestion::add_bullet(Section::Experience, "Built feature stores for ranking.", "");
        let kept = guard.sanitize(vec![s.clone()], "Search engineer", &[]);
        assert_eq!(kept, vec![s.clone()]);

        let reframed = guard.sanitize(vec![s], "Search engineer", &["feature stores".to_string()]);
        assert_eq!(reframed[0].section(), Section::Projects);
    }

    #[test]
    fn test_sanitize_lines() {
        let lines = guard().sanitize_lines(
            vec!["Action verb + Technology + Metric + Outcome, one sentence.".to_string()],
            "",
            &[],
        );
        assert_eq!(lines, vec!["Action verb + Technology + Metric + Outcome, one sentence."]);
    }
}
