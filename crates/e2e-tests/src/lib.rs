//! End-to-end test infrastructure for the resume advisor.
//!
//! Provides a shared harness built on the deterministic hashing embedder,
//! so scenario and property tests run offline and give the same answer on
//! every machine.

use std::sync::Arc;

use resume_advisor::{Advisor, EvidenceGuard};
use resume_embeddings::{Deadline, SharedEmbedder};
use resume_match::{CoverageClassifier, ResumeProfile};
use resume_types::{AdvisorConfig, Section, SmartAdvice, Suggestion};

/// Shared test harness for E2E tests.
pub struct TestHarness {
    /// Embedder shared by the advisor and direct stage calls
    pub embedder: Arc<SharedEmbedder>,
    /// Advisor under test
    pub advisor: Advisor,
}

impl TestHarness {
    /// Harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(AdvisorConfig::default())
    }

    /// Harness with a custom configuration.
    pub fn with_config(config: AdvisorConfig) -> Self {
        let embedder = Arc::new(SharedEmbedder::hashing());
        let advisor = Advisor::new(Arc::clone(&embedder), config);
        Self { embedder, advisor }
    }

    pub fn config(&self) -> &AdvisorConfig {
        self.advisor.config()
    }

    pub fn guard(&self) -> &EvidenceGuard {
        self.advisor.guard()
    }

    /// Run the full analysis; panics on error since content never fails.
    pub fn analyze(&self, resume: &str, job: &str, title: Option<&str>) -> SmartAdvice {
        self.advisor
            .analyze(resume, job, title)
            .expect("analysis should not fail on content")
    }

    /// Resume profile for direct coverage checks.
    pub fn profile(&self, resume: &str) -> ResumeProfile {
        ResumeProfile::build(
            resume,
            &self.embedder,
            self.config().chunk_chars,
            &Deadline::none(),
        )
        .expect("profile without deadline")
    }

    /// Coverage classifier at the configured threshold.
    pub fn classifier(&self) -> CoverageClassifier<'_> {
        CoverageClassifier::new(&self.embedder, self.config().similarity_threshold)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Every rendered and structured suggestion text in an analysis.
pub fn all_suggestion_texts(advice: &SmartAdvice) -> Vec<String> {
    advice
        .section_suggestions
        .values()
        .flatten()
        .cloned()
        .chain(advice.suggestions.iter().map(|s| s.suggested_text().to_string()))
        .chain(
            advice
                .personal_suggestions
                .iter()
                .map(|s| s.suggested_text().to_string()),
        )
        .collect()
}

/// Experience bullet shorthand.
pub fn experience(text: &str) -> Suggestion {
    Suggestion::add_bullet(Section::Experience, text, "Job theme")
}

/// True when `text` contains any ASCII digit.
pub fn has_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}
