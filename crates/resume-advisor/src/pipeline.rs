//! The analysis pipeline.
//!
//! normalize -> embed -> extract terms -> map to skills -> classify
//! coverage -> rank gaps -> compose and guard suggestions -> score.

use std::sync::Arc;
use std::time::Instant;

use resume_embeddings::{Deadline, EmbeddingError, SharedEmbedder};
use resume_match::{normalize, CoverageClassifier, MatchError, ResumeProfile, SkillVocabulary, TermExtractor};
use resume_types::{AdvisorConfig, AdvisorError, ModelSource, SmartAdvice};
use tracing::{debug, info};

use crate::composer::{ComposeInput, SuggestionComposer};
use crate::guard::EvidenceGuard;
use crate::verbs::{action_verbs, rewrite_hints};

/// Weight of resume/job similarity in the fit estimate.
const WEIGHT_JOB: f32 = 0.6;
/// Weight of resume/title similarity.
const WEIGHT_TITLE: f32 = 0.2;
/// Weight of skill coverage.
const WEIGHT_COVERAGE: f32 = 0.2;

/// Composite fit, 0-100:
/// `round(100 * clamp01(0.6 * sim_rj + 0.2 * sim_rt + 0.2 * coverage))`.
pub fn fit_score(sim_resume_job: f32, sim_resume_title: f32, coverage: f32) -> u8 {
    let raw = WEIGHT_JOB * sim_resume_job + WEIGHT_TITLE * sim_resume_title + WEIGHT_COVERAGE * coverage;
    if !raw.is_finite() {
        return 0;
    }
    (raw.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Raw cosine clamped to [0, 1] and rounded to 4 decimals.
pub fn display_similarity(similarity: f32) -> f64 {
    if !similarity.is_finite() {
        return 0.0;
    }
    (f64::from(similarity.clamp(0.0, 1.0)) * 10_000.0).round() / 10_000.0
}

fn match_error(err: MatchError) -> AdvisorError {
    match err {
        MatchError::Cancelled => AdvisorError::Cancelled,
        MatchError::Embedding(msg) => AdvisorError::Embedding(msg),
    }
}

fn embedding_error(err: EmbeddingError) -> AdvisorError {
    match_error(MatchError::from(err))
}

/// Resume/job analyzer.
///
/// Holds the shared embedder, the canonical skill vocabulary (embedded once)
/// and the evidence guard. Cheap to share behind an `Arc`; every call is
/// independent.
pub struct Advisor {
    embedder: Arc<SharedEmbedder>,
    config: AdvisorConfig,
    vocabulary: SkillVocabulary,
    guard: EvidenceGuard,
}

impl Advisor {
    pub fn new(embedder: Arc<SharedEmbedder>, config: AdvisorConfig) -> Self {
        let vocabulary = SkillVocabulary::from_config(&config);
        let guard = EvidenceGuard::from_config(&config);
        Self {
            embedder,
            config,
            vocabulary,
            guard,
        }
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    pub fn guard(&self) -> &EvidenceGuard {
        &self.guard
    }

    pub fn embedder(&self) -> &SharedEmbedder {
        &self.embedder
    }

    /// Analyze a resume against a job description.
    ///
    /// Content never causes an error: empty texts give empty lists and an
    /// unavailable embedding backend degrades to lexical matching.
    pub fn analyze(
        &self,
        resume_text: &str,
        job_text: &str,
        job_title: Option<&str>,
    ) -> Result<SmartAdvice, AdvisorError> {
        self.analyze_with_deadline(resume_text, job_text, job_title, &Deadline::none())
    }

    /// Like [`Advisor::analyze`], checking `deadline` between embedding
    /// chunks and between stages. Fails only with `AdvisorError::Cancelled`.
    pub fn analyze_with_deadline(
        &self,
        resume_text: &str,
        job_text: &str,
        job_title: Option<&str>,
        deadline: &Deadline,
    ) -> Result<SmartAdvice, AdvisorError> {
        let started = Instant::now();
        let config = &self.config;
        let embedder = self.embedder.as_ref();

        let resume = ResumeProfile::build(resume_text, embedder, config.chunk_chars, deadline)
            .map_err(match_error)?;
        let job = normalize(job_text);
        let job_embedding = embedder
            .embed_document(job.as_str(), config.chunk_chars, deadline)
            .map_err(embedding_error)?;
        let title = job_title.map(normalize).filter(|t| !t.is_empty());
        let title_embedding = title.as_ref().map(|t| embedder.embed(t.as_str()));

        let sim_resume_job = resume.embedding.cosine_similarity(&job_embedding);
        let sim_resume_title = title_embedding
            .as_ref()
            .map_or(0.0, |t| resume.embedding.cosine_similarity(t));

        let terms = TermExtractor::new(embedder, config.frequency_term_cap, config.keyphrase_top_n)
            .extract(job_text, resume_text, &job_embedding);
        deadline.check().map_err(embedding_error)?;

        let job_skills = self.vocabulary.map_terms(&terms, embedder);
        let verdicts = CoverageClassifier::new(embedder, config.similarity_threshold)
            .classify_all(&job_skills, &resume);
        let (mut present, mut missing): (Vec<String>, Vec<String>) = (Vec::new(), Vec::new());
        for (skill, verdict) in job_skills.into_iter().zip(verdicts) {
            if verdict.is_present() {
                present.push(skill);
            } else {
                missing.push(skill);
            }
        }
        debug!(present = present.len(), missing = missing.len(), "Skills classified");

        let critical_gaps = self.vocabulary.critical_gaps(
            &missing,
            &job_embedding,
            title_embedding.as_ref(),
            embedder,
            config.critical_gap_count,
        );
        let coverage = present.len() as f32 / (present.len() + missing.len()).max(1) as f32;
        let fit_estimate = fit_score(sim_resume_job, sim_resume_title, coverage);

        let strongest_present: Vec<String> = self
            .vocabulary
            .rank_by_relevance(&present, &job_embedding, title_embedding.as_ref(), embedder)
            .into_iter()
            .map(|(skill, _)| skill)
            .collect();
        let composition = SuggestionComposer::new(embedder, config, &self.guard).compose(ComposeInput {
            resume_text,
            resume: &resume,
            terms: &terms,
            present_skills: &strongest_present,
            missing_skills: &missing,
            critical_gaps: &critical_gaps,
            job_title: job_title.map(str::trim).filter(|t| !t.is_empty()),
            title_similarity: sim_resume_title,
        });

        let technical: Vec<String> = self
            .vocabulary
            .skills()
            .iter()
            .cloned()
            .chain(terms.iter().map(|t| t.text.clone()))
            .collect();
        let verbs = action_verbs(resume_text, &technical);
        let rewrite_hints = rewrite_hints(verbs.len(), config.min_verb_count);

        present.truncate(config.max_listed_skills);
        missing.truncate(config.max_listed_skills);

        info!(
            fit = fit_estimate,
            similarity = sim_resume_job,
            present = present.len(),
            missing = missing.len(),
            suggestions = composition.suggestions.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis complete"
        );

        Ok(SmartAdvice {
            fit_estimate,
            similarity_resume_job: display_similarity(sim_resume_job),
            present_skills: present,
            missing_skills: missing,
            critical_gaps,
            section_suggestions: composition.section_suggestions,
            ready_bullets: composition.ready_bullets,
            rewrite_hints,
            suggestions: composition.suggestions,
            personal_suggestions: Vec::new(),
            model_source: ModelSource {
                scoring: embedder.name(),
                suggestions: None,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resume_types::Section;
    use std::sync::atomic::AtomicBool;

    fn advisor() -> Advisor {
        Advisor::new(Arc::new(SharedEmbedder::hashing()), AdvisorConfig::default())
    }

    #[test]
    fn test_fit_score_formula() {
        assert_eq!(fit_score(1.0, 1.0, 1.0), 100);
        assert_eq!(fit_score(0.0, 0.0, 0.0), 0);
        assert_eq!(fit_score(0.5, 0.0, 0.5), 40);
        assert_eq!(fit_score(-1.0, -1.0, 0.0), 0);
        assert_eq!(fit_score(f32::NAN, 0.0, 0.0), 0);
    }

    #[test]
    fn test_display_similarity() {
        assert_eq!(display_similarity(0.123456), 0.1235);
        assert_eq!(display_similarity(-0.3), 0.0);
        assert_eq!(display_similarity(1.5), 1.0);
    }

    #[test]
    fn test_analyze_reports_gaps() {
        let advice = advisor()
            .analyze(
                "Python developer. Built REST APIs with Flask and PostgreSQL.",
                "We need Python, Docker and Kubernetes experience. Docker and Kubernetes in production.",
                Some("Backend Engineer"),
            )
            .unwrap();

        assert!(advice.present_skills.contains(&"python".to_string()));
        assert!(advice.missing_skills.contains(&"docker".to_string()));
        assert!(advice.missing_skills.contains(&"kubernetes".to_string()));
        assert!(advice.fit_estimate <= 100);
        assert!((0.0..=1.0).contains(&advice.similarity_resume_job));
        assert_eq!(advice.section_suggestions.len(), Section::REPORTED.len());
        assert_eq!(advice.model_source.scoring, "feature-hashing");
        assert_eq!(advice.rewrite_hints.len(), 3);
    }

    #[test]
    fn test_analyze_empty_job() {
        let advice = advisor().analyze("Python developer", "", None).unwrap();
        assert!(advice.present_skills.is_empty());
        assert!(advice.missing_skills.is_empty());
        assert!(advice.critical_gaps.is_empty());
        assert_eq!(advice.similarity_resume_job, 0.0);
        assert_eq!(advice.fit_estimate, 0);
    }

    #[test]
    fn test_analyze_cancelled() {
        let flag = Arc::new(AtomicBool::new(true));
        let result = advisor().analyze_with_deadline(
            "Python developer",
            "Docker engineer",
            None,
            &Deadline::with_flag(flag),
        );
        assert!(matches!(result, Err(AdvisorError::Cancelled)));
    }
}
