//! Coverage classification.
//!
//! A term is covered when the normalized resume contains it, or failing
//! that, when its embedding is close enough to the resume embedding.

use resume_embeddings::{Deadline, Embedding, SharedEmbedder};
use serde::Serialize;

use crate::error::MatchError;
use crate::normalize::{normalize, NormalizedText};

/// Why a term counts as covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageBasis {
    Lexical,
    Semantic,
}

/// Coverage verdict for one term against one resume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Coverage {
    Present { basis: CoverageBasis, similarity: f32 },
    Missing { similarity: f32 },
}

impl Coverage {
    pub fn is_present(&self) -> bool {
        matches!(self, Coverage::Present { .. })
    }

    /// Similarity between the term and the resume (1.0 for lexical hits).
    pub fn similarity(&self) -> f32 {
        match self {
            Coverage::Present { similarity, .. } | Coverage::Missing { similarity } => *similarity,
        }
    }
}

/// A resume prepared for coverage checks: normalized text plus its
/// document embedding.
#[derive(Debug, Clone)]
pub struct ResumeProfile {
    pub text: NormalizedText,
    pub embedding: Embedding,
}

impl ResumeProfile {
    /// Normalize and embed a resume. Only cancellation propagates.
    pub fn build(
        resume_text: &str,
        embedder: &SharedEmbedder,
        chunk_chars: usize,
        deadline: &Deadline,
    ) -> Result<Self, MatchError> {
        let text = normalize(resume_text);
        let embedding = embedder.embed_document(text.as_str(), chunk_chars, deadline)?;
        Ok(Self { text, embedding })
    }

    /// Pair already computed parts.
    pub fn from_parts(text: NormalizedText, embedding: Embedding) -> Self {
        Self { text, embedding }
    }
}

/// Decides whether a resume covers a term.
pub struct CoverageClassifier<'a> {
    embedder: &'a SharedEmbedder,
    threshold: f32,
}

impl<'a> CoverageClassifier<'a> {
    pub fn new(embedder: &'a SharedEmbedder, threshold: f32) -> Self {
        Self {
            embedder,
            threshold,
        }
    }

    /// Classify one term.
    ///
    /// Lexical containment wins regardless of the threshold.
    pub fn classify(&self, term: &str, resume: &ResumeProfile) -> Coverage {
        let term = normalize(term);
        if resume.text.contains(term.as_str()) {
            return Coverage::Present {
                basis: CoverageBasis::Lexical,
                similarity: 1.0,
            };
        }
        let similarity = self
            .embedder
            .embed(term.as_str())
            .cosine_similarity(&resume.embedding);
        self.verdict(similarity)
    }

    /// Classify many terms with one batched embedding call.
    pub fn classify_all(&self, terms: &[String], resume: &ResumeProfile) -> Vec<Coverage> {
        let normalized: Vec<NormalizedText> = terms.iter().map(|t| normalize(t)).collect();
        let pending: Vec<String> = normalized
            .iter()
            .filter(|t| !resume.text.contains(t.as_str()))
            .map(|t| t.as_str().to_string())
            .collect();
        let mut embeddings = self.embedder.embed_many(&pending).into_iter();

        normalized
            .iter()
            .map(|t| {
                if resume.text.contains(t.as_str()) {
                    Coverage::Present {
                        basis: CoverageBasis::Lexical,
                        similarity: 1.0,
                    }
                } else {
                    let similarity = embeddings
                        .next()
                        .map(|e| e.cosine_similarity(&resume.embedding))
                        .unwrap_or(0.0);
                    self.verdict(similarity)
                }
            })
            .collect()
    }

    fn verdict(&self, similarity: f32) -> Coverage {
        if similarity >= self.threshold {
            Coverage::Present {
                basis: CoverageBasis::Semantic,
                similarity,
            }
        } else {
            Coverage::Missing { similarity }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn profile(embedder: &SharedEmbedder, text: &str) -> ResumeProfile {
        ResumeProfile::build(text, embedder, 1000, &Deadline::none()).unwrap()
    }

    #[test]
    fn test_lexical_containment() {
        let embedder = SharedEmbedder::hashing();
        let resume = profile(&embedder, "Built REST APIs in Python using Flask");
        let classifier = CoverageClassifier::new(&embedder, 0.78);

        let python = classifier.classify("Python", &resume);
        assert_eq!(
            python,
            Coverage::Present {
                basis: CoverageBasis::Lexical,
                similarity: 1.0
            }
        );
        assert!(classifier.classify("rest api", &resume).is_present());
        assert!(!classifier.classify("kubernetes", &resume).is_present());
    }

    #[test]
    fn test_lexical_containment_is_whole_word() {
        let embedder = SharedEmbedder::hashing();
        let resume = profile(&embedder, "JavaScript and TypeScript frontends. Built REST APIs.");
        let classifier = CoverageClassifier::new(&embedder, 0.99);

        assert!(!classifier.classify("java", &resume).is_present());
        assert!(!classifier.classify("script", &resume).is_present());
        assert!(matches!(
            classifier.classify("rest api", &resume),
            Coverage::Present {
                basis: CoverageBasis::Lexical,
                ..
            }
        ));
        assert!(classifier.classify("frontend", &resume).is_present());

        let terms = vec!["java".to_string(), "rest api".to_string()];
        let batch = classifier.classify_all(&terms, &resume);
        assert!(!batch[0].is_present());
        assert!(batch[1].is_present());
    }

    #[test]
    fn test_semantic_containment_uses_threshold() {
        let embedder = SharedEmbedder::hashing();
        let resume = profile(&embedder, "kubernetes");
        let loose = CoverageClassifier::new(&embedder, 0.3);
        let strict = CoverageClassifier::new(&embedder, 0.99);

        // "kubernetes clusters" is not a substring but shares most features
        let verdict = loose.classify("kubernetes clusters", &resume);
        assert!(matches!(
            verdict,
            Coverage::Present {
                basis: CoverageBasis::Semantic,
                ..
            }
        ));
        assert!(!strict.classify("kubernetes clusters", &resume).is_present());
    }

    #[test]
    fn test_unavailable_backend_only_lexical() {
        let embedder = SharedEmbedder::lazy(384, || {
            Err(resume_embeddings::EmbeddingError::Unavailable("offline".into()))
        });
        let resume = profile(&embedder, "docker compose");
        let classifier = CoverageClassifier::new(&embedder, 0.0001);
        assert!(classifier.classify("docker", &resume).is_present());
        assert_eq!(
            classifier.classify("terraform", &resume),
            Coverage::Missing { similarity: 0.0 }
        );
    }

    #[test]
    fn test_classify_all_matches_classify() {
        let embedder = SharedEmbedder::hashing();
        let resume = profile(&embedder, "Python Flask services with PostgreSQL");
        let classifier = CoverageClassifier::new(&embedder, 0.78);
        let terms: Vec<String> = ["python", "docker", "postgresql", "kubernetes"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let batch = classifier.classify_all(&terms, &resume);
        for (term, verdict) in terms.iter().zip(batch.iter()) {
            assert_eq!(classifier.classify(term, &resume).is_present(), verdict.is_present());
        }
    }

    proptest! {
        #[test]
        fn literal_substring_is_always_present(
            words in proptest::collection::vec("[a-z]{2,8}", 1..12),
            start in 0usize..12,
            len in 1usize..4,
            threshold in 0.0f32..1.0,
        ) {
            let embedder = SharedEmbedder::hashing();
            let resume_text = words.join(" ");
            let start = start % words.len();
            let end = (start + len).min(words.len());
            let term = words[start..end].join(" ");

            let resume = profile(&embedder, &resume_text);
            let classifier = CoverageClassifier::new(&embedder, threshold);
            prop_assert!(classifier.classify(&term, &resume).is_present());
        }
    }
}
