//! Canonical skill vocabulary.
//!
//! Raw job terms are mapped many-to-one onto a fixed list of recognized
//! skills by nearest embedding. Missing skills are then ranked by how
//! central they are to the job text and title.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use resume_embeddings::{Embedding, SharedEmbedder};
use resume_types::AdvisorConfig;
use tracing::debug;

use crate::terms::Term;

/// The canonical skills and their embeddings, computed once.
///
/// Embeddings are cached on first use, so one vocabulary must only ever be
/// used with one embedder.
#[derive(Debug)]
pub struct SkillVocabulary {
    skills: Vec<String>,
    embeddings: OnceLock<Vec<Embedding>>,
    /// Best similarity a term needs to map onto any skill
    min_similarity: f32,
}

impl SkillVocabulary {
    pub fn new(skills: Vec<String>, min_similarity: f32) -> Self {
        Self {
            skills: skills.into_iter().map(|s| s.trim().to_lowercase()).collect(),
            embeddings: OnceLock::new(),
            min_similarity,
        }
    }

    /// Vocabulary and match threshold from the advisor configuration.
    pub fn from_config(config: &AdvisorConfig) -> Self {
        Self::new(config.canonical_skills.clone(), config.skill_match_threshold)
    }

    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    fn embeddings(&self, embedder: &SharedEmbedder) -> &[Embedding] {
        self.embeddings
            .get_or_init(|| embedder.embed_many(&self.skills))
    }

    /// Embedding of one canonical skill, if it belongs to the vocabulary.
    pub fn embedding_of(&self, skill: &str, embedder: &SharedEmbedder) -> Option<Embedding> {
        let idx = self.skills.iter().position(|s| s == skill)?;
        self.embeddings(embedder).get(idx).cloned()
    }

    /// Nearest canonical skill for one term.
    ///
    /// A term whose best similarity is below the vocabulary threshold, or
    /// not positive at all (a zero vector from an unavailable backend),
    /// maps to nothing: off-vocabulary terms stay unmapped.
    pub fn nearest(&self, term_embedding: &Embedding, embedder: &SharedEmbedder) -> Option<&str> {
        let mut best: Option<(usize, f32)> = None;
        for (i, e) in self.embeddings(embedder).iter().enumerate() {
            let s = term_embedding.cosine_similarity(e);
            if s > 0.0 && best.map_or(true, |(_, bs)| s > bs) {
                best = Some((i, s));
            }
        }
        best.filter(|(_, s)| *s >= self.min_similarity)
            .and_then(|(i, _)| self.skills.get(i))
            .map(String::as_str)
    }

    /// Map terms onto canonical skills: a sorted, deduplicated set.
    pub fn map_terms(&self, terms: &[Term], embedder: &SharedEmbedder) -> Vec<String> {
        if terms.is_empty() {
            return Vec::new();
        }
        let texts: Vec<String> = terms.iter().map(|t| t.text.clone()).collect();
        let picked: BTreeSet<String> = embedder
            .embed_many(&texts)
            .iter()
            .filter_map(|e| self.nearest(e, embedder))
            .map(String::from)
            .collect();
        debug!(terms = terms.len(), skills = picked.len(), "Mapped terms to canonical skills");
        picked.into_iter().collect()
    }

    /// Order `skills` by `max(sim(skill, job), sim(skill, title))`, best
    /// first. Without a title the title similarity is 0. Ties keep input
    /// order.
    pub fn rank_by_relevance(
        &self,
        skills: &[String],
        job_embedding: &Embedding,
        title_embedding: Option<&Embedding>,
        embedder: &SharedEmbedder,
    ) -> Vec<(String, f32)> {
        let mut ranked: Vec<(String, f32)> = skills
            .iter()
            .map(|skill| {
                let e = self
                    .embedding_of(skill, embedder)
                    .unwrap_or_else(|| embedder.embed(skill));
                let job = e.cosine_similarity(job_embedding);
                let title = title_embedding.map_or(0.0, |t| e.cosine_similarity(t));
                (skill.clone(), job.max(title))
            })
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }

    /// The `count` missing skills most central to the job text and title.
    pub fn critical_gaps(
        &self,
        missing: &[String],
        job_embedding: &Embedding,
        title_embedding: Option<&Embedding>,
        embedder: &SharedEmbedder,
        count: usize,
    ) -> Vec<String> {
        self.rank_by_relevance(missing, job_embedding, title_embedding, embedder)
            .into_iter()
            .take(count)
            .map(|(s, _)| s)
            .collect()
    }
}
