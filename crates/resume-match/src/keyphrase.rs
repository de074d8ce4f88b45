//! Embedding-ranked keyphrase extraction.
//!
//! Candidate n-grams from the job text are scored by cosine similarity to
//! the embedding of the whole job text; the closest ones are the phrases
//! that best summarize what the job is about.

use std::collections::HashSet;

use resume_embeddings::{Embedding, SharedEmbedder};
use tracing::debug;

use crate::normalize::{phrase_runs, run_ngrams_up_to};

/// Longest candidate phrase.
const MAX_PHRASE_WORDS: usize = 2;

/// Shortest candidate phrase in characters.
const MIN_PHRASE_CHARS: usize = 3;

/// Unsupervised keyphrase extractor over a shared embedder.
pub struct KeyphraseExtractor<'a> {
    embedder: &'a SharedEmbedder,
    top_n: usize,
}

impl<'a> KeyphraseExtractor<'a> {
    pub fn new(embedder: &'a SharedEmbedder, top_n: usize) -> Self {
        Self { embedder, top_n }
    }

    /// Candidate phrases in first-seen order, deduplicated. Phrases never
    /// span a stopword or clause punctuation.
    pub fn candidates(text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        run_ngrams_up_to(&phrase_runs(text), MAX_PHRASE_WORDS)
            .into_iter()
            .filter(|p| p.len() >= MIN_PHRASE_CHARS)
            .filter(|p| seen.insert(p.clone()))
            .collect()
    }

    /// Top phrases by similarity to `document_embedding`, best first.
    ///
    /// A zero document embedding (empty text or unavailable backend) ranks
    /// nothing and returns an empty list.
    pub fn extract(
        &self,
        text: &str,
        document_embedding: &Embedding,
    ) -> Vec<(String, f32)> {
        if self.top_n == 0 || document_embedding.is_zero() {
            return Vec::new();
        }
        let candidates = Self::candidates(text);
        if candidates.is_empty() {
            return Vec::new();
        }

        let embeddings = self.embedder.embed_many(&candidates);
        let mut scored: Vec<(String, f32)> = candidates
            .into_iter()
            .zip(embeddings.iter())
            .map(|(phrase, e)| {
                let score = e.cosine_similarity(document_embedding);
                (phrase, score)
            })
            .filter(|(_, score)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(self.top_n);
        debug!(count = scored.len(), "Keyphrases extracted");
        scored
    }
}
