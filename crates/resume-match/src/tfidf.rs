//! Contrastive TF-IDF over n-grams.
//!
//! The job and the resume form a two-document corpus. N-grams are taken
//! inside phrase runs only, so no gram spans a stopword or a comma. Each
//! gets an L2-normalized TF-IDF weight per document; job terms are ranked
//! by how much more they weigh in the job than in the resume.

use std::collections::{HashMap, HashSet};

use crate::normalize::{phrase_runs, run_ngrams_up_to};

/// Longest n-gram considered.
pub const MAX_NGRAM: usize = 3;

/// TF-IDF weights for a small corpus of n-gram documents.
pub struct TfIdf {
    /// Term -> number of documents containing it
    doc_frequencies: HashMap<String, usize>,
    /// Per document: term -> raw count
    term_counts: Vec<HashMap<String, usize>>,
    /// Per document: terms in first-seen order
    order: Vec<Vec<String>>,
}

impl TfIdf {
    /// Build from documents given as phrase runs, counting 1..=MAX_NGRAM
    /// grams within each run.
    pub fn new(documents: &[Vec<Vec<String>>]) -> Self {
        let mut doc_frequencies: HashMap<String, usize> = HashMap::new();
        let mut term_counts = Vec::with_capacity(documents.len());
        let mut order = Vec::with_capacity(documents.len());

        for runs in documents {
            let mut counts: HashMap<String, usize> = HashMap::new();
            let mut seen_order = Vec::new();
            for gram in run_ngrams_up_to(runs, MAX_NGRAM) {
                let count = counts.entry(gram.clone()).or_insert(0);
                if *count == 0 {
                    seen_order.push(gram);
                }
                *count += 1;
            }
            let unique: HashSet<&String> = counts.keys().collect();
            for term in unique {
                *doc_frequencies.entry(term.clone()).or_insert(0) += 1;
            }
            term_counts.push(counts);
            order.push(seen_order);
        }

        Self {
            doc_frequencies,
            term_counts,
            order,
        }
    }

    /// Number of documents.
    pub fn doc_count(&self) -> usize {
        self.term_counts.len()
    }

    /// Smoothed IDF: ln((N + 1) / (df + 1)) + 1
    fn inverse_document_frequency(&self, term: &str) -> f32 {
        let df = *self.doc_frequencies.get(term).unwrap_or(&0) as f32;
        if df == 0.0 {
            return 0.0;
        }
        let n = self.doc_count() as f32;
        ((n + 1.0) / (df + 1.0)).ln() + 1.0
    }

    /// L2-normalized TF-IDF weights of one document.
    pub fn weights(&self, doc: usize) -> HashMap<String, f32> {
        let Some(counts) = self.term_counts.get(doc) else {
            return HashMap::new();
        };
        // Iterate in text order so the norm is reproducible
        let raw: Vec<(String, f32)> = self
            .terms(doc)
            .iter()
            .map(|term| {
                let count = counts.get(term).copied().unwrap_or(0) as f32;
                (term.clone(), count * self.inverse_document_frequency(term))
            })
            .collect();
        let norm: f32 = raw.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        raw.into_iter()
            .map(|(term, w)| (term, if norm > 0.0 { w / norm } else { w }))
            .collect()
    }

    /// Terms of `doc` in first-seen order.
    pub fn terms(&self, doc: usize) -> &[String] {
        self.order.get(doc).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// Rank job terms by `job_weight - resume_weight`, keeping positive
/// differentials only, highest first, at most `cap`.
///
/// Ties keep first-seen order in the job text. Takes raw text so clause
/// punctuation still separates phrases.
pub fn contrastive_terms(job_text: &str, resume_text: &str, cap: usize) -> Vec<(String, f32)> {
    let job_runs = phrase_runs(job_text);
    if job_runs.is_empty() || cap == 0 {
        return Vec::new();
    }

    let tfidf = TfIdf::new(&[job_runs, phrase_runs(resume_text)]);
    let job_weights = tfidf.weights(0);
    let resume_weights = tfidf.weights(1);

    let mut ranked: Vec<(String, f32)> = tfidf
        .terms(0)
        .iter()
        .filter_map(|term| {
            let diff = job_weights.get(term).copied().unwrap_or(0.0)
                - resume_weights.get(term).copied().unwrap_or(0.0);
            (diff > 0.0).then(|| (term.clone(), diff))
        })
        .collect();

    // Stable sort keeps text order among equal weights
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(cap);
    ranked
}
