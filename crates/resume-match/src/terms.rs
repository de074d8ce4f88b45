//! Job term extraction.
//!
//! Merges contrastive TF-IDF terms with embedding keyphrases, then drops
//! boilerplate and sentence fragments.

use std::collections::HashSet;

use resume_embeddings::{Deadline, Embedding, SharedEmbedder};
use serde::Serialize;
use tracing::debug;

use crate::error::MatchError;
use crate::keyphrase::KeyphraseExtractor;
use crate::normalize::{is_stop_word, normalize};
use crate::tfidf::contrastive_terms;

/// Chunk window used when `extract_terms` embeds the job text itself.
const DEFAULT_CHUNK_CHARS: usize = 1000;

/// How a term was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TermSource {
    /// Contrastive job-vs-resume frequency
    Frequency,
    /// Embedding similarity to the job text
    Keyphrase,
}

/// A word or phrase (1-3 words) taken from the job text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Term {
    /// Normalized surface form
    pub text: String,
    pub source: TermSource,
    /// TF-IDF differential or keyphrase similarity
    pub weight: f32,
}

impl Term {
    pub fn new(text: impl Into<String>, source: TermSource, weight: f32) -> Self {
        Self {
            text: text.into(),
            source,
            weight,
        }
    }
}

/// Legal, HR, location and soft-skill vocabulary that is never a skill.
const BOILERPLATE: &[&str] = &[
    "equal opportunity",
    "opportunity employer",
    "employer",
    "benefits",
    "salary",
    "compensation",
    "insurance",
    "401k",
    "pto",
    "paid time off",
    "visa",
    "sponsorship",
    "background check",
    "disability",
    "veteran",
    "gender",
    "race",
    "religion",
    "national origin",
    "sexual orientation",
    "accommodation",
    "accommodations",
    "applicants",
    "applicant",
    "apply",
    "candidate",
    "candidates",
    "remote",
    "hybrid",
    "onsite",
    "on-site",
    "office",
    "location",
    "relocation",
    "full-time",
    "part-time",
    "contract",
    "communication",
    "communication skills",
    "team player",
    "fast-paced",
    "self-starter",
    "detail-oriented",
    "passionate",
    "motivated",
    "interpersonal",
    "looking",
    "seeking",
    "hiring",
    "developer",
    "developers",
    "engineer",
    "engineers",
    "experienced",
    "experience",
    "development",
    "join",
    "company",
    "role",
    "position",
    "job",
    "responsibilities",
    "requirements",
    "qualifications",
    "preferred",
    "required",
    "years",
    "year",
    "ability",
    "strong",
    "excellent",
    "plus",
    "including",
    "team",
    "work",
    "working",
    "world",
    "academic",
    "university",
    "students",
    "staff",
    "https",
    "anywhere",
    "offer",
];

/// True for a boilerplate or stop word.
pub fn is_boilerplate_word(word: &str) -> bool {
    BOILERPLATE.contains(&word) || is_stop_word(word)
}

/// True if `term` should not be treated as a skill phrase.
///
/// Rejects terms of two characters or fewer, boilerplate terms (the whole
/// term or every word of it), phrases that begin or end on a boilerplate
/// word ("python developer", "api development"), and phrases of four or
/// more words made of letters only, which are sentence fragments rather
/// than skills.
pub fn is_noise(term: &str) -> bool {
    let term = term.trim();
    if term.chars().count() <= 2 {
        return true;
    }
    if BOILERPLATE.contains(&term) {
        return true;
    }
    let words: Vec<&str> = term.split_whitespace().collect();
    let (Some(first), Some(last)) = (words.first(), words.last()) else {
        return true;
    };
    if is_boilerplate_word(first) || is_boilerplate_word(last) {
        return true;
    }
    if words.iter().all(|w| is_boilerplate_word(w)) {
        return true;
    }
    let has_digit_or_symbol = term
        .chars()
        .any(|c| c.is_ascii_digit() || matches!(c, '+' | '#' | '/' | '.' | '-'));
    words.len() >= 4 && !has_digit_or_symbol
}

/// Extracts the significant terms of a job description.
pub struct TermExtractor<'a> {
    embedder: &'a SharedEmbedder,
    frequency_cap: usize,
    keyphrase_top_n: usize,
}

impl<'a> TermExtractor<'a> {
    pub fn new(embedder: &'a SharedEmbedder, frequency_cap: usize, keyphrase_top_n: usize) -> Self {
        Self {
            embedder,
            frequency_cap,
            keyphrase_top_n,
        }
    }

    /// Extract terms from raw texts, embedding the job text itself.
    pub fn extract_terms(&self, job_text: &str, resume_text: &str) -> Result<Vec<Term>, MatchError> {
        let job = normalize(job_text);
        let job_embedding = self
            .embedder
            .embed_document(job.as_str(), DEFAULT_CHUNK_CHARS, &Deadline::none())?;
        Ok(self.extract(job_text, resume_text, &job_embedding))
    }

    /// Extract terms given raw texts and a precomputed job embedding.
    ///
    /// Frequency terms come first, then keyphrases not already present.
    /// Deduplicated case-insensitively, noise removed, most significant
    /// first. Empty job text gives an empty list.
    pub fn extract(&self, job_text: &str, resume_text: &str, job_embedding: &Embedding) -> Vec<Term> {
        if normalize(job_text).is_empty() {
            return Vec::new();
        }

        let frequency = contrastive_terms(job_text, resume_text, self.frequency_cap)
            .into_iter()
            .map(|(t, w)| Term::new(t, TermSource::Frequency, w));
        let keyphrases = KeyphraseExtractor::new(self.embedder, self.keyphrase_top_n)
            .extract(job_text, job_embedding)
            .into_iter()
            .map(|(t, w)| Term::new(t, TermSource::Keyphrase, w));

        let terms = merge_terms(frequency.chain(keyphrases));
        debug!(count = terms.len(), "Job terms extracted");
        terms
    }
}

/// Merge preserving first-seen order, dedupe case-insensitively, drop noise.
pub fn merge_terms(terms: impl IntoIterator<Item = Term>) -> Vec<Term> {
    let mut seen = HashSet::new();
    terms
        .into_iter()
        .filter(|t| !is_noise(&t.text))
        .filter(|t| seen.insert(t.text.to_lowercase()))
        .collect()
}
