//! Feature-hashing embedder.
//!
//! Maps word unigrams, adjacent word pairs and character trigrams into a
//! fixed-width vector with signed FNV-1a hashes. No model download and
//! fully deterministic, which makes it the offline backend and the test
//! backend. Lexically related texts score high; paraphrases do not.

use std::collections::BTreeMap;

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Default output width, matching the Candle model
pub const HASHING_DIM: usize = 384;

const UNIGRAM_WEIGHT: f32 = 1.0;
const BIGRAM_WEIGHT: f32 = 0.5;
const TRIGRAM_WEIGHT: f32 = 0.25;

/// Deterministic hashing embedder.
pub struct HashingEmbedder {
    info: ModelInfo,
}

impl HashingEmbedder {
    /// Create an embedder with the default width.
    pub fn new() -> Self {
        Self::with_dimension(HASHING_DIM)
    }

    /// Create an embedder with a custom width (minimum 8).
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            info: ModelInfo {
                name: "feature-hashing".to_string(),
                dimension: dimension.max(8),
                max_sequence_length: usize::MAX,
            },
        }
    }

    fn features(text: &str) -> BTreeMap<String, f32> {
        let words: Vec<String> = text
            .to_lowercase()
            .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
            .filter(|w| !w.is_empty())
            .map(String::from)
            .collect();

        let mut features: BTreeMap<String, f32> = BTreeMap::new();
        for word in &words {
            *features.entry(format!("w:{}", word)).or_default() += UNIGRAM_WEIGHT;

            let chars: Vec<char> = format!("<{}>", word).chars().collect();
            for tri in chars.windows(3) {
                let key: String = std::iter::once('t').chain(tri.iter().copied()).collect();
                *features.entry(key).or_default() += TRIGRAM_WEIGHT;
            }
        }
        for pair in words.windows(2) {
            *features
                .entry(format!("b:{}_{}", pair[0], pair[1]))
                .or_default() += BIGRAM_WEIGHT;
        }
        features
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingModel for HashingEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let dim = self.info.dimension;
        let mut values = vec![0.0f32; dim];
        for (feature, weight) in Self::features(text) {
            let slot = (fnv1a(&feature, 0) % dim as u64) as usize;
            let sign = if fnv1a(&feature, 1) % 2 == 0 { 1.0 } else { -1.0 };
            values[slot] += sign * weight;
        }
        Ok(Embedding::new(values))
    }
}

/// Seeded FNV-1a.
fn fnv1a(text: &str, seed: u64) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325u64.wrapping_add(seed.wrapping_mul(0x9e3779b97f4a7c15));
    for b in text.bytes() {
        h ^= b as u64;
        h = h.wrapping_mul(0x100000001b3);
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let e = HashingEmbedder::new();
        assert_eq!(e.embed("rust and python").unwrap(), e.embed("rust and python").unwrap());
    }

    #[test]
    fn test_unit_length() {
        let e = HashingEmbedder::new();
        let v = e.embed("kubernetes operators").unwrap();
        let norm: f32 = v.values.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
        assert_eq!(v.dimension(), HASHING_DIM);
    }

    #[test]
    fn test_empty_text_is_zero() {
        let e = HashingEmbedder::new();
        assert!(e.embed("   ").unwrap().is_zero());
    }

    #[test]
    fn test_identical_terms_score_one() {
        let e = HashingEmbedder::new();
        let a = e.embed("Docker").unwrap();
        let b = e.embed("docker").unwrap();
        assert!((a.cosine_similarity(&b) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_shared_words_score_higher() {
        let e = HashingEmbedder::new();
        let base = e.embed("rest api development").unwrap();
        let related = e.embed("rest api design").unwrap();
        let unrelated = e.embed("payroll spreadsheets").unwrap();
        assert!(base.cosine_similarity(&related) > base.cosine_similarity(&unrelated));
    }

    #[test]
    fn test_minimum_dimension() {
        let e = HashingEmbedder::with_dimension(2);
        assert_eq!(e.info().dimension, 8);
    }
}
