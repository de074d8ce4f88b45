//! Whole-document embedding.
//!
//! Sentence models truncate long inputs, so documents are split into
//! character windows (breaking on whitespace where possible), embedded per
//! chunk, and averaged. A `Deadline` lets the host stop work between chunks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel};

/// Cooperative cancellation for long analyses.
///
/// The pipeline has no timeout of its own; it only checks this between
/// embedding chunks.
#[derive(Debug, Clone, Default)]
pub struct Deadline {
    at: Option<Instant>,
    flag: Option<Arc<AtomicBool>>,
}

impl Deadline {
    /// Never expires.
    pub fn none() -> Self {
        Self::default()
    }

    /// Expires `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Some(Instant::now() + timeout),
            flag: None,
        }
    }

    /// Expires when `flag` is set to true by the host.
    pub fn with_flag(flag: Arc<AtomicBool>) -> Self {
        Self {
            at: None,
            flag: Some(flag),
        }
    }

    /// True once the instant has passed or the flag is raised.
    pub fn is_expired(&self) -> bool {
        if let Some(at) = self.at {
            if Instant::now() >= at {
                return true;
            }
        }
        self.flag
            .as_ref()
            .map(|f| f.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    /// Err(Cancelled) once expired.
    pub fn check(&self) -> Result<(), EmbeddingError> {
        if self.is_expired() {
            Err(EmbeddingError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Split text into windows of at most `max_chars` characters.
///
/// A window ends at the last whitespace inside it, unless that whitespace
/// falls in the first fifth of the window, in which case it is cut hard.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() || max_chars == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let min_break = max_chars / 5;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = (start + max_chars).min(chars.len());
        if end < chars.len() {
            if let Some(ws) = chars[start..end].iter().rposition(|c| c.is_whitespace()) {
                if ws > min_break {
                    end = start + ws;
                }
            }
        }
        let chunk: String = chars[start..end].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        start = end;
    }

    chunks
}

/// Component-wise mean of embeddings, re-normalized.
///
/// Zero vectors still count toward the mean; an empty slice gives zeros.
pub fn mean_embedding(embeddings: &[Embedding], dimension: usize) -> Embedding {
    if embeddings.is_empty() {
        return Embedding::zeros(dimension);
    }
    let mut sum = vec![0.0f32; dimension];
    for e in embeddings {
        for (acc, v) in sum.iter_mut().zip(e.values.iter()) {
            *acc += v;
        }
    }
    let n = embeddings.len() as f32;
    Embedding::new(sum.into_iter().map(|v| v / n).collect())
}

/// Embed an arbitrarily long document.
///
/// Empty text yields a zero vector. Backend errors propagate; callers that
/// need totality wrap this (see `SharedEmbedder`).
pub fn embed_document(
    model: &dyn EmbeddingModel,
    text: &str,
    max_chars: usize,
    deadline: &Deadline,
) -> Result<Embedding, EmbeddingError> {
    let dim = model.info().dimension;
    let chunks = chunk_text(text, max_chars);
    if chunks.is_empty() {
        return Ok(Embedding::zeros(dim));
    }

    debug!(chunks = chunks.len(), "Embedding document");

    let mut embeddings = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        deadline.check()?;
        embeddings.push(model.embed(chunk)?);
    }
    Ok(mean_embedding(&embeddings, dim))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::HashingEmbedder;
    use proptest::prelude::*;

    #[test]
    fn test_chunk_empty() {
        assert!(chunk_text("   ", 1000).is_empty());
        assert!(chunk_text("text", 0).is_empty());
    }

    #[test]
    fn test_chunk_short_text_single_chunk() {
        assert_eq!(chunk_text("  built rest apis  ", 1000), vec!["built rest apis"]);
    }

    #[test]
    fn test_chunk_breaks_on_whitespace() {
        let text = "alpha beta gamma delta epsilon";
        let chunks = chunk_text(text, 12);
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.chars().count() <= 12);
            assert!(!c.starts_with(' ') && !c.ends_with(' '));
        }
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn test_chunk_hard_cut_without_whitespace() {
        let text = "x".repeat(25);
        let chunks = chunk_text(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].len(), 5);
    }

    #[test]
    fn test_chunk_multibyte_safe() {
        let text = "é".repeat(30);
        let chunks = chunk_text(&text, 7);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_mean_embedding_empty_is_zero() {
        assert!(mean_embedding(&[], 4).is_zero());
    }

    #[test]
    fn test_mean_embedding_normalizes() {
        let a = Embedding::new(vec![1.0, 0.0]);
        let b = Embedding::new(vec![0.0, 1.0]);
        let m = mean_embedding(&[a, b], 2);
        assert!((m.values[0] - m.values[1]).abs() < 1e-6);
        assert!((m.values[0] - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-4);
    }

    #[test]
    fn test_embed_document_empty_is_zero() {
        let model = HashingEmbedder::new();
        let e = embed_document(&model, "", 1000, &Deadline::none()).unwrap();
        assert!(e.is_zero());
        assert_eq!(e.dimension(), 384);
    }

    #[test]
    fn test_embed_document_long_text() {
        let model = HashingEmbedder::new();
        let text = "python flask rest apis ".repeat(200);
        let e = embed_document(&model, &text, 1000, &Deadline::none()).unwrap();
        assert!(!e.is_zero());
        let short = model.embed("python flask rest apis").unwrap();
        assert!(e.cosine_similarity(&short) > 0.8);
    }

    #[test]
    fn test_expired_deadline_cancels() {
        let model = HashingEmbedder::new();
        let flag = Arc::new(AtomicBool::new(true));
        let result = embed_document(&model, "some text", 1000, &Deadline::with_flag(flag));
        assert!(matches!(result, Err(EmbeddingError::Cancelled)));
    }

    #[test]
    fn test_deadline_none_never_expires() {
        assert!(!Deadline::none().is_expired());
        assert!(Deadline::after(Duration::ZERO).is_expired());
    }

    proptest! {
        #[test]
        fn chunks_never_exceed_window(text in "[a-z ]{0,300}", max in 5usize..60) {
            for chunk in chunk_text(&text, max) {
                prop_assert!(chunk.chars().count() <= max);
                prop_assert!(!chunk.is_empty());
            }
        }
    }
}
