//! Process-wide embedder handle.
//!
//! The backend is loaded on first use, at most once, and shared read-only
//! by every analysis afterwards. If loading fails the handle stays usable:
//! every embedding becomes a zero vector and a warning is logged once.

use std::sync::{Arc, OnceLock};

use tracing::{debug, info, warn};

use crate::cache::ModelCache;
use crate::candle::{CandleEmbedder, EMBEDDING_DIM};
use crate::document::{embed_document, Deadline};
use crate::error::EmbeddingError;
use crate::hashing::HashingEmbedder;
use crate::model::{Embedding, EmbeddingModel};

type Loader = Box<dyn Fn() -> Result<Arc<dyn EmbeddingModel>, EmbeddingError> + Send + Sync>;

/// Lazily loaded, shareable embedding backend.
pub struct SharedEmbedder {
    cell: OnceLock<Option<Arc<dyn EmbeddingModel>>>,
    loader: Loader,
    fallback_dimension: usize,
}

impl SharedEmbedder {
    /// Defer loading to `loader`, called on first use only.
    ///
    /// `fallback_dimension` sizes the zero vectors returned if it fails.
    pub fn lazy<F>(fallback_dimension: usize, loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn EmbeddingModel>, EmbeddingError> + Send + Sync + 'static,
    {
        Self {
            cell: OnceLock::new(),
            loader: Box::new(loader),
            fallback_dimension,
        }
    }

    /// Wrap an already loaded model.
    pub fn from_model(model: Arc<dyn EmbeddingModel>) -> Self {
        let dim = model.info().dimension;
        let cell = OnceLock::new();
        let _ = cell.set(Some(model));
        Self {
            cell,
            loader: Box::new(|| Err(EmbeddingError::Unavailable("already loaded".into()))),
            fallback_dimension: dim,
        }
    }

    /// Candle sentence model from `cache`, loaded on first use.
    pub fn candle(cache: ModelCache) -> Self {
        Self::lazy(EMBEDDING_DIM, move || {
            let model: Arc<dyn EmbeddingModel> = Arc::new(CandleEmbedder::load(&cache)?);
            Ok(model)
        })
    }

    /// Deterministic hashing backend; never fails to load.
    pub fn hashing() -> Self {
        Self::from_model(Arc::new(HashingEmbedder::new()))
    }

    fn model(&self) -> Option<&Arc<dyn EmbeddingModel>> {
        self.cell
            .get_or_init(|| match (self.loader)() {
                Ok(model) => {
                    info!(model = %model.info().name, "Embedding backend ready");
                    Some(model)
                }
                Err(e) => {
                    warn!(error = %e, "Embedding backend unavailable, similarities will be zero");
                    None
                }
            })
            .as_ref()
    }

    /// Force the load now (warm-up). Returns whether a backend is available.
    pub fn warm_up(&self) -> bool {
        self.model().is_some()
    }

    /// True once a backend has loaded successfully.
    pub fn is_loaded(&self) -> bool {
        matches!(self.cell.get(), Some(Some(_)))
    }

    /// Backend name, or "unavailable".
    pub fn name(&self) -> String {
        self.model()
            .map(|m| m.info().name.clone())
            .unwrap_or_else(|| "unavailable".to_string())
    }

    /// Output width.
    pub fn dimension(&self) -> usize {
        self.model()
            .map(|m| m.info().dimension)
            .unwrap_or(self.fallback_dimension)
    }

    /// Embed a short text; zero vector on any failure.
    pub fn embed(&self, text: &str) -> Embedding {
        let Some(model) = self.model() else {
            return Embedding::zeros(self.fallback_dimension);
        };
        model.embed(text).unwrap_or_else(|e| {
            debug!(error = %e, "Embedding failed, using zero vector");
            Embedding::zeros(model.info().dimension)
        })
    }

    /// Embed many short texts in one batch; zero vectors on failure.
    pub fn embed_many(&self, texts: &[String]) -> Vec<Embedding> {
        let Some(model) = self.model() else {
            return vec![Embedding::zeros(self.fallback_dimension); texts.len()];
        };
        match model.embed_texts(texts) {
            Ok(embeddings) if embeddings.len() == texts.len() => embeddings,
            Ok(_) | Err(_) => {
                debug!(count = texts.len(), "Batch embedding failed, using zero vectors");
                vec![Embedding::zeros(model.info().dimension); texts.len()]
            }
        }
    }

    /// Embed a whole document in chunks.
    ///
    /// Only cancellation propagates; backend failures give a zero vector.
    pub fn embed_document(
        &self,
        text: &str,
        chunk_chars: usize,
        deadline: &Deadline,
    ) -> Result<Embedding, EmbeddingError> {
        let Some(model) = self.model() else {
            deadline.check()?;
            return Ok(Embedding::zeros(self.fallback_dimension));
        };
        match embed_document(model.as_ref(), text, chunk_chars, deadline) {
            Ok(e) => Ok(e),
            Err(EmbeddingError::Cancelled) => Err(EmbeddingError::Cancelled),
            Err(e) => {
                warn!(error = %e, "Document embedding failed, using zero vector");
                Ok(Embedding::zeros(model.info().dimension))
            }
        }
    }

    /// Cosine similarity of two short texts.
    pub fn similarity(&self, a: &str, b: &str) -> f32 {
        self.embed(a).cosine_similarity(&self.embed(b))
    }
}

impl std::fmt::Debug for SharedEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedEmbedder")
            .field("loaded", &self.is_loaded())
            .field("fallback_dimension", &self.fallback_dimension)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_loader_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let shared = SharedEmbedder::lazy(384, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let model: Arc<dyn EmbeddingModel> = Arc::new(HashingEmbedder::new());
            Ok(model)
        });

        assert!(!shared.is_loaded());
        shared.embed("rust");
        shared.embed("python");
        assert!(shared.is_loaded());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_loader_runs_once_across_threads() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let shared = Arc::new(SharedEmbedder::lazy(384, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let model: Arc<dyn EmbeddingModel> = Arc::new(HashingEmbedder::new());
            Ok(model)
        }));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                std::thread::spawn(move || shared.embed(&format!("skill {}", i)))
            })
            .collect();
        for h in handles {
            assert!(!h.join().unwrap().is_zero());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_falls_back_to_zero() {
        let shared = SharedEmbedder::lazy(16, || {
            Err(EmbeddingError::Unavailable("no model".into()))
        });

        let e = shared.embed("docker");
        assert!(e.is_zero());
        assert_eq!(e.dimension(), 16);
        assert_eq!(shared.similarity("a", "a"), 0.0);
        assert_eq!(shared.name(), "unavailable");
        assert!(!shared.warm_up());

        let doc = shared
            .embed_document("long text", 1000, &Deadline::none())
            .unwrap();
        assert!(doc.is_zero());
        assert_eq!(shared.embed_many(&["a".into(), "b".into()]).len(), 2);
    }

    #[test]
    fn test_cancellation_propagates() {
        let shared = SharedEmbedder::hashing();
        let deadline = Deadline::after(std::time::Duration::ZERO);
        assert!(matches!(
            shared.embed_document("text", 1000, &deadline),
            Err(EmbeddingError::Cancelled)
        ));
    }

    #[test]
    fn test_hashing_backend_similarity() {
        let shared = SharedEmbedder::hashing();
        assert!(shared.is_loaded());
        assert_eq!(shared.dimension(), 384);
        assert!((shared.similarity("Docker", "docker") - 1.0).abs() < 1e-4);
    }
}
