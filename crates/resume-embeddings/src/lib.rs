//! # resume-embeddings
//!
//! Local embedding generation for the resume advisor using Candle.
//!
//! Every similarity decision in the pipeline goes through vectors produced
//! here. Inference is local and in-process; the model is loaded lazily,
//! once, and shared read-only afterwards.
//!
//! ## Features
//! - all-MiniLM-L6-v2 through Candle (384 dimensions)
//! - Deterministic feature-hashing backend for offline use and tests
//! - Long documents chunked on whitespace and mean-pooled
//! - Zero-vector fallback when the backend is unavailable
//! - Cooperative deadline checked between chunks

pub mod cache;
pub mod candle;
pub mod document;
pub mod error;
pub mod hashing;
pub mod model;
pub mod shared;

pub use crate::candle::CandleEmbedder;
pub use cache::{get_or_download_model, ModelCache, ModelPaths, DEFAULT_MODEL_REPO, MODEL_FILES};
pub use document::{chunk_text, embed_document, mean_embedding, Deadline};
pub use error::EmbeddingError;
pub use hashing::HashingEmbedder;
pub use model::{Embedding, EmbeddingModel, ModelInfo};
pub use shared::SharedEmbedder;
