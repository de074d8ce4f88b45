//! Model file cache.
//!
//! The sentence model is fetched from HuggingFace Hub once and kept in a
//! per-user cache directory so later runs work offline.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::EmbeddingError;

/// Default sentence embedding model on HuggingFace
pub const DEFAULT_MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Files a BERT-style sentence model needs
pub const MODEL_FILES: &[&str] = &["config.json", "tokenizer.json", "model.safetensors"];

/// Where model files live and which repository they come from
#[derive(Debug, Clone)]
pub struct ModelCache {
    /// Root of the cache; each repository gets a subdirectory
    pub cache_dir: PathBuf,
    /// HuggingFace repository id
    pub repo_id: String,
}

impl Default for ModelCache {
    fn default() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("resume-advisor")
            .join("models");

        Self {
            cache_dir,
            repo_id: DEFAULT_MODEL_REPO.to_string(),
        }
    }
}

impl ModelCache {
    /// Create a cache rooted at `cache_dir` for `repo_id`
    pub fn new(cache_dir: impl Into<PathBuf>, repo_id: impl Into<String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            repo_id: repo_id.into(),
        }
    }

    /// Directory holding this repository's files
    pub fn model_dir(&self) -> PathBuf {
        self.cache_dir.join(self.repo_id.replace('/', "_"))
    }

    /// Path of one model file
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.model_dir().join(filename)
    }

    /// Model files not yet on disk
    pub fn missing_files(&self) -> Vec<&'static str> {
        MODEL_FILES
            .iter()
            .copied()
            .filter(|f| !self.file_path(f).exists())
            .collect()
    }

    /// True when every model file is on disk
    pub fn is_cached(&self) -> bool {
        self.missing_files().is_empty()
    }

    /// Short model name: the last segment of the repository id
    pub fn model_name(&self) -> &str {
        self.repo_id.rsplit('/').next().unwrap_or(&self.repo_id)
    }
}

/// Resolved paths of the three model files
#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

impl ModelPaths {
    fn in_dir(dir: &Path) -> Self {
        Self {
            config: dir.join("config.json"),
            tokenizer: dir.join("tokenizer.json"),
            weights: dir.join("model.safetensors"),
        }
    }
}

/// Return model file paths, downloading whatever is missing first.
pub fn get_or_download_model(cache: &ModelCache) -> Result<ModelPaths, EmbeddingError> {
    let missing = cache.missing_files();
    if missing.is_empty() {
        debug!(path = ?cache.model_dir(), "Using cached model");
    } else {
        info!(repo = %cache.repo_id, missing = missing.len(), "Downloading model files");
        download_files(cache, &missing)?;
    }

    Ok(ModelPaths::in_dir(&cache.model_dir()))
}

fn download_files(cache: &ModelCache, files: &[&str]) -> Result<(), EmbeddingError> {
    use hf_hub::api::sync::Api;

    let api = Api::new().map_err(|e| EmbeddingError::Download(e.to_string()))?;
    let repo = api.model(cache.repo_id.clone());

    std::fs::create_dir_all(cache.model_dir())?;

    for filename in files {
        let source = repo
            .get(filename)
            .map_err(|e| EmbeddingError::Download(format!("{}: {}", filename, e)))?;
        let dest = cache.file_path(filename);
        std::fs::copy(&source, &dest)?;
        debug!(file = filename, dest = ?dest, "Model file cached");
    }

    Ok(())
}
