//! Configuration loading for the resume advisor.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/resume-advisor/config.toml.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::AdvisorError;

/// Recognized skill labels that raw job terms are mapped onto.
const CANONICAL_SKILLS: &[&str] = &[
    "python",
    "java",
    "c#",
    "javascript",
    "typescript",
    "react",
    "node.js",
    "asp.net",
    "sql",
    "postgresql",
    "mysql",
    "azure",
    "aws",
    "git",
    "github actions",
    "ci/cd",
    "docker",
    "kubernetes",
    "unit testing",
    "integration testing",
    "playwright",
    "jest",
    "mocha",
    "junit",
    "agile",
    "scrum",
    "rest api",
    "graphql",
    "security",
    "oauth2",
    "jwt",
    "logging",
    "monitoring",
    "ml",
    "nlp",
    "ml.net",
    "pandas",
    "scikit-learn",
    "azure devops",
    "terraform",
];

const GENERIC_TOKENS: &[&str] = &[
    "system",
    "systems",
    "database",
    "databases",
    "platform",
    "platforms",
    "tool",
    "tools",
    "software",
    "application",
    "applications",
    "service",
    "services",
    "solution",
    "solutions",
    "data",
    "experience",
    "development",
    "environment",
    "framework",
    "frameworks",
    "technology",
    "technologies",
    "team",
    "teams",
];

/// The default canonical skill vocabulary.
pub fn default_canonical_skills() -> Vec<String> {
    CANONICAL_SKILLS.iter().map(|s| s.to_string()).collect()
}

/// A product and its aliases.
///
/// A claim naming any alias is only evidenced when the resume names some
/// alias of the same family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFamily {
    /// Display name of the family
    pub name: String,
    /// Lowercase aliases, matched on word boundaries
    pub aliases: Vec<String>,
}

impl ProductFamily {
    /// Create a family from a name and aliases.
    pub fn new(name: impl Into<String>, aliases: &[&str]) -> Self {
        Self {
            name: name.into(),
            aliases: aliases.iter().map(|a| a.to_lowercase()).collect(),
        }
    }
}

fn default_product_families() -> Vec<ProductFamily> {
    vec![
        ProductFamily::new(
            "Medidata Rave",
            &[
                "medidata rave",
                "medidata",
                "rave edc",
                "edc system",
                "edc",
                "electronic data capture",
            ],
        ),
        ProductFamily::new(
            "Veeva Vault",
            &["veeva vault", "veeva", "vault cdms", "vault edc"],
        ),
    ]
}

/// Settings for the optional external suggestion generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// MUST be explicitly set to true to call the external generator.
    #[serde(default)]
    pub enabled: bool,

    /// Provider name ("openai" or "anthropic")
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// Model name
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API key (loaded from env var, not stored in config file)
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum attempts per call
    #[serde(default = "default_llm_max_retries")]
    pub max_retries: u32,
}

fn default_llm_provider() -> String {
    "openai".to_string()
}

fn default_llm_model() -> String {
    "gpt-4.1-mini".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    30
}

fn default_llm_max_retries() -> u32 {
    2
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_llm_provider(),
            model: default_llm_model(),
            api_key: None,
            api_base_url: None,
            timeout_secs: default_llm_timeout_secs(),
            max_retries: default_llm_max_retries(),
        }
    }
}

/// Tunables for the analysis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Cosine similarity at or above which a term counts as semantically covered
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Similarity a job term needs to its nearest canonical skill to map onto it
    #[serde(default = "default_skill_match_threshold")]
    pub skill_match_threshold: f32,

    /// Upper bound on the number of theme clusters
    #[serde(default = "default_max_clusters")]
    pub max_clusters: usize,

    /// Missing-term sets at or below this size form a single cluster
    #[serde(default = "default_single_cluster_max")]
    pub single_cluster_max: usize,

    /// Target members per cluster when choosing k
    #[serde(default = "default_members_per_cluster")]
    pub members_per_cluster: usize,

    /// Cap on job-specific terms from contrastive frequency extraction
    #[serde(default = "default_frequency_term_cap")]
    pub frequency_term_cap: usize,

    /// Number of keyphrases from embedding ranking
    #[serde(default = "default_keyphrase_top_n")]
    pub keyphrase_top_n: usize,

    /// Number of critical gaps reported
    #[serde(default = "default_critical_gap_count")]
    pub critical_gap_count: usize,

    /// Cap on present/missing skill lists
    #[serde(default = "default_max_listed_skills")]
    pub max_listed_skills: usize,

    /// Cap on ready bullets
    #[serde(default = "default_max_ready_bullets")]
    pub max_ready_bullets: usize,

    /// Number of clusters that get an Experience suggestion
    #[serde(default = "default_experience_suggestion_cap")]
    pub experience_suggestion_cap: usize,

    /// Character window for chunked document embedding
    #[serde(default = "default_chunk_chars")]
    pub chunk_chars: usize,

    /// Distinct impact verbs below which rewrite hints push verbs and metrics
    #[serde(default = "default_min_verb_count")]
    pub min_verb_count: usize,

    /// Canonical skill vocabulary
    #[serde(default = "default_canonical_skills")]
    pub canonical_skills: Vec<String>,

    /// Product families with dedicated evidence checks
    #[serde(default = "default_product_families")]
    pub product_families: Vec<ProductFamily>,

    /// Tokens too generic to count as evidence for a multi-word phrase
    #[serde(default = "default_generic_tokens")]
    pub generic_tokens: Vec<String>,

    /// External suggestion generator
    #[serde(default)]
    pub llm: LlmSettings,
}

fn default_similarity_threshold() -> f32 {
    0.78
}
fn default_skill_match_threshold() -> f32 {
    0.35
}
fn default_max_clusters() -> usize {
    4
}
fn default_single_cluster_max() -> usize {
    6
}
fn default_members_per_cluster() -> usize {
    6
}
fn default_frequency_term_cap() -> usize {
    40
}
fn default_keyphrase_top_n() -> usize {
    12
}
fn default_critical_gap_count() -> usize {
    6
}
fn default_max_listed_skills() -> usize {
    30
}
fn default_max_ready_bullets() -> usize {
    6
}
fn default_experience_suggestion_cap() -> usize {
    4
}
fn default_chunk_chars() -> usize {
    1000
}
fn default_min_verb_count() -> usize {
    3
}
fn default_generic_tokens() -> Vec<String> {
    GENERIC_TOKENS.iter().map(|s| s.to_string()).collect()
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            skill_match_threshold: default_skill_match_threshold(),
            max_clusters: default_max_clusters(),
            single_cluster_max: default_single_cluster_max(),
            members_per_cluster: default_members_per_cluster(),
            frequency_term_cap: default_frequency_term_cap(),
            keyphrase_top_n: default_keyphrase_top_n(),
            critical_gap_count: default_critical_gap_count(),
            max_listed_skills: default_max_listed_skills(),
            max_ready_bullets: default_max_ready_bullets(),
            experience_suggestion_cap: default_experience_suggestion_cap(),
            chunk_chars: default_chunk_chars(),
            min_verb_count: default_min_verb_count(),
            canonical_skills: default_canonical_skills(),
            product_families: default_product_families(),
            generic_tokens: default_generic_tokens(),
            llm: LlmSettings::default(),
        }
    }
}

impl AdvisorConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), AdvisorError> {
        let invalid = |msg: String| -> Result<(), AdvisorError> { Err(AdvisorError::Config(msg)) };
        if !(-1.0..=1.0).contains(&self.similarity_threshold) {
            return invalid(format!(
                "similarity_threshold must be -1.0..=1.0, got {}",
                self.similarity_threshold
            ));
        }
        if !(-1.0..=1.0).contains(&self.skill_match_threshold) {
            return invalid(format!(
                "skill_match_threshold must be -1.0..=1.0, got {}",
                self.skill_match_threshold
            ));
        }
        if self.max_clusters < 2 {
            return invalid(format!("max_clusters must be >= 2, got {}", self.max_clusters));
        }
        if self.members_per_cluster == 0 {
            return invalid("members_per_cluster must be > 0".to_string());
        }
        if self.chunk_chars < 64 {
            return invalid(format!("chunk_chars must be >= 64, got {}", self.chunk_chars));
        }
        if self.canonical_skills.is_empty() {
            return invalid("canonical_skills must not be empty".to_string());
        }
        if self.product_families.iter().any(|f| f.aliases.is_empty()) {
            return invalid("every product family needs at least one alias".to_string());
        }
        Ok(())
    }
}

/// Which embedding backend to load.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackend {
    /// all-MiniLM-L6-v2 through Candle (default)
    #[default]
    Candle,
    /// Deterministic feature-hashing vectors, no model download
    Hashing,
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Embedding backend
    #[serde(default)]
    pub embedding_backend: EmbeddingBackend,

    /// HuggingFace repository of the sentence embedding model
    #[serde(default = "default_model_repo")]
    pub model_repo: String,

    /// Directory holding downloaded model files
    #[serde(default = "default_model_cache_dir")]
    pub model_cache_dir: String,

    /// Pipeline tunables
    #[serde(default)]
    pub advisor: AdvisorConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_model_repo() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

fn default_model_cache_dir() -> String {
    ProjectDirs::from("", "", "resume-advisor")
        .map(|p| p.cache_dir().join("models"))
        .unwrap_or_else(|| PathBuf::from(".cache/resume-advisor/models"))
        .to_string_lossy()
        .to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            embedding_backend: EmbeddingBackend::default(),
            model_repo: default_model_repo(),
            model_cache_dir: default_model_cache_dir(),
            advisor: AdvisorConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/resume-advisor/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (ADVISOR_*, nested keys joined with `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, AdvisorError> {
        let config_dir = ProjectDirs::from("", "", "resume-advisor")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())
            .map_err(|e| AdvisorError::Config(e.to_string()))?
            .set_default("embedding_backend", "candle")
            .map_err(|e| AdvisorError::Config(e.to_string()))?
            .set_default("model_repo", default_model_repo())
            .map_err(|e| AdvisorError::Config(e.to_string()))?
            .set_default("model_cache_dir", default_model_cache_dir())
            .map_err(|e| AdvisorError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: ADVISOR_LOG_LEVEL, ADVISOR_ADVISOR__SIMILARITY_THRESHOLD,
        // ADVISOR_ADVISOR__LLM__API_KEY, etc.
        builder = builder.add_source(
            Environment::with_prefix("ADVISOR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| AdvisorError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| AdvisorError::Config(e.to_string()))?;

        settings.advisor.validate()?;
        Ok(settings)
    }

    /// Model cache directory as a path
    pub fn model_cache_path(&self) -> PathBuf {
        PathBuf::from(&self.model_cache_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.embedding_backend, EmbeddingBackend::Candle);
        assert!(settings.model_repo.contains("all-MiniLM-L6-v2"));
    }

    #[test]
    fn test_advisor_defaults() {
        let config = AdvisorConfig::default();
        assert!((config.similarity_threshold - 0.78).abs() < f32::EPSILON);
        assert!((config.skill_match_threshold - 0.35).abs() < f32::EPSILON);
        assert_eq!(config.max_clusters, 4);
        assert_eq!(config.single_cluster_max, 6);
        assert_eq!(config.critical_gap_count, 6);
        assert_eq!(config.canonical_skills.len(), 40);
        assert!(!config.llm.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_family_has_edc_aliases() {
        let config = AdvisorConfig::default();
        let rave = &config.product_families[0];
        assert!(rave.aliases.contains(&"medidata rave".to_string()));
        assert!(rave.aliases.contains(&"edc system".to_string()));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AdvisorConfig::default();
        config.similarity_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = AdvisorConfig::default();
        config.max_clusters = 1;
        assert!(config.validate().is_err());

        let mut config = AdvisorConfig::default();
        config.canonical_skills.clear();
        assert!(config.validate().is_err());

        let mut config = AdvisorConfig::default();
        config.skill_match_threshold = -2.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AdvisorError::Config(ref msg) if msg.contains("skill_match_threshold")));
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_load_rejects_invalid_advisor_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[advisor]\nmax_clusters = 1").unwrap();

        let err = Settings::load(Some(file.path().to_str().unwrap())).unwrap_err();
        assert!(matches!(err, AdvisorError::Config(ref msg) if msg.contains("max_clusters")));
    }

    #[test]
    fn test_load_with_cli_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "log_level = \"debug\"\nembedding_backend = \"hashing\"\n\n[advisor]\nmax_clusters = 3"
        )
        .unwrap();

        let settings = Settings::load(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(settings.embedding_backend, EmbeddingBackend::Hashing);
        assert_eq!(settings.advisor.max_clusters, 3);
        // Untouched advisor fields keep their defaults
        assert_eq!(settings.advisor.critical_gap_count, 6);
    }

    #[test]
    fn test_advisor_config_serialization() {
        let config = AdvisorConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let decoded: AdvisorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.max_clusters, config.max_clusters);
        assert_eq!(decoded.product_families, config.product_families);
    }
}
