//! Personal suggestions from an external text generator.
//!
//! The generator sees the same signals the core computes (title, missing
//! and critical skills, resume and job excerpts) and returns typed
//! suggestions. Its output is guarded like everything else; any failure
//! falls back to the template suggestions.

mod api;
mod mock;

pub use api::{ApiSuggester, ApiSuggesterConfig, Provider};
pub use mock::MockSuggester;

use std::time::Duration;

use async_trait::async_trait;
use resume_types::{LlmSettings, SmartAdvice, Suggestion};
use thiserror::Error;
use tracing::{info, warn};

use crate::pipeline::Advisor;

/// Characters of resume and job text sent to the generator.
pub const EXCERPT_CHARS: usize = 2000;

/// Error type for suggestion generation.
#[derive(Debug, Error)]
pub enum SuggesterError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Timeout waiting for response")]
    Timeout,
}

/// Signals handed to a generator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionRequest {
    pub job_title: String,
    pub missing_skills: Vec<String>,
    pub critical_gaps: Vec<String>,
    pub present_skills: Vec<String>,
    pub resume_excerpt: String,
    pub job_excerpt: String,
}

impl SuggestionRequest {
    /// Build a request from an analysis and the texts it ran on.
    pub fn from_advice(
        advice: &SmartAdvice,
        resume_text: &str,
        job_text: &str,
        job_title: Option<&str>,
    ) -> Self {
        Self {
            job_title: job_title.unwrap_or_default().trim().to_string(),
            missing_skills: advice.missing_skills.clone(),
            critical_gaps: advice.critical_gaps.clone(),
            present_skills: advice.present_skills.clone(),
            resume_excerpt: excerpt(resume_text),
            job_excerpt: excerpt(job_text),
        }
    }
}

fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect()
}

/// Pluggable suggestion generator.
#[async_trait]
pub trait SuggestionGenerator: Send + Sync {
    /// Produce suggestions for one analysis.
    async fn generate(&self, request: &SuggestionRequest) -> Result<Vec<Suggestion>, SuggesterError>;

    /// Model name recorded in `ModelSource::suggestions`.
    fn model_name(&self) -> String;
}

/// The API generator described by `settings`, or `None` when disabled.
pub fn generator_from_settings(settings: &LlmSettings) -> Result<Option<ApiSuggester>, SuggesterError> {
    if !settings.enabled {
        return Ok(None);
    }
    let config = ApiSuggesterConfig::from_settings(settings)?;
    ApiSuggester::new(config).map(Some)
}

impl Advisor {
    /// Add personal suggestions to a finished analysis.
    ///
    /// Never fails: a generator error, timeout or empty answer leaves the
    /// guarded template suggestions in `personal_suggestions` and no
    /// suggestion model in `model_source`.
    pub async fn personalize(
        &self,
        mut advice: SmartAdvice,
        resume_text: &str,
        job_text: &str,
        job_title: Option<&str>,
        generator: &dyn SuggestionGenerator,
    ) -> SmartAdvice {
        let request = SuggestionRequest::from_advice(&advice, resume_text, job_text, job_title);
        let llm = &self.config().llm;
        let budget = Duration::from_secs(llm.timeout_secs.max(1) * (u64::from(llm.max_retries) + 1));

        let generated = match tokio::time::timeout(budget, generator.generate(&request)).await {
            Ok(result) => result,
            Err(_) => Err(SuggesterError::Timeout),
        };

        match generated {
            Ok(items) if !items.is_empty() => {
                let claims: Vec<String> = advice
                    .missing_skills
                    .iter()
                    .chain(advice.critical_gaps.iter())
                    .cloned()
                    .collect();
                let guarded = self.guard().sanitize(items, resume_text, &claims);
                info!(count = guarded.len(), model = %generator.model_name(), "Personal suggestions generated");
                advice.personal_suggestions = guarded;
                advice.model_source.suggestions = Some(generator.model_name());
            }
            Ok(_) => {
                warn!("Suggestion generator returned nothing, using template suggestions");
                advice.personal_suggestions = advice.suggestions.clone();
                advice.model_source.suggestions = None;
            }
            Err(e) => {
                warn!(error = %e, "Suggestion generator failed, using template suggestions");
                advice.personal_suggestions = advice.suggestions.clone();
                advice.model_source.suggestions = None;
            }
        }
        advice
    }
}
