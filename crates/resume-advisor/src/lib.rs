//! # resume-advisor
//!
//! Turns a resume/job match into guarded, section-targeted advice.
//!
//! ## Features
//! - `Advisor::analyze`: fit estimate, similarity, present/missing skills,
//!   critical gaps, section suggestions, ready bullets and rewrite hints
//! - Suggestion composer working from clustered coverage gaps
//! - Evidence guard: no invented numbers, no unevidenced experience claims
//! - Optional personal suggestions from an OpenAI-compatible or Anthropic
//!   endpoint, guarded and with template fallback
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use resume_advisor::Advisor;
//! use resume_embeddings::SharedEmbedder;
//! use resume_types::AdvisorConfig;
//!
//! let advisor = Advisor::new(Arc::new(SharedEmbedder::hashing()), AdvisorConfig::default());
//! let advice = advisor
//!     .analyze("Python developer", "Python and Docker engineer", Some("Backend Engineer"))
//!     .unwrap();
//! assert!(advice.fit_estimate <= 100);
//! ```

pub mod composer;
pub mod guard;
pub mod personal;
pub mod pipeline;
pub mod text;
pub mod verbs;

pub use composer::{ComposeInput, Composition, SuggestionComposer};
pub use guard::{enforce_no_fake_metrics, is_experience_claim, EvidenceChecker, EvidenceGuard, METRIC_NOTE};
pub use personal::{
    generator_from_settings, ApiSuggester, ApiSuggesterConfig, MockSuggester, Provider,
    SuggesterError, SuggestionGenerator, SuggestionRequest,
};
pub use pipeline::{display_similarity, fit_score, Advisor};
pub use verbs::{action_verbs, rewrite_hints};
