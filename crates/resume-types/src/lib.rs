//! # resume-types
//!
//! Shared domain types for the resume advisor.
//!
//! This crate defines the data structures passed between the pipeline stages
//! and returned to callers:
//! - `Suggestion`: a typed, section-targeted editing recommendation
//! - `SmartAdvice`: the aggregate result of one resume/job analysis
//! - `AdvisorConfig` / `Settings`: tunables and layered configuration
//!
//! ## Usage
//!
//! ```rust
//! use resume_types::{Section, Suggestion};
//!
//! let s = Suggestion::add_bullet(Section::Experience, "Add a testing bullet.", "Job asks for it.");
//! assert_eq!(s.section(), Section::Experience);
//! ```

pub mod advice;
pub mod config;
pub mod error;

pub use advice::{ModelSource, Section, SmartAdvice, Suggestion};
pub use config::{
    default_canonical_skills, AdvisorConfig, EmbeddingBackend, LlmSettings, ProductFamily,
    Settings,
};
pub use error::AdvisorError;
