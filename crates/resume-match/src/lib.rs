//! # resume-match
//!
//! Lexical and semantic matching of a resume against a job description.
//!
//! Everything here is a pure function of its inputs plus the shared,
//! read-only embedder.
//!
//! ## Features
//! - Text normalization that preserves tech tokens (c++, c#, node.js)
//! - Contrastive TF-IDF n-grams and embedding keyphrases from job text
//! - Noise filtering of boilerplate and sentence fragments
//! - Lexical-then-semantic coverage classification
//! - Canonical skill mapping and critical gap ranking
//! - Spherical k-means clustering of missing terms into themes
//! - ATS-style keyword overlap scores

/// Declare a lazily compiled regex `static`.
///
/// A pattern that fails to compile yields `None` at runtime, so each
/// module that declares patterns tests that all of them are `Some`.
#[macro_export]
macro_rules! pattern {
    ($name:ident, $regex_str:expr) => {
        static $name: ::std::sync::LazyLock<::std::option::Option<$crate::regex::Regex>> =
            ::std::sync::LazyLock::new(|| $crate::regex::Regex::new($regex_str).ok());
    };
}

#[doc(hidden)]
pub use regex;

pub mod ats;
pub mod cluster;
pub mod coverage;
pub mod error;
pub mod keyphrase;
pub mod normalize;
pub mod similarity;
pub mod skills;
pub mod terms;
pub mod tfidf;

pub use ats::{ats_score, score_dynamic, AtsScore, DynamicScore};
pub use cluster::{kmeans, ClusterPolicy, GapClusterer, ThemeCluster};
pub use coverage::{Coverage, CoverageBasis, CoverageClassifier, ResumeProfile};
pub use error::MatchError;
pub use keyphrase::KeyphraseExtractor;
pub use normalize::{normalize, phrase_runs, NormalizedText};
pub use similarity::{calculate_centroid, cosine_similarity};
pub use skills::SkillVocabulary;
pub use terms::{is_boilerplate_word, is_noise, merge_terms, Term, TermExtractor, TermSource};
pub use tfidf::{contrastive_terms, TfIdf};
