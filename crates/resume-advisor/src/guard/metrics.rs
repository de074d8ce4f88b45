//! Metric fabrication guard.
//!
//! A resume with no digits gives no grounds for any number in a suggestion.
//! Numbers are stripped and completed-outcome sentences are hedged. A resume
//! with at least one digit lets numeric suggestions through untouched; this
//! is a document-level allowance, not a per-number check.

use std::sync::LazyLock;

use regex::Regex;
use resume_match::pattern;
use resume_types::Suggestion;
use tracing::debug;

use crate::text::split_first_word;
use crate::verbs::past_to_base;

/// Rationale note added to every suggestion the guard rewrote.
pub const METRIC_NOTE: &str = "(Avoided adding new numbers not present in resume.)";

// "by 40%", "by 3x", "by 5pp"
pattern!(RE_BY_METRIC, r"(?i)\bby\s+\d+(?:\.\d+)?\s*(?:%|x\b|pp\b)");

// Percentages, durations, multipliers, currency, k/m/b magnitudes, "10+"
pattern!(
    RE_METRIC,
    r"(?i)\b\d+(?:\.\d+)?\s*%|\b\d+(?:\.\d+)?\s*(?:ms|sec|secs|seconds|mins|minutes|hrs|hours)\b|\b\d+(?:\.\d+)?\s*(?:x|pp)\b|[$€£]\s*\d+(?:[.,]\d+)*\s*(?:k\b|m\b|b\b|million\b|billion\b)?|\b\d{1,3}\s*(?:k|m|b)\b|\b\d+\+"
);

// Any remaining number, with thousands separators
pattern!(RE_NUMBER, r"\d+(?:[.,]\d+)*\+?");

// A preposition left with nothing to govern
pattern!(
    RE_DANGLING,
    r"(?i)\s+(?:by|from|to|of|under|over|about|around|nearly|within)\s*([,.;:)]|$)"
);

pattern!(RE_EMPTY_PARENS, r"\(\s*[,;:/+\-%]*\s*\)");
pattern!(RE_MULTI_SPACE, r"\s{2,}");
pattern!(RE_SPACE_BEFORE_PUNCT, r"\s+([,.;:)])");

// Already hedged at the start
pattern!(
    RE_HEDGED,
    r"(?i)^\s*(?:aimed to|helped|contributed to|worked to|supported)\b"
);

fn replace(re: &LazyLock<Option<Regex>>, text: &str, with: &str) -> String {
    match re.as_ref() {
        Some(re) => re.replace_all(text, with).into_owned(),
        None => text.to_string(),
    }
}

/// True when the text contains any ASCII digit.
pub fn has_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

/// True when the text contains a metric-like pattern.
pub fn has_metric(text: &str) -> bool {
    RE_METRIC.as_ref().is_some_and(|re| re.is_match(text)) || has_digit(text)
}

/// Remove every number and metric from `text`, then tidy what is left.
///
/// The result never contains a digit.
pub fn strip_numbers(text: &str) -> String {
    let mut out = replace(&RE_BY_METRIC, text, "");
    out = replace(&RE_METRIC, &out, "");
    out = replace(&RE_NUMBER, &out, "");
    out.retain(|c| !c.is_ascii_digit());

    // "from to." collapses in two passes
    for _ in 0..3 {
        let next = replace(&RE_DANGLING, &out, "$1");
        if next == out {
            break;
        }
        out = next;
    }
    out = replace(&RE_EMPTY_PARENS, &out, "");
    out = replace(&RE_MULTI_SPACE, &out, " ");
    out = replace(&RE_SPACE_BEFORE_PUNCT, &out, "$1");
    out.trim()
        .trim_start_matches(|c: char| c.is_ascii_punctuation() && c != '(')
        .trim()
        .to_string()
}

/// Hedge a sentence that asserts a completed outcome.
///
/// "Improved ..." becomes "Aimed to improve ...", any other leading
/// accomplishment verb becomes "Helped <verb> ...". Instructions and
/// already hedged text are returned unchanged.
pub fn hedge(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() || RE_HEDGED.as_ref().is_some_and(|re| re.is_match(text)) {
        return text.to_string();
    }
    let (first, rest) = split_first_word(text);
    let Some(base) = past_to_base(first.trim_end_matches(|c: char| !c.is_alphanumeric())) else {
        return text.to_string();
    };
    if base == "improve" {
        format!("Aimed to improve{rest}")
    } else {
        format!("Helped {base}{rest}")
    }
}

/// Strip unsupported numbers from suggestions.
///
/// When the resume has no digit, each suggestion carrying a number is
/// stripped, hedged, and annotated with [`METRIC_NOTE`]. Suggestions left
/// with no text are dropped.
pub fn enforce_no_fake_metrics(suggestions: Vec<Suggestion>, resume_text: &str) -> Vec<Suggestion> {
    if has_digit(resume_text) {
        return suggestions;
    }

    suggestions
        .into_iter()
        .filter_map(|suggestion| {
            if !has_metric(suggestion.suggested_text()) {
                return Some(suggestion);
            }
            let cleaned = hedge(&strip_numbers(suggestion.suggested_text()));
            if cleaned.is_empty() {
                debug!(text = suggestion.suggested_text(), "Dropped suggestion that was only numbers");
                return None;
            }
            Some(suggestion.with_text(cleaned).with_note(METRIC_NOTE))
        })
        .collect()
}
