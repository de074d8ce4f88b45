//! Text normalization and tokenization.
//!
//! Every comparison in the pipeline runs on normalized text: lowercase,
//! restricted to `[a-z0-9+#/.-]` plus single spaces. The kept punctuation
//! preserves tokens like "c++", "c#", "node.js" and "ci/cd".

use std::fmt;

use serde::Serialize;

/// Text after `normalize`.
///
/// Invariant: `normalize(x.as_str()) == x`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whole-word containment of an already normalized needle.
    ///
    /// The needle must start and end on word boundaries; a trailing "s" or
    /// "es" on the last word is allowed, so "rest api" is found in
    /// "rest apis" but "java" is not found in "javascript".
    pub fn contains(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return false;
        }
        let open_start = needle.starts_with(|c: char| !is_word_char(c));
        let open_end = needle.ends_with(|c: char| !is_word_char(c));
        // Overlapping occurrences count: "ab ab" must be found in "xab ab ab"
        let mut from = 0;
        while let Some(offset) = self.0[from..].find(needle) {
            let start = from + offset;
            let before = self.0[..start].chars().next_back();
            let rest = &self.0[start + needle.len()..];
            let starts_word = open_start || before.map_or(true, |c| !is_word_char(c));
            let ends_word = open_end
                || ends_at_boundary(rest)
                || rest.strip_prefix('s').is_some_and(ends_at_boundary)
                || rest.strip_prefix("es").is_some_and(ends_at_boundary);
            if starts_word && ends_word {
                return true;
            }
            from = start + self.0[start..].chars().next().map_or(1, char::len_utf8);
        }
        false
    }

    /// True if any character is an ASCII digit.
    pub fn has_digit(&self) -> bool {
        self.0.bytes().any(|b| b.is_ascii_digit())
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Letters, digits and the symbols that belong inside a tech token.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '#')
}

fn ends_at_boundary(rest: &str) -> bool {
    rest.chars().next().map_or(true, |c| !is_word_char(c))
}

fn is_kept(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '#' | '/' | '.' | '-')
}

/// Canonicalize free text. Total and idempotent.
pub fn normalize(text: &str) -> NormalizedText {
    let mapped: String = text
        .to_lowercase()
        .chars()
        .map(|c| if is_kept(c) { c } else { ' ' })
        .collect();
    NormalizedText(mapped.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Common English words dropped before n-gram formation.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "or", "that", "the", "to", "was", "were", "will", "with", "this", "they",
    "but", "have", "had", "what", "when", "where", "who", "which", "why", "how", "all", "each",
    "every", "both", "few", "more", "most", "other", "some", "such", "no", "nor", "not", "only",
    "own", "same", "so", "than", "too", "very", "can", "just", "should", "now", "also", "been",
    "being", "do", "does", "did", "doing", "would", "could", "might", "must", "shall", "about",
    "above", "after", "again", "against", "am", "any", "before", "below", "between", "into",
    "through", "during", "out", "over", "under", "up", "down", "then", "once", "here", "there",
    "if", "else", "while", "because", "until", "we", "you", "your", "our", "their", "him", "her",
    "them", "me", "my", "myself", "itself", "those", "these", "his", "using", "etc", "i",
];

/// Check if a word is a stop word.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Sentence punctuation at token edges is trimmed ("apis." -> "apis");
/// interior punctuation is kept ("node.js", "ci/cd").
fn trim_token(token: &str) -> &str {
    token.trim_matches(|c| matches!(c, '.' | '/' | '-'))
}

fn is_content_token(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_alphabetic()) && !is_stop_word(token)
}

/// Punctuation that ends a phrase. Normalization turns all of it into
/// spaces, so clauses are cut from the raw text first.
fn is_clause_break(c: char) -> bool {
    matches!(
        c,
        ',' | ';' | ':' | '!' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '&' | '"' | '•' | '·' | '*'
            | '\n' | '\r' | '\t'
    )
}

/// Runs of adjacent content tokens, the only places a phrase can live.
///
/// A run ends at clause punctuation, at a sentence-ending period, at a
/// stopword, and at a token without letters; those tokens are dropped.
/// Accepts raw or normalized text; raw text keeps the comma and bracket
/// breaks that normalization erases.
pub fn phrase_runs(text: &str) -> Vec<Vec<String>> {
    let mut runs = Vec::new();
    for clause in text.split(is_clause_break) {
        let mut run: Vec<String> = Vec::new();
        for raw in normalize(clause).as_str().split(' ') {
            let token = trim_token(raw);
            if is_content_token(token) {
                run.push(token.to_string());
                if !raw.ends_with('.') {
                    continue;
                }
            }
            if !run.is_empty() {
                runs.push(std::mem::take(&mut run));
            }
        }
        if !run.is_empty() {
            runs.push(run);
        }
    }
    runs
}

/// Contiguous n-grams of `tokens`, joined with single spaces.
pub fn ngrams(tokens: &[String], n: usize) -> Vec<String> {
    if n == 0 || tokens.len() < n {
        return Vec::new();
    }
    tokens.windows(n).map(|w| w.join(" ")).collect()
}

/// All 1..=max_n grams of every run, shortest first, in text order within
/// each length. No gram crosses a run boundary.
pub fn run_ngrams_up_to(runs: &[Vec<String>], max_n: usize) -> Vec<String> {
    (1..=max_n)
        .flat_map(|n| runs.iter().flat_map(move |run| ngrams(run, n)))
        .collect()
}
