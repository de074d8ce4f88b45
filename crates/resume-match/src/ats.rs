//! Keyword overlap scores.
//!
//! Two cheap lexical scores that need no embeddings: a plain ATS-style
//! token overlap and a candidate-phrase overlap that also picks up
//! capitalized product names and dotted/slashed tech tokens.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::normalize::{normalize, phrase_runs, run_ngrams_up_to};

// Word tokens for the ATS score: a letter, then letters or + - . # /
pattern!(RE_WORD, r"[a-z][a-z+\-.#/]*");

// Dotted/slashed tokens, Capitalized Phrases, letter+digit tokens, ACRONYMS
pattern!(
    RE_TECH,
    r"(?:[A-Za-z]\w*(?:[-./]\w+)+)|(?:[A-Z][a-z]+(?:\s[A-Z][a-z]+)*)|(?:[A-Za-z]+\d+)|(?:[A-Z]{2,})"
);

const ATS_STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "to", "of", "in", "on", "for", "with", "at", "by", "from", "is",
    "are", "was", "were", "be", "as", "that", "this", "it", "its", "your", "you", "we", "our",
    "their", "they", "he", "she", "i",
];

const CANDIDATE_IGNORE: &[&str] = &[
    "team", "work", "working", "world", "academic", "university", "students", "staff", "being",
    "https", "all", "also", "after", "about", "every", "more", "anywhere", "offer",
];

/// Result of `ats_score`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtsScore {
    /// Share of job tokens found in the resume, 0-100
    pub score: u8,
    /// Job tokens also in the resume, sorted
    pub matches: Vec<String>,
}

fn ats_tokens(text: &str) -> BTreeSet<String> {
    let Some(re) = RE_WORD.as_ref() else {
        return BTreeSet::new();
    };
    let lower = text.to_lowercase();
    re.find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|w| w.len() >= 2 && !ATS_STOPWORDS.contains(w))
        .map(String::from)
        .collect()
}

fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    ((100.0 * part as f64 / whole as f64).round() as u64).min(100) as u8
}

/// Plain token overlap: `round(100 * |job ∩ resume| / |job|)`.
///
/// Empty job text scores 0.
pub fn ats_score(resume_text: &str, job_text: &str) -> AtsScore {
    let resume = ats_tokens(resume_text);
    let job = ats_tokens(job_text);
    let matches: Vec<String> = job.intersection(&resume).cloned().collect();
    AtsScore {
        score: percent(matches.len(), job.len()),
        matches,
    }
}

/// Result of `score_dynamic`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DynamicScore {
    /// Share of job candidates found in the resume, 0-100
    pub score: u8,
    /// Job candidates also in the resume, sorted
    pub matched: Vec<String>,
    /// Job candidates not in the resume, sorted
    pub missing: Vec<String>,
    /// Number of job candidates
    pub total: usize,
}

fn candidates(text: &str) -> BTreeSet<String> {
    let mut out: BTreeSet<String> = RE_TECH
        .as_ref()
        .map(|re| {
            re.find_iter(text)
                .map(|m| normalize(m.as_str()).into_string())
                .collect()
        })
        .unwrap_or_default();

    out.extend(
        run_ngrams_up_to(&phrase_runs(text), 3)
            .into_iter()
            .filter(|g| g.len() >= 3),
    );
    out.retain(|c| !c.is_empty());
    out
}

/// Candidate-phrase overlap between job and resume.
///
/// Job candidates drop a small junk list and anything of two characters
/// or fewer.
pub fn score_dynamic(resume_text: &str, job_text: &str) -> DynamicScore {
    let mut job = candidates(job_text);
    job.retain(|c| c.len() > 2 && !CANDIDATE_IGNORE.contains(&c.as_str()));
    let resume = candidates(resume_text);

    let (matched, missing): (Vec<String>, Vec<String>) =
        job.iter().cloned().partition(|c| resume.contains(c));

    DynamicScore {
        score: percent(matched.len(), job.len()),
        total: job.len(),
        matched,
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        for re in [&RE_WORD, &RE_TECH] {
            assert!(re.is_some());
        }
    }

    #[test]
    fn test_ats_score_overlap() {
        let result = ats_score("Python and Docker", "Python, Docker, Kubernetes");
        assert_eq!(result.matches, vec!["docker", "python"]);
        assert_eq!(result.score, 67);
    }

    #[test]
    fn test_ats_score_keeps_tech_tokens() {
        let result = ats_score("Node.js and C# services", "node.js c#");
        assert_eq!(result.score, 100);
        assert!(result.matches.contains(&"node.js".to_string()));
    }

    #[test]
    fn test_ats_score_empty_job() {
        let result = ats_score("anything", "");
        assert_eq!(result.score, 0);
        assert!(result.matches.is_empty());
    }

    #[test]
    fn test_ats_score_ignores_stopwords_and_short_tokens() {
        let result = ats_score("", "the a x of");
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_candidates_pick_up_capitalized_names() {
        let c = candidates("Experience with Medidata Rave and AWS S3");
        assert!(c.contains("medidata rave"));
        assert!(c.contains("aws"));
        assert!(c.contains("s3"));
    }

    #[test]
    fn test_score_dynamic() {
        let result = score_dynamic(
            "Built REST APIs in Python",
            "Python REST APIs, team work",
        );
        assert!(result.matched.contains(&"python".to_string()));
        assert!(!result.missing.contains(&"team".to_string()));
        assert_eq!(result.total, result.matched.len() + result.missing.len());
        assert!(result.score > 0 && result.score <= 100);
    }

    #[test]
    fn test_score_dynamic_empty_job() {
        let result = score_dynamic("resume", "");
        assert_eq!(result.score, 0);
        assert_eq!(result.total, 0);
    }
}
