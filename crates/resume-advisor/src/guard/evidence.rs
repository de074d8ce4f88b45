//! Unevidenced-experience guard.
//!
//! A suggestion phrased as something the candidate has already done may
//! only name technologies the resume evidences. Anything else is reframed
//! as learning and moved out of Experience.

use std::collections::HashSet;

use resume_match::{normalize, NormalizedText};
use resume_types::{ProductFamily, Section, Suggestion};
use tracing::debug;

use crate::text::{contains_phrase, join_natural, split_first_word};
use crate::verbs::{base_form, past_to_base};

const LEARNING_LEADS: &[&str] = &[
    "if ",
    "building familiarity",
    "familiarity with",
    "learning",
    "learn ",
    "exploring",
    "explore ",
    "interest in",
    "interested in",
    "studying",
    "coursework",
    "training in",
];

const HEDGE_LEADS: &[&str] = &["helped ", "aimed to ", "contributed to ", "worked to "];

const ASSERTIONS: &[&str] = &[
    "experience with",
    "experience in",
    "experienced with",
    "experienced in",
    "proficient in",
    "proficiency in",
    "expertise in",
    "expert in",
    "skilled in",
    "hands-on with",
    "years of",
];

const MIN_TOKEN_CHARS: usize = 4;
const MIN_TOKEN_HITS: usize = 2;

/// Whether `text` asserts something the candidate has already done.
///
/// Conditional advice ("If you have ...") and learning framings never do.
/// Otherwise a leading accomplishment verb (hedged or not) or an explicit
/// assertion ("experience with", "proficient in") makes it a claim.
pub fn is_experience_claim(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    if LEARNING_LEADS.iter().any(|lead| lower.starts_with(lead)) {
        return false;
    }

    let (hedged, rest) = match HEDGE_LEADS.iter().find_map(|h| lower.strip_prefix(h)) {
        Some(rest) => (true, rest),
        None => (false, lower.as_str()),
    };
    let (first, _) = split_first_word(rest);
    let first = first.trim_end_matches(|c: char| !c.is_alphanumeric());
    let verb_led = if hedged {
        base_form(first).is_some()
    } else {
        past_to_base(first).is_some()
    };

    verb_led || ASSERTIONS.iter().any(|a| lower.contains(a))
}

/// Checks phrases against resume text.
#[derive(Debug, Clone)]
pub struct EvidenceChecker {
    families: Vec<ProductFamily>,
    generic_tokens: HashSet<String>,
}

impl EvidenceChecker {
    pub fn new(families: Vec<ProductFamily>, generic_tokens: &[String]) -> Self {
        Self {
            families,
            generic_tokens: generic_tokens.iter().map(|t| t.to_lowercase()).collect(),
        }
    }

    /// Families with an alias inside `phrase`.
    fn families_named_in<'a>(&'a self, phrase: &'a str) -> impl Iterator<Item = &'a ProductFamily> {
        self.families
            .iter()
            .filter(move |f| f.aliases.iter().any(|a| contains_phrase(phrase, a)))
    }

    fn family_mentioned(family: &ProductFamily, resume: &NormalizedText) -> bool {
        family
            .aliases
            .iter()
            .any(|a| contains_phrase(resume.as_str(), a))
    }

    /// Whether the resume evidences `phrase`.
    ///
    /// A phrase naming a product family is evidenced only when the resume
    /// names some alias of every family it touches. Other phrases need a
    /// whole-word match or, when multi-word, at least two non-generic
    /// tokens of four or more characters present in the resume.
    pub fn is_evidenced(&self, phrase: &str, resume: &NormalizedText) -> bool {
        let phrase = normalize(phrase);
        let phrase = phrase.as_str();
        if phrase.is_empty() {
            return true;
        }

        let mut families = self.families_named_in(phrase).peekable();
        if families.peek().is_some() {
            return families.all(|f| Self::family_mentioned(f, resume));
        }

        if resume.contains(phrase) {
            return true;
        }
        let words: Vec<&str> = phrase.split_whitespace().collect();
        if words.len() < 2 {
            return false;
        }
        let hits = words
            .iter()
            .filter(|w| w.chars().count() >= MIN_TOKEN_CHARS)
            .filter(|w| !self.generic_tokens.contains(**w))
            .filter(|w| contains_phrase(resume.as_str(), w))
            .count();
        hits >= MIN_TOKEN_HITS
    }

    /// Phrases from `vocabulary` and family aliases named in `text`.
    ///
    /// A phrase contained in a longer named phrase is dropped in favor of
    /// the longer one.
    pub fn claimed_phrases(&self, text: &str, vocabulary: &[String]) -> Vec<String> {
        let text = normalize(text);
        let mut named: Vec<String> = Vec::new();
        let aliases = self.families.iter().flat_map(|f| f.aliases.iter());
        for candidate in vocabulary.iter().chain(aliases) {
            let candidate = normalize(candidate).into_string();
            if candidate.is_empty() || self.generic_tokens.contains(&candidate) {
                continue;
            }
            if contains_phrase(text.as_str(), &candidate) && !named.contains(&candidate) {
                named.push(candidate);
            }
        }

        named
            .iter()
            .filter(|p| {
                !named
                    .iter()
                    .any(|longer| longer.len() > p.len() && contains_phrase(longer, p))
            })
            .cloned()
            .collect()
    }

    /// Downgrade `suggestion` when it claims phrases the resume lacks.
    pub fn check(
        &self,
        suggestion: Suggestion,
        resume: &NormalizedText,
        vocabulary: &[String],
    ) -> Suggestion {
        if !is_experience_claim(suggestion.suggested_text()) {
            return suggestion;
        }
        let missing: Vec<String> = self
            .claimed_phrases(suggestion.suggested_text(), vocabulary)
            .into_iter()
            .filter(|p| !self.is_evidenced(p, resume))
            .collect();
        if missing.is_empty() {
            return suggestion;
        }

        debug!(phrases = ?missing, "Reframing unevidenced experience claim");
        downgrade(suggestion, &missing)
    }
}

/// Rewrite a claim as learning and move it out of Experience.
fn downgrade(suggestion: Suggestion, missing: &[String]) -> Suggestion {
    let subject = join_natural(missing, 3);
    let text = learning_text(suggestion.suggested_text(), &subject);
    let note = format!("(Reframed as learning: {subject} is not evidenced in the resume.)");
    let target = match suggestion.section() {
        Section::Experience | Section::Skills => Section::Projects,
        other => other,
    };
    suggestion.with_text(text).with_note(&note).redirect(target)
}

fn learning_text(claim: &str, subject: &str) -> String {
    let claim = claim.trim();
    let lower = claim.to_lowercase();
    let offset = HEDGE_LEADS
        .iter()
        .find(|h| lower.starts_with(*h))
        .map_or(0, |h| h.len());
    let (first, rest) = split_first_word(&claim[offset..]);
    let action = rest
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .trim_end_matches('.');
    let asserts = ASSERTIONS.iter().any(|a| action.to_lowercase().contains(a));

    match base_form(first.trim_end_matches(|c: char| !c.is_alphanumeric())) {
        Some(base) if !action.is_empty() && !asserts => format!(
            "Building familiarity with {subject}: plan a practice project where you {base} {action}."
        ),
        _ => format!(
            "Building familiarity with {subject}: build a small practice project with it and describe what you learned."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resume_types::AdvisorConfig;

    fn checker() -> EvidenceChecker {
        let config = AdvisorConfig::default();
        EvidenceChecker::new(config.product_families, &config.generic_tokens)
    }

    fn vocab(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_experience_claim_detection() {
        assert!(is_experience_claim("Built data pipelines in Spark."));
        assert!(is_experience_claim("Helped build a CI pipeline"));
        assert!(is_experience_claim("Strong experience with Kubernetes"));
        assert!(!is_experience_claim("If you have used Docker, add a bullet."));
        assert!(!is_experience_claim("Building familiarity with Docker: plan a project."));
        assert!(!is_experience_claim("Add a summary aligned to the role."));
        assert!(!is_experience_claim("Build a project that combines Docker and Helm."));
    }

    #[test]
    fn test_whole_word_evidence() {
        let resume = normalize("Deployed services with Docker and Kubernetes in JavaScript");
        let checker = checker();
        assert!(checker.is_evidenced("docker", &resume));
        assert!(checker.is_evidenced("service", &resume));
        assert!(!checker.is_evidenced("terraform", &resume));
        assert!(!checker.is_evidenced("java", &resume));
    }

    #[test]
    fn test_multi_word_token_evidence() {
        let resume = normalize("Streaming pipelines on Kafka with schema registry");
        let checker = checker();
        assert!(checker.is_evidenced("kafka streaming", &resume));
        // only one qualifying token, "system" is generic
        assert!(!checker.is_evidenced("kafka system", &resume));
    }

    #[test]
    fn test_family_evidence() {
        let checker = checker();
        let with_rave = normalize("Built eCRFs in Medidata Rave for phase trials");
        let without = normalize("Built dashboards in React");
        assert!(checker.is_evidenced("edc system", &with_rave));
        assert!(!checker.is_evidenced("edc system", &without));
        // a different family does not count
        assert!(!checker.is_evidenced("veeva vault", &with_rave));
    }

    #[test]
    fn test_claimed_phrases_prefer_longer() {
        let checker = checker();
        let phrases = checker.claimed_phrases(
            "Configured the EDC system and Docker images",
            &vocab(&["docker", "edc system"]),
        );
        assert_eq!(phrases, vec!["docker", "edc system"]);
    }

    #[test]
    fn test_unevidenced_claim_is_reframed() {
        let checker = checker();
        let resume = normalize("Python developer");
        let s = Suggestion::add_bullet(
            Section::Experience,
            "Applied docker to ship a real feature; add this as a bullet with a quantifiable outcome.",
            "Job emphasizes docker.",
        );
        let out = checker.check(s, &resume, &vocab(&["docker"]));

        assert_eq!(out.section(), Section::Projects);
        assert_eq!(
            out.suggested_text(),
            "Building familiarity with docker: plan a practice project where you apply docker to ship a real feature."
        );
        assert!(out.rationale().contains("not evidenced"));
        assert!(!is_experience_claim(out.suggested_text()));
    }

    #[test]
    fn test_evidenced_claim_is_kept() {
        let checker = checker();
        let resume = normalize("Configured Medidata Rave studies");
        let s = Suggestion::add_bullet(Section::Experience, "Applied edc system validation checks.", "");
        let out = checker.check(s.clone(), &resume, &vocab(&["edc system"]));
        assert_eq!(out, s);
    }

    #[test]
    fn test_assertion_without_verb_gets_generic_reframe() {
        let checker = checker();
        let resume = normalize("React developer");
        let s = Suggestion::add_bullet(Section::Summary, "Experience with Veeva Vault.", "");
        let out = checker.check(s, &resume, &[]);
        assert_eq!(out.section(), Section::Summary);
        assert!(out
            .suggested_text()
            .starts_with("Building familiarity with veeva vault: build a small practice project"));
    }

    #[test]
    fn test_learning_suggestions_untouched() {
        let checker = checker();
        let resume = normalize("");
        let s = Suggestion::add_bullet(
            Section::Experience,
            "If you have used Medidata Rave, add a bullet.",
            "",
        );
        assert_eq!(checker.check(s.clone(), &resume, &[]), s);
    }
}
