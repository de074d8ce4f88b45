//! Accomplishment verbs.
//!
//! The same table serves two purposes: counting the strong action verbs a
//! resume uses next to technical terms, and recognising (then hedging or
//! reframing) generated text that asserts a completed accomplishment.

use std::collections::BTreeSet;

use resume_match::{normalize, pattern};

use crate::text::contains_phrase;

// Sentence breaks: terminal punctuation followed by space, line breaks, bullets
pattern!(RE_SENTENCE_BREAK, r"[.!?;]\s+|[\r\n]+|\s[•·*]\s");

/// One verb in its inflected forms.
#[derive(Debug, Clone, Copy)]
pub struct Verb {
    pub base: &'static str,
    pub past: &'static str,
    pub gerund: &'static str,
    /// Counts toward the action-verb signal
    pub strong: bool,
}

const fn verb(base: &'static str, past: &'static str, gerund: &'static str, strong: bool) -> Verb {
    Verb {
        base,
        past,
        gerund,
        strong,
    }
}

const VERBS: &[Verb] = &[
    verb("build", "built", "building", true),
    verb("design", "designed", "designing", true),
    verb("implement", "implemented", "implementing", true),
    verb("optimize", "optimized", "optimizing", true),
    verb("migrate", "migrated", "migrating", true),
    verb("automate", "automated", "automating", true),
    verb("lead", "led", "leading", true),
    verb("own", "owned", "owning", true),
    verb("deliver", "delivered", "delivering", true),
    verb("deploy", "deployed", "deploying", true),
    verb("scale", "scaled", "scaling", true),
    verb("mentor", "mentored", "mentoring", true),
    verb("improve", "improved", "improving", true),
    verb("reduce", "reduced", "reducing", false),
    verb("cut", "cut", "cutting", false),
    verb("increase", "increased", "increasing", false),
    verb("develop", "developed", "developing", false),
    verb("create", "created", "creating", false),
    verb("launch", "launched", "launching", false),
    verb("apply", "applied", "applying", false),
    verb("engineer", "engineered", "engineering", false),
    verb("architect", "architected", "architecting", false),
    verb("manage", "managed", "managing", false),
    verb("ship", "shipped", "shipping", false),
    verb("integrate", "integrated", "integrating", false),
    verb("maintain", "maintained", "maintaining", false),
    verb("streamline", "streamlined", "streamlining", false),
    verb("accelerate", "accelerated", "accelerating", false),
    verb("establish", "established", "establishing", false),
    verb("achieve", "achieved", "achieving", false),
    verb("use", "used", "using", false),
    verb("write", "wrote", "writing", false),
    verb("refactor", "refactored", "refactoring", false),
    verb("configure", "configured", "configuring", false),
    verb("administer", "administered", "administering", false),
    verb("spearhead", "spearheaded", "spearheading", false),
    verb("drive", "drove", "driving", false),
    verb("boost", "boosted", "boosting", false),
    verb("save", "saved", "saving", false),
    verb("resolve", "resolved", "resolving", false),
    verb("test", "tested", "testing", false),
    verb("monitor", "monitored", "monitoring", false),
    verb("secure", "secured", "securing", false),
];

const FEW_VERBS_HINTS: &[&str] = &[
    "Start bullets with strong verbs (Built, Designed, Automated).",
    "Quantify impact (%, time saved, errors reduced, latency).",
    "Group tools into a single Skills section (Backend/Frontend/DevOps).",
];

const ENOUGH_VERBS_HINTS: &[&str] = &[
    "Keep bullets one sentence: Action → Tech → Result.",
    "Mirror the job's nouns/verbs in Summary and top bullets.",
    "Move the most relevant project to the top.",
];

/// Base form of a past-tense accomplishment verb ("built" -> "build").
pub fn past_to_base(word: &str) -> Option<&'static str> {
    let word = word.to_lowercase();
    VERBS.iter().find(|v| v.past == word).map(|v| v.base)
}

/// Base form of any known inflection ("building", "builds", "build").
pub fn base_form(word: &str) -> Option<&'static str> {
    let word = word.to_lowercase();
    VERBS
        .iter()
        .find(|v| {
            v.base == word
                || v.past == word
                || v.gerund == word
                || word.strip_suffix('s') == Some(v.base)
        })
        .map(|v| v.base)
}

fn strong_base(word: &str) -> Option<&'static str> {
    let base = base_form(word)?;
    VERBS.iter().find(|v| v.base == base && v.strong).map(|v| v.base)
}

fn sentences(text: &str) -> Vec<&str> {
    match RE_SENTENCE_BREAK.as_ref() {
        Some(re) => re.split(text).filter(|s| !s.trim().is_empty()).collect(),
        None => text.lines().filter(|s| !s.trim().is_empty()).collect(),
    }
}

/// Distinct strong action verbs (base form, sorted) used in resume sentences
/// that also mention a recognized technical term.
pub fn action_verbs(resume_text: &str, technical_terms: &[String]) -> Vec<String> {
    let terms: Vec<String> = technical_terms
        .iter()
        .map(|t| normalize(t).into_string())
        .filter(|t| !t.is_empty())
        .collect();

    let mut found = BTreeSet::new();
    for sentence in sentences(resume_text) {
        let sentence = normalize(sentence);
        if !terms.iter().any(|t| contains_phrase(sentence.as_str(), t)) {
            continue;
        }
        found.extend(sentence.as_str().split_whitespace().filter_map(strong_base));
    }
    found.into_iter().map(String::from).collect()
}

/// Rewrite hints for a resume using `verb_count` strong verbs.
pub fn rewrite_hints(verb_count: usize, min_verb_count: usize) -> Vec<String> {
    let hints = if verb_count < min_verb_count {
        FEW_VERBS_HINTS
    } else {
        ENOUGH_VERBS_HINTS
    };
    hints.iter().map(|h| h.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sentence_break_pattern_compiles() {
        assert!(RE_SENTENCE_BREAK.is_some());
    }

    #[test]
    fn test_past_to_base() {
        assert_eq!(past_to_base("Built"), Some("build"));
        assert_eq!(past_to_base("improved"), Some("improve"));
        assert_eq!(past_to_base("build"), None);
        assert_eq!(past_to_base("Add"), None);
    }

    #[test]
    fn test_base_form_accepts_inflections() {
        assert_eq!(base_form("leading"), Some("lead"));
        assert_eq!(base_form("deploys"), Some("deploy"));
        assert_eq!(base_form("led"), Some("lead"));
        assert_eq!(base_form("table"), None);
    }

    #[test]
    fn test_action_verbs_need_technical_context() {
        let resume = "Built REST APIs in Python. Led the hiring committee. Automated Docker builds.";
        let verbs = action_verbs(resume, &terms(&["python", "docker"]));
        assert_eq!(verbs, vec!["automate", "build"]);
    }

    #[test]
    fn test_action_verbs_split_on_lines() {
        let resume = "Designed dashboards in React\nMentored two juniors\nDeployed services to AWS";
        let verbs = action_verbs(resume, &terms(&["react", "aws"]));
        assert_eq!(verbs, vec!["deploy", "design"]);
    }

    #[test]
    fn test_action_verbs_empty_inputs() {
        assert!(action_verbs("", &terms(&["python"])).is_empty());
        assert!(action_verbs("Built Python tools", &[]).is_empty());
    }

    #[test]
    fn test_rewrite_hints_switch_on_threshold() {
        let few = rewrite_hints(2, 3);
        assert_eq!(few[0], "Start bullets with strong verbs (Built, Designed, Automated).");
        let enough = rewrite_hints(3, 3);
        assert_eq!(enough[2], "Move the most relevant project to the top.");
        assert_eq!(few.len(), 3);
        assert_eq!(enough.len(), 3);
    }
}
