//! Suggestion composer.
//!
//! Turns the job terms the resume does not cover into section-targeted
//! suggestions and ready bullet templates. Everything produced here passes
//! through the evidence guard before it is returned.

use std::collections::BTreeMap;

use resume_embeddings::SharedEmbedder;
use resume_match::{ClusterPolicy, CoverageClassifier, GapClusterer, ResumeProfile, Term, ThemeCluster};
use resume_types::{AdvisorConfig, Section, Suggestion};
use tracing::debug;

use crate::guard::EvidenceGuard;
use crate::text::join_natural;

/// Below this resume/title similarity the summary is flagged as off-target.
const LOW_TITLE_SIMILARITY: f32 = 0.35;

const EXAMPLES_PER_THEME: usize = 2;
const PROJECT_THEMES: usize = 3;
const SUMMARY_ITEMS: usize = 3;

const STRUCTURAL_BULLET: &str = "Action verb + Technology + Metric + Outcome, one sentence.";
const FALLBACK_BULLET: &str = "Add one bullet that proves measurable impact.";

/// A conditional hint emitted when the resume lacks every skill in a group.
struct SkillHint {
    any_of: &'static [&'static str],
    text: &'static str,
    rationale: &'static str,
}

const SKILL_HINTS: &[SkillHint] = &[
    SkillHint {
        any_of: &["ci/cd", "github actions", "azure devops"],
        text: "If you have set up CI/CD, add a bullet: pipelines on PR, tests, auto-deploy (tool + impact).",
        rationale: "The job asks for delivery automation.",
    },
    SkillHint {
        any_of: &["unit testing", "integration testing"],
        text: "If you have written automated tests, add testing results (framework + coverage or defect reduction).",
        rationale: "The job asks for automated testing.",
    },
    SkillHint {
        any_of: &["security", "oauth2", "jwt"],
        text: "If you have handled authentication, add security details (OAuth/JWT tokens, input validation, secrets).",
        rationale: "The job asks for security practice.",
    },
];

/// What the composer works from. Everything is already normalized,
/// embedded or ranked by the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct ComposeInput<'a> {
    /// Raw resume text, for the evidence guard
    pub resume_text: &'a str,
    pub resume: &'a ResumeProfile,
    /// Job terms, most significant first
    pub terms: &'a [Term],
    /// Present skills, strongest first
    pub present_skills: &'a [String],
    pub missing_skills: &'a [String],
    pub critical_gaps: &'a [String],
    pub job_title: Option<&'a str>,
    pub title_similarity: f32,
}

/// Guarded composer output.
#[derive(Debug, Clone, Default)]
pub struct Composition {
    pub suggestions: Vec<Suggestion>,
    pub section_suggestions: BTreeMap<Section, Vec<String>>,
    pub ready_bullets: Vec<String>,
    pub themes: Vec<ThemeCluster>,
}

/// Composes suggestions from uncovered job terms.
pub struct SuggestionComposer<'a> {
    embedder: &'a SharedEmbedder,
    config: &'a AdvisorConfig,
    guard: &'a EvidenceGuard,
}

impl<'a> SuggestionComposer<'a> {
    pub fn new(embedder: &'a SharedEmbedder, config: &'a AdvisorConfig, guard: &'a EvidenceGuard) -> Self {
        Self {
            embedder,
            config,
            guard,
        }
    }

    /// Job terms the resume covers neither lexically nor semantically, in
    /// significance order.
    pub fn uncovered_terms(&self, terms: &[Term], resume: &ResumeProfile) -> Vec<String> {
        let texts: Vec<String> = terms.iter().map(|t| t.text.clone()).collect();
        CoverageClassifier::new(self.embedder, self.config.similarity_threshold)
            .classify_all(&texts, resume)
            .into_iter()
            .zip(texts)
            .filter(|(coverage, _)| !coverage.is_present())
            .map(|(_, text)| text)
            .collect()
    }

    /// Compose and guard.
    pub fn compose(&self, input: ComposeInput<'_>) -> Composition {
        let uncovered = self.uncovered_terms(input.terms, input.resume);
        let themes = GapClusterer::new(self.embedder, ClusterPolicy::from(self.config)).cluster(&uncovered);

        let mut suggestions = Vec::new();
        suggestions.extend(summary_suggestion(&input, &themes));
        suggestions.extend(
            themes
                .iter()
                .take(self.config.experience_suggestion_cap)
                .map(experience_suggestion),
        );
        suggestions.extend(skill_hints(input.missing_skills));
        suggestions.extend(project_suggestion(&themes));

        let ready = ready_bullets(&themes, !input.terms.is_empty(), self.config.max_ready_bullets);

        let claims: Vec<String> = uncovered
            .iter()
            .chain(input.missing_skills.iter())
            .cloned()
            .collect();
        let suggestions = self.guard.sanitize(suggestions, input.resume_text, &claims);
        let mut ready_bullets = self.guard.sanitize_lines(ready, input.resume_text, &claims);
        ready_bullets.retain(|b| !b.trim().is_empty());
        if ready_bullets.is_empty() {
            ready_bullets.push(FALLBACK_BULLET.to_string());
        }

        debug!(
            uncovered = uncovered.len(),
            themes = themes.len(),
            suggestions = suggestions.len(),
            "Composed suggestions"
        );
        Composition {
            section_suggestions: resume_types::SmartAdvice::render_sections(&suggestions),
            suggestions,
            ready_bullets,
            themes,
        }
    }
}

fn experience_suggestion(theme: &ThemeCluster) -> Suggestion {
    let examples = theme.examples(EXAMPLES_PER_THEME);
    let subject = if examples.is_empty() {
        theme.representative.clone()
    } else {
        format!("{} ({})", theme.representative, examples.join(", "))
    };
    Suggestion::add_bullet(
        Section::Experience,
        format!("Add a bullet showing where you used {subject} and the measurable outcome."),
        format!("The job emphasizes {}; the resume does not show it yet.", theme.representative),
    )
}

fn project_suggestion(themes: &[ThemeCluster]) -> Option<Suggestion> {
    if themes.is_empty() {
        return None;
    }
    let reps: Vec<String> = themes.iter().map(|t| t.representative.clone()).collect();
    Some(Suggestion::project(
        format!(
            "Build a small project that combines {}; link the repository and describe what it does.",
            join_natural(&reps, PROJECT_THEMES)
        ),
        "A project shows the missing themes without claiming work experience.",
    ))
}

fn summary_suggestion(input: &ComposeInput<'_>, themes: &[ThemeCluster]) -> Option<Suggestion> {
    let lead = join_natural(input.present_skills, SUMMARY_ITEMS);
    let growth_items: Vec<String> = if themes.is_empty() {
        input.critical_gaps.to_vec()
    } else {
        themes.iter().map(|t| t.representative.clone()).collect()
    };
    let growth = join_natural(&growth_items, SUMMARY_ITEMS);
    let title = input.job_title.map(str::trim).filter(|t| !t.is_empty());
    let aligned = title.map(|t| format!(" aligned to “{t}”")).unwrap_or_default();

    let text = match (lead.is_empty(), growth.is_empty()) {
        (false, false) => format!(
            "Add a two-to-three line summary{aligned} that leads with {lead} and names the areas you are growing into: {growth}."
        ),
        (false, true) => format!("Add a two-to-three line summary{aligned} that leads with {lead}."),
        (true, false) => format!(
            "Add a two-to-three line summary{aligned} that names the areas you are growing into: {growth}."
        ),
        (true, true) if title.is_some() => format!("Add a two-to-three line summary{aligned}."),
        (true, true) => return None,
    };

    let rationale = if title.is_some() && input.title_similarity < LOW_TITLE_SIMILARITY {
        "The resume reads far from the target title; a tailored summary closes that gap."
    } else {
        "Recruiters read the summary first."
    };
    Some(Suggestion::add_bullet(Section::Summary, text, rationale))
}

fn skill_hints(missing_skills: &[String]) -> Vec<Suggestion> {
    SKILL_HINTS
        .iter()
        .filter(|hint| hint.any_of.iter().any(|s| missing_skills.iter().any(|m| m == s)))
        .map(|hint| Suggestion::add_bullet(Section::Experience, hint.text, hint.rationale))
        .collect()
}

fn ready_bullets(themes: &[ThemeCluster], has_terms: bool, max: usize) -> Vec<String> {
    let mut bullets = Vec::new();
    if let Some(top) = themes.first() {
        bullets.push(format!(
            "[Action verb] a {} change that [what it did], measured by [a result you can verify].",
            top.representative
        ));
    }
    if has_terms {
        bullets.push(STRUCTURAL_BULLET.to_string());
    }
    bullets.truncate(max);
    bullets
}
