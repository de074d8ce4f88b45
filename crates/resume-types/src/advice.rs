//! Suggestion and advice types.
//!
//! A `Suggestion` is created by the composer (or parsed from an external
//! generator), sanitized by the evidence guard, and finally rendered into
//! the section-keyed string lists of `SmartAdvice`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resume section a suggestion targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Section {
    Summary,
    Experience,
    Projects,
    Skills,
    Training,
}

impl Section {
    /// Sections that always appear in `SmartAdvice::section_suggestions`.
    pub const REPORTED: [Section; 3] = [Section::Summary, Section::Experience, Section::Projects];

    /// Parse a section name leniently (case-insensitive, common synonyms).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "summary" | "profile" | "objective" => Some(Section::Summary),
            "experience" | "work experience" | "employment" => Some(Section::Experience),
            "projects" | "project" => Some(Section::Projects),
            "skills" | "technical skills" => Some(Section::Skills),
            "training" | "education" | "certifications" | "courses" => Some(Section::Training),
            _ => None,
        }
    }

    /// Section a suggestion falls back to when it cannot stay where it is
    /// (e.g. unevidenced experience, or a section not shown to the caller).
    pub fn reported_or_projects(self) -> Self {
        if Self::REPORTED.contains(&self) {
            self
        } else {
            Section::Projects
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Section::Summary => write!(f, "Summary"),
            Section::Experience => write!(f, "Experience"),
            Section::Projects => write!(f, "Projects"),
            Section::Skills => write!(f, "Skills"),
            Section::Training => write!(f, "Training"),
        }
    }
}

/// A structured editing recommendation.
///
/// Each variant carries only the fields valid for its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Suggestion {
    /// Add a new bullet or line to a section.
    AddBullet {
        section: Section,
        suggested_text: String,
        rationale: String,
    },
    /// Replace existing resume text.
    RewriteBullet {
        section: Section,
        original_text: String,
        suggested_text: String,
        rationale: String,
    },
    /// Propose a project that exercises missing themes.
    ProjectIdea {
        suggested_text: String,
        rationale: String,
    },
}

impl Suggestion {
    /// Create an add-bullet suggestion.
    pub fn add_bullet(
        section: Section,
        suggested_text: impl Into<String>,
        rationale: impl Into<String>,
    ) -> Self {
        Suggestion::AddBullet {
            section,
            suggested_text: suggested_text.into(),
            rationale: rationale.into(),
        }
    }

    /// Create a rewrite suggestion.
    pub fn rewrite(
        section: Section,
        original_text: impl Into<String>,
        suggested_text: impl Into<String>,
        rationale: impl Into<String>,
    ) -> Self {
        Suggestion::RewriteBullet {
            section,
            original_text: original_text.into(),
            suggested_text: suggested_text.into(),
            rationale: rationale.into(),
        }
    }

    /// Create a project idea.
    pub fn project(suggested_text: impl Into<String>, rationale: impl Into<String>) -> Self {
        Suggestion::ProjectIdea {
            suggested_text: suggested_text.into(),
            rationale: rationale.into(),
        }
    }

    /// Target section. Project ideas always land in Projects.
    pub fn section(&self) -> Section {
        match self {
            Suggestion::AddBullet { section, .. } | Suggestion::RewriteBullet { section, .. } => {
                *section
            }
            Suggestion::ProjectIdea { .. } => Section::Projects,
        }
    }

    /// The text the user is asked to add.
    pub fn suggested_text(&self) -> &str {
        match self {
            Suggestion::AddBullet { suggested_text, .. }
            | Suggestion::RewriteBullet { suggested_text, .. }
            | Suggestion::ProjectIdea { suggested_text, .. } => suggested_text,
        }
    }

    /// Why the suggestion was made.
    pub fn rationale(&self) -> &str {
        match self {
            Suggestion::AddBullet { rationale, .. }
            | Suggestion::RewriteBullet { rationale, .. }
            | Suggestion::ProjectIdea { rationale, .. } => rationale,
        }
    }

    /// Original resume text, for rewrites only.
    pub fn original_text(&self) -> Option<&str> {
        match self {
            Suggestion::RewriteBullet { original_text, .. } => Some(original_text),
            _ => None,
        }
    }

    /// Replace the suggested text, keeping kind and section.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        match &mut self {
            Suggestion::AddBullet { suggested_text, .. }
            | Suggestion::RewriteBullet { suggested_text, .. }
            | Suggestion::ProjectIdea { suggested_text, .. } => *suggested_text = text,
        }
        self
    }

    /// Append a note to the rationale.
    pub fn with_note(mut self, note: &str) -> Self {
        match &mut self {
            Suggestion::AddBullet { rationale, .. }
            | Suggestion::RewriteBullet { rationale, .. }
            | Suggestion::ProjectIdea { rationale, .. } => {
                if rationale.is_empty() {
                    *rationale = note.to_string();
                } else {
                    rationale.push(' ');
                    rationale.push_str(note);
                }
            }
        }
        self
    }

    /// Move the suggestion to another section.
    ///
    /// Moving to Projects turns bullets into a project idea.
    pub fn redirect(self, target: Section) -> Self {
        match (self, target) {
            (
                Suggestion::AddBullet {
                    suggested_text,
                    rationale,
                    ..
                }
                | Suggestion::RewriteBullet {
                    suggested_text,
                    rationale,
                    ..
                },
                Section::Projects,
            ) => Suggestion::ProjectIdea {
                suggested_text,
                rationale,
            },
            (Suggestion::AddBullet { suggested_text, rationale, .. }, section) => {
                Suggestion::AddBullet {
                    section,
                    suggested_text,
                    rationale,
                }
            }
            (
                Suggestion::RewriteBullet {
                    original_text,
                    suggested_text,
                    rationale,
                    ..
                },
                section,
            ) => Suggestion::RewriteBullet {
                section,
                original_text,
                suggested_text,
                rationale,
            },
            (project @ Suggestion::ProjectIdea { .. }, _) => project,
        }
    }
}

/// Which engines produced the advice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSource {
    /// Embedding model used for scoring
    pub scoring: String,
    /// Model that generated personal suggestions, if any
    pub suggestions: Option<String>,
}

/// Aggregate result of one resume/job analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartAdvice {
    /// Composite fit score, 0-100
    pub fit_estimate: u8,

    /// Resume/job similarity in [0, 1], 4 decimal places
    pub similarity_resume_job: f64,

    /// Canonical skills the resume covers (sorted, capped)
    pub present_skills: Vec<String>,

    /// Canonical skills the resume lacks (sorted, capped)
    pub missing_skills: Vec<String>,

    /// Missing skills most central to the job's own framing
    pub critical_gaps: Vec<String>,

    /// Rendered suggestions keyed by section (Summary, Experience, Projects)
    pub section_suggestions: BTreeMap<Section, Vec<String>>,

    /// Ready-to-adapt bullet templates
    pub ready_bullets: Vec<String>,

    /// General rewriting advice
    pub rewrite_hints: Vec<String>,

    /// Structured, guarded suggestions behind `section_suggestions`
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,

    /// Guarded suggestions from the external generator, if it ran
    #[serde(default)]
    pub personal_suggestions: Vec<Suggestion>,

    /// Engines used
    #[serde(default)]
    pub model_source: ModelSource,
}

impl SmartAdvice {
    /// Render structured suggestions into the section-keyed string map.
    ///
    /// Every reported section is present, even when empty.
    pub fn render_sections(suggestions: &[Suggestion]) -> BTreeMap<Section, Vec<String>> {
        let mut sections: BTreeMap<Section, Vec<String>> = Section::REPORTED
            .iter()
            .map(|s| (*s, Vec::new()))
            .collect();
        for suggestion in suggestions {
            let text = suggestion.suggested_text().trim();
            if text.is_empty() {
                continue;
            }
            sections
                .entry(suggestion.section().reported_or_projects())
                .or_default()
                .push(text.to_string());
        }
        sections
    }

    /// Total number of rendered suggestion lines.
    pub fn suggestion_count(&self) -> usize {
        self.section_suggestions.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_parse() {
        assert_eq!(Section::parse("experience"), Some(Section::Experience));
        assert_eq!(Section::parse(" Work Experience "), Some(Section::Experience));
        assert_eq!(Section::parse("Certifications"), Some(Section::Training));
        assert_eq!(Section::parse("hobbies"), None);
    }

    #[test]
    fn test_suggestion_serialization_uses_kind_tag() {
        let s = Suggestion::add_bullet(Section::Experience, "Add a bullet", "Because");
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["kind"], "add_bullet");
        assert_eq!(json["section"], "Experience");
        assert_eq!(json["suggestedText"], "Add a bullet");
    }

    #[test]
    fn test_rewrite_parses_from_json() {
        let raw = r#"{"kind":"rewrite_bullet","section":"Experience","originalText":"Did stuff","suggestedText":"Built things","rationale":"Stronger verb"}"#;
        let s: Suggestion = serde_json::from_str(raw).unwrap();
        assert_eq!(s.original_text(), Some("Did stuff"));
        assert_eq!(s.suggested_text(), "Built things");
    }

    #[test]
    fn test_project_idea_section() {
        let s = Suggestion::project("Build a demo", "Shows the theme");
        assert_eq!(s.section(), Section::Projects);
        assert!(s.original_text().is_none());
    }

    #[test]
    fn test_redirect_to_projects_becomes_project_idea() {
        let s = Suggestion::add_bullet(Section::Experience, "text", "why").redirect(Section::Projects);
        assert!(matches!(s, Suggestion::ProjectIdea { .. }));
        assert_eq!(s.suggested_text(), "text");
    }

    #[test]
    fn test_with_note_appends() {
        let s = Suggestion::add_bullet(Section::Summary, "text", "why").with_note("(note)");
        assert_eq!(s.rationale(), "why (note)");
    }

    #[test]
    fn test_render_sections_has_all_reported_keys() {
        let rendered = SmartAdvice::render_sections(&[
            Suggestion::add_bullet(Section::Experience, "a", ""),
            Suggestion::add_bullet(Section::Training, "b", ""),
            Suggestion::add_bullet(Section::Summary, "  ", ""),
        ]);
        assert_eq!(rendered.len(), 3);
        assert_eq!(rendered[&Section::Experience], vec!["a"]);
        assert_eq!(rendered[&Section::Projects], vec!["b"]);
        assert!(rendered[&Section::Summary].is_empty());
    }
}
