//! Command implementations for the resume advisor CLI.
//!
//! Handles:
//! - analyze: full pipeline, optionally with personal suggestions
//! - score: keyword overlap scores
//! - model fetch/status: embedding model cache
//! - config show: effective settings

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use resume_advisor::{generator_from_settings, Advisor};
use resume_embeddings::{get_or_download_model, Deadline, ModelCache, SharedEmbedder};
use resume_match::{ats_score, score_dynamic, AtsScore, DynamicScore};
use resume_types::{EmbeddingBackend, Section, Settings, SmartAdvice};

use crate::cli::BackendArg;

/// Options for `analyze`.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub title: Option<String>,
    pub json: bool,
    pub llm: bool,
    pub backend: Option<BackendArg>,
    pub timeout_secs: Option<u64>,
}

/// Load settings and apply CLI overrides (highest precedence).
pub fn load_settings(config_path: Option<&str>, log_level_override: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(level) = log_level_override {
        settings.log_level = level.to_string();
    }
    Ok(settings)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Logs go to stderr so JSON
/// output on stdout stays clean.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")?;
    Ok(())
}

fn model_cache(settings: &Settings) -> ModelCache {
    ModelCache::new(settings.model_cache_path(), settings.model_repo.clone())
}

/// Embedder for the configured backend. The Candle model loads lazily on
/// first use.
pub fn build_embedder(settings: &Settings) -> Arc<SharedEmbedder> {
    let embedder = match settings.embedding_backend {
        EmbeddingBackend::Candle => SharedEmbedder::candle(model_cache(settings)),
        EmbeddingBackend::Hashing => SharedEmbedder::hashing(),
    };
    Arc::new(embedder)
}

fn read_input(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {} file {:?}", what, path))
}

/// Run the full analysis and print the result.
pub async fn run_analyze(mut settings: Settings, resume: &Path, job: &Path, opts: AnalyzeOptions) -> Result<()> {
    let output = analyze_to_string(&mut settings, resume, job, &opts).await?;
    println!("{}", output);
    Ok(())
}

/// Run the analysis and render it as JSON or as a text report.
pub async fn analyze_to_string(
    settings: &mut Settings,
    resume: &Path,
    job: &Path,
    opts: &AnalyzeOptions,
) -> Result<String> {
    let resume_text = read_input(resume, "resume")?;
    let job_text = read_input(job, "job description")?;

    if let Some(backend) = opts.backend {
        settings.embedding_backend = match backend {
            BackendArg::Candle => EmbeddingBackend::Candle,
            BackendArg::Hashing => EmbeddingBackend::Hashing,
        };
    }
    if opts.llm {
        settings.advisor.llm.enabled = true;
    }

    info!(backend = ?settings.embedding_backend, llm = settings.advisor.llm.enabled, "Starting analysis");

    let advisor = Arc::new(Advisor::new(build_embedder(settings), settings.advisor.clone()));
    let deadline = opts
        .timeout_secs
        .map_or_else(Deadline::none, |secs| Deadline::after(Duration::from_secs(secs)));

    let advice = {
        let advisor = Arc::clone(&advisor);
        let (resume_text, job_text, title) = (resume_text.clone(), job_text.clone(), opts.title.clone());
        tokio::task::spawn_blocking(move || {
            advisor.analyze_with_deadline(&resume_text, &job_text, title.as_deref(), &deadline)
        })
        .await
        .context("Analysis task panicked")?
        .context("Analysis failed")?
    };

    let advice = match generator_from_settings(&settings.advisor.llm) {
        Ok(Some(generator)) => {
            advisor
                .personalize(advice, &resume_text, &job_text, opts.title.as_deref(), &generator)
                .await
        }
        Ok(None) => advice,
        Err(e) => {
            warn!(error = %e, "Personal suggestions unavailable");
            advice
        }
    };

    if opts.json {
        serde_json::to_string_pretty(&advice).context("Failed to serialize result")
    } else {
        Ok(render_report(&advice))
    }
}

/// Human-readable report.
pub fn render_report(advice: &SmartAdvice) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Fit estimate: {}/100", advice.fit_estimate);
    let _ = writeln!(out, "Resume/job similarity: {:.4}", advice.similarity_resume_job);
    let _ = writeln!(out, "Scoring model: {}", advice.model_source.scoring);

    write_list(&mut out, "Present skills", &advice.present_skills);
    write_list(&mut out, "Missing skills", &advice.missing_skills);
    write_list(&mut out, "Critical gaps", &advice.critical_gaps);

    for section in Section::REPORTED {
        let lines = advice
            .section_suggestions
            .get(&section)
            .map(Vec::as_slice)
            .unwrap_or_default();
        write_list(&mut out, &format!("{} suggestions", section), lines);
    }

    write_list(&mut out, "Ready bullets", &advice.ready_bullets);
    write_list(&mut out, "Rewrite hints", &advice.rewrite_hints);

    if let Some(model) = &advice.model_source.suggestions {
        let personal: Vec<String> = advice
            .personal_suggestions
            .iter()
            .map(|s| format!("[{}] {}", s.section(), s.suggested_text()))
            .collect();
        write_list(&mut out, &format!("Personal suggestions ({})", model), &personal);
    }

    out.trim_end().to_string()
}

fn write_list(out: &mut String, heading: &str, items: &[String]) {
    let _ = writeln!(out, "\n{}:", heading);
    if items.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for item in items {
        let _ = writeln!(out, "  - {}", item);
    }
}

/// Both keyword scores for one resume/job pair.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub ats: AtsScore,
    pub dynamic: DynamicScore,
}

/// Compute keyword scores from files.
pub fn score_files(resume: &Path, job: &Path) -> Result<ScoreReport> {
    let resume_text = read_input(resume, "resume")?;
    let job_text = read_input(job, "job description")?;
    Ok(ScoreReport {
        ats: ats_score(&resume_text, &job_text),
        dynamic: score_dynamic(&resume_text, &job_text),
    })
}

/// Print keyword scores.
pub fn run_score(resume: &Path, job: &Path, json: bool) -> Result<()> {
    let report = score_files(resume, job)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report).context("Failed to serialize scores")?);
        return Ok(());
    }

    println!("ATS score: {}/100", report.ats.score);
    println!("Keyword score: {}/100", report.dynamic.score);
    println!(
        "Matched {} of {} job keywords",
        report.dynamic.matched.len(),
        report.dynamic.total
    );
    if !report.dynamic.missing.is_empty() {
        println!("Missing: {}", report.dynamic.missing.join(", "));
    }
    Ok(())
}

/// Download the embedding model into the cache.
pub fn model_fetch(settings: &Settings) -> Result<()> {
    let cache = model_cache(settings);
    let paths = get_or_download_model(&cache).context("Failed to download embedding model")?;
    println!("Model {} ready in {:?}", cache.repo_id, cache.model_dir());
    info!(weights = ?paths.weights, "Model files cached");
    Ok(())
}

/// Report whether the embedding model is cached.
pub fn model_status(settings: &Settings) -> Result<()> {
    let cache = model_cache(settings);
    println!("Model: {}", cache.repo_id);
    println!("Cache: {:?}", cache.model_dir());
    let missing = cache.missing_files();
    if missing.is_empty() {
        println!("Status: CACHED");
    } else {
        println!("Status: MISSING ({})", missing.join(", "));
        println!("Run `resume-advisor model fetch` to download.");
    }
    Ok(())
}

/// Effective settings as TOML with the API key masked.
pub fn config_to_string(settings: &Settings) -> Result<String> {
    let mut shown = settings.clone();
    if shown.advisor.llm.api_key.is_some() {
        shown.advisor.llm.api_key = Some("********".to_string());
    }
    toml::to_string_pretty(&shown).context("Failed to render configuration")
}

/// Print effective settings.
pub fn config_show(settings: &Settings) -> Result<()> {
    println!("{}", config_to_string(settings)?);
    Ok(())
}
