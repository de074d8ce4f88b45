//! CLI argument parsing for the resume advisor.
//!
//! CLI flags override all other config sources.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Resume Advisor
///
/// Scores a resume against a job description and suggests evidence-grounded
/// edits.
#[derive(Parser, Debug)]
#[command(name = "resume-advisor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/resume-advisor/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Embedding backend override.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendArg {
    /// all-MiniLM-L6-v2 through Candle
    Candle,
    /// Deterministic feature hashing, no download
    Hashing,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a resume against a job description
    Analyze {
        /// Plain-text resume file
        resume: PathBuf,

        /// Plain-text job description file
        job: PathBuf,

        /// Target job title
        #[arg(short, long)]
        title: Option<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Ask the configured model for personal suggestions
        #[arg(long)]
        llm: bool,

        /// Override the embedding backend
        #[arg(short, long, value_enum)]
        backend: Option<BackendArg>,

        /// Give up after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Keyword overlap scores only (no embeddings)
    Score {
        /// Plain-text resume file
        resume: PathBuf,

        /// Plain-text job description file
        job: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Embedding model management
    Model {
        #[command(subcommand)]
        command: ModelCommands,
    },

    /// Configuration inspection
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Model subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ModelCommands {
    /// Download the embedding model into the cache
    Fetch,

    /// Show whether the model files are cached
    Status,
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Print the effective configuration (API key masked)
    Show,
}
