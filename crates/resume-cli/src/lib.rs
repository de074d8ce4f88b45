//! Resume advisor CLI library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (analyze, score, model, config)

pub mod cli;
pub mod commands;

pub use cli::{BackendArg, Cli, Commands, ConfigCommands, ModelCommands};
pub use commands::{
    analyze_to_string, build_embedder, config_show, config_to_string, init_logging, load_settings,
    model_fetch, model_status, render_report, run_analyze, run_score, score_files, AnalyzeOptions,
    ScoreReport,
};
