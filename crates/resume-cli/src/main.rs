//! Resume Advisor
//!
//! Scores a resume against a job description and suggests evidence-grounded
//! edits.
//!
//! # Usage
//!
//! ```bash
//! resume-advisor analyze resume.txt job.txt [--title TITLE] [--json] [--llm]
//! resume-advisor score resume.txt job.txt [--json]
//! resume-advisor model fetch|status
//! resume-advisor config show
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/resume-advisor/config.toml)
//! 3. Environment variables (ADVISOR_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use resume_cli::{
    config_show, init_logging, load_settings, model_fetch, model_status, run_analyze, run_score,
    AnalyzeOptions, Cli, Commands, ConfigCommands, ModelCommands,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref(), cli.log_level.as_deref())?;
    init_logging(&settings)?;

    match cli.command {
        Commands::Analyze {
            resume,
            job,
            title,
            json,
            llm,
            backend,
            timeout_secs,
        } => {
            let opts = AnalyzeOptions {
                title,
                json,
                llm,
                backend,
                timeout_secs,
            };
            run_analyze(settings, &resume, &job, opts).await?;
        }
        Commands::Score { resume, job, json } => {
            run_score(&resume, &job, json)?;
        }
        Commands::Model { command } => match command {
            ModelCommands::Fetch => model_fetch(&settings)?,
            ModelCommands::Status => model_status(&settings)?,
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show => config_show(&settings)?,
        },
    }

    Ok(())
}
