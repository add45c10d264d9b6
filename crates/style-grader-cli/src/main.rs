//! style-grader CLI tool.
//!
//! Usage:
//! ```bash
//! style-grader check --guide guide.md [OPTIONS] [PATH]
//! style-grader guide guide.md
//! style-grader list-checks
//! style-grader init
//! style-grader doctor
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Grades C++ sources against a severity-ranked style guide
#[derive(Parser)]
#[command(name = "style-grader")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade source files
    Check {
        /// File or directory to grade (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Style guide file
        #[arg(short, long, env = "STYLE_GRADER_GUIDE")]
        guide: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Also run the semantic pass, even if disabled in config
        #[arg(long)]
        semantic: bool,

        /// Only run specific checks (comma-separated names or codes)
        #[arg(long)]
        checks: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Number of files graded concurrently
        #[arg(short, long, default_value_t = 4)]
        jobs: usize,
    },

    /// Parse a style guide and list its rules
    Guide {
        /// Style guide file
        file: PathBuf,
    },

    /// List available checks
    ListChecks,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Check that the semantic backend is reachable and has its model
    Doctor,
}

/// Output format for grading results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// Annotated source excerpts.
    Pretty,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            path,
            guide,
            format,
            semantic,
            checks,
            exclude,
            jobs,
        } => {
            let config_path = config_resolver::locate(&path, cli.config.as_deref());
            let options = commands::check::CheckOptions {
                format,
                semantic,
                checks,
                exclude,
                jobs,
            };
            commands::check::run(&path, &guide, options, config_path.as_deref()).await
        }
        Commands::Guide { file } => commands::guide::run(&file),
        Commands::ListChecks => {
            commands::list_checks::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(std::path::Path::new("."), force),
        Commands::Doctor => {
            let config_path =
                config_resolver::locate(std::path::Path::new("."), cli.config.as_deref());
            commands::doctor::run(config_path.as_deref()).await
        }
    }
}
