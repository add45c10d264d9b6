//! Subcommand implementations.

pub mod check;
pub mod doctor;
pub mod guide;
pub mod init;
pub mod list_checks;
pub mod output;

use anyhow::{Context, Result};
use std::path::Path;
use style_grader_core::Config;

/// Loads the located configuration, or defaults, and applies environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(p) => Config::from_file(p)
            .with_context(|| format!("Failed to load config: {}", p.display()))?,
        None => Config::default(),
    };
    Ok(config.with_env_overrides())
}
