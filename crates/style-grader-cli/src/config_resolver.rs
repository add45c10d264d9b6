//! Locates the configuration file for a run.
//!
//! An explicit `--config` path is taken as-is. Otherwise the nearest
//! `style-grader.toml` (or `.style-grader.toml`) walking up from the graded
//! path is used, then `config.toml` in the user config directory. `None`
//! means built-in defaults.

use std::path::{Path, PathBuf};

/// Config file names tried in each directory, first match wins.
const CONFIG_NAMES: &[&str] = &["style-grader.toml", ".style-grader.toml"];

/// Finds the config file for grading `target`.
#[must_use]
pub fn locate(target: &Path, explicit: Option<&Path>) -> Option<PathBuf> {
    let user_dir = std::env::var_os("STYLE_GRADER_CONFIG_DIR")
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|h| h.join(".style-grader")));
    locate_in(target, explicit, user_dir.as_deref())
}

fn locate_in(target: &Path, explicit: Option<&Path>, user_dir: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let start = if target.is_file() {
        target.parent().unwrap_or(Path::new(""))
    } else {
        target
    };
    let nearest = start
        .ancestors()
        .flat_map(|dir| CONFIG_NAMES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file());
    if let Some(found) = nearest {
        tracing::debug!("Found project config: {}", found.display());
        return Some(found);
    }

    let fallback = user_dir?.join("config.toml");
    if fallback.is_file() {
        tracing::info!("Using user config: {}", fallback.display());
        Some(fallback)
    } else {
        None
    }
}
