//! Check command implementation.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use style_grader_checks::configured_checks;
use style_grader_core::{
    AnalysisResult, CheckBox, Config, Grader, GraderConfig, SemanticConfig, SemanticService,
    StyleGuide,
};
use style_grader_ollama::{ChunkIndex, OllamaClient};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::OutputFormat;

/// Options of the check command besides its paths.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Output format.
    pub format: OutputFormat,
    /// Forces the semantic pass on.
    pub semantic: bool,
    /// Comma-separated check names or codes.
    pub checks: Option<String>,
    /// Extra exclude patterns.
    pub exclude: Vec<String>,
    /// Concurrent file limit.
    pub jobs: usize,
}

/// Runs the check command.
pub async fn run(
    path: &Path,
    guide_path: &Path,
    options: CheckOptions,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = super::load_config(config_path)?;
    if options.semantic {
        config.semantic.enabled = true;
    }

    let guide_text = std::fs::read_to_string(guide_path)
        .with_context(|| format!("Failed to read style guide: {}", guide_path.display()))?;
    let guide = match StyleGuide::parse_named(guide_path.display().to_string(), &guide_text) {
        Ok(guide) => guide,
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            std::process::exit(2);
        }
    };
    tracing::info!(
        "Loaded style guide {} with {} rule(s)",
        guide.name(),
        guide.len()
    );

    let files = collect_files(path, &config.grader, &options.exclude)?;
    if files.is_empty() {
        tracing::warn!("No source files found under {}", path.display());
    }

    let checks = match options.checks.as_deref() {
        Some(filter) => {
            let names: Vec<&str> = filter.split(',').map(str::trim).collect();
            filter_checks(&config, &names)
        }
        None => configured_checks(&config),
    };

    let client = if config.semantic.enabled {
        Some(OllamaClient::from_config(&config.semantic)?)
    } else {
        None
    };
    let index = if config.semantic.enabled && config.semantic.retrieval {
        Some(build_index(&config.semantic, guide.name(), &guide_text)?)
    } else {
        None
    };

    let mut builder = Grader::builder()
        .guide(guide)
        .checks(checks)
        .config(config)
        .maybe_semantic(client);
    if let Some(index) = index {
        builder = builder.context_source(Arc::new(index));
    }
    let grader = Arc::new(builder.build().context("Failed to build grader")?);

    tracing::info!(
        "Grading {} file(s) with {} active check(s){}",
        files.len(),
        grader.active_check_count(),
        if grader.has_semantic() {
            " and semantic review"
        } else {
            ""
        }
    );

    let results = grade_all(grader, files, options.jobs).await;
    super::output::print(&results, options.format)?;

    if results.iter().any(AnalysisResult::has_critical) {
        std::process::exit(1);
    }

    Ok(())
}

/// Grades every file, at most `jobs` at a time, keeping input order.
async fn grade_all<S: SemanticService + 'static>(
    grader: Arc<Grader<S>>,
    files: Vec<PathBuf>,
    jobs: usize,
) -> Vec<AnalysisResult> {
    let permits = Arc::new(Semaphore::new(jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, path) in files.into_iter().enumerate() {
        let grader = Arc::clone(&grader);
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await;
            let result = match grader.grade_file(&path).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!("{}", e);
                    AnalysisResult::failed(path.display().to_string(), &e).with_path(&path)
                }
            };
            (index, result)
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(graded) => results.push(graded),
            Err(e) => tracing::warn!("Grading task failed: {}", e),
        }
    }
    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, result)| result).collect()
}

/// Indexes the guide and the configured reference documents.
fn build_index(config: &SemanticConfig, guide_name: &str, guide_text: &str) -> Result<ChunkIndex> {
    let mut index = ChunkIndex::from_config(config);
    index.add_document(guide_name, guide_text);
    for document in &config.documents {
        let content = std::fs::read_to_string(document)
            .with_context(|| format!("Failed to read reference document: {}", document.display()))?;
        index.add_document(&document.display().to_string(), &content);
    }
    tracing::debug!("Retrieval index holds {} chunk(s)", index.len());
    Ok(index)
}

/// Selects checks by name or code, keeping configured options.
fn filter_checks(config: &Config, names: &[&str]) -> Vec<CheckBox> {
    let selects = |check: &CheckBox, name: &str| {
        check.name() == name || check.code().eq_ignore_ascii_case(name)
    };
    let available = configured_checks(config);

    for name in names {
        if !available.iter().any(|c| selects(c, name)) {
            tracing::warn!("Unknown check: {}", name);
        }
    }

    available
        .into_iter()
        .filter(|c| names.iter().any(|n| selects(c, n)))
        .collect()
}

/// Collects the files to grade under `root`.
///
/// A file target is graded as-is; a directory is walked honouring
/// `.gitignore` (if configured) and the include/exclude globs, which match
/// paths relative to `root`.
pub fn collect_files(
    root: &Path,
    config: &GraderConfig,
    extra_exclude: &[String],
) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.exists() {
        bail!("Path not found: {}", root.display());
    }

    let include = compile_patterns(config.include.iter())?;
    let exclude = compile_patterns(config.exclude.iter().chain(extra_exclude))?;

    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .git_ignore(config.respect_gitignore)
        .git_exclude(config.respect_gitignore)
        .require_git(false);

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if !include.iter().any(|p| p.matches_path(relative)) {
            continue;
        }
        if exclude.iter().any(|p| p.matches_path(relative)) {
            tracing::debug!("Excluded {}", relative.display());
            continue;
        }
        files.push(entry.into_path());
    }

    files.sort();
    Ok(files)
}

fn compile_patterns<'a>(patterns: impl Iterator<Item = &'a String>) -> Result<Vec<glob::Pattern>> {
    patterns
        .map(|p| glob::Pattern::new(p).with_context(|| format!("Invalid glob pattern: {p}")))
        .collect()
}
