//! Grader orchestrating the rule-based and semantic passes.

use crate::check::{Check, CheckBox};
use crate::config::Config;
use crate::guide::StyleGuide;
use crate::reconcile::reconcile;
use crate::report::AnalysisResult;
use crate::semantic::{self, ContextSource, NoSemantic, SemanticRequest, SemanticService};
use crate::source::SourceFile;
use crate::types::Violation;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while building or running a grader.
#[derive(Debug, Error)]
pub enum GraderError {
    /// No style guide was supplied to the builder.
    #[error("a style guide is required to build a grader")]
    MissingGuide,

    /// The style guide text could not be parsed.
    #[error(transparent)]
    Guide(#[from] crate::guide::StyleGuideError),

    /// IO error reading a source file.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// Builder for configuring a [`Grader`].
pub struct GraderBuilder<S = NoSemantic> {
    guide: Option<Arc<StyleGuide>>,
    checks: Vec<CheckBox>,
    config: Option<Config>,
    semantic: Option<S>,
    semantic_timeout: Option<Duration>,
    context_source: Option<Arc<dyn ContextSource>>,
}

impl Default for GraderBuilder<NoSemantic> {
    fn default() -> Self {
        Self {
            guide: None,
            checks: Vec::new(),
            config: None,
            semantic: None,
            semantic_timeout: None,
            context_source: None,
        }
    }
}

impl GraderBuilder<NoSemantic> {
    /// Creates a new builder with no checks and no semantic backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: SemanticService> GraderBuilder<S> {
    /// Sets the style guide.
    #[must_use]
    pub fn guide(mut self, guide: impl Into<Arc<StyleGuide>>) -> Self {
        self.guide = Some(guide.into());
        self
    }

    /// Adds a check.
    #[must_use]
    pub fn check<C: Check + 'static>(mut self, check: C) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Adds a boxed check.
    #[must_use]
    pub fn check_box(mut self, check: CheckBox) -> Self {
        self.checks.push(check);
        self
    }

    /// Adds multiple boxed checks.
    #[must_use]
    pub fn checks(mut self, checks: impl IntoIterator<Item = CheckBox>) -> Self {
        self.checks.extend(checks);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the semantic backend.
    #[must_use]
    pub fn semantic<T: SemanticService>(self, service: T) -> GraderBuilder<T> {
        self.maybe_semantic(Some(service))
    }

    /// Sets the semantic backend when one is given.
    ///
    /// `None` disables the semantic pass; results are then not degraded.
    #[must_use]
    pub fn maybe_semantic<T: SemanticService>(self, service: Option<T>) -> GraderBuilder<T> {
        GraderBuilder {
            guide: self.guide,
            checks: self.checks,
            config: self.config,
            semantic: service,
            semantic_timeout: self.semantic_timeout,
            context_source: self.context_source,
        }
    }

    /// Overrides the semantic timeout from configuration.
    #[must_use]
    pub fn semantic_timeout(mut self, timeout: Duration) -> Self {
        self.semantic_timeout = Some(timeout);
        self
    }

    /// Sets the retrieval context source attached to semantic requests.
    #[must_use]
    pub fn context_source(mut self, source: Arc<dyn ContextSource>) -> Self {
        self.context_source = Some(source);
        self
    }

    /// Builds the grader.
    ///
    /// # Errors
    ///
    /// Returns an error if no style guide was supplied.
    pub fn build(self) -> Result<Grader<S>, GraderError> {
        let guide = self.guide.ok_or(GraderError::MissingGuide)?;
        let config = self.config.unwrap_or_default();
        let semantic_timeout = self
            .semantic_timeout
            .unwrap_or_else(|| config.semantic.timeout());

        Ok(Grader {
            guide,
            checks: self.checks,
            config,
            semantic: self.semantic,
            semantic_timeout,
            context_source: self.context_source,
        })
    }
}

/// Grades source files against one style guide.
///
/// Use [`Grader::builder()`] to construct an instance. A grader holds no
/// per-file state and may be shared across tasks behind an [`Arc`].
pub struct Grader<S = NoSemantic> {
    guide: Arc<StyleGuide>,
    checks: Vec<CheckBox>,
    config: Config,
    semantic: Option<S>,
    semantic_timeout: Duration,
    context_source: Option<Arc<dyn ContextSource>>,
}

impl Grader<NoSemantic> {
    /// Creates a new builder for configuring a grader.
    #[must_use]
    pub fn builder() -> GraderBuilder<NoSemantic> {
        GraderBuilder::new()
    }
}

impl<S: SemanticService> Grader<S> {
    /// Returns the style guide.
    #[must_use]
    pub fn guide(&self) -> &StyleGuide {
        &self.guide
    }

    /// Returns the number of registered checks.
    #[must_use]
    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Returns the number of registered checks the guide activates.
    #[must_use]
    pub fn active_check_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| self.config.is_check_enabled(c.name()))
            .filter(|c| c.activation(&self.guide).is_some())
            .count()
    }

    /// Returns true when a semantic backend is configured.
    #[must_use]
    pub fn has_semantic(&self) -> bool {
        self.semantic.is_some()
    }

    /// Grades one source text with both passes.
    ///
    /// Never fails: a semantic failure yields the rule-based findings with
    /// the result marked as degraded.
    pub async fn grade(&self, name: &str, content: &str) -> AnalysisResult {
        info!("Grading {}", name);
        let source = SourceFile::new(name, content);
        let rule_based = self.check_rules(&source);

        let mut degraded = false;
        let mut semantic_violations = Vec::new();
        if let Some(service) = &self.semantic {
            let context = self
                .context_source
                .as_ref()
                .and_then(|c| c.context_for(content));
            let request = SemanticRequest::new(content, self.guide.relevant_text())
                .with_context(context)
                .with_generation(
                    self.config.semantic.temperature,
                    self.config.semantic.max_tokens,
                );
            let outcome = semantic::collect(service, &request, self.semantic_timeout).await;
            degraded = outcome.degraded;
            semantic_violations = self.ground_semantic(&source, outcome.violations);
        }

        self.finish(name, rule_based, semantic_violations, degraded)
    }

    /// Reads and grades one file from disk.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn grade_file(&self, path: &Path) -> Result<AnalysisResult, GraderError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| GraderError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let content = String::from_utf8_lossy(&bytes);
        let name = path.display().to_string();
        Ok(self.grade(&name, &content).await.with_path(path))
    }

    /// Grades one source text with the rule-based pass only.
    #[must_use]
    pub fn grade_rules_only(&self, name: &str, content: &str) -> AnalysisResult {
        info!("Grading {} (rule-based only)", name);
        let source = SourceFile::new(name, content);
        let rule_based = self.check_rules(&source);
        self.finish(name, rule_based, Vec::new(), false)
    }

    /// Runs every enabled and activated check against one file.
    ///
    /// A panicking check is logged and contributes nothing; the other
    /// checks still run.
    #[must_use]
    pub fn check_rules(&self, source: &SourceFile<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for check in &self.checks {
            if !self.config.is_check_enabled(check.name()) {
                debug!("Skipping disabled check: {}", check.name());
                continue;
            }
            let Some(rule) = check.activation(&self.guide) else {
                debug!("Check {} not activated by the guide", check.name());
                continue;
            };

            let found = match catch_unwind(AssertUnwindSafe(|| check.check(source, &self.guide))) {
                Ok(found) => found,
                Err(_) => {
                    warn!("Check {} panicked on {}; skipping it", check.name(), source.name);
                    continue;
                }
            };

            let reference = rule.reference();
            let found = found.into_iter().map(|mut v| {
                if v.guide_ref.is_none() {
                    v.guide_ref = Some(reference.clone());
                }
                with_snippet(source, v)
            });
            violations.extend(self.apply_severity_override(check.name(), found.collect()));
        }

        violations
    }

    /// Drops semantic findings outside the file and attaches snippets.
    fn ground_semantic(&self, source: &SourceFile<'_>, violations: Vec<Violation>) -> Vec<Violation> {
        let total = violations.len();
        let grounded: Vec<Violation> = violations
            .into_iter()
            .filter(|v| v.line <= source.len())
            .map(|v| with_snippet(source, v))
            .collect();
        if grounded.len() < total {
            debug!(
                "Dropped {} semantic violation(s) past the end of {}",
                total - grounded.len(),
                source.name
            );
        }
        grounded
    }

    fn finish(
        &self,
        name: &str,
        rule_based: Vec<Violation>,
        semantic: Vec<Violation>,
        degraded: bool,
    ) -> AnalysisResult {
        let result =
            AnalysisResult::from_violations(name, reconcile(rule_based, semantic)).with_degraded(degraded);
        info!(
            "Grading complete: {} violation(s) in {}{}",
            result.total_violations,
            name,
            if degraded { " (semantic pass degraded)" } else { "" }
        );
        result
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(
        &self,
        check_name: &str,
        mut violations: Vec<Violation>,
    ) -> Vec<Violation> {
        if let Some(severity) = self.config.check_severity(check_name) {
            for v in &mut violations {
                v.severity = severity;
            }
        }
        violations
    }
}

fn with_snippet(source: &SourceFile<'_>, violation: Violation) -> Violation {
    if violation.snippet.is_some() {
        return violation;
    }
    match source.line(violation.line).map(str::trim) {
        Some(text) if !text.is_empty() => violation.with_snippet(text),
        _ => violation,
    }
}
