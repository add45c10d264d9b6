//! Analysis results and summary statistics.

use crate::reconcile::max_severity;
use crate::types::{Severity, Violation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since UNIX epoch.
pub type EpochMs = i64;

/// Current time in milliseconds since UNIX epoch.
#[must_use]
pub fn now_ms() -> EpochMs {
    let dur = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    i64::try_from(dur.as_millis()).unwrap_or(i64::MAX)
}

/// Outcome status of one analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    /// The analysis ran; violations are meaningful.
    #[default]
    Success,
    /// The analysis could not run (e.g. unusable style guide).
    Error,
}

impl AnalysisStatus {
    /// Returns the serialized token.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Final report for one source file.
///
/// Invariants: `total_violations == violations.len()`, the severity counts
/// sum to `total_violations`, and violations are sorted by line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Source name.
    pub file_name: String,
    /// Source path, when graded from disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    /// Creation time in milliseconds since UNIX epoch.
    pub timestamp: EpochMs,
    /// Deduplicated violations sorted by line.
    pub violations: Vec<Violation>,
    /// Number of violations.
    pub total_violations: usize,
    /// Counts per severity tier (every tier present).
    pub violations_by_severity: BTreeMap<Severity, usize>,
    /// Counts per violation type.
    pub violations_by_type: BTreeMap<String, usize>,
    /// Outcome status.
    pub status: AnalysisStatus,
    /// Error message when `status` is `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// True when the semantic pass was requested but failed.
    #[serde(default)]
    pub degraded: bool,
}

impl AnalysisResult {
    /// Aggregates reconciled violations into a successful result.
    #[must_use]
    pub fn from_violations(file_name: impl Into<String>, violations: Vec<Violation>) -> Self {
        let mut by_severity: BTreeMap<Severity, usize> =
            Severity::ALL.into_iter().map(|s| (s, 0)).collect();
        let mut by_type = BTreeMap::new();
        for v in &violations {
            *by_severity.entry(v.severity).or_default() += 1;
            *by_type.entry(v.kind.clone()).or_default() += 1;
        }

        Self {
            file_name: file_name.into(),
            file_path: None,
            timestamp: now_ms(),
            total_violations: violations.len(),
            violations,
            violations_by_severity: by_severity,
            violations_by_type: by_type,
            status: AnalysisStatus::Success,
            error_message: None,
            degraded: false,
        }
    }

    /// Creates an error-status result with no violations.
    #[must_use]
    pub fn failed(file_name: impl Into<String>, error: &dyn std::error::Error) -> Self {
        let mut result = Self::from_violations(file_name, Vec::new());
        result.status = AnalysisStatus::Error;
        result.error_message = Some(error.to_string());
        result
    }

    /// Sets the source path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Marks the semantic pass as degraded.
    #[must_use]
    pub fn with_degraded(mut self, degraded: bool) -> Self {
        self.degraded = degraded;
        self
    }

    /// Returns true if the analysis ran.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == AnalysisStatus::Success
    }

    /// Number of violations of one tier.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.violations_by_severity
            .get(&severity)
            .copied()
            .unwrap_or(0)
    }

    /// Returns true if there are any critical violations.
    #[must_use]
    pub fn has_critical(&self) -> bool {
        self.count(Severity::Critical) > 0
    }

    /// Returns violations filtered by severity.
    #[must_use]
    pub fn by_severity(&self, severity: Severity) -> Vec<&Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .collect()
    }

    /// Groups violations per line with the representative severity.
    #[must_use]
    pub fn line_groups(&self) -> Vec<LineGroup<'_>> {
        let mut groups: Vec<LineGroup<'_>> = Vec::new();
        for v in &self.violations {
            match groups.last_mut() {
                Some(group) if group.line == v.line => group.violations.push(v),
                _ => groups.push(LineGroup {
                    line: v.line,
                    severity: v.severity,
                    violations: vec![v],
                }),
            }
        }
        for group in &mut groups {
            if let Some(severity) = max_severity(group.violations.iter().copied()) {
                group.severity = severity;
            }
        }
        groups
    }

    /// One-line summary of the counts.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {} violation(s) ({} critical, {} warning, {} minor)",
            self.file_name,
            self.total_violations,
            self.count(Severity::Critical),
            self.count(Severity::Warning),
            self.count(Severity::Minor),
        )
    }

    /// Formats the full report for terminal output.
    #[must_use]
    pub fn format_report(&self) -> String {
        use std::fmt::Write;
        let mut report = String::new();
        if let Some(message) = &self.error_message {
            let _ = writeln!(report, "{}: error: {}", self.file_name, message);
            return report;
        }
        for violation in &self.violations {
            let _ = writeln!(report, "{}", violation.format());
        }
        let _ = write!(report, "{}", self.summary());
        if self.degraded {
            report.push_str(" [semantic analysis unavailable]");
        }
        report.push('\n');
        report
    }
}

/// Violations sharing one line.
#[derive(Debug, Clone)]
pub struct LineGroup<'a> {
    /// Line number.
    pub line: usize,
    /// Highest severity among the group.
    pub severity: Severity,
    /// Violations on this line, in list order.
    pub violations: Vec<&'a Violation>,
}
