//! Core types for style violations.

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Severity tier of a style guide section or a violation.
///
/// The derived ordering is the display precedence:
/// `Minor < Warning < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Cosmetic deviation.
    Minor,
    /// Deviation that should be addressed.
    Warning,
    /// Deviation that must be fixed.
    Critical,
}

impl Severity {
    /// All tiers, most severe first.
    pub const ALL: [Self; 3] = [Self::Critical, Self::Warning, Self::Minor];

    /// Returns the canonical upper-case token (`CRITICAL`, `WARNING`, `MINOR`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Warning => "WARNING",
            Self::Minor => "MINOR",
        }
    }

    /// Maps a section header to a tier by case-insensitive substring containment.
    ///
    /// `"CRITICAL RULES"` maps to [`Severity::Critical`]; a header naming none
    /// of the tiers yields `None`.
    #[must_use]
    pub fn from_header(header: &str) -> Option<Self> {
        let upper = header.to_uppercase();
        Self::ALL
            .into_iter()
            .find(|severity| upper.contains(severity.as_str()))
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a severity token is not one of the three tiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity `{0}` (expected CRITICAL, WARNING or MINOR)")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CRITICAL" => Ok(Self::Critical),
            "WARNING" => Ok(Self::Warning),
            "MINOR" => Ok(Self::Minor),
            _ => Err(ParseSeverityError(s.trim().to_string())),
        }
    }
}

/// Which producer reported a violation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Deterministic text heuristics.
    #[default]
    RuleBased,
    /// The external language-understanding service.
    Semantic,
}

/// A single detected deviation from the style guide.
///
/// Equality and hashing use the `(line, kind)` key only: two producers may
/// phrase the same finding differently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Category key (e.g. `indentation`, `memory_leak`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed), when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    /// One-sentence human-readable description.
    pub description: String,
    /// Triggering style guide rule or section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guide_ref: Option<String>,
    /// Literal text of the offending line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Producer of this violation.
    #[serde(default)]
    pub origin: Origin,
}

impl Violation {
    /// Creates a new rule-based violation.
    #[must_use]
    pub fn new(
        kind: impl Into<String>,
        severity: Severity,
        line: usize,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            severity,
            line,
            column: None,
            description: description.into(),
            guide_ref: None,
            snippet: None,
            origin: Origin::RuleBased,
        }
    }

    /// Sets the column.
    #[must_use]
    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    /// Adds a style guide reference to this violation.
    #[must_use]
    pub fn with_guide_ref(mut self, guide_ref: impl Into<String>) -> Self {
        self.guide_ref = Some(guide_ref.into());
        self
    }

    /// Attaches the offending line.
    #[must_use]
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    /// Marks the producer of this violation.
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Deduplication key.
    #[must_use]
    pub fn key(&self) -> (usize, &str) {
        (self.line, self.kind.as_str())
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!("{} at line {}", self.kind, self.line);
        if let Some(column) = self.column {
            let _ = write!(output, ":{column}");
        }
        output.push('\n');
        let _ = writeln!(output, "  {}: {}", self.severity, self.description);
        if let Some(snippet) = &self.snippet {
            let _ = writeln!(output, "  | {}", snippet.trim_end());
        }
        if let Some(guide_ref) = &self.guide_ref {
            let _ = writeln!(output, "  = guide: {guide_ref}");
        }
        output
    }

    /// Builds a miette diagnostic pointing at this violation's line.
    #[must_use]
    pub fn diagnostic(&self, source_name: &str, content: &str) -> ViolationDiagnostic {
        let (offset, length) = line_span(content, self.line);
        let text = content.get(offset..offset + length).unwrap_or_default();
        let column = self.column.map_or(0, |column| byte_column(text, column));
        ViolationDiagnostic {
            message: format!("[{}] {}", self.severity, self.description),
            help: self.guide_ref.clone(),
            src: NamedSource::new(source_name, content.to_string()),
            span: SourceSpan::from((offset + column, length - column)),
            label_message: self.kind.clone(),
        }
    }
}

impl PartialEq for Violation {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Violation {}

impl std::hash::Hash for Violation {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.line)?;
        if let Some(column) = self.column {
            write!(f, ":{column}")?;
        }
        write!(f, ": {} [{}] {}", self.severity, self.kind, self.description)?;
        if let Some(guide_ref) = &self.guide_ref {
            write!(f, " (guide: {guide_ref})")?;
        }
        Ok(())
    }
}

/// A violation rendered as a miette diagnostic for rich terminal display.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct ViolationDiagnostic {
    message: String,
    #[help]
    help: Option<String>,
    #[source_code]
    src: NamedSource<String>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

/// Byte offset and length of a 1-indexed line, excluding its terminator.
fn line_span(content: &str, line: usize) -> (usize, usize) {
    let mut offset = 0;
    for (i, text) in content.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            let trimmed = text.trim_end_matches(['\n', '\r']);
            return (offset, trimmed.len());
        }
        offset += text.len();
    }
    (content.len(), 0)
}

/// Byte offset of a 1-indexed character column within `text`, clamped to its end.
fn byte_column(text: &str, column: usize) -> usize {
    text.char_indices()
        .nth(column.saturating_sub(1))
        .map_or(text.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_violation(severity: Severity) -> Violation {
        Violation::new("null_usage", severity, 42, "Use nullptr instead of NULL")
    }

    #[test]
    fn severity_orders_by_precedence() {
        assert!(Severity::Critical > Severity::Warning);
        assert!(Severity::Warning > Severity::Minor);
        assert_eq!(
            [Severity::Minor, Severity::Critical, Severity::Warning]
                .into_iter()
                .max(),
            Some(Severity::Critical)
        );
    }

    #[test]
    fn severity_from_header_uses_containment() {
        assert_eq!(
            Severity::from_header("CRITICAL RULES"),
            Some(Severity::Critical)
        );
        assert_eq!(Severity::from_header("== WARNING =="), Some(Severity::Warning));
        assert_eq!(Severity::from_header("minor"), Some(Severity::Minor));
        assert_eq!(Severity::from_header("GENERAL NOTES"), None);
    }

    #[test]
    fn severity_parses_tokens() {
        assert_eq!(" warning ".parse::<Severity>(), Ok(Severity::Warning));
        assert!("SEVERE".parse::<Severity>().is_err());
    }

    #[test]
    fn severity_serializes_uppercase() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
    }

    #[test]
    fn equality_ignores_description_and_severity() {
        let a = make_violation(Severity::Warning);
        let b = Violation::new("null_usage", Severity::Minor, 42, "NULL literal found");
        let c = Violation::new("null_usage", Severity::Warning, 43, "NULL literal found");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn violation_serializes_kind_as_type() {
        let v = make_violation(Severity::Warning);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["type"], "null_usage");
        assert_eq!(json["origin"], "rule_based");
        assert!(json.get("column").is_none());
    }

    #[test]
    fn format_includes_guide_ref_and_snippet() {
        let v = make_violation(Severity::Warning)
            .with_guide_ref("WARNING: Use nullptr")
            .with_snippet("int* p = NULL;");
        let formatted = v.format();
        assert!(formatted.contains("= guide: WARNING: Use nullptr"));
        assert!(formatted.contains("| int* p = NULL;"));
    }

    #[test]
    fn display_is_single_line() {
        let v = make_violation(Severity::Warning).with_column(10);
        assert_eq!(
            v.to_string(),
            "42:10: WARNING [null_usage] Use nullptr instead of NULL"
        );
    }

    #[test]
    fn line_span_finds_line_bounds() {
        let content = "one\r\ntwo\nthree";
        assert_eq!(line_span(content, 1), (0, 3));
        assert_eq!(line_span(content, 2), (5, 3));
        assert_eq!(line_span(content, 3), (9, 5));
        assert_eq!(line_span(content, 9), (14, 0));
    }

    #[test]
    fn diagnostic_column_counts_characters() {
        let content = "int a;\n// café = NULL;\n";
        let violation =
            Violation::new("null_usage", Severity::Warning, 2, "Use nullptr").with_column(11);
        let diagnostic = violation.diagnostic("a.cpp", content);

        let start = diagnostic.span.offset();
        assert_eq!(start, 7 + "// café = ".len());
        assert_eq!(&content[start..start + diagnostic.span.len()], "NULL;");
    }

    #[test]
    fn diagnostic_column_past_line_end_is_clamped() {
        let content = "x\n";
        let violation = Violation::new("style", Severity::Minor, 1, "odd").with_column(40);
        let diagnostic = violation.diagnostic("a.cpp", content);
        assert_eq!(diagnostic.span.offset(), 1);
        assert_eq!(diagnostic.span.len(), 0);
    }
}
