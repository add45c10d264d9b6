//! Contract for the external language-understanding service.
//!
//! The service receives the source text and the guide's rules and answers
//! with newline-delimited records:
//!
//! ```text
//! LINE 12 | CRITICAL | memory_leak | Array allocated with new[] is never freed
//! ```
//!
//! Records are parsed one by one; a malformed record is skipped without
//! affecting the others. Any failure of the call itself degrades to "no
//! semantic findings" and never reaches the caller of the grader.

use crate::types::{Origin, Severity, Violation};
use regex::Regex;
use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, warn};

/// A request to the semantic service.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticRequest {
    /// Source text under review.
    pub source: String,
    /// Guide rules relevant to the review.
    pub guide_text: String,
    /// Optional retrieval context.
    pub context: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum number of generated tokens.
    pub max_tokens: u32,
}

impl SemanticRequest {
    /// Creates a request with default generation controls.
    #[must_use]
    pub fn new(source: impl Into<String>, guide_text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            guide_text: guide_text.into(),
            context: None,
            temperature: 0.1,
            max_tokens: 2048,
        }
    }

    /// Attaches retrieval context.
    #[must_use]
    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }

    /// Sets the generation controls.
    #[must_use]
    pub fn with_generation(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

/// Errors from a semantic call. Absorbed by [`collect`], never propagated.
#[derive(Debug, thiserror::Error)]
pub enum SemanticError {
    /// No semantic backend is configured.
    #[error("semantic analysis is disabled")]
    Disabled,

    /// The call exceeded its time budget.
    #[error("semantic service timed out after {0:?}")]
    Timeout(Duration),

    /// The service could not be reached.
    #[error("semantic service unreachable: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("semantic service returned HTTP {0}")]
    Status(u16),

    /// The response body could not be decoded.
    #[error("malformed semantic response: {0}")]
    Decode(String),
}

/// A backend able to review source text against guide rules.
///
/// Implementations return the raw response text; record parsing is shared.
pub trait SemanticService: Send + Sync {
    /// Sends one review request and returns the raw response text.
    fn review(
        &self,
        request: &SemanticRequest,
    ) -> impl Future<Output = Result<String, SemanticError>> + Send;
}

/// Placeholder service used when no semantic backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSemantic;

impl SemanticService for NoSemantic {
    fn review(
        &self,
        _request: &SemanticRequest,
    ) -> impl Future<Output = Result<String, SemanticError>> + Send {
        std::future::ready(Err(SemanticError::Disabled))
    }
}

/// Supplies retrieval context for a source file.
pub trait ContextSource: Send + Sync {
    /// Returns context relevant to `source`, if any.
    fn context_for(&self, source: &str) -> Option<String>;
}

/// Result of one semantic pass.
#[derive(Debug, Clone, Default)]
pub struct SemanticOutcome {
    /// Normalised violations.
    pub violations: Vec<Violation>,
    /// True when the call failed or timed out.
    pub degraded: bool,
    /// Number of response records that failed to parse.
    pub skipped_records: usize,
}

/// Calls `service` under `timeout` and parses its records.
///
/// Never fails: errors and timeouts yield an empty, degraded outcome.
pub async fn collect<S: SemanticService>(
    service: &S,
    request: &SemanticRequest,
    timeout: Duration,
) -> SemanticOutcome {
    let response = match tokio::time::timeout(timeout, service.review(request)).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!("Semantic analysis unavailable: {}", e);
            return SemanticOutcome {
                degraded: true,
                ..SemanticOutcome::default()
            };
        }
        Err(_) => {
            warn!("{}", SemanticError::Timeout(timeout));
            return SemanticOutcome {
                degraded: true,
                ..SemanticOutcome::default()
            };
        }
    };

    let (violations, skipped_records) = parse_records(&response);
    debug!(
        "Semantic pass returned {} record(s), {} skipped",
        violations.len(),
        skipped_records
    );
    SemanticOutcome {
        violations,
        degraded: false,
        skipped_records,
    }
}

/// Per-record parse failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// The line does not start with `LINE <n> |`.
    #[error("not a violation record")]
    NotARecord,

    /// Fewer than four `|`-separated fields.
    #[error("expected 4 fields, found {0}")]
    FieldCount(usize),

    /// The line number is missing, zero or not a number.
    #[error("invalid line number `{0}`")]
    LineNumber(String),

    /// The severity token is not a known tier.
    #[error("invalid severity `{0}`")]
    Severity(String),

    /// Category or description is empty.
    #[error("empty {0}")]
    EmptyField(&'static str),
}

fn record_prefix() -> &'static Regex {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    PREFIX.get_or_init(|| {
        Regex::new(r"(?i)^\s*(?:[-*]\s*)?\**line\**\s*(\S*?)\s*\|").expect("Invalid regex")
    })
}

/// Parses one `LINE <n> | <SEVERITY> | <type> | <description>` record.
///
/// # Errors
///
/// Returns the reason the line is not a valid record.
pub fn parse_record(line: &str) -> Result<Violation, RecordError> {
    let captures = record_prefix()
        .captures(line)
        .ok_or(RecordError::NotARecord)?;
    let number = captures.get(1).map_or("", |m| m.as_str());
    let rest_start = captures.get(0).map_or(0, |m| m.end());

    let fields: Vec<&str> = line[rest_start..].splitn(3, '|').map(str::trim).collect();
    if fields.len() < 3 {
        return Err(RecordError::FieldCount(fields.len() + 1));
    }

    let line_number = number
        .trim_end_matches([':', '*'])
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| RecordError::LineNumber(number.to_string()))?;
    let severity = fields[0]
        .trim_matches('*')
        .parse::<Severity>()
        .map_err(|_| RecordError::Severity(fields[0].to_string()))?;
    let kind = normalize_kind(fields[1]);
    if kind.is_empty() {
        return Err(RecordError::EmptyField("type"));
    }
    let description = fields[2].trim();
    if description.is_empty() {
        return Err(RecordError::EmptyField("description"));
    }

    Ok(Violation::new(kind, severity, line_number, description).with_origin(Origin::Semantic))
}

/// Parses every record of a response, skipping malformed lines.
///
/// Returns the violations and the number of record-like lines skipped.
/// Blank lines and prose that does not start with `LINE` are not counted.
#[must_use]
pub fn parse_records(response: &str) -> (Vec<Violation>, usize) {
    let mut violations = Vec::new();
    let mut skipped = 0;
    for line in response.lines() {
        match parse_record(line) {
            Ok(v) => violations.push(v),
            Err(RecordError::NotARecord) => {}
            Err(e) => {
                debug!("Skipping semantic record {:?}: {}", line, e);
                skipped += 1;
            }
        }
    }
    (violations, skipped)
}

/// Lowercase snake case, so `Memory Leak` and `memory-leak` match `memory_leak`.
fn normalize_kind(raw: &str) -> String {
    let mut kind = String::with_capacity(raw.len());
    for c in raw.trim().trim_matches(['`', '*']).chars() {
        if c.is_alphanumeric() {
            kind.extend(c.to_lowercase());
        } else if !kind.is_empty() && !kind.ends_with('_') {
            kind.push('_');
        }
    }
    kind.trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_record() {
        let v = parse_record("LINE 12 | CRITICAL | memory_leak | Array is never freed").unwrap();
        assert_eq!(v.line, 12);
        assert_eq!(v.severity, Severity::Critical);
        assert_eq!(v.kind, "memory_leak");
        assert_eq!(v.description, "Array is never freed");
        assert_eq!(v.origin, Origin::Semantic);
    }

    #[test]
    fn tolerates_bullets_and_case() {
        let v = parse_record("  - line 3 | warning | Naming Convention | Use camelCase").unwrap();
        assert_eq!(v.line, 3);
        assert_eq!(v.severity, Severity::Warning);
        assert_eq!(v.kind, "naming_convention");
    }

    #[test]
    fn accepts_markdown_emphasis() {
        let v = parse_record("**LINE 7:** | MINOR | line_length | Too long").unwrap();
        assert_eq!(v.line, 7);
    }

    #[test]
    fn description_may_contain_pipes() {
        let v = parse_record("LINE 4 | MINOR | style | use a || b, not a or b").unwrap();
        assert_eq!(v.description, "use a || b, not a or b");
    }

    #[test]
    fn rejects_malformed_records() {
        assert_eq!(parse_record("Here are the violations:"), Err(RecordError::NotARecord));
        assert_eq!(
            parse_record("LINE 4 | MINOR | style"),
            Err(RecordError::FieldCount(3))
        );
        assert_eq!(
            parse_record("LINE x | MINOR | style | text"),
            Err(RecordError::LineNumber("x".into()))
        );
        assert_eq!(
            parse_record("LINE 0 | MINOR | style | text"),
            Err(RecordError::LineNumber("0".into()))
        );
        assert_eq!(
            parse_record("LINE 2 | SEVERE | style | text"),
            Err(RecordError::Severity("SEVERE".into()))
        );
        assert_eq!(
            parse_record("LINE 2 | MINOR | -- | text"),
            Err(RecordError::EmptyField("type"))
        );
        assert_eq!(
            parse_record("LINE 2 | MINOR | style |  "),
            Err(RecordError::EmptyField("description"))
        );
    }

    #[test]
    fn partial_success_keeps_valid_records() {
        let response = "\
Sure, here is my review.
LINE 3 | WARNING | null_usage | NULL used
LINE ? | WARNING | null_usage | broken
LINE 9 | MINOR | magic-number | 42 should be a constant

LINE 10 | CRITICAL
";
        let (violations, skipped) = parse_records(response);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[1].kind, "magic_number");
        assert_eq!(skipped, 2);
    }

    #[test]
    fn normalizes_kinds() {
        assert_eq!(normalize_kind(" Memory Leak "), "memory_leak");
        assert_eq!(normalize_kind("`null-usage`"), "null_usage");
        assert_eq!(normalize_kind("brace__style!"), "brace_style");
    }

    struct FixedService(&'static str);

    impl SemanticService for FixedService {
        async fn review(&self, _request: &SemanticRequest) -> Result<String, SemanticError> {
            Ok(self.0.to_string())
        }
    }

    struct SlowService;

    impl SemanticService for SlowService {
        async fn review(&self, _request: &SemanticRequest) -> Result<String, SemanticError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("LINE 1 | MINOR | late | never seen".to_string())
        }
    }

    #[tokio::test]
    async fn collect_parses_response() {
        let request = SemanticRequest::new("int x;", "MINOR\n- x");
        let outcome = collect(
            &FixedService("LINE 1 | MINOR | style | ok"),
            &request,
            Duration::from_secs(5),
        )
        .await;
        assert!(!outcome.degraded);
        assert_eq!(outcome.violations.len(), 1);
    }

    #[tokio::test]
    async fn collect_degrades_on_error() {
        let request = SemanticRequest::new("int x;", "MINOR\n- x");
        let outcome = collect(&NoSemantic, &request, Duration::from_secs(5)).await;
        assert!(outcome.degraded);
        assert!(outcome.violations.is_empty());
    }

    #[tokio::test]
    async fn collect_degrades_on_timeout() {
        let request = SemanticRequest::new("int x;", "MINOR\n- x");
        let outcome = collect(&SlowService, &request, Duration::from_millis(50)).await;
        assert!(outcome.degraded);
        assert!(outcome.violations.is_empty());
    }
}
