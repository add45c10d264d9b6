//! Check for the legacy `NULL` macro.

use crate::scan::is_preprocessor;
use regex::Regex;
use style_grader_core::{column_at, Check, Severity, SourceFile, StyleGuide, Violation};

/// Check code for null-sentinel.
pub const CODE: &str = "SG009";

/// Check name for null-sentinel.
pub const NAME: &str = "null-sentinel";

/// Violation type emitted by this check.
pub const KIND: &str = "null_usage";

/// Flags `NULL` where `nullptr` should be used.
#[derive(Debug, Clone)]
pub struct NullSentinel {
    pattern: Regex,
}

impl Default for NullSentinel {
    fn default() -> Self {
        Self::new()
    }
}

impl NullSentinel {
    /// Creates a new check.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"\bNULL\b").expect("Invalid regex"),
        }
    }
}

impl Check for NullSentinel {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags NULL where nullptr should be used"
    }

    fn triggers(&self) -> &'static [&'static str] {
        &["null"]
    }

    fn check(&self, source: &SourceFile, _guide: &StyleGuide) -> Vec<Violation> {
        source
            .code_lines()
            .filter(|(_, code)| !is_preprocessor(code))
            .filter_map(|(line, code)| {
                let found = self.pattern.find(code)?;
                Some(
                    Violation::new(KIND, Severity::Warning, line, "Use nullptr instead of NULL")
                        .with_column(column_at(code, found.start())),
                )
            })
            .collect()
    }
}
