//! Check for overly long lines.
//!
//! # Configuration
//!
//! - `max_length`: Maximum characters per line (default: 200)

use style_grader_core::{Check, Severity, SourceFile, StyleGuide, Violation};

/// Check code for line-length.
pub const CODE: &str = "SG002";

/// Check name for line-length.
pub const NAME: &str = "line-length";

/// Violation type emitted by this check.
pub const KIND: &str = "line_length";

/// Default maximum line length in characters.
pub const DEFAULT_MAX_LENGTH: usize = 200;

/// Flags lines longer than a character threshold.
#[derive(Debug, Clone)]
pub struct LineLength {
    max_length: usize,
}

impl Default for LineLength {
    fn default() -> Self {
        Self::new()
    }
}

impl LineLength {
    /// Creates a new check with the default threshold.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
        }
    }

    /// Sets the maximum line length.
    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = max;
        self
    }
}

impl Check for LineLength {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags lines exceeding the maximum length"
    }

    fn triggers(&self) -> &'static [&'static str] {
        &[
            "line length",
            "characters",
            "long line",
            "line width",
            "columns",
            "exceed",
        ]
    }

    fn default_severity(&self) -> Severity {
        Severity::Minor
    }

    fn check(&self, source: &SourceFile, _guide: &StyleGuide) -> Vec<Violation> {
        source
            .lines()
            .iter()
            .enumerate()
            .filter_map(|(index, raw)| {
                let length = raw.chars().count();
                (length > self.max_length).then(|| {
                    Violation::new(
                        KIND,
                        Severity::Minor,
                        index + 1,
                        format!(
                            "Line is {length} characters long (max: {})",
                            self.max_length
                        ),
                    )
                    .with_column(self.max_length + 1)
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guide() -> StyleGuide {
        StyleGuide::parse("MINOR\n- Lines must not exceed 100 characters").unwrap()
    }

    #[test]
    fn long_line_is_reported_once() {
        let code = format!("int a;\nint b = {};\n", "1 + ".repeat(60));
        let violations = LineLength::new().check(&SourceFile::new("t.cpp", &code), &guide());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 2);
        assert_eq!(violations[0].severity, Severity::Minor);
        assert_eq!(violations[0].column, Some(201));
    }

    #[test]
    fn threshold_is_inclusive() {
        let code = "x".repeat(200);
        assert!(LineLength::new()
            .check(&SourceFile::new("t.cpp", &code), &guide())
            .is_empty());
    }

    #[test]
    fn custom_threshold() {
        let code = "x".repeat(81);
        let violations = LineLength::new()
            .max_length(80)
            .check(&SourceFile::new("t.cpp", &code), &guide());
        assert_eq!(violations.len(), 1);
        assert!(violations[0].description.contains("81 characters"));
    }

    #[test]
    fn counts_characters_not_bytes() {
        let code = format!("// {}", "é".repeat(150));
        assert!(LineLength::new()
            .check(&SourceFile::new("t.cpp", &code), &guide())
            .is_empty());
    }
}
