//! Check for `if`/`for`/`while` bodies without braces.
//!
//! A header passes when `{` follows its closing parenthesis on the same line
//! or opens the next code line. A `;` right after the condition is an empty
//! body or the tail of a `do { } while (x);` loop and is not reported.

use crate::scan::{is_preprocessor, matching_paren};
use regex::Regex;
use style_grader_core::{column_at, Check, Severity, SourceFile, StyleGuide, Violation};

/// Check code for missing-braces.
pub const CODE: &str = "SG004";

/// Check name for missing-braces.
pub const NAME: &str = "missing-braces";

/// Violation type emitted by this check.
pub const KIND: &str = "missing_braces";

/// Flags single-statement control bodies without braces.
#[derive(Debug, Clone)]
pub struct MissingBraces {
    header: Regex,
}

impl Default for MissingBraces {
    fn default() -> Self {
        Self::new()
    }
}

impl MissingBraces {
    /// Creates a new check.
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Regex::new(r"^\s*(?:\}\s*)?(?:else\s+)?(if|for|while)(?:\s+constexpr)?\s*\(")
                .expect("Invalid regex"),
        }
    }

    /// Whether the body after the condition opens with a brace.
    fn is_braced(source: &SourceFile, line: usize, rest: &str) -> Option<bool> {
        if rest.starts_with('{') {
            return Some(true);
        }
        if rest.starts_with(';') {
            return None;
        }
        if !rest.is_empty() {
            return Some(false);
        }
        let next = source.next_code_line(line + 1)?;
        Some(source.code(next).trim_start().starts_with('{'))
    }
}

impl Check for MissingBraces {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags if/for/while bodies not enclosed in braces"
    }

    fn triggers(&self) -> &'static [&'static str] {
        &["brace", "single statement", "single-statement"]
    }

    fn check(&self, source: &SourceFile, _guide: &StyleGuide) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (line, code) in source.code_lines() {
            if is_preprocessor(code) {
                continue;
            }
            let Some(caps) = self.header.captures(code) else {
                continue;
            };
            let (Some(whole), Some(keyword)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            // Conditions spanning several lines are skipped.
            let Some(close) = matching_paren(code, whole.end() - 1) else {
                continue;
            };
            let rest = code[close + 1..].trim();

            if Self::is_braced(source, line, rest) == Some(false) {
                violations.push(
                    Violation::new(
                        KIND,
                        Severity::Warning,
                        line,
                        format!("`{}` body is not enclosed in braces", keyword.as_str()),
                    )
                    .with_column(column_at(code, keyword.start())),
                );
            }
        }

        violations
    }
}
