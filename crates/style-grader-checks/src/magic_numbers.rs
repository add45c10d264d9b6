//! Check for bare numeric literals.
//!
//! Declarations are where named constants come from, so lines declaring a
//! variable with an initializer, `const`/`constexpr` lines, enumerators and
//! preprocessor lines are skipped. The literals `0` and `1` are allowed.
//! At most one violation is emitted per line, for its first literal.

use crate::scan::{is_preprocessor, starts_with_keyword};
use regex::Regex;
use style_grader_core::{column_at, Check, Severity, SourceFile, StyleGuide, Violation};

/// Check code for magic-numbers.
pub const CODE: &str = "SG010";

/// Check name for magic-numbers.
pub const NAME: &str = "magic-numbers";

/// Violation type emitted by this check.
pub const KIND: &str = "magic_number";

/// Flags numeric literals used outside declarations.
#[derive(Debug, Clone)]
pub struct MagicNumbers {
    literal: Regex,
    declaration: Regex,
    enumerator: Regex,
}

impl Default for MagicNumbers {
    fn default() -> Self {
        Self::new()
    }
}

impl MagicNumbers {
    /// Creates a new check.
    #[must_use]
    pub fn new() -> Self {
        Self {
            literal: Regex::new(r"\b(0[xX][0-9A-Fa-f]+|\d+(?:\.\d*)?(?:[eE][+-]?\d+)?)[uUlLfF]*\b")
                .expect("Invalid regex"),
            declaration: Regex::new(
                r"^\s*(?:(?:static|const|constexpr|inline|unsigned|signed|long|short|volatile|auto|mutable)\s+)*[A-Za-z_][\w:]*(?:<[^;=]*>)?[\s\*&]+[A-Za-z_]\w*\s*(?:=|\{|\[)",
            )
            .expect("Invalid regex"),
            enumerator: Regex::new(r"^\s*[A-Za-z_]\w*\s*=\s*[^=;]*,?\s*$").expect("Invalid regex"),
        }
    }

    fn is_declaration(&self, code: &str) -> bool {
        let trimmed = code.trim_start();
        trimmed.starts_with("const ")
            || trimmed.starts_with("constexpr ")
            || trimmed.starts_with("static const")
            || trimmed.starts_with("enum")
            || (!starts_with_keyword(code) && self.declaration.is_match(code))
            || (trimmed.ends_with(',') && self.enumerator.is_match(code))
    }
}

impl Check for MagicNumbers {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags numeric literals that should be named constants"
    }

    fn triggers(&self) -> &'static [&'static str] {
        &["magic", "constant"]
    }

    fn check(&self, source: &SourceFile, _guide: &StyleGuide) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (line, code) in source.code_lines() {
            if is_preprocessor(code) || self.is_declaration(code) {
                continue;
            }
            let magic = self.literal.captures_iter(code).find_map(|caps| {
                let number = caps.get(1)?;
                (!is_trivial(number.as_str())).then_some(number)
            });
            if let Some(number) = magic {
                violations.push(
                    Violation::new(
                        KIND,
                        Severity::Warning,
                        line,
                        format!(
                            "Magic number {}; replace it with a named constant",
                            number.as_str()
                        ),
                    )
                    .with_column(column_at(code, number.start())),
                );
            }
        }

        violations
    }
}

/// `0` and `1` in any spelling (`0x0`, `1.0`, ...).
fn is_trivial(literal: &str) -> bool {
    if let Some(hex) = literal.strip_prefix("0x").or_else(|| literal.strip_prefix("0X")) {
        return matches!(u64::from_str_radix(hex, 16), Ok(0 | 1));
    }
    let (integer, fraction) = literal.split_once('.').unwrap_or((literal, ""));
    matches!(integer.trim_start_matches('0'), "" | "1") && fraction.chars().all(|c| c == '0')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(code: &str) -> Vec<Violation> {
        let guide = StyleGuide::parse("WARNING\n- No magic numbers; use named constants").unwrap();
        MagicNumbers::new().check(&SourceFile::new("t.cpp", code), &guide)
    }

    #[test]
    fn literal_in_condition_is_reported() {
        let violations = run("void f(int x) {\n    if (x > 18) {\n        g(x * 60, 2);\n    }\n}\n");
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].line, 2);
        assert_eq!(violations[0].column, Some(13));
        assert_eq!(violations[0].description, "Magic number 18; replace it with a named constant");
        assert!(violations[1].description.contains("60"));
    }

    #[test]
    fn declarations_are_allowed() {
        let code = "const int kAdultAge = 18;\nconstexpr double kRate = 0.25;\nint timeout = 30;\nstd::array<int, 4> values{};\nchar buffer[256];\nenum Level {\n    Low = 10,\n    High = 20,\n};\n#define LIMIT 99\n";
        assert!(run(code).is_empty());
    }

    #[test]
    fn zero_and_one_are_allowed() {
        assert!(run("for (i = 0; i < n; i += 1) {}\nreturn 0;\nx = 1.0;\n").is_empty());
    }

    #[test]
    fn literals_in_strings_comments_and_identifiers_are_ignored() {
        assert!(run("puts(\"42\"); // 42\nvalue2 = x;\n").is_empty());
    }

    #[test]
    fn hex_literal_reported() {
        let violations = run("flags |= 0xFF;\n");
        assert_eq!(violations.len(), 1);
        assert!(violations[0].description.contains("0xFF"));
    }
}
