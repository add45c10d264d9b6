//! Check for inconsistent opening brace placement.
//!
//! Control statements, function definitions and type bodies are classified
//! as same-line (`if (x) {`) or next-line (`{` alone after the header). The
//! first opening fixes the file's style; the first opening using the other
//! style is reported.

use crate::scan::{after_closing_braces, is_preprocessor};
use regex::Regex;
use style_grader_core::{column_at, Check, Severity, SourceFile, StyleGuide, Violation};

/// Check code for brace-style.
pub const CODE: &str = "SG003";

/// Check name for brace-style.
pub const NAME: &str = "brace-style";

/// Violation type emitted by this check.
pub const KIND: &str = "brace_style";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    SameLine,
    NextLine,
}

impl Placement {
    fn describe(self) -> &'static str {
        match self {
            Self::SameLine => "on the same line as its header",
            Self::NextLine => "on its own line",
        }
    }
}

/// Flags mixed same-line and next-line brace placement.
#[derive(Debug, Clone)]
pub struct BraceStyle {
    keyword_header: Regex,
    signature_end: Regex,
}

impl Default for BraceStyle {
    fn default() -> Self {
        Self::new()
    }
}

impl BraceStyle {
    /// Creates a new check.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keyword_header: Regex::new(
                r"^(?:if|else|for|while|switch|do|try|catch|namespace|class|struct|union|enum)\b",
            )
            .expect("Invalid regex"),
            signature_end: Regex::new(r"\)\s*(?:(?:const|override|final|noexcept)\s*)*$")
                .expect("Invalid regex"),
        }
    }

    /// Whether `header` (without its brace) opens a block worth classifying.
    fn is_opening_header(&self, header: &str) -> bool {
        let header = after_closing_braces(header).trim_end();
        if header.is_empty() || header.ends_with(['=', ',', '(', ';', '{', '}']) {
            return false;
        }
        self.keyword_header.is_match(header) || self.signature_end.is_match(header)
    }

    fn previous_code_line<'s>(source: &'s SourceFile, line: usize) -> Option<&'s str> {
        (1..line)
            .rev()
            .map(|n| source.code(n))
            .find(|code| !code.trim().is_empty())
    }
}

impl Check for BraceStyle {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags inconsistent opening brace placement"
    }

    fn triggers(&self) -> &'static [&'static str] {
        &["brace"]
    }

    fn default_severity(&self) -> Severity {
        Severity::Minor
    }

    fn check(&self, source: &SourceFile, _guide: &StyleGuide) -> Vec<Violation> {
        let mut established: Option<(Placement, usize)> = None;

        for (line, code) in source.code_lines() {
            if is_preprocessor(code) {
                continue;
            }
            let trimmed = code.trim();
            let placement = if trimmed == "{" {
                match Self::previous_code_line(source, line) {
                    Some(prev) if self.is_opening_header(prev) => Placement::NextLine,
                    _ => continue,
                }
            } else if let Some(header) = trimmed.strip_suffix('{') {
                if !self.is_opening_header(header) {
                    continue;
                }
                Placement::SameLine
            } else {
                continue;
            };

            match established {
                None => established = Some((placement, line)),
                Some((style, first)) if style != placement => {
                    let column = code.rfind('{').map_or(1, |pos| column_at(code, pos));
                    return vec![Violation::new(
                        KIND,
                        Severity::Minor,
                        line,
                        format!(
                            "Opening brace {}, but line {first} places it {}",
                            placement.describe(),
                            style.describe(),
                        ),
                    )
                    .with_column(column)];
                }
                Some(_) => {}
            }
        }

        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(code: &str) -> Vec<Violation> {
        let guide = StyleGuide::parse("MINOR\n- Opening braces go on the same line").unwrap();
        BraceStyle::new().check(&SourceFile::new("t.cpp", code), &guide)
    }

    #[test]
    fn consistent_same_line_passes() {
        let code = "int main() {\n    if (x) {\n        y();\n    } else {\n        z();\n    }\n}\n";
        assert!(run(code).is_empty());
    }

    #[test]
    fn consistent_next_line_passes() {
        let code = "int main()\n{\n    while (x)\n    {\n        y();\n    }\n}\n";
        assert!(run(code).is_empty());
    }

    #[test]
    fn first_divergence_is_reported() {
        let code = "int main()\n{\n    if (x) {\n        y();\n    }\n    for (;;) {\n    }\n}\n";
        let violations = run(code);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 3);
        assert_eq!(violations[0].column, Some(12));
        assert!(violations[0].description.contains("line 2"));
    }

    #[test]
    fn initializer_lists_are_not_openings() {
        let code = "void f()\n{\n    int a[] = {\n        1, 2\n    };\n}\n";
        assert!(run(code).is_empty());
    }

    #[test]
    fn braces_in_strings_are_ignored() {
        let code = "void f()\n{\n    puts(\"if (x) {\");\n}\n";
        assert!(run(code).is_empty());
    }
}
