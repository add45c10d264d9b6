//! Check for a missing file header comment.
//!
//! # Configuration
//!
//! - `header_lines`: Number of leading lines searched for a comment (default: 10)

use style_grader_core::{Check, Severity, SourceFile, StyleGuide, Violation};

/// Check code for file-header.
pub const CODE: &str = "SG005";

/// Check name for file-header.
pub const NAME: &str = "file-header";

/// Violation type emitted by this check.
pub const KIND: &str = "file_header";

/// Default number of leading lines searched.
pub const DEFAULT_HEADER_LINES: usize = 10;

/// Flags files with no comment near the top.
#[derive(Debug, Clone)]
pub struct FileHeader {
    header_lines: usize,
}

impl Default for FileHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl FileHeader {
    /// Creates a new check with the default window.
    #[must_use]
    pub fn new() -> Self {
        Self {
            header_lines: DEFAULT_HEADER_LINES,
        }
    }

    /// Sets the number of leading lines searched for a comment.
    #[must_use]
    pub fn header_lines(mut self, lines: usize) -> Self {
        self.header_lines = lines;
        self
    }
}

impl Check for FileHeader {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires a comment within the first lines of the file"
    }

    fn triggers(&self) -> &'static [&'static str] {
        &["header", "file comment", "author"]
    }

    fn default_severity(&self) -> Severity {
        Severity::Minor
    }

    fn check(&self, source: &SourceFile, _guide: &StyleGuide) -> Vec<Violation> {
        let window = self.header_lines.min(source.len());
        if window == 0 || (1..=window).any(|line| source.has_comment(line)) {
            return Vec::new();
        }
        vec![Violation::new(
            KIND,
            Severity::Minor,
            1,
            format!(
                "No comment in the first {} lines; add a file header describing the file",
                self.header_lines
            ),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(check: &FileHeader, code: &str) -> Vec<Violation> {
        let guide = StyleGuide::parse("MINOR\n- Every file starts with a header comment").unwrap();
        check.check(&SourceFile::new("t.cpp", code), &guide)
    }

    #[test]
    fn header_comment_passes() {
        assert!(run(&FileHeader::new(), "// main.cpp: entry point\nint main() {}\n").is_empty());
        assert!(run(&FileHeader::new(), "/*\n * Author: someone\n */\nint x;\n").is_empty());
    }

    #[test]
    fn missing_header_reported_at_line_one() {
        let violations = run(&FileHeader::new(), "#include <iostream>\nint main() {}\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 1);
        assert_eq!(violations[0].severity, Severity::Minor);
    }

    #[test]
    fn comment_after_window_does_not_count() {
        let code = format!("{}// late\n", "int x;\n".repeat(3));
        assert_eq!(run(&FileHeader::new().header_lines(3), &code).len(), 1);
        assert!(run(&FileHeader::new().header_lines(4), &code).is_empty());
    }

    #[test]
    fn empty_file_has_no_header_violation() {
        assert!(run(&FileHeader::new(), "").is_empty());
    }

    #[test]
    fn comment_marker_in_string_is_not_a_header() {
        assert_eq!(run(&FileHeader::new(), "const char* s = \"// no\";\n").len(), 1);
    }
}
