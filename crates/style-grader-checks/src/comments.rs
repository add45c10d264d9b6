//! Check for missing or sparse comments.
//!
//! A file whose only comments sit in the leading header block (or that has
//! none at all) gets one CRITICAL `no_comments` violation at its first code
//! line. Otherwise every run of code lines without a comment reaching
//! `lines_per_comment` lines is reported once as `sparse_comments`.
//!
//! # Configuration
//!
//! - `lines_per_comment`: Code lines allowed without a comment (default: 20)

use style_grader_core::{Check, Severity, SourceFile, StyleGuide, Violation};

/// Check code for comments.
pub const CODE: &str = "SG006";

/// Check name for comments.
pub const NAME: &str = "comments";

/// Violation type for a file without comments.
pub const NO_COMMENTS: &str = "no_comments";

/// Violation type for an under-commented region.
pub const SPARSE_COMMENTS: &str = "sparse_comments";

/// Default number of code lines allowed without a comment.
pub const DEFAULT_LINES_PER_COMMENT: usize = 20;

/// Flags files without comments and long uncommented regions.
#[derive(Debug, Clone)]
pub struct Comments {
    lines_per_comment: usize,
}

impl Default for Comments {
    fn default() -> Self {
        Self::new()
    }
}

impl Comments {
    /// Creates a new check with the default density.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines_per_comment: DEFAULT_LINES_PER_COMMENT,
        }
    }

    /// Sets the number of code lines allowed without a comment.
    #[must_use]
    pub fn lines_per_comment(mut self, lines: usize) -> Self {
        self.lines_per_comment = lines.max(1);
        self
    }

    fn sparse_regions(&self, source: &SourceFile, first_code: usize) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut run_start = None;
        let mut run_len = 0;
        let mut reported = false;

        for line in first_code..=source.len() {
            if source.has_comment(line) {
                run_start = None;
                run_len = 0;
                reported = false;
                continue;
            }
            if !source.is_code(line) {
                continue;
            }
            let start = *run_start.get_or_insert(line);
            run_len += 1;
            if run_len >= self.lines_per_comment && !reported {
                reported = true;
                violations.push(Violation::new(
                    SPARSE_COMMENTS,
                    Severity::Minor,
                    start,
                    format!(
                        "{} or more code lines without a comment starting here",
                        self.lines_per_comment
                    ),
                ));
            }
        }

        violations
    }
}

impl Check for Comments {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags files without comments and long uncommented regions"
    }

    fn triggers(&self) -> &'static [&'static str] {
        &["comment"]
    }

    fn default_severity(&self) -> Severity {
        Severity::Critical
    }

    fn check(&self, source: &SourceFile, _guide: &StyleGuide) -> Vec<Violation> {
        let Some(first_code) = source.first_code_line() else {
            return Vec::new();
        };

        // Lines before the first code line form the header block.
        let commented_body = (first_code..=source.len()).any(|line| source.has_comment(line));
        if !commented_body {
            return vec![Violation::new(
                NO_COMMENTS,
                Severity::Critical,
                first_code,
                "No comments in the code; document what the code does and why",
            )];
        }

        self.sparse_regions(source, first_code)
    }
}
