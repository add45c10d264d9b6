//! Check for mixed tab and space indentation.
//!
//! Every non-blank line is classified by its first character as tab-led,
//! space-led, or neither. Block comment continuation lines (` * text`,
//! ` */`) are ignored since they are aligned with a single space whatever
//! the indentation style. When both styles
//! occur, one violation points at the first line of the minority style; on a
//! tie, the style seen second is the minority.

use style_grader_core::{Check, Severity, SourceFile, StyleGuide, Violation};

/// Check code for indentation.
pub const CODE: &str = "SG001";

/// Check name for indentation.
pub const NAME: &str = "indentation";

/// Violation type emitted by this check.
pub const KIND: &str = "indentation";

/// Flags files that indent with both tabs and spaces.
#[derive(Debug, Clone, Default)]
pub struct Indentation;

impl Indentation {
    /// Creates a new check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Tabs,
    Spaces,
}

impl Style {
    fn label(self) -> &'static str {
        match self {
            Self::Tabs => "tab",
            Self::Spaces => "space",
        }
    }
}

#[derive(Debug, Default)]
struct Tally {
    count: usize,
    first: Option<usize>,
}

impl Check for Indentation {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags mixed tab and space indentation"
    }

    fn triggers(&self) -> &'static [&'static str] {
        &["indent", "tab"]
    }

    fn check(&self, source: &SourceFile, _guide: &StyleGuide) -> Vec<Violation> {
        let mut tabs = Tally::default();
        let mut spaces = Tally::default();

        for (index, raw) in source.lines().iter().enumerate() {
            let line = index + 1;
            if raw.trim().is_empty() || is_block_continuation(source, line, raw) {
                continue;
            }
            let tally = match raw.chars().next() {
                Some('\t') => &mut tabs,
                Some(' ') => &mut spaces,
                _ => continue,
            };
            tally.count += 1;
            tally.first.get_or_insert(line);
        }

        let (Some(first_tab), Some(first_space)) = (tabs.first, spaces.first) else {
            return Vec::new();
        };

        let minority = match tabs.count.cmp(&spaces.count) {
            std::cmp::Ordering::Less => Style::Tabs,
            std::cmp::Ordering::Greater => Style::Spaces,
            std::cmp::Ordering::Equal if first_tab > first_space => Style::Tabs,
            std::cmp::Ordering::Equal => Style::Spaces,
        };
        let (line, majority) = match minority {
            Style::Tabs => (first_tab, Style::Spaces),
            Style::Spaces => (first_space, Style::Tabs),
        };

        vec![Violation::new(
            KIND,
            Severity::Warning,
            line,
            format!(
                "Mixed indentation: {} tab-indented and {} space-indented lines; this {}-indented line breaks the {} style",
                tabs.count,
                spaces.count,
                minority.label(),
                majority.label(),
            ),
        )
        .with_column(1)]
    }
}

fn is_block_continuation(source: &SourceFile, line: usize, raw: &str) -> bool {
    raw.trim_start().starts_with('*') && source.is_comment_only(line)
}
