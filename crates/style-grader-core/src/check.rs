//! Check trait for rule-based heuristics.

use crate::guide::{StyleGuide, StyleGuideRule};
use crate::source::SourceFile;
use crate::types::{Severity, Violation};

/// A deterministic, text-only heuristic run against one source file.
///
/// The style guide decides which checks run: a check is active only when
/// some rule text contains one of its [`Check::triggers`]. Checks must not
/// fail on any input; a check that finds nothing returns an empty vector.
///
/// # Example
///
/// ```ignore
/// use style_grader_core::{Check, Severity, SourceFile, StyleGuide, Violation};
///
/// pub struct NoGoto;
///
/// impl Check for NoGoto {
///     fn name(&self) -> &'static str { "no-goto" }
///     fn code(&self) -> &'static str { "SG100" }
///     fn triggers(&self) -> &'static [&'static str] { &["goto"] }
///
///     fn check(&self, source: &SourceFile, _guide: &StyleGuide) -> Vec<Violation> {
///         source
///             .code_lines()
///             .filter(|(_, code)| code.contains("goto "))
///             .map(|(line, _)| Violation::new("goto", Severity::Warning, line, "goto used"))
///             .collect()
///     }
/// }
/// ```
pub trait Check: Send + Sync {
    /// Returns the kebab-case name of this check (e.g., "line-length").
    fn name(&self) -> &'static str;

    /// Returns the check code (e.g., "SG002").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this check detects.
    fn description(&self) -> &'static str {
        ""
    }

    /// Lowercase keywords that activate this check when found in a rule.
    fn triggers(&self) -> &'static [&'static str];

    /// Severity of the violations this check emits.
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    /// Returns the guide rule activating this check, if any.
    fn activation<'g>(&self, guide: &'g StyleGuide) -> Option<&'g StyleGuideRule> {
        guide.find_rule(self.triggers())
    }

    /// Scans one file and returns the violations found.
    fn check(&self, source: &SourceFile, guide: &StyleGuide) -> Vec<Violation>;
}

/// Type alias for boxed Check trait objects.
pub type CheckBox = Box<dyn Check>;

#[cfg(test)]
mod tests {
    use super::*;

    struct TestCheck;

    impl Check for TestCheck {
        fn name(&self) -> &'static str {
            "test-check"
        }
        fn code(&self) -> &'static str {
            "TEST001"
        }
        fn triggers(&self) -> &'static [&'static str] {
            &["goto"]
        }

        fn check(&self, _source: &SourceFile, _guide: &StyleGuide) -> Vec<Violation> {
            vec![Violation::new(
                "goto",
                self.default_severity(),
                1,
                "Test violation",
            )]
        }
    }

    #[test]
    fn test_check_trait() {
        let check = TestCheck;
        assert_eq!(check.name(), "test-check");
        assert_eq!(check.code(), "TEST001");
        assert_eq!(check.default_severity(), Severity::Warning);
    }

    #[test]
    fn activation_follows_guide_text() {
        let with = StyleGuide::parse("WARNING\n- Never use GOTO").unwrap();
        let without = StyleGuide::parse("WARNING\n- Use nullptr").unwrap();
        assert!(TestCheck.activation(&with).is_some());
        assert!(TestCheck.activation(&without).is_none());
    }
}
