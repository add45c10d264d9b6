//! Check sets ready to hand to a grader.

use crate::{
    BraceStyle, Comments, FileHeader, Indentation, LineLength, MagicNumbers, Memory,
    MissingBraces, Naming, NullSentinel,
};
use style_grader_core::{CheckBox, Config};
use tracing::debug;

/// Returns every built-in check with default settings, in code order.
///
/// Which of them actually run is decided by the style guide.
#[must_use]
pub fn all_checks() -> Vec<CheckBox> {
    configured_checks(&Config::default())
}

/// Returns every built-in check with options read from `config`.
///
/// Recognised options:
/// - `[checks.line-length] max_length`
/// - `[checks.file-header] header_lines`
/// - `[checks.comments] lines_per_comment`
#[must_use]
pub fn configured_checks(config: &Config) -> Vec<CheckBox> {
    let option = |check: &str, key: &str, default: usize| {
        let value = config
            .check_config(check)
            .map_or(default, |c| c.get_usize(key, default));
        if value != default {
            debug!("{}: {} = {}", check, key, value);
        }
        value
    };

    vec![
        Box::new(Indentation::new()),
        Box::new(LineLength::new().max_length(option(
            crate::line_length::NAME,
            "max_length",
            crate::line_length::DEFAULT_MAX_LENGTH,
        ))),
        Box::new(BraceStyle::new()),
        Box::new(MissingBraces::new()),
        Box::new(FileHeader::new().header_lines(option(
            crate::file_header::NAME,
            "header_lines",
            crate::file_header::DEFAULT_HEADER_LINES,
        ))),
        Box::new(Comments::new().lines_per_comment(option(
            crate::comments::NAME,
            "lines_per_comment",
            crate::comments::DEFAULT_LINES_PER_COMMENT,
        ))),
        Box::new(Memory::new()),
        Box::new(Naming::new()),
        Box::new(NullSentinel::new()),
        Box::new(MagicNumbers::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use style_grader_core::{SourceFile, StyleGuide};

    #[test]
    fn codes_are_unique_and_ordered() {
        let checks = all_checks();
        let codes: Vec<&str> = checks.iter().map(|c| c.code()).collect();
        assert_eq!(
            codes,
            vec![
                "SG001", "SG002", "SG003", "SG004", "SG005", "SG006", "SG007", "SG008", "SG009",
                "SG010"
            ]
        );
    }

    #[test]
    fn options_come_from_config() {
        let config = Config::parse("[checks.line-length]\nmax_length = 10\n").unwrap();
        let guide = StyleGuide::parse("MINOR\n- Lines must not exceed 10 characters").unwrap();
        let source = SourceFile::new("t.cpp", "int value = compute();\n");

        let checks = configured_checks(&config);
        let line_length = checks.iter().find(|c| c.name() == "line-length").unwrap();
        assert_eq!(line_length.check(&source, &guide).len(), 1);

        let defaults = all_checks();
        let line_length = defaults.iter().find(|c| c.name() == "line-length").unwrap();
        assert!(line_length.check(&source, &guide).is_empty());
    }
}
