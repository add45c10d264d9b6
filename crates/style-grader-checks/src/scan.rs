//! Small text helpers shared by the checks.
//!
//! All helpers operate on masked code lines, where comments and literal
//! contents are already blanked.

/// Words that start a statement rather than a declaration.
pub(crate) const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "do", "switch", "case", "default", "return", "break",
    "continue", "goto", "throw", "try", "catch", "new", "delete", "using", "typedef",
    "sizeof", "co_return", "co_await", "co_yield", "static_assert",
];

/// Preprocessor directive (`#include`, `#define`, ...).
pub(crate) fn is_preprocessor(code: &str) -> bool {
    code.trim_start().starts_with('#')
}

/// Strips leading whitespace and closing braces, so `} else if` reads as `else if`.
pub(crate) fn after_closing_braces(code: &str) -> &str {
    code.trim_start().trim_start_matches(['}', ' ', '\t'])
}

/// First identifier-like word of a line.
pub(crate) fn first_word(code: &str) -> &str {
    let code = after_closing_braces(code);
    let end = code
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(code.len());
    &code[..end]
}

/// Whether a line starts with a statement keyword.
pub(crate) fn starts_with_keyword(code: &str) -> bool {
    STATEMENT_KEYWORDS.contains(&first_word(code))
}

/// Byte offset of the `)` matching the `(` at `open`, within one line.
pub(crate) fn matching_paren(code: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in code.char_indices().skip_while(|(i, _)| *i < open) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_after_closing_brace() {
        assert_eq!(first_word("  } else if (x) {"), "else");
        assert!(starts_with_keyword("return foo(1);"));
        assert!(!starts_with_keyword("int main() {"));
        assert_eq!(first_word(""), "");
    }

    #[test]
    fn matches_nested_parens() {
        let code = "if (f(a) && (b)) x();";
        assert_eq!(matching_paren(code, 3), Some(15));
        assert_eq!(matching_paren("while (a", 6), None);
    }

    #[test]
    fn detects_preprocessor() {
        assert!(is_preprocessor("  #include <vector>"));
        assert!(!is_preprocessor("int x; // #"));
    }
}
