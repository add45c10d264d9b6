//! Prompt construction for the review request.

use std::fmt::Write;
use style_grader_core::SemanticRequest;

/// Violation types the rule-based checks emit.
///
/// Reusing these names lets semantic findings collapse onto rule-based ones
/// during reconciliation.
pub const KNOWN_TYPES: &[&str] = &[
    "indentation",
    "line_length",
    "brace_style",
    "missing_braces",
    "file_header",
    "no_comments",
    "sparse_comments",
    "memory_leak",
    "mismatched_delete",
    "double_delete",
    "naming_convention",
    "null_usage",
    "magic_number",
];

/// Builds the review prompt for `request`.
///
/// The code is numbered so the model can cite exact lines.
#[must_use]
pub fn build_prompt(request: &SemanticRequest) -> String {
    let mut prompt = String::with_capacity(request.source.len() * 2 + request.guide_text.len());

    prompt.push_str(
        "You are a strict C++ code reviewer grading a student submission against a style guide.\n\n",
    );
    prompt.push_str("STYLE GUIDE:\n");
    prompt.push_str(request.guide_text.trim_end());
    prompt.push_str("\n\n");

    if let Some(context) = request.context.as_deref().filter(|c| !c.trim().is_empty()) {
        prompt.push_str("ADDITIONAL CONTEXT:\n");
        prompt.push_str(context.trim_end());
        prompt.push_str("\n\n");
    }

    prompt.push_str("CODE:\n");
    for (index, line) in request.source.lines().enumerate() {
        let _ = writeln!(prompt, "{:>4} | {}", index + 1, line);
    }

    prompt.push_str(
        "\nReport every violation of the style guide, one per line, in exactly this format:\n\
         LINE <line number> | <CRITICAL|WARNING|MINOR> | <type> | <description>\n\n",
    );
    prompt.push_str("Use the severity the style guide assigns to the broken rule. Prefer these types: ");
    prompt.push_str(&KNOWN_TYPES.join(", "));
    prompt.push_str(".\nIf there are no violations, reply with NONE. Do not add any other text.\n");

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_numbers_code_lines() {
        let request = SemanticRequest::new("int a;\nint b;\n", "WARNING\n- Use nullptr");
        let prompt = build_prompt(&request);
        assert!(prompt.contains("STYLE GUIDE:\nWARNING\n- Use nullptr\n"));
        assert!(prompt.contains("   1 | int a;\n   2 | int b;\n"));
        assert!(prompt.contains("LINE <line number> | <CRITICAL|WARNING|MINOR> | <type> | <description>"));
        assert!(prompt.contains("null_usage"));
    }

    #[test]
    fn context_section_only_when_present() {
        let request = SemanticRequest::new("int a;", "MINOR\n- x");
        assert!(!build_prompt(&request).contains("ADDITIONAL CONTEXT"));

        let blank = request.clone().with_context(Some("  \n".into()));
        assert!(!build_prompt(&blank).contains("ADDITIONAL CONTEXT"));

        let with = request.with_context(Some("Prefer std::unique_ptr.".into()));
        assert!(build_prompt(&with).contains("ADDITIONAL CONTEXT:\nPrefer std::unique_ptr.\n"));
    }
}
