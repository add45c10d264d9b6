//! Check for naming conventions of types and functions.
//!
//! Class, struct, union and enum names must be UpperCamelCase. Names of
//! function definitions must be lowerCamelCase; `main`, constructors,
//! destructors and operators are exempt. A definition named after a type
//! declared in the same file counts as a constructor. Prototypes ending in `;` are not
//! checked, only definitions.

use crate::scan::{is_preprocessor, matching_paren, starts_with_keyword, STATEMENT_KEYWORDS};
use regex::Regex;
use std::collections::HashSet;
use style_grader_core::{column_at, Check, Severity, SourceFile, StyleGuide, Violation};

/// Check code for naming.
pub const CODE: &str = "SG008";

/// Check name for naming.
pub const NAME: &str = "naming";

/// Violation type emitted by this check.
pub const KIND: &str = "naming_convention";

/// Flags type and function names breaking the camel-case conventions.
#[derive(Debug, Clone)]
pub struct Naming {
    type_decl: Regex,
    signature_tail: Regex,
    upper_camel: Regex,
    lower_camel: Regex,
}

impl Default for Naming {
    fn default() -> Self {
        Self::new()
    }
}

impl Naming {
    /// Creates a new check.
    #[must_use]
    pub fn new() -> Self {
        Self {
            type_decl: Regex::new(
                r"^\s*(?:template\s*<[^>]*>\s*)?(?:typedef\s+)?(?:class|struct|union|enum(?:\s+class|\s+struct)?)\s+(?:alignas\s*\([^)]*\)\s*)?([A-Za-z_]\w*)\s*(?:final\b\s*)?(?:[:{;]|$)",
            )
            .expect("Invalid regex"),
            signature_tail: Regex::new(r"^(?:(?:const|override|final|noexcept)\s*)*(?:\{.*)?$")
                .expect("Invalid regex"),
            upper_camel: Regex::new(r"^[A-Z][A-Za-z0-9]*$").expect("Invalid regex"),
            lower_camel: Regex::new(r"^[a-z][A-Za-z0-9]*$").expect("Invalid regex"),
        }
    }

    fn declared_type<'a>(&self, code: &'a str) -> Option<regex::Match<'a>> {
        self.type_decl.captures(code)?.get(1)
    }

    fn check_type(&self, line: usize, code: &str) -> Option<Violation> {
        let name = self.declared_type(code)?;
        if self.upper_camel.is_match(name.as_str()) {
            return None;
        }
        Some(
            Violation::new(
                KIND,
                Severity::Warning,
                line,
                format!(
                    "Type name `{}` should be UpperCamelCase (e.g. `{}`)",
                    name.as_str(),
                    to_camel(name.as_str(), true)
                ),
            )
            .with_column(column_at(code, name.start())),
        )
    }

    fn check_function(&self, line: usize, code: &str, types: &HashSet<&str>) -> Option<Violation> {
        let trimmed = code.trim_end();
        if trimmed.ends_with(';') || starts_with_keyword(code) {
            return None;
        }
        let open = code.find('(')?;
        let prefix = &code[..open];
        if prefix.contains(['=', '"', '\'', '<', '>', ',', '.', '-', '+', '!', '[']) {
            return None;
        }
        if let Some(close) = matching_paren(code, open) {
            if !self.signature_tail.is_match(code[close + 1..].trim()) {
                return None;
            }
        }

        let tokens: Vec<&str> = prefix
            .split(|c: char| c.is_whitespace() || c == '*' || c == '&')
            .filter(|t| !t.is_empty())
            .collect();
        // A return type must precede the name.
        let [.., _, qualified] = tokens.as_slice() else {
            return None;
        };
        let mut parts = qualified.rsplit("::");
        let name = parts.next()?;
        let owner = parts.next();

        if name.is_empty()
            || name.starts_with('~')
            || name.starts_with("operator")
            || name == "main"
            || owner == Some(name)
            || types.contains(name)
            || STATEMENT_KEYWORDS.contains(&name)
            || !name.chars().all(|c| c.is_alphanumeric() || c == '_')
            || self.lower_camel.is_match(name)
        {
            return None;
        }

        let column = prefix.rfind(name).map_or(1, |pos| column_at(code, pos));
        Some(
            Violation::new(
                KIND,
                Severity::Warning,
                line,
                format!(
                    "Function name `{name}` should be lowerCamelCase (e.g. `{}`)",
                    to_camel(name, false)
                ),
            )
            .with_column(column),
        )
    }
}

/// Rewrites `snake_case` or `PascalCase` names into camel case.
fn to_camel(name: &str, upper_first: bool) -> String {
    let mut out = String::with_capacity(name.len());
    for part in name.split('_').filter(|p| !p.is_empty()) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            if out.is_empty() && !upper_first {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    out
}

impl Check for Naming {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires UpperCamelCase types and lowerCamelCase functions"
    }

    fn triggers(&self) -> &'static [&'static str] {
        &[
            "naming",
            "camelcase",
            "pascalcase",
            "camel case",
            "pascal case",
            "identifier",
        ]
    }

    fn check(&self, source: &SourceFile, _guide: &StyleGuide) -> Vec<Violation> {
        let lines: Vec<(usize, &str)> = source
            .code_lines()
            .filter(|(_, code)| !is_preprocessor(code) && !code.trim().is_empty())
            .collect();
        let types: HashSet<&str> = lines
            .iter()
            .filter_map(|&(_, code)| self.declared_type(code))
            .map(|name| name.as_str())
            .collect();

        lines
            .iter()
            .filter_map(|&(line, code)| {
                self.check_type(line, code)
                    .or_else(|| self.check_function(line, code, &types))
            })
            .collect()
    }
}
