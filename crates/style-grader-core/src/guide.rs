//! Style guide parsing.
//!
//! A guide is plain text with ALL-CAPS section headers and `-`/`*` bullet
//! rules:
//!
//! ```text
//! CRITICAL
//! - Every allocation with new must be released with delete
//!
//! WARNING RULES
//! * Use nullptr instead of NULL
//! ```
//!
//! Headers are mapped to a [`Severity`] by substring containment. Bullets
//! under a header naming no tier are dropped.

use crate::types::Severity;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Errors produced while parsing a style guide.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
pub enum StyleGuideError {
    /// The guide text is empty or whitespace only.
    #[error("style guide is empty")]
    #[diagnostic(
        code(style_grader::guide::empty),
        help("Provide a guide with CRITICAL, WARNING or MINOR sections")
    )]
    Empty,

    /// No bullet rule was found under a recognised section.
    #[error("style guide contains no rules ({headers} section header(s) found)")]
    #[diagnostic(
        code(style_grader::guide::no_rules),
        help("Add `- rule` bullets under CRITICAL, WARNING or MINOR headers")
    )]
    NoRules {
        /// Number of header lines seen, recognised or not.
        headers: usize,
    },
}

/// Stable identifier of a rule: hash of its section name and text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    /// Hashes `(section, text)`.
    #[must_use]
    pub fn compute(section: &str, text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(section.as_bytes());
        hasher.update([0u8]);
        hasher.update(text.as_bytes());
        let digest = hex::encode(hasher.finalize());
        Self(digest[..16].to_string())
    }

    /// Returns the hex form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One normative statement of a style guide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleGuideRule {
    /// Stable identifier.
    pub id: RuleId,
    /// Severity tier of the containing section.
    pub severity: Severity,
    /// Header text of the containing section.
    pub section: String,
    /// Rule text without the bullet marker.
    pub text: String,
}

impl StyleGuideRule {
    /// Reference string attached to violations this rule triggers.
    #[must_use]
    pub fn reference(&self) -> String {
        format!("{}: {}", self.section, self.text)
    }
}

/// A parsed, severity-ranked style guide.
///
/// Immutable after parsing; share it behind an `Arc` across analyses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleGuide {
    name: String,
    rules: Vec<StyleGuideRule>,
    raw: String,
}

impl StyleGuide {
    /// Parses a guide named `default`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is empty or yields no rules.
    pub fn parse(text: &str) -> Result<Self, StyleGuideError> {
        Self::parse_named("default", text)
    }

    /// Parses a guide with an explicit name.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is empty or yields no rules.
    pub fn parse_named(name: impl Into<String>, text: &str) -> Result<Self, StyleGuideError> {
        if text.trim().is_empty() {
            return Err(StyleGuideError::Empty);
        }

        let mut rules = Vec::new();
        let mut seen = HashSet::new();
        let mut headers = 0;
        let mut current: Option<(Severity, String)> = None;

        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(rest) = strip_bullet(trimmed) {
                let Some((severity, section)) = &current else {
                    continue;
                };
                let rule_text = rest.trim();
                if !rule_text.chars().any(char::is_alphanumeric) {
                    continue;
                }
                let id = RuleId::compute(section, rule_text);
                if !seen.insert(id.clone()) {
                    debug!("Ignoring duplicate rule in {}: {}", section, rule_text);
                    continue;
                }
                rules.push(StyleGuideRule {
                    id,
                    severity: *severity,
                    section: section.clone(),
                    text: rule_text.to_string(),
                });
            } else if is_header(trimmed) {
                headers += 1;
                current = Severity::from_header(trimmed).map(|s| (s, trimmed.to_string()));
                if current.is_none() {
                    debug!("Ignoring unrecognised section: {}", trimmed);
                }
            }
        }

        if rules.is_empty() {
            return Err(StyleGuideError::NoRules { headers });
        }

        Ok(Self {
            name: name.into(),
            rules,
            raw: text.to_string(),
        })
    }

    /// Name given at parse time.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All rules in document order.
    #[must_use]
    pub fn rules(&self) -> &[StyleGuideRule] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Always false for a successfully parsed guide.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Original guide text.
    #[must_use]
    pub fn raw_text(&self) -> &str {
        &self.raw
    }

    /// Rules of one tier, in document order.
    #[must_use]
    pub fn rules_by_severity(&self, severity: Severity) -> Vec<&StyleGuideRule> {
        self.rules
            .iter()
            .filter(|r| r.severity == severity)
            .collect()
    }

    /// Rules grouped by tier, most severe first.
    #[must_use]
    pub fn sections(&self) -> BTreeMap<std::cmp::Reverse<Severity>, Vec<&StyleGuideRule>> {
        let mut sections: BTreeMap<_, Vec<_>> = BTreeMap::new();
        for rule in &self.rules {
            sections
                .entry(std::cmp::Reverse(rule.severity))
                .or_default()
                .push(rule);
        }
        sections
    }

    /// First rule whose text contains any keyword, case-insensitively.
    #[must_use]
    pub fn find_rule(&self, keywords: &[&str]) -> Option<&StyleGuideRule> {
        self.rules.iter().find(|rule| {
            let text = rule.text.to_lowercase();
            keywords.iter().any(|k| text.contains(&k.to_lowercase()))
        })
    }

    /// Normalised rendering of the rules, grouped by tier.
    #[must_use]
    pub fn relevant_text(&self) -> String {
        use std::fmt::Write;
        let mut out = String::new();
        for (severity, rules) in self.sections() {
            let _ = writeln!(out, "{}", severity.0);
            for rule in rules {
                let _ = writeln!(out, "- {}", rule.text);
            }
            out.push('\n');
        }
        out.trim_end().to_string()
    }
}

fn strip_bullet(line: &str) -> Option<&str> {
    line.strip_prefix('-').or_else(|| line.strip_prefix('*'))
}

/// A header has letters and no lowercase characters.
fn is_header(line: &str) -> bool {
    line.chars().any(char::is_alphabetic) && !line.chars().any(char::is_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUIDE: &str = "\
CODE STYLE GUIDE

CRITICAL RULES
- Every new must have a matching delete
- Comment your code

WARNING
* Use nullptr instead of NULL
  - Do not mix tabs and spaces for indentation

GENERAL NOTES
- This bullet belongs to an unknown section

MINOR
- Lines should not exceed 100 characters
";

    #[test]
    fn parses_rules_into_tiers() {
        let guide = StyleGuide::parse(GUIDE).unwrap();
        assert_eq!(guide.len(), 5);
        assert_eq!(guide.rules_by_severity(Severity::Critical).len(), 2);
        assert_eq!(guide.rules_by_severity(Severity::Warning).len(), 2);
        assert_eq!(guide.rules_by_severity(Severity::Minor).len(), 1);
        assert_eq!(guide.rules()[0].section, "CRITICAL RULES");
        assert_eq!(guide.rules()[2].text, "Use nullptr instead of NULL");
        assert_eq!(
            guide.rules()[3].text,
            "Do not mix tabs and spaces for indentation"
        );
    }

    #[test]
    fn unknown_sections_drop_their_bullets() {
        let guide = StyleGuide::parse(GUIDE).unwrap();
        assert!(guide
            .rules()
            .iter()
            .all(|r| !r.text.contains("unknown section")));
    }

    #[test]
    fn bullets_before_any_header_are_dropped() {
        let guide = StyleGuide::parse("- orphan rule\nWARNING\n- kept").unwrap();
        assert_eq!(guide.len(), 1);
        assert_eq!(guide.rules()[0].text, "kept");
    }

    #[test]
    fn duplicate_rules_collapse() {
        let guide = StyleGuide::parse("MINOR\n- Same rule\n- Same rule\n* Same rule").unwrap();
        assert_eq!(guide.len(), 1);
    }

    #[test]
    fn identical_rules_share_ids_across_guides() {
        let a = StyleGuide::parse("WARNING\n- Use nullptr").unwrap();
        let b = StyleGuide::parse("MINOR\n- x\nWARNING\n- Use nullptr").unwrap();
        assert_eq!(a.rules()[0].id, b.rules()[1].id);
        assert_ne!(a.rules()[0].id, b.rules()[0].id);
    }

    #[test]
    fn same_text_in_different_sections_differs() {
        let guide = StyleGuide::parse("WARNING\n- Rule\nMINOR\n- Rule").unwrap();
        assert_eq!(guide.len(), 2);
        assert_ne!(guide.rules()[0].id, guide.rules()[1].id);
    }

    #[test]
    fn empty_guide_fails() {
        assert_eq!(StyleGuide::parse("  \n\n"), Err(StyleGuideError::Empty));
    }

    #[test]
    fn guide_without_rules_fails() {
        let err = StyleGuide::parse("CRITICAL\nWARNING\njust prose here").unwrap_err();
        assert_eq!(err, StyleGuideError::NoRules { headers: 2 });
    }

    #[test]
    fn guide_with_only_unknown_sections_fails() {
        let err = StyleGuide::parse("NOTES\n- a\n- b").unwrap_err();
        assert_eq!(err, StyleGuideError::NoRules { headers: 1 });
    }

    #[test]
    fn headers_accept_punctuation_and_crlf() {
        let guide = StyleGuide::parse("## CRITICAL: MEMORY ##\r\n- Free memory\r\n").unwrap();
        assert_eq!(guide.rules()[0].severity, Severity::Critical);
        assert_eq!(guide.rules()[0].text, "Free memory");
    }

    #[test]
    fn find_rule_matches_keywords_case_insensitively() {
        let guide = StyleGuide::parse(GUIDE).unwrap();
        let rule = guide.find_rule(&["NULLPTR"]).unwrap();
        assert_eq!(rule.severity, Severity::Warning);
        assert!(guide.find_rule(&["goto"]).is_none());
    }

    #[test]
    fn relevant_text_groups_by_tier() {
        let guide = StyleGuide::parse("MINOR\n- b\nCRITICAL\n- a").unwrap();
        assert_eq!(guide.relevant_text(), "CRITICAL\n- a\n\nMINOR\n- b");
    }

    #[test]
    fn raw_text_is_kept() {
        let guide = StyleGuide::parse_named("team", GUIDE).unwrap();
        assert_eq!(guide.raw_text(), GUIDE);
        assert_eq!(guide.name(), "team");
    }
}
