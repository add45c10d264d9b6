//! Merging rule-based and semantic violations into one list.

use crate::types::{Severity, Violation};
use std::collections::HashSet;
use tracing::debug;

/// Merges both sources into one deduplicated list sorted by line.
///
/// Rule-based violations are authoritative and always kept. A semantic
/// violation is dropped when a rule-based one, or an earlier semantic one,
/// already holds its `(line, type)` key. The sort is stable, so violations on
/// the same line keep their discovery order: rule-based first, then semantic.
#[must_use]
pub fn reconcile(rule_based: Vec<Violation>, semantic: Vec<Violation>) -> Vec<Violation> {
    let mut keys: HashSet<(usize, String)> = rule_based
        .iter()
        .map(|v| (v.line, v.kind.clone()))
        .collect();

    let mut merged = rule_based;
    let mut dropped = 0;
    for violation in semantic {
        if keys.insert((violation.line, violation.kind.clone())) {
            merged.push(violation);
        } else {
            dropped += 1;
        }
    }
    if dropped > 0 {
        debug!("Dropped {} duplicate semantic violation(s)", dropped);
    }

    merged.sort_by_key(|v| v.line);
    merged
}

/// Representative severity of a group of violations: the highest one.
#[must_use]
pub fn max_severity<'a, I>(violations: I) -> Option<Severity>
where
    I: IntoIterator<Item = &'a Violation>,
{
    violations.into_iter().map(|v| v.severity).max()
}
