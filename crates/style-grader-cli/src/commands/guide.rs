//! Guide command implementation.

use anyhow::{Context, Result};
use std::fmt::Write;
use std::path::Path;
use style_grader_core::StyleGuide;

/// Runs the guide command.
pub fn run(file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read style guide: {}", file.display()))?;
    match StyleGuide::parse_named(file.display().to_string(), &text) {
        Ok(guide) => {
            print!("{}", describe(&guide));
            Ok(())
        }
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            std::process::exit(2);
        }
    }
}

/// Lists the rules of `guide` per severity tier.
fn describe(guide: &StyleGuide) -> String {
    let mut out = format!("{}: {} rule(s)\n", guide.name(), guide.len());
    for (severity, rules) in guide.sections() {
        let _ = writeln!(out, "\n{} ({})", severity.0, rules.len());
        for rule in rules {
            let _ = writeln!(out, "  {}  {}", rule.id.as_str(), rule.text);
        }
    }
    out
}
