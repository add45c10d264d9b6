//! Shared output formatting for grading results.

use anyhow::Result;
use serde::Serialize;
use std::fmt::Write;
use std::io::IsTerminal;
use style_grader_core::{AnalysisResult, Severity};

use crate::OutputFormat;

#[derive(Serialize)]
struct JsonReport<'a> {
    files_checked: usize,
    total_violations: usize,
    results: &'a [AnalysisResult],
}

/// Print grading results in the specified format.
pub fn print(results: &[AnalysisResult], format: OutputFormat) -> Result<()> {
    let color = std::io::stdout().is_terminal();
    print!("{}", render(results, format, color)?);
    Ok(())
}

/// Renders grading results in the specified format.
pub fn render(results: &[AnalysisResult], format: OutputFormat, color: bool) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => render_text(results, color),
        OutputFormat::Pretty => render_pretty(results, color),
        OutputFormat::Json => render_json(results)?,
        OutputFormat::Compact => render_compact(results),
    })
}

fn render_text(results: &[AnalysisResult], color: bool) -> String {
    let mut out = String::new();
    for result in results {
        out.push_str(&result.format_report());
        out.push('\n');
    }
    out.push_str(&totals(results, color));
    out
}

fn render_pretty(results: &[AnalysisResult], color: bool) -> String {
    let mut out = String::new();
    for result in results {
        let content = result
            .file_path
            .as_deref()
            .and_then(|p| std::fs::read_to_string(p).ok());
        match (&result.error_message, content) {
            (None, Some(content)) => {
                for violation in &result.violations {
                    let diagnostic = violation.diagnostic(&result.file_name, &content);
                    let _ = writeln!(out, "{:?}", miette::Report::new(diagnostic));
                }
                let _ = writeln!(out, "{}", result.summary());
            }
            _ => out.push_str(&result.format_report()),
        }
        out.push('\n');
    }
    out.push_str(&totals(results, color));
    out
}

fn render_json(results: &[AnalysisResult]) -> Result<String> {
    let report = JsonReport {
        files_checked: results.len(),
        total_violations: results.iter().map(|r| r.total_violations).sum(),
        results,
    };
    let mut json = serde_json::to_string_pretty(&report)?;
    json.push('\n');
    Ok(json)
}

fn render_compact(results: &[AnalysisResult]) -> String {
    let mut out = String::new();
    for result in results {
        if let Some(message) = &result.error_message {
            let _ = writeln!(out, "{}: error: {}", result.file_name, message);
            continue;
        }
        for violation in &result.violations {
            let _ = writeln!(out, "{}:{}", result.file_name, violation);
        }
        if result.degraded {
            let _ = writeln!(out, "{}: note: semantic analysis unavailable", result.file_name);
        }
    }
    out
}

fn totals(results: &[AnalysisResult], color: bool) -> String {
    let count = |severity| results.iter().map(|r| r.count(severity)).sum::<usize>();
    let (critical, warning, minor) = (
        count(Severity::Critical),
        count(Severity::Warning),
        count(Severity::Minor),
    );
    let failed = results.iter().filter(|r| !r.is_success()).count();

    let mut line = format!(
        "Found {critical} critical, {warning} warning(s), {minor} minor in {} file(s)",
        results.len()
    );
    if failed > 0 {
        let _ = write!(line, ", {failed} could not be graded");
    }

    if !color {
        return line + "\n";
    }
    let summary_color = if critical > 0 || failed > 0 {
        "\x1b[31m"
    } else if warning > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };
    format!("{summary_color}{line}\x1b[0m\n")
}
