//! # style-grader
//!
//! Grades C++ source files against a severity-tiered style guide.
//!
//! This is the facade crate that re-exports the engine, the built-in checks
//! and the Ollama backend.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! let result = style_grader::grade_rules_only("main.cpp", &source, &guide_text);
//! println!("{}", result.format_report());
//! ```
//!
//! ## With a semantic backend
//!
//! ```rust,ignore
//! use style_grader::ollama::OllamaClient;
//!
//! let client = OllamaClient::from_config(&config.semantic)?;
//! let result = style_grader::grade_with(client, "main.cpp", &source, &guide_text).await;
//! if result.degraded {
//!     eprintln!("semantic review unavailable, showing rule-based findings only");
//! }
//! ```
//!
//! ## Reusing a guide across files
//!
//! ```rust,ignore
//! let grader = style_grader::grader_for(&guide_text)?;
//! for (name, source) in files {
//!     let result = grader.grade(name, source).await;
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use style_grader_core::*;

/// Built-in checks and presets.
pub mod checks {
    pub use style_grader_checks::*;
}

/// Ollama semantic backend and retrieval context.
pub mod ollama {
    pub use style_grader_ollama::*;
}

/// Builds a grader running every built-in check under `guide_text`.
///
/// # Errors
///
/// Returns [`GraderError::Guide`] if the guide has no rules.
pub fn grader_for(guide_text: &str) -> Result<Grader, GraderError> {
    let guide = StyleGuide::parse(guide_text)?;
    GraderBuilder::new()
        .guide(guide)
        .checks(checks::all_checks())
        .build()
}

/// Grades one source text with the built-in checks only.
///
/// A guide that cannot be parsed yields an error-status result.
#[must_use]
pub fn grade_rules_only(name: &str, source: &str, guide_text: &str) -> AnalysisResult {
    match grader_for(guide_text) {
        Ok(grader) => grader.grade_rules_only(name, source),
        Err(e) => {
            tracing::warn!("Cannot grade {}: {}", name, e);
            AnalysisResult::failed(name, &e)
        }
    }
}

/// Grades one source text with the built-in checks and `service`.
///
/// A guide that cannot be parsed yields an error-status result; a failing
/// service yields the rule-based findings marked as degraded.
pub async fn grade_with<S: SemanticService>(
    service: S,
    name: &str,
    source: &str,
    guide_text: &str,
) -> AnalysisResult {
    let grader = match StyleGuide::parse(guide_text) {
        Ok(guide) => GraderBuilder::new()
            .guide(guide)
            .checks(checks::all_checks())
            .semantic(service)
            .build(),
        Err(e) => Err(e.into()),
    };
    match grader {
        Ok(grader) => grader.grade(name, source).await,
        Err(e) => {
            tracing::warn!("Cannot grade {}: {}", name, e);
            AnalysisResult::failed(name, &e)
        }
    }
}
