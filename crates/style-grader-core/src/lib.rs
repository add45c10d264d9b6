//! # style-grader-core
//!
//! Core framework for grading source files against a plain-text style guide.
//!
//! This crate provides the foundational traits and types for building
//! style graders. It includes:
//!
//! - [`StyleGuide`] for parsing severity-tiered guide text into rules
//! - [`Check`] trait for rule-based, text-only heuristics
//! - [`SemanticService`] trait for an external language-understanding backend
//! - [`reconcile`] for merging both sources into one deduplicated list
//! - [`Grader`] for orchestrating a grading run
//! - [`AnalysisResult`] for the final per-file report
//!
//! ## Example
//!
//! ```ignore
//! use style_grader_core::{Grader, StyleGuide};
//!
//! let guide = StyleGuide::parse(&std::fs::read_to_string("guide.txt")?)?;
//! let grader = Grader::builder()
//!     .guide(guide)
//!     .check(MyCheck::new())
//!     .build()?;
//!
//! let result = grader.grade_rules_only("main.cpp", &source);
//! print!("{}", result.format_report());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod check;
mod config;
mod grader;
mod guide;
mod reconcile;
mod report;
mod source;
mod types;

/// Contract and record parsing for the semantic backend.
pub mod semantic;

pub use check::{Check, CheckBox};
pub use config::{CheckConfig, Config, ConfigError, GraderConfig, SemanticConfig};
pub use grader::{Grader, GraderBuilder, GraderError};
pub use guide::{RuleId, StyleGuide, StyleGuideError, StyleGuideRule};
pub use reconcile::{max_severity, reconcile};
pub use report::{now_ms, AnalysisResult, AnalysisStatus, EpochMs, LineGroup};
pub use semantic::{
    ContextSource, NoSemantic, SemanticError, SemanticOutcome, SemanticRequest, SemanticService,
};
pub use source::{column_at, SourceFile};
pub use types::{Origin, ParseSeverityError, Severity, Violation, ViolationDiagnostic};
