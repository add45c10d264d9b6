//! # style-grader-checks
//!
//! Built-in rule-based checks for style-grader.
//!
//! Every check works on plain text, with comments and literal contents
//! masked, and never fails on any input. A check only runs when the style
//! guide contains a rule mentioning one of its trigger keywords.
//!
//! ## Available Checks
//!
//! | Code | Name | Violation types | Triggers |
//! |------|------|-----------------|----------|
//! | SG001 | `indentation` | `indentation` | indent, tab |
//! | SG002 | `line-length` | `line_length` | line length, characters, long line, ... |
//! | SG003 | `brace-style` | `brace_style` | brace |
//! | SG004 | `missing-braces` | `missing_braces` | brace, single statement |
//! | SG005 | `file-header` | `file_header` | header, file comment, author |
//! | SG006 | `comments` | `no_comments`, `sparse_comments` | comment |
//! | SG007 | `memory` | `memory_leak`, `mismatched_delete`, `double_delete` | memory, delete, leak, ... |
//! | SG008 | `naming` | `naming_convention` | naming, camelcase, pascalcase, ... |
//! | SG009 | `null-sentinel` | `null_usage` | null |
//! | SG010 | `magic-numbers` | `magic_number` | magic, constant |
//!
//! ## Usage
//!
//! ```ignore
//! use style_grader_core::{Grader, StyleGuide};
//! use style_grader_checks::all_checks;
//!
//! let grader = Grader::builder()
//!     .guide(StyleGuide::parse(&guide_text)?)
//!     .checks(all_checks())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod brace_style;
pub mod comments;
pub mod file_header;
pub mod indentation;
pub mod line_length;
pub mod magic_numbers;
pub mod memory;
pub mod missing_braces;
pub mod naming;
pub mod null_sentinel;
mod presets;
mod scan;

pub use brace_style::BraceStyle;
pub use comments::Comments;
pub use file_header::FileHeader;
pub use indentation::Indentation;
pub use line_length::LineLength;
pub use magic_numbers::MagicNumbers;
pub use memory::Memory;
pub use missing_braces::MissingBraces;
pub use naming::Naming;
pub use null_sentinel::NullSentinel;
pub use presets::{all_checks, configured_checks};

/// Re-export core types for convenience.
pub use style_grader_core::{Check, Severity, Violation};
