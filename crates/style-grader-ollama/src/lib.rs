//! # style-grader-ollama
//!
//! Semantic review backend for style-grader.
//!
//! This crate plugs a locally hosted model into the grader. It implements
//! the `style-grader-core` contracts and adds:
//!
//! - [`OllamaClient`], a [`SemanticService`] talking to an Ollama-compatible
//!   `/api/generate` endpoint, with connection and model checks
//! - [`build_prompt`] for the review prompt
//! - [`ChunkIndex`], a keyword retrieval index usable as a [`ContextSource`]
//!
//! ```ignore
//! use style_grader_ollama::{ChunkIndex, OllamaClient};
//!
//! let client = OllamaClient::from_config(&config.semantic)?;
//! let mut index = ChunkIndex::from_config(&config.semantic);
//! index.add_document("guide", &guide_text);
//!
//! let grader = Grader::builder()
//!     .guide(guide)
//!     .checks(all_checks())
//!     .semantic(client)
//!     .context_source(Arc::new(index))
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod prompt;
pub mod retrieval;

pub use client::{ModelInfo, OllamaClient};
pub use prompt::{build_prompt, KNOWN_TYPES};
pub use retrieval::{chunk_document, Chunk, ChunkIndex};

pub use style_grader_core::{ContextSource, SemanticService};
