//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# style-grader configuration

[grader]
# Glob patterns of files to grade
include = ["*.cpp", "*.cc", "*.cxx", "*.c", "*.h", "*.hpp", "*.hh"]

# Glob patterns to exclude from grading
exclude = [
    "**/build/**",
    "**/third_party/**",
]

# Respect .gitignore files
respect_gitignore = true

[semantic]
# Ask a local model to review each file as well (or pass --semantic)
enabled = false
endpoint = "http://localhost:11434"   # OLLAMA_HOST overrides
model = "codellama:7b"                # OLLAMA_MODEL overrides
timeout_secs = 60
temperature = 0.1
max_tokens = 2048

# Attach the best matching guide excerpts and reference documents
retrieval = false
chunk_size = 500
chunk_overlap_lines = 3
top_k = 3
# documents = ["docs/course-notes.md"]

# Check configurations
# Each check can be disabled and have its severity overridden.
# Checks only run when the style guide mentions them.

[checks.line-length]
max_length = 200
# severity = "WARNING"

[checks.file-header]
header_lines = 10

[checks.comments]
lines_per_comment = 20

# [checks.magic-numbers]
# enabled = false
"#;

/// Name of the generated configuration file.
pub const CONFIG_NAME: &str = "style-grader.toml";

/// Runs the init command in `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_NAME} to configure checks and the semantic backend");
    println!("  2. Run: style-grader check --guide <GUIDE>");

    Ok(())
}
