//! Configuration types for style-grader.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration for style-grader.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// File discovery configuration.
    #[serde(default)]
    pub grader: GraderConfig,

    /// Semantic backend configuration.
    #[serde(default)]
    pub semantic: SemanticConfig,

    /// Per-check configurations.
    #[serde(default)]
    pub checks: HashMap<String, CheckConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or a value is out of range.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the grader cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.semantic.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "semantic.timeout_secs",
                message: "must be at least 1".to_string(),
            });
        }
        if self.semantic.chunk_size == 0 {
            return Err(ConfigError::Invalid {
                key: "semantic.chunk_size",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Applies `OLLAMA_HOST` and `OLLAMA_MODEL` overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        let host = std::env::var("OLLAMA_HOST").ok();
        let model = std::env::var("OLLAMA_MODEL").ok();
        self.semantic.apply_overrides(host, model);
        self
    }

    /// Checks if a check is enabled.
    #[must_use]
    pub fn is_check_enabled(&self, check_name: &str) -> bool {
        self.checks
            .get(check_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a check.
    #[must_use]
    pub fn check_severity(&self, check_name: &str) -> Option<crate::Severity> {
        self.checks.get(check_name).and_then(|c| c.severity)
    }

    /// Gets the configuration block of a check.
    #[must_use]
    pub fn check_config(&self, check_name: &str) -> Option<&CheckConfig> {
        self.checks.get(check_name)
    }
}

/// File discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraderConfig {
    /// Glob patterns of files to grade.
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Glob patterns to exclude from grading.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            include: default_include(),
            exclude: vec!["**/build/**".to_string(), "**/third_party/**".to_string()],
            respect_gitignore: true,
        }
    }
}

fn default_include() -> Vec<String> {
    ["*.cpp", "*.cc", "*.cxx", "*.c", "*.h", "*.hpp", "*.hh"]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

/// Semantic backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticConfig {
    /// Whether the semantic pass runs at all.
    #[serde(default)]
    pub enabled: bool,

    /// Base URL of the backend.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// Upper bound on one semantic call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum number of generated tokens.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Whether to attach retrieval context to requests.
    #[serde(default)]
    pub retrieval: bool,

    /// Maximum characters per retrieval chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Lines carried over from one chunk to the next.
    #[serde(default = "default_chunk_overlap_lines")]
    pub chunk_overlap_lines: usize,

    /// Number of chunks attached as context.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Reference documents indexed for retrieval, besides the guide itself.
    #[serde(default)]
    pub documents: Vec<PathBuf>,
}

impl SemanticConfig {
    /// Timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn apply_overrides(&mut self, endpoint: Option<String>, model: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|s| !s.trim().is_empty()) {
            self.endpoint = endpoint;
        }
        if let Some(model) = model.filter(|s| !s.trim().is_empty()) {
            self.model = model;
        }
    }
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            retrieval: false,
            chunk_size: default_chunk_size(),
            chunk_overlap_lines: default_chunk_overlap_lines(),
            top_k: default_top_k(),
            documents: Vec::new(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "codellama:7b".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_chunk_size() -> usize {
    500
}

fn default_chunk_overlap_lines() -> usize {
    3
}

fn default_top_k() -> usize {
    3
}

/// Per-check configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Whether this check is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this check.
    #[serde(default)]
    pub severity: Option<crate::Severity>,

    /// Check-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl CheckConfig {
    /// Gets an option value as a specific type.
    #[must_use]
    pub fn get_option<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.options
            .get(key)
            .and_then(|v| v.clone().try_into().ok())
    }

    /// Gets a positive integer option with a default value.
    #[must_use]
    pub fn get_usize(&self, key: &str, default: usize) -> usize {
        self.options
            .get(key)
            .and_then(toml::Value::as_integer)
            .and_then(|v| usize::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(default)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A value parsed but is out of range.
    #[error("Invalid config value for {key}: {message}")]
    Invalid {
        /// Dotted key of the offending value.
        key: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Severity;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.grader.respect_gitignore);
        assert!(config.checks.is_empty());
        assert!(!config.semantic.enabled);
        assert_eq!(config.semantic.model, "codellama:7b");
        assert_eq!(config.semantic.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[grader]
include = ["*.cpp"]
exclude = ["**/generated/**"]

[semantic]
enabled = true
model = "codellama:13b"
timeout_secs = 5

[checks.line-length]
severity = "WARNING"
max_length = 120

[checks.null-sentinel]
enabled = false
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.grader.include, vec!["*.cpp"]);
        assert!(config.semantic.enabled);
        assert_eq!(config.semantic.model, "codellama:13b");
        assert_eq!(config.semantic.endpoint, "http://localhost:11434");
        assert!(config.is_check_enabled("line-length"));
        assert!(!config.is_check_enabled("null-sentinel"));
        assert!(config.is_check_enabled("unknown-check"));
        assert_eq!(config.check_severity("line-length"), Some(Severity::Warning));

        let check = config.check_config("line-length").unwrap();
        assert_eq!(check.get_usize("max_length", 200), 120);
        assert_eq!(check.get_usize("missing", 7), 7);
        assert_eq!(check.get_option::<i64>("max_length"), Some(120));
    }

    #[test]
    fn non_positive_options_fall_back_to_default() {
        let config = Config::parse("[checks.file-header]\nheader_lines = 0").unwrap();
        let check = config.check_config("file-header").unwrap();
        assert_eq!(check.get_usize("header_lines", 10), 10);
    }

    #[test]
    fn invalid_toml_is_reported() {
        let err = Config::parse("[semantic\nenabled = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = Config::parse("[semantic]\nenabled = true\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "semantic.timeout_secs", .. }
        ));
        assert!(Config::parse("[semantic]\ntimeout_secs = 1\n").is_ok());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let err = Config::parse("[semantic]\nchunk_size = 0\n").unwrap_err();
        assert!(err.to_string().contains("semantic.chunk_size"));
    }

    #[test]
    fn overrides_ignore_blank_values() {
        let mut semantic = SemanticConfig::default();
        semantic.apply_overrides(Some("http://gpu:11434".into()), Some("  ".into()));
        assert_eq!(semantic.endpoint, "http://gpu:11434");
        assert_eq!(semantic.model, "codellama:7b");
    }

    #[test]
    fn retrieval_documents_are_paths() {
        let config =
            Config::parse("[semantic]\nretrieval = true\ndocuments = [\"notes/memory.md\"]\n")
                .unwrap();
        assert!(config.semantic.retrieval);
        assert_eq!(config.semantic.documents, vec![PathBuf::from("notes/memory.md")]);
        assert!(Config::default().semantic.documents.is_empty());
    }
}
