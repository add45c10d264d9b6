//! HTTP client for an Ollama-compatible server.

use crate::prompt::build_prompt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use style_grader_core::{SemanticConfig, SemanticError, SemanticRequest, SemanticService};
use tracing::debug;

/// A model advertised by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelInfo {
    /// Model tag, e.g. `codellama:7b`.
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Semantic service backed by Ollama's `/api/generate`.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    /// Creates a client for `endpoint` using `model`.
    ///
    /// # Errors
    ///
    /// Returns [`SemanticError::Transport`] if the HTTP client cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SemanticError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SemanticError::Transport(e.to_string()))?;
        let endpoint = endpoint.into().trim_end_matches('/').to_string();

        Ok(Self {
            http,
            endpoint,
            model: model.into(),
            timeout,
        })
    }

    /// Creates a client from the `[semantic]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`SemanticError::Transport`] if the HTTP client cannot be built.
    pub fn from_config(config: &SemanticConfig) -> Result<Self, SemanticError> {
        Self::new(&config.endpoint, &config.model, config.timeout())
    }

    /// Server base URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Model used for generation.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    fn map_error(&self, error: &reqwest::Error) -> SemanticError {
        if error.is_timeout() {
            SemanticError::Timeout(self.timeout)
        } else if error.is_decode() {
            SemanticError::Decode(error.to_string())
        } else {
            SemanticError::Transport(error.to_string())
        }
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, SemanticError> {
        let status = response.status();
        if !status.is_success() {
            return Err(SemanticError::Status(status.as_u16()));
        }
        let body = response.text().await.map_err(|e| self.map_error(&e))?;
        serde_json::from_str(&body).map_err(|e| SemanticError::Decode(e.to_string()))
    }

    /// Lists the models installed on the server (`GET /api/tags`).
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable or answers badly.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, SemanticError> {
        let response = self
            .http
            .get(self.url("api/tags"))
            .send()
            .await
            .map_err(|e| self.map_error(&e))?;
        let tags: TagsResponse = self.read_json(response).await?;
        Ok(tags.models)
    }

    /// Returns true if the server answers the model listing.
    pub async fn check_connection(&self) -> bool {
        match self.list_models().await {
            Ok(_) => true,
            Err(e) => {
                debug!("Ollama at {} not reachable: {}", self.endpoint, e);
                false
            }
        }
    }

    /// Returns true if a model whose name contains the configured one is installed.
    ///
    /// # Errors
    ///
    /// Returns an error if the model listing fails.
    pub async fn has_model(&self) -> Result<bool, SemanticError> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|m| m.name.contains(&self.model)))
    }

    /// Sends a raw prompt (`POST /api/generate`) and returns the generated text.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout, transport failure, non-success status or
    /// an undecodable body.
    pub async fn generate(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, SemanticError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature,
                num_predict: max_tokens,
            },
        };
        debug!(
            "POST {} (model {}, {} prompt bytes)",
            self.url("api/generate"),
            self.model,
            prompt.len()
        );

        let response = self
            .http
            .post(self.url("api/generate"))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_error(&e))?;
        let generated: GenerateResponse = self.read_json(response).await?;
        Ok(generated.response)
    }
}

impl SemanticService for OllamaClient {
    async fn review(&self, request: &SemanticRequest) -> Result<String, SemanticError> {
        let prompt = build_prompt(request);
        self.generate(&prompt, request.temperature, request.max_tokens)
            .await
    }
}
