//! AI configuration, loaded once at process start and passed to the
//! components that need it.

use std::env;
use thiserror::Error;

/// Default model for all assistant operations.
pub const DEFAULT_MODEL: &str = "claude-opus-4-5-20251101";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// AI client configuration.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Anthropic API key.
    pub api_key: String,
    /// Model name.
    pub model: String,
}

impl AiConfig {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `ANTHROPIC_API_KEY`
    ///
    /// Optional:
    /// - `LARDER_AI_MODEL` (default: claude-opus-4-5-20251101)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("ANTHROPIC_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("ANTHROPIC_API_KEY".to_string()))?;
        let model = env::var("LARDER_AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self { api_key, model })
    }
}
