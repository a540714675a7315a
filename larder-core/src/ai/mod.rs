//! AI provider abstraction for recipe parsing, generation, normalization,
//! price estimation, and receipt reading.
//!
//! A trait-based provider boundary keeps the Anthropic client swappable and
//! lets tests run against canned responses.

mod assistant;
mod claude;
mod config;
mod fake;
pub mod prompts;

pub use assistant::{
    estimate_prices, generate_recipe, normalize_ingredients, parse_receipt_images,
    parse_recipe_text, parse_recipe_url, suggest_week, MealSuggestion, NormalizationResult,
    ReceiptItem,
};
pub use claude::ClaudeProvider;
pub use config::{AiConfig, ConfigError, DEFAULT_MODEL};
pub use fake::FakeProvider;

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

/// Error type for AI operations. Malformed model output is not an error:
/// the assistant operations return empty results for that, so an `Err` here
/// always means the call itself failed.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// A base64-encoded image sent alongside a prompt (receipt photos).
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ImageAttachment {
    /// MIME type, e.g. "image/jpeg" or "image/png".
    pub media_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

/// Trait for text-generation providers.
///
/// Implementations should be stateless and thread-safe. Requests are
/// synchronous round-trips with no internal retry or timeout; cancellation
/// is the caller's concern.
#[async_trait]
pub trait LlmProvider: Send + Sync + fmt::Debug {
    /// Send a prompt and get the model's text response.
    async fn complete(&self, prompt: &str) -> Result<String, AiError>;

    /// Send a prompt with image attachments and get the text response.
    async fn complete_with_images(
        &self,
        prompt: &str,
        images: &[ImageAttachment],
    ) -> Result<String, AiError>;

    /// Provider name (e.g. "claude", "fake").
    fn provider_name(&self) -> &'static str;

    /// Model name in use.
    fn model_name(&self) -> &str;
}
