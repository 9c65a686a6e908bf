//! Text-generation port.
//!
//! Generation is treated as an opaque capability that may fail, time out
//! or return text that does not follow the requested shape. Callers must
//! validate everything they read from it.

use async_trait::async_trait;

use crate::error::Result;

/// Per-request generation settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    /// Sampling temperature.
    pub temperature: f64,
    /// Upper bound on generated tokens.
    pub max_output_tokens: usize,
    /// Ask the provider for raw JSON output.
    pub structured_output: bool,
}

impl GenerationOptions {
    /// Free-text output.
    #[must_use]
    pub const fn text(temperature: f64, max_output_tokens: usize) -> Self {
        Self {
            temperature,
            max_output_tokens,
            structured_output: false,
        }
    }

    /// JSON output.
    #[must_use]
    pub const fn json(temperature: f64, max_output_tokens: usize) -> Self {
        Self {
            temperature,
            max_output_tokens,
            structured_output: true,
        }
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::text(0.7, 1024)
    }
}

/// System instruction added when structured output is requested.
pub const STRUCTURED_OUTPUT_INSTRUCTION: &str =
    "Respond with raw JSON only. Do not wrap it in code fences or add commentary.";

/// Client for large language model text generation.
///
/// Implementations wrap specific providers (OpenAI, Anthropic) and handle
/// authentication, request shaping and response parsing.
///
/// # Errors
///
/// [`generate`](Self::generate) returns an error for API failures,
/// timeouts, or responses without any text.
#[async_trait]
pub trait Llm: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &'static str;

    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String>;
}
