//! LLM provider configuration.
//!
//! Selects the text-generation provider used for proposal drafting, intent
//! classification and resolution.

use serde::Deserialize;

/// LLM provider configuration.
///
/// API keys are read from environment variables (`ANTHROPIC_API_KEY` or
/// `OPENAI_API_KEY`) at runtime. A missing key disables generation and the
/// services fall back to their deterministic paths.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// LLM provider to use. Defaults to OpenAI.
    #[serde(default)]
    pub provider: LlmProvider,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Anthropic-specific settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// OpenAI-specific settings.
    #[serde(default)]
    pub openai: OpenAiConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            timeout_secs: default_timeout_secs(),
            anthropic: AnthropicConfig::default(),
            openai: OpenAiConfig::default(),
        }
    }
}

/// LLM provider selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Anthropic Claude models.
    Anthropic,
    /// OpenAI GPT models.
    #[default]
    OpenAi,
    /// No provider; every caller uses its fallback.
    None,
}

/// Anthropic-specific configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicConfig {
    /// Model identifier.
    #[serde(default = "default_anthropic_model")]
    pub model: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            model: default_anthropic_model(),
        }
    }
}

/// OpenAI-specific configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    /// Model identifier.
    #[serde(default = "default_openai_model")]
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: default_openai_model(),
        }
    }
}

fn default_anthropic_model() -> String {
    "claude-3-5-sonnet-20241022".into()
}

fn default_openai_model() -> String {
    "gpt-4o".into()
}

const fn default_timeout_secs() -> u64 {
    60
}
