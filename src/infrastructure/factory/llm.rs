//! LLM client factory.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::adapter::outbound::llm::anthropic::Anthropic;
use crate::adapter::outbound::llm::openai::OpenAi;
use crate::infrastructure::config::llm::LlmProvider;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::llm::Llm;

/// Build LLM client from configuration.
///
/// Returns `None` if no provider is selected or its API key is missing.
pub fn build_llm_client(config: &Config) -> Option<Arc<dyn Llm>> {
    let timeout = Duration::from_secs(config.llm.timeout_secs);
    let client: Arc<dyn Llm> = match config.llm.provider {
        LlmProvider::None => {
            info!("No LLM provider configured, using fallbacks");
            return None;
        }
        LlmProvider::Anthropic => {
            let api_key = match std::env::var("ANTHROPIC_API_KEY") {
                Ok(key) if !key.trim().is_empty() => key,
                _ => {
                    warn!("ANTHROPIC_API_KEY not set, text generation disabled");
                    return None;
                }
            };
            Arc::new(Anthropic::new(api_key, &config.llm.anthropic.model, timeout))
        }
        LlmProvider::OpenAi => {
            let api_key = match std::env::var("OPENAI_API_KEY") {
                Ok(key) if !key.trim().is_empty() => key,
                _ => {
                    warn!("OPENAI_API_KEY not set, text generation disabled");
                    return None;
                }
            };
            Arc::new(OpenAi::new(api_key, &config.llm.openai.model, timeout))
        }
    };

    info!(provider = client.name(), "LLM client initialized");
    Some(client)
}
