//! Anthropic Claude LLM client.
//!
//! Provides an implementation of the [`Llm`] trait for the Anthropic
//! Messages API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::port::outbound::llm::{GenerationOptions, Llm, STRUCTURED_OUTPUT_INSTRUCTION};

/// Anthropic Messages API endpoint.
const API_URL: &str = "https://api.anthropic.com/v1/messages";

/// API version header value.
const API_VERSION: &str = "2023-06-01";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Anthropic Claude API client.
#[derive(Debug)]
pub struct Anthropic {
    /// HTTP client for API requests.
    client: Client,
    /// API key for authentication.
    api_key: String,
    /// Model identifier (e.g., "claude-3-5-haiku-latest").
    model: String,
    /// Upper bound on one request, including reading the body.
    timeout: Duration,
}

impl Anthropic {
    /// Create a new Anthropic client with explicit configuration.
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            timeout,
        }
    }

    /// Create a client from the `ANTHROPIC_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set.
    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            Error::Config(crate::error::ConfigError::MissingField {
                field: "ANTHROPIC_API_KEY",
            })
        })?;
        Ok(Self::new(api_key, model, DEFAULT_TIMEOUT))
    }

    fn build_request(&self, prompt: &str, options: &GenerationOptions) -> Request {
        Request {
            model: self.model.clone(),
            max_tokens: options.max_output_tokens,
            // Anthropic caps temperature at 1.0.
            temperature: options.temperature.clamp(0.0, 1.0),
            system: options
                .structured_output
                .then(|| STRUCTURED_OUTPUT_INSTRUCTION.to_string()),
            messages: vec![Message {
                role: "user",
                content: prompt.to_string(),
            }],
        }
    }

    async fn send(&self, request: &Request) -> Result<Response> {
        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Connection(e.to_string()))?
            .json::<Response>()
            .await?;
        Ok(response)
    }
}

#[derive(Serialize)]
struct Request {
    model: String,
    max_tokens: usize,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct Response {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

impl Response {
    fn into_text(self) -> Option<String> {
        let text: String = self.content.into_iter().map(|c| c.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[async_trait]
impl Llm for Anthropic {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let request = self.build_request(prompt, options);
        let response = tokio::time::timeout(self.timeout, self.send(&request))
            .await
            .map_err(|_| Error::Timeout(self.timeout))??;

        response
            .into_text()
            .ok_or_else(|| Error::Llm("anthropic returned no text".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Anthropic {
        Anthropic::new("test-key", "claude-3-5-haiku-latest", Duration::from_secs(5))
    }

    #[test]
    fn test_request_serialization_without_system() {
        let request = client().build_request("Hello", &GenerationOptions::text(0.5, 256));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "claude-3-5-haiku-latest");
        assert_eq!(json["max_tokens"], 256);
        assert_eq!(json["temperature"], 0.5);
        assert!(json.get("system").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn test_structured_output_sets_system_prompt() {
        let request = client().build_request("Hello", &GenerationOptions::json(1.4, 256));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["system"], STRUCTURED_OUTPUT_INSTRUCTION);
        assert_eq!(json["temperature"], 1.0);
    }

    #[test]
    fn test_response_joins_text_blocks() {
        let json = r#"{
            "id": "msg_123",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "[{\"question\": "},
                {"type": "text", "text": "\"Will it rain?\"}]"}
            ],
            "stop_reason": "end_turn"
        }"#;

        let response: Response = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.into_text().as_deref(),
            Some(r#"[{"question": "Will it rain?"}]"#)
        );
    }

    #[test]
    fn test_empty_content_yields_no_text() {
        let response: Response = serde_json::from_str(r#"{"content": []}"#).unwrap();
        assert!(response.into_text().is_none());
    }

    #[test]
    fn test_client_name() {
        assert_eq!(client().name(), "anthropic");
    }

    #[test]
    fn test_from_env_missing_key() {
        std::env::remove_var("ANTHROPIC_API_KEY");

        let err = Anthropic::from_env("claude-3-5-haiku-latest").unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }
}
