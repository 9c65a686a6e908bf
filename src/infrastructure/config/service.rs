//! Service configuration for the HTTP server, signal sources, sentiment
//! scoring and the pipeline schedule.

use serde::Deserialize;

use crate::adapter::outbound::http::HttpSettings;
use crate::adapter::outbound::source::{NewsSettings, QuoteSettings, RedditSettings, TrendsSettings};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}

const fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `host:port` to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Signal source configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesConfig {
    /// Client timeouts, retries and pacing shared by every source.
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub reddit: RedditSettings,
    #[serde(default)]
    pub news: NewsSettings,
    #[serde(default)]
    pub trends: TrendsSettings,
    #[serde(default)]
    pub quotes: QuoteSettings,
}

/// Sentiment scorer selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentProvider {
    /// Hosted model when `HUGGINGFACE_API_TOKEN` is set, lexicon otherwise.
    #[default]
    Auto,
    HuggingFace,
    Lexicon,
}

/// Sentiment scorer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SentimentConfig {
    #[serde(default)]
    pub provider: SentimentProvider,
    /// Hosted text-classification model.
    #[serde(default = "default_sentiment_model")]
    pub model: String,
}

fn default_sentiment_model() -> String {
    crate::adapter::outbound::sentiment::huggingface::DEFAULT_MODEL.into()
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            provider: SentimentProvider::default(),
            model: default_sentiment_model(),
        }
    }
}

/// Pipeline schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Run the scheduler alongside the HTTP server.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Run both cycles once at startup.
    #[serde(default = "default_true")]
    pub run_on_start: bool,
    #[serde(default = "default_generation_interval_secs")]
    pub generation_interval_secs: u64,
    #[serde(default = "default_resolution_interval_secs")]
    pub resolution_interval_secs: u64,
    /// Pause between consecutive market creations.
    #[serde(default = "default_creation_pacing_ms")]
    pub creation_pacing_ms: u64,
}

const fn default_true() -> bool {
    true
}

const fn default_generation_interval_secs() -> u64 {
    8 * 60 * 60
}

const fn default_resolution_interval_secs() -> u64 {
    60 * 60
}

const fn default_creation_pacing_ms() -> u64 {
    2000
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            run_on_start: true,
            generation_interval_secs: default_generation_interval_secs(),
            resolution_interval_secs: default_resolution_interval_secs(),
            creation_pacing_ms: default_creation_pacing_ms(),
        }
    }
}
