//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file with environment variable overrides
//! for sensitive values like `CONTRACT_SIGNER_KEY`.
//!
//! # Example
//!
//! ```no_run
//! use trendsmith::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use super::llm::LlmConfig;
use super::logging::LoggingConfig;
use super::service::{ScheduleConfig, SentimentConfig, ServerConfig, SourcesConfig};
use crate::adapter::outbound::contract::ContractSettings;
use crate::application::{AggregatorConfig, GeneratorConfig, ResolverConfig, WorkflowConfig};
use crate::error::{ConfigError, Result};

/// Main application configuration.
///
/// Every section is optional; an empty file yields the defaults. Load from
/// a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// HTTP server bind address.
    #[serde(default)]
    pub server: ServerConfig,

    /// LLM provider configuration.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Signal source settings.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Sentiment scorer selection.
    #[serde(default)]
    pub sentiment: SentimentConfig,

    /// Topic filtering and ranking thresholds.
    #[serde(default)]
    pub aggregator: AggregatorConfig,

    /// Proposal generation retries, context budget and defaults.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Guided creation session rules.
    #[serde(default)]
    pub workflow: WorkflowConfig,

    /// Market resolution settings.
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Pipeline cadence.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Contract endpoint and module.
    ///
    /// The signer credential is loaded from `CONTRACT_SIGNER_KEY`.
    #[serde(default)]
    pub contract: ContractSettings,

    /// Path to SQLite database file.
    ///
    /// Defaults to "trendsmith.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,

    /// Enable dry-run mode.
    ///
    /// When true, markets are kept in memory and contract writes are only
    /// logged. Defaults to false.
    #[serde(default)]
    pub dry_run: bool,
}

fn default_database_path() -> String {
    "trendsmith.db".to_string()
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn missing(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// `CONTRACT_ADDRESS` overrides `contract.address`; the signer key is
    /// only ever read from `CONTRACT_SIGNER_KEY`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        if let Some(address) = non_empty_env("CONTRACT_ADDRESS") {
            config.contract.address = Some(address);
        }
        config.contract.signer_key = non_empty_env("CONTRACT_SIGNER_KEY");

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        fn invalid(field: &'static str, reason: &str) -> crate::error::Error {
            ConfigError::InvalidValue {
                field,
                reason: reason.to_string(),
            }
            .into()
        }

        if !(0.0..=1.0).contains(&self.aggregator.min_sentiment) {
            return Err(invalid("min_sentiment", "must be between 0 and 1"));
        }
        if self.aggregator.top_k == 0 {
            return Err(invalid("top_k", "must be greater than 0"));
        }
        if self.generator.max_attempts == 0 {
            return Err(invalid("max_attempts", "must be greater than 0"));
        }
        if self.generator.default_count == 0 || self.generator.default_count > self.generator.max_count {
            return Err(invalid("default_count", "must be between 1 and max_count"));
        }
        if self.generator.context_line_limit == 0 {
            return Err(invalid("context_line_limit", "must be greater than 0"));
        }
        if !(0.0..=2.0).contains(&self.generator.temperature) {
            return Err(invalid("temperature", "must be between 0 and 2"));
        }
        if self.generator.min_horizon_minutes < 0 || self.workflow.min_horizon_minutes < 0 {
            return Err(invalid("min_horizon_minutes", "must be 0 or greater"));
        }
        if self.workflow.session_ttl_secs == 0 {
            return Err(invalid("session_ttl_secs", "must be greater than 0"));
        }
        if self.workflow.janitor_interval_secs == 0 {
            return Err(invalid("janitor_interval_secs", "must be greater than 0"));
        }
        if self.resolver.max_results == 0 {
            return Err(invalid("max_results", "must be greater than 0"));
        }
        if self.schedule.generation_interval_secs == 0 || self.schedule.resolution_interval_secs == 0 {
            return Err(invalid("schedule", "intervals must be greater than 0"));
        }
        if self.sources.http.timeout_ms == 0 {
            return Err(invalid("timeout_ms", "must be greater than 0"));
        }
        if self.llm.timeout_secs == 0 {
            return Err(invalid("llm.timeout_secs", "must be greater than 0"));
        }
        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }
        url::Url::parse(&self.contract.node_url)
            .map_err(|e| invalid("contract.node_url", &e.to_string()))?;
        for feed in &self.sources.news.feeds {
            url::Url::parse(feed).map_err(|e| invalid("sources.news.feeds", &e.to_string()))?;
        }
        Ok(())
    }

    /// Check the settings commands that talk to the contract need.
    ///
    /// Outside dry-run mode both the contract address and the signer key
    /// are required.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] naming the first missing value.
    #[allow(clippy::result_large_err)]
    pub fn require_contract(&self) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        if missing(self.contract.address.as_deref()) {
            return Err(ConfigError::MissingField {
                field: "CONTRACT_ADDRESS",
            }
            .into());
        }
        if missing(self.contract.signer_key.as_deref()) {
            return Err(ConfigError::MissingField {
                field: "CONTRACT_SIGNER_KEY",
            }
            .into());
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.database, "trendsmith.db");
        assert_eq!(config.aggregator.top_k, 5);
        assert_eq!(config.generator.max_attempts, 5);
        assert_eq!(config.workflow.session_ttl_secs, 1800);
        assert_eq!(config.schedule.generation_interval_secs, 8 * 60 * 60);
        assert!(!config.dry_run);
    }

    #[test]
    fn sections_override_defaults() {
        let config = Config::parse_toml(
            r#"
            dry_run = true
            database = "test.db"

            [server]
            port = 9000

            [aggregator]
            min_mentions = 3
            top_k = 2

            [generator]
            max_attempts = 2

            [llm]
            provider = "anthropic"

            [sources.reddit]
            subreddits = ["worldnews"]
            "#,
        )
        .unwrap();

        assert!(config.dry_run);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.aggregator.min_mentions, 3);
        assert_eq!(config.aggregator.top_k, 2);
        assert_eq!(config.generator.max_attempts, 2);
        assert_eq!(config.sources.reddit.subreddits, vec!["worldnews".to_string()]);
        assert_eq!(config.llm.provider, super::super::llm::LlmProvider::Anthropic);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let err = Config::parse_toml("[aggregator]\nmin_sentiment = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("min_sentiment"));

        let err = Config::parse_toml("[generator]\nmax_attempts = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn rejects_unparsable_urls() {
        let err = Config::parse_toml("[sources.news]\nfeeds = [\"not a url\"]\n").unwrap_err();
        assert!(err.to_string().contains("sources.news.feeds"));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(Config::parse_toml("[server\nport = 1").is_err());
    }

    #[test]
    fn dry_run_needs_no_contract() {
        let config = Config::parse_toml("dry_run = true\n").unwrap();
        assert!(config.require_contract().is_ok());
    }
}
