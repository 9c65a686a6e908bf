//! Tests for factory functions.
//!
//! Verifies that factory functions correctly build infrastructure components
//! based on configuration settings.

use crate::infrastructure::config::llm::LlmProvider;
use crate::infrastructure::config::service::SentimentProvider;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::factory::{contract, llm, persistence, source};

fn minimal_config() -> Config {
    let toml = r#"
        [logging]
        level = "info"
        format = "pretty"
    "#;
    Config::parse_toml(toml).expect("minimal config should parse")
}

// ---------------------------------------------------------------------------
// LLM Factory Tests
// ---------------------------------------------------------------------------

mod llm_factory {
    use super::*;

    #[test]
    fn returns_none_without_provider() {
        let mut config = minimal_config();
        config.llm.provider = LlmProvider::None;

        assert!(llm::build_llm_client(&config).is_none());
    }
}

// ---------------------------------------------------------------------------
// Source Factory Tests
// ---------------------------------------------------------------------------

mod source_factory {
    use super::*;

    #[test]
    fn disabled_sources_are_skipped() {
        let mut config = minimal_config();
        config.sources.reddit.enabled = false;
        config.sources.news.enabled = false;
        config.sources.quotes.enabled = false;
        config.sources.trends.enabled = false;

        let sources = source::build_sources(&config);
        assert!(sources.signal_sources().is_empty());
        assert!(sources.trends.is_none());
    }

    #[test]
    fn news_needs_no_credentials() {
        let mut config = minimal_config();
        config.sources.reddit.enabled = false;
        config.sources.quotes.enabled = false;

        let sources = source::build_sources(&config);
        assert!(sources.news.is_some());
    }

    #[test]
    fn lexicon_scorer_when_requested() {
        let mut config = minimal_config();
        config.sentiment.provider = SentimentProvider::Lexicon;

        assert_eq!(source::build_scorer(&config).name(), "lexicon");
    }
}

// ---------------------------------------------------------------------------
// Contract and Persistence Factory Tests
// ---------------------------------------------------------------------------

mod contract_factory {
    use super::*;

    #[test]
    fn dry_run_uses_in_memory_contract() {
        let mut config = minimal_config();
        config.dry_run = true;

        let contract = contract::build_contract(&config).expect("dry run contract");
        assert_eq!(contract.name(), "dry_run");
    }

    #[test]
    fn live_mode_requires_address_and_signer() {
        let mut config = minimal_config();
        config.dry_run = false;
        config.contract.address = None;
        config.contract.signer_key = None;

        assert!(contract::build_contract(&config).is_err());

        config.contract.address = Some("0x1".into());
        assert!(contract::build_contract(&config).is_err());

        config.contract.signer_key = Some("secret".into());
        assert_eq!(contract::build_contract(&config).unwrap().name(), "aptos");
    }

    #[test]
    fn store_opens_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = minimal_config();
        config.database = dir.path().join("factory.db").display().to_string();

        assert!(persistence::build_store(&config).is_ok());
    }
}
