//! Shared wiring for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use trendsmith::adapter::outbound::contract::DryRunContract;
use trendsmith::adapter::outbound::memory::MemoryStore;
use trendsmith::infrastructure::bootstrap::{Adapters, AppContext};
use trendsmith::infrastructure::config::settings::Config;
use trendsmith::infrastructure::factory::source::Sources;
use trendsmith::port::outbound::contract::MarketContract;
use trendsmith::port::outbound::llm::Llm;
use trendsmith::testkit::stub::FixedScorer;

/// Dry-run configuration with no delays. The database path is unused by
/// in-memory contexts.
pub fn config() -> Config {
    trendsmith::testkit::config::dry_run(std::path::Path::new("unused.db"))
}

/// Adapters with no sources, a strongly positive scorer and no LLM.
pub fn adapters() -> Adapters {
    Adapters {
        sources: Sources::default(),
        scorer: Arc::new(FixedScorer(0.8)),
        llm: None,
        search: None,
        contract: Some(Arc::new(DryRunContract::new())),
    }
}

pub fn adapters_with_llm(llm: Arc<dyn Llm>) -> Adapters {
    Adapters {
        llm: Some(llm),
        ..adapters()
    }
}

pub fn adapters_with_contract(contract: Arc<dyn MarketContract>) -> Adapters {
    Adapters {
        contract: Some(contract),
        ..adapters()
    }
}

/// Context over an in-memory store.
pub fn context(adapters: Adapters) -> AppContext<MemoryStore> {
    AppContext::assemble(&config(), adapters, Arc::new(MemoryStore::new()))
}
