//! Composition root: builds every service from configuration.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::adapter::outbound::contract::DryRunContract;
use crate::adapter::outbound::predictor::HeuristicPredictor;
use crate::adapter::outbound::sqlite::SqliteStore;
use crate::application::generator::context::{ContextGatherer, ContextSources};
use crate::application::{
    MarketResolver, Pipeline, ProposalGenerator, TrendAggregator, WorkflowService,
};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::factory::source::Sources;
use crate::infrastructure::factory::{contract, llm, persistence, source};
use crate::port::outbound::contract::MarketContract;
use crate::port::outbound::llm::Llm;
use crate::port::outbound::search::WebSearch;
use crate::port::outbound::sentiment::SentimentScorer;
use crate::port::outbound::store::Store;

/// Which optional integrations are live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Integrations {
    pub llm: bool,
    pub reddit: bool,
    pub news: bool,
    pub crypto_quotes: bool,
    pub stock_quotes: bool,
    pub trends: bool,
    pub search: bool,
    pub contract: bool,
}

/// Wired services shared by the HTTP surface, the CLI and the scheduler.
pub struct AppContext<S: Store> {
    pub store: Arc<S>,
    pub sources: Sources,
    pub aggregator: Arc<TrendAggregator>,
    pub generator: Arc<ProposalGenerator>,
    pub workflow: Arc<WorkflowService<S>>,
    pub pipeline: Arc<Pipeline<S>>,
    pub integrations: Integrations,
}

/// Externally provided adapters, so tests can substitute stubs.
pub struct Adapters {
    pub sources: Sources,
    pub scorer: Arc<dyn SentimentScorer>,
    pub llm: Option<Arc<dyn Llm>>,
    pub search: Option<Arc<dyn WebSearch>>,
    /// `None` when the contract is not needed by the caller.
    pub contract: Option<Arc<dyn MarketContract>>,
}

impl<S: Store + 'static> AppContext<S> {
    /// Wire services over the given adapters and store.
    pub fn assemble(config: &Config, adapters: Adapters, store: Arc<S>) -> Self {
        let Adapters {
            sources,
            scorer,
            llm,
            search,
            contract,
        } = adapters;

        let integrations = Integrations {
            llm: llm.is_some(),
            reddit: sources.reddit.is_some(),
            news: sources.news.is_some(),
            crypto_quotes: sources.crypto_quotes.is_some(),
            stock_quotes: sources.stock_quotes.is_some(),
            trends: sources.trends.is_some(),
            search: search.is_some(),
            contract: contract.is_some(),
        };

        let mut aggregator =
            TrendAggregator::new(sources.signal_sources(), scorer, config.aggregator.clone());
        if let Some(trends) = &sources.trends {
            aggregator = aggregator.with_trends(Arc::clone(trends));
        }
        let aggregator = Arc::new(aggregator);

        let gatherer = ContextGatherer::new(
            ContextSources {
                social: sources.reddit.clone(),
                news: sources.news.clone(),
                crypto_quotes: sources.crypto_quotes.clone(),
                stock_quotes: sources.stock_quotes.clone(),
            },
            config.generator.context_item_limit,
        );
        let generator = Arc::new(ProposalGenerator::new(
            llm.clone(),
            gatherer,
            config.generator.clone(),
        ));

        let workflow = Arc::new(WorkflowService::new(
            llm.clone(),
            Arc::new(HeuristicPredictor::new()),
            Arc::clone(&store),
            config.workflow.clone(),
        ));

        let contract: Arc<dyn MarketContract> = match contract {
            Some(contract) => contract,
            None => Arc::new(DryRunContract::new()),
        };
        let resolver = Arc::new(MarketResolver::new(
            Arc::clone(&contract),
            search,
            llm,
            config.resolver.clone(),
        ));
        let pipeline = Arc::new(Pipeline::new(
            Arc::clone(&aggregator),
            Arc::clone(&generator),
            resolver,
            contract,
            Arc::clone(&store),
            Duration::from_millis(config.schedule.creation_pacing_ms),
        ));

        Self {
            store,
            sources,
            aggregator,
            generator,
            workflow,
            pipeline,
            integrations,
        }
    }
}

/// Build the production context over SQLite.
///
/// With `needs_contract`, a missing contract address or signer key outside
/// dry-run mode is an error.
#[allow(clippy::result_large_err)]
pub fn build(config: &Config, needs_contract: bool) -> Result<AppContext<SqliteStore>> {
    let contract = if needs_contract {
        Some(contract::build_contract(config)?)
    } else {
        None
    };
    let adapters = Adapters {
        sources: source::build_sources(config),
        scorer: source::build_scorer(config),
        llm: llm::build_llm_client(config),
        search: source::build_search(config),
        contract,
    };
    let store = persistence::build_store(config)?;
    let context = AppContext::assemble(config, adapters, store);
    info!(integrations = ?context.integrations, "Services ready");
    Ok(context)
}
