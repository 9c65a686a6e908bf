//! Resolution of expired markets against stubbed search and contract.

use std::sync::Arc;

use chrono::{Duration, Utc};
use trendsmith::adapter::outbound::contract::DryRunContract;
use trendsmith::application::{MarketResolver, ResolutionReport, ResolverConfig};
use trendsmith::domain::Outcome;
use trendsmith::port::outbound::contract::MarketContract;
use trendsmith::port::outbound::llm::Llm;
use trendsmith::port::outbound::search::WebSearch;
use trendsmith::testkit::domain::market;
use trendsmith::testkit::stub::{FailingContract, StubLlm, StubSearch};

fn expired_and_open() -> Arc<DryRunContract> {
    let now = Utc::now();
    Arc::new(DryRunContract::with_markets(vec![
        market(1, "Will the rover land on schedule?", now - Duration::hours(2)),
        market(2, "Will the treaty be signed?", now + Duration::days(3)),
    ]))
}

fn resolver(
    contract: Arc<DryRunContract>,
    search: Option<Arc<dyn WebSearch>>,
    llm: Option<Arc<dyn Llm>>,
) -> MarketResolver {
    MarketResolver::new(contract, search, llm, ResolverConfig::default())
}

#[tokio::test]
async fn model_verdict_resolves_due_markets_only() {
    let contract = expired_and_open();
    let search = Arc::new(StubSearch::new(&["The rover touched down as planned."]));
    let llm = Arc::new(StubLlm::always("Yes."));
    let resolver = resolver(
        Arc::clone(&contract),
        Some(Arc::clone(&search) as Arc<dyn WebSearch>),
        Some(Arc::clone(&llm) as Arc<dyn Llm>),
    );

    let report = resolver.run(Utc::now()).await.unwrap();

    assert_eq!(
        report,
        ResolutionReport {
            checked: 1,
            resolved: 1,
            unclear: 0,
            failed: 0
        }
    );
    let markets = contract.markets();
    assert!(markets[0].resolved);
    assert_eq!(markets[0].outcome, Outcome::Yes);
    assert!(!markets[1].resolved);

    let queries = search.queries();
    assert_eq!(queries.len(), 1);
    assert!(queries[0].starts_with("Will the rover land on schedule?"));
    assert!(llm.prompts()[0].contains("The rover touched down as planned."));
}

#[tokio::test]
async fn unclear_verdict_leaves_market_open() {
    let contract = expired_and_open();
    let search: Arc<dyn WebSearch> = Arc::new(StubSearch::new(&["Coverage is mixed."]));
    let llm: Arc<dyn Llm> = Arc::new(StubLlm::always("Unclear, sources disagree"));
    let resolver = resolver(Arc::clone(&contract), Some(search), Some(llm));

    let report = resolver.run(Utc::now()).await.unwrap();

    assert_eq!(report.checked, 1);
    assert_eq!(report.unclear, 1);
    assert_eq!(contract.get_open_markets().await.unwrap().len(), 2);
}

#[tokio::test]
async fn keyword_vote_stands_in_for_failed_model() {
    let contract = expired_and_open();
    let search: Arc<dyn WebSearch> = Arc::new(StubSearch::new(&[
        "Mission failed after descent anomaly",
        "Officials say the landing failed",
        "The team won praise for the attempt",
    ]));
    let llm: Arc<dyn Llm> = Arc::new(StubLlm::failing());
    let resolver = resolver(Arc::clone(&contract), Some(search), Some(llm));

    let report = resolver.run(Utc::now()).await.unwrap();

    assert_eq!(report.resolved, 1);
    assert_eq!(contract.markets()[0].outcome, Outcome::No);
}

#[tokio::test]
async fn search_failure_is_counted() {
    let contract = expired_and_open();
    let search: Arc<dyn WebSearch> = Arc::new(StubSearch::failing());
    let resolver = resolver(Arc::clone(&contract), Some(search), None);

    let report = resolver.run(Utc::now()).await.unwrap();

    assert_eq!(report.checked, 1);
    assert_eq!(report.failed, 1);
    assert!(!contract.markets()[0].resolved);
}

#[tokio::test]
async fn no_search_backend_leaves_everything_unclear() {
    let contract = expired_and_open();
    let resolver = resolver(Arc::clone(&contract), None, None);

    let report = resolver.run(Utc::now() + Duration::days(5)).await.unwrap();

    assert_eq!(report.checked, 2);
    assert_eq!(report.unclear, 2);
    assert_eq!(report.resolved, 0);
}

#[tokio::test]
async fn unreadable_contract_fails_the_pass() {
    let contract: Arc<dyn MarketContract> = Arc::new(FailingContract);
    let resolver = MarketResolver::new(contract, None, None, ResolverConfig::default());

    assert!(resolver.run(Utc::now()).await.is_err());
}
