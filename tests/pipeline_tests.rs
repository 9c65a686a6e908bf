//! Generation and resolution passes through the assembled context.

mod support;

use std::sync::Arc;

use chrono::{Duration, Utc};
use trendsmith::adapter::outbound::contract::DryRunContract;
use trendsmith::domain::{ProposalStatus, SourceKind};
use trendsmith::port::outbound::store::Store;
use trendsmith::testkit::domain::{market, post};
use trendsmith::testkit::stub::{FailingContract, StubSource};

fn social() -> Arc<StubSource> {
    Arc::new(StubSource::new(
        "reddit",
        SourceKind::Social,
        vec![
            post("a", "worldnews", "Ceasefire talks resume in Geneva", 20),
            post("b", "technology", "Chipmaker unveils new accelerator", 20),
            post("c", "sports", "Quiet offseason", 2),
        ],
    ))
}

#[tokio::test]
async fn generation_creates_one_market_per_topic() {
    let contract = Arc::new(DryRunContract::new());
    let mut adapters = support::adapters_with_contract(contract.clone());
    adapters.sources.reddit = Some(social());
    let ctx = support::context(adapters);

    let report = ctx.pipeline.generate().await;

    assert_eq!(report.topics, 2);
    assert_eq!(report.proposals, 2);
    assert_eq!(report.created, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(contract.markets().len(), 2);

    let proposals = ctx.store.list_proposals(10).await.unwrap();
    assert_eq!(proposals.len(), 2);
    assert!(proposals.iter().all(|p| p.status() == ProposalStatus::Created));
    assert!(proposals.iter().all(|p| p.topic_id().is_some()));
    assert_eq!(ctx.store.list_topics(10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn contract_failures_are_counted_not_fatal() {
    let mut adapters = support::adapters_with_contract(Arc::new(FailingContract));
    adapters.sources.reddit = Some(social());
    let ctx = support::context(adapters);

    let report = ctx.pipeline.generate().await;

    assert_eq!(report.proposals, 2);
    assert_eq!(report.created, 0);
    assert_eq!(report.failed, 2);
    let proposals = ctx.store.list_proposals(10).await.unwrap();
    assert!(proposals.iter().all(|p| p.status() == ProposalStatus::Draft));
}

#[tokio::test]
async fn empty_sources_produce_an_empty_pass() {
    let ctx = support::context(support::adapters());

    let report = ctx.pipeline.generate().await;

    assert_eq!(report.topics, 0);
    assert_eq!(report.created, 0);
}

#[tokio::test]
async fn resolution_without_search_leaves_markets_open() {
    let contract = Arc::new(DryRunContract::with_markets(vec![market(
        7,
        "Will the bridge reopen?",
        Utc::now() - Duration::days(1),
    )]));
    let ctx = support::context(support::adapters_with_contract(contract.clone()));

    let report = ctx.pipeline.resolve().await.unwrap();

    assert_eq!(report.checked, 1);
    assert_eq!(report.unclear, 1);
    assert!(!contract.markets()[0].resolved);
}
