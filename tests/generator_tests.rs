//! Proposal generation with scripted text generation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use trendsmith::application::generator::{ContextGatherer, ContextSources, FALLBACK_CRITERIA};
use trendsmith::application::{GeneratorConfig, ProposalGenerator};
use trendsmith::domain::{Category, RealtimeContext, SourceKind, TopicId, TrendingTopic};
use trendsmith::port::outbound::llm::Llm;
use trendsmith::testkit::config;
use trendsmith::testkit::domain::{article, post, quote};
use trendsmith::testkit::stub::{StubLlm, StubSource};

fn empty_sources() -> ContextSources {
    ContextSources {
        social: Some(Arc::new(StubSource::new("reddit", SourceKind::Social, vec![]))),
        news: Some(Arc::new(StubSource::new("news", SourceKind::News, vec![]))),
        crypto_quotes: Some(Arc::new(StubSource::new("crypto_quotes", SourceKind::Quotes, vec![]))),
        stock_quotes: None,
    }
}

fn generator(llm: Option<Arc<dyn Llm>>, sources: ContextSources) -> ProposalGenerator {
    ProposalGenerator::new(llm, ContextGatherer::new(sources, 10), config::generator())
}

#[tokio::test]
async fn empty_adapters_yield_single_fallback() {
    let llm: Arc<dyn Llm> = Arc::new(StubLlm::failing());
    let generator = generator(Some(llm), empty_sources());

    let proposals = generator
        .generate_for_query("Will Bitcoin reach $100k?", None)
        .await;

    assert_eq!(proposals.len(), 1);
    let proposal = &proposals[0];
    assert_eq!(proposal.question(), "Will Bitcoin reach $100k?");
    assert_eq!(proposal.ai_probability(), 0.5);
    assert_eq!(proposal.ai_confidence(), 0.3);
    assert_eq!(proposal.category(), Category::General);
    assert_eq!(proposal.resolution_criteria(), FALLBACK_CRITERIA);
}

#[tokio::test]
async fn retries_until_attempts_are_spent() {
    let stub = Arc::new(StubLlm::failing());
    let llm: Arc<dyn Llm> = stub.clone();
    let generator = generator(Some(llm), empty_sources());

    let proposals = generator.generate_for_query("lunar mission", Some(2)).await;

    assert_eq!(stub.calls(), 5);
    assert_eq!(proposals.len(), 1);
    assert_eq!(
        proposals[0].question(),
        "Will the outcome related to 'lunar mission' be positive?"
    );
}

#[tokio::test]
async fn recovers_after_unparsable_output() {
    let end = (Utc::now() + Duration::days(45)).format("%Y-%m-%d").to_string();
    let stub = Arc::new(
        StubLlm::new()
            .then_reply("I cannot help with that.")
            .then_reply(format!(
                "```json\n[{{\"question\": \"Will ETH flip BTC by {end}?\", \"end_date\": \"{end}\", \
                 \"category\": \"crypto\", \"probability\": \"15%\", \"confidence\": 0.6, \
                 \"key_factors\": [\"ETF flows\", \"staking yield\"],}}]\n```"
            )),
    );
    let llm: Arc<dyn Llm> = stub.clone();
    let generator = generator(Some(llm), empty_sources());

    let proposals = generator.generate_for_query("ethereum", Some(1)).await;

    assert_eq!(stub.calls(), 2);
    assert_eq!(proposals.len(), 1);
    let proposal = &proposals[0];
    assert_eq!(proposal.category(), Category::Crypto);
    assert!((proposal.ai_probability() - 0.15).abs() < 1e-9);
    assert!((proposal.ai_confidence() - 0.6).abs() < 1e-9);
    assert_eq!(proposal.end_date().format("%Y-%m-%d").to_string(), end);
    assert_eq!(proposal.key_factors(), ["ETF flows", "staking yield"]);
}

#[tokio::test]
async fn past_end_dates_are_rewritten() {
    let llm: Arc<dyn Llm> = Arc::new(StubLlm::always(
        r#"[{"question": "Will the summit happen?", "end_date": "2020-01-01"}]"#,
    ));
    let generator = generator(Some(llm), empty_sources());

    let before = Utc::now();
    let proposals = generator.generate_for_query("summit", Some(1)).await;

    let end = proposals[0].end_date();
    assert!(end > before + Duration::days(30));
    assert!(end < Utc::now() + Duration::days(31));
}

#[tokio::test]
async fn caps_output_at_requested_count() {
    let llm: Arc<dyn Llm> = Arc::new(StubLlm::always(
        r#"[{"question": "A?"}, {"question": "B?"}, {"question": "C?"}, {"question": ""}]"#,
    ));
    let generator = generator(Some(llm), empty_sources());

    let proposals = generator.generate_for_query("letters", Some(2)).await;

    let questions: Vec<&str> = proposals.iter().map(|p| p.question()).collect();
    assert_eq!(questions, ["A?", "B?"]);
}

#[tokio::test]
async fn prompt_carries_gathered_context() {
    let stub = Arc::new(StubLlm::always(r#"{"question": "Will BTC hold $90k?"}"#));
    let llm: Arc<dyn Llm> = stub.clone();
    let sources = ContextSources {
        social: Some(Arc::new(StubSource::new(
            "reddit",
            SourceKind::Social,
            vec![post("p1", "bitcoin", "Bitcoin miners capitulate", 2)],
        ))),
        news: Some(Arc::new(StubSource::new(
            "news",
            SourceKind::News,
            vec![article("Bitcoin ETF sees inflows", "Funds add exposure")],
        ))),
        crypto_quotes: Some(Arc::new(StubSource::new(
            "crypto_quotes",
            SourceKind::Quotes,
            vec![quote("bitcoin", 91_250.0, -1.5)],
        ))),
        stock_quotes: None,
    };
    let generator = generator(Some(llm), sources);

    let context = generator.gather_context("bitcoin price").await;
    assert_eq!(context.quotes.len(), 1);
    assert_eq!(context.posts.len(), 1);
    assert_eq!(context.headlines.len(), 1);

    let proposals = generator.generate("bitcoin price", context, 1).await;
    assert_eq!(proposals[0].context().quotes.len(), 1);

    let prompt = &stub.prompts()[0];
    assert!(prompt.contains("Bitcoin miners capitulate"));
    assert!(prompt.contains("Bitcoin ETF sees inflows"));
}

#[tokio::test]
async fn topic_proposals_inherit_topic_fields() {
    let generator = generator(None, empty_sources());
    let mut topic = TrendingTopic::new(TopicId::new("reddit:t1"), "Election turnout surges", "reddit")
        .with_category(Category::Politics)
        .with_summary("Early voting doubled in three states")
        .with_related_items(vec!["Lines wrap around polling stations".into()]);
    topic.source_kinds.insert(SourceKind::Social);

    let proposal = generator.propose_from_topic(&topic).await;

    assert_eq!(proposal.topic_id(), Some(&topic.id));
    assert_eq!(proposal.context().sources, vec![SourceKind::Social]);
    assert!(proposal.question().contains("Election turnout surges"));

    let notes = &proposal.context().notes;
    assert_eq!(notes[0], "Topic: Election turnout surges");
    assert!(notes.contains(&"Summary: Early voting doubled in three states".to_string()));
    assert!(notes.contains(&"- Lines wrap around polling stations".to_string()));
}

#[tokio::test]
async fn no_llm_gives_fallback_without_calls() {
    let generator = generator(None, empty_sources());
    let proposals = generator
        .generate("quiet query", RealtimeContext::empty(), 4)
        .await;
    assert_eq!(proposals.len(), 1);
    assert_eq!(generator.provider(), None);
}

#[tokio::test]
async fn provider_error_is_retried() {
    let stub = Arc::new(
        StubLlm::new()
            .then_fail("rate limited")
            .then_reply(r#"{"question": "Will the ferry strike end by June?"}"#),
    );
    let llm: Arc<dyn Llm> = stub.clone();
    let generator = generator(Some(llm), empty_sources());

    let proposals = generator.generate_for_query("ferry strike", Some(1)).await;

    assert_eq!(stub.calls(), 2);
    assert_eq!(proposals[0].question(), "Will the ferry strike end by June?");
}

#[tokio::test]
async fn horizon_holds_against_creation_after_retries() {
    let start = Utc::now();
    let config = GeneratorConfig {
        backoff_base_ms: 1_000,
        ..config::generator()
    };
    let horizon = config.min_horizon();
    let barely = start + horizon + Duration::milliseconds(300);
    let stub = Arc::new(StubLlm::new().then_fail("timeout").then_reply(format!(
        r#"[{{"question": "Will the port reopen?", "end_date": "{}"}}]"#,
        barely.to_rfc3339()
    )));
    let llm: Arc<dyn Llm> = stub.clone();
    let generator = ProposalGenerator::new(Some(llm), ContextGatherer::new(empty_sources(), 10), config);

    let proposals = generator.generate("port strike", RealtimeContext::empty(), 1).await;

    assert_eq!(stub.calls(), 2);
    let proposal = &proposals[0];
    assert!(proposal.created_at() >= start + Duration::seconds(1));
    assert!(proposal.end_date() - proposal.created_at() > horizon);
}
