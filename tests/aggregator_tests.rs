//! Trend aggregation over stubbed sources.

use std::sync::Arc;

use trendsmith::application::{AggregatorConfig, TrendAggregator};
use trendsmith::domain::{FetchParams, SourceKind};
use trendsmith::port::outbound::source::SignalSource;
use trendsmith::testkit::domain::{article, post, quote};
use trendsmith::testkit::stub::{FixedScorer, StubSource, StubTrends};

fn config() -> AggregatorConfig {
    AggregatorConfig {
        top_comments: 100,
        ..AggregatorConfig::default()
    }
}

fn reddit(items: Vec<trendsmith::domain::RawItem>) -> Arc<dyn SignalSource> {
    Arc::new(StubSource::new("reddit", SourceKind::Social, items))
}

#[tokio::test]
async fn keeps_only_topics_with_enough_mentions() {
    // Corpus sizes are title plus comments: 5, 5 and 50.
    let source = reddit(vec![
        post("a", "politics", "Senate schedules budget vote", 4),
        post("b", "sports", "Quarterback trade rumors grow", 4),
        post("c", "technology", "Chipmaker unveils new accelerator", 49),
    ]);
    let aggregator = TrendAggregator::new(vec![source], Arc::new(FixedScorer(0.8)), config());

    let topics = aggregator.aggregate(&FetchParams::defaults()).await;

    assert_eq!(topics.len(), 1);
    let topic = &topics[0];
    assert_eq!(topic.title, "Chipmaker unveils new accelerator");
    assert_eq!(topic.mention_count, 50);
    assert!((topic.sentiment.polarity() - 0.8).abs() < 1e-9);
    assert_eq!(topic.source, "reddit/r/technology");
    assert!(topic.analysis.market_potential > 0.0 && topic.analysis.market_potential <= 1.0);
}

#[tokio::test]
async fn weak_sentiment_is_filtered() {
    let source = reddit(vec![post("c", "technology", "Chipmaker unveils new accelerator", 49)]);
    let aggregator = TrendAggregator::new(vec![source], Arc::new(FixedScorer(0.2)), config());

    assert!(aggregator.aggregate(&FetchParams::defaults()).await.is_empty());
}

#[tokio::test]
async fn negative_lean_counts_as_strong() {
    let source = reddit(vec![post("c", "economics", "Inflation report shocks markets", 20)]);
    let aggregator = TrendAggregator::new(vec![source], Arc::new(FixedScorer(-0.9)), config());

    let topics = aggregator.aggregate(&FetchParams::defaults()).await;
    assert_eq!(topics.len(), 1);
    assert!(topics[0].sentiment.polarity() < 0.0);
}

#[tokio::test]
async fn failing_source_does_not_sink_the_pass() {
    let good = reddit(vec![post("c", "technology", "Chipmaker unveils new accelerator", 20)]);
    let bad: Arc<dyn SignalSource> = Arc::new(StubSource::failing("news", SourceKind::News));
    let aggregator = TrendAggregator::new(vec![bad, good], Arc::new(FixedScorer(0.8)), config());

    let topics = aggregator.aggregate(&FetchParams::defaults()).await;
    assert_eq!(topics.len(), 1);
}

#[tokio::test]
async fn related_news_and_quotes_widen_sources() {
    let social = reddit(vec![post("c", "cryptocurrency", "BTC rallies past resistance", 20)]);
    let news: Arc<dyn SignalSource> = Arc::new(StubSource::new(
        "news",
        SourceKind::News,
        vec![article("BTC rallies as funds pile in", "Inflows hit a record")],
    ));
    let quotes: Arc<dyn SignalSource> = Arc::new(StubSource::new(
        "crypto_quotes",
        SourceKind::Quotes,
        vec![quote("BTC", 97_000.0, 3.2)],
    ));
    let aggregator =
        TrendAggregator::new(vec![social, news, quotes], Arc::new(FixedScorer(0.8)), config());

    let topics = aggregator.aggregate(&FetchParams::defaults()).await;
    assert_eq!(topics.len(), 1);
    let kinds = &topics[0].source_kinds;
    assert!(kinds.contains(&SourceKind::Social));
    assert!(kinds.contains(&SourceKind::News));
    assert!(kinds.contains(&SourceKind::Quotes));
}

#[tokio::test]
async fn search_interest_is_attached() {
    let title = "Chipmaker unveils new accelerator";
    let source = reddit(vec![post("c", "technology", title, 20)]);
    let plain = TrendAggregator::new(vec![Arc::clone(&source)], Arc::new(FixedScorer(0.8)), config());
    let boosted = TrendAggregator::new(vec![source], Arc::new(FixedScorer(0.8)), config())
        .with_trends(Arc::new(StubTrends::new([(title.to_string(), 80.0)])));

    let base = plain.aggregate(&FetchParams::defaults()).await;
    let with_interest = boosted.aggregate(&FetchParams::defaults()).await;

    assert_eq!(with_interest[0].trend_score, 80.0);
    assert!(with_interest[0].source_kinds.contains(&SourceKind::Trends));
    assert!(with_interest[0].analysis.market_potential > base[0].analysis.market_potential);
}

#[tokio::test]
async fn headlines_stand_in_without_social_sources() {
    let news: Arc<dyn SignalSource> = Arc::new(StubSource::new(
        "news",
        SourceKind::News,
        vec![
            article("Central bank weighs rate cut", "Officials split on timing"),
            article("Rate cut odds climb after jobs data", "Traders price a cut"),
        ],
    ));
    let aggregator = TrendAggregator::new(
        vec![news],
        Arc::new(FixedScorer(0.8)),
        AggregatorConfig {
            min_mentions: 1,
            ..config()
        },
    );

    let topics = aggregator.aggregate(&FetchParams::defaults()).await;
    assert_eq!(topics.len(), 2);
    assert!(topics.iter().all(|t| t.source == "news"));
}

#[tokio::test]
async fn keeps_top_k_ranked_by_potential() {
    let source = reddit(vec![
        post("a", "technology", "Chipmaker unveils new accelerator", 12),
        post("b", "politics", "Senate schedules budget vote", 60),
        post("c", "sports", "Quarterback trade rumors grow", 30),
    ]);
    let aggregator = TrendAggregator::new(
        vec![source],
        Arc::new(FixedScorer(0.8)),
        AggregatorConfig {
            top_k: 2,
            ..config()
        },
    );

    let topics = aggregator.aggregate(&FetchParams::defaults()).await;
    assert_eq!(topics.len(), 2);
    assert_eq!(topics[0].title, "Senate schedules budget vote");
    assert_eq!(topics[1].title, "Quarterback trade rumors grow");
}
