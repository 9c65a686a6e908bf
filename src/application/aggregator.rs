//! Trend aggregation.
//!
//! Fans out to every configured signal source, turns posts (or headlines
//! when no social source exists) into candidates, scores each candidate's
//! text corpus and keeps the top few by confidence.
//!
//! ```text
//! SignalSource x N --(join)--> candidates --> mention filter
//!                                         --> SentimentScorer --> sentiment filter
//!                                         --> TrendInterestSource
//!                                         --> confidence, sort, dedupe, top K
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::domain::{
    confidence_score, text, Category, FetchParams, NewsArticle, Quote, RawItem, ScoreInputs,
    Sentiment, SocialPost, SourceKind, TopicAnalysis, TopicId, TrendingTopic,
};
use crate::port::outbound::sentiment::SentimentScorer;
use crate::port::outbound::source::{SignalSource, TrendInterestSource};

/// Trend keywords are sent upstream truncated to this length.
const MAX_TREND_KEYWORD_CHARS: usize = 100;

/// Aggregation thresholds.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorConfig {
    /// Candidates with a smaller corpus are dropped.
    #[serde(default = "default_min_mentions")]
    pub min_mentions: usize,
    /// Candidates with a weaker lean (absolute polarity) are dropped.
    #[serde(default = "default_min_sentiment")]
    pub min_sentiment: f64,
    /// Number of topics kept after ranking.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Comments per post counted into the corpus.
    #[serde(default = "default_top_comments")]
    pub top_comments: usize,
}

const fn default_min_mentions() -> usize {
    10
}

const fn default_min_sentiment() -> f64 {
    0.6
}

const fn default_top_k() -> usize {
    5
}

const fn default_top_comments() -> usize {
    10
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            min_mentions: default_min_mentions(),
            min_sentiment: default_min_sentiment(),
            top_k: default_top_k(),
            top_comments: default_top_comments(),
        }
    }
}

/// Items returned by one source.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub source: &'static str,
    pub kind: SourceKind,
    pub items: Vec<RawItem>,
}

/// A scored-but-unfiltered topic under construction.
struct Candidate {
    id: TopicId,
    title: String,
    summary: String,
    source: String,
    community: Option<String>,
    engagement: f64,
    created_at: DateTime<Utc>,
    corpus: Vec<String>,
    related_news: usize,
    kinds: BTreeSet<SourceKind>,
}

/// Combines signal sources into a ranked set of [`TrendingTopic`]s.
pub struct TrendAggregator {
    sources: Vec<Arc<dyn SignalSource>>,
    trends: Option<Arc<dyn TrendInterestSource>>,
    scorer: Arc<dyn SentimentScorer>,
    config: AggregatorConfig,
}

impl TrendAggregator {
    pub fn new(
        sources: Vec<Arc<dyn SignalSource>>,
        scorer: Arc<dyn SentimentScorer>,
        config: AggregatorConfig,
    ) -> Self {
        Self {
            sources,
            trends: None,
            scorer,
            config,
        }
    }

    /// Attach an external interest source.
    #[must_use]
    pub fn with_trends(mut self, trends: Arc<dyn TrendInterestSource>) -> Self {
        self.trends = Some(trends);
        self
    }

    #[must_use]
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Fetch from every source concurrently. A failing source yields an
    /// empty batch.
    pub async fn collect(&self, params: &FetchParams) -> Vec<SourceBatch> {
        let fetches = self.sources.iter().map(|source| async move {
            let items = match source.fetch(params).await {
                Ok(items) => items,
                Err(err) => {
                    warn!(source = source.name(), error = %err, "Source fetch failed");
                    Vec::new()
                }
            };
            SourceBatch {
                source: source.name(),
                kind: source.kind(),
                items,
            }
        });
        join_all(fetches).await
    }

    /// Run one aggregation pass.
    pub async fn aggregate(&self, params: &FetchParams) -> Vec<TrendingTopic> {
        let batches = self.collect(params).await;
        let has_social = self.sources.iter().any(|s| s.kind() == SourceKind::Social);
        self.rank(batches, has_social).await
    }

    /// Score and rank already collected batches.
    pub async fn rank(&self, batches: Vec<SourceBatch>, has_social: bool) -> Vec<TrendingTopic> {
        let (posts, articles, quotes) = split(batches);
        let mut candidates: Vec<Candidate> = if has_social {
            posts
                .iter()
                .map(|(source, post)| self.from_post(source, post, &articles, &quotes))
                .collect()
        } else {
            articles
                .iter()
                .map(|(source, article)| self.from_article(source, article, &articles, &quotes))
                .collect()
        };
        let total = candidates.len();

        candidates.retain(|c| {
            let keep = c.corpus.len() >= self.config.min_mentions;
            if !keep {
                debug!(title = %c.title, mentions = c.corpus.len(), "Insufficient mentions");
            }
            keep
        });

        let sentiments = join_all(candidates.iter().map(|c| self.scorer.score(&c.corpus))).await;
        let mut scored: Vec<(Candidate, Sentiment)> = candidates
            .into_iter()
            .zip(sentiments)
            .filter(|(c, s)| {
                let keep = s.magnitude() >= self.config.min_sentiment;
                if !keep {
                    debug!(title = %c.title, sentiment = s.polarity(), "Sentiment too weak");
                }
                keep
            })
            .collect();

        let interest = self.interest(&scored).await;
        let mut topics: Vec<TrendingTopic> = scored
            .drain(..)
            .map(|(candidate, sentiment)| {
                let trend = interest
                    .get(&trend_keyword(&candidate.title))
                    .copied()
                    .unwrap_or(0.0);
                build_topic(candidate, sentiment, trend)
            })
            .collect();

        topics.sort_by(|a, b| {
            b.analysis
                .market_potential
                .partial_cmp(&a.analysis.market_potential)
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    b.engagement
                        .partial_cmp(&a.engagement)
                        .unwrap_or(Ordering::Equal)
                })
        });
        let mut seen = HashSet::new();
        topics.retain(|t| seen.insert(t.dedup_key()));
        topics.truncate(self.config.top_k);

        info!(candidates = total, topics = topics.len(), "Aggregation complete");
        topics
    }

    async fn interest(&self, scored: &[(Candidate, Sentiment)]) -> HashMap<String, f64> {
        let Some(trends) = &self.trends else {
            return HashMap::new();
        };
        if scored.is_empty() {
            return HashMap::new();
        }
        let keywords: Vec<String> = scored
            .iter()
            .map(|(c, _)| trend_keyword(&c.title))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        match trends.interest(&keywords).await {
            Ok(map) => map,
            Err(err) => {
                warn!(source = trends.name(), error = %err, "Trend interest failed");
                HashMap::new()
            }
        }
    }

    fn from_post(
        &self,
        source: &str,
        post: &SocialPost,
        articles: &[(&'static str, NewsArticle)],
        quotes: &[Quote],
    ) -> Candidate {
        let mut corpus = vec![post.title.clone()];
        if !post.body.trim().is_empty() {
            corpus.push(post.body.clone());
        }
        corpus.extend(post.comments.iter().take(self.config.top_comments).cloned());

        let mut kinds = BTreeSet::from([SourceKind::Social]);
        let related_news = attach_related(&post.title, None, articles, quotes, &mut corpus, &mut kinds);
        let label = if post.community.is_empty() {
            source.to_string()
        } else {
            format!("{source}/r/{}", post.community)
        };
        Candidate {
            id: TopicId::for_source(source, &post.id),
            title: post.title.clone(),
            summary: text::truncate_chars(post.body.trim(), 280).to_string(),
            source: label,
            community: Some(post.community.clone()),
            engagement: post.score.max(0) as f64,
            created_at: post.created_at.unwrap_or_else(Utc::now),
            corpus,
            related_news,
            kinds,
        }
    }

    fn from_article(
        &self,
        source: &str,
        article: &NewsArticle,
        articles: &[(&'static str, NewsArticle)],
        quotes: &[Quote],
    ) -> Candidate {
        let mut corpus = vec![article.title.clone()];
        if !article.summary.trim().is_empty() {
            corpus.push(article.summary.clone());
        }
        let mut kinds = BTreeSet::from([SourceKind::News]);
        let related_news = attach_related(
            &article.title,
            Some(&text::normalize_title(&article.title)),
            articles,
            quotes,
            &mut corpus,
            &mut kinds,
        );
        Candidate {
            id: TopicId::for_source(source, &text::normalize_title(&article.title)),
            title: article.title.clone(),
            summary: text::truncate_chars(article.summary.trim(), 280).to_string(),
            source: source.to_string(),
            community: None,
            engagement: related_news as f64,
            created_at: article.published.unwrap_or_else(Utc::now),
            corpus,
            related_news,
            kinds,
        }
    }
}

type Split = (
    Vec<(&'static str, SocialPost)>,
    Vec<(&'static str, NewsArticle)>,
    Vec<Quote>,
);

fn split(batches: Vec<SourceBatch>) -> Split {
    let mut posts = Vec::new();
    let mut articles = Vec::new();
    let mut quotes = Vec::new();
    for batch in batches {
        for item in batch.items {
            match item {
                RawItem::SocialPost(p) => posts.push((batch.source, p)),
                RawItem::NewsArticle(a) => articles.push((batch.source, a)),
                RawItem::Quote(q) => quotes.push(q),
            }
        }
    }
    (posts, articles, quotes)
}

/// Append related headlines and matching quotes to the corpus. Returns the
/// number of related articles.
fn attach_related(
    title: &str,
    skip_key: Option<&str>,
    articles: &[(&'static str, NewsArticle)],
    quotes: &[Quote],
    corpus: &mut Vec<String>,
    kinds: &mut BTreeSet<SourceKind>,
) -> usize {
    let keywords = text::keywords(title);
    let mut related = 0;
    for (_, article) in articles {
        if skip_key.is_some_and(|key| text::normalize_title(&article.title) == key) {
            continue;
        }
        let matches = keywords.iter().any(|k| {
            text::contains_word(&article.title, k) || text::contains_word(&article.summary, k)
        });
        if !matches {
            continue;
        }
        related += 1;
        corpus.push(article.title.clone());
        if !article.summary.trim().is_empty() {
            corpus.push(article.summary.clone());
        }
    }
    if related > 0 {
        kinds.insert(SourceKind::News);
    }

    for quote in quotes {
        if text::contains_word(title, &quote.symbol) {
            kinds.insert(SourceKind::Quotes);
            corpus.push(RawItem::Quote(quote.clone()).headline());
        }
    }
    related
}

fn trend_keyword(title: &str) -> String {
    text::truncate_chars(title.trim(), MAX_TREND_KEYWORD_CHARS).to_string()
}

fn build_topic(mut candidate: Candidate, sentiment: Sentiment, trend_score: f64) -> TrendingTopic {
    if trend_score > 0.0 {
        candidate.kinds.insert(SourceKind::Trends);
    }
    let mention_count = candidate.corpus.len();
    let confidence = confidence_score(&ScoreInputs::new(
        sentiment.polarity(),
        mention_count as f64,
        trend_score,
        candidate.kinds.len(),
    ));

    let mut category = Category::classify(&candidate.title);
    if category == Category::General {
        if let Some(from_community) = candidate
            .community
            .as_deref()
            .and_then(Category::from_community)
        {
            category = from_community;
        }
    }

    let analysis = TopicAnalysis::new(
        confidence,
        candidate.related_news as f64 / 5.0,
        (1.0 + candidate.engagement).ln() / (1.0 + 10_000.0_f64).ln(),
        sentiment.magnitude(),
    );

    let mut topic = TrendingTopic::new(candidate.id, candidate.title, candidate.source)
        .with_summary(candidate.summary)
        .with_category(category)
        .with_engagement(candidate.engagement)
        .with_related_items(candidate.corpus);
    topic.created_at = candidate.created_at;
    topic.analysis = analysis;
    topic.sentiment = sentiment;
    topic.mention_count = mention_count;
    topic.trend_score = if trend_score.is_finite() { trend_score.max(0.0) } else { 0.0 };
    topic.source_kinds = candidate.kinds;
    topic
}
