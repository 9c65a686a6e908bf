//! Trending topics and their classification.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::TopicId;
use super::sentiment::Sentiment;
use super::text;

/// Topic category. Every topic has one; unknown subjects are `General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Crypto,
    Tech,
    Politics,
    Sports,
    Economics,
    #[default]
    General,
}

const CRYPTO_WORDS: &[&str] = &[
    "bitcoin", "btc", "ethereum", "eth", "crypto", "cryptocurrency", "blockchain", "solana",
    "aptos", "defi", "nft", "token", "stablecoin", "altcoin", "dogecoin", "binance", "coinbase",
];
const TECH_WORDS: &[&str] = &[
    "ai", "apple", "google", "microsoft", "openai", "software", "chip", "chips", "nvidia",
    "iphone", "android", "tech", "technology", "startup", "robot", "tesla", "meta", "gpu",
];
const POLITICS_WORDS: &[&str] = &[
    "election", "president", "senate", "congress", "vote", "voters", "poll", "minister",
    "parliament", "trump", "biden", "democrat", "republican", "campaign", "governor", "bill",
];
const SPORTS_WORDS: &[&str] = &[
    "nba", "nfl", "mlb", "nhl", "fifa", "soccer", "football", "basketball", "tennis", "olympics",
    "championship", "playoffs", "league", "cup", "match", "season", "tournament",
];
const ECONOMICS_WORDS: &[&str] = &[
    "fed", "inflation", "rates", "rate", "gdp", "recession", "economy", "stock", "stocks",
    "market", "unemployment", "jobs", "earnings", "treasury", "cpi", "dow", "nasdaq",
];

impl Category {
    /// All categories in declaration order.
    pub const ALL: [Category; 6] = [
        Category::Crypto,
        Category::Tech,
        Category::Politics,
        Category::Sports,
        Category::Economics,
        Category::General,
    ];

    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Crypto => "crypto",
            Category::Tech => "tech",
            Category::Politics => "politics",
            Category::Sports => "sports",
            Category::Economics => "economics",
            Category::General => "general",
        }
    }

    fn vocabulary(self) -> &'static [&'static str] {
        match self {
            Category::Crypto => CRYPTO_WORDS,
            Category::Tech => TECH_WORDS,
            Category::Politics => POLITICS_WORDS,
            Category::Sports => SPORTS_WORDS,
            Category::Economics => ECONOMICS_WORDS,
            Category::General => &[],
        }
    }

    /// Keyword classifier: the category whose vocabulary has the most
    /// whole-word hits in `text`. Ties resolve in declaration order.
    /// No hits at all yields `General`.
    #[must_use]
    pub fn classify(text: &str) -> Self {
        let tokens: Vec<String> = text::tokens(text).collect();
        let mut best = (Category::General, 0usize);
        for category in Category::ALL {
            let hits = tokens
                .iter()
                .filter(|t| category.vocabulary().contains(&t.as_str()))
                .count();
            if hits > best.1 {
                best = (category, hits);
            }
        }
        best.0
    }

    /// Map a community name (subreddit) to a category.
    #[must_use]
    pub fn from_community(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "technology" | "tech" | "programming" => Some(Category::Tech),
            "politics" | "worldnews" | "news" => Some(Category::Politics),
            "sports" | "nba" | "nfl" | "soccer" => Some(Category::Sports),
            "cryptocurrency" | "bitcoin" | "ethereum" | "crypto" => Some(Category::Crypto),
            "economics" | "stocks" | "investing" | "wallstreetbets" => Some(Category::Economics),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = std::convert::Infallible;

    /// Lenient parse; anything unrecognized is `General`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "crypto" | "cryptocurrency" => Category::Crypto,
            "tech" | "technology" => Category::Tech,
            "politics" => Category::Politics,
            "sports" | "sport" => Category::Sports,
            "economics" | "economy" | "finance" | "business" => Category::Economics,
            _ => Category::General,
        })
    }
}

/// Kind of signal source that contributed to a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Social,
    News,
    Trends,
    Quotes,
}

impl SourceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SourceKind::Social => "social",
            SourceKind::News => "news",
            SourceKind::Trends => "trends",
            SourceKind::Quotes => "quotes",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-topic analysis, every field in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TopicAnalysis {
    pub market_potential: f64,
    pub predictability: f64,
    pub engagement: f64,
    pub sentiment_strength: f64,
}

impl TopicAnalysis {
    /// Build an analysis, clamping every field into `[0, 1]`.
    #[must_use]
    pub fn new(
        market_potential: f64,
        predictability: f64,
        engagement: f64,
        sentiment_strength: f64,
    ) -> Self {
        let unit = |v: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            market_potential: unit(market_potential),
            predictability: unit(predictability),
            engagement: unit(engagement),
            sentiment_strength: unit(sentiment_strength),
        }
    }
}

/// Maximum number of related items carried on a topic.
pub const MAX_RELATED_ITEMS: usize = 10;

/// A candidate subject for a market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingTopic {
    pub id: TopicId,
    pub title: String,
    pub summary: String,
    pub category: Category,
    /// Label of the originating source (e.g. `reddit/r/politics`).
    pub source: String,
    /// Non-negative raw engagement on the source's own scale.
    pub engagement: f64,
    pub created_at: DateTime<Utc>,
    pub keywords: BTreeSet<String>,
    pub related_items: Vec<String>,
    pub analysis: TopicAnalysis,
    pub sentiment: Sentiment,
    pub mention_count: usize,
    pub trend_score: f64,
    pub source_kinds: BTreeSet<SourceKind>,
}

impl TrendingTopic {
    /// Start a topic with the required fields; the rest default to empty.
    pub fn new(id: TopicId, title: impl Into<String>, source: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            id,
            keywords: text::keywords(&title),
            category: Category::classify(&title),
            title,
            summary: String::new(),
            source: source.into(),
            engagement: 0.0,
            created_at: Utc::now(),
            related_items: Vec::new(),
            analysis: TopicAnalysis::default(),
            sentiment: Sentiment::NEUTRAL,
            mention_count: 0,
            trend_score: 0.0,
            source_kinds: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Negative or non-finite engagement is stored as zero.
    #[must_use]
    pub fn with_engagement(mut self, engagement: f64) -> Self {
        self.engagement = if engagement.is_finite() { engagement.max(0.0) } else { 0.0 };
        self
    }

    /// Related items beyond [`MAX_RELATED_ITEMS`] are dropped.
    #[must_use]
    pub fn with_related_items(mut self, items: Vec<String>) -> Self {
        self.related_items = items.into_iter().take(MAX_RELATED_ITEMS).collect();
        self
    }

    /// Deduplication key of the title.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        text::normalize_title(&self.title)
    }
}
