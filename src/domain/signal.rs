//! Raw items produced by signal sources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::topic::SourceKind;

/// A popular community post with its top comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialPost {
    pub id: String,
    pub title: String,
    pub body: String,
    pub score: i64,
    pub comment_count: u64,
    pub comments: Vec<String>,
    pub community: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// A headline from a news feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub summary: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
    pub feed: String,
}

/// Asset class of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Crypto,
    Stock,
}

/// A market price quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change_percent: f64,
    pub asset_class: AssetClass,
}

/// One raw item from a signal source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawItem {
    SocialPost(SocialPost),
    NewsArticle(NewsArticle),
    Quote(Quote),
}

impl RawItem {
    /// Source kind this item counts toward.
    #[must_use]
    pub const fn kind(&self) -> SourceKind {
        match self {
            RawItem::SocialPost(_) => SourceKind::Social,
            RawItem::NewsArticle(_) => SourceKind::News,
            RawItem::Quote(_) => SourceKind::Quotes,
        }
    }

    /// Headline text for display and context summaries.
    #[must_use]
    pub fn headline(&self) -> String {
        match self {
            RawItem::SocialPost(p) => p.title.clone(),
            RawItem::NewsArticle(a) => a.title.clone(),
            RawItem::Quote(q) => format!(
                "{} {:.2} ({:+.2}%)",
                q.symbol, q.price, q.change_percent
            ),
        }
    }
}

/// Parameters for one fetch call. Empty lists mean "use configured defaults".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchParams {
    /// Communities (subreddits) to read.
    pub communities: Vec<String>,
    /// Feed URLs to read.
    pub feeds: Vec<String>,
    /// Ticker symbols or coin ids to quote.
    pub symbols: Vec<String>,
    /// Keep only items mentioning one of these words.
    pub keywords: Vec<String>,
    /// Cap on returned items.
    pub limit: Option<usize>,
}

impl FetchParams {
    /// Parameters using every configured default.
    #[must_use]
    pub fn defaults() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_communities(mut self, communities: Vec<String>) -> Self {
        self.communities = communities;
        self
    }

    #[must_use]
    pub fn with_feeds(mut self, feeds: Vec<String>) -> Self {
        self.feeds = feeds;
        self
    }

    #[must_use]
    pub fn with_symbols(mut self, symbols: Vec<String>) -> Self {
        self.symbols = symbols;
        self
    }

    #[must_use]
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_item_is_tagged() {
        let item = RawItem::Quote(Quote {
            symbol: "BTC".into(),
            price: 65_000.0,
            change_percent: -1.5,
            asset_class: AssetClass::Crypto,
        });
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "quote");
        assert_eq!(item.kind(), SourceKind::Quotes);
        assert_eq!(item.headline(), "BTC 65000.00 (-1.50%)");
    }
}
