//! Real-time context gathering and summarization.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::domain::{text, FetchParams, RawItem, RealtimeContext, SourceKind};
use crate::port::outbound::source::SignalSource;

const CRYPTO_WORDS: &[&str] = &[
    "crypto", "cryptocurrency", "bitcoin", "btc", "ethereum", "eth", "solana", "sol", "aptos",
    "apt", "dogecoin", "doge", "coin", "token", "defi", "nft", "blockchain", "altcoin",
];

const STOCK_WORDS: &[&str] = &[
    "stock", "stocks", "share", "shares", "earnings", "nasdaq", "dow", "ipo", "equity",
    "s&p", "spy", "ticker", "dividend",
];

const COMPANY_TICKERS: &[(&str, &str)] = &[
    ("apple", "AAPL"),
    ("nvidia", "NVDA"),
    ("tesla", "TSLA"),
    ("microsoft", "MSFT"),
    ("google", "GOOGL"),
    ("alphabet", "GOOGL"),
    ("amazon", "AMZN"),
    ("meta", "META"),
    ("netflix", "NFLX"),
];

const COIN_IDS: &[(&str, &str)] = &[
    ("bitcoin", "bitcoin"),
    ("btc", "bitcoin"),
    ("ethereum", "ethereum"),
    ("eth", "ethereum"),
    ("solana", "solana"),
    ("sol", "solana"),
    ("aptos", "aptos"),
    ("apt", "aptos"),
    ("dogecoin", "dogecoin"),
    ("doge", "dogecoin"),
];

const CRYPTO_FEEDS: &[&str] = &["https://cointelegraph.com/rss", "https://cryptoslate.com/feed/"];

const BUSINESS_FEEDS: &[&str] = &[
    "https://rss.nytimes.com/services/xml/rss/nyt/Business.xml",
    "https://feeds.bbci.co.uk/news/business/rss.xml",
];

const CRYPTO_COMMUNITIES: &[&str] = &["cryptocurrency", "bitcoin", "ethereum"];

const STOCK_COMMUNITIES: &[&str] = &["stocks", "investing", "wallstreetbets"];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Which sources a query is routed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Crypto quotes for the named coins (defaults when empty), crypto
    /// feeds and crypto communities.
    Crypto { coins: Vec<String> },
    /// Stock quotes for the named tickers, business feeds and investing
    /// communities.
    Stocks { tickers: Vec<String> },
    /// Default feeds and communities plus default crypto quotes.
    Broad,
}

impl Route {
    /// Route by keyword. Crypto words win over stock words.
    #[must_use]
    pub fn for_query(query: &str) -> Self {
        let tokens: Vec<String> = text::tokens(query).collect();
        let has = |words: &[&str]| tokens.iter().any(|t| words.contains(&t.as_str()));

        if has(CRYPTO_WORDS) {
            let mut coins: Vec<String> = Vec::new();
            for token in &tokens {
                if let Some((_, id)) = COIN_IDS.iter().find(|(k, _)| k == token) {
                    if !coins.iter().any(|c| c == id) {
                        coins.push((*id).to_string());
                    }
                }
            }
            return Route::Crypto { coins };
        }

        let mut tickers: Vec<String> = Vec::new();
        let mut push = |ticker: String| {
            if !tickers.contains(&ticker) {
                tickers.push(ticker);
            }
        };
        for token in &tokens {
            if let Some((_, ticker)) = COMPANY_TICKERS.iter().find(|(k, _)| k == token) {
                push((*ticker).to_string());
            } else if let Some(symbol) = token.strip_prefix('$') {
                if !symbol.is_empty() && symbol.len() <= 5 && symbol.chars().all(|c| c.is_ascii_alphabetic()) {
                    push(symbol.to_ascii_uppercase());
                }
            }
        }
        if !tickers.is_empty() || has(STOCK_WORDS) {
            return Route::Stocks { tickers };
        }
        Route::Broad
    }
}

/// Sources available for context gathering. Missing ones are skipped.
#[derive(Clone, Default)]
pub struct ContextSources {
    pub social: Option<Arc<dyn SignalSource>>,
    pub news: Option<Arc<dyn SignalSource>>,
    pub crypto_quotes: Option<Arc<dyn SignalSource>>,
    pub stock_quotes: Option<Arc<dyn SignalSource>>,
}

/// Gathers a [`RealtimeContext`] for a query.
#[derive(Clone, Default)]
pub struct ContextGatherer {
    sources: ContextSources,
    item_limit: usize,
}

struct Plan {
    social: Option<FetchParams>,
    news: Option<FetchParams>,
    crypto: Option<FetchParams>,
    stocks: Option<FetchParams>,
}

impl ContextGatherer {
    #[must_use]
    pub fn new(sources: ContextSources, item_limit: usize) -> Self {
        Self { sources, item_limit }
    }

    fn plan(&self, route: &Route, query: &str) -> Plan {
        let base = FetchParams::defaults().with_limit(self.item_limit);
        match route {
            Route::Crypto { coins } => Plan {
                social: Some(base.clone().with_communities(owned(CRYPTO_COMMUNITIES))),
                news: Some(base.clone().with_feeds(owned(CRYPTO_FEEDS))),
                crypto: Some(base.with_symbols(coins.clone())),
                stocks: None,
            },
            Route::Stocks { tickers } => Plan {
                social: Some(base.clone().with_communities(owned(STOCK_COMMUNITIES))),
                news: Some(base.clone().with_feeds(owned(BUSINESS_FEEDS))),
                crypto: None,
                stocks: Some(base.with_symbols(tickers.clone())),
            },
            Route::Broad => {
                let keywords: Vec<String> = text::keywords(query).into_iter().collect();
                Plan {
                    social: Some(base.clone().with_keywords(keywords.clone())),
                    news: Some(base.clone().with_keywords(keywords)),
                    crypto: Some(base),
                    stocks: None,
                }
            }
        }
    }

    /// Fan out to the routed sources concurrently.
    pub async fn gather(&self, query: &str) -> RealtimeContext {
        let route = Route::for_query(query);
        debug!(query, ?route, "Gathering context");
        let plan = self.plan(&route, query);

        let (social, news, crypto, stocks) = tokio::join!(
            fetch(self.sources.social.as_ref(), plan.social),
            fetch(self.sources.news.as_ref(), plan.news),
            fetch(self.sources.crypto_quotes.as_ref(), plan.crypto),
            fetch(self.sources.stock_quotes.as_ref(), plan.stocks),
        );

        let mut context = RealtimeContext::empty();
        for (kind, items) in [crypto, stocks, social, news].into_iter().flatten() {
            if !context.sources.contains(&kind) {
                context.sources.push(kind);
            }
            for item in items {
                match item {
                    RawItem::Quote(q) => context.quotes.push(q),
                    RawItem::SocialPost(p) => context.posts.push(p),
                    RawItem::NewsArticle(a) => context.headlines.push(a),
                }
            }
        }
        context.captured_at = Utc::now();
        context
    }
}

async fn fetch(
    source: Option<&Arc<dyn SignalSource>>,
    params: Option<FetchParams>,
) -> Option<(SourceKind, Vec<RawItem>)> {
    let (source, params) = (source?, params?);
    match source.fetch(&params).await {
        Ok(items) => Some((source.kind(), items)),
        Err(err) => {
            warn!(source = source.name(), error = %err, "Context fetch failed");
            Some((source.kind(), Vec::new()))
        }
    }
}

/// Render a context as prompt lines, capped at `line_limit` with a
/// trailing marker counting what was cut.
#[must_use]
pub fn summarize(context: &RealtimeContext, line_limit: usize) -> String {
    if context.is_empty() {
        return "No real-time data available.".to_string();
    }
    let mut lines = Vec::new();
    if !context.quotes.is_empty() {
        lines.push("Market data:".to_string());
        for quote in &context.quotes {
            lines.push(format!("- {}", RawItem::Quote(quote.clone()).headline()));
        }
    }
    if !context.posts.is_empty() {
        lines.push("Trending discussions:".to_string());
        for post in &context.posts {
            lines.push(format!(
                "- {} (score {}, {} comments, r/{})",
                post.title, post.score, post.comment_count, post.community
            ));
        }
    }
    if !context.headlines.is_empty() {
        lines.push("Recent headlines:".to_string());
        for article in &context.headlines {
            let summary = text::truncate_chars(article.summary.trim(), 160);
            if summary.is_empty() {
                lines.push(format!("- {}", article.title));
            } else {
                lines.push(format!("- {}: {summary}", article.title));
            }
        }
    }
    trim_lines(lines, line_limit)
}

/// Join `lines`, keeping at most `limit` of them.
#[must_use]
pub fn trim_lines(mut lines: Vec<String>, limit: usize) -> String {
    if lines.len() > limit {
        let dropped = lines.len() - limit;
        lines.truncate(limit);
        lines.push(format!("... ({dropped} more lines trimmed)"));
    }
    lines.join("\n")
}
