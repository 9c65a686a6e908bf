//! Signal source configuration.

use serde::Deserialize;

/// Reddit hot-listing settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RedditSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Subreddits read when a fetch names none.
    #[serde(default = "default_subreddits")]
    pub subreddits: Vec<String>,
    /// Posts fetched per subreddit.
    #[serde(default = "default_posts_per_subreddit")]
    pub posts_per_subreddit: usize,
    /// Posts scoring at or below this are discarded.
    #[serde(default = "default_min_score")]
    pub min_score: i64,
    /// Comments attached per post.
    #[serde(default = "default_top_comments")]
    pub top_comments: usize,
    /// Cap on posts returned per fetch, highest score first.
    #[serde(default = "default_max_posts")]
    pub max_posts: usize,
}

const fn default_true() -> bool {
    true
}

fn default_subreddits() -> Vec<String> {
    ["technology", "politics", "sports", "cryptocurrency"]
        .into_iter()
        .map(String::from)
        .collect()
}

const fn default_posts_per_subreddit() -> usize {
    25
}

const fn default_min_score() -> i64 {
    100
}

const fn default_top_comments() -> usize {
    10
}

const fn default_max_posts() -> usize {
    50
}

impl Default for RedditSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            subreddits: default_subreddits(),
            posts_per_subreddit: default_posts_per_subreddit(),
            min_score: default_min_score(),
            top_comments: default_top_comments(),
            max_posts: default_max_posts(),
        }
    }
}

/// RSS/Atom news settings.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Feeds read when a fetch names none.
    #[serde(default = "default_feeds")]
    pub feeds: Vec<String>,
    /// Articles older than this are discarded.
    #[serde(default = "default_window_hours")]
    pub window_hours: i64,
    /// Cap on articles returned per fetch.
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
}

fn default_feeds() -> Vec<String> {
    [
        "https://rss.nytimes.com/services/xml/rss/nyt/Technology.xml",
        "https://rss.nytimes.com/services/xml/rss/nyt/Politics.xml",
        "https://www.espn.com/espn/rss/news",
        "https://cointelegraph.com/rss",
        "https://feeds.bbci.co.uk/news/technology/rss.xml",
        "https://feeds.bbci.co.uk/news/politics/rss.xml",
        "https://feeds.bbci.co.uk/sport/rss.xml",
        "https://cryptoslate.com/feed/",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

const fn default_window_hours() -> i64 {
    24
}

const fn default_max_articles() -> usize {
    20
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            feeds: default_feeds(),
            window_hours: default_window_hours(),
            max_articles: default_max_articles(),
        }
    }
}

/// Google Trends (via SerpApi) settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TrendsSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Keywords per upstream request.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Google Trends date window.
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
}

const fn default_batch_size() -> usize {
    5
}

fn default_timeframe() -> String {
    "now 7-d".into()
}

impl Default for TrendsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            batch_size: default_batch_size(),
            timeframe: default_timeframe(),
        }
    }
}

/// Market quote settings.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// CoinGecko coin ids quoted by default.
    #[serde(default = "default_crypto_ids")]
    pub crypto_ids: Vec<String>,
    /// Stock tickers quoted by default.
    #[serde(default = "default_stock_symbols")]
    pub stock_symbols: Vec<String>,
}

fn default_crypto_ids() -> Vec<String> {
    ["bitcoin", "ethereum", "solana", "aptos"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_stock_symbols() -> Vec<String> {
    ["SPY", "AAPL", "NVDA", "TSLA"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for QuoteSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            crypto_ids: default_crypto_ids(),
            stock_symbols: default_stock_symbols(),
        }
    }
}
