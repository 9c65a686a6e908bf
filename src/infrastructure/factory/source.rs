//! Signal source, sentiment scorer and search factories.
//!
//! Every integration whose credentials are missing is skipped with a
//! warning; the pipeline runs with whatever remains.

use std::sync::Arc;

use tracing::{info, warn};

use crate::adapter::outbound::http::HttpFetcher;
use crate::adapter::outbound::search::SerpApiSearch;
use crate::adapter::outbound::sentiment::{HuggingFaceScorer, LexiconScorer};
use crate::adapter::outbound::source::quotes::alphavantage_key_from_env;
use crate::adapter::outbound::source::trends::serpapi_key_from_env;
use crate::adapter::outbound::source::{
    CryptoQuotes, GoogleTrends, RedditCredentials, RedditSource, RssSource, StockQuotes,
};
use crate::infrastructure::config::service::SentimentProvider;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::search::WebSearch;
use crate::port::outbound::sentiment::SentimentScorer;
use crate::port::outbound::source::{SignalSource, TrendInterestSource};

/// Every source the pipeline can use. `None` means disabled.
#[derive(Clone, Default)]
pub struct Sources {
    pub reddit: Option<Arc<dyn SignalSource>>,
    pub news: Option<Arc<dyn SignalSource>>,
    pub crypto_quotes: Option<Arc<dyn SignalSource>>,
    pub stock_quotes: Option<Arc<dyn SignalSource>>,
    pub trends: Option<Arc<dyn TrendInterestSource>>,
}

impl Sources {
    /// Sources feeding trend aggregation, in fetch order.
    #[must_use]
    pub fn signal_sources(&self) -> Vec<Arc<dyn SignalSource>> {
        [&self.reddit, &self.news, &self.crypto_quotes, &self.stock_quotes]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }
}

fn fetcher(config: &Config) -> HttpFetcher {
    HttpFetcher::from_settings(&config.sources.http)
}

/// Build the configured signal sources.
pub fn build_sources(config: &Config) -> Sources {
    let settings = &config.sources;
    let mut sources = Sources::default();

    if settings.reddit.enabled {
        match RedditCredentials::from_env() {
            Ok(credentials) => {
                sources.reddit = Some(Arc::new(RedditSource::new(
                    fetcher(config),
                    credentials,
                    settings.reddit.clone(),
                )));
            }
            Err(err) => warn!(error = %err, "Reddit disabled"),
        }
    }

    if settings.news.enabled {
        sources.news = Some(Arc::new(RssSource::new(fetcher(config), settings.news.clone())));
    }

    if settings.quotes.enabled {
        sources.crypto_quotes = Some(Arc::new(CryptoQuotes::new(
            fetcher(config),
            settings.quotes.crypto_ids.clone(),
        )));
        match alphavantage_key_from_env() {
            Ok(key) => {
                sources.stock_quotes = Some(Arc::new(StockQuotes::new(
                    fetcher(config),
                    key,
                    settings.quotes.stock_symbols.clone(),
                )));
            }
            Err(err) => warn!(error = %err, "Stock quotes disabled"),
        }
    }

    if settings.trends.enabled {
        match serpapi_key_from_env() {
            Ok(key) => {
                sources.trends = Some(Arc::new(GoogleTrends::new(
                    fetcher(config),
                    key,
                    settings.trends.clone(),
                )));
            }
            Err(err) => warn!(error = %err, "Search interest disabled"),
        }
    }

    info!(
        reddit = sources.reddit.is_some(),
        news = sources.news.is_some(),
        crypto_quotes = sources.crypto_quotes.is_some(),
        stock_quotes = sources.stock_quotes.is_some(),
        trends = sources.trends.is_some(),
        "Signal sources initialized"
    );
    sources
}

/// Build the sentiment scorer.
pub fn build_scorer(config: &Config) -> Arc<dyn SentimentScorer> {
    let hosted = || {
        HuggingFaceScorer::token_from_env()
            .map(|token| HuggingFaceScorer::new(fetcher(config), token, &config.sentiment.model))
    };
    match config.sentiment.provider {
        SentimentProvider::Lexicon => Arc::new(LexiconScorer::new()),
        SentimentProvider::HuggingFace => match hosted() {
            Ok(scorer) => Arc::new(scorer),
            Err(err) => {
                warn!(error = %err, "Hosted sentiment unavailable, using lexicon");
                Arc::new(LexiconScorer::new())
            }
        },
        SentimentProvider::Auto => match hosted() {
            Ok(scorer) => Arc::new(scorer),
            Err(_) => Arc::new(LexiconScorer::new()),
        },
    }
}

/// Build the web search client used for resolution.
pub fn build_search(config: &Config) -> Option<Arc<dyn WebSearch>> {
    match serpapi_key_from_env() {
        Ok(key) => Some(Arc::new(SerpApiSearch::new(fetcher(config), key))),
        Err(err) => {
            warn!(error = %err, "Web search disabled, markets will not be resolved");
            None
        }
    }
}
