//! Market quote sources: CoinGecko for crypto, Alpha Vantage for stocks.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::adapter::outbound::http::HttpFetcher;
use crate::domain::{AssetClass, FetchParams, Quote, RawItem, SourceKind};
use crate::error::{ConfigError, Error, Result};
use crate::port::outbound::source::SignalSource;

const COINGECKO_URL: &str = "https://api.coingecko.com/api/v3/simple/price";
const ALPHAVANTAGE_URL: &str = "https://www.alphavantage.co/query";

/// Crypto prices from the CoinGecko simple-price endpoint.
pub struct CryptoQuotes {
    fetcher: HttpFetcher,
    default_ids: Vec<String>,
}

impl CryptoQuotes {
    #[must_use]
    pub fn new(fetcher: HttpFetcher, default_ids: Vec<String>) -> Self {
        Self {
            fetcher,
            default_ids,
        }
    }
}

#[derive(Deserialize)]
struct CoinPrice {
    usd: Option<f64>,
    #[serde(default)]
    usd_24h_change: Option<f64>,
}

fn coin_quotes(prices: HashMap<String, CoinPrice>) -> Vec<Quote> {
    let mut quotes: Vec<Quote> = prices
        .into_iter()
        .filter_map(|(id, p)| {
            Some(Quote {
                symbol: id,
                price: p.usd?,
                change_percent: p.usd_24h_change.unwrap_or(0.0),
                asset_class: AssetClass::Crypto,
            })
        })
        .collect();
    quotes.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    quotes
}

#[async_trait]
impl SignalSource for CryptoQuotes {
    fn name(&self) -> &'static str {
        "coingecko"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Quotes
    }

    async fn fetch(&self, params: &FetchParams) -> Result<Vec<RawItem>> {
        let ids = if params.symbols.is_empty() {
            &self.default_ids
        } else {
            &params.symbols
        };
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids.join(",");
        let prices: HashMap<String, CoinPrice> = self
            .fetcher
            .send_json(|http| {
                http.get(COINGECKO_URL).query(&[
                    ("ids", joined.as_str()),
                    ("vs_currencies", "usd"),
                    ("include_24hr_change", "true"),
                ])
            })
            .await?;
        let quotes = coin_quotes(prices);
        info!(quotes = quotes.len(), "Collected crypto quotes");
        Ok(quotes.into_iter().map(RawItem::Quote).collect())
    }
}

/// Read `ALPHAVANTAGE_API_KEY`.
///
/// # Errors
///
/// Returns an error if the variable is not set.
pub fn alphavantage_key_from_env() -> Result<String> {
    std::env::var("ALPHAVANTAGE_API_KEY").map_err(|_| {
        Error::Config(ConfigError::MissingField {
            field: "ALPHAVANTAGE_API_KEY",
        })
    })
}

/// Stock prices from the Alpha Vantage global-quote endpoint, one call
/// per symbol.
pub struct StockQuotes {
    fetcher: HttpFetcher,
    api_key: String,
    default_symbols: Vec<String>,
}

impl StockQuotes {
    #[must_use]
    pub fn new(fetcher: HttpFetcher, api_key: impl Into<String>, default_symbols: Vec<String>) -> Self {
        Self {
            fetcher,
            api_key: api_key.into(),
            default_symbols,
        }
    }

    async fn quote(&self, symbol: &str) -> Result<Quote> {
        let response: GlobalQuoteResponse = self
            .fetcher
            .send_json(|http| {
                http.get(ALPHAVANTAGE_URL).query(&[
                    ("function", "GLOBAL_QUOTE"),
                    ("symbol", symbol),
                    ("apikey", self.api_key.as_str()),
                ])
            })
            .await?;
        parse_global_quote(response, symbol)
    }
}

#[derive(Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote", default)]
    quote: Option<GlobalQuote>,
    #[serde(rename = "Note", default)]
    note: Option<String>,
    #[serde(rename = "Information", default)]
    information: Option<String>,
}

#[derive(Deserialize)]
struct GlobalQuote {
    #[serde(rename = "01. symbol", default)]
    symbol: Option<String>,
    #[serde(rename = "05. price", default)]
    price: Option<String>,
    #[serde(rename = "10. change percent", default)]
    change_percent: Option<String>,
}

fn parse_global_quote(response: GlobalQuoteResponse, requested: &str) -> Result<Quote> {
    if let Some(msg) = response.note.or(response.information) {
        return Err(Error::Connection(format!("alpha vantage: {msg}")));
    }
    let quote = response
        .quote
        .ok_or_else(|| Error::Parse(format!("no quote for {requested}")))?;
    let price = quote
        .price
        .as_deref()
        .and_then(|p| p.trim().parse::<f64>().ok())
        .ok_or_else(|| Error::Parse(format!("no price for {requested}")))?;
    let change_percent = quote
        .change_percent
        .as_deref()
        .and_then(|c| c.trim().trim_end_matches('%').parse::<f64>().ok())
        .unwrap_or(0.0);
    Ok(Quote {
        symbol: quote.symbol.unwrap_or_else(|| requested.to_string()),
        price,
        change_percent,
        asset_class: AssetClass::Stock,
    })
}

#[async_trait]
impl SignalSource for StockQuotes {
    fn name(&self) -> &'static str {
        "alphavantage"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Quotes
    }

    async fn fetch(&self, params: &FetchParams) -> Result<Vec<RawItem>> {
        let symbols = if params.symbols.is_empty() {
            &self.default_symbols
        } else {
            &params.symbols
        };

        let mut quotes = Vec::new();
        for (i, symbol) in symbols.iter().enumerate() {
            if i > 0 {
                self.fetcher.pace().await;
            }
            match self.quote(symbol).await {
                Ok(quote) => {
                    debug!(symbol = %symbol, price = quote.price, "Fetched stock quote");
                    quotes.push(RawItem::Quote(quote));
                }
                Err(e) => warn!(symbol = %symbol, error = %e, "Skipping symbol"),
            }
        }
        info!(quotes = quotes.len(), "Collected stock quotes");
        Ok(quotes)
    }
}
