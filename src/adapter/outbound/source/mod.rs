//! Signal source adapters.
//!
//! Implementations of [`SignalSource`](crate::port::outbound::source::SignalSource)
//! and [`TrendInterestSource`](crate::port::outbound::source::TrendInterestSource).

pub mod quotes;
pub mod reddit;
pub mod rss;
pub mod settings;
pub mod trends;

pub use quotes::{CryptoQuotes, StockQuotes};
pub use reddit::{RedditCredentials, RedditSource};
pub use rss::RssSource;
pub use settings::{NewsSettings, QuoteSettings, RedditSettings, TrendsSettings};
pub use trends::GoogleTrends;
