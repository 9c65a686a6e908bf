//! Builders for domain values used across tests.
//!
//! Concise factory functions so tests focus on assertions rather than
//! construction boilerplate.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{
    AssetClass, Market, MarketId, MarketProposal, NewsArticle, Outcome, ProposalDraft, Quote,
    RawItem, RealtimeContext, SocialPost,
};

/// A post in `community` with `comments` generated comment lines.
pub fn post(id: &str, community: &str, title: &str, comments: usize) -> RawItem {
    RawItem::SocialPost(SocialPost {
        id: id.to_string(),
        title: title.to_string(),
        body: String::new(),
        score: 500,
        comment_count: comments as u64,
        comments: (0..comments).map(|i| format!("{title} comment {i}")).collect(),
        community: community.to_string(),
        created_at: Some(Utc::now()),
    })
}

/// A headline from a test feed.
pub fn article(title: &str, summary: &str) -> RawItem {
    RawItem::NewsArticle(NewsArticle {
        title: title.to_string(),
        summary: summary.to_string(),
        link: format!("https://news.test/{}", title.len()),
        published: Some(Utc::now()),
        feed: "https://news.test/rss".to_string(),
    })
}

/// A crypto quote.
pub fn quote(symbol: &str, price: f64, change_percent: f64) -> RawItem {
    RawItem::Quote(Quote {
        symbol: symbol.to_string(),
        price,
        change_percent,
        asset_class: AssetClass::Crypto,
    })
}

/// A draft proposal closing `days` from now.
pub fn proposal(question: &str, days: i64) -> MarketProposal {
    MarketProposal::new(
        ProposalDraft::new(question, Utc::now() + Duration::days(days)),
        RealtimeContext::empty(),
    )
}

/// An unresolved market.
pub fn market(id: u64, description: &str, end_time: DateTime<Utc>) -> Market {
    Market {
        id: MarketId::new(id),
        description: description.to_string(),
        end_time,
        resolved: false,
        outcome: Outcome::Unresolved,
    }
}
