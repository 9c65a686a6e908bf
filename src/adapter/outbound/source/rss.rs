//! RSS/Atom news source.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::adapter::outbound::http::HttpFetcher;
use super::settings::NewsSettings;
use crate::domain::{text, FetchParams, NewsArticle, RawItem, SourceKind};
use crate::error::{Error, Result};
use crate::port::outbound::source::SignalSource;

/// News source producing [`NewsArticle`] items from configured feeds.
pub struct RssSource {
    fetcher: HttpFetcher,
    settings: NewsSettings,
}

impl RssSource {
    #[must_use]
    pub fn new(fetcher: HttpFetcher, settings: NewsSettings) -> Self {
        Self { fetcher, settings }
    }

    async fn read_feed(&self, url: &str, now: DateTime<Utc>) -> Result<Vec<NewsArticle>> {
        let body = self.fetcher.send_bytes(|http| http.get(url)).await?;
        parse_feed(&body, url, now, Duration::hours(self.settings.window_hours))
    }
}

/// Parse one feed document, keeping entries published inside the window.
/// Entries without a publish date are kept.
pub(crate) fn parse_feed(
    body: &[u8],
    feed_url: &str,
    now: DateTime<Utc>,
    window: Duration,
) -> Result<Vec<NewsArticle>> {
    let feed = feed_rs::parser::parse(body).map_err(|e| Error::Parse(format!("{feed_url}: {e}")))?;
    let cutoff = now - window;
    let feed_name = feed
        .title
        .map(|t| t.content)
        .unwrap_or_else(|| feed_url.to_string());

    Ok(feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let title = entry.title.map(|t| t.content.trim().to_string())?;
            if title.is_empty() {
                return None;
            }
            let published = entry.published.or(entry.updated);
            if published.is_some_and(|p| p < cutoff) {
                return None;
            }
            Some(NewsArticle {
                title,
                summary: entry
                    .summary
                    .map(|s| s.content.trim().to_string())
                    .unwrap_or_default(),
                link: entry
                    .links
                    .into_iter()
                    .next()
                    .map(|l| l.href)
                    .unwrap_or_default(),
                published,
                feed: feed_name.clone(),
            })
        })
        .collect())
}

/// Keyword filter, newest first, dedupe by normalized title, cap.
pub(crate) fn select_articles(
    mut articles: Vec<NewsArticle>,
    keywords: &[String],
    limit: usize,
) -> Vec<NewsArticle> {
    articles.retain(|a| {
        keywords.is_empty()
            || keywords
                .iter()
                .any(|kw| text::contains_word(&a.title, kw) || text::contains_word(&a.summary, kw))
    });
    articles.sort_by(|a, b| b.published.cmp(&a.published));

    let mut seen = HashSet::new();
    articles
        .into_iter()
        .filter(|a| seen.insert(text::normalize_title(&a.title)))
        .take(limit)
        .collect()
}

#[async_trait]
impl SignalSource for RssSource {
    fn name(&self) -> &'static str {
        "rss"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::News
    }

    async fn fetch(&self, params: &FetchParams) -> Result<Vec<RawItem>> {
        let feeds = if params.feeds.is_empty() {
            &self.settings.feeds
        } else {
            &params.feeds
        };
        let now = Utc::now();

        let mut articles = Vec::new();
        for (i, url) in feeds.iter().enumerate() {
            if i > 0 {
                self.fetcher.pace().await;
            }
            match self.read_feed(url, now).await {
                Ok(found) => {
                    debug!(feed = %url, count = found.len(), "Read feed");
                    articles.extend(found);
                }
                Err(e) => warn!(feed = %url, error = %e, "Skipping feed"),
            }
        }

        let limit = params.limit.unwrap_or(self.settings.max_articles);
        let selected = select_articles(articles, &params.keywords, limit);
        info!(articles = selected.len(), "Collected news articles");
        Ok(selected.into_iter().map(RawItem::NewsArticle).collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example Tech</title>
    <link>https://example.com</link>
    <description>Tech news</description>
    <item>
      <title>Chipmaker beats earnings estimates</title>
      <link>https://example.com/a</link>
      <description>Revenue rose sharply.</description>
      <pubDate>Sat, 10 Jan 2026 10:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Old story</title>
      <link>https://example.com/b</link>
      <description>From last week.</description>
      <pubDate>Fri, 02 Jan 2026 10:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Undated bulletin</title>
      <link>https://example.com/c</link>
    </item>
  </channel>
</rss>"#;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap()
    }

    fn article(title: &str, hours_ago: Option<i64>) -> NewsArticle {
        NewsArticle {
            title: title.into(),
            summary: String::new(),
            link: String::new(),
            published: hours_ago.map(|h| now() - Duration::hours(h)),
            feed: "test".into(),
        }
    }

    #[test]
    fn parse_feed_applies_window_and_keeps_undated() {
        let articles = parse_feed(RSS.as_bytes(), "https://example.com/rss", now(), Duration::hours(24))
            .unwrap();

        let titles: Vec<_> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Chipmaker beats earnings estimates", "Undated bulletin"]);
        assert_eq!(articles[0].feed, "Example Tech");
        assert_eq!(articles[0].link, "https://example.com/a");
        assert_eq!(articles[0].summary, "Revenue rose sharply.");
    }

    #[test]
    fn parse_feed_rejects_garbage() {
        assert!(parse_feed(b"not a feed", "u", now(), Duration::hours(24)).is_err());
    }

    #[test]
    fn select_dedupes_by_normalized_title_and_caps() {
        let articles = vec![
            article("Fed holds rates", Some(1)),
            article("Fed holds rates!", Some(2)),
            article("NBA trade deadline", Some(3)),
            article("Markets rally", None),
        ];
        let selected = select_articles(articles, &[], 2);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].title, "Fed holds rates");
        assert_eq!(selected[1].title, "NBA trade deadline");
    }

    #[test]
    fn select_applies_keyword_filter() {
        let articles = vec![article("Fed holds rates", Some(1)), article("NBA trade deadline", Some(1))];
        let selected = select_articles(articles, &["nba".into()], 10);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].title, "NBA trade deadline");
    }
}
