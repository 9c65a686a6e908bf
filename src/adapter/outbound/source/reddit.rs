//! Reddit hot-listing source.
//!
//! Uses application-only OAuth (client credentials). The bearer token is
//! cached until shortly before it expires.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::adapter::outbound::http::HttpFetcher;
use super::settings::RedditSettings;
use crate::domain::{text, FetchParams, RawItem, SocialPost, SourceKind};
use crate::error::{ConfigError, Error, Result};
use crate::port::outbound::source::SignalSource;

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";

/// Comments shorter than this are noise.
const MIN_COMMENT_CHARS: usize = 10;

/// Refresh the token this long before it expires.
const TOKEN_SLACK: Duration = Duration::from_secs(60);

/// Reddit application credentials.
#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl RedditCredentials {
    /// Read `REDDIT_CLIENT_ID`, `REDDIT_CLIENT_SECRET` and the optional
    /// `REDDIT_USER_AGENT`.
    ///
    /// # Errors
    ///
    /// Returns an error if either credential is missing.
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("REDDIT_CLIENT_ID").map_err(|_| {
            Error::Config(ConfigError::MissingField {
                field: "REDDIT_CLIENT_ID",
            })
        })?;
        let client_secret = std::env::var("REDDIT_CLIENT_SECRET").map_err(|_| {
            Error::Config(ConfigError::MissingField {
                field: "REDDIT_CLIENT_SECRET",
            })
        })?;
        let user_agent = std::env::var("REDDIT_USER_AGENT")
            .unwrap_or_else(|_| crate::adapter::outbound::http::USER_AGENT.to_string());
        Ok(Self {
            client_id,
            client_secret,
            user_agent,
        })
    }
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Reddit source producing [`SocialPost`] items.
pub struct RedditSource {
    fetcher: HttpFetcher,
    credentials: RedditCredentials,
    settings: RedditSettings,
    token: Mutex<Option<CachedToken>>,
}

impl RedditSource {
    #[must_use]
    pub fn new(fetcher: HttpFetcher, credentials: RedditCredentials, settings: RedditSettings) -> Self {
        Self {
            fetcher,
            credentials,
            settings,
            token: Mutex::new(None),
        }
    }

    async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        let response: TokenResponse = self
            .fetcher
            .send_json(|http| {
                http.post(TOKEN_URL)
                    .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
                    .header("User-Agent", &self.credentials.user_agent)
                    .form(&[("grant_type", "client_credentials")])
            })
            .await?;

        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(TOKEN_SLACK);
        debug!(expires_in = response.expires_in, "Obtained Reddit access token");
        *guard = Some(CachedToken {
            value: response.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(response.access_token)
    }

    async fn hot(&self, token: &str, subreddit: &str) -> Result<Vec<SocialPost>> {
        let url = format!("{API_BASE}/r/{subreddit}/hot");
        let limit = self.settings.posts_per_subreddit.to_string();
        let listing: Listing<PostData> = self
            .fetcher
            .send_json(|http| {
                http.get(&url)
                    .bearer_auth(token)
                    .header("User-Agent", &self.credentials.user_agent)
                    .query(&[("limit", limit.as_str())])
            })
            .await?;
        Ok(filter_posts(listing, self.settings.min_score))
    }

    async fn top_comments(&self, token: &str, post: &SocialPost) -> Result<Vec<String>> {
        let url = format!("{API_BASE}/r/{}/comments/{}", post.community, post.id);
        let limit = self.settings.top_comments.to_string();
        let thread: Vec<serde_json::Value> = self
            .fetcher
            .send_json(|http| {
                http.get(&url)
                    .bearer_auth(token)
                    .header("User-Agent", &self.credentials.user_agent)
                    .query(&[("limit", limit.as_str()), ("sort", "top"), ("depth", "1")])
            })
            .await?;
        Ok(extract_comments(thread, self.settings.top_comments))
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

const fn default_expires_in() -> u64 {
    3600
}

#[derive(Deserialize)]
struct Listing<T> {
    data: ListingData<T>,
}

#[derive(Deserialize)]
struct ListingData<T> {
    #[serde(default = "Vec::new")]
    children: Vec<Thing<T>>,
}

#[derive(Deserialize)]
struct Thing<T> {
    data: T,
}

#[derive(Deserialize)]
struct PostData {
    id: String,
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: u64,
    #[serde(default)]
    stickied: bool,
    #[serde(default)]
    created_utc: Option<f64>,
    subreddit: String,
}

#[derive(Deserialize)]
struct CommentData {
    #[serde(default)]
    body: Option<String>,
}

fn to_timestamp(secs: f64) -> Option<DateTime<Utc>> {
    if secs.is_finite() {
        Utc.timestamp_opt(secs as i64, 0).single()
    } else {
        None
    }
}

/// Drop stickied posts and posts scoring at or below `min_score`.
fn filter_posts(listing: Listing<PostData>, min_score: i64) -> Vec<SocialPost> {
    listing
        .data
        .children
        .into_iter()
        .map(|thing| thing.data)
        .filter(|p| !p.stickied && p.score > min_score)
        .map(|p| SocialPost {
            id: p.id,
            title: p.title,
            body: p.selftext,
            score: p.score,
            comment_count: p.num_comments,
            comments: Vec::new(),
            community: p.subreddit,
            created_at: p.created_utc.and_then(to_timestamp),
        })
        .collect()
}

/// Comment bodies longer than [`MIN_COMMENT_CHARS`] from the second
/// listing of a thread response.
fn extract_comments(thread: Vec<serde_json::Value>, limit: usize) -> Vec<String> {
    let Some(listing) = thread.into_iter().nth(1) else {
        return Vec::new();
    };
    let Ok(listing) = serde_json::from_value::<Listing<CommentData>>(listing) else {
        return Vec::new();
    };
    listing
        .data
        .children
        .into_iter()
        .filter_map(|thing| thing.data.body)
        .filter(|body| body.trim().chars().count() > MIN_COMMENT_CHARS)
        .take(limit)
        .collect()
}

fn matches_keywords(post: &SocialPost, keywords: &[String]) -> bool {
    keywords.is_empty()
        || keywords.iter().any(|kw| {
            text::contains_word(&post.title, kw) || text::contains_word(&post.body, kw)
        })
}

#[async_trait]
impl SignalSource for RedditSource {
    fn name(&self) -> &'static str {
        "reddit"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Social
    }

    async fn fetch(&self, params: &FetchParams) -> Result<Vec<RawItem>> {
        let token = self.access_token().await?;
        let subreddits = if params.communities.is_empty() {
            &self.settings.subreddits
        } else {
            &params.communities
        };

        let mut posts = Vec::new();
        for (i, subreddit) in subreddits.iter().enumerate() {
            if i > 0 {
                self.fetcher.pace().await;
            }
            match self.hot(&token, subreddit).await {
                Ok(found) => {
                    debug!(subreddit = %subreddit, count = found.len(), "Fetched hot posts");
                    posts.extend(found.into_iter().filter(|p| matches_keywords(p, &params.keywords)));
                }
                Err(e) => warn!(subreddit = %subreddit, error = %e, "Skipping subreddit"),
            }
        }

        posts.sort_by(|a, b| b.score.cmp(&a.score));
        posts.truncate(params.limit.unwrap_or(self.settings.max_posts));

        if self.settings.top_comments > 0 {
            for post in &mut posts {
                self.fetcher.pace().await;
                match self.top_comments(&token, post).await {
                    Ok(comments) => post.comments = comments,
                    Err(e) => warn!(post = %post.id, error = %e, "Skipping comments"),
                }
            }
        }

        info!(posts = posts.len(), "Collected Reddit posts");
        Ok(posts.into_iter().map(RawItem::SocialPost).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"{
        "kind": "Listing",
        "data": {
            "children": [
                {"kind": "t3", "data": {"id": "a1", "title": "Pinned rules", "selftext": "",
                  "score": 5000, "num_comments": 3, "stickied": true, "created_utc": 1700000000.0,
                  "subreddit": "politics"}},
                {"kind": "t3", "data": {"id": "b2", "title": "Senate passes bill", "selftext": "Details",
                  "score": 2500, "num_comments": 800, "stickied": false, "created_utc": 1700000100.0,
                  "subreddit": "politics"}},
                {"kind": "t3", "data": {"id": "c3", "title": "Low effort", "selftext": "",
                  "score": 100, "num_comments": 2, "stickied": false, "subreddit": "politics"}}
            ]
        }
    }"#;

    #[test]
    fn filters_stickied_and_low_score_posts() {
        let listing: Listing<PostData> = serde_json::from_str(LISTING).unwrap();
        let posts = filter_posts(listing, 100);

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "b2");
        assert_eq!(posts[0].comment_count, 800);
        assert_eq!(posts[0].community, "politics");
        assert!(posts[0].created_at.is_some());
    }

    #[test]
    fn extracts_long_comments_only() {
        let thread: Vec<serde_json::Value> = serde_json::from_str(
            r#"[
                {"kind": "Listing", "data": {"children": []}},
                {"kind": "Listing", "data": {"children": [
                    {"kind": "t1", "data": {"body": "short"}},
                    {"kind": "t1", "data": {"body": "This is a substantive comment"}},
                    {"kind": "more", "data": {"count": 10}},
                    {"kind": "t1", "data": {"body": "Another thoughtful reply here"}}
                ]}}
            ]"#,
        )
        .unwrap();

        let comments = extract_comments(thread, 10);
        assert_eq!(
            comments,
            vec![
                "This is a substantive comment".to_string(),
                "Another thoughtful reply here".to_string()
            ]
        );
    }

    #[test]
    fn comment_extraction_tolerates_unexpected_shapes() {
        assert!(extract_comments(Vec::new(), 10).is_empty());
        assert!(extract_comments(vec![serde_json::json!({}), serde_json::json!(42)], 10).is_empty());
    }

    #[test]
    fn keyword_filter_matches_title_or_body() {
        let post = SocialPost {
            id: "x".into(),
            title: "Bitcoin rallies".into(),
            body: "ETF demand".into(),
            score: 500,
            comment_count: 0,
            comments: Vec::new(),
            community: "cryptocurrency".into(),
            created_at: None,
        };
        assert!(matches_keywords(&post, &[]));
        assert!(matches_keywords(&post, &["etf".into()]));
        assert!(!matches_keywords(&post, &["nba".into()]));
    }

    #[test]
    fn missing_credentials_are_reported() {
        std::env::remove_var("REDDIT_CLIENT_ID");
        let err = RedditCredentials::from_env().unwrap_err();
        assert!(err.to_string().contains("REDDIT_CLIENT_ID"));
    }
}
