//! Google web search via SerpApi.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::adapter::outbound::http::HttpFetcher;
use crate::error::Result;
use crate::port::outbound::search::{SearchResult, WebSearch};

const API_URL: &str = "https://serpapi.com/search.json";

/// Organic Google results through the SerpApi `google` engine.
pub struct SerpApiSearch {
    fetcher: HttpFetcher,
    api_key: String,
}

impl SerpApiSearch {
    #[must_use]
    pub fn new(fetcher: HttpFetcher, api_key: impl Into<String>) -> Self {
        Self {
            fetcher,
            api_key: api_key.into(),
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<Organic>,
}

#[derive(Deserialize)]
struct Organic {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    link: String,
}

fn to_results(response: SearchResponse, limit: usize) -> Vec<SearchResult> {
    response
        .organic_results
        .into_iter()
        .filter(|r| !r.title.is_empty() || !r.snippet.is_empty())
        .take(limit)
        .map(|r| SearchResult {
            title: r.title,
            snippet: r.snippet,
            link: r.link,
        })
        .collect()
}

#[async_trait]
impl WebSearch for SerpApiSearch {
    fn name(&self) -> &'static str {
        "serpapi"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let num = limit.to_string();
        let response: SearchResponse = self
            .fetcher
            .send_json(|http| {
                http.get(API_URL).query(&[
                    ("engine", "google"),
                    ("q", query),
                    ("num", num.as_str()),
                    ("api_key", self.api_key.as_str()),
                ])
            })
            .await?;
        let results = to_results(response, limit);
        debug!(query = %query, results = results.len(), "Web search complete");
        Ok(results)
    }
}
