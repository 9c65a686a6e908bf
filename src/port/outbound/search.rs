//! Web search port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One organic search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub link: String,
}

/// Best-effort web search. May return fewer than `limit` results.
#[async_trait]
pub trait WebSearch: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>>;
}
