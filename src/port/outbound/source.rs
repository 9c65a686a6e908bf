//! Signal source ports.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{FetchParams, RawItem, SourceKind};
use crate::error::Result;

/// A source of raw trend items (posts, articles, quotes).
///
/// Implementations apply their own recency and popularity filters, skip
/// sub-sources that fail (one community, one feed, one symbol) with a
/// warning, and pace sequential upstream calls. An `Err` means the whole
/// source is unusable for this call.
#[async_trait]
pub trait SignalSource: Send + Sync {
    /// Short label used in logs and topic source labels.
    fn name(&self) -> &'static str;

    /// Kind of items this source produces.
    fn kind(&self) -> SourceKind;

    /// Fetch items. Output order is unspecified.
    async fn fetch(&self, params: &FetchParams) -> Result<Vec<RawItem>>;
}

/// External search-interest lookup (0..100 per keyword).
#[async_trait]
pub trait TrendInterestSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Average interest per keyword. Keywords without data are absent.
    async fn interest(&self, keywords: &[String]) -> Result<HashMap<String, f64>>;
}
