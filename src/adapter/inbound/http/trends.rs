//! Trend and raw source endpoints.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use super::error::ApiError;
use crate::domain::{FetchParams, RawItem};
use crate::infrastructure::bootstrap::AppContext;
use crate::port::outbound::source::SignalSource;
use crate::port::outbound::store::Store;

const DEFAULT_TOPIC_LIMIT: usize = 20;

#[derive(Debug, Default, Deserialize)]
pub struct TrendsQuery {
    /// Aggregate now instead of reading stored topics.
    #[serde(default)]
    pub refresh: bool,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// `GET /api/trends`
pub async fn trends<S: Store + 'static>(
    State(ctx): State<Arc<AppContext<S>>>,
    query: Result<Query<TrendsQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let limit = query.limit.unwrap_or(DEFAULT_TOPIC_LIMIT);

    let topics = if query.refresh {
        let mut topics = ctx.aggregator.aggregate(&FetchParams::defaults()).await;
        for topic in &topics {
            if let Err(err) = ctx.store.save_topic(topic).await {
                warn!(topic = %topic.id, error = %err, "Failed to store topic");
            }
        }
        topics.truncate(limit);
        topics
    } else {
        ctx.store.list_topics(limit).await?
    };

    Ok(Json(json!({
        "success": true,
        "refreshed": query.refresh,
        "count": topics.len(),
        "topics": topics,
    })))
}

async fn fetch_items(source: &Arc<dyn SignalSource>) -> Vec<RawItem> {
    match source.fetch(&FetchParams::defaults()).await {
        Ok(items) => items,
        Err(err) => {
            warn!(source = source.name(), error = %err, "Source fetch failed");
            Vec::new()
        }
    }
}

/// `GET /api/sources/{name}` for `reddit`, `news` or `quotes`.
pub async fn source<S: Store + 'static>(
    State(ctx): State<Arc<AppContext<S>>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let selected: Vec<&Arc<dyn SignalSource>> = match name.as_str() {
        "reddit" => ctx.sources.reddit.iter().collect(),
        "news" => ctx.sources.news.iter().collect(),
        "quotes" => ctx
            .sources
            .crypto_quotes
            .iter()
            .chain(ctx.sources.stock_quotes.iter())
            .collect(),
        other => return Err(ApiError::NotFound(format!("unknown source '{other}'"))),
    };
    if selected.is_empty() {
        return Err(ApiError::NotFound(format!("source '{name}' is not configured")));
    }

    let batches = futures_util::future::join_all(selected.into_iter().map(fetch_items)).await;
    let items: Vec<RawItem> = batches.into_iter().flatten().collect();
    Ok(Json(json!({
        "success": true,
        "source": name,
        "count": items.len(),
        "items": items,
    })))
}
