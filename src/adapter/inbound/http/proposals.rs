//! Proposal generation and listing endpoints.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use super::error::ApiError;
use crate::infrastructure::bootstrap::AppContext;
use crate::port::outbound::store::Store;

const DEFAULT_LIST_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub query: String,
    #[serde(default)]
    pub count: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// `POST /api/proposals/generate`
pub async fn generate<S: Store + 'static>(
    State(ctx): State<Arc<AppContext<S>>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    let query = request.query.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".into()));
    }
    if request.count == Some(0) {
        return Err(ApiError::BadRequest("count must be at least 1".into()));
    }

    let proposals = ctx.generator.generate_for_query(query, request.count).await;
    for proposal in &proposals {
        if let Err(err) = ctx.store.save_proposal(proposal).await {
            warn!(proposal = %proposal.id(), error = %err, "Failed to store generated proposal");
        }
    }
    Ok(Json(json!({
        "success": true,
        "count": proposals.len(),
        "proposals": proposals,
    })))
}

/// `GET /api/proposals`
pub async fn list<S: Store + 'static>(
    State(ctx): State<Arc<AppContext<S>>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let proposals = ctx
        .store
        .list_proposals(query.limit.unwrap_or(DEFAULT_LIST_LIMIT))
        .await?;
    Ok(Json(json!({
        "success": true,
        "count": proposals.len(),
        "proposals": proposals,
    })))
}
