//! Guided creation endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiError;
use crate::application::StartOutcome;
use crate::domain::{SessionId, Submission, WorkflowSession};
use crate::infrastructure::bootstrap::AppContext;
use crate::port::outbound::store::Store;

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub input: String,
}

fn session_view(session: &WorkflowSession) -> Value {
    json!({
        "session_id": session.id(),
        "status": session.status(),
        "current_step": session.current_step(),
        "steps": session.steps(),
        "proposal": session.proposal(),
        "recommendation": session.recommendation(),
        "updated_at": session.updated_at(),
    })
}

fn submission_view(submission: &Submission) -> Value {
    match submission {
        Submission::Rejected { step, validation } => json!({
            "result": "rejected",
            "step": step,
            "message": validation.message,
        }),
        Submission::Advanced { validation, next } => json!({
            "result": "advanced",
            "message": validation.message,
            "next": next,
        }),
        Submission::Confirmed => json!({ "result": "finalized" }),
        Submission::Held => json!({ "result": "held" }),
    }
}

/// `POST /api/workflow`
pub async fn start<S: Store + 'static>(
    State(ctx): State<Arc<AppContext<S>>>,
    payload: Result<Json<StartRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    let message = request.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".into()));
    }

    match ctx.workflow.start(message).await {
        StartOutcome::Started(session) => Ok(Json(json!({
            "success": true,
            "started": true,
            "session": session_view(&session),
        }))),
        StartOutcome::Declined { intent, examples } => Ok(Json(json!({
            "success": true,
            "started": false,
            "intent": intent,
            "message": "That doesn't look like a market request. Try one of these:",
            "examples": examples,
        }))),
    }
}

/// `POST /api/workflow/{session_id}/respond`
pub async fn respond<S: Store + 'static>(
    State(ctx): State<Arc<AppContext<S>>>,
    Path(session_id): Path<String>,
    payload: Result<Json<RespondRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    let reply = ctx
        .workflow
        .respond(&SessionId::from(session_id), &request.input)
        .await?;
    Ok(Json(json!({
        "success": true,
        "outcome": submission_view(&reply.submission),
        "session": session_view(&reply.session),
    })))
}

/// `GET /api/workflow/{session_id}`
pub async fn snapshot<S: Store + 'static>(
    State(ctx): State<Arc<AppContext<S>>>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let session = ctx.workflow.snapshot(&SessionId::from(session_id)).await?;
    Ok(Json(json!({
        "success": true,
        "session": session_view(&session),
    })))
}

/// `DELETE /api/workflow/{session_id}`
pub async fn close<S: Store + 'static>(
    State(ctx): State<Arc<AppContext<S>>>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = SessionId::from(session_id);
    if !ctx.workflow.close(&id).await {
        return Err(ApiError::NotFound(format!("session {id} not found")));
    }
    Ok(Json(json!({ "success": true, "closed": id })))
}
