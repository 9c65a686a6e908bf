//! HTTP surface.
//!
//! Every response carries a `success` flag; failures add an `error`
//! message. Client mistakes map to 400/404, everything else to 500.

pub mod error;
pub mod proposals;
pub mod trends;
pub mod workflow;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

pub use error::ApiError;

use crate::error::{Error, Result};
use crate::infrastructure::bootstrap::AppContext;
use crate::port::outbound::store::Store;

/// Build the router over a wired context.
pub fn router<S: Store + 'static>(ctx: Arc<AppContext<S>>) -> Router {
    Router::new()
        .route("/health", get(health::<S>))
        .route("/api/workflow", post(workflow::start::<S>))
        .route(
            "/api/workflow/{session_id}",
            get(workflow::snapshot::<S>).delete(workflow::close::<S>),
        )
        .route("/api/workflow/{session_id}/respond", post(workflow::respond::<S>))
        .route("/api/proposals", get(proposals::list::<S>))
        .route("/api/proposals/generate", post(proposals::generate::<S>))
        .route("/api/trends", get(trends::trends::<S>))
        .route("/api/sources/{name}", get(trends::source::<S>))
        .with_state(ctx)
}

/// `GET /health`
async fn health<S: Store + 'static>(State(ctx): State<Arc<AppContext<S>>>) -> Json<Value> {
    Json(json!({
        "success": true,
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": ctx.workflow.len(),
        "integrations": ctx.integrations,
    }))
}

/// Serve until `shutdown` flips to true.
///
/// # Errors
/// When the address cannot be bound or the server fails.
pub async fn serve(router: Router, address: &str, mut shutdown: watch::Receiver<bool>) -> Result<()> {
    let listener = TcpListener::bind(address).await?;
    info!(address, "HTTP server listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            while shutdown.changed().await.is_ok() {
                if *shutdown.borrow() {
                    break;
                }
            }
        })
        .await
        .map_err(|e| Error::Connection(e.to_string()))
}
