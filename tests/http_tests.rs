//! HTTP surface driven through the router without a socket.

mod support;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use trendsmith::adapter::inbound::http::router;
use trendsmith::domain::SourceKind;
use trendsmith::testkit::domain::{article, post};
use trendsmith::testkit::stub::StubSource;

fn app(adapters: trendsmith::infrastructure::bootstrap::Adapters) -> Router {
    router(Arc::new(support::context(adapters)))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_reports_integrations() {
    let app = app(support::adapters());

    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["sessions"], 0);
    assert_eq!(body["integrations"]["llm"], false);
    assert_eq!(body["integrations"]["contract"], true);
}

#[tokio::test]
async fn workflow_round_trip() {
    let app = app(support::adapters());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/workflow",
        Some(json!({ "message": "Will the Fed cut rates in March?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["started"], true);
    assert_eq!(body["session"]["current_step"]["name"], "question_clarification");
    let id = body["session"]["session_id"].as_str().unwrap().to_string();

    let respond = format!("/api/workflow/{id}/respond");
    let (_, body) = send(
        &app,
        Method::POST,
        &respond,
        Some(json!({ "input": "Will the Fed cut rates by March 2026?" })),
    )
    .await;
    assert_eq!(body["outcome"]["result"], "advanced");
    assert_eq!(body["outcome"]["next"], "timeframe");

    let (status, body) = send(&app, Method::POST, &respond, Some(json!({ "input": "banana" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["result"], "rejected");
    assert_eq!(body["outcome"]["step"], "timeframe");
    assert_eq!(body["session"]["steps"].as_array().unwrap().len(), 2);

    let (status, body) = send(&app, Method::GET, &format!("/api/workflow/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["status"], "in_progress");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/workflow/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, Method::GET, &format!("/api/workflow/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn non_market_message_is_declined() {
    let app = app(support::adapters());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/workflow",
        Some(json!({ "message": "hello there" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["started"], false);
    assert_eq!(body["intent"], "unclear");
    assert_eq!(body["examples"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn bad_requests_are_rejected() {
    let app = app(support::adapters());

    let (status, body) = send(&app, Method::POST, "/api/workflow", Some(json!({ "message": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, Method::POST, "/api/workflow", Some(json!({ "text": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/proposals/generate",
        Some(json!({ "query": "bitcoin", "count": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/workflow/does-not-exist/respond",
        Some(json!({ "input": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn generated_proposals_are_listed() {
    let app = app(support::adapters());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/proposals/generate",
        Some(json!({ "query": "Will Bitcoin reach $100k?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["proposals"][0]["question"], "Will Bitcoin reach $100k?");
    assert_eq!(body["proposals"][0]["ai_probability"], 0.5);

    let (status, body) = send(&app, Method::GET, "/api/proposals?limit=5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn trends_refresh_then_read_back() {
    let mut adapters = support::adapters();
    adapters.sources.reddit = Some(Arc::new(StubSource::new(
        "reddit",
        SourceKind::Social,
        vec![post("a", "technology", "Chipmaker unveils new accelerator", 20)],
    )));
    let app = app(adapters);

    let (_, body) = send(&app, Method::GET, "/api/trends", None).await;
    assert_eq!(body["count"], 0);

    let (status, body) = send(&app, Method::GET, "/api/trends?refresh=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["refreshed"], true);
    assert_eq!(body["topics"][0]["title"], "Chipmaker unveils new accelerator");

    let (_, body) = send(&app, Method::GET, "/api/trends?limit=5", None).await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn raw_source_items_by_name() {
    let mut adapters = support::adapters();
    adapters.sources.news = Some(Arc::new(StubSource::new(
        "news",
        SourceKind::News,
        vec![article("Rate cut odds climb", "Traders price a cut")],
    )));
    let app = app(adapters);

    let (status, body) = send(&app, Method::GET, "/api/sources/news", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, _) = send(&app, Method::GET, "/api/sources/reddit", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::GET, "/api/sources/weather", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
