//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each inspection endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use memo_cache::api::{create_router, LOOKUP_CACHE_NAME};
use memo_cache::{AppState, Config};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

async fn create_test_app() -> Router {
    let config = Config {
        lookup_delay_ms: 0,
        ..Config::default()
    };
    let state = AppState::from_config(&config).await.unwrap();
    create_router(state)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn invalidate(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/invalidate")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// == Lookup Endpoint Tests ==

#[tokio::test]
async fn test_lookup_returns_memoised_result() {
    let app = create_test_app().await;

    let first = app.clone().oneshot(get("/lookup/Alice")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first = body_to_json(first.into_body()).await;
    assert_eq!(first["canonical"], "alice");

    let second = app.clone().oneshot(get("/lookup/Alice")).await.unwrap();
    let second = body_to_json(second.into_body()).await;
    assert_eq!(first["resolved_at"], second["resolved_at"]);

    let stats = app
        .oneshot(get(&format!("/stats/{LOOKUP_CACHE_NAME}")))
        .await
        .unwrap();
    let stats = body_to_json(stats.into_body()).await;
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["total_entries"], 1);
}

#[tokio::test]
async fn test_lookup_rejects_invalid_name() {
    let app = create_test_app().await;

    let response = app.oneshot(get("/lookup/not%20valid")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("not valid"));
}

// == Stats Endpoint Tests ==

#[tokio::test]
async fn test_stats_lists_registered_caches() {
    let app = create_test_app().await;

    let response = app.oneshot(get("/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    let caches = json["caches"].as_array().unwrap();
    assert_eq!(caches.len(), 1);
    assert_eq!(caches[0]["name"], LOOKUP_CACHE_NAME);
    assert_eq!(caches[0]["strategy"], "lru(128)");
}

#[tokio::test]
async fn test_stats_unknown_cache() {
    let app = create_test_app().await;

    let response = app.oneshot(get("/stats/missing")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == Invalidate Endpoint Tests ==

#[tokio::test]
async fn test_invalidate_by_substring() {
    let app = create_test_app().await;

    for name in ["alice", "alicia", "bob"] {
        let response = app
            .clone()
            .oneshot(get(&format!("/lookup/{name}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(invalidate(r#"{"cache":"lookup","contains":"ali"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["removed"], 2);

    let response = app
        .oneshot(invalidate(r#"{"cache":"lookup"}"#))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["removed"], 1);
}

#[tokio::test]
async fn test_invalidate_empty_substring() {
    let app = create_test_app().await;

    let response = app
        .oneshot(invalidate(r#"{"cache":"lookup","contains":""}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalidate_unknown_cache() {
    let app = create_test_app().await;

    let response = app
        .oneshot(invalidate(r#"{"cache":"missing"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalidate_malformed_body() {
    let app = create_test_app().await;

    let response = app.oneshot(invalidate("not json")).await.unwrap();

    assert!(response.status().is_client_error());
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app().await;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
