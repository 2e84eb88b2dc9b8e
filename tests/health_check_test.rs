//! Health check endpoint tests.
//!
//! Tests the `/health` and `/live` endpoints including response structure
//! and the reported image cache state.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use beacon::{create_router, AppState, Config};
use serde_json::Value;
use tower::ServiceExt;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

fn app(config: Config) -> Router {
    let state = AppState::from_config(config).expect("failed to build app state");
    create_router(state)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.expect("failed to make request");
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let json = serde_json::from_slice(&body_bytes).expect("response should be valid JSON");

    (status, json)
}

#[tokio::test]
async fn health_check_returns_healthy() {
    let (status, body) = get_json(app(Config::default()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body.get("timestamp").is_some());
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn health_check_reports_disabled_integrations() {
    let (status, body) = get_json(app(Config::default()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["image_cache"], "disabled");
    assert_eq!(body["checks"]["notifications"], "disabled");
}

#[tokio::test]
async fn health_check_reports_cache_state_transitions() {
    let origin = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"img".to_vec()))
        .mount(&origin)
        .await;

    let mut config = Config::default();
    config.image_url = Some(format!("{}/logo.png", origin.uri()));

    let state = AppState::from_config(config).expect("failed to build app state");

    let (_, body) = get_json(create_router(state.clone()), "/health").await;
    assert_eq!(body["checks"]["image_cache"], "empty");

    // A view populates the cache
    let request = Request::builder()
        .method("GET")
        .uri("/api/signal/Hello.gif")
        .body(Body::empty())
        .unwrap();
    create_router(state.clone()).oneshot(request).await.expect("failed to make request");

    let (_, body) = get_json(create_router(state), "/health").await;
    assert_eq!(body["checks"]["image_cache"], "cached");
}

#[tokio::test]
async fn liveness_check_is_minimal() {
    let (status, body) = get_json(app(Config::default()), "/live").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");
    assert_eq!(body["service"], "beacon");
}

#[tokio::test]
async fn health_check_rejects_post() {
    let request = Request::builder()
        .method("POST")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response =
        app(Config::default()).oneshot(request).await.expect("failed to make request");

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
