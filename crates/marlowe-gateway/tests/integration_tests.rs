//! Gateway handler tests
//!
//! All endpoints run against the default test configuration, whose external
//! endpoints are dead localhost ports: streams terminate fast with
//! classified failures, so every test is offline and deterministic.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use marlowe_gateway::config::GatewayConfig;
use marlowe_gateway::handlers::create_router;
use marlowe_gateway::build_state;
use tower::ServiceExt; // for oneshot

fn test_app() -> axum::Router {
    let config = GatewayConfig::default_test_config();
    create_router(build_state(&config).unwrap())
}

fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["sessions"], 0);
}

#[tokio::test]
async fn test_investigation_rejects_bad_url_before_streaming() {
    let app = test_app();
    let response = app
        .oneshot(json_post("/investigations", r#"{"url": "   "}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deepen_unknown_session_is_404() {
    let app = test_app();
    let response = app
        .oneshot(json_post(
            "/investigations/not-a-session/deepen",
            r#"{"focus": "seller"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deepen_invalid_focus_is_400() {
    let app = test_app();
    let response = app
        .oneshot(json_post(
            "/investigations/whatever/deepen",
            r#"{"focus": "shipping"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_rejects_empty_queries() {
    let app = test_app();
    let response = app
        .oneshot(json_post("/products/analyze", r#"{"queries": ["  ", ""]}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_investigation_streams_events_and_session_header() {
    let app = test_app();
    let response = app
        .oneshot(json_post(
            "/investigations",
            r#"{"url": "https://obscure-shop.example/deal"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
    let session_id = response
        .headers()
        .get("x-session-id")
        .expect("session id header")
        .to_str()
        .unwrap()
        .to_string();
    assert!(!session_id.is_empty());

    // The dead model endpoint fails the planning call fast, so the stream
    // carries the opening narration and one terminal error frame.
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8_lossy(&bytes);
    assert!(body.contains("event: narration"));
    assert!(body.contains("event: error"));
}

#[tokio::test]
async fn test_deepen_existing_session_opens_stream() {
    let config = GatewayConfig::default_test_config();
    let state = build_state(&config).unwrap();
    let app = create_router(state.clone());

    let first = app
        .clone()
        .oneshot(json_post(
            "/investigations",
            r#"{"url": "https://obscure-shop.example/deal"}"#,
        ))
        .await
        .unwrap();
    let session_id = first
        .headers()
        .get("x-session-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    // Drain the first stream so the session reaches a settled state
    let _ = first.into_body().collect().await.unwrap();

    let response = app
        .oneshot(json_post(
            &format!("/investigations/{}/deepen", session_id),
            r#"{"focus": "price_history"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8_lossy(&bytes);
    assert!(body.contains("event:"));
}

#[tokio::test]
async fn test_product_analysis_stream_terminates() {
    let app = test_app();
    let response = app
        .oneshot(json_post(
            "/products/analyze",
            r#"{"queries": ["wireless headphones"]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Both providers are dead, so the stream reports zero products and ends
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8_lossy(&bytes);
    assert!(body.contains("event: all_products"));
    assert!(body.contains("event: done"));
}
