//! Integration tests for the HTTP API
//!
//! Drives the router with oneshot requests; clones share one coordinator

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use harmony::core::{create_router, SafetyCoordinator};
use harmony::BASELINE;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tower::ServiceExt;

fn create_test_router() -> Router {
    let coordinator = SafetyCoordinator::with_components(["quantum", "ai"]).unwrap();
    create_router(coordinator)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_router();
    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["components"], 2);
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_state_endpoint() {
    let app = create_test_router();
    let (status, json) = send(&app, "GET", "/state", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["bucket"], "OPTIMAL");
    assert_eq!(json["strategy"], "conservative");
    assert_eq!(json["emergency_active"], false);
    assert_eq!(json["system_level"].as_f64(), Some(BASELINE));
    assert_eq!(json["operating_mode"]["tag"], "nominal");
    assert_eq!(json["components"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_emergency_flow() {
    let app = create_test_router();

    let (status, json) = send(&app, "PUT", "/components/ai", Some(r#"{"level": 0.03}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["bucket"], "CRITICAL_LOW");
    assert_eq!(json["emergency_active"], true);

    let (status, json) = send(&app, "POST", "/emergency", Some(r#"{"reason": "test"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["bucket"], "OPTIMAL");
    assert_eq!(json["emergency_active"], false);
    assert_eq!(json["system_level"].as_f64(), Some(BASELINE));

    let (_, json) = send(&app, "GET", "/components/ai", None).await;
    assert_eq!(json["level"].as_f64(), Some(BASELINE));

    let (status, json) = send(&app, "GET", "/audit", None).await;
    assert_eq!(status, StatusCode::OK);
    let reasons: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["reason"].as_str())
        .collect();
    assert!(reasons.contains(&"R005_EMERGENCY_ENTERED"));
    assert!(reasons.contains(&"R005_EMERGENCY_CLEARED"));
    assert!(reasons.contains(&"R006_EMERGENCY_STABILIZED"));
}

#[tokio::test]
async fn test_emergency_without_reason() {
    let app = create_test_router();
    let (status, json) = send(&app, "POST", "/emergency", Some("{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["bucket"], "OPTIMAL");
}

#[tokio::test]
async fn test_strategy_switch() {
    let app = create_test_router();
    send(&app, "PUT", "/components/quantum", Some(r#"{"level": 0.1}"#)).await;
    send(&app, "PUT", "/components/ai", Some(r#"{"level": 0.9}"#)).await;

    let (status, json) = send(&app, "PUT", "/strategy", Some(r#"{"strategy": "performance"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["system_level"].as_f64(), Some(0.9));
    assert_eq!(json["bucket"], "WARNING_HIGH");

    let (_, json) = send(&app, "GET", "/state", None).await;
    assert_eq!(json["strategy"], "performance");
}

#[tokio::test]
async fn test_register_and_harmonize() {
    let app = create_test_router();

    let (status, _) = send(&app, "POST", "/components", Some(r#"{"id": "launcher", "level": 0.5}"#)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = send(&app, "POST", "/harmonize", Some(r#"{"level": 1.7}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["system_level"].as_f64(), Some(1.0));
    assert_eq!(json["bucket"], "CRITICAL_HIGH");

    let (_, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(json["components"], 3);
}

#[tokio::test]
async fn test_unknown_component() {
    let app = create_test_router();

    let (status, json) = send(&app, "GET", "/components/nonexistent", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "UnknownComponent");

    let (status, _) = send(&app, "PUT", "/components/nonexistent", Some(r#"{"level": 0.5}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_registration() {
    let app = create_test_router();
    let (status, json) = send(&app, "POST", "/components", Some(r#"{"id": "ai"}"#)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "DuplicateComponent");
}

#[tokio::test]
async fn test_register_rejects_malformed_ids() {
    let app = create_test_router();

    for body in [r#"{"id": ""}"#, r#"{"id": "my id"}"#, r#"{"id": "9lives"}"#] {
        let (status, json) = send(&app, "POST", "/components", Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", body);
        assert_eq!(json["error"], "InvalidComponentId");
    }

    let (_, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(json["components"], 2);
}

#[tokio::test]
async fn test_empty_registry() {
    let app = create_router(SafetyCoordinator::new());

    let (status, json) = send(&app, "GET", "/state", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "NoComponentsRegistered");

    let (status, _) = send(&app, "POST", "/emergency", Some("{}")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["components"], 0);
}
