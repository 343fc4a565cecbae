//! Integration tests for the OCR proxy.
//!
//! Each test builds its own router. Upstream vision calls either go to a
//! mock OCR service or to a wiremock server standing in for the vision API.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use audicare_api::create_router;
use audicare_api::handlers::{HealthResponse, LabelTextResponse};
use audicare_api::state::AppState;
use audicare_core::config::OcrConfig;
use audicare_ocr::{MockOcrService, OcrService};

// =============================================================================
// Helpers
// =============================================================================

fn app_with(ocr: Option<Arc<dyn OcrService>>) -> axum::Router {
    create_router(AppState::new(ocr))
}

fn mock_app(text: &str) -> axum::Router {
    app_with(Some(Arc::new(MockOcrService::with_text(text))))
}

fn app_against(server: &MockServer) -> axum::Router {
    let config = OcrConfig {
        vision_api_url: format!("{}/v1/images:annotate", server.uri()),
        ..OcrConfig::default()
    };
    create_router(AppState::from_config(&config, Some("server-secret")))
}

fn label_request(body: &str) -> Request<Body> {
    Request::post("/read-medicine-label")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Read full response body bytes.
async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

async fn body_text(resp: axum::response::Response) -> String {
    String::from_utf8(body_bytes(resp).await).unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_happy_path() {
    let resp = mock_app("x")
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let health: HealthResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
    assert!(health.ocr_configured);
}

#[tokio::test]
async fn test_health_reports_missing_secret() {
    let resp = app_with(None)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let health: HealthResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert!(!health.ocr_configured);
}

// =============================================================================
// POST /read-medicine-label
// =============================================================================

#[tokio::test]
async fn test_label_happy_path() {
    let resp = mock_app("Ibuprofen 200mg")
        .oneshot(label_request(r#"{"imageBase64":"aGVsbG8="}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: LabelTextResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(body.text, "Ibuprofen 200mg");
}

#[tokio::test]
async fn test_missing_secret_is_plain_text_500() {
    let resp = app_with(None)
        .oneshot(label_request(r#"{"imageBase64":"aGVsbG8="}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(resp).await, "Missing Google API Key");
}

#[tokio::test]
async fn test_missing_secret_checked_before_body() {
    let resp = app_with(None).oneshot(label_request("not json")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(resp).await, "Missing Google API Key");
}

#[tokio::test]
async fn test_missing_image_is_plain_text_400() {
    for body in [r#"{}"#, r#"{"imageBase64":""}"#, r#"{"image":"aGVsbG8="}"#] {
        let resp = mock_app("x").oneshot(label_request(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {}", body);
        assert_eq!(body_text(resp).await, "Missing image data");
    }
}

#[tokio::test]
async fn test_invalid_json_is_json_500() {
    let resp = mock_app("x").oneshot(label_request("{not json")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn test_null_body_is_json_500() {
    let resp = mock_app("x").oneshot(label_request("null")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(body["error"], "request body is null");
}

#[tokio::test]
async fn test_non_object_body_is_missing_image() {
    for body in ["[]", "42", r#""aGVsbG8=""#] {
        let resp = mock_app("x").oneshot(label_request(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {}", body);
    }
}

#[tokio::test]
async fn test_get_not_allowed() {
    let resp = mock_app("x")
        .oneshot(Request::get("/read-medicine-label").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// Against a mocked vision API
// =============================================================================

#[tokio::test]
async fn test_vision_text_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(query_param("key", "server-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responses": [{"fullTextAnnotation": {"text": "Take with food"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = app_against(&server)
        .oneshot(label_request(r#"{"imageBase64":"aGVsbG8="}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(body, json!({"text": "Take with food"}));
}

#[tokio::test]
async fn test_vision_without_annotation_returns_empty_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"responses": [{}]})))
        .mount(&server)
        .await;

    let resp = app_against(&server)
        .oneshot(label_request(r#"{"imageBase64":"aGVsbG8="}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(body, json!({"text": ""}));
}

#[tokio::test]
async fn test_vision_error_status_is_not_inspected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"error": {"message": "denied"}})),
        )
        .mount(&server)
        .await;

    let resp = app_against(&server)
        .oneshot(label_request(r#"{"imageBase64":"aGVsbG8="}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(body["text"], "");
}

#[tokio::test]
async fn test_unreachable_vision_is_json_500() {
    let config = OcrConfig {
        vision_api_url: "http://127.0.0.1:9/v1/images:annotate".to_string(),
        ..OcrConfig::default()
    };
    let app = create_router(AppState::from_config(&config, Some("secret")));

    let resp = app
        .oneshot(label_request(r#"{"imageBase64":"aGVsbG8="}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert!(body["error"].is_string());
}
