//! Functional tests for the Gemini client against a mock API

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use headshot_studio::codec::{base64, ImagePayload};
use headshot_studio::config::GeminiConfig;
use headshot_studio::generation::directive::IDENTITY_DIRECTIVE;
use headshot_studio::generation::{GeminiClient, GenerationService, ImageTransformer};
use headshot_studio::AppError;
use std::sync::Arc;

use crate::common::JPEG;

const ENDPOINT: &str = "/models/test-model:generateContent";

fn config_for(server: &MockServer) -> GeminiConfig {
    GeminiConfig {
        api_key: Some("test-key".to_string()),
        api_base: server.uri(),
        model: "test-model".to_string(),
    }
}

fn image_response(data: &[u8], mime: &str) -> Value {
    json!({
        "candidates": [{
            "content": {
                "parts": [ { "inlineData": { "mimeType": mime, "data": base64::encode(data) } } ]
            }
        }]
    })
}

#[tokio::test]
async fn test_style_transform_sends_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({ "generationConfig": { "responseModalities": ["IMAGE"] } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_response(&[7, 7, 7], "image/png")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(&config_for(&server)).unwrap();
    let service = GenerationService::new(Arc::new(client));
    let image = ImagePayload::new(JPEG.to_vec(), "image/jpeg");

    let output = service.style_transform(&image, "solid black backdrop").await.unwrap();
    assert_eq!(output.bytes, vec![7, 7, 7]);
    assert_eq!(output.mime_type.as_deref(), Some("image/png"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = requests[0].body_json().unwrap();
    let parts = &body["contents"][0]["parts"];
    assert_eq!(parts[0]["inlineData"]["mimeType"], json!("image/jpeg"));
    assert_eq!(parts[0]["inlineData"]["data"], json!(base64::encode(&JPEG)));
    let text = parts[1]["text"].as_str().unwrap();
    assert!(text.contains("solid black backdrop"));
    assert!(text.contains(IDENTITY_DIRECTIVE));
}

#[tokio::test]
async fn test_edit_transform_carries_directive() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_response(&[1], "image/png")))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&config_for(&server)).unwrap();
    let service = GenerationService::new(Arc::new(client));
    let image = ImagePayload::new(vec![1, 2, 3], "image/png");

    service.edit_transform(&image, "darken background").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    let text = body["contents"][0]["parts"][1]["text"].as_str().unwrap();
    assert!(text.contains("darken background"));
    assert!(text.contains(IDENTITY_DIRECTIVE));
}

#[tokio::test]
async fn test_text_only_response_is_no_image() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [ { "text": "I can't do that" } ] } }]
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&config_for(&server)).unwrap();
    let image = ImagePayload::new(JPEG.to_vec(), "image/jpeg");
    let result = client.transform(&image, "anything").await;
    assert!(matches!(result, Err(AppError::NoImageReturned)));
}

#[tokio::test]
async fn test_empty_candidates_is_no_image() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&config_for(&server)).unwrap();
    let image = ImagePayload::new(JPEG.to_vec(), "image/jpeg");
    assert!(matches!(
        client.transform(&image, "anything").await,
        Err(AppError::NoImageReturned)
    ));
}

#[tokio::test]
async fn test_server_error_is_generation_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(&config_for(&server)).unwrap();
    let image = ImagePayload::new(JPEG.to_vec(), "image/jpeg");
    assert!(matches!(
        client.transform(&image, "anything").await,
        Err(AppError::GenerationFailed)
    ));
}

#[tokio::test]
async fn test_malformed_body_is_generation_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&config_for(&server)).unwrap();
    let image = ImagePayload::new(JPEG.to_vec(), "image/jpeg");
    assert!(matches!(
        client.transform(&image, "anything").await,
        Err(AppError::GenerationFailed)
    ));
}

#[tokio::test]
async fn test_unreachable_api_is_generation_failed() {
    let config = GeminiConfig {
        api_key: Some("test-key".to_string()),
        api_base: "http://127.0.0.1:1".to_string(),
        model: "test-model".to_string(),
    };
    let client = GeminiClient::new(&config).unwrap();
    let image = ImagePayload::new(JPEG.to_vec(), "image/jpeg");
    assert!(matches!(
        client.transform(&image, "anything").await,
        Err(AppError::GenerationFailed)
    ));
}
