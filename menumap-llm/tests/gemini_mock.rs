mod common;

use menumap_llm::gemini::GeminiClient;
use menumap_llm::schema::menu_schema;
use menumap_llm::traits::{LlmClient, LlmError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-2.5-flash";

fn generate_path() -> String {
    format!("/models/{MODEL}:generateContent")
}

fn success_body(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"parts": [{"text": text}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"totalTokenCount": 123}
    })
}

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::with_base_url("test-key".to_string(), MODEL.to_string(), server.uri())
        .expect("client builds")
}

#[tokio::test]
async fn structured_request_carries_schema_and_mime_type() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_path()))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "generation_config": {
                "response_mime_type": "application/json",
                "response_schema": {"type": "OBJECT", "required": ["menu"]}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body(r#"{"menu": []}"#)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let resp = client
        .generate_structured("extract the menu", Some("system"), &menu_schema(6))
        .await
        .unwrap();

    assert_eq!(resp.text, r#"{"menu": []}"#);
    assert_eq!(resp.tokens_used, Some(123));
    assert_eq!(resp.model.as_deref(), Some(MODEL));
}

#[tokio::test]
async fn system_prompt_travels_as_system_instruction() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_path()))
        .and(body_partial_json(json!({
            "system_instruction": {"parts": [{"text": "be terse"}]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body("OK")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let resp = client
        .generate("hello", Some("be terse"), Some(8), Some(0.2))
        .await
        .unwrap();
    assert_eq!(resp.text, "OK");
}

#[tokio::test]
async fn http_429_maps_to_rate_limit() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .generate_structured("p", None, &menu_schema(2))
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::RateLimit));
}

#[tokio::test]
async fn rejected_key_maps_to_invalid_api_key() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "API key not valid. Please pass a valid API key.",
                      "status": "INVALID_ARGUMENT"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .generate_structured("p", None, &menu_schema(2))
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::InvalidApiKey));
}

#[tokio::test]
async fn missing_candidates_map_to_empty() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.generate("p", None, None, None).await.unwrap_err();
    assert!(matches!(err, LlmError::Empty));
}
