//! End-to-end tests: HTTP router -> orchestrator -> OpenAI-compatible
//! provider stubbed with wiremock.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use agent_gateway::api::{create_router_with_state, AppState};
use agent_gateway::domain::schema::SchemaRegistry;
use agent_gateway::domain::tool::ToolCatalog;
use agent_gateway::domain::workflow::{OrchestratorConfig, WorkflowOrchestrator};
use agent_gateway::infrastructure::llm::{HttpClient, OpenAiGateway};
use agent_gateway::infrastructure::tools::KnowledgeBaseTool;

fn app_for(server: &MockServer) -> Router {
    let http_client = HttpClient::with_timeout(Duration::from_secs(5)).unwrap();
    let gateway = Arc::new(OpenAiGateway::with_base_url(
        http_client,
        "test-key",
        server.uri(),
    ));

    let registry = Arc::new(SchemaRegistry::with_defaults());

    let mut catalog = ToolCatalog::new();
    catalog.register(Arc::new(KnowledgeBaseTool::bundled().unwrap()));
    let catalog = Arc::new(catalog);

    let orchestrator = Arc::new(WorkflowOrchestrator::new(
        gateway,
        registry.clone(),
        catalog.clone(),
        OrchestratorConfig::default(),
    ));

    create_router_with_state(AppState::new(orchestrator, registry, catalog))
}

fn execute_request(workflow: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/v1/workflows/{}/execute", workflow))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn completion(content: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-test",
        "model": "gpt-4o-mini",
        "choices": [{
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 6, "total_tokens": 18}
    }))
}

#[tokio::test]
async fn single_call_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion(json!("The answer is 42.")))
        .mount(&server)
        .await;

    let app = app_for(&server);
    let response = app
        .oneshot(execute_request(
            "single-call",
            json!({"text": "what is 6 * 7?"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["workflow"], "single-call");
    assert_eq!(body["message"], "The answer is 42.");
    assert_eq!(body["usage"]["total_tokens"], 18);
}

#[tokio::test]
async fn unknown_workflow_is_bad_request() {
    let server = MockServer::start().await;
    let app = app_for(&server);

    let response = app
        .oneshot(execute_request("chained-twice", json!({"text": "hi"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error_type"], "invalid_request_error");
}

#[tokio::test]
async fn blank_input_never_reaches_the_provider() {
    let server = MockServer::start().await;
    let app = app_for(&server);

    let response = app
        .oneshot(execute_request("chained", json!({"text": "   "})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn provider_failure_maps_to_service_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let app = app_for(&server);
    let response = app
        .oneshot(execute_request("single-call", json!({"text": "hello"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error_type"], "provider_error");
}

#[tokio::test]
async fn chained_workflow_returns_confirmation_and_link() {
    let server = MockServer::start().await;

    // One response per chain stage, consumed in order
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion(json!(
            r#"{"request_type": "calendar-event", "confidence_score": 0.93, "description": "Standup Monday 9am with Alice"}"#
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion(json!(
            r#"{"name": "Standup", "date": "2026-09-07T09:00:00", "participants": ["Alice"]}"#
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion(json!(
            r#"{"confirmation_message": "Standup booked for Monday at 9am."}"#
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let app = app_for(&server);
    let response = app
        .oneshot(execute_request(
            "chained",
            json!({"text": "book our standup monday 9am with alice", "debug": true}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["outcome"], "completed");
    assert_eq!(body["message"], "Standup booked for Monday at 9am.");
    assert_eq!(body["confidence_score"], 0.93);
    assert!(body["calendar_link"]
        .as_str()
        .unwrap()
        .contains("calendar.google.com"));
    assert!(!body["trace"].as_array().unwrap().is_empty());

    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn tool_calling_loop_round_trips_through_the_catalog() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_kb",
                        "type": "function",
                        "function": {
                            "name": "search_knowledge_base",
                            "arguments": "{\"question\": \"What is your return policy?\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion(json!(
            "You can return items within 30 days of delivery."
        )))
        .mount(&server)
        .await;

    let app = app_for(&server);
    let response = app
        .oneshot(execute_request(
            "tool-calling",
            json!({"text": "what's the return policy?"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["outcome"], "completed");
    assert_eq!(
        body["message"],
        "You can return items within 30 days of delivery."
    );

    // First call asks for the tool, second produces the final answer
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn health_endpoints_respond() {
    let server = MockServer::start().await;

    let app = app_for(&server);
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
