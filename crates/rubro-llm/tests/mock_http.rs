//! Mock HTTP server tests for both provider contracts.
//!
//! Uses [`wiremock`] to emulate the DeepSeek/OpenAI chat-completions endpoint
//! and the Ollama chat endpoint, exercising the full request/response path.

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rubro_llm::{
    ChatProvider, ChatRequest, ConcurrencyPool, LlmError, OllamaOptions, OllamaProvider,
    OpenAiCompatProvider, RateLimitedCaller,
};

fn openai(server: &MockServer) -> OpenAiCompatProvider {
    OpenAiCompatProvider::new(server.uri(), "sk-mock-key", Duration::from_secs(10)).unwrap()
}

fn ollama(server: &MockServer) -> OllamaProvider {
    OllamaProvider::new(server.uri(), OllamaOptions::default(), Duration::from_secs(10)).unwrap()
}

// ── OpenAI-compatible ─────────────────────────────────────────────────

#[tokio::test]
async fn openai_success_returns_trimmed_content() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "id": "chatcmpl-1",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "  vendedor: ferreteria \n" },
            "finish_reason": "stop"
        }]
    });

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-mock-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "deepseek-reasoner",
            "messages": [{ "role": "user", "content": "Hola" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let text = openai(&server)
        .complete(&ChatRequest::new("deepseek-reasoner", "Hola", 0.1))
        .await
        .unwrap();
    assert_eq!(text, "vendedor: ferreteria");
}

#[tokio::test]
async fn openai_server_error_is_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = openai(&server)
        .complete(&ChatRequest::new("m", "Hola", 0.1))
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::Status { status: 500, ref body } if body == "overloaded"));
}

#[tokio::test]
async fn openai_empty_choices_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = openai(&server)
        .complete(&ChatRequest::new("m", "Hola", 0.1))
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::InvalidResponse(_)));
}

#[tokio::test]
async fn openai_malformed_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = openai(&server)
        .complete(&ChatRequest::new("m", "Hola", 0.1))
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::InvalidResponse(_)));
}

// ── Ollama ────────────────────────────────────────────────────────────

#[tokio::test]
async fn ollama_json_request_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(serde_json::json!({
            "model": "qwen3",
            "stream": false,
            "format": "json",
            "options": { "temperature": 0.0, "num_ctx": 5000 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "qwen3",
            "message": { "role": "assistant", "content": "{\"main_rubros\": [\"X\"]}" },
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = ollama(&server)
        .complete(&ChatRequest::new("qwen3", "clasifica", 0.0).with_json_output())
        .await
        .unwrap();
    assert_eq!(text, "{\"main_rubros\": [\"X\"]}");
}

#[tokio::test]
async fn ollama_missing_model_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
        .mount(&server)
        .await;

    let err = ollama(&server)
        .complete(&ChatRequest::new("nope", "x", 0.0))
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::ModelNotAvailable(m) if m == "nope"));
}

// ── Caller over HTTP ──────────────────────────────────────────────────

#[tokio::test]
async fn caller_collapses_http_failure_into_call_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let caller = RateLimitedCaller::new(Arc::new(openai(&server)));
    let pool = ConcurrencyPool::new(2);
    let err = caller.call("Hola", "m", 0.1, &pool).await.unwrap_err();
    assert_eq!(err.cause, "HTTP 503: busy");
    assert_eq!(caller.stats().failed(), 1);
}

#[tokio::test]
async fn caller_connection_refused_is_call_error() {
    let provider =
        OpenAiCompatProvider::new("http://127.0.0.1:9", "k", Duration::from_millis(200)).unwrap();
    let caller = RateLimitedCaller::new(Arc::new(provider));
    let pool = ConcurrencyPool::new(1);
    let err = caller.call("Hola", "m", 0.1, &pool).await.unwrap_err();
    assert!(!err.cause.is_empty());
}
