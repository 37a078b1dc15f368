mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use common::{FixedChatModel, FixedRetriever};
use dupr_rag::document::{BlogMeta, Document};
use dupr_rag::http::{router, AppState, ChatResponse};
use dupr_rag::rag::ConversationalPipeline;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

fn rules_doc() -> Document {
    Document::blog(
        "Blog title: Rules\nPublished: N/A\nContent: ...".to_string(),
        BlogMeta {
            url: String::new(),
            title: "Rules".to_string(),
        },
    )
}

fn app(llm: Arc<FixedChatModel>) -> axum::Router {
    let pipeline = ConversationalPipeline::new(llm, Arc::new(FixedRetriever::new(vec![rules_doc()])));
    router(AppState::new(Arc::new(pipeline)))
}

fn post_chat(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_answer(response: axum::response::Response) -> ChatResponse {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn chat_returns_the_answer() {
    let llm = Arc::new(FixedChatModel::new("Serve underhand."));
    let response = app(llm.clone())
        .oneshot(post_chat(json!({ "message": "What are the serve rules?" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_answer(response).await.answer, "Serve underhand.");
    assert_eq!(llm.calls().len(), 1);
}

#[tokio::test]
async fn chat_expands_pair_history() {
    let llm = Arc::new(FixedChatModel::new("Serve underhand."));
    let response = app(llm.clone())
        .oneshot(post_chat(json!({
            "message": "and the kitchen?",
            "history": [["What are the serve rules?", "Serve underhand."]]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    // Rewrite call: system prompt, two history turns, follow-up
    let calls = llm.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].len(), 4);
    assert_eq!(calls[0][1].content, "What are the serve rules?");
    assert_eq!(calls[0][2].content, "Serve underhand.");
    assert_eq!(calls[0][3].content, "and the kitchen?");
}

#[tokio::test]
async fn chat_failure_keeps_the_response_shape() {
    let response = app(Arc::new(FixedChatModel::failing()))
        .oneshot(post_chat(json!({ "message": "rules?" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_answer(response).await;
    assert!(body.answer.starts_with("Error:"));
    assert!(body.answer.contains("upstream unavailable"));
}

#[tokio::test]
async fn health_reports_ok() {
    let response = app(Arc::new(FixedChatModel::new("unused")))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
}
