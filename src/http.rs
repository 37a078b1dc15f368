//! HTTP API over the conversational pipeline.
//!
//! `POST /chat` takes a message and pair-style history and returns the answer.
//! `GET /health` reports liveness.

use crate::rag::{ChatTurn, ConversationalPipeline};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ConversationalPipeline>,
    /// Documents retrieved per request.
    pub default_top_k: usize,
}

impl AppState {
    pub fn new(pipeline: Arc<ConversationalPipeline>) -> Self {
        let default_top_k = pipeline.default_top_k();
        Self {
            pipeline,
            default_top_k,
        }
    }
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Earlier `(user, assistant)` exchanges, oldest first.
    #[serde(default)]
    pub history: Vec<(Option<String>, Option<String>)>,
}

impl ChatRequest {
    /// Expand the pair history into turns, skipping empty sides.
    pub fn turns(&self) -> Vec<ChatTurn> {
        let mut turns = Vec::with_capacity(self.history.len() * 2);
        for (user, assistant) in &self.history {
            if let Some(user) = user.as_deref().filter(|s| !s.is_empty()) {
                turns.push(ChatTurn::user(user));
            }
            if let Some(assistant) = assistant.as_deref().filter(|s| !s.is_empty()) {
                turns.push(ChatTurn::assistant(assistant));
            }
        }
        turns
    }
}

/// Body returned by `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> (StatusCode, Json<ChatResponse>) {
    let turns = req.turns();
    match state
        .pipeline
        .answer(&req.message, &turns, state.default_top_k)
        .await
    {
        Ok(rag) => (StatusCode::OK, Json(ChatResponse { answer: rag.answer })),
        Err(e) => {
            error!("Chat request failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatResponse {
                    answer: format!("Error: {}", e),
                }),
            )
        }
    }
}
