//! Deterministic stand-ins for the hosted services, shared by unit tests.

use crate::document::Document;
use crate::embedding::Embedder;
use crate::error::{DuprError, Result};
use crate::index::Retriever;
use crate::llm::{ChatMessage, ChatModel};
use crate::loader::{blog_document, player_document, Record};
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;

const VOCABULARY: &[&str] = &[
    "alice", "bob", "wins", "losses", "singles", "doubles", "rules", "serve", "kitchen", "dupr",
    "rating", "club",
];

/// Embeds text as keyword counts over a fixed vocabulary.
pub struct KeywordEmbedder;

impl KeywordEmbedder {
    fn vector(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        VOCABULARY
            .iter()
            .map(|word| tokens.iter().filter(|t| *t == word).count() as f32)
            .collect()
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn model(&self) -> &str {
        "keyword-test"
    }
}

fn record(value: serde_json::Value) -> Record {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Record::new(),
    }
}

/// A player summary document as the loader would produce it.
pub fn player(id: &str, name: &str, wins: u32, losses: u32) -> Document {
    player_document(&record(json!({
        "player_id": id,
        "player_name": name,
        "club_id": "5380169465",
        "total_matches": wins + losses,
        "wins": wins,
        "losses": losses,
        "singles_wins": wins / 2,
        "singles_losses": losses / 2,
        "doubles_wins": wins - wins / 2,
        "doubles_losses": losses - losses / 2,
        "summary": format!("{} plays at the club.", name),
    })))
}

/// A blog document as the loader would produce it.
pub fn blog(title: &str, content: &str) -> Document {
    blog_document(&record(json!({
        "url": format!("https://www.dupr.com/blog/{}", title.to_lowercase()),
        "title": title,
        "date": "2024-05-01",
        "content": content,
    })))
}

/// Chat model that records every request and replies from a script.
pub struct RecordingChatModel {
    replies: Mutex<VecDeque<String>>,
    fallback: Option<String>,
    failure: Option<String>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl RecordingChatModel {
    /// Always reply with `reply`.
    pub fn fixed(reply: &str) -> Self {
        Self::replies(&[reply])
    }

    /// Reply with each entry in turn, repeating the last one.
    pub fn replies(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            fallback: replies.last().map(|r| r.to_string()),
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail every call with an LLM error.
    pub fn failing(message: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: None,
            failure: Some(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for RecordingChatModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.calls.lock().unwrap().push(messages.to_vec());

        if let Some(failure) = &self.failure {
            return Err(DuprError::Llm(failure.clone()));
        }

        let next = self.replies.lock().unwrap().pop_front();
        Ok(next.or_else(|| self.fallback.clone()).unwrap_or_default())
    }

    fn model(&self) -> &str {
        "recording-test"
    }
}

/// Retriever returning a fixed document list.
pub struct StubRetriever {
    documents: Vec<Document>,
    default_top_k: usize,
    queries: Mutex<Vec<(String, usize)>>,
}

impl StubRetriever {
    pub fn returning(documents: Vec<Document>) -> Self {
        Self {
            documents,
            default_top_k: 5,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::returning(Vec::new())
    }

    pub fn with_default_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k;
        self
    }

    /// Every `(query, top_k)` pair seen so far.
    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for StubRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Document>> {
        self.queries.lock().unwrap().push((query.to_string(), top_k));
        Ok(self.documents.iter().take(top_k).cloned().collect())
    }

    fn default_top_k(&self) -> usize {
        self.default_top_k
    }
}
