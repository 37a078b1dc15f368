//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use dupr_rag::document::Document;
use dupr_rag::embedding::Embedder;
use dupr_rag::index::Retriever;
use dupr_rag::llm::{ChatMessage, ChatModel};
use dupr_rag::{DuprError, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const ALICE_RECORD: &str = r#"{"player_id":"P1","player_name":"Alice","wins":10,"losses":2}"#;
pub const RULES_RECORD: &str = r#"{"title":"Rules","content":"..."}"#;

/// Write the one-player, one-blog fixture and return `(summaries, blogs)`.
pub fn write_fixture(dir: &Path) -> (PathBuf, PathBuf) {
    let summaries = dir.join("player_summaries.jsonl");
    let blogs = dir.join("blog_posts_detail.jsonl");
    std::fs::write(&summaries, format!("{}\n", ALICE_RECORD)).unwrap();
    std::fs::write(&blogs, format!("{}\n", RULES_RECORD)).unwrap();
    (summaries, blogs)
}

/// Chat model that always answers with the same string.
pub struct FixedChatModel {
    answer: String,
    fail: bool,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FixedChatModel {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: String::new(),
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for FixedChatModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.calls.lock().unwrap().push(messages.to_vec());
        if self.fail {
            return Err(DuprError::Llm("upstream unavailable".to_string()));
        }
        Ok(self.answer.clone())
    }

    fn model(&self) -> &str {
        "fixed-test"
    }
}

/// Retriever returning a fixed document list and recording `(query, top_k)`.
pub struct FixedRetriever {
    documents: Vec<Document>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl FixedRetriever {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for FixedRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Document>> {
        self.queries.lock().unwrap().push((query.to_string(), top_k));
        Ok(self.documents.iter().take(top_k).cloned().collect())
    }

    fn default_top_k(&self) -> usize {
        5
    }
}

/// Embeds text as counts of a few domain words.
pub struct WordCountEmbedder;

// Same vocabulary as the crate's unit-test embedder, so both rank alike.
const WORDS: &[&str] = &[
    "alice", "bob", "wins", "losses", "singles", "doubles", "rules", "serve", "kitchen", "dupr",
    "rating", "club",
];

fn word_counts(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    WORDS
        .iter()
        .map(|w| tokens.iter().filter(|t| *t == w).count() as f32)
        .collect()
}

#[async_trait]
impl Embedder for WordCountEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(word_counts(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| word_counts(t)).collect())
    }

    fn model(&self) -> &str {
        "word-count-test"
    }
}
