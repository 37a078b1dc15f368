//! Error types for dupr-rag.

use thiserror::Error;

/// Library-level error type for dupr-rag operations.
#[derive(Error, Debug)]
pub enum DuprError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credential: {0} is not set. Export it or add it to .env")]
    MissingCredential(String),

    #[error("No documents to index. Check the player summary and blog .jsonl files")]
    EmptyIndex,

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Language model error: {0}")]
    Llm(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl DuprError {
    /// Whether the process must refuse to serve traffic after this error.
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            DuprError::MissingCredential(_) | DuprError::EmptyIndex | DuprError::Config(_)
        )
    }
}

/// Result type alias for dupr-rag operations.
pub type Result<T> = std::result::Result<T, DuprError>;
