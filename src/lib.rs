//! dupr-rag - Pickleball and DUPR question answering
//!
//! Answers natural-language questions about a pickleball club's players and
//! the DUPR rating system, grounded in scraped player summaries and blog posts.
//!
//! # Overview
//!
//! - Player summaries and blog posts are loaded from line-delimited JSON files
//! - Each record becomes one document, embedded into a persisted vector index
//! - Follow-up questions are rewritten into standalone ones using the chat history
//! - Answers are generated by a hosted model strictly from the retrieved documents
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `loader` - JSONL records to documents
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction
//! - `index` - Index building and top-K retrieval
//! - `llm` - Chat model access
//! - `rag` - The conversational pipeline
//! - `chat` - Chat front-end adapter
//! - `http` - HTTP API
//! - `orchestrator` - Startup wiring
//!
//! # Example
//!
//! ```rust,no_run
//! use dupr_rag::config::Settings;
//! use dupr_rag::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::bootstrap(settings).await?;
//!
//!     let response = orchestrator
//!         .pipeline()
//!         .answer("How many wins does Alice have?", &[], 5)
//!         .await?;
//!     println!("{}", response.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod cli;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod fingerprint;
pub mod http;
pub mod index;
pub mod llm;
pub mod loader;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod vector_store;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{DuprError, Result};
