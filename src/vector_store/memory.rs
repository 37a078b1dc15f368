//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{rank, SearchResult, StoredDocument, VectorStore};
use crate::error::{DuprError, Result};
use async_trait::async_trait;
use std::sync::RwLock;

/// In-memory vector store.
pub struct MemoryVectorStore {
    rows: RwLock<Vec<StoredDocument>>,
    fingerprint: RwLock<Option<String>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            fingerprint: RwLock::new(None),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> DuprError {
    DuprError::VectorStore(format!("Failed to acquire lock: {}", e))
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn add_documents(&self, docs: &[StoredDocument]) -> Result<usize> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        rows.extend_from_slice(docs);
        Ok(docs.len())
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rank(
            rows.iter().map(|r| (&r.document, r.embedding.as_slice())),
            query_embedding,
            limit,
        ))
    }

    async fn document_count(&self) -> Result<usize> {
        Ok(self.rows.read().map_err(poisoned)?.len())
    }

    async fn clear(&self) -> Result<()> {
        self.rows.write().map_err(poisoned)?.clear();
        *self.fingerprint.write().map_err(poisoned)? = None;
        Ok(())
    }

    async fn fingerprint(&self) -> Result<Option<String>> {
        Ok(self.fingerprint.read().map_err(poisoned)?.clone())
    }

    async fn set_fingerprint(&self, fingerprint: &str) -> Result<()> {
        *self.fingerprint.write().map_err(poisoned)? = Some(fingerprint.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, PlayerSummaryMeta};

    fn player(name: &str) -> Document {
        Document::player_summary(
            format!("Player summary: {}", name),
            PlayerSummaryMeta {
                player_id: name.to_lowercase(),
                player_name: name.to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_memory_vector_store() {
        let store = MemoryVectorStore::new();

        let rows = vec![
            StoredDocument::new(player("Alice"), vec![1.0, 0.0, 0.0]),
            StoredDocument::new(player("Bob"), vec![0.0, 1.0, 0.0]),
        ];
        store.add_documents(&rows).await.unwrap();
        assert_eq!(store.document_count().await.unwrap(), 2);

        let results = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].score > results[1].score);
        assert_eq!(results[0].document.display_title(), Some("Alice"));

        // Re-adding never deduplicates
        store.add_documents(&rows).await.unwrap();
        assert_eq!(store.document_count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_clear_drops_fingerprint() {
        let store = MemoryVectorStore::new();
        store.set_fingerprint("abc").await.unwrap();
        store
            .add_documents(&[StoredDocument::new(player("Alice"), vec![1.0])])
            .await
            .unwrap();

        store.clear().await.unwrap();
        assert_eq!(store.document_count().await.unwrap(), 0);
        assert_eq!(store.fingerprint().await.unwrap(), None);
    }
}
