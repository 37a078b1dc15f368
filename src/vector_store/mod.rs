//! Vector store abstraction for dupr-rag.
//!
//! Provides a trait-based interface for different vector database backends.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::document::Document;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A document persisted together with its embedding.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    /// Row ID.
    pub id: Uuid,
    /// The indexed document.
    pub document: Document,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this row was written.
    pub indexed_at: DateTime<Utc>,
}

impl StoredDocument {
    /// Wrap a document and its embedding in a new row.
    pub fn new(document: Document, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            document,
            embedding,
            indexed_at: Utc::now(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched document.
    pub document: Document,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert rows. Existing rows are never merged or deduplicated.
    async fn add_documents(&self, docs: &[StoredDocument]) -> Result<usize>;

    /// Return up to `limit` documents ordered by descending similarity.
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>>;

    /// Get total document count.
    async fn document_count(&self) -> Result<usize>;

    /// Remove every document and the recorded fingerprint.
    async fn clear(&self) -> Result<()>;

    /// Fingerprint of the inputs the index was last built from.
    async fn fingerprint(&self) -> Result<Option<String>>;

    /// Record the fingerprint of the inputs just indexed.
    async fn set_fingerprint(&self, fingerprint: &str) -> Result<()>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Score every row against the query and keep the best `limit`.
pub(crate) fn rank<'a, I>(rows: I, query_embedding: &[f32], limit: usize) -> Vec<SearchResult>
where
    I: IntoIterator<Item = (&'a Document, &'a [f32])>,
{
    let mut results: Vec<SearchResult> = rows
        .into_iter()
        .map(|(document, embedding)| SearchResult {
            document: document.clone(),
            score: cosine_similarity(query_embedding, embedding),
        })
        .collect();

    // Stable sort keeps insertion order among equal scores
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(limit);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BlogMeta;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);

        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_rank_orders_and_truncates() {
        let doc = |title: &str| {
            Document::blog(
                format!("Blog title: {}", title),
                BlogMeta {
                    url: String::new(),
                    title: title.to_string(),
                },
            )
        };
        let near = doc("near");
        let far = doc("far");
        let mid = doc("mid");
        let (e_far, e_near, e_mid) = ([0.0f32, 1.0], [1.0f32, 0.0], [1.0f32, 1.0]);
        let rows = vec![
            (&far, &e_far[..]),
            (&near, &e_near[..]),
            (&mid, &e_mid[..]),
        ];

        let results = rank(rows, &[1.0, 0.0], 2);
        let titles: Vec<_> = results.iter().filter_map(|r| r.document.display_title()).collect();
        assert_eq!(titles, vec!["near", "mid"]);
    }
}
