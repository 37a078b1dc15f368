//! Top-K document retrieval.

use crate::document::Document;
use crate::embedding::Embedder;
use crate::error::{DuprError, Result};
use crate::vector_store::VectorStore;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Query interface returning the most similar documents for a text query.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return at most `top_k` documents, most similar first.
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Document>>;

    /// Result count used when the caller has no preference.
    fn default_top_k(&self) -> usize;
}

/// Retriever that embeds the query and searches a vector store.
pub struct VectorRetriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    default_top_k: usize,
}

impl VectorRetriever {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>, default_top_k: usize) -> Self {
        Self {
            embedder,
            store,
            default_top_k,
        }
    }
}

#[async_trait]
impl Retriever for VectorRetriever {
    #[instrument(skip(self), fields(query = %query))]
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Document>> {
        if top_k == 0 {
            return Err(DuprError::InvalidInput(
                "top_k must be a positive integer".to_string(),
            ));
        }

        let query_embedding = self.embedder.embed(query).await?;
        let results = self.store.search(&query_embedding, top_k).await?;

        debug!(
            "Retrieved {} documents (best score {:.3})",
            results.len(),
            results.first().map(|r| r.score).unwrap_or_default()
        );

        Ok(results.into_iter().map(|r| r.document).collect())
    }

    fn default_top_k(&self) -> usize {
        self.default_top_k
    }
}
