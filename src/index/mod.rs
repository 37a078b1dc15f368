//! Index building: embed normalized documents and persist them for retrieval.

mod retriever;

pub use retriever::{Retriever, VectorRetriever};

use crate::document::Document;
use crate::embedding::Embedder;
use crate::error::{DuprError, Result};
use crate::vector_store::{StoredDocument, VectorStore};
use std::sync::Arc;
use tracing::{info, instrument};

/// Number of documents retrieved when the caller does not override it.
pub const DEFAULT_TOP_K: usize = 5;

/// Outcome of [`IndexBuilder::open_or_build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    /// The persisted index matched the inputs and was reused as-is.
    Reused { documents: usize },
    /// The index was (re)built from the inputs.
    Rebuilt { documents: usize },
}

impl IndexStatus {
    pub fn documents(&self) -> usize {
        match self {
            IndexStatus::Reused { documents } | IndexStatus::Rebuilt { documents } => *documents,
        }
    }
}

/// Embeds documents into a vector store and hands out retrievers over it.
pub struct IndexBuilder {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    default_top_k: usize,
}

impl IndexBuilder {
    /// Create a new index builder.
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            store,
            default_top_k: DEFAULT_TOP_K,
        }
    }

    /// Set the retriever's default result count.
    pub fn with_default_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k.max(1);
        self
    }

    /// Embed and insert every document, returning a retriever over the store.
    ///
    /// Existing rows are kept: building twice into the same store inserts the
    /// documents twice. Use [`IndexBuilder::open_or_build`] to avoid that.
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    pub async fn build(&self, documents: &[Document]) -> Result<VectorRetriever> {
        if documents.is_empty() {
            return Err(DuprError::EmptyIndex);
        }

        info!(
            "Embedding {} documents with {}",
            documents.len(),
            self.embedder.model()
        );
        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != documents.len() {
            return Err(DuprError::Embedding(format!(
                "Expected {} embeddings, got {}",
                documents.len(),
                embeddings.len()
            )));
        }

        let rows: Vec<StoredDocument> = documents
            .iter()
            .cloned()
            .zip(embeddings)
            .map(|(doc, embedding)| StoredDocument::new(doc, embedding))
            .collect();

        let inserted = self.store.add_documents(&rows).await?;
        info!("Indexed {} documents", inserted);

        Ok(self.retriever())
    }

    /// Reuse the persisted index when its fingerprint matches, otherwise rebuild it.
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    pub async fn open_or_build(
        &self,
        documents: &[Document],
        fingerprint: &str,
    ) -> Result<(VectorRetriever, IndexStatus)> {
        if documents.is_empty() {
            return Err(DuprError::EmptyIndex);
        }

        let stored = self.store.fingerprint().await?;
        let count = self.store.document_count().await?;

        if count > 0 && stored.as_deref() == Some(fingerprint) {
            info!("Index is up to date ({} documents), reusing it", count);
            return Ok((self.retriever(), IndexStatus::Reused { documents: count }));
        }

        info!("Index inputs changed, rebuilding");
        self.store.clear().await?;
        let retriever = self.build(documents).await?;
        self.store.set_fingerprint(fingerprint).await?;

        Ok((
            retriever,
            IndexStatus::Rebuilt {
                documents: documents.len(),
            },
        ))
    }

    /// Retriever over whatever the store currently holds.
    pub fn retriever(&self) -> VectorRetriever {
        VectorRetriever::new(
            Arc::clone(&self.embedder),
            Arc::clone(&self.store),
            self.default_top_k,
        )
    }
}
