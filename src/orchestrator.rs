//! Application wiring.
//!
//! Builds the long-lived components once at startup: model clients, the
//! persisted index and the conversational pipeline. Front-ends receive them
//! through [`AppState`] or [`Orchestrator::pipeline`].

use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{DuprError, Result};
use crate::fingerprint::source_fingerprint;
use crate::http::AppState;
use crate::index::{IndexBuilder, IndexStatus, VectorRetriever};
use crate::llm::{ChatModel, OpenAIChatModel};
use crate::loader::{load_documents, LoadedDocuments};
use crate::rag::ConversationalPipeline;
use crate::vector_store::{SqliteVectorStore, VectorStore};
use std::sync::Arc;
use tracing::{info, instrument};

/// Summary of an indexing run.
#[derive(Debug, Clone, Copy)]
pub struct IndexReport {
    pub status: IndexStatus,
    pub player_count: usize,
    pub blog_count: usize,
}

/// Owner of the running application's components.
pub struct Orchestrator {
    pipeline: Arc<ConversationalPipeline>,
    report: IndexReport,
}

impl Orchestrator {
    /// Build everything from settings using the hosted model clients.
    ///
    /// Fails when a credential is missing or no documents could be loaded.
    pub async fn bootstrap(settings: Settings) -> Result<Self> {
        let llm: Arc<dyn ChatModel> = Arc::new(OpenAIChatModel::from_settings(&settings.llm)?);
        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
        let store: Arc<dyn VectorStore> = Arc::new(SqliteVectorStore::new(&settings.index_path())?);

        Self::with_components(settings, llm, embedder, store).await
    }

    /// Build everything from explicitly provided components.
    pub async fn with_components(
        settings: Settings,
        llm: Arc<dyn ChatModel>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
    ) -> Result<Self> {
        let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;

        let (retriever, report) = open_index(&settings, embedder, store, false).await?;

        info!(
            "Pipeline ready: {} with {} indexed documents",
            llm.model(),
            report.status.documents()
        );

        let pipeline = ConversationalPipeline::new(llm, Arc::new(retriever)).with_prompts(prompts);

        Ok(Self {
            pipeline: Arc::new(pipeline),
            report,
        })
    }

    /// Load the inputs and bring the persisted index up to date without
    /// touching the chat model.
    pub async fn reindex(settings: &Settings, force: bool) -> Result<IndexReport> {
        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
        let store: Arc<dyn VectorStore> = Arc::new(SqliteVectorStore::new(&settings.index_path())?);

        let (_, report) = open_index(settings, embedder, store, force).await?;
        Ok(report)
    }

    pub fn pipeline(&self) -> Arc<ConversationalPipeline> {
        Arc::clone(&self.pipeline)
    }

    pub fn report(&self) -> IndexReport {
        self.report
    }

    /// State handed to the HTTP handlers.
    pub fn app_state(&self) -> AppState {
        AppState::new(self.pipeline())
    }
}

#[instrument(skip_all, fields(force = force))]
async fn open_index(
    settings: &Settings,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    force: bool,
) -> Result<(VectorRetriever, IndexReport)> {
    let loaded: LoadedDocuments = load_documents(&settings.sources);
    if loaded.is_empty() {
        return Err(DuprError::EmptyIndex);
    }

    if force {
        info!("Forcing a full rebuild");
        store.clear().await?;
    }

    let summaries = settings.summaries_path();
    let blogs = settings.blogs_path();
    let fingerprint = source_fingerprint(&[summaries.as_path(), blogs.as_path()], embedder.model());

    let builder = IndexBuilder::new(embedder, store).with_default_top_k(settings.index.default_top_k);
    let (retriever, status) = builder.open_or_build(&loaded.documents, &fingerprint).await?;

    Ok((
        retriever,
        IndexReport {
            status,
            player_count: loaded.player_count,
            blog_count: loaded.blog_count,
        },
    ))
}
