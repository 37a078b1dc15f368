//! OpenAI-compatible embeddings implementation.

use super::Embedder;
use crate::config::EmbeddingSettings;
use crate::error::{DuprError, Result};
use crate::openai::{api_key_from_env, create_client};
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Maximum number of inputs per embeddings request.
const BATCH_SIZE: usize = 100;

/// Embedder backed by an OpenAI-compatible embeddings endpoint.
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: Option<u32>,
}

impl OpenAIEmbedder {
    /// Create an embedder from settings, reading the API key from the environment.
    pub fn from_settings(settings: &EmbeddingSettings) -> Result<Self> {
        let api_key = api_key_from_env(&settings.api_key_env)?;
        Self::with_config(
            &api_key,
            settings.api_base.as_deref(),
            &settings.model,
            settings.dimensions,
        )
    }

    /// Create an embedder with explicit credentials, model and dimensions.
    pub fn with_config(
        api_key: &str,
        api_base: Option<&str>,
        model: &str,
        dimensions: Option<u32>,
    ) -> Result<Self> {
        Ok(Self {
            client: create_client(api_key, api_base)?,
            model: model.to_string(),
            dimensions,
        })
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| DuprError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let mut args = CreateEmbeddingRequestArgs::default();
            args.model(&self.model)
                .input(EmbeddingInput::StringArray(chunk.to_vec()));
            if let Some(dimensions) = self.dimensions {
                args.dimensions(dimensions);
            }
            let request = args
                .build()
                .map_err(|e| DuprError::Embedding(format!("Failed to build request: {}", e)))?;

            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .map_err(|e| DuprError::Embedding(format!("Embedding API error: {}", e)))?;

            if response.data.len() != chunk.len() {
                return Err(DuprError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    chunk.len(),
                    response.data.len()
                )));
            }

            // Sort by index to ensure correct order
            let mut embeddings: Vec<_> = response.data.into_iter().collect();
            embeddings.sort_by_key(|e| e.index);
            all_embeddings.extend(embeddings.into_iter().map(|e| e.embedding));
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
